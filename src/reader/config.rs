use serde::Deserialize;

/// Configuration for opening a TSF analysis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Use device recalibration data if the analysis has any
    pub use_recalibration: bool,
    /// Starting capacity (in peaks) for line spectrum reads
    pub initial_line_capacity: usize,
    /// Starting capacity (in samples) for profile spectrum reads
    pub initial_profile_capacity: usize,
    /// Upper bound on read calls per spectrum while the buffer grows
    pub max_read_attempts: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            use_recalibration: false,
            initial_line_capacity: 128,
            initial_profile_capacity: 0,
            max_read_attempts: 8,
        }
    }
}

impl ReaderConfig {
    /// Set whether recalibration data is used.
    pub fn with_recalibration(mut self, use_recalibration: bool) -> Self {
        self.use_recalibration = use_recalibration;
        self
    }

    /// Set the starting line spectrum capacity.
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.initial_line_capacity = capacity;
        self
    }

    /// Set the starting profile spectrum capacity.
    pub fn with_profile_capacity(mut self, capacity: usize) -> Self {
        self.initial_profile_capacity = capacity;
        self
    }

    /// Set the retry bound (at least one read is always issued).
    pub fn with_max_read_attempts(mut self, attempts: usize) -> Self {
        self.max_read_attempts = attempts.max(1);
        self
    }
}
