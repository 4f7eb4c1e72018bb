//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in
//! a config file:
//!
//! ```toml
//! # tsfdata.toml
//! [library]
//! path = "/opt/bruker/libtimsdata.so"
//! num_threads = 4
//!
//! [reader]
//! use_recalibration = true
//! initial_line_capacity = 4096
//! max_read_attempts = 4
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tsfdata::ReaderConfig;

/// Root configuration structure for tsfdata.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Vendor library settings.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Reader settings passed to `TsfData::open_with_config`.
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// Where to find the vendor library and how to set it up.
#[derive(Debug, Default, Deserialize)]
pub struct LibraryConfig {
    /// Path to timsdata.dll / libtimsdata.so.
    pub path: Option<PathBuf>,

    /// Worker threads for the vendor library.
    pub num_threads: Option<u32>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
