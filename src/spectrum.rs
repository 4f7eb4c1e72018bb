//! Owned spectrum values returned by [`crate::TsfData`].
//!
//! Line spectra come back on the sample-index axis; [`CentroidSpectrum`] is
//! the same data after index-to-m/z conversion.

use serde::Serialize;

/// Buffers filled by one size-negotiated read.
///
/// All parallel arrays of an implementor are resized together.
pub(crate) trait SpectrumBuffers: Default {
    fn resize(&mut self, len: usize);
}

/// Line (centroided) spectrum on the index axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineSpectrum {
    /// Peak positions as fractional sample indices
    pub indices: Vec<f64>,
    /// Peak intensities
    pub intensities: Vec<f32>,
}

impl LineSpectrum {
    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the spectrum has no peaks.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, intensity)` pairs.
    pub fn peaks(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.indices.iter().copied().zip(self.intensities.iter().copied())
    }

    /// Sum of all intensities.
    pub fn total_intensity(&self) -> f64 {
        total(&self.intensities)
    }

    /// Position of the most intense peak.
    pub fn base_peak(&self) -> Option<usize> {
        argmax(&self.intensities)
    }
}

impl SpectrumBuffers for LineSpectrum {
    fn resize(&mut self, len: usize) {
        self.indices.resize(len, 0.0);
        self.intensities.resize(len, 0.0);
    }
}

/// Line spectrum with a peak width per peak.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineSpectrumWithWidth {
    /// Peak positions as fractional sample indices
    pub indices: Vec<f64>,
    /// Peak intensities
    pub intensities: Vec<f32>,
    /// Peak widths, in index units
    pub widths: Vec<f32>,
}

impl LineSpectrumWithWidth {
    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the spectrum has no peaks.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, intensity, width)` triples.
    pub fn peaks(&self) -> impl Iterator<Item = (f64, f32, f32)> + '_ {
        self.indices
            .iter()
            .zip(&self.intensities)
            .zip(&self.widths)
            .map(|((&index, &intensity), &width)| (index, intensity, width))
    }

    /// Sum of all intensities.
    pub fn total_intensity(&self) -> f64 {
        total(&self.intensities)
    }

    /// Position of the most intense peak.
    pub fn base_peak(&self) -> Option<usize> {
        argmax(&self.intensities)
    }
}

impl SpectrumBuffers for LineSpectrumWithWidth {
    fn resize(&mut self, len: usize) {
        self.indices.resize(len, 0.0);
        self.intensities.resize(len, 0.0);
        self.widths.resize(len, 0.0);
    }
}

/// Raw profile spectrum: one intensity count per sample index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSpectrum {
    /// Intensity per sample index
    pub intensities: Vec<u32>,
}

impl ProfileSpectrum {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    /// Whether the profile has no samples.
    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Sum of all counts.
    pub fn total_intensity(&self) -> f64 {
        self.intensities.iter().map(|&v| f64::from(v)).sum()
    }

    /// Sample index with the highest count.
    pub fn base_peak(&self) -> Option<usize> {
        self.intensities
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(i, _)| i)
    }
}

impl SpectrumBuffers for ProfileSpectrum {
    fn resize(&mut self, len: usize) {
        self.intensities.resize(len, 0);
    }
}

/// Line spectrum with peak positions converted to m/z.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentroidSpectrum {
    /// Peak m/z values
    pub mz: Vec<f64>,
    /// Peak intensities
    pub intensities: Vec<f32>,
}

impl CentroidSpectrum {
    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    /// Whether the spectrum has no peaks.
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Iterate over `(mz, intensity)` pairs.
    pub fn peaks(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.mz.iter().copied().zip(self.intensities.iter().copied())
    }

    /// Sum of all intensities.
    pub fn total_intensity(&self) -> f64 {
        total(&self.intensities)
    }

    /// Position of the most intense peak.
    pub fn base_peak(&self) -> Option<usize> {
        argmax(&self.intensities)
    }
}

fn total(values: &[f32]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum()
}

fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
