//! Session-owning reader for TSF analyses.
//!
//! [`TsfData`] opens one analysis through a [`TsfApi`] implementation, keeps
//! the session handle for its whole lifetime and closes it on drop.
//!
//! # Example
//!
//! ```no_run
//! use tsfdata::{TsfData, TsfLibrary};
//!
//! let library = TsfLibrary::load_default()?;
//! let mut tsf = TsfData::open(&library, "sample.d", false)?;
//!
//! let spectrum = tsf.read_line_spectrum(1)?;
//! let mz = tsf.index_to_mz(1, &spectrum.indices)?;
//! println!("{} peaks, first at m/z {:?}", spectrum.len(), mz.first());
//! # Ok::<(), tsfdata::TsfError>(())
//! ```
//!
//! # Threading
//!
//! `TsfData` is `Send` but not `Sync`. Whether the vendor library tolerates
//! concurrent calls on one handle is not documented, so a session is only
//! ever used from one thread at a time. Open one session per thread to read
//! in parallel.

mod buffers;
mod config;

#[cfg(test)]
mod tests;

pub use config::ReaderConfig;

use std::cell::Cell;
use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;

use log::{debug, warn};

use crate::api::TsfApi;
use crate::error::{Result, TsfError};
use crate::spectrum::{CentroidSpectrum, LineSpectrum, LineSpectrumWithWidth, ProfileSpectrum};
use buffers::{read_negotiated, NegotiationFailure};

/// Signature shared by [`TsfApi::index_to_mz`] and [`TsfApi::mz_to_index`].
type Conversion<A> = unsafe fn(&A, u64, i64, &[f64], &mut [f64]);

/// Reader for one open TSF analysis (`.d` directory).
///
/// The binary spectrum data (`analysis.tsf_bin`) is read by the vendor
/// library. The SQLite metadata file (`analysis.tsf`) can be opened
/// separately with any SQLite API.
pub struct TsfData<A: TsfApi> {
    api: A,
    handle: u64,
    line_capacity: usize,
    profile_capacity: usize,
    max_read_attempts: usize,
    _not_sync: PhantomData<Cell<()>>,
}

impl<A: TsfApi> std::fmt::Debug for TsfData<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsfData")
            .field("handle", &self.handle)
            .field("line_capacity", &self.line_capacity)
            .field("profile_capacity", &self.profile_capacity)
            .finish_non_exhaustive()
    }
}

impl<A: TsfApi> TsfData<A> {
    /// Open a TSF analysis with default buffer settings.
    ///
    /// # Arguments
    /// * `api` - Library to read through
    /// * `analysis_directory` - Path to the `.d` directory (must be valid UTF-8)
    /// * `use_recalibration` - Use device recalibration data if available
    ///
    /// # Errors
    /// - `TsfError::InvalidPath` if the path is not valid UTF-8 or contains NUL
    /// - `TsfError::Open` with the library's message if opening fails
    pub fn open<P: AsRef<Path>>(api: A, analysis_directory: P, use_recalibration: bool) -> Result<Self> {
        let config = ReaderConfig::default().with_recalibration(use_recalibration);
        Self::open_with_config(api, analysis_directory, &config)
    }

    /// Open a TSF analysis with explicit configuration.
    pub fn open_with_config<P: AsRef<Path>>(
        api: A,
        analysis_directory: P,
        config: &ReaderConfig,
    ) -> Result<Self> {
        let path = analysis_directory.as_ref();
        let utf8 = path.to_str().ok_or_else(|| {
            TsfError::InvalidPath(format!("not valid UTF-8: {}", path.display()))
        })?;
        let c_path = CString::new(utf8)
            .map_err(|_| TsfError::InvalidPath(format!("contains a NUL byte: {}", utf8)))?;

        let handle = api.open(&c_path, config.use_recalibration);
        if handle == 0 {
            return Err(TsfError::Open(api.last_error_message()));
        }

        debug!(
            "Opened TSF analysis {} (handle {}, recalibration {})",
            utf8, handle, config.use_recalibration
        );

        Ok(Self {
            api,
            handle,
            line_capacity: capacity_hint(config.initial_line_capacity),
            profile_capacity: capacity_hint(config.initial_profile_capacity),
            max_read_attempts: config.max_read_attempts.max(1),
            _not_sync: PhantomData,
        })
    }

    /// Raw C-API handle of this session.
    ///
    /// Ownership stays with `self`; the handle is closed when `self` drops.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Current capacity hint for line spectrum reads.
    pub fn line_capacity(&self) -> usize {
        self.line_capacity
    }

    /// Current capacity hint for profile spectrum reads.
    pub fn profile_capacity(&self) -> usize {
        self.profile_capacity
    }

    /// Whether the library applied recalibration data to this analysis.
    pub fn has_recalibrated_state(&self) -> bool {
        // SAFETY: `self.handle` stays open until drop.
        unsafe { self.api.has_recalibrated_state(self.handle) != 0 }
    }

    /// Read a line spectrum (peak indices and intensities).
    pub fn read_line_spectrum(&mut self, spectrum_id: i64) -> Result<LineSpectrum> {
        let api = &self.api;
        let handle = self.handle;
        let result = read_negotiated(
            &mut self.line_capacity,
            self.max_read_attempts,
            |buf: &mut LineSpectrum| {
                // SAFETY: `handle` stays open until drop.
                unsafe {
                    api.read_line_spectrum(handle, spectrum_id, &mut buf.indices, &mut buf.intensities)
                }
            },
        );
        result.map_err(|failure| self.read_error(spectrum_id, failure))
    }

    /// Read a line spectrum including the width of each peak.
    ///
    /// Shares its capacity hint with [`TsfData::read_line_spectrum`].
    pub fn read_line_spectrum_with_width(&mut self, spectrum_id: i64) -> Result<LineSpectrumWithWidth> {
        let api = &self.api;
        let handle = self.handle;
        let result = read_negotiated(
            &mut self.line_capacity,
            self.max_read_attempts,
            |buf: &mut LineSpectrumWithWidth| {
                // SAFETY: `handle` stays open until drop.
                unsafe {
                    api.read_line_spectrum_with_width(
                        handle,
                        spectrum_id,
                        &mut buf.indices,
                        &mut buf.intensities,
                        &mut buf.widths,
                    )
                }
            },
        );
        result.map_err(|failure| self.read_error(spectrum_id, failure))
    }

    /// Read a profile spectrum (one count per sample index).
    pub fn read_profile_spectrum(&mut self, spectrum_id: i64) -> Result<ProfileSpectrum> {
        let api = &self.api;
        let handle = self.handle;
        let result = read_negotiated(
            &mut self.profile_capacity,
            self.max_read_attempts,
            |buf: &mut ProfileSpectrum| {
                // SAFETY: `handle` stays open until drop.
                unsafe { api.read_profile_spectrum(handle, spectrum_id, &mut buf.intensities) }
            },
        );
        result.map_err(|failure| self.read_error(spectrum_id, failure))
    }

    /// Read a line spectrum and convert its peak positions to m/z.
    ///
    /// For TSF data the spectrum id doubles as the frame id of the
    /// calibration used for the conversion.
    pub fn read_centroid_spectrum(&mut self, spectrum_id: i64) -> Result<CentroidSpectrum> {
        let line = self.read_line_spectrum(spectrum_id)?;
        let mz = self.index_to_mz(spectrum_id, &line.indices)?;
        Ok(CentroidSpectrum {
            mz,
            intensities: line.intensities,
        })
    }

    /// Convert sample indices to m/z using the calibration of `frame_id`.
    pub fn index_to_mz(&self, frame_id: i64, indices: &[f64]) -> Result<Vec<f64>> {
        self.transform(frame_id, indices, A::index_to_mz)
    }

    /// Convert m/z values to sample indices using the calibration of `frame_id`.
    pub fn mz_to_index(&self, frame_id: i64, mz: &[f64]) -> Result<Vec<f64>> {
        self.transform(frame_id, mz, A::mz_to_index)
    }

    fn transform(&self, frame_id: i64, input: &[f64], convert: Conversion<A>) -> Result<Vec<f64>> {
        // Empty and oversized inputs return here, before the library is called.
        let mut output = conversion_output(input.len())?;
        if output.is_empty() {
            return Ok(output);
        }

        // SAFETY: `self.handle` stays open until drop.
        unsafe { convert(&self.api, self.handle, frame_id, input, &mut output) };
        Ok(output)
    }

    fn read_error(&self, spectrum_id: i64, failure: NegotiationFailure) -> TsfError {
        match failure {
            NegotiationFailure::Library => TsfError::Read(self.api.last_error_message()),
            NegotiationFailure::Exhausted { required, attempts } => {
                warn!(
                    "Spectrum {}: library still asked for {} entries after {} reads",
                    spectrum_id, required, attempts
                );
                TsfError::BufferNegotiation { required, attempts }
            }
        }
    }
}

impl<A: TsfApi> Drop for TsfData<A> {
    fn drop(&mut self) {
        debug!("Closing TSF analysis (handle {})", self.handle);
        // SAFETY: the handle came from `open` and is closed only here.
        unsafe { self.api.close(self.handle) };
    }
}

/// Check that `len` values can be passed as the C interface's `uint32_t` count.
pub(crate) fn check_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| TsfError::InputTooLarge { len })
}

/// Zeroed output buffer for converting `len` values.
///
/// The count is checked before anything is allocated.
fn conversion_output(len: usize) -> Result<Vec<f64>> {
    check_count(len)?;
    Ok(vec![0.0; len])
}

/// Clamp a configured starting capacity to what the C interface can address.
fn capacity_hint(configured: usize) -> usize {
    match check_count(configured) {
        Ok(_) => configured,
        Err(_) => {
            warn!(
                "Starting capacity {} exceeds the library limit, using {}",
                configured,
                u32::MAX
            );
            u32::MAX as usize
        }
    }
}
