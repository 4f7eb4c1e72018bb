//! # tsfdata - Bruker TSF reader bindings
//!
//! `tsfdata` wraps the C API of Bruker's `timsdata` library for TSF analyses
//! (timsTOF data acquired without ion mobility separation, e.g. MALDI or
//! plain LC-MS runs). The binary data and the calibration logic live in the
//! closed-source library; this crate owns the session handle, negotiates
//! buffer sizes with the library and turns its failure codes into errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsfdata::{TsfData, TsfLibrary};
//!
//! // Loads $TSFDATA_LIBRARY, or timsdata.dll / libtimsdata.so
//! let library = TsfLibrary::load_default()?;
//!
//! let mut tsf = TsfData::open(&library, "sample.d", false)?;
//!
//! let line = tsf.read_line_spectrum(1)?;
//! let mz = tsf.index_to_mz(1, &line.indices)?;
//! for (mz, intensity) in mz.iter().zip(&line.intensities) {
//!     println!("{:.4}\t{}", mz, intensity);
//! }
//!
//! let profile = tsf.read_profile_spectrum(1)?;
//! println!("Profile samples: {}", profile.len());
//! # Ok::<(), tsfdata::TsfError>(())
//! ```
//!
//! ## Buffer Negotiation
//!
//! The library's read functions take a caller-supplied buffer and report how
//! many entries the spectrum needs. [`TsfData`] keeps one capacity hint for
//! line spectra and one for profile spectra, grows the hint when the library
//! asks for more and retries. The hint persists between reads, so repeated
//! reads of similar spectra allocate once and call the library once.
//!
//! ## Architecture
//!
//! - [`api`]: the C surface as the [`TsfApi`] trait
//! - [`library`]: [`TsfLibrary`], the runtime-loaded vendor library
//! - [`reader`]: [`TsfData`], the session-owning reader
//! - [`spectrum`]: owned spectrum values
//! - [`error`]: [`TsfError`]

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod error;
pub mod library;
pub mod reader;
pub mod spectrum;

pub use api::TsfApi;
pub use error::{LibraryMessage, Result, TsfError};
pub use library::TsfLibrary;
pub use reader::{ReaderConfig, TsfData};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::api::TsfApi;
    pub use crate::error::{LibraryMessage, TsfError};
    pub use crate::library::{TsfLibrary, DEFAULT_LIBRARY_NAME, LIBRARY_ENV_VAR};
    pub use crate::reader::{ReaderConfig, TsfData};
    pub use crate::spectrum::{
        CentroidSpectrum, LineSpectrum, LineSpectrumWithWidth, ProfileSpectrum,
    };
}
