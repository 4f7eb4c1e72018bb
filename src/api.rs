//! The TSF reader C surface, expressed as a trait.
//!
//! [`TsfApi`] mirrors the functions exported by the vendor library one to one.
//! Buffers are passed as slices; the capacity handed to the C side is the
//! slice length. [`crate::library::TsfLibrary`] implements it on top of the
//! real shared library, and tests implement it with a simulated one.
//!
//! Every function that takes a session handle is `unsafe`: the library
//! cannot tell a live handle from a closed or made-up one. [`crate::TsfData`]
//! is the safe way to use a session.
//!
//! ```compile_fail
//! use tsfdata::{TsfApi, TsfLibrary};
//!
//! fn close_twice(library: &TsfLibrary, handle: u64) {
//!     // Calling a handle function needs `unsafe`.
//!     library.close(handle);
//! }
//! ```

use std::ffi::CStr;

use crate::error::LibraryMessage;

/// Functions of the TSF reader C API.
///
/// Return values follow the C conventions: `open` returns 0 on failure and the
/// read functions return 0 on failure or the number of entries they need.
///
/// # Safety
///
/// For every method taking a `handle`, callers must pass a handle returned by
/// [`TsfApi::open`] on the same library that has not been closed yet, and
/// must not call [`TsfApi::close`] on it more than once.
pub trait TsfApi {
    /// `tsf_open`: open an analysis directory, returning 0 on error.
    fn open(&self, analysis_directory: &CStr, use_recalibration: bool) -> u64;

    /// `tsf_close`: release a handle returned by [`TsfApi::open`].
    ///
    /// # Safety
    /// `handle` must be open; it is invalid afterwards.
    unsafe fn close(&self, handle: u64);

    /// `tsf_get_last_error_string`: copy the last error message into `buf`
    /// (truncating if needed) and return the length required to hold it,
    /// including the NUL terminator.
    fn last_error_string(&self, buf: &mut [u8]) -> u32;

    /// `tsf_has_recalibrated_state`: non-zero if recalibration is in use.
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn has_recalibrated_state(&self, handle: u64) -> u32;

    /// `tsf_read_line_spectrum`
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn read_line_spectrum(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
    ) -> u32;

    /// `tsf_read_line_spectrum_with_width`
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn read_line_spectrum_with_width(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
        widths: &mut [f32],
    ) -> u32;

    /// `tsf_read_profile_spectrum`
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn read_profile_spectrum(&self, handle: u64, spectrum_id: i64, profile: &mut [u32]) -> u32;

    /// `tsf_index_to_mz`: `input` and `output` have equal length.
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn index_to_mz(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]);

    /// `tsf_mz_to_index`: `input` and `output` have equal length.
    ///
    /// # Safety
    /// `handle` must be open.
    unsafe fn mz_to_index(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]);

    /// Fetch the library's last error message.
    ///
    /// Asks once for the required length and once more to fill a buffer of
    /// exactly that size.
    fn last_error_message(&self) -> LibraryMessage {
        let len = self.last_error_string(&mut [0u8; 0]) as usize;
        let mut buf = vec![0u8; len];
        self.last_error_string(&mut buf);
        LibraryMessage::from_c_bytes(&buf)
    }
}

impl<T: TsfApi + ?Sized> TsfApi for &T {
    fn open(&self, analysis_directory: &CStr, use_recalibration: bool) -> u64 {
        (**self).open(analysis_directory, use_recalibration)
    }

    unsafe fn close(&self, handle: u64) {
        (**self).close(handle)
    }

    fn last_error_string(&self, buf: &mut [u8]) -> u32 {
        (**self).last_error_string(buf)
    }

    unsafe fn has_recalibrated_state(&self, handle: u64) -> u32 {
        (**self).has_recalibrated_state(handle)
    }

    unsafe fn read_line_spectrum(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
    ) -> u32 {
        (**self).read_line_spectrum(handle, spectrum_id, indices, intensities)
    }

    unsafe fn read_line_spectrum_with_width(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
        widths: &mut [f32],
    ) -> u32 {
        (**self).read_line_spectrum_with_width(handle, spectrum_id, indices, intensities, widths)
    }

    unsafe fn read_profile_spectrum(&self, handle: u64, spectrum_id: i64, profile: &mut [u32]) -> u32 {
        (**self).read_profile_spectrum(handle, spectrum_id, profile)
    }

    unsafe fn index_to_mz(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        (**self).index_to_mz(handle, frame_id, input, output)
    }

    unsafe fn mz_to_index(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        (**self).mz_to_index(handle, frame_id, input, output)
    }
}
