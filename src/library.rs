//! Runtime binding to Bruker's `timsdata` shared library.
//!
//! The TSF functions live in the same library as the TDF ones
//! (`timsdata.dll` on Windows, `libtimsdata.so` on Linux). The library is
//! loaded with `libloading` and every symbol is resolved up front, so a
//! missing export is reported when loading rather than on first use.

use std::ffi::{c_char, CStr, OsStr, OsString};
use std::path::Path;

use libloading::{Library, Symbol};
use log::debug;

use crate::api::TsfApi;
use crate::error::Result;

/// Environment variable that overrides the library location.
pub const LIBRARY_ENV_VAR: &str = "TSFDATA_LIBRARY";

/// Platform file name of the vendor library.
#[cfg(windows)]
pub const DEFAULT_LIBRARY_NAME: &str = "timsdata.dll";
/// Platform file name of the vendor library.
#[cfg(not(windows))]
pub const DEFAULT_LIBRARY_NAME: &str = "libtimsdata.so";

type OpenFn = unsafe extern "C" fn(*const c_char, u32) -> u64;
type CloseFn = unsafe extern "C" fn(u64);
type LastErrorFn = unsafe extern "C" fn(*mut c_char, u32) -> u32;
type HasRecalibratedStateFn = unsafe extern "C" fn(u64) -> u32;
type ReadLineSpectrumFn = unsafe extern "C" fn(u64, i64, *mut f64, *mut f32, u32) -> u32;
type ReadLineSpectrumWithWidthFn =
    unsafe extern "C" fn(u64, i64, *mut f64, *mut f32, *mut f32, u32) -> u32;
type ReadProfileSpectrumFn = unsafe extern "C" fn(u64, i64, *mut u32, u32) -> u32;
type ConversionFn = unsafe extern "C" fn(u64, i64, *const f64, *mut f64, u32);
type SetNumThreadsFn = unsafe extern "C" fn(u32);

/// Handle to a loaded `timsdata` library with all TSF entry points resolved.
pub struct TsfLibrary {
    open: OpenFn,
    close: CloseFn,
    last_error_string: LastErrorFn,
    has_recalibrated_state: HasRecalibratedStateFn,
    read_line_spectrum: ReadLineSpectrumFn,
    read_line_spectrum_with_width: ReadLineSpectrumWithWidthFn,
    read_profile_spectrum: ReadProfileSpectrumFn,
    index_to_mz: ConversionFn,
    mz_to_index: ConversionFn,
    set_num_threads: SetNumThreadsFn,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl std::fmt::Debug for TsfLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsfLibrary").finish_non_exhaustive()
    }
}

/// Resolve `name` and copy the function pointer out of the symbol.
///
/// # Safety
/// `T` must match the C signature of the exported symbol.
unsafe fn resolve<T: Copy>(library: &Library, name: &[u8]) -> Result<T> {
    let symbol: Symbol<T> = library.get(name)?;
    Ok(*symbol)
}

impl TsfLibrary {
    /// Load the library from an explicit path (or bare file name, resolved by
    /// the platform loader).
    ///
    /// # Errors
    /// `TsfError::Library` if the file cannot be loaded or a TSF symbol is
    /// missing.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading timsdata library from {}", Path::new(path).display());

        // SAFETY: loading the vendor library runs its initializers; there is
        // no way to check them from here. The symbol types below match the
        // declarations in tsfdata.h.
        unsafe {
            let library = Library::new(path)?;
            Ok(Self {
                open: resolve(&library, b"tsf_open\0")?,
                close: resolve(&library, b"tsf_close\0")?,
                last_error_string: resolve(&library, b"tsf_get_last_error_string\0")?,
                has_recalibrated_state: resolve(&library, b"tsf_has_recalibrated_state\0")?,
                read_line_spectrum: resolve(&library, b"tsf_read_line_spectrum\0")?,
                read_line_spectrum_with_width: resolve(
                    &library,
                    b"tsf_read_line_spectrum_with_width\0",
                )?,
                read_profile_spectrum: resolve(&library, b"tsf_read_profile_spectrum\0")?,
                index_to_mz: resolve(&library, b"tsf_index_to_mz\0")?,
                mz_to_index: resolve(&library, b"tsf_mz_to_index\0")?,
                set_num_threads: resolve(&library, b"tsf_set_num_threads\0")?,
                _library: library,
            })
        }
    }

    /// Load the library from `$TSFDATA_LIBRARY`, or by its platform name.
    pub fn load_default() -> Result<Self> {
        Self::load(default_library_path())
    }

    /// Set the number of worker threads the vendor library may use.
    ///
    /// This is a process-wide setting of the library, not of a session.
    pub fn set_num_threads(&self, num_threads: u32) {
        debug!("Setting timsdata thread count to {}", num_threads);
        // SAFETY: plain value argument.
        unsafe { (self.set_num_threads)(num_threads) }
    }
}

/// Library location used by [`TsfLibrary::load_default`].
pub fn default_library_path() -> OsString {
    std::env::var_os(LIBRARY_ENV_VAR).unwrap_or_else(|| OsString::from(DEFAULT_LIBRARY_NAME))
}

fn capacity(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl TsfApi for TsfLibrary {
    fn open(&self, analysis_directory: &CStr, use_recalibration: bool) -> u64 {
        // SAFETY: the path is NUL-terminated and outlives the call.
        unsafe { (self.open)(analysis_directory.as_ptr(), u32::from(use_recalibration)) }
    }

    unsafe fn close(&self, handle: u64) {
        // SAFETY: the caller guarantees `handle` is open and closes it once.
        unsafe { (self.close)(handle) }
    }

    fn last_error_string(&self, buf: &mut [u8]) -> u32 {
        let ptr = if buf.is_empty() {
            std::ptr::null_mut()
        } else {
            buf.as_mut_ptr().cast::<c_char>()
        };
        // SAFETY: the library writes at most `buf.len()` bytes.
        unsafe { (self.last_error_string)(ptr, capacity(buf.len())) }
    }

    unsafe fn has_recalibrated_state(&self, handle: u64) -> u32 {
        // SAFETY: the caller guarantees `handle` is open.
        unsafe { (self.has_recalibrated_state)(handle) }
    }

    unsafe fn read_line_spectrum(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
    ) -> u32 {
        let len = capacity(indices.len().min(intensities.len()));
        // SAFETY: `handle` is open (caller contract); both buffers hold `len` entries.
        unsafe {
            (self.read_line_spectrum)(
                handle,
                spectrum_id,
                indices.as_mut_ptr(),
                intensities.as_mut_ptr(),
                len,
            )
        }
    }

    unsafe fn read_line_spectrum_with_width(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
        widths: &mut [f32],
    ) -> u32 {
        let len = capacity(indices.len().min(intensities.len()).min(widths.len()));
        // SAFETY: `handle` is open (caller contract); all buffers hold `len` entries.
        unsafe {
            (self.read_line_spectrum_with_width)(
                handle,
                spectrum_id,
                indices.as_mut_ptr(),
                intensities.as_mut_ptr(),
                widths.as_mut_ptr(),
                len,
            )
        }
    }

    unsafe fn read_profile_spectrum(&self, handle: u64, spectrum_id: i64, profile: &mut [u32]) -> u32 {
        // SAFETY: `handle` is open (caller contract); the buffer holds `profile.len()` entries.
        unsafe {
            (self.read_profile_spectrum)(
                handle,
                spectrum_id,
                profile.as_mut_ptr(),
                capacity(profile.len()),
            )
        }
    }

    unsafe fn index_to_mz(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        let len = capacity(input.len().min(output.len()));
        // SAFETY: `handle` is open (caller contract); both buffers hold `len` entries.
        unsafe { (self.index_to_mz)(handle, frame_id, input.as_ptr(), output.as_mut_ptr(), len) }
    }

    unsafe fn mz_to_index(&self, handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        let len = capacity(input.len().min(output.len()));
        // SAFETY: `handle` is open (caller contract); both buffers hold `len` entries.
        unsafe { (self.mz_to_index)(handle, frame_id, input.as_ptr(), output.as_mut_ptr(), len) }
    }
}
