use super::*;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CStr;

/// In-memory stand-in for the vendor library.
///
/// Spectrum `id` holds `peaks[id]`; unknown ids fail with a message the way
/// the real library does.
#[derive(Default)]
struct SimulatedLibrary {
    refuse_open: bool,
    peaks: HashMap<i64, Vec<(f64, f32, f32)>>,
    profiles: HashMap<i64, Vec<u32>>,
    last_error: RefCell<String>,
    opened_paths: RefCell<Vec<String>>,
    closed: RefCell<Vec<u64>>,
    read_capacities: RefCell<Vec<usize>>,
    conversions: Cell<usize>,
    recalibrated: bool,
}

const HANDLE: u64 = 0x7f00_0001;

impl SimulatedLibrary {
    fn with_spectrum(mut self, id: i64, n: usize) -> Self {
        let peaks = (0..n)
            .map(|i| (1000.0 + i as f64, 10.0 * (i + 1) as f32, 0.5))
            .collect();
        self.peaks.insert(id, peaks);
        self
    }

    fn with_profile(mut self, id: i64, n: usize) -> Self {
        self.profiles.insert(id, (0..n as u32).collect());
        self
    }

    fn fail(&self, message: String) -> u32 {
        *self.last_error.borrow_mut() = message;
        0
    }
}

impl TsfApi for SimulatedLibrary {
    fn open(&self, analysis_directory: &CStr, _use_recalibration: bool) -> u64 {
        let path = analysis_directory.to_string_lossy().into_owned();
        self.opened_paths.borrow_mut().push(path.clone());
        if self.refuse_open {
            self.fail(format!("{}: analysis.tsf not found", path));
            return 0;
        }
        HANDLE
    }

    unsafe fn close(&self, handle: u64) {
        self.closed.borrow_mut().push(handle);
    }

    fn last_error_string(&self, buf: &mut [u8]) -> u32 {
        let message = self.last_error.borrow();
        let mut bytes = message.as_bytes().to_vec();
        bytes.push(0);
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.len() as u32
    }

    unsafe fn has_recalibrated_state(&self, _handle: u64) -> u32 {
        u32::from(self.recalibrated)
    }

    unsafe fn read_line_spectrum(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
    ) -> u32 {
        assert_eq!(handle, HANDLE);
        assert_eq!(indices.len(), intensities.len());
        self.read_capacities.borrow_mut().push(indices.len());
        let Some(peaks) = self.peaks.get(&spectrum_id) else {
            return self.fail(format!("spectrum {} out of range", spectrum_id));
        };
        for (i, &(index, intensity, _)) in peaks.iter().enumerate().take(indices.len()) {
            indices[i] = index;
            intensities[i] = intensity;
        }
        peaks.len() as u32
    }

    unsafe fn read_line_spectrum_with_width(
        &self,
        handle: u64,
        spectrum_id: i64,
        indices: &mut [f64],
        intensities: &mut [f32],
        widths: &mut [f32],
    ) -> u32 {
        assert_eq!(handle, HANDLE);
        self.read_capacities.borrow_mut().push(indices.len());
        let Some(peaks) = self.peaks.get(&spectrum_id) else {
            return self.fail(format!("spectrum {} out of range", spectrum_id));
        };
        for (i, &(index, intensity, width)) in peaks.iter().enumerate().take(indices.len()) {
            indices[i] = index;
            intensities[i] = intensity;
            widths[i] = width;
        }
        peaks.len() as u32
    }

    unsafe fn read_profile_spectrum(&self, handle: u64, spectrum_id: i64, profile: &mut [u32]) -> u32 {
        assert_eq!(handle, HANDLE);
        self.read_capacities.borrow_mut().push(profile.len());
        let Some(values) = self.profiles.get(&spectrum_id) else {
            return self.fail(format!("no profile data for spectrum {}", spectrum_id));
        };
        let n = values.len().min(profile.len());
        profile[..n].copy_from_slice(&values[..n]);
        values.len() as u32
    }

    unsafe fn index_to_mz(&self, _handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        self.conversions.set(self.conversions.get() + 1);
        for (out, index) in output.iter_mut().zip(input) {
            *out = 100.0 + index * 0.01 + frame_id as f64;
        }
    }

    unsafe fn mz_to_index(&self, _handle: u64, frame_id: i64, input: &[f64], output: &mut [f64]) {
        self.conversions.set(self.conversions.get() + 1);
        for (out, mz) in output.iter_mut().zip(input) {
            *out = (mz - 100.0 - frame_id as f64) / 0.01;
        }
    }
}

#[test]
fn test_open_and_close_once() {
    let library = SimulatedLibrary::default();
    {
        let tsf = TsfData::open(&library, "/data/sample.d", false).unwrap();
        assert_eq!(tsf.handle(), HANDLE);
        assert!(library.closed.borrow().is_empty());
    }
    assert_eq!(*library.opened_paths.borrow(), vec!["/data/sample.d".to_string()]);
    assert_eq!(*library.closed.borrow(), vec![HANDLE]);
}

#[test]
fn test_open_failure_reports_library_message() {
    let library = SimulatedLibrary {
        refuse_open: true,
        ..Default::default()
    };

    let err = TsfData::open(&library, "missing.d", true).unwrap_err();
    assert!(matches!(err, TsfError::Open(_)));
    assert_eq!(err.library_message(), Some("missing.d: analysis.tsf not found"));
    assert!(library.closed.borrow().is_empty());
}

#[test]
fn test_open_rejects_nul_in_path() {
    let library = SimulatedLibrary::default();
    let err = TsfData::open(&library, "bad\0path.d", false).unwrap_err();
    assert!(matches!(err, TsfError::InvalidPath(_)));
    assert!(library.opened_paths.borrow().is_empty());
}

#[test]
fn test_line_spectrum_fits_default_capacity() {
    let library = SimulatedLibrary::default().with_spectrum(1, 5);
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let spectrum = tsf.read_line_spectrum(1).unwrap();
    assert_eq!(spectrum.len(), 5);
    assert_eq!(spectrum.intensities.len(), 5);
    assert_eq!(spectrum.indices[4], 1004.0);
    assert_eq!(*library.read_capacities.borrow(), vec![128]);
    assert_eq!(tsf.line_capacity(), 128);
}

#[test]
fn test_line_spectrum_grows_with_one_retry() {
    let library = SimulatedLibrary::default().with_spectrum(7, 300);
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let spectrum = tsf.read_line_spectrum(7).unwrap();
    assert_eq!(spectrum.len(), 300);
    assert_eq!(spectrum.intensities[299], 3000.0);
    assert_eq!(*library.read_capacities.borrow(), vec![128, 300]);
    assert_eq!(tsf.line_capacity(), 300);

    // The grown capacity sticks, so the next read needs a single call.
    tsf.read_line_spectrum(7).unwrap();
    assert_eq!(*library.read_capacities.borrow(), vec![128, 300, 300]);
}

#[test]
fn test_line_reads_share_capacity() {
    let library = SimulatedLibrary::default()
        .with_spectrum(1, 200)
        .with_profile(1, 10);
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    tsf.read_line_spectrum(1).unwrap();
    let with_width = tsf.read_line_spectrum_with_width(1).unwrap();
    assert_eq!(with_width.len(), 200);
    assert_eq!(with_width.widths.len(), 200);
    assert_eq!(with_width.intensities.len(), 200);
    assert_eq!(*library.read_capacities.borrow(), vec![128, 200, 200]);

    // Profile reads keep their own hint, starting from zero.
    assert_eq!(tsf.profile_capacity(), 0);
    tsf.read_profile_spectrum(1).unwrap();
    assert_eq!(tsf.profile_capacity(), 10);
    assert_eq!(tsf.line_capacity(), 200);
}

#[test]
fn test_profile_spectrum() {
    let library = SimulatedLibrary::default().with_profile(3, 1024);
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let profile = tsf.read_profile_spectrum(3).unwrap();
    assert_eq!(profile.len(), 1024);
    assert_eq!(profile.intensities[1023], 1023);
    assert_eq!(*library.read_capacities.borrow(), vec![0, 1024]);
}

#[test]
fn test_read_failure_carries_exact_message() {
    let library = SimulatedLibrary::default();
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let err = tsf.read_line_spectrum(42).unwrap_err();
    assert!(matches!(err, TsfError::Read(_)));
    assert_eq!(err.library_message(), Some("spectrum 42 out of range"));

    let err = tsf.read_profile_spectrum(42).unwrap_err();
    assert_eq!(err.library_message(), Some("no profile data for spectrum 42"));
}

#[test]
fn test_configured_capacities() {
    let library = SimulatedLibrary::default()
        .with_spectrum(1, 300)
        .with_profile(1, 50);
    let config = ReaderConfig::default()
        .with_line_capacity(512)
        .with_profile_capacity(64);
    let mut tsf = TsfData::open_with_config(&library, "sample.d", &config).unwrap();

    tsf.read_line_spectrum(1).unwrap();
    tsf.read_profile_spectrum(1).unwrap();
    assert_eq!(*library.read_capacities.borrow(), vec![512, 64]);
}

#[test]
fn test_conversion_round_trip_lengths() {
    let library = SimulatedLibrary::default();
    let tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let mz = tsf.index_to_mz(2, &[0.0, 1000.0, 25000.0]).unwrap();
    assert_eq!(mz.len(), 3);
    assert!((mz[1] - 112.0).abs() < 1e-9);

    let indices = tsf.mz_to_index(2, &mz).unwrap();
    assert_eq!(indices.len(), 3);
    assert!((indices[2] - 25000.0).abs() < 1e-6);
    assert_eq!(library.conversions.get(), 2);
}

#[test]
fn test_empty_conversion_skips_library() {
    let library = SimulatedLibrary::default();
    let tsf = TsfData::open(&library, "sample.d", false).unwrap();

    assert!(tsf.index_to_mz(1, &[]).unwrap().is_empty());
    assert!(tsf.mz_to_index(1, &[]).unwrap().is_empty());
    assert_eq!(library.conversions.get(), 0);
}

#[test]
fn test_centroid_spectrum_uses_spectrum_calibration() {
    let library = SimulatedLibrary::default().with_spectrum(4, 3);
    let mut tsf = TsfData::open(&library, "sample.d", false).unwrap();

    let centroid = tsf.read_centroid_spectrum(4).unwrap();
    assert_eq!(centroid.len(), 3);
    assert_eq!(centroid.intensities, vec![10.0, 20.0, 30.0]);
    assert!((centroid.mz[0] - 114.0).abs() < 1e-9);
}

#[test]
fn test_recalibrated_state() {
    let library = SimulatedLibrary {
        recalibrated: true,
        ..Default::default()
    };
    let tsf = TsfData::open(&library, "sample.d", true).unwrap();
    assert!(tsf.has_recalibrated_state());
}

#[test]
fn test_count_limit() {
    assert_eq!(check_count(0).unwrap(), 0);
    assert_eq!(check_count(u32::MAX as usize).unwrap(), u32::MAX);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_count_limit_exceeded() {
    let len = u32::MAX as usize + 1;
    let err = check_count(len).unwrap_err();
    assert!(matches!(err, TsfError::InputTooLarge { len: l } if l == len));
}

#[test]
fn test_conversion_output_sized_to_input() {
    assert!(conversion_output(0).unwrap().is_empty());
    assert_eq!(conversion_output(5).unwrap(), vec![0.0; 5]);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_conversion_output_rejects_oversized_input() {
    // Rejected on the length alone, before any allocation.
    let len = u32::MAX as usize + 1;
    let err = conversion_output(len).unwrap_err();
    assert!(matches!(err, TsfError::InputTooLarge { len: l } if l == len));
}

#[test]
fn test_capacity_hint_within_limit() {
    assert_eq!(capacity_hint(0), 0);
    assert_eq!(capacity_hint(128), 128);
    assert_eq!(capacity_hint(u32::MAX as usize), u32::MAX as usize);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_oversized_configured_capacity_is_clamped() {
    assert_eq!(capacity_hint(usize::MAX), u32::MAX as usize);

    let library = SimulatedLibrary::default();
    let config = ReaderConfig::default()
        .with_line_capacity(usize::MAX)
        .with_profile_capacity(u32::MAX as usize + 1);
    let tsf = TsfData::open_with_config(&library, "sample.d", &config).unwrap();
    assert_eq!(tsf.line_capacity(), u32::MAX as usize);
    assert_eq!(tsf.profile_capacity(), u32::MAX as usize);
}
