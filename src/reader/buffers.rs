//! Buffer-growing read loop shared by all spectrum reads.

use log::debug;

use crate::spectrum::SpectrumBuffers;

/// Why a size-negotiated read gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NegotiationFailure {
    /// The library returned 0; its last error message explains why.
    Library,
    /// Every attempt asked for more room than the previous one offered.
    Exhausted { required: usize, attempts: usize },
}

/// Run `read` until the buffers are large enough for the library.
///
/// `read` receives buffers resized to `*capacity` and returns the length the
/// library needs. On success the buffers are truncated to exactly that length
/// and `*capacity` is left at a value that fits it, so the next read of the
/// same kind usually succeeds on the first call.
pub(super) fn read_negotiated<B, F>(
    capacity: &mut usize,
    max_attempts: usize,
    mut read: F,
) -> Result<B, NegotiationFailure>
where
    B: SpectrumBuffers,
    F: FnMut(&mut B) -> u32,
{
    let mut buffers = B::default();
    let mut required = 0;

    for attempt in 1..=max_attempts.max(1) {
        buffers.resize(*capacity);
        required = read(&mut buffers) as usize;

        if required == 0 {
            return Err(NegotiationFailure::Library);
        }

        if *capacity >= required {
            buffers.resize(required);
            return Ok(buffers);
        }

        debug!(
            "Growing read buffer from {} to {} entries (attempt {})",
            capacity, required, attempt
        );
        *capacity = required;
    }

    Err(NegotiationFailure::Exhausted {
        required,
        attempts: max_attempts.max(1),
    })
}
