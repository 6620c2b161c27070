use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Handed out on the UI thread when a WAV is decoded; travels to the audio
/// thread with the buffer and is how pads refer to it afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(u64);

impl SampleId {
    pub fn next() -> Self {
        SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample#{}", self.0)
    }
}
