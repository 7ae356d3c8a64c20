/// Progress update emitted while one file is streamed to disk.
///
/// Samples are ephemeral. The last sample of a fetch carries the final byte
/// count and the average rate over the whole transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    pub file_name: String,
    /// Content length announced by the server, if any.
    pub total_bytes: Option<u64>,
    pub bytes_received: u64,
    /// Transfer rate, `None` until a measurement window has elapsed.
    pub bytes_per_second: Option<f64>,
}

impl ProgressSample {
    pub fn started(file_name: impl Into<String>, total_bytes: Option<u64>) -> Self {
        Self {
            file_name: file_name.into(),
            total_bytes,
            bytes_received: 0,
            bytes_per_second: None,
        }
    }

    /// Returns the progress percentage (0.0 to 100.0) if calculable.
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.bytes_received as f64 / total as f64 * 100.0),
            _ => None,
        }
    }
}

/// Receiver for progress samples.
///
/// Implemented for any `Fn(ProgressSample)` closure, so callers usually pass
/// a closure that forwards into a channel or a progress bar.
pub trait ProgressSink: Send + Sync {
    fn report(&self, sample: ProgressSample);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressSample) + Send + Sync,
{
    fn report(&self, sample: ProgressSample) {
        self(sample)
    }
}
