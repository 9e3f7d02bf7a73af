use thiserror::Error;

/// Canonical error taxonomy used across crates.
///
/// Classification guidance:
/// - [`Error::Parse`]: malformed field in one input record; recoverable, the
///   driver skips the record, bumps a counter, and keeps going
/// - [`Error::InvalidConfig`]: bad job configuration; fatal, detected before
///   any map or reduce work starts
/// - [`Error::Aggregation`]: finalize failed for a single key; aborts that
///   key only, sibling keys are unaffected
/// - [`Error::Partition`]: partition count of zero at the partition function
/// - [`Error::Shuffle`]: a shuffle channel closed underneath a worker
/// - [`Error::Codec`]: key byte encoding/decoding failure
/// - [`Error::Io`]: transparent std IO failures at the file edges
#[derive(Debug, Error)]
pub enum Error {
    /// One record carried a field the extractor could not parse.
    #[error("malformed {field} field: {reason}")]
    Parse {
        field: &'static str,
        reason: String,
    },

    /// Invalid or inconsistent job configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Finalizing one key's accumulator failed.
    #[error("aggregation error: {0}")]
    Aggregation(String),

    /// Partition function called with an unusable partition count.
    #[error("partition error: {0}")]
    Partition(String),

    /// A worker found its shuffle channel disconnected.
    #[error("shuffle channel error: {0}")]
    Shuffle(String),

    /// Key encoding or decoding failed.
    #[error("key codec error: {0}")]
    Codec(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for per-record errors the driver recovers from by skipping.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Standard result alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
