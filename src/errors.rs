use thiserror::Error;

/// Result type of this crate.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while reading or writing a capture file.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// An I/O error occurred on the underlying source or sink.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The first bytes of the stream don't match any supported capture format.
    #[error("Unrecognized capture format, magic number: {0:#010X}")]
    UnsupportedFormat(u32),

    /// The stream announced a Zstandard frame but the frame could not be decoded.
    #[error("Malformed or truncated Zstandard frame")]
    Decompression(#[source] std::io::Error),

    /// A pcap record header or payload was cut short.
    ///
    /// Distinct from a clean end of stream: a partially written record signals
    /// a corrupt file, not a valid end.
    #[error("Truncated record: {0}")]
    TruncatedRecord(&'static str),

    /// A pcapng block is structurally inconsistent.
    #[error("Corrupt block: {0}")]
    CorruptBlock(&'static str),

    /// A field of the capture file holds an invalid value.
    #[error("Invalid field: {0}")]
    InvalidField(&'static str),

    /// An interface lookup was out of range of the interface table.
    #[error("No interface with index {0}")]
    InterfaceIndexOutOfRange(usize),

    /// The packet cannot be represented in the selected output format.
    #[error("Unsupported write: {0}")]
    UnsupportedWrite(&'static str),
}
