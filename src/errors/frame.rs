/// Reasons a serial line fails to become a decoded update.
///
/// All of these are transient: the offending frame is logged and dropped,
/// and ingestion continues. They never reach the persistence or hub layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame")]
    MalformedFrame,

    #[error("reserved field set in node info byte")]
    ReservedFieldSet,

    #[error("invalid byte value: {0:?}")]
    InvalidByteValue(String),

    #[error("unknown node kind code: {0}")]
    UnknownNodeKind(u8),

    #[error("unexpected payload length: got {actual} bytes, expected {expected}")]
    UnexpectedPayloadLength { expected: usize, actual: usize },
}
