use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("truncated input: needed {needed} bytes, read {read}")]
    Truncated { needed: usize, read: usize },
    #[error("varint overflow")]
    VarintOverflow,
    #[error("field of {requested} bytes exceeds scratch capacity of {capacity} bytes")]
    BufferTooSmall { requested: u64, capacity: usize },
    #[error("date out of range: {0} days since epoch")]
    DateOutOfRange(i64),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for `Truncated` and `Io`: the source ran dry or failed, so no
    /// further field can be decoded from this session.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(self, Error::Truncated { .. } | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
