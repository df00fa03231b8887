use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not enough bytes to decode, expected {expected}, got {actual}")]
    NotEnoughBytes { expected: usize, actual: usize },
    #[error("invalid size of bytes to decode, expected a multiple of {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
    #[error("page is full: need {needed} bytes, {available} available")]
    PageFull { needed: u16, available: u16 },
    #[error("item {0} is not present on this page")]
    UnknownItem(u16),
    #[error("heap tuple pointer {0:?} does not resolve to a known buffer")]
    UnknownBuffer(crate::htp::HeapTuplePtr),
    #[error("heap tuple pointer {0:?} does not resolve to a known page")]
    UnknownBlock(crate::htp::HeapTuplePtr),
}

pub type HeapResult<T> = Result<T, HeapError>;
