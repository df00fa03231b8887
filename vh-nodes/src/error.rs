use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodesError {
    #[error("node handle does not belong to this tree")]
    UnknownNode,
    #[error("node kind does not match tag {0:?}")]
    KindMismatch(crate::tag::NodeTag),
    #[error("{0} requires a {1:?} child")]
    MissingChild(&'static str, crate::tag::NodeTag),
    #[error("param index {0} has no bound value")]
    UnboundParam(u32),
    #[error("check failed: {0}")]
    CheckFailed(String),
}

pub type NodesResult<T> = Result<T, NodesError>;
