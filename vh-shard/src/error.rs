use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShardError {
    #[error("a beacon named {0:?} is already registered")]
    DuplicateName(String),
    #[error("no beacon named {0:?} is registered")]
    UnknownBeacon(String),
    #[error("beacon {0:?} failed to connect")]
    ConnectFailed(String),
    #[error("beacon {0:?} is not connected")]
    NotConnected(String),
}
