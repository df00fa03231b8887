use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("a table named {0:?} is already registered")]
    DuplicateTableName(String),
    #[error("no table named {0:?} is registered")]
    UnknownTableName(String),
    #[error("unknown table handle")]
    UnknownTable,
    #[error("a field named {0:?} already exists on this table version")]
    DuplicateFieldName(String),
    #[error("no field named {0:?} on this table version")]
    UnknownFieldName(String),
    #[error("unknown table version")]
    UnknownVersion,
    #[error("a table relationship may carry at most {max} quals")]
    TooManyQuals { max: usize },
    #[error("prep column {0:?} could not resolve any search path result")]
    PrepColUnresolved(String),
}
