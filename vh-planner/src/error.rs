use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("query is malformed: {0}")]
    QueryMalformed(String),
    #[error("planning failed: {0}")]
    Planning(String),
    #[error("no beacon registered under {0:?}")]
    UnknownBeacon(String),
    #[error(transparent)]
    Nodes(#[from] vh_nodes::NodesError),
    #[error(transparent)]
    Catalog(#[from] vh_catalog::CatalogError),
    #[error(transparent)]
    Types(#[from] vh_types::TypeRegistryError),
}

pub type PlanResult<T> = Result<T, PlanError>;
