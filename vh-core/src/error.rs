//! `CoreError`: the top-level error taxonomy every `CatalogContext`
//! call returns. Composes each crate's own error enum rather than
//! re-deriving the same variants, per SPEC_FULL.md section 7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Types(#[from] vh_types::TypeRegistryError),
    #[error(transparent)]
    Op(#[from] vh_types::OpError),
    #[error(transparent)]
    Heap(#[from] vh_heap::HeapError),
    #[error(transparent)]
    Shard(#[from] vh_shard::ShardError),
    #[error(transparent)]
    Catalog(#[from] vh_catalog::CatalogError),
    #[error(transparent)]
    Nodes(#[from] vh_nodes::NodesError),
    #[error(transparent)]
    Plan(#[from] vh_planner::PlanError),
    #[error(transparent)]
    Config(#[from] vh_config::ConfigError),
    /// `MemoryExhausted`/`FATAL`/`PANIC` from spec.md section 7: the
    /// context is no longer usable once this is returned.
    #[error("fatal: {0}")]
    Fatal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
