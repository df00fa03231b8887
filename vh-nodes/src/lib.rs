//! The query node tree: a tagged, arena-backed AST for SQL statements
//! (`SELECT`/`INSERT`/`UPDATE`/`DELETE`/`CREATE TABLE`) plus the
//! rendering pass that turns a tree back into SQL text. See
//! SPEC_FULL.md section 4.6.

pub mod context;
pub mod error;
pub mod kind;
pub mod render;
pub mod tag;
pub mod tree;

pub use context::{NodeSqlCmdContext, NumberedPlaceholder, ParamPlaceholder};
pub use error::{NodesError, NodesResult};
pub use kind::{
    ClusterPreference, DdlCommandNode, FieldExpr, FieldNode, FromNode, JoinKind, JoinNode,
    LimitNode, LockLevel, LockMode, NodeKind, OffsetNode, OrderByNode, QualNode, QualOp,
    QualOperand, QueryAction, QueryNode, SortDirection,
};
pub use render::to_sql_cmd;
pub use tag::NodeTag;
pub use tree::{NodeCopyState, NodeEntry, NodeHandle, NodeTree};
