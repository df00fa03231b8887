//! Per-tag node payloads. The original keeps one C struct per tag,
//! each embedding a `NodeData` header; here the header lives on
//! [`crate::tree::NodeEntry`] and each tag keeps only the fields that
//! struct added. Grounded on `NodeQuery.h`, `NodeQueryDelete.h`,
//! `NodeQueryUpdate.h`, and the forward-declared `NodeFieldData` /
//! `NodeFromData` / `NodeJoinData` / `NodeOrderByData` / `NodeQualData`
//! structs `Node.h` leaves opaque to its own translation unit.

use vh_catalog::TableId;
use vh_heap::HeapTuplePtr;
use vh_types::Value;

/// `QueryAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    BulkInsert,
    Delete,
    Insert,
    Update,
    Select,
    DdlCreateTable,
}

impl QueryAction {
    /// `vh_sqlq_iswrite`.
    pub fn is_write(&self) -> bool {
        !matches!(self, QueryAction::Select | QueryAction::DdlCreateTable)
    }

    /// `vh_sqlq_isddl`.
    pub fn is_ddl(&self) -> bool {
        matches!(self, QueryAction::DdlCreateTable)
    }

    /// `vh_sqlq_isread`.
    pub fn is_read(&self) -> bool {
        matches!(self, QueryAction::Select)
    }
}

/// `ClusterPreference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterPreference {
    #[default]
    Master,
    Slave,
}

/// `LockLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockLevel {
    #[default]
    None,
    ForUpdate,
    ForUpdateNoKey,
    Share,
    KeyShare,
}

/// `LockMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    Wait,
    NoWait,
}

/// `NodeQueryData`: the header every query-action node (`Select`,
/// `Insert`/`BulkInsert`, `Update`, `Delete`, DDL) carries. Its
/// children (field list, from list, qual tree, ...) live as ordinary
/// children in the tree rather than as named struct fields, the way
/// `NodeQueryDelete`/`NodeQueryUpdate` embed theirs.
#[derive(Debug, Clone)]
pub struct QueryNode {
    pub action: QueryAction,
    pub cluster_pref: ClusterPreference,
    pub has_temporary_tables: bool,
    pub lock_level: LockLevel,
    pub lock_mode: LockMode,
    /// `vh_sqlq_upd_htp` / `vh_sqlq_upd_htpl`: when non-empty, an
    /// Update or Delete targets these tuples directly rather than
    /// resolving its qual tree against the heap.
    pub target_htps: Vec<HeapTuplePtr>,
}

impl QueryNode {
    pub fn new(action: QueryAction) -> Self {
        QueryNode {
            action,
            cluster_pref: ClusterPreference::default(),
            has_temporary_tables: false,
            lock_level: LockLevel::default(),
            lock_mode: LockMode::default(),
            target_htps: Vec::new(),
        }
    }
}

/// A DDL statement. The spec's Non-goals exclude a full DDL planner;
/// this carries only what `to_sql_cmd` needs to render `CREATE TABLE`.
#[derive(Debug, Clone)]
pub struct DdlCommandNode {
    pub table: TableId,
    pub table_name: String,
    pub column_defs: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum FieldExpr {
    Column { table_alias: Option<String>, name: String },
    Star { table_alias: Option<String> },
    Param(u32),
    Literal(Value),
}

/// `NodeFieldData`. Doubles as a `SET` target when `assign_value` is
/// set (`NodeUpdateField` is forward-declared in `NodeQuery.h` but
/// never promoted to its own tag in `Node.h`'s enum).
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub expr: FieldExpr,
    pub output_alias: Option<String>,
    pub assign_value: Option<Value>,
}

impl FieldNode {
    pub fn column(name: impl Into<String>) -> Self {
        FieldNode {
            expr: FieldExpr::Column {
                table_alias: None,
                name: name.into(),
            },
            output_alias: None,
            assign_value: None,
        }
    }

    pub fn star() -> Self {
        FieldNode {
            expr: FieldExpr::Star { table_alias: None },
            output_alias: None,
            assign_value: None,
        }
    }

    /// `alias.*`, e.g. a join-preserving `orders.*`.
    pub fn qualified_star(table_alias: impl Into<String>) -> Self {
        FieldNode {
            expr: FieldExpr::Star { table_alias: Some(table_alias.into()) },
            output_alias: None,
            assign_value: None,
        }
    }

    pub fn assign(name: impl Into<String>, value: Value) -> Self {
        FieldNode {
            expr: FieldExpr::Column {
                table_alias: None,
                name: name.into(),
            },
            output_alias: None,
            assign_value: Some(value),
        }
    }
}

/// `NodeFromData`.
#[derive(Debug, Clone)]
pub struct FromNode {
    pub table: TableId,
    pub table_name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

/// `NodeJoinData`. The join condition is the node's sole `Qual` child.
#[derive(Debug, Clone)]
pub struct JoinNode {
    pub kind: JoinKind,
    pub table: TableId,
    pub table_name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `NodeOrderByData`.
#[derive(Debug, Clone)]
pub struct OrderByNode {
    pub field_name: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub struct LimitNode {
    pub count: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct OffsetNode {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// a user-level membership test; only ever seen with an
    /// [`QualOperand::HtpList`] rhs before the planner's flatten pass
    /// rewrites it to an `In` over [`QualOperand::ValueList`]
    In,
}

impl QualOp {
    pub fn is_boolean(&self) -> bool {
        matches!(self, QualOp::And | QualOp::Or)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QualOperand {
    Column(String),
    Param(u32),
    Literal(Value),
    /// `field IN <list-of-HeapTuplePtr>`, the user-level form the
    /// flatten pass consumes (SPEC_FULL.md section 4.8). Never reaches
    /// [`crate::render::to_sql_cmd`] directly -- flatten must rewrite
    /// it to a [`QualOperand::ValueList`] first.
    HtpList(Vec<HeapTuplePtr>),
    /// the back-end-renderable form flatten produces: a scalar value
    /// list extracted from the referenced table's key field.
    ValueList(Vec<Value>),
}

/// `NodeQualData`. For `And`/`Or`, `lhs`/`rhs` are unused and the
/// node's children (themselves `Qual` nodes) are the operands instead
/// -- the tree does the work the original's `SList` of sub-quals did.
#[derive(Debug, Clone)]
pub struct QualNode {
    pub op: QualOp,
    pub lhs: Option<QualOperand>,
    pub rhs: Option<QualOperand>,
}

impl QualNode {
    pub fn comparison(op: QualOp, lhs: QualOperand, rhs: QualOperand) -> Self {
        assert!(!op.is_boolean(), "comparison qual cannot use a boolean op");
        QualNode {
            op,
            lhs: Some(lhs),
            rhs: Some(rhs),
        }
    }

    pub fn boolean(op: QualOp) -> Self {
        assert!(op.is_boolean(), "boolean qual requires And/Or");
        QualNode { op, lhs: None, rhs: None }
    }

    /// `field IN <htps>`, prior to flattening.
    pub fn htp_in(field: impl Into<String>, htps: Vec<HeapTuplePtr>) -> Self {
        QualNode {
            op: QualOp::In,
            lhs: Some(QualOperand::Column(field.into())),
            rhs: Some(QualOperand::HtpList(htps)),
        }
    }
}

/// Per-tag payload. List-shaped tags (`FieldList`, `FromList`,
/// `JoinList`, `Where`, `OrderByList`, `QualList`, `With`) carry no
/// data of their own -- they exist only to group children -- so they
/// have no variant here; `NodeTree` stores them with `NodeKind::Group`.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Query(QueryNode),
    DdlCommand(DdlCommandNode),
    Field(FieldNode),
    From(FromNode),
    Join(JoinNode),
    OrderBy(OrderByNode),
    Limit(LimitNode),
    Offset(OffsetNode),
    Qual(QualNode),
}
