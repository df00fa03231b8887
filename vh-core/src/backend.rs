//! `BackEndDriver`: the contract an embedding application supplies;
//! the core only ever calls through it, never implements it. Grounded
//! on the driver surface in spec.md section 6 -- `createConn/freeConn`,
//! `connect/disconnect`, the transaction trio, `exec`, `command`,
//! `param`, `loadSchema`.

use vh_catalog::TableCatalog;
use vh_heap::HeapTuple;
use vh_nodes::{NodeHandle, NodeSqlCmdContext, NodeTree};
use vh_planner::ExecStepGroup;
use vh_types::{TypeStack, Value};

use crate::error::CoreResult;

/// Connection credentials. Wiped on drop so a crashed process doesn't
/// leave them sitting in a core dump any longer than necessary.
#[derive(Clone)]
pub struct BackEndCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Drop for BackEndCredentials {
    fn drop(&mut self) {
        self.username.clear();
        self.password.clear();
        self.host.clear();
        self.database.clear();
    }
}

/// Implemented once per back-end (PostgreSQL, a mock for tests, ...).
/// `Connection`/`ParameterHandle` are associated types so a driver can
/// use whatever shape its own wire protocol needs without the core
/// dictating a concrete connection struct.
pub trait BackEndDriver {
    type Connection;
    type ParameterHandle;

    fn create_conn(&mut self) -> CoreResult<Self::Connection>;
    fn free_conn(&mut self, conn: Self::Connection);

    fn connect(&mut self, conn: &mut Self::Connection, credentials: &BackEndCredentials) -> CoreResult<()>;
    fn disconnect(&mut self, conn: &mut Self::Connection) -> CoreResult<()>;

    fn xact_begin(&mut self, conn: &mut Self::Connection) -> CoreResult<()>;
    fn xact_commit(&mut self, conn: &mut Self::Connection) -> CoreResult<()>;
    fn xact_rollback(&mut self, conn: &mut Self::Connection) -> CoreResult<()>;

    /// Executes a planner-generated step group, returning any tuples
    /// a `Select` step produced.
    fn exec(&mut self, conn: &mut Self::Connection, plan: &ExecStepGroup) -> CoreResult<Vec<HeapTuple>>;

    /// Renders one node to this driver's SQL dialect. Most drivers can
    /// delegate straight to [`vh_nodes::to_sql_cmd`]; the indirection
    /// exists so a driver can post-process the text (quoting rules,
    /// dialect-specific casts) before it reaches the wire.
    fn command(&mut self, tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> CoreResult<String>;

    /// Binds a single outgoing parameter, returning whatever handle
    /// this driver's wire protocol uses to reference it later.
    fn param(&mut self, stack: &TypeStack, value: &Value, is_null: bool) -> CoreResult<Self::ParameterHandle>;

    /// Populates `catalog` from whatever the back-end considers its
    /// authoritative schema.
    fn load_schema(&mut self, catalog: &mut TableCatalog) -> CoreResult<()>;
}
