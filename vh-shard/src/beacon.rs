//! The `Beacon` vtable: resolves which shard a tuple, a tuple
//! pointer, or a whole table lives on. Grounded on `BeaconFuncTableData`
//! in `Beacon.h`; the C function-pointer table becomes a Rust trait so
//! each backend (Postgres, a remote HTTP shard, an in-memory test
//! double, ...) implements it directly rather than filling in fn
//! pointers by hand.

use vh_heap::{HeapTuple, HeapTuplePtr};

use crate::error::ShardError;

/// Identifies a physical shard destination. Opaque at this layer --
/// what a shard id means (a connection string, a partition key range)
/// is a back-end concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shard(pub u32);

/// Identifies a table for routing purposes, independent of the
/// catalog's own `TableDef` representation -- keeps this crate from
/// depending on `vh-catalog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

/// A shard router. `assign` on the HTP-resolving methods mirrors the
/// original's "assumes lock acquired... up to the caller if they want
/// to assign the shard to the HeapTuple": when `true`, implementations
/// are expected to remember the routing decision for that HTP/table
/// rather than recompute it on every call.
pub trait Beacon {
    /// Resolve the shard a live tuple (not yet placed) should route
    /// to, e.g. for an INSERT.
    fn ht_shard(&self, ht: &HeapTuple) -> Option<Shard>;

    /// Resolve the shard an already-placed tuple lives on.
    fn htp_shard(&mut self, htp: HeapTuplePtr, assign: bool) -> Option<Shard>;

    /// Resolve the (possibly multiple, for a broadcast table) shards
    /// a whole table lives on.
    fn td_shard(&self, table: TableId) -> Vec<Shard>;

    fn connect(&mut self) -> Result<(), ShardError>;
    fn disconnect(&mut self) -> Result<(), ShardError>;
}
