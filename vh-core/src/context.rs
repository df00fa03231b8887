//! `CatalogContext`: the per-thread root every other subsystem hangs
//! off of. Grounded on spec.md section 5's description of the
//! original's thread-bound root (top memory context, current
//! transaction, buffers, catalogs, error queue).

use std::marker::PhantomData;

use vh_catalog::TableCatalog;
use vh_heap::HeapBuffer;
use vh_shard::BeaconCatalog;
use vh_types::TypeRegistry;
use vh_util::ErrorQueue;

use crate::error::{CoreError, CoreResult};

/// A marker field with no `Sync` impl, the cheapest way to opt a
/// struct entirely out of `Sync` without reaching for an unstable
/// negative impl. `CatalogContext` may still be `Send` (moved to the
/// thread that will own it), but two threads can never hold references
/// into the same context at once, matching "not internally
/// synchronized across contexts" from spec.md section 5.
type NotSync = PhantomData<std::cell::Cell<()>>;

/// Per-thread root: owns the type registry, table catalog, beacon
/// registry, one or more heap buffers, and the context's diagnostic
/// queue. A process may host many of these, each pinned to one thread.
pub struct CatalogContext {
    pub types: TypeRegistry,
    pub catalog: TableCatalog,
    pub beacons: BeaconCatalog,
    pub buffers: Vec<HeapBuffer>,
    pub errors: ErrorQueue,
    /// set once a `CoreError::Fatal` has escaped a call; further calls
    /// refuse to run rather than operate on a context that may have
    /// left an inconsistent buffer or catalog behind
    poisoned: bool,
    _not_sync: NotSync,
}

impl CatalogContext {
    pub fn new(buffer_pool_size: usize) -> Self {
        CatalogContext {
            types: TypeRegistry::new(),
            catalog: TableCatalog::new(),
            beacons: BeaconCatalog::new(),
            buffers: (0..buffer_pool_size.max(1)).map(|_| HeapBuffer::new()).collect(),
            errors: ErrorQueue::default(),
            poisoned: false,
            _not_sync: PhantomData,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Runs `f`, refusing to even start if the context is already
    /// poisoned, and poisoning it if `f` returns `CoreError::Fatal`.
    /// The "long-jump to the enclosing TRY/CATCH frame and reclaim the
    /// context" behavior from spec.md section 5 becomes, in safe Rust,
    /// "stop honoring further calls and let the caller drop this
    /// context" rather than an actual unwind.
    pub fn guard<T>(&mut self, f: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        if self.poisoned {
            return Err(CoreError::Fatal("context is poisoned by a prior fatal error".into()));
        }
        let result = f(self);
        if let Err(CoreError::Fatal(_)) = &result {
            self.poisoned = true;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_starts_with_at_least_one_buffer() {
        let ctx = CatalogContext::new(0);
        assert_eq!(ctx.buffers.len(), 1);
    }

    #[test]
    fn fatal_error_poisons_the_context() {
        let mut ctx = CatalogContext::new(1);
        let result: CoreResult<()> = ctx.guard(|_| Err(CoreError::Fatal("out of memory".into())));
        assert!(result.is_err());
        assert!(ctx.is_poisoned());

        let second: CoreResult<()> = ctx.guard(|_| Ok(()));
        assert!(second.is_err());
    }

    #[test]
    fn non_fatal_error_does_not_poison() {
        let mut ctx = CatalogContext::new(1);
        let result: CoreResult<()> = ctx.guard(|_| Err(vh_catalog::CatalogError::UnknownTable.into()));
        assert!(result.is_err());
        assert!(!ctx.is_poisoned());
    }
}
