//! Small utilities shared across the `vh-*` crates: the per-context
//! diagnostic queue and a generation-checked arena used wherever the
//! original C code stored a raw pointer between two structures that
//! can outlive each other independently (TableDef <-> TableRel,
//! TypeRegistry entries, Beacon registrations, ...).
//!
//! The generic dynamic array and hashtable described in the
//! specification are treated as interface contracts only: callers
//! use `Vec`/`HashMap` directly rather than a hand-rolled
//! reimplementation.

pub mod arena;
pub mod error_queue;

pub use arena::{Arena, ArenaIndex};
pub use error_queue::{ErrorQueue, Level, QueuedMessage};
