//! Table catalog: table/field/version definitions, declared
//! relationships, and the PrepTup/SearchPath column-resolution
//! machinery. See SPEC_FULL.md section 4.5.

pub mod catalog;
pub mod error;
pub mod field;
pub mod preptup;
pub mod rel;
pub mod searchpath;
pub mod table_def;

pub use catalog::TableCatalog;
pub use error::CatalogError;
pub use field::{FieldId, TableField};
pub use preptup::{CopyCol, MinMaxPrepCol, PrepCol, PrepTup};
pub use rel::{RelationCardinality, TableRel, TableRelQual, MAX_REL_QUALS};
pub use searchpath::{FieldNameSearchPath, SearchContext, SearchPath, SearchPathResult};
pub use table_def::{TableDef, TableDefVer, TableId};
