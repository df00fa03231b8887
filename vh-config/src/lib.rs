//! JSON engine-bootstrap configuration. See SPEC_FULL.md section 1.1.

pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_from_path, load_from_str};
pub use model::{BeaconConfig, BufferConfig, EngineConfig, FieldConfig, TableConfig, TypeConfig};
