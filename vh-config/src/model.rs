//! The bootstrap document's shape. Grounded on `cfgj_sp.c`'s
//! JSON-driven SearchPath configuration, generalized from "just the
//! search path" to the whole engine's bootstrap: buffer pool sizing,
//! registered types, and table/beacon wiring.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BufferConfig {
    /// number of `HeapBuffer`s the engine starts with
    pub pool_size: u32,
    /// growth factor applied when a buffer's current page set fills up
    #[serde(default = "default_allocation_factor")]
    pub allocation_factor: f32,
    /// override for `vh_heap::PAGE_SIZE`, for engines that want a
    /// non-default page size; `None` keeps the compiled-in default
    #[serde(default)]
    pub page_size_override: Option<u16>,
}

fn default_allocation_factor() -> f32 {
    1.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeConfig {
    pub name: String,
    pub size_bytes: u32,
    #[serde(default)]
    pub is_variable_width: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableConfig {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub beacon: Option<String>,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeaconConfig {
    pub name: String,
    pub kind: String,
    #[serde(default = "default_num_shards")]
    pub num_shards: u32,
}

fn default_num_shards() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub buffer: BufferConfig,
    #[serde(default)]
    pub types: Vec<TypeConfig>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    #[serde(default)]
    pub beacons: Vec<BeaconConfig>,
}
