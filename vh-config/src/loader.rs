use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigResult;
use crate::model::EngineConfig;

/// `vh_cfgj_sp_load`'s generalized successor: parses an
/// [`EngineConfig`] from JSON text.
pub fn load_from_str(json: &str) -> ConfigResult<EngineConfig> {
    let config: EngineConfig = serde_json::from_str(json)?;
    debug!(tables = config.tables.len(), beacons = config.beacons.len(), "parsed engine config");
    Ok(config)
}

/// Reads and parses a config file from disk.
pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<EngineConfig> {
    let text = fs::read_to_string(path)?;
    load_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_document() {
        let json = r#"{
            "buffer": { "pool_size": 4 },
            "tables": [
                {
                    "schema": "public",
                    "name": "customers",
                    "fields": [
                        { "name": "id", "type_name": "i32" },
                        { "name": "name", "type_name": "text", "nullable": true }
                    ],
                    "primary_key": ["id"]
                }
            ],
            "beacons": [
                { "name": "default", "kind": "hash", "num_shards": 4 }
            ]
        }"#;

        let config = load_from_str(json).unwrap();
        assert_eq!(config.buffer.pool_size, 4);
        assert_eq!(config.buffer.allocation_factor, 1.5);
        assert_eq!(config.tables[0].fields.len(), 2);
        assert_eq!(config.beacons[0].num_shards, 4);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(load_from_str("{ not json").is_err());
    }
}
