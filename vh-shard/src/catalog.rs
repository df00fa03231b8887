//! BeaconCatalog: the named registry of beacons a planner resolves
//! shard routing against. Grounded on `BeaconCatalogData`.

use std::collections::HashMap;

use tracing::info;

use crate::beacon::Beacon;
use crate::error::ShardError;

#[derive(Default)]
pub struct BeaconCatalog {
    beacons: HashMap<String, Box<dyn Beacon>>,
}

impl BeaconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, beacon: Box<dyn Beacon>) -> Result<(), ShardError> {
        let name = name.into();
        if self.beacons.contains_key(&name) {
            return Err(ShardError::DuplicateName(name));
        }
        info!(beacon = %name, "registering beacon");
        self.beacons.insert(name, beacon);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Beacon>> {
        self.beacons.remove(name)
    }

    pub fn get(&self, name: &str) -> Result<&dyn Beacon, ShardError> {
        self.beacons
            .get(name)
            .map(|b| b.as_ref())
            .ok_or_else(|| ShardError::UnknownBeacon(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut (dyn Beacon + 'static), ShardError> {
        self.beacons
            .get_mut(name)
            .map(|b| b.as_mut())
            .ok_or_else(|| ShardError::UnknownBeacon(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.beacons.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashBeacon;

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut catalog = BeaconCatalog::new();
        catalog.add("main", Box::new(HashBeacon::new(4))).unwrap();
        assert!(matches!(
            catalog.add("main", Box::new(HashBeacon::new(4))),
            Err(ShardError::DuplicateName(_))
        ));
    }

    #[test]
    fn unknown_beacon_lookup_is_an_error() {
        let catalog = BeaconCatalog::new();
        assert!(matches!(
            catalog.get("missing"),
            Err(ShardError::UnknownBeacon(_))
        ));
    }
}
