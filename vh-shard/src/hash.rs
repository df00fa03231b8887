//! A consistent-hash beacon: the simplest usable router, and the one
//! the test suite exercises the planner's shard-resolution paths
//! against. Not grounded on a single teacher file -- `Beacon.h` only
//! specifies the vtable shape, not an implementation -- but follows
//! the conventions `Beacon` itself sets.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use vh_heap::{HeapTuple, HeapTuplePtr};

use crate::beacon::{Beacon, Shard, TableId};
use crate::error::ShardError;

pub struct HashBeacon {
    num_shards: u32,
    assignments: HashMap<u64, Shard>,
    connected: bool,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl HashBeacon {
    pub fn new(num_shards: u32) -> Self {
        assert!(num_shards > 0, "a beacon needs at least one shard");
        HashBeacon {
            num_shards,
            assignments: HashMap::new(),
            connected: false,
        }
    }

    fn shard_of(&self, key: u64) -> Shard {
        Shard((hash_u64(key) % self.num_shards as u64) as u32)
    }
}

impl Beacon for HashBeacon {
    fn ht_shard(&self, ht: &HeapTuple) -> Option<Shard> {
        let mut hasher = DefaultHasher::new();
        ht.data.hash(&mut hasher);
        Some(self.shard_of(hasher.finish()))
    }

    fn htp_shard(&mut self, htp: HeapTuplePtr, assign: bool) -> Option<Shard> {
        if let Some(shard) = self.assignments.get(&htp.as_u64()) {
            return Some(*shard);
        }
        let shard = self.shard_of(htp.as_u64());
        if assign {
            self.assignments.insert(htp.as_u64(), shard);
        }
        Some(shard)
    }

    fn td_shard(&self, table: TableId) -> Vec<Shard> {
        vec![self.shard_of(table.0 as u64)]
    }

    fn connect(&mut self) -> Result<(), ShardError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ShardError> {
        if !self.connected {
            return Err(ShardError::NotConnected("hash".into()));
        }
        self.connected = false;
        self.assignments.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn htp_shard_is_stable_once_assigned() {
        let mut beacon = HashBeacon::new(8);
        let htp = HeapTuplePtr::new(1, 1, 0, 1);
        let first = beacon.htp_shard(htp, true).unwrap();
        let second = beacon.htp_shard(htp, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn td_shard_is_deterministic_for_the_same_table() {
        let beacon = HashBeacon::new(4);
        assert_eq!(beacon.td_shard(TableId(7)), beacon.td_shard(TableId(7)));
    }

    #[test]
    fn disconnect_without_connect_is_an_error() {
        let mut beacon = HashBeacon::new(2);
        assert!(matches!(
            beacon.disconnect(),
            Err(ShardError::NotConnected(_))
        ));
    }
}
