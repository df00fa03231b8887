//! Beacon-root detection: for every table a query touches under a
//! given beacon, classify its relationship to that beacon's "root"
//! table (the one a shard is ultimately keyed against).

use vh_catalog::{RelationCardinality, TableCatalog, TableId};
use vh_nodes::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconRootRole {
    /// This table IS the beacon's root.
    Root,
    /// Directly related to the root by a 1:1 or 1:N `TableRel`.
    Related(RelationCardinality),
    /// Same mandatory (primary-key) fields as the root -- can stand
    /// in for it without a declared relationship.
    Proxy,
    /// No route back to the root: a unique-key fetch, flagged so the
    /// executor knows it may have to scan every shard.
    UniqueKey,
}

#[derive(Debug, Clone)]
pub struct PlanBeaconRoot {
    pub beacon: String,
    pub table: TableId,
    pub node: NodeHandle,
    pub role: BeaconRootRole,
    /// Quals that resolve this table's portion of the beacon key,
    /// when `role` is `Related` or `Proxy`.
    pub rquals: Vec<NodeHandle>,
}

/// `vh_esg_quals_pullshard`'s sibling: for each `(beacon, table)` pair
/// the plan references, classify the table's role relative to the
/// beacon's declared root table.
pub fn detect_beacon_roots(
    catalog: &TableCatalog,
    beacon_name: &str,
    root_table: TableId,
    referenced: &[(TableId, NodeHandle)],
) -> Vec<PlanBeaconRoot> {
    referenced
        .iter()
        .map(|&(table, node)| {
            let role = if table == root_table {
                BeaconRootRole::Root
            } else if let Some(rel) = catalog.find_rel(table, root_table).or_else(|| catalog.find_rel(root_table, table)) {
                match rel.cardinality {
                    RelationCardinality::OneToOne | RelationCardinality::OneToMany | RelationCardinality::ManyToOne => {
                        BeaconRootRole::Related(rel.cardinality)
                    }
                    RelationCardinality::ManyToMany => BeaconRootRole::UniqueKey,
                }
            } else if shares_primary_key_shape(catalog, table, root_table) {
                BeaconRootRole::Proxy
            } else {
                BeaconRootRole::UniqueKey
            };

            PlanBeaconRoot {
                beacon: beacon_name.to_string(),
                table,
                node,
                role,
                rquals: Vec::new(),
            }
        })
        .collect()
}

fn shares_primary_key_shape(catalog: &TableCatalog, a: TableId, b: TableId) -> bool {
    let (Ok(a), Ok(b)) = (catalog.get(a), catalog.get(b)) else {
        return false;
    };
    let a_keys = a.leading_version().key_primary.len();
    let b_keys = b.leading_version().key_primary.len();
    a_keys > 0 && a_keys == b_keys
}
