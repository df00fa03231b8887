//! `vh_esg_quals_pullshard`: resolves a query's shard by walking its
//! quals for an AND-combined chain of `Eq` comparisons that together
//! pin every field of a table's primary key, then submits a template
//! tuple built from those literal values to the table's beacon.

use vh_catalog::{TableDefVer, TableId};
use vh_nodes::{NodeHandle, NodeKind, NodeTree, QualOp, QualOperand};
use vh_shard::{Beacon, Shard};
use vh_types::Value;

/// Primitive, planner-local encoding of a literal value into bytes --
/// not the catalog's TAM-driven wire format, just enough structure for
/// a beacon to hash or range-partition on.
fn encode_value(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => Vec::new(),
        Value::Bool(b) => vec![*b as u8],
        Value::I16(v) => v.to_le_bytes().to_vec(),
        Value::I32(v) => v.to_le_bytes().to_vec(),
        Value::I64(v) => v.to_le_bytes().to_vec(),
        Value::Float(v) => v.to_le_bytes().to_vec(),
        Value::Double(v) => v.to_le_bytes().to_vec(),
        Value::Bytes(b) => b.clone(),
    }
}

/// Collects `field_name -> literal value` for every top-level `Eq`
/// qual directly registered against `node` (an AND-chain is just the
/// flat set of comparison quals the planner attached to that node; a
/// chain containing any non-`Eq` comparison on a key field disqualifies
/// that field from resolution).
fn collect_eq_literals(tree: &NodeTree, quals: &[NodeHandle]) -> std::collections::HashMap<String, Value> {
    let mut found = std::collections::HashMap::new();
    for &qual in quals {
        let Ok(NodeKind::Qual(q)) = tree.kind(qual) else {
            continue;
        };
        if q.op != QualOp::Eq {
            continue;
        }
        let pair = match (&q.lhs, &q.rhs) {
            (Some(QualOperand::Column(name)), Some(QualOperand::Literal(v))) => Some((name.clone(), v.clone())),
            (Some(QualOperand::Literal(v)), Some(QualOperand::Column(name))) => Some((name.clone(), v.clone())),
            _ => None,
        };
        if let Some((name, value)) = pair {
            let bare = name.rsplit('.').next().unwrap_or(&name).to_string();
            found.insert(bare, value);
        }
    }
    found
}

/// Attempts to resolve a shard for `table` given the quals the planner
/// folded onto `node`. Returns `None` (a cross-shard fetch) when the
/// primary key isn't fully pinned by `Eq` literals.
pub fn resolve_shard(
    tree: &NodeTree,
    node: NodeHandle,
    quals: &[NodeHandle],
    table: TableId,
    version: &TableDefVer,
    beacon: &mut dyn Beacon,
) -> Option<Shard> {
    let _ = (node, table);
    let literals = collect_eq_literals(tree, quals);
    if version.key_primary.is_empty() {
        return None;
    }

    let mut data = Vec::new();
    for &field_id in &version.key_primary {
        let field = version.field(field_id)?;
        let value = literals.get(&field.name)?;
        data.extend(encode_value(value));
    }

    let template = vh_heap::HeapTuple::new(version.key_primary.len() as u16, data);
    beacon.ht_shard(&template)
}
