//! Flatten: a pre-planner pass rewriting user-level `field IN <list of
//! HeapTuplePtr>` quals into back-end-renderable `field IN <scalar
//! value list>` quals, by extracting a single key field from each
//! referenced tuple. Grounded on the "Flatten" prose in spec.md
//! section 4.8; no single teacher file covers this pass, only its
//! contract, so the decode side mirrors the planner-local byte codec
//! [`crate::shard::encode_value`] already establishes for this same
//! "just enough structure to resolve routing/identity, not the full
//! TAM path" scope.

use vh_catalog::{TableCatalog, TableId};
use vh_heap::HeapBuffer;
use vh_nodes::{NodeHandle, NodeKind, NodeTag, NodeTree, QualOperand};
use vh_types::{TypeRegistry, Value};

use crate::error::{PlanError, PlanResult};

/// The inverse of `shard::encode_value`, restricted to the same fixed
/// byte widths: 1 byte -> bool, 2/4/8 bytes -> the matching signed
/// integer width. A field this narrow is assumed to be an identity or
/// foreign-key column, never a float of the same width -- the key
/// fields this pass flattens are always integer surrogate keys in
/// this engine (SPEC_FULL.md section 4.8 Open Question).
fn decode_value(bytes: &[u8]) -> Option<Value> {
    match bytes.len() {
        1 => Some(Value::Bool(bytes[0] != 0)),
        2 => Some(Value::I16(i16::from_le_bytes(bytes.try_into().ok()?))),
        4 => Some(Value::I32(i32::from_le_bytes(bytes.try_into().ok()?))),
        8 => Some(Value::I64(i64::from_le_bytes(bytes.try_into().ok()?))),
        _ => Some(Value::Bytes(bytes.to_vec())),
    }
}

fn collect_htp_in_quals(tree: &NodeTree, root: NodeHandle) -> Vec<NodeHandle> {
    let mut found = Vec::new();
    tree.visit_tree(root, &mut |handle, entry| {
        if entry.tag == NodeTag::Qual {
            if let NodeKind::Qual(q) = &entry.kind {
                if matches!(q.rhs, Some(QualOperand::HtpList(_))) {
                    found.push(handle);
                }
            }
        }
        true
    });
    found
}

fn rewrite_qual(tree: &mut NodeTree, qual: NodeHandle, buffer: &HeapBuffer, offset: usize, size: usize) -> PlanResult<()> {
    let NodeKind::Qual(q) = tree.kind_mut(qual)? else {
        return Err(PlanError::QueryMalformed("flatten target is not a qual".into()));
    };
    let Some(QualOperand::HtpList(htps)) = &q.rhs else {
        return Ok(());
    };

    let mut values = Vec::with_capacity(htps.len());
    for &htp in htps {
        let tuple = buffer
            .get_tuple(htp)
            .map_err(|_| PlanError::QueryMalformed("an HTP in the IN-list does not resolve to a live tuple".into()))?;
        let bytes = tuple
            .data
            .get(offset..offset + size)
            .ok_or_else(|| PlanError::QueryMalformed("key field offset is out of range for the referenced tuple".into()))?;
        let value = decode_value(bytes)
            .ok_or_else(|| PlanError::QueryMalformed("key field could not be decoded".into()))?;
        values.push(value);
    }

    q.rhs = Some(QualOperand::ValueList(values));
    Ok(())
}

/// Rewrites every `field IN <HeapTuplePtr list>` qual reachable from
/// `root` into `field IN <scalar value list>`, resolving each list
/// entry's `key_field_name` value on `referenced_table`. Ambiguity (no
/// such field, or a tuple that no longer resolves) surfaces as
/// `PlanError::QueryMalformed` rather than silently dropping entries.
pub fn flatten_htp_quals(
    tree: &mut NodeTree,
    root: NodeHandle,
    catalog: &TableCatalog,
    registry: &TypeRegistry,
    buffer: &HeapBuffer,
    referenced_table: TableId,
    key_field_name: &str,
) -> PlanResult<()> {
    let version = catalog.get(referenced_table)?.leading_version();
    let field = version.field_by_name(key_field_name)?;
    let type_id = field
        .stack
        .innermost()
        .ok_or_else(|| PlanError::QueryMalformed("key field has no resolvable type".into()))?;
    let size = registry.by_id(type_id)?.size as usize;
    let offset = field.offset as usize;

    for qual in collect_htp_in_quals(tree, root) {
        rewrite_qual(tree, qual, buffer, offset, size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vh_catalog::TableCatalog;
    use vh_heap::{HeapBuffer, HeapTuple};
    use vh_nodes::{NodeKind, NodeTag, NodeTree, QualNode};
    use vh_types::{TypeDescriptor, TypeId, TypeRegistry, TypeStack};

    fn make_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor {
                id: TypeId(1),
                name: "int4".into(),
                size: 4,
                max_align: 4,
                compare: |a, b| a.cmp(b),
                accumulator: None,
                tam: vh_types::Tam::default(),
            })
            .unwrap();
        registry
    }

    fn make_catalog(registry: &TypeRegistry) -> (TableCatalog, TableId) {
        let mut catalog = TableCatalog::new();
        let table = catalog.create_table("public", "customers").unwrap();
        let ty = registry.by_name("int4").unwrap();
        let version = catalog.get_mut(table).unwrap().leading_version_mut();
        version.add_field("id", TypeStack::new(vec![ty.id]).unwrap(), false, ty.size).unwrap();
        (catalog, table)
    }

    #[test]
    fn flatten_rewrites_an_htp_list_into_a_value_list() {
        let registry = make_registry();
        let (catalog, table) = make_catalog(&registry);

        let mut buffer = HeapBuffer::new();
        let htp_a = buffer.insert_tuple(0, &HeapTuple::new(1, 11i32.to_le_bytes().to_vec())).unwrap();
        let htp_b = buffer.insert_tuple(0, &HeapTuple::new(1, 22i32.to_le_bytes().to_vec())).unwrap();

        let mut tree = NodeTree::new();
        let qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::htp_in("id", vec![htp_a, htp_b])));

        flatten_htp_quals(&mut tree, qual, &catalog, &registry, &buffer, table, "id").unwrap();

        let NodeKind::Qual(q) = tree.kind(qual).unwrap() else { unreachable!() };
        assert_eq!(
            q.rhs,
            Some(QualOperand::ValueList(vec![Value::I32(11), Value::I32(22)]))
        );
    }

    #[test]
    fn unknown_key_field_is_query_malformed() {
        let registry = make_registry();
        let (catalog, table) = make_catalog(&registry);
        let buffer = HeapBuffer::new();

        let mut tree = NodeTree::new();
        let qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::htp_in("id", vec![])));

        let err = flatten_htp_quals(&mut tree, qual, &catalog, &registry, &buffer, table, "missing").unwrap_err();
        assert!(matches!(err, PlanError::Catalog(_)));
    }
}
