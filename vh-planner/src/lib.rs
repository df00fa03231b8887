//! Join-tree analysis, shard resolution, and execution-step-group
//! generation. See SPEC_FULL.md section 4.7.

pub mod beacon_root;
pub mod error;
pub mod esg;
pub mod flatten;
pub mod plan_tree;
pub mod shard;

pub use beacon_root::{detect_beacon_roots, BeaconRootRole, PlanBeaconRoot};
pub use error::{PlanError, PlanResult};
pub use esg::{generate as esg_generate, ExecStep, ExecStepGroup};
pub use flatten::flatten_htp_quals;
pub use plan_tree::PlanTree;
pub use shard::resolve_shard;

#[cfg(test)]
mod tests {
    use super::*;
    use vh_catalog::{RelationCardinality, TableCatalog, TableRel};
    use vh_nodes::{FieldNode, FromNode, JoinKind, JoinNode, NodeKind, NodeTag, NodeTree, QualNode, QualOp, QualOperand, QueryAction, QueryNode};
    use vh_types::{TypeId, TypeStack, Value};

    fn int_stack() -> TypeStack {
        TypeStack::new(vec![TypeId(1)]).unwrap()
    }

    fn make_catalog() -> (TableCatalog, vh_catalog::TableId, vh_catalog::TableId) {
        let mut catalog = TableCatalog::new();
        let orders = catalog.create_table("public", "orders").unwrap();
        let customers = catalog.create_table("public", "customers").unwrap();
        catalog
            .get_mut(orders)
            .unwrap()
            .leading_version_mut()
            .add_field("customer_id", int_stack(), false, 4)
            .unwrap();
        catalog
            .get_mut(customers)
            .unwrap()
            .leading_version_mut()
            .add_field("id", int_stack(), false, 4)
            .unwrap();
        let mut rel = TableRel::new(orders, customers, RelationCardinality::ManyToOne);
        rel.add_qual(vh_catalog::FieldId(0), vh_catalog::FieldId(0)).unwrap();
        catalog.add_rel(rel);
        (catalog, orders, customers)
    }

    #[test]
    fn plan_tree_folds_a_two_table_join_into_the_join_tree() {
        let (catalog, orders, customers) = make_catalog();

        let mut tree = NodeTree::new();
        let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

        let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
        let field = tree.create(NodeTag::Field, NodeKind::Field(FieldNode::column("total")));
        tree.child_rappend(field_list, field).unwrap();
        tree.child_rappend(root, field_list).unwrap();

        let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
        let from = tree.create(
            NodeTag::From,
            NodeKind::From(FromNode {
                table: orders,
                table_name: "orders".into(),
                alias: Some("o".into()),
            }),
        );
        tree.child_rappend(from_list, from).unwrap();
        tree.child_rappend(root, from_list).unwrap();

        let join_list = tree.create(NodeTag::JoinList, NodeKind::Group);
        let join = tree.create(
            NodeTag::Join,
            NodeKind::Join(JoinNode {
                kind: JoinKind::Inner,
                table: customers,
                table_name: "customers".into(),
                alias: Some("c".into()),
            }),
        );
        tree.child_rappend(join_list, join).unwrap();
        tree.child_rappend(root, join_list).unwrap();

        let where_node = tree.create(NodeTag::Where, NodeKind::Group);
        let qual = tree.create(
            NodeTag::Qual,
            NodeKind::Qual(QualNode::comparison(
                QualOp::Eq,
                QualOperand::Column("o.customer_id".into()),
                QualOperand::Column("c.id".into()),
            )),
        );
        tree.child_rappend(where_node, qual).unwrap();
        tree.child_rappend(root, where_node).unwrap();

        let plan = PlanTree::build(&tree, root, &catalog).unwrap();
        assert!(plan.node_jt.contains_key(&from));
        assert!(plan.node_jt[&from].contains_key(&join));
        assert_eq!(plan.node_td[&orders], vec![from]);
        assert_eq!(plan.node_td[&customers], vec![join]);
    }

    #[test]
    fn esg_select_renders_a_single_step() {
        let (catalog, orders, _customers) = make_catalog();
        let mut tree = NodeTree::new();
        let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));
        let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
        let field = tree.create(NodeTag::Field, NodeKind::Field(FieldNode::star()));
        tree.child_rappend(field_list, field).unwrap();
        tree.child_rappend(root, field_list).unwrap();
        let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
        let from = tree.create(
            NodeTag::From,
            NodeKind::From(FromNode {
                table: orders,
                table_name: "orders".into(),
                alias: None,
            }),
        );
        tree.child_rappend(from_list, from).unwrap();
        tree.child_rappend(root, from_list).unwrap();

        let plan = PlanTree::build(&tree, root, &catalog).unwrap();
        let group = esg_generate(&tree, root, &plan, Some(vh_shard::Shard(3))).unwrap();
        assert_eq!(group.steps.len(), 1);
        assert_eq!(group.steps[0].sql, "SELECT * FROM orders");
        assert_eq!(group.steps[0].shard, Some(vh_shard::Shard(3)));
    }

    #[test]
    fn resolve_shard_requires_every_primary_key_field_pinned_by_eq() {
        let (mut catalog, orders, _customers) = make_catalog();
        catalog
            .get_mut(orders)
            .unwrap()
            .leading_version_mut()
            .set_primary_key(vec![vh_catalog::FieldId(0)]);

        let mut tree = NodeTree::new();
        let qual = tree.create(
            NodeTag::Qual,
            NodeKind::Qual(QualNode::comparison(
                QualOp::Eq,
                QualOperand::Column("customer_id".into()),
                QualOperand::Literal(Value::I32(9)),
            )),
        );

        let mut beacon = vh_shard::HashBeacon::new(4);
        let version = catalog.get(orders).unwrap().leading_version().clone();
        let shard = resolve_shard(&tree, qual, &[qual], orders, &version, &mut beacon);
        assert!(shard.is_some());
    }

    #[test]
    fn flattened_qual_renders_as_an_in_list() {
        let (catalog, _orders, customers) = make_catalog();

        let mut buffer = vh_heap::HeapBuffer::new();
        let a = buffer.insert_tuple(0, &vh_heap::HeapTuple::new(1, 5i32.to_le_bytes().to_vec())).unwrap();
        let b = buffer.insert_tuple(0, &vh_heap::HeapTuple::new(1, 9i32.to_le_bytes().to_vec())).unwrap();

        let mut registry = vh_types::TypeRegistry::new();
        registry
            .register(vh_types::TypeDescriptor {
                id: TypeId(1),
                name: "int4".into(),
                size: 4,
                max_align: 4,
                compare: |x, y| x.cmp(y),
                accumulator: None,
                tam: vh_types::Tam::default(),
            })
            .unwrap();

        let mut tree = NodeTree::new();
        let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

        let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
        let field = tree.create(NodeTag::Field, NodeKind::Field(FieldNode::column("id")));
        tree.child_rappend(field_list, field).unwrap();
        tree.child_rappend(root, field_list).unwrap();

        let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
        let from = tree.create(
            NodeTag::From,
            NodeKind::From(FromNode {
                table: customers,
                table_name: "customers".into(),
                alias: None,
            }),
        );
        tree.child_rappend(from_list, from).unwrap();
        tree.child_rappend(root, from_list).unwrap();

        let where_node = tree.create(NodeTag::Where, NodeKind::Group);
        let qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::htp_in("id", vec![a, b])));
        tree.child_rappend(where_node, qual).unwrap();
        tree.child_rappend(root, where_node).unwrap();

        flatten::flatten_htp_quals(&mut tree, qual, &catalog, &registry, &buffer, customers, "id").unwrap();

        let mut ctx = vh_nodes::NodeSqlCmdContext::new();
        let sql = vh_nodes::to_sql_cmd(&tree, root, &mut ctx).unwrap();
        assert_eq!(sql, "SELECT id FROM customers WHERE (id IN ($1, $2))");
        assert_eq!(ctx.param_values, vec![Value::I32(5), Value::I32(9)]);
    }
}
