//! The literal end-to-end scenarios from spec.md section 8, exercised
//! as integration tests against the node tree's public rendering API.

use vh_catalog::TableId;
use vh_nodes::{
    FieldExpr, FieldNode, FromNode, JoinKind, JoinNode, NodeKind, NodeSqlCmdContext, NodeTag,
    NodeTree, QualNode, QualOp, QualOperand, QueryAction, QueryNode, to_sql_cmd,
};
use vh_types::Value;

fn from_node(tree: &mut NodeTree, table: TableId, name: &str, alias: Option<&str>) -> vh_nodes::NodeHandle {
    tree.create(
        NodeTag::From,
        NodeKind::From(FromNode {
            table,
            table_name: name.to_string(),
            alias: alias.map(str::to_string),
        }),
    )
}

#[test]
fn scenario_1_minimal_select_has_no_fields_and_renders_star() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    tree.child_rappend(root, field_list).unwrap();

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = from_node(&mut tree, TableId(0), "people", None);
    tree.child_rappend(from_list, from).unwrap();
    tree.child_rappend(root, from_list).unwrap();

    tree.check(root).unwrap();
    let mut ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut ctx).unwrap();
    assert_eq!(sql, "SELECT * FROM people");
}

#[test]
fn scenario_2_select_with_alias_and_where_renders_a_parenthesized_qual() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    let field = tree.create(
        NodeTag::Field,
        NodeKind::Field(FieldNode {
            expr: FieldExpr::Column {
                table_alias: Some("t0".into()),
                name: "first_name".into(),
            },
            output_alias: Some("fn".into()),
            assign_value: None,
        }),
    );
    tree.child_rappend(field_list, field).unwrap();
    tree.child_rappend(root, field_list).unwrap();

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = from_node(&mut tree, TableId(0), "people", Some("t0"));
    tree.child_rappend(from_list, from).unwrap();
    tree.child_rappend(root, from_list).unwrap();

    let where_node = tree.create(NodeTag::Where, NodeKind::Group);
    let qual = tree.create(
        NodeTag::Qual,
        NodeKind::Qual(QualNode::comparison(
            QualOp::Eq,
            QualOperand::Column("t0.last_name".into()),
            QualOperand::Literal(Value::Bytes(b"Smith".to_vec())),
        )),
    );
    tree.child_rappend(where_node, qual).unwrap();
    tree.child_rappend(root, where_node).unwrap();

    tree.check(root).unwrap();
    let mut ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut ctx).unwrap();
    assert_eq!(sql, "SELECT t0.first_name AS fn FROM people AS t0 WHERE (t0.last_name = $1)");
    assert_eq!(ctx.param_values, vec![Value::Bytes(b"Smith".to_vec())]);
}

#[test]
fn scenario_3_bulk_insert_renders_one_values_group_per_row() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::BulkInsert)));

    for (first, last) in [("A", "B"), ("C", "D")] {
        let row = tree.create(NodeTag::FieldList, NodeKind::Group);
        let first_field = tree.create(
            NodeTag::Field,
            NodeKind::Field(FieldNode::assign("first_name", Value::Bytes(first.as_bytes().to_vec()))),
        );
        let last_field = tree.create(
            NodeTag::Field,
            NodeKind::Field(FieldNode::assign("last_name", Value::Bytes(last.as_bytes().to_vec()))),
        );
        tree.child_rappend(row, first_field).unwrap();
        tree.child_rappend(row, last_field).unwrap();
        tree.child_rappend(root, row).unwrap();
    }

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = from_node(&mut tree, TableId(0), "people", None);
    tree.child_rappend(from_list, from).unwrap();
    tree.child_rappend(root, from_list).unwrap();

    tree.check(root).unwrap();
    let mut ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut ctx).unwrap();
    assert_eq!(sql, "INSERT INTO people (first_name, last_name) VALUES ($1, $2), ($3, $4)");
    assert_eq!(
        ctx.param_values,
        vec![
            Value::Bytes(b"A".to_vec()),
            Value::Bytes(b"B".to_vec()),
            Value::Bytes(b"C".to_vec()),
            Value::Bytes(b"D".to_vec()),
        ]
    );
}

#[test]
fn scenario_4_update_by_pk_renders_a_parenthesized_where() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Update)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    let set_field = tree.create(
        NodeTag::Field,
        NodeKind::Field(FieldNode::assign("first_name", Value::Bytes(b"X".to_vec()))),
    );
    tree.child_rappend(field_list, set_field).unwrap();
    tree.child_rappend(root, field_list).unwrap();

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = from_node(&mut tree, TableId(0), "people", None);
    tree.child_rappend(from_list, from).unwrap();
    tree.child_rappend(root, from_list).unwrap();

    let where_node = tree.create(NodeTag::Where, NodeKind::Group);
    let qual = tree.create(
        NodeTag::Qual,
        NodeKind::Qual(QualNode::comparison(
            QualOp::Eq,
            QualOperand::Column("id".into()),
            QualOperand::Literal(Value::I32(42)),
        )),
    );
    tree.child_rappend(where_node, qual).unwrap();
    tree.child_rappend(root, where_node).unwrap();

    tree.check(root).unwrap();
    let mut ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut ctx).unwrap();
    assert_eq!(sql, "UPDATE people SET first_name = $1 WHERE (id = $2)");
    assert_eq!(ctx.param_values, vec![Value::Bytes(b"X".to_vec()), Value::I32(42)]);
}

#[test]
fn scenario_5_join_render_qualifies_the_on_clause_and_parenthesizes_it() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    let field = tree.create(NodeTag::Field, NodeKind::Field(FieldNode::qualified_star("orders")));
    tree.child_rappend(field_list, field).unwrap();
    tree.child_rappend(root, field_list).unwrap();

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = from_node(&mut tree, TableId(0), "orders", None);
    tree.child_rappend(from_list, from).unwrap();
    tree.child_rappend(root, from_list).unwrap();

    let join_list = tree.create(NodeTag::JoinList, NodeKind::Group);
    let join = tree.create(
        NodeTag::Join,
        NodeKind::Join(JoinNode {
            kind: JoinKind::Inner,
            table: TableId(1),
            table_name: "people".into(),
            alias: None,
        }),
    );
    let join_qual = tree.create(
        NodeTag::Qual,
        NodeKind::Qual(QualNode::comparison(
            QualOp::Eq,
            QualOperand::Column("orders.person_id".into()),
            QualOperand::Column("people.id".into()),
        )),
    );
    tree.child_rappend(join, join_qual).unwrap();
    tree.child_rappend(join_list, join).unwrap();
    tree.child_rappend(root, join_list).unwrap();

    tree.check(root).unwrap();
    let mut ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut ctx).unwrap();
    assert_eq!(
        sql,
        "SELECT orders.* FROM orders INNER JOIN people ON (orders.person_id = people.id)"
    );
}
