//! `vh`: a command-line harness exercising the engine end to end --
//! loads a bootstrap document, builds a catalog and a couple of
//! beacons from it, runs a handful of canned queries through the node
//! tree/planner/ESG pipeline, and prints the SQL each one renders
//! plus the shard it was routed to.

use std::cmp::Ordering;
use std::path::PathBuf;

use clap::Parser;

use vh_catalog::{RelationCardinality, TableCatalog, TableRel};
use vh_config::EngineConfig;
use vh_core::CatalogContext;
use vh_nodes::{
    FieldNode, FromNode, JoinKind, JoinNode, NodeKind, NodeSqlCmdContext, NodeTag, NodeTree,
    QualNode, QualOp, QualOperand, QueryAction, QueryNode, to_sql_cmd,
};
use vh_planner::{esg_generate, resolve_shard, PlanTree};
use vh_shard::{HashBeacon, Shard};
use vh_types::{TypeDescriptor, TypeId, TypeRegistry, TypeStack, Value};

#[derive(Parser)]
#[command(name = "vh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exercise the catalog/node-tree/planner pipeline against a bootstrap document")]
struct Args {
    /// JSON bootstrap document (defaults to the bundled demo)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match args.config {
        Some(path) => vh_config::load_from_path(&path)?,
        None => vh_config::load_from_str(include_str!("../demos/engine.json"))?,
    };

    let mut ctx = CatalogContext::new(config.buffer.pool_size as usize);
    ctx.guard(|ctx| bootstrap(ctx, &config))?;

    let customers = ctx.catalog.get_by_name("public.customers")?.id;
    let orders = ctx.catalog.get_by_name("public.orders")?.id;

    run_select_join(&ctx.catalog, customers, orders)?;
    run_update_by_pk(&ctx.catalog, orders, ctx.beacons.get_mut("main")?)?;

    Ok(())
}

fn compare_int4(a: &[u8], b: &[u8]) -> Ordering {
    i32::from_le_bytes(a.try_into().unwrap_or_default()).cmp(&i32::from_le_bytes(b.try_into().unwrap_or_default()))
}

fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Registers the config's declared types, tables, and beacons against
/// a fresh context. Split out so it can run inside [`CatalogContext::guard`].
fn bootstrap(ctx: &mut CatalogContext, config: &EngineConfig) -> vh_core::CoreResult<()> {
    register_base_types(&mut ctx.types)?;

    for table_cfg in &config.tables {
        let table_id = ctx.catalog.create_table(&table_cfg.schema, &table_cfg.name)?;
        let table = ctx.catalog.get_mut(table_id)?;
        table.beacon_name = table_cfg.beacon.clone();
        let version = table.leading_version_mut();

        let mut primary_key = Vec::new();
        for field_cfg in &table_cfg.fields {
            let ty = ctx.types.by_name(&field_cfg.type_name)?;
            let stack = TypeStack::new(vec![ty.id])?;
            let field_id = version.add_field(&field_cfg.name, stack, field_cfg.nullable, ty.size)?;
            if table_cfg.primary_key.contains(&field_cfg.name) {
                primary_key.push(field_id);
            }
        }
        version.set_primary_key(primary_key);
    }

    for beacon_cfg in &config.beacons {
        match beacon_cfg.kind.as_str() {
            "hash" => ctx.beacons.add(&beacon_cfg.name, Box::new(HashBeacon::new(beacon_cfg.num_shards)))?,
            other => return Err(vh_core::CoreError::Fatal(format!("unknown beacon kind {other:?}"))),
        }
    }

    let orders = ctx.catalog.get_by_name("public.orders")?.id;
    let customers = ctx.catalog.get_by_name("public.customers")?.id;
    let customer_id_field = ctx.catalog.get(orders)?.leading_version().field_by_name("customer_id")?.id;
    let id_field = ctx.catalog.get(customers)?.leading_version().field_by_name("id")?.id;
    let mut rel = TableRel::new(orders, customers, RelationCardinality::ManyToOne);
    rel.add_qual(customer_id_field, id_field)?;
    ctx.catalog.add_rel(rel);

    Ok(())
}

fn register_base_types(registry: &mut TypeRegistry) -> Result<(), vh_types::TypeRegistryError> {
    registry.register(TypeDescriptor {
        id: TypeId(1),
        name: "int4".into(),
        size: 4,
        max_align: 4,
        compare: compare_int4,
        accumulator: None,
        tam: vh_types::Tam::default(),
    })?;
    registry.register(TypeDescriptor {
        id: TypeId(2),
        name: "text".into(),
        size: 0,
        max_align: 1,
        compare: compare_bytes,
        accumulator: None,
        tam: vh_types::Tam::default(),
    })?;
    Ok(())
}

/// `SELECT o.total FROM orders o INNER JOIN customers c ON
/// o.customer_id = c.id WHERE c.id = 7`, planned and rendered.
fn run_select_join(
    catalog: &TableCatalog,
    customers: vh_catalog::TableId,
    orders: vh_catalog::TableId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Select)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    let total_field = tree.create(NodeTag::Field, NodeKind::Field(FieldNode {
        expr: vh_nodes::FieldExpr::Column { table_alias: Some("o".into()), name: "total".into() },
        output_alias: None,
        assign_value: None,
    }));
    tree.child_rappend(field_list, total_field)?;
    tree.child_rappend(root, field_list)?;

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = tree.create(NodeTag::From, NodeKind::From(FromNode {
        table: orders,
        table_name: "orders".into(),
        alias: Some("o".into()),
    }));
    tree.child_rappend(from_list, from)?;
    tree.child_rappend(root, from_list)?;

    let join_list = tree.create(NodeTag::JoinList, NodeKind::Group);
    let join = tree.create(NodeTag::Join, NodeKind::Join(JoinNode {
        kind: JoinKind::Inner,
        table: customers,
        table_name: "customers".into(),
        alias: Some("c".into()),
    }));
    let join_qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::comparison(
        QualOp::Eq,
        QualOperand::Column("o.customer_id".into()),
        QualOperand::Column("c.id".into()),
    )));
    tree.child_rappend(join, join_qual)?;
    tree.child_rappend(join_list, join)?;
    tree.child_rappend(root, join_list)?;

    let where_node = tree.create(NodeTag::Where, NodeKind::Group);
    let qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::comparison(
        QualOp::Eq,
        QualOperand::Column("c.id".into()),
        QualOperand::Literal(Value::I32(7)),
    )));
    tree.child_rappend(where_node, qual)?;
    tree.child_rappend(root, where_node)?;

    tree.check(root)?;
    let plan = PlanTree::build(&tree, root, catalog)?;
    let group = esg_generate(&tree, root, &plan, None)?;

    println!("-- select join --");
    for step in &group.steps {
        println!("{}", step.sql);
    }
    Ok(())
}

/// `UPDATE orders SET total = 50 WHERE id = 3`, with shard resolution
/// against a live beacon.
fn run_update_by_pk(
    catalog: &TableCatalog,
    orders: vh_catalog::TableId,
    beacon: &mut dyn vh_shard::Beacon,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeTag::Query, NodeKind::Query(QueryNode::new(QueryAction::Update)));

    let field_list = tree.create(NodeTag::FieldList, NodeKind::Group);
    let set_total = tree.create(NodeTag::Field, NodeKind::Field(FieldNode::assign("total", Value::I32(50))));
    tree.child_rappend(field_list, set_total)?;
    tree.child_rappend(root, field_list)?;

    let from_list = tree.create(NodeTag::FromList, NodeKind::Group);
    let from = tree.create(NodeTag::From, NodeKind::From(FromNode {
        table: orders,
        table_name: "orders".into(),
        alias: None,
    }));
    tree.child_rappend(from_list, from)?;
    tree.child_rappend(root, from_list)?;

    let where_node = tree.create(NodeTag::Where, NodeKind::Group);
    let qual = tree.create(NodeTag::Qual, NodeKind::Qual(QualNode::comparison(
        QualOp::Eq,
        QualOperand::Column("id".into()),
        QualOperand::Literal(Value::I32(3)),
    )));
    tree.child_rappend(where_node, qual)?;
    tree.child_rappend(root, where_node)?;

    tree.check(root)?;
    let version = catalog.get(orders)?.leading_version();
    let shard: Option<Shard> = resolve_shard(&tree, where_node, &[qual], orders, version, beacon);

    let mut cmd_ctx = NodeSqlCmdContext::new();
    let sql = to_sql_cmd(&tree, root, &mut cmd_ctx)?;

    println!("-- update by primary key --");
    println!("{sql}");
    println!("shard: {shard:?}");
    Ok(())
}
