//! `vh_nsql_cmd` / `vh_nsql_cmd_impl` / `vh_nsql_cmd_impl_def`: renders
//! a query node tree to SQL text. The original dispatched this through
//! a per-tag `NodeOpsFuncs::to_sql_cmd` function pointer looked up in a
//! `NodeSqlCmdFuncTable`; here it's one function matching on
//! `NodeKind`, which is the whole of the vtable this crate needs since
//! every tag's renderer lives in the same module.

use vh_types::Value;

use crate::context::NodeSqlCmdContext;
use crate::error::{NodesError, NodesResult};
use crate::kind::{FieldExpr, NodeKind, QualOp, QualOperand, QueryAction};
use crate::tag::NodeTag;
use crate::tree::{NodeHandle, NodeTree};

/// `vh_nsql_cmd`: render `root` (a `Query` node) to a complete SQL
/// statement.
pub fn to_sql_cmd(tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let kind = tree.kind(root)?.clone();
    let NodeKind::Query(query) = kind else {
        return Err(NodesError::KindMismatch(tree.tag(root)?));
    };
    ctx.mark_tag(NodeTag::Query);

    match query.action {
        QueryAction::Select => render_select(tree, root, ctx),
        QueryAction::Insert | QueryAction::BulkInsert => render_insert(tree, root, ctx),
        QueryAction::Update => render_update(tree, root, ctx),
        QueryAction::Delete => render_delete(tree, root, ctx),
        QueryAction::DdlCreateTable => render_ddl(tree, root, ctx),
    }
}

fn find_child(tree: &NodeTree, parent: NodeHandle, tag: NodeTag) -> NodesResult<Option<NodeHandle>> {
    for &child in tree.children(parent)? {
        if tree.tag(child)? == tag {
            return Ok(Some(child));
        }
    }
    Ok(None)
}

fn require_child(tree: &NodeTree, parent: NodeHandle, tag: NodeTag, who: &'static str) -> NodesResult<NodeHandle> {
    find_child(tree, parent, tag)?.ok_or(NodesError::MissingChild(who, tag))
}

fn table_name(tree: &NodeTree, from: NodeHandle, ctx: &NodeSqlCmdContext) -> NodesResult<String> {
    if let Some(name) = &ctx.override_table {
        return Ok(name.clone());
    }
    let NodeKind::From(f) = tree.kind(from)? else {
        return Err(NodesError::KindMismatch(tree.tag(from)?));
    };
    Ok(match &f.alias {
        Some(alias) => format!("{} AS {}", f.table_name, alias),
        None => f.table_name.clone(),
    })
}

fn render_field(tree: &NodeTree, field: NodeHandle) -> NodesResult<String> {
    let NodeKind::Field(f) = tree.kind(field)? else {
        return Err(NodesError::KindMismatch(tree.tag(field)?));
    };
    let base = match &f.expr {
        FieldExpr::Column { table_alias, name } => match table_alias {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.clone(),
        },
        FieldExpr::Star { table_alias } => match table_alias {
            Some(alias) => format!("{}.*", alias),
            None => "*".to_string(),
        },
        FieldExpr::Param(idx) => format!("${}", idx + 1),
        FieldExpr::Literal(v) => render_literal(v),
    };
    Ok(match &f.output_alias {
        Some(alias) => format!("{} AS {}", base, alias),
        None => base,
    })
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Bytes(b) => format!("'{}'", String::from_utf8_lossy(b).replace('\'', "''")),
    }
}

fn render_field_list(tree: &NodeTree, list: NodeHandle) -> NodesResult<String> {
    let children = tree.children(list)?;
    if children.is_empty() {
        return Ok("*".to_string());
    }
    let mut parts = Vec::with_capacity(children.len());
    for &c in children {
        parts.push(render_field(tree, c)?);
    }
    Ok(parts.join(", "))
}

fn render_operand(ctx: &mut NodeSqlCmdContext, operand: &QualOperand) -> NodesResult<String> {
    match operand {
        QualOperand::Column(name) => Ok(name.clone()),
        QualOperand::Param(idx) => Ok(format!("${}", idx + 1)),
        QualOperand::Literal(v) => Ok(ctx.render_param(v.clone())),
        QualOperand::HtpList(_) => Err(NodesError::CheckFailed(
            "HTP list qual must be flattened before rendering".into(),
        )),
        QualOperand::ValueList(values) => {
            let rendered: Vec<String> = values.iter().map(|v| ctx.render_param(v.clone())).collect();
            Ok(format!("({})", rendered.join(", ")))
        }
    }
}

fn qual_op_sql(op: QualOp) -> &'static str {
    match op {
        QualOp::And => "AND",
        QualOp::Or => "OR",
        QualOp::Eq => "=",
        QualOp::Ne => "<>",
        QualOp::Lt => "<",
        QualOp::Le => "<=",
        QualOp::Gt => ">",
        QualOp::Ge => ">=",
        QualOp::In => "IN",
    }
}

fn render_qual(tree: &NodeTree, qual: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let NodeKind::Qual(q) = tree.kind(qual)?.clone() else {
        return Err(NodesError::KindMismatch(tree.tag(qual)?));
    };
    ctx.mark_tag(NodeTag::Qual);

    if q.op.is_boolean() {
        let mut parts = Vec::new();
        for &child in tree.children(qual)? {
            parts.push(format!("({})", render_qual(tree, child, ctx)?));
        }
        let joiner = format!(" {} ", qual_op_sql(q.op));
        return Ok(parts.join(&joiner));
    }

    let lhs = q.lhs.as_ref().ok_or(NodesError::CheckFailed("comparison qual missing lhs".into()))?;
    let rhs = q.rhs.as_ref().ok_or(NodesError::CheckFailed("comparison qual missing rhs".into()))?;
    Ok(format!(
        "({} {} {})",
        render_operand(ctx, lhs)?,
        qual_op_sql(q.op),
        render_operand(ctx, rhs)?
    ))
}

fn render_order_by_list(tree: &NodeTree, list: NodeHandle) -> NodesResult<String> {
    let mut parts = Vec::new();
    for &c in tree.children(list)? {
        let NodeKind::OrderBy(ob) = tree.kind(c)? else {
            return Err(NodesError::KindMismatch(tree.tag(c)?));
        };
        let dir = match ob.direction {
            crate::kind::SortDirection::Asc => "ASC",
            crate::kind::SortDirection::Desc => "DESC",
        };
        parts.push(format!("{} {}", ob.field_name, dir));
    }
    Ok(parts.join(", "))
}

fn render_select(tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let field_list = require_child(tree, root, NodeTag::FieldList, "Select")?;
    let from_list = require_child(tree, root, NodeTag::FromList, "Select")?;
    let from = tree
        .children(from_list)?
        .first()
        .copied()
        .ok_or(NodesError::MissingChild("FromList", NodeTag::From))?;

    let mut sql = format!("SELECT {} FROM {}", render_field_list(tree, field_list)?, table_name(tree, from, ctx)?);

    if let Some(join_list) = find_child(tree, root, NodeTag::JoinList)? {
        for &join in tree.children(join_list)? {
            let NodeKind::Join(j) = tree.kind(join)?.clone() else {
                return Err(NodesError::KindMismatch(tree.tag(join)?));
            };
            let kw = match j.kind {
                crate::kind::JoinKind::Inner => "INNER JOIN",
                crate::kind::JoinKind::Left => "LEFT JOIN",
                crate::kind::JoinKind::Right => "RIGHT JOIN",
                crate::kind::JoinKind::Full => "FULL JOIN",
            };
            let target = match &j.alias {
                Some(alias) => format!("{} AS {}", j.table_name, alias),
                None => j.table_name.clone(),
            };
            sql.push_str(&format!(" {} {}", kw, target));
            if let Some(&qual) = tree.children(join)?.first() {
                sql.push_str(&format!(" ON {}", render_qual(tree, qual, ctx)?));
            }
        }
    }

    if let Some(where_node) = find_child(tree, root, NodeTag::Where)? {
        if let Some(&qual) = tree.children(where_node)?.first() {
            sql.push_str(&format!(" WHERE {}", render_qual(tree, qual, ctx)?));
        }
    }

    if let Some(order_by) = find_child(tree, root, NodeTag::OrderByList)? {
        let rendered = render_order_by_list(tree, order_by)?;
        if !rendered.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", rendered));
        }
    }

    if let Some(limit) = find_child(tree, root, NodeTag::Limit)? {
        let NodeKind::Limit(l) = tree.kind(limit)? else {
            return Err(NodesError::KindMismatch(tree.tag(limit)?));
        };
        sql.push_str(&format!(" LIMIT {}", l.count));
    }

    if let Some(offset) = find_child(tree, root, NodeTag::Offset)? {
        let NodeKind::Offset(o) = tree.kind(offset)? else {
            return Err(NodesError::KindMismatch(tree.tag(offset)?));
        };
        sql.push_str(&format!(" OFFSET {}", o.count));
    }

    Ok(sql)
}

/// Renders one `FieldList`'s columns as a `(name, rendered-value)` pair
/// list, in field order.
fn render_insert_row(tree: &NodeTree, field_list: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<Vec<(String, String)>> {
    let mut row = Vec::new();
    for &field in tree.children(field_list)? {
        let NodeKind::Field(f) = tree.kind(field)?.clone() else {
            return Err(NodesError::KindMismatch(tree.tag(field)?));
        };
        let FieldExpr::Column { name, .. } = &f.expr else {
            return Err(NodesError::CheckFailed("insert field must be a column".into()));
        };
        let value = match f.assign_value {
            Some(v) => ctx.render_param(v),
            None => "DEFAULT".to_string(),
        };
        row.push((name.clone(), value));
    }
    Ok(row)
}

/// `INSERT`/`BulkInsert` both render as `VALUES (row), (row), ...` --
/// a plain `Insert` just always has exactly one `FieldList` row.
fn render_insert(tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let from_list = require_child(tree, root, NodeTag::FromList, "Insert")?;
    let from = tree
        .children(from_list)?
        .first()
        .copied()
        .ok_or(NodesError::MissingChild("FromList", NodeTag::From))?;

    let row_lists: Vec<NodeHandle> = tree
        .children(root)?
        .iter()
        .copied()
        .filter(|&c| tree.tag(c) == Ok(NodeTag::FieldList))
        .collect();
    if row_lists.is_empty() {
        return Err(NodesError::MissingChild("Insert", NodeTag::FieldList));
    }

    let first_row = render_insert_row(tree, row_lists[0], ctx)?;
    let names: Vec<String> = first_row.iter().map(|(n, _)| n.clone()).collect();
    let mut value_groups = vec![format!("({})", first_row.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>().join(", "))];

    for &field_list in &row_lists[1..] {
        let row = render_insert_row(tree, field_list, ctx)?;
        value_groups.push(format!("({})", row.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>().join(", ")));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        table_name(tree, from, ctx)?,
        names.join(", "),
        value_groups.join(", ")
    ))
}

fn render_update(tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let field_list = require_child(tree, root, NodeTag::FieldList, "Update")?;
    let from_list = require_child(tree, root, NodeTag::FromList, "Update")?;
    let from = tree
        .children(from_list)?
        .first()
        .copied()
        .ok_or(NodesError::MissingChild("FromList", NodeTag::From))?;

    let mut assignments = Vec::new();
    for &field in tree.children(field_list)? {
        let NodeKind::Field(f) = tree.kind(field)?.clone() else {
            return Err(NodesError::KindMismatch(tree.tag(field)?));
        };
        let FieldExpr::Column { name, .. } = &f.expr else {
            return Err(NodesError::CheckFailed("update field must be a column".into()));
        };
        let value = match f.assign_value {
            Some(v) => ctx.render_param(v),
            None => continue,
        };
        assignments.push(format!("{} = {}", name, value));
    }

    let mut sql = format!(
        "UPDATE {} SET {}",
        table_name(tree, from, ctx)?,
        assignments.join(", ")
    );

    if let Some(where_node) = find_child(tree, root, NodeTag::Where)? {
        if let Some(&qual) = tree.children(where_node)?.first() {
            sql.push_str(&format!(" WHERE {}", render_qual(tree, qual, ctx)?));
        }
    }

    Ok(sql)
}

fn render_delete(tree: &NodeTree, root: NodeHandle, ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let from_list = require_child(tree, root, NodeTag::FromList, "Delete")?;
    let from = tree
        .children(from_list)?
        .first()
        .copied()
        .ok_or(NodesError::MissingChild("FromList", NodeTag::From))?;

    let mut sql = format!("DELETE FROM {}", table_name(tree, from, ctx)?);

    if let Some(where_node) = find_child(tree, root, NodeTag::Where)? {
        if let Some(&qual) = tree.children(where_node)?.first() {
            sql.push_str(&format!(" WHERE {}", render_qual(tree, qual, ctx)?));
        }
    }

    Ok(sql)
}

fn render_ddl(tree: &NodeTree, root: NodeHandle, _ctx: &mut NodeSqlCmdContext) -> NodesResult<String> {
    let ddl_node = require_child(tree, root, NodeTag::DdlCommand, "DdlCreateTable")?;
    let NodeKind::DdlCommand(ddl) = tree.kind(ddl_node)?.clone() else {
        return Err(NodesError::KindMismatch(tree.tag(ddl_node)?));
    };
    Ok(format!(
        "CREATE TABLE {} ({})",
        ddl.table_name,
        ddl.column_defs.join(", ")
    ))
}
