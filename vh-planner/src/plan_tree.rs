//! `PlanTree`: the keyed cross-reference maps the planner accumulates
//! while walking a query's node tree, named directly after the
//! `PlanTreeData` fields the planning passes below populate.

use std::collections::{HashMap, HashSet};

use vh_catalog::{RelationCardinality, TableCatalog, TableId};
use vh_heap::HeapTuplePtr;
use vh_nodes::{NodeHandle, NodeKind, NodeTag, NodeTree, QualOperand, QueryNode};

use crate::error::{PlanError, PlanResult};

#[derive(Default)]
pub struct PlanTree {
    pub htp_beacons: HashMap<String, Vec<HeapTuplePtr>>,
    pub htp_tds: HashMap<TableId, Vec<HeapTuplePtr>>,
    pub htp_quals: HashMap<NodeHandle, Vec<HeapTuplePtr>>,
    pub htp: HashSet<HeapTuplePtr>,
    pub td_beacons: HashMap<String, Vec<TableId>>,
    pub td_htp: HashMap<HeapTuplePtr, TableId>,
    /// From|Join -> [Qual] it directly participates in.
    pub node_fj: HashMap<NodeHandle, Vec<NodeHandle>>,
    pub node_htp: HashMap<HeapTuplePtr, Vec<NodeHandle>>,
    pub node_td: HashMap<TableId, Vec<NodeHandle>>,
    /// Qual -> [From|Join] it references.
    pub node_qual: HashMap<NodeHandle, Vec<NodeHandle>>,
    /// The join tree: From|Join -> (From|Join -> [Qual joining them]).
    pub node_jt: HashMap<NodeHandle, HashMap<NodeHandle, Vec<NodeHandle>>>,
    pub beacon_roots: Vec<crate::beacon_root::PlanBeaconRoot>,

    /// Not one of the spec's named maps; internal bookkeeping so pass
    /// 2 can ask "which table does this From/Join node scan".
    table_of_node: HashMap<NodeHandle, TableId>,
}

fn table_of(kind: &NodeKind) -> Option<TableId> {
    match kind {
        NodeKind::From(f) => Some(f.table),
        NodeKind::Join(j) => Some(j.table),
        _ => None,
    }
}

fn alias_of(kind: &NodeKind) -> Option<&str> {
    match kind {
        NodeKind::From(f) => f.alias.as_deref().or(Some(f.table_name.as_str())),
        NodeKind::Join(j) => j.alias.as_deref().or(Some(j.table_name.as_str())),
        _ => None,
    }
}

impl PlanTree {
    /// `vh_plan_build`: runs the pullup-TDs pass then the qual-scan
    /// pass over `root` (a `Query` node) and returns the populated
    /// tree.
    pub fn build(tree: &NodeTree, root: NodeHandle, catalog: &TableCatalog) -> PlanResult<Self> {
        let mut plan = PlanTree::default();
        plan.pullup_tds(tree, root)?;
        plan.scan_quals(tree, root, catalog)?;
        plan.pullup_target_htps(tree, root)?;
        Ok(plan)
    }

    /// Pass 1: record every From/Join node under `node_td` (and the
    /// internal table_of_node map pass 2 consults).
    fn pullup_tds(&mut self, tree: &NodeTree, root: NodeHandle) -> PlanResult<()> {
        let mut seen = Vec::new();
        tree.visit_tree(root, &mut |handle, entry| {
            if let Some(table) = table_of(&entry.kind) {
                seen.push((handle, table));
            }
            true
        });
        for (node, table) in seen {
            self.node_td.entry(table).or_default().push(node);
            self.table_of_node.insert(node, table);
        }
        Ok(())
    }

    fn resolve_column_node(&self, tree: &NodeTree, name: &str) -> Option<NodeHandle> {
        let alias = name.split('.').next().unwrap_or(name);
        let mut candidate = None;
        for (&node, _) in &self.table_of_node {
            let Ok(kind) = tree.kind(node) else { continue };
            if alias_of(kind) == Some(alias) {
                return Some(node);
            }
            if candidate.is_none() {
                candidate = Some(node);
            }
        }
        // bare column name with exactly one scanned table: assume it.
        if !name.contains('.') && self.table_of_node.len() == 1 {
            return candidate;
        }
        None
    }

    /// Pass 2: for every comparison Qual, resolve both sides to a
    /// scanning node where possible and either attach the qual to its
    /// single table (`node_fj`/`node_qual`) or, when it joins two
    /// different tables, fold it into the join tree (`node_jt`),
    /// flipping lhs/rhs per the natural `TableRel` when a many-to-one
    /// relationship dictates the ordering.
    fn scan_quals(&mut self, tree: &NodeTree, root: NodeHandle, catalog: &TableCatalog) -> PlanResult<()> {
        let mut quals = Vec::new();
        tree.visit_tree(root, &mut |handle, entry| {
            if entry.tag == NodeTag::Qual {
                if let NodeKind::Qual(q) = &entry.kind {
                    if !q.op.is_boolean() {
                        quals.push(handle);
                    }
                }
            }
            true
        });

        for qual in quals {
            let NodeKind::Qual(q) = tree.kind(qual)?.clone() else {
                continue;
            };
            let lhs_node = match &q.lhs {
                Some(QualOperand::Column(name)) => self.resolve_column_node(tree, name),
                _ => None,
            };
            let rhs_node = match &q.rhs {
                Some(QualOperand::Column(name)) => self.resolve_column_node(tree, name),
                _ => None,
            };

            match (lhs_node, rhs_node) {
                (Some(a), Some(b)) if a != b => {
                    let (inner, outer) = self.natural_order(catalog, a, b);
                    self.node_jt.entry(inner).or_default().entry(outer).or_default().push(qual);
                    self.node_jt.entry(outer).or_default().entry(inner).or_default().push(qual);
                    self.node_fj.entry(inner).or_default().push(qual);
                    self.node_fj.entry(outer).or_default().push(qual);
                    self.node_qual.entry(qual).or_default().push(inner);
                    self.node_qual.entry(qual).or_default().push(outer);
                }
                (Some(node), None) | (None, Some(node)) => {
                    self.node_fj.entry(node).or_default().push(qual);
                    self.node_qual.entry(qual).or_default().push(node);
                }
                (Some(a), Some(_)) => {
                    // Same node on both sides (self-comparison); still
                    // register it against that node.
                    self.node_fj.entry(a).or_default().push(qual);
                    self.node_qual.entry(qual).or_default().push(a);
                }
                (None, None) => {
                    return Err(PlanError::QueryMalformed(
                        "qual does not reference any scanned table".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// many-to-one flips lhs/rhs: the side on the "many" end of the
    /// relationship is treated as inner (it owns the foreign key).
    fn natural_order(&self, catalog: &TableCatalog, a: NodeHandle, b: NodeHandle) -> (NodeHandle, NodeHandle) {
        let (Some(&ta), Some(&tb)) = (self.table_of_node.get(&a), self.table_of_node.get(&b)) else {
            return (a, b);
        };
        if let Some(rel) = catalog.find_rel(ta, tb) {
            if rel.cardinality == RelationCardinality::ManyToOne {
                return (b, a);
            }
        }
        (a, b)
    }

    /// Handles `QueryNode::target_htps`: a direct-HTP update/delete
    /// bypasses qual resolution, so those HTPs are folded straight
    /// into `htp`/`td_htp`/`node_htp` against the query's single From
    /// table.
    fn pullup_target_htps(&mut self, tree: &NodeTree, root: NodeHandle) -> PlanResult<()> {
        let NodeKind::Query(QueryNode { target_htps, .. }) = tree.kind(root)?.clone() else {
            return Ok(());
        };
        if target_htps.is_empty() {
            return Ok(());
        }
        let table = self
            .table_of_node
            .values()
            .next()
            .copied()
            .ok_or_else(|| PlanError::QueryMalformed("direct-HTP query has no From table".into()))?;
        let from_node = *self
            .node_td
            .get(&table)
            .and_then(|nodes| nodes.first())
            .ok_or_else(|| PlanError::QueryMalformed("direct-HTP query has no From node".into()))?;

        for htp in target_htps {
            self.htp.insert(htp);
            self.td_htp.insert(htp, table);
            self.htp_tds.entry(table).or_default().push(htp);
            self.node_htp.entry(htp).or_default().push(from_node);
        }
        Ok(())
    }
}
