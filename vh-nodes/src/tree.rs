//! The node tree itself. Grounded on `NodeData`'s first-child /
//! next-sibling / parent pointers in `Node.h`; here the tree is an
//! [`vh_util::Arena`] of entries, with a node's children held as an
//! ordered `Vec` of handles rather than threaded sibling pointers --
//! an arena slot map gives the same "owned elsewhere, referenced by a
//! small copyable handle" shape the original's raw pointers did, with
//! generation checks instead of dangling pointers.

use vh_util::arena::{Arena, ArenaIndex};

use crate::error::{NodesError, NodesResult};
use crate::kind::NodeKind;
use crate::tag::NodeTag;

pub type NodeHandle = ArenaIndex<NodeEntry>;

pub struct NodeEntry {
    pub tag: NodeTag,
    pub kind: NodeKind,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

/// `NodeCopyState`: threaded through a deep copy so callers can
/// remap or log cross-tree references (a qual's column target, an
/// update's HTP list) that a plain structural clone can't follow.
#[derive(Default)]
pub struct NodeCopyState {
    pub log: Vec<(NodeHandle, NodeHandle)>,
}

#[derive(Default)]
pub struct NodeTree {
    arena: Arena<NodeEntry>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// `vh_nsql_create`.
    pub fn create(&mut self, tag: NodeTag, kind: NodeKind) -> NodeHandle {
        self.arena.insert(NodeEntry {
            tag,
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    fn entry(&self, handle: NodeHandle) -> NodesResult<&NodeEntry> {
        self.arena.get(handle).ok_or(NodesError::UnknownNode)
    }

    fn entry_mut(&mut self, handle: NodeHandle) -> NodesResult<&mut NodeEntry> {
        self.arena.get_mut(handle).ok_or(NodesError::UnknownNode)
    }

    pub fn tag(&self, handle: NodeHandle) -> NodesResult<NodeTag> {
        Ok(self.entry(handle)?.tag)
    }

    pub fn kind(&self, handle: NodeHandle) -> NodesResult<&NodeKind> {
        Ok(&self.entry(handle)?.kind)
    }

    pub fn kind_mut(&mut self, handle: NodeHandle) -> NodesResult<&mut NodeKind> {
        Ok(&mut self.entry_mut(handle)?.kind)
    }

    pub fn parent(&self, handle: NodeHandle) -> NodesResult<Option<NodeHandle>> {
        Ok(self.entry(handle)?.parent)
    }

    pub fn children(&self, handle: NodeHandle) -> NodesResult<&[NodeHandle]> {
        Ok(&self.entry(handle)?.children)
    }

    /// `vh_nsql_child_count`.
    pub fn child_count(&self, handle: NodeHandle) -> NodesResult<usize> {
        Ok(self.entry(handle)?.children.len())
    }

    /// `vh_nsql_child_rappend`: append at the end of the sibling list.
    pub fn child_rappend(&mut self, parent: NodeHandle, child: NodeHandle) -> NodesResult<()> {
        self.entry_mut(child)?.parent = Some(parent);
        self.entry_mut(parent)?.children.push(child);
        Ok(())
    }

    /// `vh_nsql_child_lappend`: insert at the front of the sibling list.
    pub fn child_lappend(&mut self, parent: NodeHandle, child: NodeHandle) -> NodesResult<()> {
        self.entry_mut(child)?.parent = Some(parent);
        self.entry_mut(parent)?.children.insert(0, child);
        Ok(())
    }

    /// `vh_nsql_tree_contains`.
    pub fn tree_contains(&self, root: NodeHandle, target: NodeHandle) -> bool {
        if root == target {
            return true;
        }
        let Ok(children) = self.children(root) else {
            return false;
        };
        children.iter().any(|&c| self.tree_contains(c, target))
    }

    /// `vh_nsql_visit_tree`: pre-order traversal, visitor may halt by
    /// returning `false`.
    pub fn visit_tree(&self, root: NodeHandle, visitor: &mut impl FnMut(NodeHandle, &NodeEntry) -> bool) {
        let Ok(entry) = self.entry(root) else { return };
        if !visitor(root, entry) {
            return;
        }
        for &child in &entry.children.clone() {
            self.visit_tree(child, visitor);
        }
    }

    /// `vh_nsql_copytree`: deep-clones `root` and its whole subtree
    /// into fresh arena slots, returning the new root.
    pub fn copy(&mut self, root: NodeHandle, state: &mut NodeCopyState) -> NodesResult<NodeHandle> {
        let entry = self.entry(root)?;
        let tag = entry.tag;
        let kind = entry.kind.clone();
        let children = entry.children.clone();

        let new_root = self.create(tag, kind);
        for child in children {
            let new_child = self.copy(child, state)?;
            self.child_rappend(new_root, new_child)?;
        }
        state.log.push((root, new_root));
        Ok(new_root)
    }

    /// `vh_nsql_destroytree`: removes `root` and every descendant from
    /// the arena. Rust's `Drop` would reclaim the payload either way;
    /// this additionally frees the arena slots for reuse.
    pub fn destroytree(&mut self, root: NodeHandle) -> NodesResult<()> {
        let children = self.entry(root)?.children.clone();
        for child in children {
            self.destroytree(child)?;
        }
        self.arena.remove(root).ok_or(NodesError::UnknownNode)?;
        Ok(())
    }

    /// `vh_nsql_check` (no single original counterpart -- each node
    /// type validated its own invariants inline). Walks the subtree
    /// and checks the structural invariants SPEC_FULL.md calls out:
    /// every `Query` carries exactly one `FieldList` and one
    /// `FromList` child, and every boolean `Qual` has at least one
    /// `Qual` child while every comparison `Qual` has none.
    pub fn check(&self, root: NodeHandle) -> NodesResult<()> {
        let entry = self.entry(root)?;
        match (&entry.tag, &entry.kind) {
            (NodeTag::Query, NodeKind::Query(q)) => {
                let field_lists = entry
                    .children
                    .iter()
                    .filter(|&&c| self.tag(c) == Ok(NodeTag::FieldList))
                    .count();
                let from_lists = entry
                    .children
                    .iter()
                    .filter(|&&c| self.tag(c) == Ok(NodeTag::FromList))
                    .count();
                // `BulkInsert` carries one `FieldList` per row (`esg_ins`'s
                // multi-row `VALUES` group); every other action carries
                // exactly one.
                let field_lists_ok = if q.action == crate::kind::QueryAction::BulkInsert {
                    field_lists >= 1
                } else {
                    field_lists == 1
                };
                if !field_lists_ok {
                    return Err(NodesError::MissingChild("Query", NodeTag::FieldList));
                }
                if from_lists != 1 {
                    return Err(NodesError::MissingChild("Query", NodeTag::FromList));
                }
            }
            (NodeTag::Qual, NodeKind::Qual(q)) => {
                let sub_quals = entry
                    .children
                    .iter()
                    .filter(|&&c| self.tag(c) == Ok(NodeTag::Qual))
                    .count();
                if q.op.is_boolean() && sub_quals == 0 {
                    return Err(NodesError::CheckFailed(
                        "boolean qual has no sub-qual children".into(),
                    ));
                }
                if !q.op.is_boolean() && (q.lhs.is_none() || q.rhs.is_none()) {
                    return Err(NodesError::CheckFailed(
                        "comparison qual is missing an operand".into(),
                    ));
                }
            }
            _ => {}
        }

        for &child in &entry.children {
            self.check(child)?;
        }
        Ok(())
    }
}
