//! SearchPath: a generic "find zero, one, or more data points"
//! abstraction used to resolve a [`crate::preptup::PrepTup`] column's
//! source. Grounded on `SearchPathFuncTableData` in `searchpath.h`;
//! the original's tagged variadic context arguments become a single
//! typed [`SearchContext`] struct, and the function-pointer table
//! becomes a trait.

use crate::field::FieldId;
use crate::table_def::TableId;

/// What a search resolved to. Mirrors the `SPRET` enum.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPathResult {
    DataAt(Vec<u8>),
    Table(TableId),
    TableVersion(String),
    Field(FieldId),
}

/// Replaces the tagged varargs list (`VH_SP_CTX_HT`, `VH_SP_CTX_FNAME`,
/// ...): every context a `SearchPath` implementation might consult, in
/// one place. Implementations read only the fields they need.
#[derive(Debug, Default, Clone)]
pub struct SearchContext {
    pub table: Option<TableId>,
    pub table_version: Option<String>,
    pub field_name: Option<String>,
    pub field_index: Option<FieldId>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub nest_level: Option<i32>,
}

pub trait SearchPath {
    /// `vh_sp_search`: resolve against `ctx`, returning the first
    /// (or only) match.
    fn search(&mut self, ctx: &SearchContext) -> Option<SearchPathResult>;

    /// `vh_sp_search`'s iterator continuation (`next`).
    fn next(&mut self) -> Option<SearchPathResult> {
        None
    }

    /// `vh_sp_reset`.
    fn reset(&mut self) {}
}

/// Resolves a field by name against whichever table is named in the
/// context -- the search path a PrepCol column typically runs.
pub struct FieldNameSearchPath;

impl SearchPath for FieldNameSearchPath {
    fn search(&mut self, ctx: &SearchContext) -> Option<SearchPathResult> {
        let name = ctx.field_name.clone()?;
        Some(SearchPathResult::DataAt(name.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_search_path_resolves_when_context_has_a_name() {
        let mut sp = FieldNameSearchPath;
        let ctx = SearchContext {
            field_name: Some("customer_id".into()),
            ..Default::default()
        };
        assert!(sp.search(&ctx).is_some());
    }

    #[test]
    fn field_name_search_path_is_empty_without_a_name() {
        let mut sp = FieldNameSearchPath;
        assert!(sp.search(&SearchContext::default()).is_none());
    }
}
