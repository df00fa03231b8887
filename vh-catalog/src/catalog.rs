//! TableCatalog: the named registry of tables and declared
//! relationships a planner resolves against. Grounded on
//! `TableCatalogData` in `TableCatalog.h`.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CatalogError;
use crate::rel::TableRel;
use crate::table_def::{TableDef, TableId};

#[derive(Default)]
pub struct TableCatalog {
    tables: HashMap<TableId, TableDef>,
    by_name: HashMap<String, TableId>,
    rels: Vec<TableRel>,
    next_id: u32,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `vh_cat_tbl_createtbl` + `vh_cat_tbl_add`: allocates a fresh
    /// `TableDef` under this catalog and registers it by its fully
    /// qualified name.
    pub fn create_table(
        &mut self,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Result<TableId, CatalogError> {
        let schema_name = schema_name.into();
        let table_name = table_name.into();
        let fq = format!("{}.{}", schema_name, table_name);
        if self.by_name.contains_key(&fq) {
            return Err(CatalogError::DuplicateTableName(fq));
        }

        let id = TableId(self.next_id);
        self.next_id += 1;
        debug!(table = %fq, id = id.0, "registering table");
        self.tables.insert(id, TableDef::new(id, schema_name, table_name));
        self.by_name.insert(fq, id);
        Ok(id)
    }

    /// `vh_cat_tbl_remove`.
    pub fn remove_table(&mut self, id: TableId) -> Result<(), CatalogError> {
        let table = self.tables.remove(&id).ok_or(CatalogError::UnknownTable)?;
        self.by_name.remove(&table.fq_name());
        Ok(())
    }

    /// `vh_cat_tbl_exists` / `vh_cat_tbl_getbyname`.
    pub fn get_by_name(&self, fq_name: &str) -> Result<&TableDef, CatalogError> {
        let id = self
            .by_name
            .get(fq_name)
            .ok_or_else(|| CatalogError::UnknownTableName(fq_name.to_string()))?;
        Ok(&self.tables[id])
    }

    pub fn get(&self, id: TableId) -> Result<&TableDef, CatalogError> {
        self.tables.get(&id).ok_or(CatalogError::UnknownTable)
    }

    pub fn get_mut(&mut self, id: TableId) -> Result<&mut TableDef, CatalogError> {
        self.tables.get_mut(&id).ok_or(CatalogError::UnknownTable)
    }

    pub fn exists(&self, fq_name: &str) -> bool {
        self.by_name.contains_key(fq_name)
    }

    /// `vh_tdr_get` / registration half: the planner looks relations
    /// up by table pair via [`TableCatalog::find_rel`].
    pub fn add_rel(&mut self, rel: TableRel) {
        self.rels.push(rel);
    }

    /// `vh_tdr_get`.
    pub fn find_rel(&self, table_inner: TableId, table_outer: TableId) -> Option<&TableRel> {
        self.rels
            .iter()
            .find(|r| r.table_inner == table_inner && r.table_outer == table_outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_find_by_name() {
        let mut catalog = TableCatalog::new();
        let id = catalog.create_table("public", "orders").unwrap();
        assert!(catalog.exists("public.orders"));
        assert_eq!(catalog.get_by_name("public.orders").unwrap().id, id);
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let mut catalog = TableCatalog::new();
        catalog.create_table("public", "orders").unwrap();
        assert!(matches!(
            catalog.create_table("public", "orders"),
            Err(CatalogError::DuplicateTableName(_))
        ));
    }

    #[test]
    fn remove_then_lookup_fails() {
        let mut catalog = TableCatalog::new();
        let id = catalog.create_table("public", "orders").unwrap();
        catalog.remove_table(id).unwrap();
        assert!(!catalog.exists("public.orders"));
    }
}
