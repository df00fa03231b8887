//! TableDef / TableDefVer: a table's identity and its (possibly
//! several) field layouts. Grounded on `TableDefData`/`TableDefVerData`
//! in `TableDef.h`. Versions model schema evolution (a table gaining a
//! column over time): `TableDef` owns one or more `TableDefVer`, one
//! of which is "leading" (the currently active layout).

use std::collections::HashMap;

use vh_types::TypeStack;

use crate::error::CatalogError;
use crate::field::{FieldId, TableField};

/// Identifies a table within a [`crate::catalog::TableCatalog`].
/// Converts directly into [`vh_shard::TableId`] for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl From<TableId> for vh_shard::TableId {
    fn from(id: TableId) -> Self {
        vh_shard::TableId(id.0)
    }
}

#[derive(Debug, Clone)]
pub struct TableDefVer {
    pub name: String,
    pub ver_num: i32,
    fields: Vec<TableField>,
    field_by_name: HashMap<String, FieldId>,
    pub key_primary: Vec<FieldId>,
    pub key_logical: Vec<FieldId>,
    /// byte offset of this version's first field within a tuple's
    /// data payload, mirrors `reloffset`
    pub reloffset: u32,
    next_offset: u32,
}

impl TableDefVer {
    fn new(name: impl Into<String>, ver_num: i32) -> Self {
        TableDefVer {
            name: name.into(),
            ver_num,
            fields: Vec::new(),
            field_by_name: HashMap::new(),
            key_primary: Vec::new(),
            key_logical: Vec::new(),
            reloffset: 0,
            next_offset: 0,
        }
    }

    /// `vh_tdv_tf_add`: appends a field, laying it out immediately
    /// after the previous one.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        stack: TypeStack,
        nullable: bool,
        size_bytes: u32,
    ) -> Result<FieldId, CatalogError> {
        let name = name.into();
        if self.field_by_name.contains_key(&name) {
            return Err(CatalogError::DuplicateFieldName(name));
        }
        let id = FieldId(self.fields.len() as u16);
        let offset = self.next_offset;
        self.fields.push(TableField {
            id,
            name: name.clone(),
            stack,
            offset,
            nullable,
        });
        self.field_by_name.insert(name, id);
        self.next_offset += size_bytes;
        Ok(id)
    }

    /// `vh_tdv_tf_name`.
    pub fn field_by_name(&self, name: &str) -> Result<&TableField, CatalogError> {
        let id = self
            .field_by_name
            .get(name)
            .ok_or_else(|| CatalogError::UnknownFieldName(name.to_string()))?;
        Ok(&self.fields[id.0 as usize])
    }

    pub fn field(&self, id: FieldId) -> Option<&TableField> {
        self.fields.get(id.0 as usize)
    }

    pub fn fields(&self) -> &[TableField] {
        &self.fields
    }

    pub fn set_primary_key(&mut self, fields: Vec<FieldId>) {
        self.key_primary = fields;
    }

    pub fn set_logical_key(&mut self, fields: Vec<FieldId>) {
        self.key_logical = fields;
    }
}

pub struct TableDef {
    pub id: TableId,
    pub schema_name: String,
    pub table_name: String,
    /// the named beacon a [`vh_shard::BeaconCatalog`] resolves routing
    /// through for this table, if it is sharded differently than the
    /// catalog's default
    pub beacon_name: Option<String>,
    versions: Vec<TableDefVer>,
    leading: usize,
}

impl TableDef {
    pub(crate) fn new(id: TableId, schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        TableDef {
            id,
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            beacon_name: None,
            versions: vec![TableDefVer::new("default", 0)],
            leading: 0,
        }
    }

    /// `vh_tdv_create`: adds a new version, optionally making it the
    /// leading one.
    pub fn create_version(&mut self, name: impl Into<String>, make_leading: bool) -> &mut TableDefVer {
        let ver_num = self.versions.len() as i32;
        self.versions.push(TableDefVer::new(name, ver_num));
        let idx = self.versions.len() - 1;
        if make_leading {
            self.leading = idx;
        }
        &mut self.versions[idx]
    }

    /// `vh_td_tdv_lead`.
    pub fn leading_version(&self) -> &TableDefVer {
        &self.versions[self.leading]
    }

    pub fn leading_version_mut(&mut self) -> &mut TableDefVer {
        &mut self.versions[self.leading]
    }

    /// `vh_td_tdv_ver`.
    pub fn version(&self, name: &str) -> Result<&TableDefVer, CatalogError> {
        self.versions
            .iter()
            .find(|v| v.name == name)
            .ok_or(CatalogError::UnknownVersion)
    }

    pub fn version_mut(&mut self, name: &str) -> Result<&mut TableDefVer, CatalogError> {
        self.versions
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or(CatalogError::UnknownVersion)
    }

    /// `vh_td_copyfqname`: the fully qualified `schema.table` name.
    pub fn fq_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vh_types::{TypeId, TypeStack};

    fn int_stack() -> TypeStack {
        TypeStack::new(vec![TypeId(1)]).unwrap()
    }

    #[test]
    fn adding_fields_lays_them_out_in_order() {
        let mut ver = TableDefVer::new("default", 0);
        let a = ver.add_field("id", int_stack(), false, 4).unwrap();
        let b = ver.add_field("name", int_stack(), true, 8).unwrap();
        assert_eq!(ver.field(a).unwrap().offset, 0);
        assert_eq!(ver.field(b).unwrap().offset, 4);
    }

    #[test]
    fn duplicate_field_name_is_rejected() {
        let mut ver = TableDefVer::new("default", 0);
        ver.add_field("id", int_stack(), false, 4).unwrap();
        assert!(matches!(
            ver.add_field("id", int_stack(), false, 4),
            Err(CatalogError::DuplicateFieldName(_))
        ));
    }

    #[test]
    fn new_version_can_become_leading() {
        let mut td = TableDef::new(TableId(1), "public", "orders");
        td.leading_version_mut()
            .add_field("id", int_stack(), false, 4)
            .unwrap();
        td.create_version("v2", true)
            .add_field("id", int_stack(), false, 4)
            .unwrap();
        assert_eq!(td.leading_version().name, "v2");
    }
}
