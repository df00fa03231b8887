use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;

use crate::tam::{Tam, TamPreference, TamRole};

/// Identifies a registered [`TypeDescriptor`]. The TypeVar tag word
/// (SPEC_FULL.md section 6) only has 13 bits for the type id, so any
/// id that must round-trip through a TypeVar tag must stay below
/// `TypeId::MAX_TAGGABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u16);

impl TypeId {
    pub const MAX_TAGGABLE: u16 = 0x1FFF;
}

/// Identifies a back-end (driver) for the purposes of TAM
/// specialization. Opaque at this layer, same as `Shard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackEndId(pub u32);

#[derive(Debug, Error)]
pub enum TypeRegistryError {
    #[error("type id {0:?} is already registered")]
    DuplicateId(TypeId),
    #[error("type name {0:?} is already registered")]
    DuplicateName(String),
    #[error("type id {0:?} exceeds the 13-bit TypeVar tag range")]
    IdNotTaggable(TypeId),
    #[error("unknown type id {0:?}")]
    UnknownId(TypeId),
    #[error("unknown type name {0:?}")]
    UnknownName(String),
    #[error("type stack exceeds the maximum depth of {max}")]
    StackTooDeep { max: usize },
    #[error("no TAM registered for role {role:?} on type {ty:?}")]
    UnsupportedConversion { role: TamRole, ty: TypeId },
}

pub type CompareFn = fn(&[u8], &[u8]) -> Ordering;

/// A registered, named type descriptor (spec.md section 4.1).
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: String,
    pub size: u32,
    pub max_align: u32,
    pub compare: CompareFn,
    /// The accumulator type used when this type participates in a
    /// widening aggregate (e.g. int16 -> int64, float -> double).
    /// `None` means the type accumulates into itself.
    pub accumulator: Option<TypeId>,
    pub tam: Tam,
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("max_align", &self.max_align)
            .field("accumulator", &self.accumulator)
            .finish()
    }
}

/// The process-wide type registry. Types compose into type stacks
/// (spec.md section 3); the registry only tracks individual types and
/// per-(backend, type) TAM overrides.
#[derive(Default)]
pub struct TypeRegistry {
    by_id: HashMap<TypeId, TypeDescriptor>,
    by_name: HashMap<String, TypeId>,
    /// TAM overrides keyed by (backend, type) -- the "per-backend +
    /// per-type" preference tier in the dispatch order (section 4.1).
    backend_tam: HashMap<(BackEndId, TypeId), Tam>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, desc: TypeDescriptor) -> Result<TypeId, TypeRegistryError> {
        if desc.id.0 > TypeId::MAX_TAGGABLE {
            return Err(TypeRegistryError::IdNotTaggable(desc.id));
        }
        if self.by_id.contains_key(&desc.id) {
            return Err(TypeRegistryError::DuplicateId(desc.id));
        }
        if self.by_name.contains_key(&desc.name) {
            return Err(TypeRegistryError::DuplicateName(desc.name));
        }
        let id = desc.id;
        self.by_name.insert(desc.name.clone(), id);
        self.by_id.insert(id, desc);
        Ok(id)
    }

    /// Register a back-end-specific TAM override for an already
    /// registered type.
    pub fn register_backend_tam(
        &mut self,
        backend: BackEndId,
        ty: TypeId,
        tam: Tam,
    ) -> Result<(), TypeRegistryError> {
        if !self.by_id.contains_key(&ty) {
            return Err(TypeRegistryError::UnknownId(ty));
        }
        self.backend_tam.insert((backend, ty), tam);
        Ok(())
    }

    pub fn by_id(&self, id: TypeId) -> Result<&TypeDescriptor, TypeRegistryError> {
        self.by_id.get(&id).ok_or(TypeRegistryError::UnknownId(id))
    }

    pub fn by_name(&self, name: &str) -> Result<&TypeDescriptor, TypeRegistryError> {
        let id = self
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| TypeRegistryError::UnknownName(name.to_string()))?;
        self.by_id(id)
    }

    /// Resolve the TAM to use for `ty` under an optional `backend`,
    /// walking the preference order the caller supplies (deepest
    /// specialization wins -- section 4.1).
    pub fn resolve_tam<'a>(
        &'a self,
        ty: TypeId,
        backend: Option<BackEndId>,
        preference: &[TamPreference],
    ) -> Result<&'a Tam, TypeRegistryError> {
        let base = &self.by_id(ty)?.tam;
        for pref in preference {
            match pref {
                TamPreference::PerBackendPerType => {
                    if let Some(backend) = backend {
                        if let Some(tam) = self.backend_tam.get(&(backend, ty)) {
                            return Ok(tam);
                        }
                    }
                }
                TamPreference::PerType => return Ok(base),
            }
        }
        Ok(base)
    }

    /// Compute the accumulator type id for `ty`, idempotent per
    /// spec.md section 8 (`accumulator(accumulator(S)) == accumulator(S)`).
    pub fn accumulator_of(&self, ty: TypeId) -> Result<TypeId, TypeRegistryError> {
        let desc = self.by_id(ty)?;
        Ok(desc.accumulator.unwrap_or(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tam::Tam;

    fn int_desc(id: u16, name: &str, accumulator: Option<TypeId>) -> TypeDescriptor {
        TypeDescriptor {
            id: TypeId(id),
            name: name.to_string(),
            size: 4,
            max_align: 4,
            compare: |a, b| a.cmp(b),
            accumulator,
            tam: Tam::default(),
        }
    }

    #[test]
    fn rejects_duplicate_id_and_name() {
        let mut reg = TypeRegistry::new();
        reg.register(int_desc(1, "int32", None)).unwrap();
        assert!(matches!(
            reg.register(int_desc(1, "other", None)),
            Err(TypeRegistryError::DuplicateId(_))
        ));
        assert!(matches!(
            reg.register(int_desc(2, "int32", None)),
            Err(TypeRegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn accumulator_is_idempotent() {
        let mut reg = TypeRegistry::new();
        let i64id = reg.register(int_desc(2, "int64", None)).unwrap();
        reg.register(int_desc(1, "int16", Some(i64id))).unwrap();

        let a1 = reg.accumulator_of(TypeId(1)).unwrap();
        let a2 = reg.accumulator_of(a1).unwrap();
        assert_eq!(a1, i64id);
        assert_eq!(a2, i64id);
    }

    #[test]
    fn rejects_ids_outside_tag_range() {
        let mut reg = TypeRegistry::new();
        let err = reg.register(int_desc(0x3000, "too big", None)).unwrap_err();
        assert!(matches!(err, TypeRegistryError::IdNotTaggable(_)));
    }
}
