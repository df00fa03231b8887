//! TypeVarSlot: a uniform container for any value kind used across the
//! query and PrepTup paths (spec.md section 3/4.2).

use crate::typevar::TypeVar;

/// Controls whether a slot's contents are finalised when the slot is
/// reset (spec.md section 3: "A slot carries a release-action enum").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    /// The slot does not own the value; resetting it is a no-op.
    CallerOwned,
    /// The slot owns the value and must run its destructor on reset.
    DestroyOnReset,
    /// The value was moved into the slot from elsewhere; treated the
    /// same as `DestroyOnReset` for finalisation purposes but tracked
    /// separately so callers can tell provenance apart.
    Moved,
}

/// A stable reference to a tuple's field storage, used by the
/// `TupleFieldRef` slot variant. `vh-heap` provides the concrete
/// `HeapTuplePtr`/`HeapField` pair; this crate only needs to name the
/// shape so operator dispatch can route through it uniformly.
pub trait TupleFieldAccessor {
    fn read(&self) -> Option<Vec<u8>>;
    fn write(&mut self, bytes: &[u8]);
}

/// A uniform container holding one of the value kinds the operator
/// and PrepTup machinery may encounter.
pub enum TypeVarSlot<F: TupleFieldAccessor> {
    Null,
    I16(i16),
    I32(i32),
    I64(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Owned(TypeVar, ReleaseAction),
    Field(F),
}

impl<F: TupleFieldAccessor> TypeVarSlot<F> {
    pub fn init_null() -> Self {
        TypeVarSlot::Null
    }

    pub fn store_value(tv: TypeVar) -> Self {
        TypeVarSlot::Owned(tv, ReleaseAction::DestroyOnReset)
    }

    pub fn store_borrowed(tv: TypeVar) -> Self {
        TypeVarSlot::Owned(tv, ReleaseAction::CallerOwned)
    }

    pub fn store_field(accessor: F) -> Self {
        TypeVarSlot::Field(accessor)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypeVarSlot::Null)
    }

    /// Read the slot's bytes in whatever raw form it holds, for
    /// handing to an operator's fast path. Primitives are encoded
    /// little-endian, matching the wire format elsewhere in this
    /// workspace.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            TypeVarSlot::Null => None,
            TypeVarSlot::I16(v) => Some(v.to_le_bytes().to_vec()),
            TypeVarSlot::I32(v) => Some(v.to_le_bytes().to_vec()),
            TypeVarSlot::I64(v) => Some(v.to_le_bytes().to_vec()),
            TypeVarSlot::Float(v) => Some(v.to_le_bytes().to_vec()),
            TypeVarSlot::Double(v) => Some(v.to_le_bytes().to_vec()),
            TypeVarSlot::Bool(v) => Some(vec![*v as u8]),
            TypeVarSlot::Owned(tv, _) => Some(tv.bytes().to_vec()),
            TypeVarSlot::Field(accessor) => accessor.read(),
        }
    }

    /// `vh_tvs_reset` equivalent: honours the release action by
    /// dropping owned values appropriately. Destructor invocation
    /// against the type registry is left to the caller (who must
    /// supply a registry to look up the TAM), so this just reports
    /// whether a destroy call is owed.
    pub fn needs_destroy(&self) -> bool {
        matches!(
            self,
            TypeVarSlot::Owned(_, ReleaseAction::DestroyOnReset)
                | TypeVarSlot::Owned(_, ReleaseAction::Moved)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoField;
    impl TupleFieldAccessor for NoField {
        fn read(&self) -> Option<Vec<u8>> {
            None
        }
        fn write(&mut self, _bytes: &[u8]) {}
    }

    #[test]
    fn immediate_values_round_trip_as_bytes() {
        let slot: TypeVarSlot<NoField> = TypeVarSlot::I32(7);
        assert_eq!(slot.as_bytes(), Some(7i32.to_le_bytes().to_vec()));
    }

    #[test]
    fn null_slot_has_no_bytes_and_no_destroy_owed() {
        let slot: TypeVarSlot<NoField> = TypeVarSlot::Null;
        assert_eq!(slot.as_bytes(), None);
        assert!(!slot.needs_destroy());
    }
}
