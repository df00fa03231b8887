//! TypeVar: a live, tag-prefixed dynamic value (spec.md section 3/4.2).
//!
//! Internally we follow the design note in spec.md section 9 and use
//! a sum type plus an interned [`TypeStack`] identity rather than the
//! original in-memory tag-prefix trick -- the prefix is a storage
//! density choice, not a semantic one. The bit-exact 16-bit tag word
//! required for wire compatibility (spec.md section 6) is still
//! produced/consumed by [`TypeTag`], used only at the encode/decode
//! boundary.

use crate::registry::{TypeId, TypeRegistry, TypeRegistryError};
use crate::stack::TypeStack;

/// The 16-bit wire tag (spec.md section 6). Bit 15 = array flag, bit
/// 14 = end-of-stack, bit 13 = magic, bits 12..0 = type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag(pub u16);

const ARRAY_FLAG: u16 = 0x8000;
const END_FLAG: u16 = 0x4000;
const MAGIC_FLAG: u16 = 0x2000;
const ID_MASK: u16 = 0x1FFF;

impl TypeTag {
    pub fn standalone(id: TypeId) -> Self {
        TypeTag(END_FLAG | MAGIC_FLAG | (id.0 & ID_MASK))
    }

    pub fn chained(id: TypeId) -> Self {
        TypeTag(MAGIC_FLAG | (id.0 & ID_MASK))
    }

    pub fn array(back_distance: u16) -> Self {
        TypeTag(ARRAY_FLAG | (back_distance & ID_MASK))
    }

    pub fn is_array(&self) -> bool {
        self.0 & ARRAY_FLAG != 0
    }

    pub fn is_end(&self) -> bool {
        self.0 & END_FLAG != 0
    }

    pub fn is_magic(&self) -> bool {
        self.0 & MAGIC_FLAG != 0
    }

    pub fn type_id(&self) -> TypeId {
        TypeId(self.0 & ID_MASK)
    }

    /// Validates one of the three combinations spec.md section 6
    /// allows: array-chained, end-of-stack, or mid-stack.
    pub fn is_valid(&self) -> bool {
        match (self.is_array(), self.is_end(), self.is_magic()) {
            (true, false, false) => true,
            (false, true, true) => true,
            (false, false, true) => true,
            _ => false,
        }
    }
}

/// A live dynamic value. Primitives are held inline; anything with a
/// wider or variable-length representation (Strings, nested
/// composites) is held as its memset-encoded byte form alongside the
/// stack that identifies how to interpret it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Null,
}

/// A tag-identified dynamic value: the [`TypeStack`] gives the value
/// its identity, `bytes` holds the memset-encoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVar {
    stack: TypeStack,
    bytes: Vec<u8>,
}

impl TypeVar {
    /// `vh_typevar_make`: construct a value for `stack`, zero-filled
    /// and then run through the innermost type's construct TAM (so
    /// e.g. an inline-buffer String initializes itself).
    pub fn make(registry: &TypeRegistry, stack: TypeStack) -> Result<Self, TypeRegistryError> {
        let inner = stack
            .innermost()
            .ok_or(TypeRegistryError::UnknownId(TypeId(0)))?;
        let desc = registry.by_id(inner)?;
        let mut bytes = vec![0u8; desc.size as usize];
        if let Some(construct) = desc.tam.construct {
            construct(&mut bytes);
        }
        Ok(TypeVar { stack, bytes })
    }

    pub fn from_bytes(stack: TypeStack, bytes: Vec<u8>) -> Self {
        TypeVar { stack, bytes }
    }

    pub fn stack(&self) -> &TypeStack {
        &self.stack
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// `vh_typevar_makecopy`: produces an independent value.
    pub fn makecopy(&self) -> Self {
        self.clone()
    }

    /// `vh_typevar_move`: transfers ownership, leaving `self` an
    /// empty placeholder of the same stack so a double-destruct is
    /// harmless.
    pub fn move_out(&mut self) -> Self {
        let stack = self.stack.clone();
        let bytes = std::mem::take(&mut self.bytes);
        TypeVar { stack, bytes }
    }

    /// `vh_typevar_destroy`: run the innermost type's destruct TAM.
    pub fn destroy(mut self, registry: &TypeRegistry) -> Result<(), TypeRegistryError> {
        if let Some(inner) = self.stack.innermost() {
            let desc = registry.by_id(inner)?;
            if let Some(destruct) = desc.tam.destruct {
                destruct(&mut self.bytes);
            }
        }
        Ok(())
    }

    /// `vh_typevar_isatys`.
    pub fn isa(&self, stack: &TypeStack) -> bool {
        &self.stack == stack
    }

    /// Value equality via the innermost type's registered comparator
    /// (spec.md section 8: `value_of(makecopy(v)) == value_of(v)`).
    pub fn value_eq(&self, other: &TypeVar, registry: &TypeRegistry) -> Result<bool, TypeRegistryError> {
        if self.stack != other.stack {
            return Ok(false);
        }
        let inner = self
            .stack
            .innermost()
            .ok_or(TypeRegistryError::UnknownId(TypeId(0)))?;
        let desc = registry.by_id(inner)?;
        Ok((desc.compare)(&self.bytes, &other.bytes) == std::cmp::Ordering::Equal)
    }
}

/// `vh_typearray_make`: `count` contiguous slots sharing one stack
/// identity. Rust drops the in-memory back-distance trick (there is
/// no pointer arithmetic to economize here) but keeps the "one stack
/// for the whole array" identity the original optimizes for.
pub struct TypeVarArray {
    stack: TypeStack,
    element_size: usize,
    data: Vec<u8>,
}

impl TypeVarArray {
    pub fn make(
        registry: &TypeRegistry,
        count: usize,
        stack: TypeStack,
    ) -> Result<Self, TypeRegistryError> {
        let inner = stack
            .innermost()
            .ok_or(TypeRegistryError::UnknownId(TypeId(0)))?;
        let desc = registry.by_id(inner)?;
        let element_size = desc.size as usize;
        let mut data = vec![0u8; element_size * count];
        if let Some(construct) = desc.tam.construct {
            for chunk in data.chunks_mut(element_size) {
                construct(chunk);
            }
        }
        Ok(TypeVarArray {
            stack,
            element_size,
            data,
        })
    }

    pub fn len(&self) -> usize {
        if self.element_size == 0 {
            0
        } else {
            self.data.len() / self.element_size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, idx: usize) -> Option<&[u8]> {
        let start = idx.checked_mul(self.element_size)?;
        self.data.get(start..start + self.element_size)
    }

    pub fn at_mut(&mut self, idx: usize) -> Option<&mut [u8]> {
        let start = idx.checked_mul(self.element_size)?;
        self.data.get_mut(start..start + self.element_size)
    }

    pub fn push(&mut self, element: &[u8]) {
        debug_assert_eq!(element.len(), self.element_size);
        self.data.extend_from_slice(element);
    }

    pub fn pop(&mut self) -> bool {
        if self.data.len() >= self.element_size {
            self.data.truncate(self.data.len() - self.element_size);
            true
        } else {
            false
        }
    }

    pub fn stack(&self) -> &TypeStack {
        &self.stack
    }

    /// `vh_typearray_iterate`: visits each element until the callback
    /// returns `false`.
    pub fn iterate(&self, mut cb: impl FnMut(usize, &[u8]) -> bool) {
        for idx in 0..self.len() {
            if !cb(idx, self.at(idx).unwrap()) {
                break;
            }
        }
    }

    pub fn destroy(self, registry: &TypeRegistry) -> Result<(), TypeRegistryError> {
        if let Some(inner) = self.stack.innermost() {
            let desc = registry.by_id(inner)?;
            if let Some(destruct) = desc.tam.destruct {
                let mut data = self.data;
                for chunk in data.chunks_mut(self.element_size) {
                    destruct(chunk);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeDescriptor;
    use crate::tam::Tam;

    fn int32_registry() -> (TypeRegistry, TypeId) {
        let mut reg = TypeRegistry::new();
        let id = reg
            .register(TypeDescriptor {
                id: TypeId(1),
                name: "int32".into(),
                size: 4,
                max_align: 4,
                compare: |a, b| a.cmp(b),
                accumulator: None,
                tam: Tam::default(),
            })
            .unwrap();
        (reg, id)
    }

    #[test]
    fn tag_round_trips_standalone() {
        let tag = TypeTag::standalone(TypeId(42));
        assert!(tag.is_valid());
        assert!(tag.is_end());
        assert!(tag.is_magic());
        assert!(!tag.is_array());
        assert_eq!(tag.type_id(), TypeId(42));
    }

    #[test]
    fn tag_round_trips_array() {
        let tag = TypeTag::array(7);
        assert!(tag.is_valid());
        assert!(tag.is_array());
        assert!(!tag.is_end());
        assert!(!tag.is_magic());
    }

    #[test]
    fn makecopy_then_destroy_preserves_value_equality() {
        let (reg, id) = int32_registry();
        let stack = TypeStack::new(vec![id]).unwrap();
        let mut tv = TypeVar::make(&reg, stack).unwrap();
        tv.bytes_mut().copy_from_slice(&42i32.to_le_bytes());

        let copy = tv.makecopy();
        assert!(tv.value_eq(&copy, &reg).unwrap());

        tv.destroy(&reg).unwrap();
        copy.destroy(&reg).unwrap();
    }

    #[test]
    fn array_push_pop_round_trips() {
        let (reg, id) = int32_registry();
        let stack = TypeStack::new(vec![id]).unwrap();
        let mut arr = TypeVarArray::make(&reg, 2, stack).unwrap();
        assert_eq!(arr.len(), 2);
        arr.push(&10i32.to_le_bytes());
        assert_eq!(arr.len(), 3);
        assert!(arr.pop());
        assert_eq!(arr.len(), 2);
    }
}
