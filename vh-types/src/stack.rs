use crate::registry::{TypeId, TypeRegistry, TypeRegistryError};

/// Implementation-wide floor on nesting depth (spec.md section 3:
/// "Stack depth has an implementation-wide maximum (>= 8)").
pub const MAX_STACK_DEPTH: usize = 8;

/// A terminator-ended sequence of type identifiers, outer-most to
/// inner-most (e.g. `Array -> Range -> int32`). Two stacks are equal
/// iff the same sequence of ids appears (spec.md section 3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeStack(Vec<TypeId>);

impl TypeStack {
    /// Build a stack from ids already known to the caller, outer-most
    /// first. Fails if the stack exceeds [`MAX_STACK_DEPTH`].
    pub fn new(ids: Vec<TypeId>) -> Result<Self, TypeRegistryError> {
        if ids.len() > MAX_STACK_DEPTH {
            return Err(TypeRegistryError::StackTooDeep {
                max: MAX_STACK_DEPTH,
            });
        }
        Ok(TypeStack(ids))
    }

    /// Build a stack from variadic type names, outer-most first,
    /// resolving each through the registry (spec.md section 4.1:
    /// "build a type stack from variadic names").
    pub fn from_names(registry: &TypeRegistry, names: &[&str]) -> Result<Self, TypeRegistryError> {
        if names.len() > MAX_STACK_DEPTH {
            return Err(TypeRegistryError::StackTooDeep {
                max: MAX_STACK_DEPTH,
            });
        }
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(registry.by_name(name)?.id);
        }
        Ok(TypeStack(ids))
    }

    pub fn ids(&self) -> &[TypeId] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn innermost(&self) -> Option<TypeId> {
        self.0.last().copied()
    }

    pub fn outermost(&self) -> Option<TypeId> {
        self.0.first().copied()
    }

    /// The widening accumulator stack used by aggregate calculations
    /// (e.g. `int16 -> int64`, `float -> double`), applied level by
    /// level. Idempotent: `accumulator(accumulator(S)) == accumulator(S)`.
    pub fn accumulator(&self, registry: &TypeRegistry) -> Result<TypeStack, TypeRegistryError> {
        let ids = self
            .0
            .iter()
            .map(|id| registry.accumulator_of(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypeStack(ids))
    }
}

impl std::fmt::Display for TypeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| format!("{}", id.0)).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeDescriptor;
    use crate::tam::Tam;

    fn registry_with_int_chain() -> (TypeRegistry, TypeId, TypeId) {
        let mut reg = TypeRegistry::new();
        let i64id = reg
            .register(TypeDescriptor {
                id: TypeId(2),
                name: "int64".into(),
                size: 8,
                max_align: 8,
                compare: |a, b| a.cmp(b),
                accumulator: None,
                tam: Tam::default(),
            })
            .unwrap();
        let i16id = reg
            .register(TypeDescriptor {
                id: TypeId(1),
                name: "int16".into(),
                size: 2,
                max_align: 2,
                compare: |a, b| a.cmp(b),
                accumulator: Some(i64id),
                tam: Tam::default(),
            })
            .unwrap();
        (reg, i16id, i64id)
    }

    #[test]
    fn equal_stacks_have_same_id_sequence() {
        let (reg, i16id, _) = registry_with_int_chain();
        let a = TypeStack::new(vec![i16id]).unwrap();
        let b = TypeStack::from_names(&reg, &["int16"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn accumulator_widens_and_is_idempotent() {
        let (reg, i16id, i64id) = registry_with_int_chain();
        let stack = TypeStack::new(vec![i16id]).unwrap();
        let acc1 = stack.accumulator(&reg).unwrap();
        let acc2 = acc1.accumulator(&reg).unwrap();
        assert_eq!(acc1, TypeStack::new(vec![i64id]).unwrap());
        assert_eq!(acc1, acc2);
    }

    #[test]
    fn rejects_stacks_deeper_than_max() {
        let ids = vec![TypeId(1); MAX_STACK_DEPTH + 1];
        assert!(matches!(
            TypeStack::new(ids),
            Err(TypeRegistryError::StackTooDeep { .. })
        ));
    }
}
