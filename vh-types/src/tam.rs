//! Type Access Method (TAM): the pluggable conversion vtable a
//! registered type carries for binary (wire), textual (cstr), memset
//! (bit-for-bit copy) and construct/destruct surfaces. See SPEC_FULL.md
//! section 4.1.

/// Which of the four TAM surfaces a caller is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamRole {
    Binary,
    Cstr,
    Memset,
    Construct,
    Destruct,
}

/// Preference tiers a caller may walk when resolving a TAM
/// specialization. The full order named in spec.md section 4.1 is
/// `{per-field+per-backend, per-backend+per-type, per-field, per-type}`;
/// the `PerField*` tiers are resolved one layer up, by the catalog
/// crate, against a `TableField`'s own override before falling back
/// into [`crate::registry::TypeRegistry::resolve_tam`] with the
/// remaining tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamPreference {
    PerBackendPerType,
    PerType,
}

type BinaryGet = fn(&[u8]) -> Vec<u8>;
type BinarySet = fn(&mut [u8], &[u8]);
type CstrGet = fn(&[u8], Option<&str>) -> String;
type CstrSet = fn(&mut [u8], &str, Option<&str>);
type MemsetGet = fn(&[u8]) -> Vec<u8>;
type MemsetSet = fn(&mut [u8], &[u8]);
type Construct = fn(&mut [u8]);
type Destruct = fn(&mut [u8]);

/// A type's conversion vtable. Any surface left `None` falls back to
/// `memset` when source and target type match identically, otherwise
/// resolution fails with `UnsupportedConversion` (spec.md section 4.1).
#[derive(Default, Clone, Copy)]
pub struct Tam {
    pub binary_get: Option<BinaryGet>,
    pub binary_set: Option<BinarySet>,
    pub cstr_get: Option<CstrGet>,
    pub cstr_set: Option<CstrSet>,
    pub memset_get: Option<MemsetGet>,
    pub memset_set: Option<MemsetSet>,
    pub construct: Option<Construct>,
    pub destruct: Option<Destruct>,
}

impl Tam {
    /// The default memset surface: an identity byte copy. Used as the
    /// fallback for `Memset` role and as the basis of the
    /// "fall back to memset for identical types" rule.
    pub fn identity_memset() -> (MemsetGet, MemsetSet) {
        (|bytes| bytes.to_vec(), |dst, src| dst.copy_from_slice(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tam_has_no_surfaces() {
        let tam = Tam::default();
        assert!(tam.binary_get.is_none());
        assert!(tam.construct.is_none());
    }

    #[test]
    fn identity_memset_roundtrips() {
        let (get, set) = Tam::identity_memset();
        let src = [1u8, 2, 3, 4];
        let copied = get(&src);
        let mut dst = [0u8; 4];
        set(&mut dst, &copied);
        assert_eq!(dst, src);
    }
}
