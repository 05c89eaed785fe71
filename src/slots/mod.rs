//! Resource index registry
//!
//! Binding slots are small integers shared by the producer and the consumer.
//! Buffer slots, texture slots, and vertex-attribute slots are three
//! independent numbering spaces. Within one renderer generation a slot value
//! is stable for the lifetime of the generation; roles are only ever
//! appended. Slot values are never assumed compatible across generations, so
//! each generation declares its own registry enums.

use crate::error::{ContractError, ContractResult};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// The three independent slot numbering spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotNamespace {
    Buffer,
    Texture,
    VertexAttribute,
}

impl fmt::Display for SlotNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotNamespace::Buffer => write!(f, "buffer"),
            SlotNamespace::Texture => write!(f, "texture"),
            SlotNamespace::VertexAttribute => write!(f, "vertex attribute"),
        }
    }
}

/// A registry of binding roles within one namespace of one generation.
///
/// Implementors are fieldless `#[repr(u32)]` enums with explicit
/// discriminants, so `slot()` is stable by construction and repeated lookups
/// always return the same value.
pub trait BindingSlot: Copy + Eq + Hash + 'static {
    const NAMESPACE: SlotNamespace;
    /// Every role in the registry, in declaration order.
    const ALL: &'static [Self];
    /// Binding index of this role within its namespace.
    fn slot(self) -> u32;
}

/// True when no two roles of the registry share a slot value.
pub fn namespace_is_unique<S: BindingSlot>() -> bool {
    let mut seen = HashSet::new();
    S::ALL.iter().all(|role| seen.insert(role.slot()))
}

/// Uniqueness check with a loud error for load-time verification.
pub fn ensure_unique<S: BindingSlot>(registry: &'static str) -> ContractResult<()> {
    let mut seen = HashSet::new();
    for role in S::ALL {
        if !seen.insert(role.slot()) {
            return Err(ContractError::DuplicateSlot {
                namespace: S::NAMESPACE,
                slot: role.slot(),
                registry,
            });
        }
    }
    Ok(())
}

/// Wire format of one vertex attribute, independent of the GPU API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl AttributeFormat {
    pub const fn size(self) -> u64 {
        match self {
            AttributeFormat::Float32x2 => 8,
            AttributeFormat::Float32x3 => 12,
            AttributeFormat::Float32x4 => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(u32)]
    enum BrokenRegistry {
        A = 0,
        B = 1,
        Duplicate,
    }

    impl BindingSlot for BrokenRegistry {
        const NAMESPACE: SlotNamespace = SlotNamespace::Buffer;
        const ALL: &'static [Self] = &[Self::A, Self::B, Self::Duplicate];
        fn slot(self) -> u32 {
            match self {
                // Duplicate deliberately collides with B.
                BrokenRegistry::Duplicate => 1,
                other => other as u32,
            }
        }
    }

    #[test]
    fn duplicate_slots_are_detected() {
        assert!(!namespace_is_unique::<BrokenRegistry>());
        let err = ensure_unique::<BrokenRegistry>("broken").unwrap_err();
        match err {
            ContractError::DuplicateSlot {
                namespace, slot, ..
            } => {
                assert_eq!(namespace, SlotNamespace::Buffer);
                assert_eq!(slot, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn attribute_format_sizes() {
        assert_eq!(AttributeFormat::Float32x2.size(), 8);
        assert_eq!(AttributeFormat::Float32x3.size(), 12);
        assert_eq!(AttributeFormat::Float32x4.size(), 16);
    }
}
