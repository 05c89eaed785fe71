//! Generation 1: plain forward shading
//!
//! The smallest contract: one interleaved vertex stream, one per-draw
//! uniform record, one base-color texture.

use crate::contract_record;
use crate::error::ContractResult;
use crate::slots::{ensure_unique, AttributeFormat, BindingSlot, SlotNamespace};
use glam::Mat4;

/// Buffer binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferIndex {
    MeshVertices = 0,
    DrawUniforms = 1,
}

impl BindingSlot for BufferIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Buffer;
    const ALL: &'static [Self] = &[Self::MeshVertices, Self::DrawUniforms];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Vertex attribute slots of the interleaved mesh stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VertexAttribute {
    Position = 0,
    Normal = 1,
    Texcoord = 2,
}

impl BindingSlot for VertexAttribute {
    const NAMESPACE: SlotNamespace = SlotNamespace::VertexAttribute;
    const ALL: &'static [Self] = &[Self::Position, Self::Normal, Self::Texcoord];
    fn slot(self) -> u32 {
        self as u32
    }
}

impl VertexAttribute {
    pub const fn format(self) -> AttributeFormat {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => AttributeFormat::Float32x3,
            VertexAttribute::Texcoord => AttributeFormat::Float32x2,
        }
    }

    /// Byte offset within one interleaved vertex.
    pub const fn offset(self) -> u64 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 12,
            VertexAttribute::Texcoord => 24,
        }
    }
}

/// Stride of one interleaved vertex (position, normal, texcoord).
pub const VERTEX_STRIDE: u64 = 32;

/// Texture binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    BaseColor = 0,
}

impl BindingSlot for TextureIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Texture;
    const ALL: &'static [Self] = &[Self::BaseColor];
    fn slot(self) -> u32 {
        self as u32
    }
}

contract_record! {
    /// Per-draw transforms, rebuilt every draw call.
    pub struct DrawUniforms {
        pub projection: Mat4,
        pub view: Mat4,
        pub model: Mat4,
    }
}

pub fn verify() -> ContractResult<()> {
    ensure_unique::<BufferIndex>("forward buffer registry")?;
    ensure_unique::<VertexAttribute>("forward vertex attribute registry")?;
    ensure_unique::<TextureIndex>("forward texture registry")?;
    DrawUniforms::LAYOUT.check::<DrawUniforms>()
}

pub fn wgsl_declarations() -> String {
    DrawUniforms::LAYOUT.wgsl_struct()
}
