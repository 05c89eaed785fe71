//! Generation 2: shadow-mapped forward shading
//!
//! Appends to generation 1: a shadow map texture, a per-draw light/shadow
//! parameter record, and a packed normal matrix in the draw uniforms.
//! Existing generation-1 slot values are unchanged.

use crate::contract_record;
use crate::error::ContractResult;
use crate::generations::NormalMatrixPack;
use crate::slots::{ensure_unique, AttributeFormat, BindingSlot, SlotNamespace};
use glam::{Mat4, Vec3};

/// Buffer binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferIndex {
    MeshVertices = 0,
    DrawUniforms = 1,
    LightParams = 2,
}

impl BindingSlot for BufferIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Buffer;
    const ALL: &'static [Self] = &[Self::MeshVertices, Self::DrawUniforms, Self::LightParams];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Vertex attribute slots, unchanged from generation 1.
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

    pub const fn offset(self) -> u64 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 12,
            VertexAttribute::Texcoord => 24,
        }
    }
}

pub const VERTEX_STRIDE: u64 = 32;

/// Texture binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    BaseColor = 0,
    ShadowMap = 1,
}

impl BindingSlot for TextureIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Texture;
    const ALL: &'static [Self] = &[Self::BaseColor, Self::ShadowMap];
    fn slot(self) -> u32 {
        self as u32
    }
}

contract_record! {
    /// Per-draw transforms plus the packed normal matrix.
    pub struct DrawUniforms {
        pub projection: Mat4,
        pub view: Mat4,
        pub model: Mat4,
        pub normal_matrix: NormalMatrixPack,
    }
}

impl DrawUniforms {
    /// Derives the normal matrix from the model transform.
    pub fn new(projection: Mat4, view: Mat4, model: Mat4) -> Self {
        Self {
            projection,
            view,
            model,
            normal_matrix: NormalMatrixPack::from_model(model),
        }
    }
}

contract_record! {
    /// Directional light and shadow parameters, one record per frame,
    /// shared by every draw of the forward path.
    pub struct LightParams {
        /// View-projection of the shadow-casting light.
        pub light_view_proj: Mat4,
        /// Direction the light travels, normalized.
        pub direction: Vec3,
        /// Depth offset applied when sampling the shadow map.
        pub shadow_bias: f32,
        pub color: Vec3,
        pub intensity: f32,
        pub camera_position: Vec3,
        pub ambient_intensity: f32,
    }
}

pub fn verify() -> ContractResult<()> {
    ensure_unique::<BufferIndex>("shadow buffer registry")?;
    ensure_unique::<VertexAttribute>("shadow vertex attribute registry")?;
    ensure_unique::<TextureIndex>("shadow texture registry")?;
    DrawUniforms::LAYOUT.check::<DrawUniforms>()?;
    LightParams::LAYOUT.check::<LightParams>()
}

pub fn wgsl_declarations() -> String {
    let mut out = DrawUniforms::LAYOUT.wgsl_struct();
    out.push('\n');
    out.push_str(&LightParams::LAYOUT.wgsl_struct());
    out
}
