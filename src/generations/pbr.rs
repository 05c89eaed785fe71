//! Generation 5: PBR hybrid rasterization / ray tracing
//!
//! The current generation. Appends to generation 4: per-channel material
//! textures on the instance record, spherical-harmonics environment lighting
//! in the frame record, and a rasterization path (draw uniforms, vertex
//! attributes) next to the ray-traced one. Generation-4 slot values and
//! light records are unchanged; the light records are re-exported from
//! [`multilight`](crate::generations::multilight) rather than redeclared.

use crate::contract_record;
use crate::error::ContractResult;
use crate::slots::{ensure_unique, AttributeFormat, BindingSlot, SlotNamespace};
use glam::{Mat4, UVec2, Vec3, Vec4};

pub use super::multilight::{AreaLight, DirectionalLight, PointLight};

/// Sentinel for a material channel with no texture bound.
///
/// Shading branches on this value instead of fetching; every channel of an
/// untextured instance carries it. The maximum index is reserved for this
/// purpose and is never a valid entry of the material texture array.
pub const TEXTURE_SLOT_UNBOUND: u32 = u32::MAX;

/// Number of spherical-harmonics coefficient vectors (3 bands).
pub const SH_COEFFICIENT_COUNT: usize = 9;

/// Buffer binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferIndex {
    SceneVertices = 0,
    SceneIndices = 1,
    InstanceInfos = 2,
    FrameUniforms = 3,
    DirectionalLights = 4,
    PointLights = 5,
    AreaLights = 6,
    /// Raster-path per-draw uniforms.
    DrawUniforms = 7,
}

impl BindingSlot for BufferIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Buffer;
    const ALL: &'static [Self] = &[
        Self::SceneVertices,
        Self::SceneIndices,
        Self::InstanceInfos,
        Self::FrameUniforms,
        Self::DirectionalLights,
        Self::PointLights,
        Self::AreaLights,
        Self::DrawUniforms,
    ];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Vertex attribute slots of the raster path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VertexAttribute {
    Position = 0,
    Normal = 1,
    Texcoord = 2,
    Tangent = 3,
}

impl BindingSlot for VertexAttribute {
    const NAMESPACE: SlotNamespace = SlotNamespace::VertexAttribute;
    const ALL: &'static [Self] = &[
        Self::Position,
        Self::Normal,
        Self::Texcoord,
        Self::Tangent,
    ];
    fn slot(self) -> u32 {
        self as u32
    }
}

impl VertexAttribute {
    pub const fn format(self) -> AttributeFormat {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => AttributeFormat::Float32x3,
            VertexAttribute::Texcoord => AttributeFormat::Float32x2,
            VertexAttribute::Tangent => AttributeFormat::Float32x4,
        }
    }

    pub const fn offset(self) -> u64 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 12,
            VertexAttribute::Texcoord => 24,
            VertexAttribute::Tangent => 32,
        }
    }
}

/// Stride of one interleaved vertex (position, normal, texcoord, tangent).
pub const VERTEX_STRIDE: u64 = 48;

/// Texture binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    Output = 0,
    History = 1,
    /// Material texture array; instance records index into it.
    Materials = 2,
}

impl BindingSlot for TextureIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Texture;
    const ALL: &'static [Self] = &[Self::Output, Self::History, Self::Materials];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Material texture channels carried by [`InstanceInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    BaseColor,
    Normal,
    MetallicRoughness,
    Emissive,
    Occlusion,
}

impl TextureChannel {
    pub const ALL: [TextureChannel; 5] = [
        TextureChannel::BaseColor,
        TextureChannel::Normal,
        TextureChannel::MetallicRoughness,
        TextureChannel::Emissive,
        TextureChannel::Occlusion,
    ];
}

contract_record! {
    /// Per-frame state of the hybrid renderer.
    ///
    /// Environment lighting is a 3-band spherical-harmonics projection; the
    /// flat ambient term survives as a fallback multiplier. The light counts
    /// bound the consumer's iteration over the light buffers.
    pub struct FrameUniforms {
        pub inv_view_proj: Mat4,
        pub camera_position: Vec3,
        pub ambient_intensity: f32,
        /// Spherical-harmonics environment coefficients, band order
        /// L00, L1-1, L10, L11, L2-2, L2-1, L20, L21, L22; xyz is RGB.
        pub sh_env: [Vec4; 9],
        pub image_size: UVec2,
        pub frame_index: u32,
        pub samples_per_pixel: u32,
        pub dir_light_count: u32,
        pub point_light_count: u32,
        pub area_light_count: u32,
        /// Blend factor toward the accumulated history, 0..=1.
        pub history_weight: f32,
        /// Clamp applied to the history sample before blending.
        pub history_clamp: f32,
        pub denoise_sigma: f32,
        pub _pad0: u32,
        pub _pad1: u32,
    }
}

contract_record! {
    /// Raster-path per-draw record, rebuilt every draw call.
    pub struct DrawUniforms {
        pub projection: Mat4,
        pub view: Mat4,
        pub model: Mat4,
        /// Flat tint multiplied into the sampled base color.
        pub base_color_factor: Vec4,
    }
}

contract_record! {
    /// Per-instance record of the ray-traced path.
    ///
    /// Indexed by the instance id the acceleration structure reports at hit
    /// time; buffer order must match the acceleration-structure instance
    /// order. Texture channel fields hold indices into the material texture
    /// array, or [`TEXTURE_SLOT_UNBOUND`].
    pub struct InstanceInfo {
        pub model: Mat4,
        pub base_color_factor: Vec4,
        pub emissive_factor: Vec3,
        pub occlusion_strength: f32,
        pub metallic_factor: f32,
        pub roughness_factor: f32,
        /// First index of this instance in the shared index buffer.
        pub index_base: u32,
        /// Added to every fetched index before the vertex lookup.
        pub vertex_base: u32,
        pub index_count: u32,
        /// Which source vertex buffer the instance reads from.
        pub geometry_slot: u32,
        pub base_color_texture: u32,
        pub normal_texture: u32,
        pub metallic_roughness_texture: u32,
        pub emissive_texture: u32,
        pub occlusion_texture: u32,
        pub _pad0: u32,
    }
}

impl InstanceInfo {
    /// Untextured instance with neutral material factors; every texture
    /// channel starts unbound.
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            base_color_factor: Vec4::ONE,
            emissive_factor: Vec3::ZERO,
            occlusion_strength: 1.0,
            metallic_factor: 0.0,
            roughness_factor: 0.5,
            index_base: 0,
            vertex_base: 0,
            index_count: 0,
            geometry_slot: 0,
            base_color_texture: TEXTURE_SLOT_UNBOUND,
            normal_texture: TEXTURE_SLOT_UNBOUND,
            metallic_roughness_texture: TEXTURE_SLOT_UNBOUND,
            emissive_texture: TEXTURE_SLOT_UNBOUND,
            occlusion_texture: TEXTURE_SLOT_UNBOUND,
            _pad0: 0,
        }
    }

    pub fn with_geometry(
        mut self,
        index_base: u32,
        index_count: u32,
        vertex_base: u32,
        geometry_slot: u32,
    ) -> Self {
        self.index_base = index_base;
        self.index_count = index_count;
        self.vertex_base = vertex_base;
        self.geometry_slot = geometry_slot;
        self
    }

    pub fn with_base_color(mut self, factor: Vec4) -> Self {
        self.base_color_factor = factor;
        self
    }

    pub fn with_metallic_roughness(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic_factor = metallic;
        self.roughness_factor = roughness;
        self
    }

    pub fn with_emissive(mut self, factor: Vec3) -> Self {
        self.emissive_factor = factor;
        self
    }

    pub fn with_occlusion_strength(mut self, strength: f32) -> Self {
        self.occlusion_strength = strength;
        self
    }

    pub fn with_texture(mut self, channel: TextureChannel, index: u32) -> Self {
        *self.texture_mut(channel) = index;
        self
    }

    /// Texture array index for `channel`, or `None` when unbound.
    pub fn texture(&self, channel: TextureChannel) -> Option<u32> {
        let index = match channel {
            TextureChannel::BaseColor => self.base_color_texture,
            TextureChannel::Normal => self.normal_texture,
            TextureChannel::MetallicRoughness => self.metallic_roughness_texture,
            TextureChannel::Emissive => self.emissive_texture,
            TextureChannel::Occlusion => self.occlusion_texture,
        };
        (index != TEXTURE_SLOT_UNBOUND).then_some(index)
    }

    /// Whether any channel has a texture bound.
    pub fn uses_textures(&self) -> bool {
        TextureChannel::ALL
            .iter()
            .any(|channel| self.texture(*channel).is_some())
    }

    fn texture_mut(&mut self, channel: TextureChannel) -> &mut u32 {
        match channel {
            TextureChannel::BaseColor => &mut self.base_color_texture,
            TextureChannel::Normal => &mut self.normal_texture,
            TextureChannel::MetallicRoughness => &mut self.metallic_roughness_texture,
            TextureChannel::Emissive => &mut self.emissive_texture,
            TextureChannel::Occlusion => &mut self.occlusion_texture,
        }
    }
}

pub fn verify() -> ContractResult<()> {
    ensure_unique::<BufferIndex>("pbr buffer registry")?;
    ensure_unique::<VertexAttribute>("pbr vertex attribute registry")?;
    ensure_unique::<TextureIndex>("pbr texture registry")?;
    FrameUniforms::LAYOUT.check::<FrameUniforms>()?;
    DrawUniforms::LAYOUT.check::<DrawUniforms>()?;
    InstanceInfo::LAYOUT.check::<InstanceInfo>()?;
    DirectionalLight::LAYOUT.check::<DirectionalLight>()?;
    PointLight::LAYOUT.check::<PointLight>()?;
    AreaLight::LAYOUT.check::<AreaLight>()
}

pub fn wgsl_declarations() -> String {
    [
        FrameUniforms::LAYOUT.wgsl_struct(),
        DrawUniforms::LAYOUT.wgsl_struct(),
        InstanceInfo::LAYOUT.wgsl_struct(),
        DirectionalLight::LAYOUT.wgsl_struct(),
        PointLight::LAYOUT.wgsl_struct(),
        AreaLight::LAYOUT.wgsl_struct(),
    ]
    .join("\n")
}
