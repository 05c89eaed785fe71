//! Generation 4: multi-light ray tracing with temporal accumulation
//!
//! Appends to generation 3: counted light buffers for three light kinds and
//! temporal accumulation / denoise controls. Replacing the single embedded
//! light with counted arrays changes the meaning of the per-frame record, so
//! [`FrameUniforms`] is a new, incompatible record rather than an extension
//! of the generation-3 one. Generation-3 buffer slots 0..=3 keep their roles.

use crate::contract_record;
use crate::error::ContractResult;
use crate::slots::{ensure_unique, BindingSlot, SlotNamespace};
use glam::{Mat4, UVec2, Vec3, Vec4};

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
    ];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Texture binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    Output = 0,
    /// Accumulated radiance of previous frames.
    History = 1,
}

impl BindingSlot for TextureIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Texture;
    const ALL: &'static [Self] = &[Self::Output, Self::History];
    fn slot(self) -> u32 {
        self as u32
    }
}

contract_record! {
    /// Per-frame state. The light counts bound the consumer's iteration
    /// over the three light buffers; reading past a declared count is
    /// undefined and must be prevented by the producer.
    pub struct FrameUniforms {
        pub inv_view_proj: Mat4,
        pub camera_position: Vec3,
        pub ambient_intensity: f32,
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
    /// One directional light. Consumed from the buffer bound at
    /// [`BufferIndex::DirectionalLights`], `dir_light_count` records.
    pub struct DirectionalLight {
        /// Direction the light travels, normalized.
        pub direction: Vec3,
        pub intensity: f32,
        pub color: Vec3,
        pub _pad0: f32,
    }
}

contract_record! {
    /// One point light with distance falloff.
    pub struct PointLight {
        pub position: Vec3,
        /// Falloff radius; contribution reaches zero at this distance.
        pub radius: f32,
        pub color: Vec3,
        pub intensity: f32,
    }
}

contract_record! {
    /// One rectangular area emitter: origin plus two edge vectors.
    pub struct AreaLight {
        pub position: Vec3,
        pub intensity: f32,
        pub edge0: Vec3,
        pub _pad0: f32,
        pub edge1: Vec3,
        pub _pad1: f32,
        pub color: Vec3,
        pub _pad2: f32,
    }
}

contract_record! {
    /// Per-instance record; adds an emissive term so instances can act as
    /// emitters under the area-light sampler.
    pub struct InstanceInfo {
        pub model: Mat4,
        pub base_color: Vec4,
        pub emissive: Vec3,
        pub emissive_strength: f32,
        pub index_base: u32,
        pub vertex_base: u32,
        pub index_count: u32,
        pub geometry_slot: u32,
    }
}

pub fn verify() -> ContractResult<()> {
    ensure_unique::<BufferIndex>("multi-light buffer registry")?;
    ensure_unique::<TextureIndex>("multi-light texture registry")?;
    FrameUniforms::LAYOUT.check::<FrameUniforms>()?;
    DirectionalLight::LAYOUT.check::<DirectionalLight>()?;
    PointLight::LAYOUT.check::<PointLight>()?;
    AreaLight::LAYOUT.check::<AreaLight>()?;
    InstanceInfo::LAYOUT.check::<InstanceInfo>()
}

pub fn wgsl_declarations() -> String {
    [
        FrameUniforms::LAYOUT.wgsl_struct(),
        DirectionalLight::LAYOUT.wgsl_struct(),
        PointLight::LAYOUT.wgsl_struct(),
        AreaLight::LAYOUT.wgsl_struct(),
        InstanceInfo::LAYOUT.wgsl_struct(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_3_slots_keep_their_roles() {
        use crate::generations::raytraced;
        assert_eq!(
            BufferIndex::SceneVertices.slot(),
            raytraced::BufferIndex::SceneVertices.slot()
        );
        assert_eq!(
            BufferIndex::FrameUniforms.slot(),
            raytraced::BufferIndex::FrameUniforms.slot()
        );
        assert_eq!(TextureIndex::Output.slot(), raytraced::TextureIndex::Output.slot());
    }

    #[test]
    fn frame_uniforms_layout() {
        let layout = &FrameUniforms::LAYOUT;
        assert_eq!(layout.offset_of("inv_view_proj"), 0);
        assert_eq!(layout.offset_of("camera_position"), 64);
        assert_eq!(layout.offset_of("ambient_intensity"), 76);
        assert_eq!(layout.offset_of("image_size"), 80);
        assert_eq!(layout.offset_of("dir_light_count"), 96);
        assert_eq!(layout.offset_of("point_light_count"), 100);
        assert_eq!(layout.offset_of("area_light_count"), 104);
        assert_eq!(layout.offset_of("history_weight"), 108);
        assert_eq!(layout.offset_of("denoise_sigma"), 116);
        assert_eq!(layout.size(), 128);
    }

    #[test]
    fn light_record_sizes() {
        assert_eq!(DirectionalLight::LAYOUT.size(), 32);
        assert_eq!(PointLight::LAYOUT.size(), 32);
        assert_eq!(AreaLight::LAYOUT.size(), 64);
        assert_eq!(std::mem::size_of::<DirectionalLight>(), 32);
        assert_eq!(std::mem::size_of::<PointLight>(), 32);
        assert_eq!(std::mem::size_of::<AreaLight>(), 64);
    }

    #[test]
    fn area_light_edges_are_16_byte_aligned() {
        let layout = &AreaLight::LAYOUT;
        assert_eq!(layout.offset_of("edge0"), 16);
        assert_eq!(layout.offset_of("edge1"), 32);
        assert_eq!(layout.offset_of("color"), 48);
    }

    #[test]
    fn instance_info_layout() {
        let layout = &InstanceInfo::LAYOUT;
        assert_eq!(layout.offset_of("emissive"), 80);
        assert_eq!(layout.offset_of("emissive_strength"), 92);
        assert_eq!(layout.offset_of("index_base"), 96);
        assert_eq!(layout.size(), 112);
    }
}
