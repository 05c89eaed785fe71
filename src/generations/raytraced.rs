//! Generation 3: single-bounce ray tracing
//!
//! The contract moves from per-draw to per-frame and per-instance records.
//! The consumer fetches geometry straight from the shared vertex/index
//! buffers, so there is no vertex-attribute registry in this generation.
//!
//! Migration note: buffer slot numbering restarts for this generation. Slots
//! 0 and 1 now address the shared scene vertex/index buffers, not the
//! generation-1/2 mesh stream and draw uniforms.

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
}

impl BindingSlot for BufferIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Buffer;
    const ALL: &'static [Self] = &[
        Self::SceneVertices,
        Self::SceneIndices,
        Self::InstanceInfos,
        Self::FrameUniforms,
    ];
    fn slot(self) -> u32 {
        self as u32
    }
}

/// Texture binding slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    /// Storage image the ray pass writes.
    Output = 0,
}

impl BindingSlot for TextureIndex {
    const NAMESPACE: SlotNamespace = SlotNamespace::Texture;
    const ALL: &'static [Self] = &[Self::Output];
    fn slot(self) -> u32 {
        self as u32
    }
}

contract_record! {
    /// Per-frame state: camera, the single directional light, and the
    /// viewport. Rebuilt every frame; read-only to the consumer.
    pub struct FrameUniforms {
        /// Unprojects pixel coordinates into world-space rays.
        pub inv_view_proj: Mat4,
        pub camera_position: Vec3,
        pub ambient_intensity: f32,
        /// Direction the light travels, normalized.
        pub light_direction: Vec3,
        pub light_intensity: f32,
        pub light_color: Vec3,
        pub _pad0: f32,
        pub image_size: UVec2,
        pub frame_index: u32,
        pub _pad1: u32,
    }
}

contract_record! {
    /// Per-instance record, indexed by the instance id the acceleration
    /// structure reports at hit time. Buffer order must match the
    /// acceleration-structure instance order.
    pub struct InstanceInfo {
        pub model: Mat4,
        pub base_color: Vec4,
        /// First index of this instance in the shared index buffer.
        pub index_base: u32,
        /// Added to every fetched index before the vertex lookup.
        pub vertex_base: u32,
        pub index_count: u32,
        /// Which source vertex buffer the instance reads from.
        pub geometry_slot: u32,
    }
}

pub fn verify() -> ContractResult<()> {
    ensure_unique::<BufferIndex>("ray-traced buffer registry")?;
    ensure_unique::<TextureIndex>("ray-traced texture registry")?;
    FrameUniforms::LAYOUT.check::<FrameUniforms>()?;
    InstanceInfo::LAYOUT.check::<InstanceInfo>()
}

pub fn wgsl_declarations() -> String {
    let mut out = FrameUniforms::LAYOUT.wgsl_struct();
    out.push('\n');
    out.push_str(&InstanceInfo::LAYOUT.wgsl_struct());
    out
}
