//! wgpu translation of the binding registry
//!
//! Turns registry slots and record layouts into the wgpu descriptions a
//! backend needs. Nothing here touches a device; these are plain values the
//! caller hands to pipeline and bind-group creation.

use crate::generations::{forward, pbr};
use crate::slots::{AttributeFormat, BindingSlot};
use std::num::NonZeroU64;

pub fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// Uniform-buffer layout entry for a registry slot.
pub fn uniform_entry<S: BindingSlot>(
    slot: S,
    visibility: wgpu::ShaderStages,
    min_size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: slot.slot(),
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size as u64),
        },
        count: None,
    }
}

/// Read-only storage-buffer layout entry for a registry slot.
pub fn storage_entry<S: BindingSlot>(
    slot: S,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: slot.slot(),
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind-group layout entries for the ray-traced scene of the current
/// generation: frame uniforms plus the read-only geometry, instance, and
/// light buffers.
pub fn scene_bind_group_entries(visibility: wgpu::ShaderStages) -> Vec<wgpu::BindGroupLayoutEntry> {
    use pbr::BufferIndex;
    vec![
        storage_entry(BufferIndex::SceneVertices, visibility),
        storage_entry(BufferIndex::SceneIndices, visibility),
        storage_entry(BufferIndex::InstanceInfos, visibility),
        uniform_entry(
            BufferIndex::FrameUniforms,
            visibility,
            pbr::FrameUniforms::LAYOUT.size(),
        ),
        storage_entry(BufferIndex::DirectionalLights, visibility),
        storage_entry(BufferIndex::PointLights, visibility),
        storage_entry(BufferIndex::AreaLights, visibility),
    ]
}

/// Interleaved vertex layout of the generation-1/2 forward stream.
pub fn forward_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: forward::VertexAttribute::Position as u32,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: forward::VertexAttribute::Normal as u32,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 24,
            shader_location: forward::VertexAttribute::Texcoord as u32,
        },
    ];
    wgpu::VertexBufferLayout {
        array_stride: forward::VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Interleaved vertex layout of the PBR hybrid raster path.
pub fn pbr_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: pbr::VertexAttribute::Position as u32,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: pbr::VertexAttribute::Normal as u32,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 24,
            shader_location: pbr::VertexAttribute::Texcoord as u32,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 32,
            shader_location: pbr::VertexAttribute::Tangent as u32,
        },
    ];
    wgpu::VertexBufferLayout {
        array_stride: pbr::VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_mirror_the_registry() {
        let layout = pbr_vertex_layout();
        assert_eq!(layout.array_stride, pbr::VERTEX_STRIDE);
        assert_eq!(layout.attributes.len(), 4);
        for (attribute, role) in layout.attributes.iter().zip(pbr::VertexAttribute::ALL) {
            assert_eq!(attribute.shader_location, role.slot());
            assert_eq!(attribute.offset, role.offset());
            assert_eq!(attribute.format, vertex_format(role.format()));
        }

        let forward = forward_vertex_layout();
        assert_eq!(forward.array_stride, 32);
        assert_eq!(forward.attributes.len(), 3);
    }

    #[test]
    fn scene_entries_use_registry_bindings() {
        let entries = scene_bind_group_entries(wgpu::ShaderStages::COMPUTE);
        let bindings: Vec<u32> = entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2, 3, 4, 5, 6]);
        // The frame uniforms entry advertises the full record size.
        let frame = &entries[3];
        match frame.ty {
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                min_binding_size,
                ..
            } => {
                assert_eq!(min_binding_size.map(u64::from), Some(272));
            }
            _ => panic!("frame uniforms must be a uniform buffer"),
        }
    }
}
