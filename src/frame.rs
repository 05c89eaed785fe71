//! Producer-side frame assembly for the PBR hybrid generation
//!
//! One producer populates all contract records for a frame before that
//! frame's work is submitted. Capacity violations are rejected here, at
//! assembly time, so the consumer is never handed a count larger than the
//! buffer the count refers to.

use crate::error::{ContractError, ContractResult, LightKind};
use crate::generations::pbr::{
    AreaLight, DirectionalLight, FrameUniforms, InstanceInfo, PointLight, SH_COEFFICIENT_COUNT,
};
use glam::{Mat4, UVec2, Vec3, Vec4};
use log::debug;

/// Allocated capacity of the directional light buffer.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Allocated capacity of the point light buffer.
pub const MAX_POINT_LIGHTS: usize = 64;
/// Allocated capacity of the area light buffer.
pub const MAX_AREA_LIGHTS: usize = 16;
/// Allocated capacity of the instance buffer.
pub const MAX_INSTANCES: usize = 4096;

/// Staging lists for the three light buffers of one frame.
///
/// The lengths become the light counts in [`FrameUniforms`], so the consumer
/// reads exactly the records that were pushed.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
    area: Vec<AreaLight>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_directional(
        &mut self,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
    ) -> ContractResult<()> {
        if self.directional.len() == MAX_DIRECTIONAL_LIGHTS {
            return Err(ContractError::LightCapacityExceeded {
                kind: LightKind::Directional,
                requested: self.directional.len() + 1,
                capacity: MAX_DIRECTIONAL_LIGHTS,
            });
        }
        // A zero direction must not become NaN in the staged buffer.
        self.directional.push(DirectionalLight {
            direction: direction.normalize_or_zero(),
            intensity,
            color,
            _pad0: 0.0,
        });
        Ok(())
    }

    pub fn push_point(
        &mut self,
        position: Vec3,
        radius: f32,
        color: Vec3,
        intensity: f32,
    ) -> ContractResult<()> {
        if self.point.len() == MAX_POINT_LIGHTS {
            return Err(ContractError::LightCapacityExceeded {
                kind: LightKind::Point,
                requested: self.point.len() + 1,
                capacity: MAX_POINT_LIGHTS,
            });
        }
        self.point.push(PointLight {
            position,
            radius,
            color,
            intensity,
        });
        Ok(())
    }

    pub fn push_area(
        &mut self,
        position: Vec3,
        edge0: Vec3,
        edge1: Vec3,
        color: Vec3,
        intensity: f32,
    ) -> ContractResult<()> {
        if self.area.len() == MAX_AREA_LIGHTS {
            return Err(ContractError::LightCapacityExceeded {
                kind: LightKind::Area,
                requested: self.area.len() + 1,
                capacity: MAX_AREA_LIGHTS,
            });
        }
        self.area.push(AreaLight {
            position,
            intensity,
            edge0,
            _pad0: 0.0,
            edge1,
            _pad1: 0.0,
            color,
            _pad2: 0.0,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
        self.area.clear();
    }

    pub fn directional(&self) -> &[DirectionalLight] {
        &self.directional
    }

    pub fn point(&self) -> &[PointLight] {
        &self.point
    }

    pub fn area(&self) -> &[AreaLight] {
        &self.area
    }

    /// (directional, point, area) counts as written into the frame record.
    pub fn counts(&self) -> (u32, u32, u32) {
        (
            self.directional.len() as u32,
            self.point.len() as u32,
            self.area.len() as u32,
        )
    }

    pub fn directional_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.directional)
    }

    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.point)
    }

    pub fn area_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.area)
    }
}

/// Ordered staging list for the instance buffer of one frame.
///
/// Push order is the acceleration-structure instance order; the instance id
/// reported at hit time indexes straight into this table.
#[derive(Debug, Clone, Default)]
pub struct InstanceTable {
    infos: Vec<InstanceInfo>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instance and returns its instance id.
    pub fn push(&mut self, info: InstanceInfo) -> ContractResult<u32> {
        if self.infos.len() == MAX_INSTANCES {
            return Err(ContractError::InstanceCapacityExceeded {
                requested: self.infos.len() + 1,
                capacity: MAX_INSTANCES,
            });
        }
        let id = self.infos.len() as u32;
        self.infos.push(info);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn infos(&self) -> &[InstanceInfo] {
        &self.infos
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.infos)
    }

    pub fn clear(&mut self) {
        self.infos.clear();
    }
}

/// Assembles the per-frame record from camera, environment, and sampling
/// state plus the counts of a [`LightSet`].
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    inv_view_proj: Mat4,
    camera_position: Vec3,
    image_size: UVec2,
    ambient_intensity: f32,
    sh_env: [Vec4; SH_COEFFICIENT_COUNT],
    samples_per_pixel: u32,
    history_weight: f32,
    history_clamp: f32,
    denoise_sigma: f32,
    frame_index: u32,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self {
            inv_view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            image_size: UVec2::ONE,
            ambient_intensity: 0.0,
            sh_env: [Vec4::ZERO; SH_COEFFICIENT_COUNT],
            samples_per_pixel: 1,
            history_weight: 0.0,
            history_clamp: f32::MAX,
            denoise_sigma: 1.0,
            frame_index: 0,
        }
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(mut self, inv_view_proj: Mat4, position: Vec3) -> Self {
        self.inv_view_proj = inv_view_proj;
        self.camera_position = position;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.image_size = UVec2::new(width, height);
        self
    }

    pub fn ambient(mut self, intensity: f32) -> Self {
        self.ambient_intensity = intensity;
        self
    }

    pub fn sh_environment(mut self, coefficients: [Vec4; SH_COEFFICIENT_COUNT]) -> Self {
        self.sh_env = coefficients;
        self
    }

    pub fn sampling(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn temporal(mut self, history_weight: f32, history_clamp: f32) -> Self {
        self.history_weight = history_weight;
        self.history_clamp = history_clamp;
        self
    }

    pub fn denoise(mut self, sigma: f32) -> Self {
        self.denoise_sigma = sigma;
        self
    }

    pub fn frame_index(mut self, index: u32) -> Self {
        self.frame_index = index;
        self
    }

    /// Builds the frame record; the light counts come from `lights`, so the
    /// consumer's iteration is bounded by what was actually staged.
    pub fn build(&self, lights: &LightSet) -> FrameUniforms {
        let (dir_light_count, point_light_count, area_light_count) = lights.counts();
        debug!(
            "frame {}: {} directional, {} point, {} area lights",
            self.frame_index, dir_light_count, point_light_count, area_light_count
        );
        FrameUniforms {
            inv_view_proj: self.inv_view_proj,
            camera_position: self.camera_position,
            ambient_intensity: self.ambient_intensity,
            sh_env: self.sh_env,
            image_size: self.image_size,
            frame_index: self.frame_index,
            samples_per_pixel: self.samples_per_pixel,
            dir_light_count,
            point_light_count,
            area_light_count,
            history_weight: self.history_weight,
            history_clamp: self.history_clamp,
            denoise_sigma: self.denoise_sigma,
            _pad0: 0,
            _pad1: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_counts_match_pushed_records() {
        let mut lights = LightSet::new();
        lights
            .push_directional(Vec3::NEG_Y, Vec3::ONE, 1.0)
            .unwrap();
        lights
            .push_point(Vec3::new(1.0, 2.0, 3.0), 5.0, Vec3::X, 10.0)
            .unwrap();
        lights
            .push_point(Vec3::ZERO, 2.0, Vec3::Y, 3.0)
            .unwrap();
        assert_eq!(lights.counts(), (1, 2, 0));
        assert_eq!(lights.directional().len(), 1);
        assert_eq!(lights.directional_bytes().len(), 32);
        assert_eq!(lights.point_bytes().len(), 64);
        assert!(lights.area_bytes().is_empty());
    }

    #[test]
    fn directional_capacity_is_enforced() {
        let mut lights = LightSet::new();
        for _ in 0..MAX_DIRECTIONAL_LIGHTS {
            lights.push_directional(Vec3::NEG_Y, Vec3::ONE, 1.0).unwrap();
        }
        let err = lights
            .push_directional(Vec3::NEG_Y, Vec3::ONE, 1.0)
            .unwrap_err();
        match err {
            ContractError::LightCapacityExceeded { capacity, .. } => {
                assert_eq!(capacity, MAX_DIRECTIONAL_LIGHTS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pushed_directions_are_normalized() {
        let mut lights = LightSet::new();
        lights
            .push_directional(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE, 1.0)
            .unwrap();
        assert_eq!(lights.directional()[0].direction, Vec3::NEG_Y);
    }

    #[test]
    fn zero_direction_stays_finite() {
        let mut lights = LightSet::new();
        lights
            .push_directional(Vec3::ZERO, Vec3::ONE, 1.0)
            .unwrap();
        let direction = lights.directional()[0].direction;
        assert!(direction.is_finite());
        assert_eq!(direction, Vec3::ZERO);
    }

    #[test]
    fn instance_ids_follow_push_order() {
        let mut table = InstanceTable::new();
        let a = table.push(InstanceInfo::new(Mat4::IDENTITY)).unwrap();
        let b = table.push(InstanceInfo::new(Mat4::IDENTITY)).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.bytes().len(), 2 * 144);
    }

    #[test]
    fn instance_capacity_is_enforced() {
        let mut table = InstanceTable::new();
        for _ in 0..MAX_INSTANCES {
            table.push(InstanceInfo::new(Mat4::IDENTITY)).unwrap();
        }
        assert!(matches!(
            table.push(InstanceInfo::new(Mat4::IDENTITY)),
            Err(ContractError::InstanceCapacityExceeded { .. })
        ));
    }

    #[test]
    fn builder_copies_counts_into_the_record() {
        let mut lights = LightSet::new();
        lights.push_directional(Vec3::NEG_Y, Vec3::ONE, 1.0).unwrap();
        lights
            .push_area(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::ONE, 4.0)
            .unwrap();
        let uniforms = FrameBuilder::new()
            .viewport(1920, 1080)
            .ambient(0.25)
            .sampling(4)
            .temporal(0.9, 3.0)
            .frame_index(17)
            .build(&lights);
        assert_eq!(uniforms.dir_light_count, 1);
        assert_eq!(uniforms.point_light_count, 0);
        assert_eq!(uniforms.area_light_count, 1);
        assert_eq!(uniforms.image_size, UVec2::new(1920, 1080));
        assert_eq!(uniforms.samples_per_pixel, 4);
        assert_eq!(uniforms.history_weight, 0.9);
        assert_eq!(uniforms.frame_index, 17);
    }
}
