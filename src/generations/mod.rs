//! The five shipped contract generations
//!
//! The renderer evolved through five generations: plain forward shading,
//! shadow-mapped shading, single-bounce ray tracing, multi-light ray tracing
//! with temporal accumulation, and finally the PBR hybrid. Each generation is
//! an isolated module carrying its own slot registries and record types; once
//! a generation ships, its slot values and record layouts are frozen. Slot
//! values are never reused across generations for a different role without a
//! migration note in the module docs.

pub mod forward;
pub mod multilight;
pub mod pbr;
pub mod raytraced;
pub mod shadow;

use crate::error::ContractResult;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};
use log::debug;

/// A shipped revision of the boundary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    Forward,
    ShadowMapped,
    RayTraced,
    MultiLight,
    PbrHybrid,
}

impl Generation {
    pub const ALL: [Generation; 5] = [
        Generation::Forward,
        Generation::ShadowMapped,
        Generation::RayTraced,
        Generation::MultiLight,
        Generation::PbrHybrid,
    ];

    /// The current generation.
    pub const fn latest() -> Self {
        Generation::PbrHybrid
    }

    pub const fn name(self) -> &'static str {
        match self {
            Generation::Forward => "forward",
            Generation::ShadowMapped => "shadow-mapped",
            Generation::RayTraced => "ray-traced",
            Generation::MultiLight => "multi-light",
            Generation::PbrHybrid => "pbr-hybrid",
        }
    }

    /// Load-time verification of this generation's registries and records.
    ///
    /// Fails loudly on a duplicate slot or a record whose host size diverges
    /// from the consumer-side layout, before any frame is assembled.
    pub fn verify(self) -> ContractResult<()> {
        match self {
            Generation::Forward => forward::verify()?,
            Generation::ShadowMapped => shadow::verify()?,
            Generation::RayTraced => raytraced::verify()?,
            Generation::MultiLight => multilight::verify()?,
            Generation::PbrHybrid => pbr::verify()?,
        }
        debug!("contract generation {} verified", self.name());
        Ok(())
    }

    /// Consumer-side WGSL declarations for this generation's records.
    pub fn wgsl_declarations(self) -> String {
        match self {
            Generation::Forward => forward::wgsl_declarations(),
            Generation::ShadowMapped => shadow::wgsl_declarations(),
            Generation::RayTraced => raytraced::wgsl_declarations(),
            Generation::MultiLight => multilight::wgsl_declarations(),
            Generation::PbrHybrid => pbr::wgsl_declarations(),
        }
    }
}

/// 3x3 normal transform packed as three 4-wide rows.
///
/// Keeps the record free of non-16-byte-aligned matrix types. The fourth
/// lane of each row is zeroed on write and must be ignored by readers; only
/// the xyz components carry the matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct NormalMatrixPack {
    pub rows: [Vec4; 3],
}

impl NormalMatrixPack {
    pub const IDENTITY: Self = Self {
        rows: [Vec4::X, Vec4::Y, Vec4::Z],
    };

    pub fn from_mat3(m: Mat3) -> Self {
        Self {
            rows: [
                m.row(0).extend(0.0),
                m.row(1).extend(0.0),
                m.row(2).extend(0.0),
            ],
        }
    }

    /// Normal matrix of a model transform (inverse transpose of the upper
    /// 3x3 block).
    pub fn from_model(model: Mat4) -> Self {
        Self::from_mat3(Mat3::from_mat4(model).inverse().transpose())
    }

    /// Reconstruct the 3x3 matrix the way a consumer does, reading only the
    /// first three components of each row.
    pub fn to_mat3(self) -> Mat3 {
        Mat3::from_cols(
            self.rows[0].truncate(),
            self.rows[1].truncate(),
            self.rows[2].truncate(),
        )
        .transpose()
    }
}

impl crate::layout::ContractField for NormalMatrixPack {
    const KIND: crate::layout::FieldKind = crate::layout::FieldKind::Vec4Array(3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn all_generations_verify() {
        for generation in Generation::ALL {
            generation.verify().unwrap();
        }
    }

    #[test]
    fn latest_generation_is_pbr_hybrid() {
        assert_eq!(Generation::latest(), Generation::PbrHybrid);
    }

    #[test]
    fn normal_pack_round_trips() {
        let m = Mat3::from_rotation_y(0.7) * Mat3::from_rotation_x(-0.3);
        let packed = NormalMatrixPack::from_mat3(m);
        let unpacked = packed.to_mat3();
        assert!(m.abs_diff_eq(unpacked, 1e-6));
    }

    #[test]
    fn normal_pack_zeroes_fourth_lane() {
        let packed = NormalMatrixPack::from_mat3(Mat3::from_rotation_z(1.1));
        for row in packed.rows {
            assert_eq!(row.w, 0.0);
        }
    }

    #[test]
    fn uniform_scale_inverts_in_normal_matrix() {
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let normal = NormalMatrixPack::from_model(model).to_mat3();
        assert!(normal.abs_diff_eq(Mat3::from_diagonal(Vec3::splat(0.5)), 1e-6));
    }
}
