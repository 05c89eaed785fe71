//! Declarative record layouts for the GPU boundary
//!
//! Every record that crosses the CPU/GPU boundary is declared once, through
//! [`contract_record!`], as a flat list of typed fields. From that single
//! list the crate derives:
//!
//! - the `#[repr(C)]` host struct (`bytemuck::Pod`, so it can be written to
//!   a buffer as raw bytes),
//! - the byte offsets a GPU-side compiler assigns to the same fields
//!   ([`RecordLayout`]),
//! - compile-time assertions that the two agree for every field,
//! - the consumer-side WGSL declaration ([`RecordLayout::wgsl_struct`]).
//!
//! A record whose host layout diverges from the consumer layout (a missing
//! padding field, a vec3 straddling a 16-byte boundary) fails to compile
//! instead of silently corrupting shaded output.

use crate::error::{ContractError, ContractResult};
use std::fmt::Write;

/// The closed set of field types a contract record may use.
///
/// Sizes and alignments are the ones a GPU-side compiler derives for a
/// uniform or storage block. `Vec3` is size 12 / align 16: a scalar may pack
/// into its fourth lane, but any 16-byte-aligned successor forces an explicit
/// padding field on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    F32,
    U32,
    I32,
    /// Host `glam::Vec2` aligns to 4, the consumer aligns to 8; the layout
    /// assertions force vec2 fields onto 8-byte offsets.
    Vec2,
    UVec2,
    Vec3,
    Vec4,
    Mat4,
    /// `array<vec4<f32>, N>`; vec4 element stride satisfies uniform rules.
    Vec4Array(usize),
}

impl FieldKind {
    pub const fn size(self) -> usize {
        match self {
            FieldKind::F32 | FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::Vec2 | FieldKind::UVec2 => 8,
            FieldKind::Vec3 => 12,
            FieldKind::Vec4 => 16,
            FieldKind::Mat4 => 64,
            FieldKind::Vec4Array(n) => 16 * n,
        }
    }

    /// Alignment the consumer-side compiler derives for this field.
    pub const fn align(self) -> usize {
        match self {
            FieldKind::F32 | FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::Vec2 | FieldKind::UVec2 => 8,
            FieldKind::Vec3 | FieldKind::Vec4 | FieldKind::Mat4 | FieldKind::Vec4Array(_) => 16,
        }
    }

    /// WGSL spelling of this field type.
    pub fn wgsl_type(self) -> String {
        match self {
            FieldKind::F32 => "f32".to_string(),
            FieldKind::U32 => "u32".to_string(),
            FieldKind::I32 => "i32".to_string(),
            FieldKind::Vec2 => "vec2<f32>".to_string(),
            FieldKind::UVec2 => "vec2<u32>".to_string(),
            FieldKind::Vec3 => "vec3<f32>".to_string(),
            FieldKind::Vec4 => "vec4<f32>".to_string(),
            FieldKind::Mat4 => "mat4x4<f32>".to_string(),
            FieldKind::Vec4Array(n) => format!("array<vec4<f32>, {}>", n),
        }
    }
}

/// One named field of a contract record.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Host types that may appear in a contract record.
pub trait ContractField {
    const KIND: FieldKind;
}

impl ContractField for f32 {
    const KIND: FieldKind = FieldKind::F32;
}

impl ContractField for u32 {
    const KIND: FieldKind = FieldKind::U32;
}

impl ContractField for i32 {
    const KIND: FieldKind = FieldKind::I32;
}

impl ContractField for glam::Vec2 {
    const KIND: FieldKind = FieldKind::Vec2;
}

impl ContractField for glam::UVec2 {
    const KIND: FieldKind = FieldKind::UVec2;
}

impl ContractField for glam::Vec3 {
    const KIND: FieldKind = FieldKind::Vec3;
}

impl ContractField for glam::Vec4 {
    const KIND: FieldKind = FieldKind::Vec4;
}

impl ContractField for glam::Mat4 {
    const KIND: FieldKind = FieldKind::Mat4;
}

impl<const N: usize> ContractField for [glam::Vec4; N] {
    const KIND: FieldKind = FieldKind::Vec4Array(N);
}

const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Consumer-side layout of one contract record, derived from its field list.
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl RecordLayout {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Alignment of the whole record (largest member alignment).
    pub const fn align(&self) -> usize {
        let mut align = 4;
        let mut i = 0;
        while i < self.fields.len() {
            let a = self.fields[i].kind.align();
            if a > align {
                align = a;
            }
            i += 1;
        }
        align
    }

    /// Total record size, rounded up to the record alignment.
    pub const fn size(&self) -> usize {
        let mut offset = 0;
        let mut i = 0;
        while i < self.fields.len() {
            let kind = self.fields[i].kind;
            offset = align_up(offset, kind.align());
            offset += kind.size();
            i += 1;
        }
        align_up(offset, self.align())
    }

    /// Byte offset of `field` as the consumer sees it.
    ///
    /// Panics when the field is not part of the record; in the const
    /// contexts this is called from, that panic is a compile error.
    pub const fn offset_of(&self, field: &str) -> usize {
        let mut offset = 0;
        let mut i = 0;
        while i < self.fields.len() {
            let f = self.fields[i];
            offset = align_up(offset, f.kind.align());
            if str_eq(f.name, field) {
                return offset;
            }
            offset += f.kind.size();
            i += 1;
        }
        panic!("field is not part of this record layout");
    }

    /// Whether the record mixes scalar/vec3 fields with 16-byte-aligned ones.
    pub const fn has_wide_fields(&self) -> bool {
        self.align() == 16
    }

    /// Load-time re-verification of the host struct against this layout.
    pub fn check<T: bytemuck::Pod>(&self) -> ContractResult<()> {
        let actual = std::mem::size_of::<T>();
        let expected = self.size();
        if actual != expected {
            return Err(ContractError::LayoutMismatch {
                record: self.name,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Emit the WGSL struct declaration for the consumer side.
    pub fn wgsl_struct(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "struct {} {{", self.name);
        for field in self.fields {
            let _ = writeln!(out, "    {}: {},", field.name, field.kind.wgsl_type());
        }
        out.push_str("}\n");
        out
    }
}

/// Declares one contract record from a single field list.
///
/// Expands to the `#[repr(C)]` host struct, a `LAYOUT` constant describing
/// the consumer-side layout, and a compile-time check that the size and the
/// offset of every field agree between the two.
#[macro_export]
macro_rules! contract_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident : $field_ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, ::bytemuck::Pod, ::bytemuck::Zeroable)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $field_ty,
            )+
        }

        impl $name {
            /// Consumer-side layout derived from the field list.
            pub const LAYOUT: $crate::layout::RecordLayout = $crate::layout::RecordLayout::new(
                stringify!($name),
                &[
                    $(
                        $crate::layout::Field::new(
                            stringify!($field),
                            <$field_ty as $crate::layout::ContractField>::KIND,
                        ),
                    )+
                ],
            );
        }

        const _: () = {
            assert!(
                ::core::mem::size_of::<$name>() == $name::LAYOUT.size(),
                "host struct size diverges from the consumer-side layout"
            );
            $(
                assert!(
                    ::core::mem::offset_of!($name, $field)
                        == $name::LAYOUT.offset_of(stringify!($field)),
                    "host field offset diverges from the consumer-side layout"
                );
            )+
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, UVec2, Vec3, Vec4};

    contract_record! {
        /// Exercises every alignment case: a matrix, a packed vec3 + scalar
        /// pair, a vec3 that needs explicit padding, and trailing scalars.
        pub struct SampleRecord {
            pub transform: Mat4,
            pub origin: Vec3,
            pub scale: f32,
            pub tint: Vec3,
            pub _pad0: f32,
            pub extent: UVec2,
            pub flags: u32,
            pub _pad1: u32,
        }
    }

    #[test]
    fn derived_offsets_match_consumer_rules() {
        let layout = &SampleRecord::LAYOUT;
        assert_eq!(layout.offset_of("transform"), 0);
        assert_eq!(layout.offset_of("origin"), 64);
        assert_eq!(layout.offset_of("scale"), 76);
        assert_eq!(layout.offset_of("tint"), 80);
        assert_eq!(layout.offset_of("_pad0"), 92);
        assert_eq!(layout.offset_of("extent"), 96);
        assert_eq!(layout.offset_of("flags"), 104);
        assert_eq!(layout.offset_of("_pad1"), 108);
        assert_eq!(layout.size(), 112);
        assert_eq!(layout.size() % 16, 0);
        assert!(layout.has_wide_fields());
    }

    #[test]
    fn host_struct_matches_derived_layout() {
        assert!(SampleRecord::LAYOUT.check::<SampleRecord>().is_ok());
        assert_eq!(std::mem::size_of::<SampleRecord>(), 112);
    }

    #[test]
    fn scalar_packs_into_vec3_fourth_lane() {
        // A scalar directly after a vec3 lands at offset 12 on both sides.
        const LAYOUT: RecordLayout = RecordLayout::new(
            "Packed",
            &[
                Field::new("direction", FieldKind::Vec3),
                Field::new("intensity", FieldKind::F32),
            ],
        );
        assert_eq!(LAYOUT.offset_of("intensity"), 12);
        assert_eq!(LAYOUT.size(), 16);
    }

    #[test]
    fn vec3_before_wide_field_requires_padding() {
        // Without an explicit pad the consumer skips to the next 16-byte
        // boundary; the derived offset makes that visible.
        const LAYOUT: RecordLayout = RecordLayout::new(
            "NeedsPad",
            &[
                Field::new("color", FieldKind::Vec3),
                Field::new("row", FieldKind::Vec4),
            ],
        );
        assert_eq!(LAYOUT.offset_of("row"), 16);
        assert_eq!(LAYOUT.size(), 32);
    }

    #[test]
    fn vec4_array_layout() {
        const LAYOUT: RecordLayout = RecordLayout::new(
            "Sh",
            &[
                Field::new("coeffs", FieldKind::Vec4Array(9)),
                Field::new("count", FieldKind::U32),
            ],
        );
        assert_eq!(LAYOUT.offset_of("coeffs"), 0);
        assert_eq!(LAYOUT.offset_of("count"), 144);
        assert_eq!(LAYOUT.size(), 160);
    }

    #[test]
    fn check_reports_size_divergence() {
        // A host type that is deliberately the wrong size for the layout.
        let err = SampleRecord::LAYOUT.check::<Vec4>().unwrap_err();
        match err {
            crate::error::ContractError::LayoutMismatch {
                record,
                expected,
                actual,
            } => {
                assert_eq!(record, "SampleRecord");
                assert_eq!(expected, 112);
                assert_eq!(actual, 16);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wgsl_struct_emission() {
        let wgsl = SampleRecord::LAYOUT.wgsl_struct();
        assert!(wgsl.starts_with("struct SampleRecord {\n"));
        assert!(wgsl.contains("    transform: mat4x4<f32>,\n"));
        assert!(wgsl.contains("    origin: vec3<f32>,\n"));
        assert!(wgsl.contains("    extent: vec2<u32>,\n"));
        assert!(wgsl.ends_with("}\n"));
    }
}
