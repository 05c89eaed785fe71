//! Shader Contract - the CPU/GPU data contract of a hybrid renderer
//!
//! This crate is the binding contract between the CPU-side scene logic and
//! the GPU-side shading kernels of a hybrid rasterization / ray-tracing
//! renderer: the binding-slot registries and the bit-exact record layouts
//! both sides must agree on. A layout mismatch across that boundary is never
//! caught as an error; it shows up as silently corrupted shading. The crate
//! is therefore built around making divergence impossible to compile.
//!
//! # What lives here
//! - Declarative record layouts with compile-time size/offset assertions and
//!   generated consumer-side WGSL ([`layout`])
//! - Binding-slot registries, three independent namespaces per renderer
//!   generation ([`slots`])
//! - Five frozen contract generations, from plain forward shading to the
//!   PBR hybrid ([`generations`])
//! - Producer-side frame assembly with capacity-checked light and instance
//!   staging ([`frame`])
//! - The frames-in-flight ring that keeps submitted records immutable
//!   ([`ring`])
//! - wgpu layout descriptions derived from the registries ([`binding`])

pub mod binding;
pub mod error;
pub mod frame;
pub mod generations;
pub mod layout;
pub mod ring;
pub mod slots;

pub use error::{ContractError, ContractResult, LightKind};
pub use frame::{FrameBuilder, InstanceTable, LightSet};
pub use generations::{Generation, NormalMatrixPack};
pub use layout::{ContractField, Field, FieldKind, RecordLayout};
pub use ring::{FrameRing, FrameToken};
pub use slots::{AttributeFormat, BindingSlot, SlotNamespace};

/// Verifies every shipped generation's registries and record layouts.
///
/// Intended to run once at startup on either side of the boundary; any
/// divergence is reported before a frame is assembled or consumed.
pub fn verify_all() -> ContractResult<()> {
    for generation in Generation::ALL {
        generation.verify()?;
    }
    Ok(())
}
