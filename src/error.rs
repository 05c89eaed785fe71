//! Contract error types
//!
//! A layout mismatch between the two sides of the GPU boundary is not
//! detectable at the point of failure, so everything that can be checked is
//! checked eagerly and reported through [`ContractError`].

use crate::slots::SlotNamespace;
use std::fmt;
use thiserror::Error;

/// The three kinds of light records carried by the light buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Area,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightKind::Directional => write!(f, "directional"),
            LightKind::Point => write!(f, "point"),
            LightKind::Area => write!(f, "area"),
        }
    }
}

/// Contract error type
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("record {record}: consumer layout is {expected} bytes, host struct is {actual}")]
    LayoutMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate {namespace} slot {slot} in {registry}")]
    DuplicateSlot {
        namespace: SlotNamespace,
        slot: u32,
        registry: &'static str,
    },
    #[error("{kind} light capacity exceeded: {requested} > {capacity}")]
    LightCapacityExceeded {
        kind: LightKind,
        requested: usize,
        capacity: usize,
    },
    #[error("instance capacity exceeded: {requested} > {capacity}")]
    InstanceCapacityExceeded { requested: usize, capacity: usize },
    #[error("frame ring exhausted: all {depth} slots are in flight")]
    RingExhausted { depth: usize },
    #[error("no frame is being recorded")]
    NoFrameRecording,
    #[error("frame slot {index} is not in flight")]
    NotInFlight { index: usize },
}

pub type ContractResult<T> = Result<T, ContractError>;
