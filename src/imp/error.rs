// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::vertex::ComponentType;

/// A device call was rejected by the graphics API.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    #[error(
        "slot {slot} cannot read {component_count} x {component_type:?} (normalized: {normalized})"
    )]
    UnsupportedFormat {
        slot: u32,
        component_count: u8,
        component_type: ComponentType,
        normalized: bool,
    },
    #[error("slot {slot} is not a valid attribute slot")]
    InvalidSlot { slot: u32 },
    #[error("device rejected {call}: {reason}")]
    Rejected { call: &'static str, reason: String },
}
