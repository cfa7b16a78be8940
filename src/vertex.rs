// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Vertex record descriptions: semantic usages, element formats and layouts */

pub mod format;
pub mod layout;
pub mod usage;

pub use format::{ComponentType, VertexFormat};
pub use layout::{VertexField, VertexLayout};
pub use usage::VertexUsage;
