// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Concrete attribute sinks.
//!
//! The recording sink is always available. The wgpu sink is built with `backend_wgpu`.

mod error;
mod recording;

pub use error::GraphicsError;
pub use recording::{RecordingSink, SinkCall};

#[cfg(feature = "backend_wgpu")]
mod wgpu;

#[cfg(feature = "backend_wgpu")]
pub use self::wgpu::{PipelineVertexSink, VertexBufferDescription};
