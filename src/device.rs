// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Device-side binding state.
//!
//! The core talks to the graphics device through two narrow surfaces: a [`DeviceCaps`] value
//! describing what the device can do, and an [`AttributeSink`] that receives slot
//! configuration. [`DeviceBindings`] owns the sink together with the device's current
//! enabled-slot state, and is handed by reference to the [binder](crate::bindings::binder),
//! which is the only code that changes that state.

use crate::bindings::ApplyError;
use crate::bindings::dirty_tracking::{DirtyReceiver, DirtySender};
use crate::bindings::resolved::SlotMask;
use crate::vertex::ComponentType;

pub use crate::imp::{GraphicsError, RecordingSink, SinkCall};
#[cfg(feature = "backend_wgpu")]
pub use crate::imp::{PipelineVertexSink, VertexBufferDescription};

/// What the device supports, as far as attribute binding is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCaps {
    /// Whether attributes can step per instance. When set, every configured slot is explicitly
    /// reset to per-vertex stepping.
    pub supports_instancing: bool,
    /// Number of hardware attribute slots. Resolved slot masks are sized to this.
    pub max_vertex_attributes: u32,
}

/// Receives the device calls issued by the binder.
///
/// Each call may fail with a [`GraphicsError`]; failures are propagated to the caller, never
/// retried.
pub trait AttributeSink {
    /// Configures how `slot` reads from the bound vertex buffer.
    fn configure_slot(
        &mut self,
        slot: u32,
        component_count: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: usize,
        read_offset: usize,
    ) -> Result<(), GraphicsError>;

    /// Sets the instance step rate of `slot`. A rate of 0 means per-vertex.
    fn set_step_rate(&mut self, slot: u32, rate: u32) -> Result<(), GraphicsError>;

    /// Makes `mask` the complete set of enabled slots.
    fn set_enabled_slots(&mut self, mask: &SlotMask) -> Result<(), GraphicsError>;

    /// Signals that attribute state changed since the last draw.
    fn mark_dirty(&mut self) -> Result<(), GraphicsError>;
}

/// A device's attribute sink plus its enabled-slot state.
#[derive(Debug)]
pub struct DeviceBindings<S> {
    sink: S,
    caps: DeviceCaps,
    enabled: SlotMask,
    dirty: DirtySender,
}

impl<S: AttributeSink> DeviceBindings<S> {
    /// Starts with every slot disabled.
    pub fn new(sink: S, caps: DeviceCaps) -> Self {
        Self {
            sink,
            caps,
            enabled: SlotMask::new(caps.max_vertex_attributes as usize),
            dirty: DirtySender::new(false),
        }
    }

    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    /// Slots enabled by the most recent successful apply.
    pub fn enabled_slots(&self) -> &SlotMask {
        &self.enabled
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// A receiver for the draw path; it reports dirty after every successful apply.
    pub fn dirty_receiver(&self) -> DirtyReceiver {
        DirtyReceiver::new(&self.dirty)
    }

    /// Swaps in `mask` as the enabled-slot state and flags binding state dirty.
    ///
    /// Nothing changes if the sink rejects the mask. Once it accepts, the stored state and the
    /// dirty flag follow the sink even if its own `mark_dirty` then fails.
    pub(crate) fn replace_enabled_slots(&mut self, mask: &SlotMask) -> Result<(), ApplyError> {
        self.sink
            .set_enabled_slots(mask)
            .map_err(ApplyError::EnableSlots)?;
        self.enabled.clone_from(mask);
        self.dirty.mark_dirty(true);
        self.sink.mark_dirty().map_err(ApplyError::MarkDirty)
    }
}
