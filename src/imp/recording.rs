// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
A sink that records every call instead of talking to a device.

Useful for tests and for hosts that replay the calls onto their own API later.
*/

use crate::bindings::resolved::SlotMask;
use crate::device::AttributeSink;
use crate::imp::GraphicsError;
use crate::vertex::ComponentType;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    ConfigureSlot {
        slot: u32,
        component_count: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: usize,
        read_offset: usize,
    },
    SetStepRate {
        slot: u32,
        rate: u32,
    },
    SetEnabledSlots(SlotMask),
    MarkDirty,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    fail_configure: Option<u32>,
    fail_step_rate: Option<u32>,
    fail_enable: bool,
    fail_dirty: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Returns the recorded calls and starts a fresh recording.
    pub fn take_calls(&mut self) -> Vec<SinkCall> {
        std::mem::take(&mut self.calls)
    }

    /// Makes `configure_slot` fail for `slot` from now on.
    pub fn fail_configure_slot(&mut self, slot: u32) {
        self.fail_configure = Some(slot);
    }

    /// Makes `set_step_rate` fail for `slot` from now on.
    pub fn fail_step_rate(&mut self, slot: u32) {
        self.fail_step_rate = Some(slot);
    }

    /// Makes `mark_dirty` fail from now on.
    pub fn fail_mark_dirty(&mut self) {
        self.fail_dirty = true;
    }

    /// Makes `set_enabled_slots` fail from now on.
    pub fn fail_enable_slots(&mut self) {
        self.fail_enable = true;
    }

    /// The mask from the most recent accepted `set_enabled_slots`.
    pub fn enabled(&self) -> Option<&SlotMask> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::SetEnabledSlots(mask) => Some(mask),
            _ => None,
        })
    }
}

impl AttributeSink for RecordingSink {
    fn configure_slot(
        &mut self,
        slot: u32,
        component_count: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: usize,
        read_offset: usize,
    ) -> Result<(), GraphicsError> {
        if self.fail_configure == Some(slot) {
            return Err(GraphicsError::Rejected {
                call: "configure_slot",
                reason: format!("slot {slot} configured to fail"),
            });
        }
        self.calls.push(SinkCall::ConfigureSlot {
            slot,
            component_count,
            component_type,
            normalized,
            stride,
            read_offset,
        });
        Ok(())
    }

    fn set_step_rate(&mut self, slot: u32, rate: u32) -> Result<(), GraphicsError> {
        if self.fail_step_rate == Some(slot) {
            return Err(GraphicsError::Rejected {
                call: "set_step_rate",
                reason: format!("slot {slot} configured to fail"),
            });
        }
        self.calls.push(SinkCall::SetStepRate { slot, rate });
        Ok(())
    }

    fn set_enabled_slots(&mut self, mask: &SlotMask) -> Result<(), GraphicsError> {
        if self.fail_enable {
            return Err(GraphicsError::Rejected {
                call: "set_enabled_slots",
                reason: "configured to fail".to_string(),
            });
        }
        self.calls.push(SinkCall::SetEnabledSlots(mask.clone()));
        Ok(())
    }

    fn mark_dirty(&mut self) -> Result<(), GraphicsError> {
        if self.fail_dirty {
            return Err(GraphicsError::Rejected {
                call: "mark_dirty",
                reason: "configured to fail".to_string(),
            });
        }
        self.calls.push(SinkCall::MarkDirty);
        Ok(())
    }
}
