// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
wgpu attribute sink.

wgpu has no mutable attribute state: vertex attributes are baked into the render pipeline as
`VertexBufferLayout`s. This sink keeps the state the binder configures and hands it back as
buffer layouts for pipeline creation. Step modes are per buffer in wgpu, so per-vertex and
per-instance slots come back as separate buffers.
*/

use std::collections::BTreeMap;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexStepMode};

use crate::bindings::resolved::SlotMask;
use crate::device::{AttributeSink, DeviceCaps};
use crate::imp::GraphicsError;
use crate::vertex::ComponentType;

impl DeviceCaps {
    /// Caps for a wgpu device with the given limits. wgpu always supports instance stepping.
    pub fn from_wgpu_limits(limits: &wgpu::Limits) -> Self {
        DeviceCaps {
            supports_instancing: true,
            max_vertex_attributes: limits.max_vertex_attributes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ConfiguredSlot {
    attribute: VertexAttribute,
    stride: u64,
}

/// One vertex buffer's worth of attributes, owned so it can outlive the sink borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferDescription {
    pub array_stride: u64,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferDescription {
    pub fn as_layout(&self) -> VertexBufferLayout<'_> {
        VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

#[derive(Debug)]
pub struct PipelineVertexSink {
    max_vertex_attributes: u32,
    slots: BTreeMap<u32, ConfiguredSlot>,
    step_modes: BTreeMap<u32, VertexStepMode>,
    enabled: Vec<u32>,
    generation: u64,
}

impl PipelineVertexSink {
    pub fn new(caps: &DeviceCaps) -> Self {
        Self {
            max_vertex_attributes: caps.max_vertex_attributes,
            slots: BTreeMap::new(),
            step_modes: BTreeMap::new(),
            enabled: Vec::new(),
            generation: 0,
        }
    }

    /// Incremented on every `mark_dirty`; pipelines built at an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The enabled, configured slots grouped into vertex buffers.
    ///
    /// Buffers are ordered per-vertex first, then per-instance; attributes within a buffer are
    /// ordered by slot.
    pub fn vertex_buffers(&self) -> Vec<VertexBufferDescription> {
        let mut buffers: Vec<VertexBufferDescription> = Vec::new();
        for step_mode in [VertexStepMode::Vertex, VertexStepMode::Instance] {
            for &slot in &self.enabled {
                let Some(configured) = self.slots.get(&slot) else {
                    continue;
                };
                let slot_step = self
                    .step_modes
                    .get(&slot)
                    .copied()
                    .unwrap_or(VertexStepMode::Vertex);
                if slot_step != step_mode {
                    continue;
                }
                match buffers
                    .iter_mut()
                    .find(|b| b.step_mode == step_mode && b.array_stride == configured.stride)
                {
                    Some(buffer) => buffer.attributes.push(configured.attribute),
                    None => buffers.push(VertexBufferDescription {
                        array_stride: configured.stride,
                        step_mode,
                        attributes: vec![configured.attribute],
                    }),
                }
            }
        }
        buffers
    }

    fn check_slot(&self, slot: u32) -> Result<(), GraphicsError> {
        if slot < self.max_vertex_attributes {
            Ok(())
        } else {
            Err(GraphicsError::InvalidSlot { slot })
        }
    }
}

fn vertex_format(
    component_count: u8,
    component_type: ComponentType,
    normalized: bool,
) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    let format = match (component_type, component_count, normalized) {
        (ComponentType::Float, 1, _) => F::Float32,
        (ComponentType::Float, 2, _) => F::Float32x2,
        (ComponentType::Float, 3, _) => F::Float32x3,
        (ComponentType::Float, 4, _) => F::Float32x4,
        (ComponentType::HalfFloat, 2, _) => F::Float16x2,
        (ComponentType::HalfFloat, 4, _) => F::Float16x4,
        (ComponentType::UnsignedByte, 2, false) => F::Uint8x2,
        (ComponentType::UnsignedByte, 4, false) => F::Uint8x4,
        (ComponentType::UnsignedByte, 2, true) => F::Unorm8x2,
        (ComponentType::UnsignedByte, 4, true) => F::Unorm8x4,
        (ComponentType::Short, 2, false) => F::Sint16x2,
        (ComponentType::Short, 4, false) => F::Sint16x4,
        (ComponentType::Short, 2, true) => F::Snorm16x2,
        (ComponentType::Short, 4, true) => F::Snorm16x4,
        _ => return None,
    };
    Some(format)
}

impl AttributeSink for PipelineVertexSink {
    fn configure_slot(
        &mut self,
        slot: u32,
        component_count: u8,
        component_type: ComponentType,
        normalized: bool,
        stride: usize,
        read_offset: usize,
    ) -> Result<(), GraphicsError> {
        self.check_slot(slot)?;
        let format = vertex_format(component_count, component_type, normalized).ok_or(
            GraphicsError::UnsupportedFormat {
                slot,
                component_count,
                component_type,
                normalized,
            },
        )?;
        self.slots.insert(
            slot,
            ConfiguredSlot {
                attribute: VertexAttribute {
                    format,
                    offset: read_offset as u64,
                    shader_location: slot,
                },
                stride: stride as u64,
            },
        );
        Ok(())
    }

    fn set_step_rate(&mut self, slot: u32, rate: u32) -> Result<(), GraphicsError> {
        self.check_slot(slot)?;
        let step_mode = match rate {
            0 => VertexStepMode::Vertex,
            1 => VertexStepMode::Instance,
            _ => {
                return Err(GraphicsError::Rejected {
                    call: "set_step_rate",
                    reason: format!("wgpu cannot step slot {slot} every {rate} instances"),
                });
            }
        };
        self.step_modes.insert(slot, step_mode);
        Ok(())
    }

    fn set_enabled_slots(&mut self, mask: &SlotMask) -> Result<(), GraphicsError> {
        self.enabled.clear();
        self.enabled.extend(mask.iter());
        Ok(())
    }

    fn mark_dirty(&mut self) -> Result<(), GraphicsError> {
        self.generation += 1;
        logwise::trace_sync!(
            "wgpu vertex state now at generation {generation}",
            generation = self.generation
        );
        Ok(())
    }
}
