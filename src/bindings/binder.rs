// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Replaying a resolved binding onto the device.

This runs once per draw, so it only walks the precomputed assignments. Every assigned slot is
configured first. Only when all of them succeeded is the device's enabled-slot state replaced
and marked dirty, so a failed apply never leaves a half-swapped binding behind.
*/

use std::sync::Arc;

use crate::bindings::resolved::ResolvedBinding;
use crate::bindings::resolver::ResolveError;
use crate::device::{AttributeSink, DeviceBindings, GraphicsError};
use crate::program::{ProgramId, ShaderProgram};
use crate::vertex::VertexLayout;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("configuring attribute slot {slot} failed")]
    ConfigureSlot {
        slot: u32,
        #[source]
        source: GraphicsError,
    },
    #[error("resetting the step rate of attribute slot {slot} failed")]
    StepRate {
        slot: u32,
        #[source]
        source: GraphicsError,
    },
    #[error("replacing the enabled attribute slots failed")]
    EnableSlots(#[source] GraphicsError),
    #[error("marking attribute state dirty failed")]
    MarkDirty(#[source] GraphicsError),
    #[error("attribute slot {slot} read offset overflows: base {base_offset} + field {offset}")]
    OffsetOverflow {
        slot: u32,
        base_offset: usize,
        offset: usize,
    },
    #[error(
        "binding was resolved for {binding_slots} attribute slots but the device has {device_slots}"
    )]
    SlotCountMismatch {
        binding_slots: usize,
        device_slots: usize,
    },
}

/// Failure anywhere on the draw path.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Configures the device for `binding`, reading vertices starting at `base_offset`.
///
/// For each assignment, in order, the slot is configured to read its field at
/// `base_offset + field offset` with the layout's stride. Devices that support instancing also
/// get the slot's step rate reset to per-vertex, since an earlier binding may have left it
/// instanced. Then the enabled slots become exactly `binding.mask()`.
///
/// A binding resolved for a different slot count than the device's is refused before any
/// device call.
pub fn apply<S: AttributeSink>(
    device: &mut DeviceBindings<S>,
    program: ProgramId,
    base_offset: usize,
    binding: &ResolvedBinding,
) -> Result<(), ApplyError> {
    debug_assert_eq!(
        program,
        binding.program(),
        "binding was resolved for a different program"
    );
    let device_slots = device.caps().max_vertex_attributes as usize;
    if binding.mask().len() != device_slots {
        return Err(ApplyError::SlotCountMismatch {
            binding_slots: binding.mask().len(),
            device_slots,
        });
    }
    let reset_step_rate = device.caps().supports_instancing;
    let stride = binding.stride();
    for assignment in binding.assignments() {
        let slot = assignment.slot;
        let read_offset =
            base_offset
                .checked_add(assignment.offset)
                .ok_or(ApplyError::OffsetOverflow {
                    slot,
                    base_offset,
                    offset: assignment.offset,
                })?;
        device
            .sink_mut()
            .configure_slot(
                slot,
                assignment.component_count,
                assignment.component_type,
                assignment.normalized,
                stride,
                read_offset,
            )
            .map_err(|source| ApplyError::ConfigureSlot { slot, source })?;
        if reset_step_rate {
            device
                .sink_mut()
                .set_step_rate(slot, 0)
                .map_err(|source| ApplyError::StepRate { slot, source })?;
        }
    }
    device.replace_enabled_slots(binding.mask())?;
    logwise::trace_sync!(
        "applied {count} attribute slots for {program}",
        count = binding.assignments().len(),
        program = logwise::privacy::LogIt(&program)
    );
    Ok(())
}

/// The draw path: fetch (or resolve) `layout`'s binding for `program`, then apply it.
///
/// Returns the binding that was applied.
pub fn bind_for_draw<S: AttributeSink, P: ShaderProgram + ?Sized>(
    device: &mut DeviceBindings<S>,
    layout: &VertexLayout,
    program: &P,
    base_offset: usize,
) -> Result<Arc<ResolvedBinding>, BindError> {
    let caps = *device.caps();
    let binding = layout.get_or_resolve(program, &caps)?;
    apply(device, program.id(), base_offset, &binding)?;
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCaps, RecordingSink, SinkCall};
    use crate::bindings::resolve;
    use crate::program::ProgramInputs;
    use crate::vertex::{ComponentType, VertexFormat, VertexUsage};

    fn device(supports_instancing: bool) -> DeviceBindings<RecordingSink> {
        DeviceBindings::new(
            RecordingSink::new(),
            DeviceCaps {
                supports_instancing,
                max_vertex_attributes: 16,
            },
        )
    }

    fn layout() -> VertexLayout {
        let mut layout = VertexLayout::new();
        layout.add_field(VertexUsage::Position, 0, VertexFormat::Vector3);
        layout.add_field(VertexUsage::TextureCoordinate, 0, VertexFormat::Vector2);
        layout
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn configures_then_enables() {
        let mut device = device(false);
        let program = ProgramInputs::new()
            .with_input(VertexUsage::Position, 0, 0)
            .with_input(VertexUsage::TextureCoordinate, 0, 3);
        let binding = bind_for_draw(&mut device, &layout(), &program, 100).unwrap();

        let calls = device.sink().calls();
        assert_eq!(
            calls[..2],
            [
                SinkCall::ConfigureSlot {
                    slot: 0,
                    component_count: 3,
                    component_type: ComponentType::Float,
                    normalized: false,
                    stride: 20,
                    read_offset: 100,
                },
                SinkCall::ConfigureSlot {
                    slot: 3,
                    component_count: 2,
                    component_type: ComponentType::Float,
                    normalized: false,
                    stride: 20,
                    read_offset: 112,
                },
            ]
        );
        assert_eq!(calls[2], SinkCall::SetEnabledSlots(binding.mask().clone()));
        assert_eq!(calls[3], SinkCall::MarkDirty);
        assert_eq!(calls.len(), 4);
        assert_eq!(device.enabled_slots(), binding.mask());
        assert!(device.dirty_receiver().take_dirty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn instancing_devices_reset_step_rate() {
        let mut device = device(true);
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 5);
        bind_for_draw(&mut device, &layout(), &program, 0).unwrap();

        let calls = device.sink().calls();
        assert!(matches!(calls[0], SinkCall::ConfigureSlot { slot: 5, .. }));
        assert_eq!(calls[1], SinkCall::SetStepRate { slot: 5, rate: 0 });
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failed_configure_keeps_previous_enabled_slots() {
        let mut device = device(false);
        let layout = layout();
        let first = ProgramInputs::new().with_input(VertexUsage::Position, 0, 1);
        bind_for_draw(&mut device, &layout, &first, 0).unwrap();
        let before = device.enabled_slots().clone();
        let dirty = device.dirty_receiver();
        assert!(dirty.take_dirty());

        let second = ProgramInputs::new()
            .with_input(VertexUsage::Position, 0, 2)
            .with_input(VertexUsage::TextureCoordinate, 0, 6);
        device.sink_mut().fail_configure_slot(6);
        let err = bind_for_draw(&mut device, &layout, &second, 0).unwrap_err();
        assert!(
            matches!(err, BindError::Apply(ApplyError::ConfigureSlot { slot: 6, .. })),
            "{err:?}"
        );
        assert_eq!(device.enabled_slots(), &before);
        assert!(!dirty.is_dirty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn resolve_errors_surface_before_any_device_call() {
        let mut device = device(false);
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 16);
        let err = bind_for_draw(&mut device, &layout(), &program, 0).unwrap_err();
        assert!(matches!(err, BindError::Resolve(_)), "{err:?}");
        assert!(device.sink().calls().is_empty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failed_step_rate_reset_keeps_previous_enabled_slots() {
        let mut device = device(true);
        let program = ProgramInputs::new()
            .with_input(VertexUsage::Position, 0, 0)
            .with_input(VertexUsage::TextureCoordinate, 0, 4);
        device.sink_mut().fail_step_rate(4);
        let err = bind_for_draw(&mut device, &layout(), &program, 0).unwrap_err();
        assert!(
            matches!(err, BindError::Apply(ApplyError::StepRate { slot: 4, .. })),
            "{err:?}"
        );
        assert_eq!(device.enabled_slots().count(), 0);
        assert!(!device.dirty_receiver().is_dirty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failed_dirty_marking_is_reported_as_such() {
        let mut device = device(false);
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 3);
        device.sink_mut().fail_mark_dirty();
        let err = bind_for_draw(&mut device, &layout(), &program, 0).unwrap_err();
        assert!(
            matches!(err, BindError::Apply(ApplyError::MarkDirty(_))),
            "{err:?}"
        );
        //the sink took the mask, so the tracked state follows it and the draw path must re-check
        assert_eq!(device.enabled_slots().iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(device.sink().enabled(), Some(device.enabled_slots()));
        assert!(device.dirty_receiver().is_dirty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn overflowing_read_offset_is_an_error() {
        let mut device = device(false);
        let program = ProgramInputs::new()
            .with_input(VertexUsage::Position, 0, 0)
            .with_input(VertexUsage::TextureCoordinate, 0, 1);
        let err = bind_for_draw(&mut device, &layout(), &program, usize::MAX - 4).unwrap_err();
        assert_eq!(
            err,
            BindError::Apply(ApplyError::OffsetOverflow {
                slot: 1,
                base_offset: usize::MAX - 4,
                offset: 12,
            })
        );
        assert_eq!(device.enabled_slots().count(), 0);
        assert!(!device.dirty_receiver().is_dirty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn binding_for_another_slot_count_is_refused() {
        let wide = DeviceCaps {
            supports_instancing: false,
            max_vertex_attributes: 16,
        };
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 12);
        let binding = resolve(&layout(), &program, &wide).unwrap();

        let mut narrow = DeviceBindings::new(
            RecordingSink::new(),
            DeviceCaps {
                supports_instancing: false,
                max_vertex_attributes: 8,
            },
        );
        let err = apply(&mut narrow, program.id(), 0, &binding).unwrap_err();
        assert_eq!(
            err,
            ApplyError::SlotCountMismatch {
                binding_slots: 16,
                device_slots: 8,
            }
        );
        assert!(narrow.sink().calls().is_empty());
    }
}
