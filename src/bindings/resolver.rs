// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Matching layout fields to program input slots.

For every field, in layout order:

1. Ask the program for the slot of (usage, usage index). If it has one, use it.
2. Otherwise ask for (usage, 0). If that is missing too, the program does not consume the
   field and it is skipped. This is not an error.
3. Otherwise the field's slot is `base + usage_index`.

Step 3 is what makes matrix inputs work: a `float4x4`/`mat4` input occupies four consecutive
slots, but introspection only reports the first one. A layout that feeds the matrix as
`BLENDWEIGHT0..3` lands on `base..base+3`.

Slots are not deduplicated. A layout that maps two fields onto one slot is passed through.
*/

use crate::bindings::resolved::{ResolvedBinding, SlotAssignment, SlotMask};
use crate::device::DeviceCaps;
use crate::program::ShaderProgram;
use crate::vertex::{VertexLayout, VertexUsage};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "vertex input {usage}{usage_index} resolved to slot {slot:?}, beyond the device's {max} attribute slots"
    )]
    SlotOutOfRange {
        usage: VertexUsage,
        usage_index: u8,
        /// `None` when `base + usage_index` does not fit in a slot index at all.
        slot: Option<u32>,
        max: u32,
    },
}

/// Computes the slot assignments of `layout` for `program`.
///
/// Pure: the program is only queried, nothing is cached.
pub fn resolve<P: ShaderProgram + ?Sized>(
    layout: &VertexLayout,
    program: &P,
    caps: &DeviceCaps,
) -> Result<ResolvedBinding, ResolveError> {
    let max = caps.max_vertex_attributes;
    let mut mask = SlotMask::new(max as usize);
    let mut assignments = Vec::with_capacity(layout.fields().len());

    for field in layout.fields() {
        let (usage, usage_index) = (field.usage(), field.usage_index());
        let slot = match program.locate_input(usage, usage_index) {
            Some(slot) => Some(slot),
            None => match program.locate_input(usage, 0) {
                Some(base) => base.checked_add(u32::from(usage_index)),
                None => {
                    logwise::trace_sync!(
                        "{program} has no input for {usage}{usage_index}; skipping field",
                        program = logwise::privacy::LogIt(&program.id()),
                        usage = logwise::privacy::LogIt(&usage),
                        usage_index = usage_index
                    );
                    continue;
                }
            },
        };
        let slot = match slot {
            Some(slot) if slot < max => slot,
            out_of_range => {
                logwise::warn_sync!(
                    "{program} maps {usage}{usage_index} outside the attribute range",
                    program = logwise::privacy::LogIt(&program.id()),
                    usage = logwise::privacy::LogIt(&usage),
                    usage_index = usage_index
                );
                return Err(ResolveError::SlotOutOfRange {
                    usage,
                    usage_index,
                    slot: out_of_range,
                    max,
                });
            }
        };
        if mask.contains(slot) {
            logwise::warn_sync!(
                "slot {slot} is bound by more than one field of this layout",
                slot = slot
            );
        }

        let format = field.format();
        assignments.push(SlotAssignment {
            slot,
            component_count: format.component_count(),
            component_type: format.component_type(),
            normalized: format.normalized(),
            offset: field.offset(),
        });
        mask.set(slot);
    }

    Ok(ResolvedBinding::new(
        program.id(),
        layout.stride(),
        assignments,
        mask,
    ))
}
