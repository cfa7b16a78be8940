// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! vertex_attrib_binding binds vertex buffer layouts to shader program input slots for
immediate-mode graphics APIs.

On APIs like OpenGL, attribute slots belong to the program. Each time the active program
changes, every field of the active vertex layout has to be pointed at whatever slot the new
program put its matching input in, and every slot the old program used but the new one does not
has to be switched off. This happens on every draw call, so the matching has to be cheap.

# How it works

| Step       | Where                                 | When                          | Cost                          |
|------------|---------------------------------------|-------------------------------|-------------------------------|
| Resolve    | [`bindings::resolve`]                 | first draw of a (layout, program) pair | one introspection query or two per field |
| Cache      | [`bindings::BindingCache`], per layout | every draw                    | one hash lookup               |
| Apply      | [`bindings::apply`]                   | every draw                    | one device call per used slot |

Resolution matches layout fields to program inputs by semantic usage and usage index. Fields
the program does not consume are skipped. Inputs that introspection cannot see row by row, such
as a `mat4` fed from `BLENDWEIGHT0..3`, are found through the base index and laid out on
consecutive slots.

Applying replays the cached assignments onto an [`device::AttributeSink`], then swaps in the
binding's slot mask as the device's enabled-slot state in one step. Nothing from a previous
binding stays enabled.

# Example

```
use vertex_attrib_binding::bindings::bind_for_draw;
use vertex_attrib_binding::device::{DeviceBindings, DeviceCaps, RecordingSink};
use vertex_attrib_binding::program::ProgramInputs;
use vertex_attrib_binding::vertex::{VertexFormat, VertexLayout, VertexUsage};

let mut layout = VertexLayout::new();
layout.add_field(VertexUsage::Position, 0, VertexFormat::Vector3);
layout.add_field(VertexUsage::Color, 0, VertexFormat::Color);

let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 0);
let caps = DeviceCaps { supports_instancing: true, max_vertex_attributes: 16 };
let mut device = DeviceBindings::new(RecordingSink::new(), caps);

let binding = bind_for_draw(&mut device, &layout, &program, 0).expect("bind");
//the program has no color input, so only position is bound
assert_eq!(binding.assignments().len(), 1);
assert_eq!(device.enabled_slots().iter().collect::<Vec<_>>(), vec![0]);
```

# Backends

Device calls go through the [`device::AttributeSink`] trait, so any immediate-mode API can be
driven by implementing four calls. Two sinks ship with the crate: a recording sink, and (with
the default `backend_wgpu` feature) a sink that turns bindings into
[wgpu](https://wgpu.rs) vertex buffer layouts.

# Threading

Everything runs on the thread that owns the graphics context. Calls are synchronous and never
suspend.
*/

pub mod bindings;
pub mod device;
pub mod program;
pub mod vertex;
mod bittricks;
mod imp;
