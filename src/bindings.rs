// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Resolving, caching and applying vertex attribute bindings */

pub mod binder;
pub mod cache;
pub mod dirty_tracking;
pub mod resolved;
pub mod resolver;

pub use binder::{ApplyError, BindError, apply, bind_for_draw};
pub use cache::BindingCache;
pub use resolved::{ResolvedBinding, SlotAssignment, SlotMask};
pub use resolver::{ResolveError, resolve};
