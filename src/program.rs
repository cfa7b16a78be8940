// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Shader program identity and input introspection.

Binding resolutions are cached per program, so the cache needs a key that can never name two
different programs. [`ProgramId`] values are minted from a process-wide counter and are never
reused. Hosts that recycle program objects should still report destruction through
[`ProgramLifecycle`], which drops the stale entries from every observing layout.
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use wasm_safe_mutex::Mutex;

use crate::bindings::cache::BindingCache;
use crate::vertex::{VertexLayout, VertexUsage};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(u64);

impl ProgramId {
    /// Mints a fresh identity, distinct from every other identity minted in this process.
    pub fn new() -> Self {
        ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ProgramId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// Introspection surface of a compiled shader program.
///
/// Queries run without any crate lock held, so an implementation may consult a layout's
/// [`BindingCache`] or a [`ProgramLifecycle`] while answering.
pub trait ShaderProgram {
    fn id(&self) -> ProgramId;

    /// The hardware slot bound to the input declared as (`usage`, `usage_index`), if any.
    ///
    /// Must be stable for the lifetime of the program.
    fn locate_input(&self, usage: VertexUsage, usage_index: u8) -> Option<u32>;
}

/// A [`ShaderProgram`] backed by a table of reflected inputs.
///
/// # Example
///
/// ```
/// use vertex_attrib_binding::program::{ProgramInputs, ShaderProgram};
/// use vertex_attrib_binding::vertex::VertexUsage;
///
/// let program = ProgramInputs::new()
///     .with_input(VertexUsage::Position, 0, 0)
///     .with_input(VertexUsage::TextureCoordinate, 0, 1);
/// assert_eq!(program.locate_input(VertexUsage::TextureCoordinate, 0), Some(1));
/// assert_eq!(program.locate_input(VertexUsage::Color, 0), None);
/// ```
#[derive(Debug, Clone)]
pub struct ProgramInputs {
    id: ProgramId,
    inputs: HashMap<(VertexUsage, u8), u32>,
}

impl ProgramInputs {
    pub fn new() -> Self {
        Self::with_id(ProgramId::new())
    }

    pub fn with_id(id: ProgramId) -> Self {
        Self {
            id,
            inputs: HashMap::new(),
        }
    }

    pub fn with_input(mut self, usage: VertexUsage, usage_index: u8, slot: u32) -> Self {
        self.add_input(usage, usage_index, slot);
        self
    }

    /// # Panics
    ///
    /// Panics if the input was already declared.
    pub fn add_input(&mut self, usage: VertexUsage, usage_index: u8, slot: u32) {
        let old = self.inputs.insert((usage, usage_index), slot);
        assert!(
            old.is_none(),
            "Input {usage}{usage_index} already declared at slot {old:?}"
        );
    }
}

impl Default for ProgramInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram for ProgramInputs {
    fn id(&self) -> ProgramId {
        self.id
    }
    fn locate_input(&self, usage: VertexUsage, usage_index: u8) -> Option<u32> {
        self.inputs.get(&(usage, usage_index)).copied()
    }
}

/**
The program owner's side of cache invalidation.

Layouts register their binding cache with [`observe`](Self::observe). When the owner destroys a
program it calls [`program_destroyed`](Self::program_destroyed), and every live observing cache
forgets its resolution for that program. Registration holds the cache weakly, so observing a
layout does not keep it alive.
*/
pub struct ProgramLifecycle {
    observers: Mutex<Vec<Weak<BindingCache>>>,
}

impl ProgramLifecycle {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn observe(&self, layout: &VertexLayout) {
        let weak = Arc::downgrade(layout.binding_cache());
        let mut observers = self.observers.lock_sync();
        if !observers.iter().any(|o| o.ptr_eq(&weak)) {
            observers.push(weak);
        }
    }

    /// Drops `program`'s resolution from every observing cache.
    ///
    /// Returns the number of cache entries that were removed.
    pub fn program_destroyed(&self, program: ProgramId) -> usize {
        let mut observers = self.observers.lock_sync();
        let mut removed = 0;
        observers.retain(|weak| match weak.upgrade() {
            Some(cache) => {
                if cache.invalidate(program) {
                    removed += 1;
                }
                true
            }
            None => false,
        });
        logwise::info_sync!(
            "program destroyed {program}; invalidated {removed} cached bindings",
            program = logwise::privacy::LogIt(&program),
            removed = removed
        );
        removed
    }

    /// Number of layouts still alive and observed.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock_sync()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl Default for ProgramLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProgramLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramLifecycle")
            .field("observers", &self.observer_count())
            .finish()
    }
}
