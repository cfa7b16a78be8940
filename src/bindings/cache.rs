// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Per-layout memo of resolved bindings, keyed by program.

One cache lives in each [`VertexLayout`], so its size is bounded by the number of programs
actually drawn with that layout. Entries are never evicted on their own; they leave only through
[`BindingCache::invalidate`] (usually driven by [`ProgramLifecycle`](crate::program::ProgramLifecycle))
or [`BindingCache::clear`].

A cached binding is only handed out for the caps it was resolved with. Asking with a different
slot count resolves again and replaces the entry.

The lock is not held while the program is queried, so a [`ShaderProgram`] may itself look at
this cache or at a [`ProgramLifecycle`](crate::program::ProgramLifecycle). When two callers race
on the same key, the first insert wins and both get that binding.
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use wasm_safe_mutex::Mutex;

use crate::bindings::resolved::ResolvedBinding;
use crate::bindings::resolver::{self, ResolveError};
use crate::device::DeviceCaps;
use crate::program::{ProgramId, ShaderProgram};
use crate::vertex::VertexLayout;

pub struct BindingCache {
    entries: Mutex<HashMap<ProgramId, Arc<ResolvedBinding>>>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the stored binding for `program`, or resolves, stores and returns it.
    ///
    /// A stored binding whose mask was sized for a different `max_vertex_attributes` is
    /// resolved again against `caps`.
    pub fn get_or_resolve<P: ShaderProgram + ?Sized>(
        &self,
        layout: &VertexLayout,
        program: &P,
        caps: &DeviceCaps,
    ) -> Result<Arc<ResolvedBinding>, ResolveError> {
        let id = program.id();
        if let Some(hit) = self.entries.lock_sync().get(&id) {
            if fits(hit, caps) {
                return Ok(hit.clone());
            }
        }
        let resolved = Arc::new(resolver::resolve(layout, program, caps)?);

        let mut entries = self.entries.lock_sync();
        match entries.get(&id) {
            Some(raced) if fits(raced, caps) => return Ok(raced.clone()),
            Some(_) => {
                logwise::info_sync!(
                    "replacing binding for {program}, resolved for another slot count",
                    program = logwise::privacy::LogIt(&id)
                );
            }
            None => {}
        }
        logwise::info_sync!(
            "cached binding for {program}: {count} slots",
            program = logwise::privacy::LogIt(&id),
            count = resolved.assignments().len()
        );
        entries.insert(id, resolved.clone());
        Ok(resolved)
    }

    /// The stored binding for `program`, without resolving.
    pub fn get(&self, program: ProgramId) -> Option<Arc<ResolvedBinding>> {
        self.entries.lock_sync().get(&program).cloned()
    }

    /// Forgets the binding for `program`. Returns whether one was stored.
    pub fn invalidate(&self, program: ProgramId) -> bool {
        self.entries.lock_sync().remove(&program).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock_sync().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock_sync().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fits(binding: &ResolvedBinding, caps: &DeviceCaps) -> bool {
    binding.mask().len() == caps.max_vertex_attributes as usize
}

impl Default for BindingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramInputs;
    use crate::vertex::{VertexFormat, VertexUsage};
    use std::cell::Cell;

    /// Counts introspection queries so tests can see whether resolution ran.
    struct CountingProgram {
        inner: ProgramInputs,
        queries: Cell<usize>,
    }

    impl ShaderProgram for CountingProgram {
        fn id(&self) -> ProgramId {
            self.inner.id()
        }
        fn locate_input(&self, usage: VertexUsage, usage_index: u8) -> Option<u32> {
            self.queries.set(self.queries.get() + 1);
            self.inner.locate_input(usage, usage_index)
        }
    }

    /// Looks at the cache it is being resolved into while answering queries.
    struct ReentrantProgram {
        inner: ProgramInputs,
        cache: Arc<BindingCache>,
        seen_entries: Cell<Option<usize>>,
    }

    impl ShaderProgram for ReentrantProgram {
        fn id(&self) -> ProgramId {
            self.inner.id()
        }
        fn locate_input(&self, usage: VertexUsage, usage_index: u8) -> Option<u32> {
            self.seen_entries.set(Some(self.cache.len()));
            self.inner.locate_input(usage, usage_index)
        }
    }

    fn caps() -> DeviceCaps {
        DeviceCaps {
            supports_instancing: true,
            max_vertex_attributes: 8,
        }
    }

    fn layout() -> VertexLayout {
        let mut layout = VertexLayout::new();
        layout.add_field(VertexUsage::Position, 0, VertexFormat::Vector3);
        layout
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn second_lookup_is_a_hit() {
        let layout = layout();
        let program = CountingProgram {
            inner: ProgramInputs::new().with_input(VertexUsage::Position, 0, 0),
            queries: Cell::new(0),
        };
        let first = layout.get_or_resolve(&program, &caps()).unwrap();
        let queries = program.queries.get();
        let second = layout.get_or_resolve(&program, &caps()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(program.queries.get(), queries);
        assert_eq!(layout.binding_cache().len(), 1);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn programs_are_cached_separately() {
        let layout = layout();
        let a = ProgramInputs::new().with_input(VertexUsage::Position, 0, 0);
        let b = ProgramInputs::new().with_input(VertexUsage::Position, 0, 3);
        let ra = layout.get_or_resolve(&a, &caps()).unwrap();
        let rb = layout.get_or_resolve(&b, &caps()).unwrap();
        assert_eq!(ra.assignments()[0].slot, 0);
        assert_eq!(rb.assignments()[0].slot, 3);
        assert_eq!(layout.binding_cache().len(), 2);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn invalidate_forces_a_fresh_resolve() {
        let layout = layout();
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 0);
        let first = layout.get_or_resolve(&program, &caps()).unwrap();
        assert!(layout.binding_cache().invalidate(program.id()));
        assert!(!layout.binding_cache().invalidate(program.id()));
        assert!(layout.binding_cache().get(program.id()).is_none());
        let second = layout.get_or_resolve(&program, &caps()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failed_resolves_are_not_cached() {
        let layout = layout();
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 8);
        assert!(layout.get_or_resolve(&program, &caps()).is_err());
        assert!(layout.binding_cache().is_empty());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn entry_for_other_slot_count_is_resolved_again() {
        let layout = layout();
        let program = ProgramInputs::new().with_input(VertexUsage::Position, 0, 6);
        let wide = DeviceCaps {
            supports_instancing: true,
            max_vertex_attributes: 16,
        };
        let first = layout.get_or_resolve(&program, &wide).unwrap();
        assert_eq!(first.mask().len(), 16);

        let narrow = layout.get_or_resolve(&program, &caps()).unwrap();
        assert_eq!(narrow.mask().len(), 8);
        assert!(Arc::ptr_eq(
            &narrow,
            &layout.binding_cache().get(program.id()).unwrap()
        ));

        let tiny = DeviceCaps {
            supports_instancing: true,
            max_vertex_attributes: 4,
        };
        assert!(matches!(
            layout.get_or_resolve(&program, &tiny),
            Err(ResolveError::SlotOutOfRange { slot: Some(6), max: 4, .. })
        ));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn program_may_read_the_cache_while_resolving() {
        let layout = layout();
        let program = ReentrantProgram {
            inner: ProgramInputs::new().with_input(VertexUsage::Position, 0, 0),
            cache: layout.binding_cache().clone(),
            seen_entries: Cell::new(None),
        };
        layout.get_or_resolve(&program, &caps()).unwrap();
        assert_eq!(program.seen_entries.get(), Some(0));
        assert_eq!(layout.binding_cache().len(), 1);
    }
}
