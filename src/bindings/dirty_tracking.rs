// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
This module implements the "dirty" signal between the binder and the draw path.

The binder marks binding state dirty after it replaces the enabled slots. The draw-issuing path
holds a receiver and re-validates its device state before the next draw whenever the signal is
set. Each side may freely flip the flag; the receiver can be created after the sender.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
struct Shared {
    dirty: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct DirtySender {
    shared: Arc<Shared>,
}

impl DirtySender {
    pub fn new(dirty: bool) -> Self {
        DirtySender {
            shared: Arc::new(Shared {
                dirty: AtomicBool::new(dirty),
            }),
        }
    }
    pub fn mark_dirty(&self, dirty: bool) {
        self.shared.dirty.store(dirty, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct DirtyReceiver {
    shared: Arc<Shared>,
}

impl DirtyReceiver {
    pub fn new(sender: &DirtySender) -> DirtyReceiver {
        DirtyReceiver {
            shared: sender.shared.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    /// Reads the flag and clears it.
    pub fn take_dirty(&self) -> bool {
        self.shared.dirty.swap(false, Ordering::AcqRel)
    }
}

impl PartialEq for DirtyReceiver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}
impl Eq for DirtyReceiver {}
