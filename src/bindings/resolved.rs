// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The cached product of resolving a layout against a program.

use std::fmt;

use crate::bittricks;
use crate::program::ProgramId;
use crate::vertex::ComponentType;

/// A fixed-size set of hardware attribute slots.
///
/// The size is the device's maximum attribute-slot count and never changes after construction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SlotMask {
    len: usize,
    words: Box<[u64]>,
}

impl SlotMask {
    /// A mask of `len` slots, all off.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; bittricks::words_for(len)].into_boxed_slice(),
        }
    }

    /// Number of slots the mask covers (set or not).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Panics
    ///
    /// Panics if `slot` is not below [`len`](Self::len).
    pub fn set(&mut self, slot: u32) {
        let slot = slot as usize;
        assert!(
            slot < self.len,
            "slot {slot} outside mask of {} slots",
            self.len
        );
        let (word, bit) = bittricks::word_and_bit(slot);
        self.words[word] |= bit;
    }

    pub fn contains(&self, slot: u32) -> bool {
        let slot = slot as usize;
        if slot >= self.len {
            return false;
        }
        let (word, bit) = bittricks::word_and_bit(slot);
        self.words[word] & bit != 0
    }

    /// Number of slots that are on.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// The slots that are on, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        bittricks::set_bits(&self.words).map(|s| s as u32)
    }
}

impl fmt::Debug for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotMask[{}]", self.len)?;
        f.debug_set().entries(self.iter()).finish()
    }
}

/// How one field of the layout is read from one hardware slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAssignment {
    pub slot: u32,
    pub component_count: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Byte offset of the field within the vertex record.
    pub offset: usize,
}

/// Slot assignments for one (layout, program) pair.
///
/// Assignments keep layout field order. Fields the program does not consume have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    program: ProgramId,
    stride: usize,
    assignments: Vec<SlotAssignment>,
    mask: SlotMask,
}

impl ResolvedBinding {
    pub(crate) fn new(
        program: ProgramId,
        stride: usize,
        assignments: Vec<SlotAssignment>,
        mask: SlotMask,
    ) -> Self {
        Self {
            program,
            stride,
            assignments,
            mask,
        }
    }

    /// The program this binding was resolved for.
    pub fn program(&self) -> ProgramId {
        self.program
    }
    /// Stride of the layout this binding was resolved from.
    pub fn stride(&self) -> usize {
        self.stride
    }
    pub fn assignments(&self) -> &[SlotAssignment] {
        &self.assignments
    }
    /// Every slot referenced by an assignment.
    pub fn mask(&self) -> &SlotMask {
        &self.mask
    }
}
