//! A fixed pool of equally sized frame buffers ("slots"), plus their ownership bookkeeping.

use super::stream::WORD_SIZE;
use byteorder::{ByteOrder, NetworkEndian};

/// Identifies which party may currently access a slot's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Holds no frame, and may be claimed by a writer.
    Free,
    /// A frame is being written into the slot.
    ClaimedByWriter,
    /// Holds a complete frame, waiting in a queue to be drained.
    Queued,
    /// The slot's frame is being read out.
    ClaimedByReader,
}

impl Owner {
    /// Whether a slot may move from this state to `to`.
    fn can_transition_to(self, to: Owner) -> bool {
        matches!(
            (self, to),
            (Owner::Free, Owner::ClaimedByWriter)
                | (Owner::ClaimedByWriter, Owner::Free)
                | (Owner::ClaimedByWriter, Owner::Queued)
                | (Owner::Queued, Owner::ClaimedByReader)
                | (Owner::ClaimedByReader, Owner::Free)
        )
    }
}

/// A single slot holding up to `DEPTH` words of frame data.
struct Slot<const DEPTH: usize> {
    data: [[u8; WORD_SIZE]; DEPTH],
    owner: Owner,
    /// The length of the held frame in bytes. Only meaningful while [Owner::Queued] or
    /// [Owner::ClaimedByReader].
    length: usize,
}

impl<const DEPTH: usize> Slot<DEPTH> {
    const EMPTY: Slot<DEPTH> = Slot {
        data: [[0; WORD_SIZE]; DEPTH],
        owner: Owner::Free,
        length: 0,
    };
}

/// A pool of `SLOTS` slots of `DEPTH` words each.
///
/// The pool performs no access control of its own: the sequencers and the register surface only
/// touch a slot's memory while they own it. Ownership changes do go through
/// [SlotPool::transition], which panics on any transition other than `Free -> ClaimedByWriter ->
/// {Free, Queued}` and `Queued -> ClaimedByReader -> Free`.
pub struct SlotPool<const SLOTS: usize, const DEPTH: usize> {
    slots: [Slot<DEPTH>; SLOTS],
}

impl<const SLOTS: usize, const DEPTH: usize> SlotPool<SLOTS, DEPTH> {
    /// The capacity of a single slot, in bytes.
    pub const CAPACITY: usize = DEPTH * WORD_SIZE;

    /// Constructs a new pool in which all slots are [Owner::Free].
    pub const fn new() -> SlotPool<SLOTS, DEPTH> {
        SlotPool {
            slots: [Slot::<DEPTH>::EMPTY; SLOTS],
        }
    }

    /// The number of slots in the pool.
    pub const fn slot_count(&self) -> usize {
        SLOTS
    }

    pub fn owner(&self, slot: usize) -> Owner {
        self.slots[slot].owner
    }

    /// Returns the length of the frame held by the slot, or `None` if it doesn't hold a complete
    /// frame.
    pub fn length(&self, slot: usize) -> Option<usize> {
        let slot = &self.slots[slot];
        match slot.owner {
            Owner::Queued | Owner::ClaimedByReader => Some(slot.length),
            Owner::Free | Owner::ClaimedByWriter => None,
        }
    }

    /// Moves the slot to a new owner. Panics if the transition isn't allowed.
    pub fn transition(&mut self, slot: usize, to: Owner) {
        let from = self.slots[slot].owner;
        assert!(
            from.can_transition_to(to),
            "Illegal ownership transition for slot {slot}: {from:?} -> {to:?}"
        );
        self.slots[slot].owner = to;
    }

    /// Records the length of the frame just written into a [Owner::ClaimedByWriter] slot.
    pub fn set_length(&mut self, slot: usize, length: usize) {
        assert_eq!(self.slots[slot].owner, Owner::ClaimedByWriter);
        assert!(length > 0 && length <= Self::CAPACITY);
        self.slots[slot].length = length;
    }

    /// Reads the word at `offset` (in words) from the slot.
    pub fn read_word(&self, slot: usize, offset: usize) -> u32 {
        NetworkEndian::read_u32(&self.slots[slot].data[offset])
    }

    /// Writes a word at `offset` (in words) into the slot.
    pub fn write_word(&mut self, slot: usize, offset: usize, word: u32) {
        NetworkEndian::write_u32(&mut self.slots[slot].data[offset], word);
    }

    /// Returns the slot's whole buffer as bytes, in frame order.
    pub fn bytes(&self, slot: usize) -> &[u8] {
        self.slots[slot].data.as_flattened()
    }

    /// Returns the slot's whole buffer as mutable bytes, in frame order.
    pub fn bytes_mut(&mut self, slot: usize) -> &mut [u8] {
        self.slots[slot].data.as_flattened_mut()
    }
}

impl<const SLOTS: usize, const DEPTH: usize> Default for SlotPool<SLOTS, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}
