//! The RX sequencer, which accumulates the PHY's ingress words into slots and publishes complete
//! frames to a [ReadySlotQueue].

use super::ready_queue::{FrameDescriptor, ReadySlotQueue};
use super::slot_pool::{Owner, SlotPool};
use super::stream::{StreamWord, WORD_SIZE};
use crate::debug_util;
use log::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Waiting for the start of a frame.
    Idle,
    /// Writing the words of a frame into `slot`. `truncated` is set once the frame outgrew the slot.
    Accumulating { slot: usize, truncated: bool },
    /// The frame in `slot` was bad and will be dropped in the next step.
    Discarding { slot: usize },
    /// The frame in `slot` is complete and will be queued in the next step.
    Publishing { slot: usize },
}

/// Writes incoming frames into the slots of a [SlotPool], claiming slots in round-robin order.
///
/// A frame is only admitted if the queue has room for its descriptor once it completes. Frames that
/// start while all slots are occupied are dropped whole, as are frames that end with an error flag
/// or don't fit in a slot.
pub struct WriteSequencer<const SLOTS: usize> {
    state: WriterState,
    /// The next slot to claim.
    slot_cursor: usize,
    /// The number of bytes written to the claimed slot so far.
    byte_count: usize,
}

impl<const SLOTS: usize> WriteSequencer<SLOTS> {
    pub const fn new() -> WriteSequencer<SLOTS> {
        WriteSequencer {
            state: WriterState::Idle,
            slot_cursor: 0,
            byte_count: 0,
        }
    }

    /// Whether the sequencer is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == WriterState::Idle
    }

    /// Returns the slot currently being written to, if any.
    pub fn claimed_slot(&self) -> Option<usize> {
        match self.state {
            WriterState::Accumulating { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Advances the sequencer by one step, consuming the word presented by the PHY in this step (if
    /// any).
    ///
    /// A frame's descriptor is pushed onto `queue` in the step after the frame's last word was
    /// received. A word arriving in that same step is handled once the descriptor was pushed, so
    /// back-to-back frames aren't lost.
    pub fn step<const DEPTH: usize>(
        &mut self,
        word: Option<StreamWord>,
        pool: &mut SlotPool<SLOTS, DEPTH>,
        queue: &mut ReadySlotQueue<SLOTS>,
    ) {
        match self.state {
            WriterState::Discarding { slot } => self.discard(slot, pool),
            WriterState::Publishing { slot } => self.publish(slot, pool, queue),
            WriterState::Idle | WriterState::Accumulating { .. } => {}
        }

        let Some(word) = word else {
            return;
        };
        trace!("RX {}", debug_util::FormatStreamWord(&word));

        match self.state {
            WriterState::Accumulating { slot, truncated } => {
                self.accumulate(slot, truncated, &word, pool);
            }
            _ => {
                // Anything other than the start of a new frame is either the tail of a frame we
                // already dropped, or noise.
                if !word.sop {
                    return;
                }
                if !queue.has_room() {
                    debug!("RX dropping frame: all {} slots are occupied", SLOTS);
                    return;
                }
                let slot = self.slot_cursor;
                pool.transition(slot, Owner::ClaimedByWriter);
                self.byte_count = 0;
                self.accumulate(slot, false, &word, pool);
            }
        }
    }

    /// Writes a word of the frame into `slot` and moves on to the next state.
    fn accumulate<const DEPTH: usize>(
        &mut self,
        slot: usize,
        mut truncated: bool,
        word: &StreamWord,
        pool: &mut SlotPool<SLOTS, DEPTH>,
    ) {
        let offset = self.byte_count / WORD_SIZE;
        if offset < DEPTH {
            pool.write_word(slot, offset, word.data);
            // Only the final word of a frame can be partially filled.
            self.byte_count += if word.eop {
                word.valid_bytes()
            } else {
                WORD_SIZE
            };
        } else if !truncated {
            warn!(
                "RX frame in slot {slot} exceeds the slot capacity of {} bytes, it will be dropped",
                SlotPool::<SLOTS, DEPTH>::CAPACITY
            );
            truncated = true;
        }

        self.state = if !word.eop {
            WriterState::Accumulating { slot, truncated }
        } else if truncated || word.has_error() {
            WriterState::Discarding { slot }
        } else {
            WriterState::Publishing { slot }
        };
    }

    /// Drops the frame in `slot`. The slot cursor stays put, so the slot is reused by the next
    /// frame.
    fn discard<const DEPTH: usize>(&mut self, slot: usize, pool: &mut SlotPool<SLOTS, DEPTH>) {
        debug!(
            "RX discarding {} bytes of bad frame data in slot {slot}",
            self.byte_count
        );
        self.byte_count = 0;
        pool.transition(slot, Owner::Free);
        self.state = WriterState::Idle;
    }

    /// Hands the frame in `slot` over to the queue's consumer.
    fn publish<const DEPTH: usize>(
        &mut self,
        slot: usize,
        pool: &mut SlotPool<SLOTS, DEPTH>,
        queue: &mut ReadySlotQueue<SLOTS>,
    ) {
        let length = self.byte_count;
        self.byte_count = 0;
        pool.set_length(slot, length);
        pool.transition(slot, Owner::Queued);
        self.slot_cursor = (self.slot_cursor + 1) % SLOTS;

        // The frame was only admitted because the queue had room, and nothing else pushes onto
        // the RX queue.
        if queue.push(FrameDescriptor { slot, length }).is_err() {
            panic!("RX queue overflowed while publishing slot {slot}");
        }

        debug!("<<< RX frame of {length} bytes queued in slot {slot}");
        if log::log_enabled!(log::Level::Trace) {
            debug_util::log_data_hex(log::Level::Trace, &pool.bytes(slot)[..length]);
        }
        self.state = WriterState::Idle;
    }
}

impl<const SLOTS: usize> Default for WriteSequencer<SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}
