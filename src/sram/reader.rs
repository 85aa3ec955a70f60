//! The TX sequencer, which streams queued frames out of their slots to the PHY.

use super::ready_queue::{FrameDescriptor, ReadySlotQueue};
use super::slot_pool::{Owner, SlotPool};
use super::stream::{last_word_mask, StreamWord, WORD_SIZE};
use super::PhyTx;
use crate::debug_util;
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// Waiting for a command to show up in the queue.
    Idle,
    /// Deciding whether the next word is the frame's last one, or whether the frame is done.
    Checking { command: FrameDescriptor },
    /// Offering a word to the PHY until it accepts it.
    Sending { command: FrameDescriptor },
    /// Retiring the command and releasing its slot.
    Finishing { command: FrameDescriptor },
}

/// Drains the frames queued in a [ReadySlotQueue] out of their slots, one word per step.
pub struct ReadSequencer<const SLOTS: usize> {
    state: ReaderState,
    /// Offset of the word being sent, in bytes.
    byte_count: usize,
    /// Whether the word being sent is the first of the frame.
    first: bool,
    /// Whether the word being sent is the last of the frame. Computed in [ReaderState::Checking],
    /// ahead of the word being offered.
    last: bool,
    /// Whether the PHY has accepted the frame's last word.
    last_sent: bool,
}

impl<const SLOTS: usize> ReadSequencer<SLOTS> {
    pub const fn new() -> ReadSequencer<SLOTS> {
        ReadSequencer {
            state: ReaderState::Idle,
            byte_count: 0,
            first: true,
            last: false,
            last_sent: false,
        }
    }

    /// Whether the sequencer is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == ReaderState::Idle
    }

    /// Advances the sequencer by one step.
    ///
    /// Returns `true` only in the step in which a frame finished sending, after its command was
    /// removed from `queue` and its slot was released.
    ///
    /// While the PHY doesn't accept the offered word the sequencer makes no progress, and the same
    /// word is offered again in the next step.
    pub fn step<const DEPTH: usize, P: PhyTx>(
        &mut self,
        pool: &mut SlotPool<SLOTS, DEPTH>,
        queue: &mut ReadySlotQueue<SLOTS>,
        phy: &mut P,
    ) -> bool {
        match self.state {
            ReaderState::Idle => {
                if let Some(command) = queue.peek() {
                    pool.transition(command.slot, Owner::ClaimedByReader);
                    self.byte_count = 0;
                    self.first = true;
                    self.last_sent = false;
                    trace!(
                        "TX starting {} byte frame from slot {}",
                        command.length,
                        command.slot
                    );
                    self.state = ReaderState::Checking { command };
                }
                false
            }
            ReaderState::Checking { command } => {
                self.state = if self.last_sent {
                    ReaderState::Finishing { command }
                } else {
                    self.last = self.byte_count + WORD_SIZE >= command.length;
                    ReaderState::Sending { command }
                };
                false
            }
            ReaderState::Sending { command } => {
                let word = StreamWord {
                    data: pool.read_word(command.slot, self.byte_count / WORD_SIZE),
                    sop: self.first,
                    eop: self.last,
                    error: 0,
                    last_be: if self.last {
                        last_word_mask(command.length)
                    } else {
                        0
                    },
                };
                if phy.offer(word) {
                    trace!("TX {}", debug_util::FormatStreamWord(&word));
                    self.first = false;
                    if self.last {
                        self.last_sent = true;
                    } else {
                        self.byte_count += WORD_SIZE;
                    }
                    self.state = ReaderState::Checking { command };
                }
                false
            }
            ReaderState::Finishing { command } => {
                let retired = queue.pop();
                assert_eq!(retired, Some(command), "TX queue head changed while sending");
                pool.transition(command.slot, Owner::Free);
                debug!(
                    ">>> TX sent {} byte frame from slot {}",
                    command.length, command.slot
                );
                self.state = ReaderState::Idle;
                true
            }
        }
    }
}

impl<const SLOTS: usize> Default for ReadSequencer<SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}
