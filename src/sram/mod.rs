//! Implements a multi-slot SRAM frame buffer that sits between a PHY's word streams and software.
//!
//! The buffer consists of two structurally identical halves running in opposite directions:
//! - RX: the [WriteSequencer] accumulates the PHY's ingress words into one of `RX_SLOTS` slots, and
//!   publishes each complete frame as a [FrameDescriptor] to software through a [ReadySlotQueue].
//! - TX: software writes frames into one of `TX_SLOTS` slots and submits their descriptors to
//!   another [ReadySlotQueue], from which the [ReadSequencer] streams them out to the PHY.
//!
//! Each slot is owned by exactly one party at a time (see [Owner]), and slots only change hands
//! through the queues. Incoming frames that start while all RX slots are occupied are dropped whole,
//! while outgoing frames are held back for as long as the PHY applies back-pressure.
//!
//! Both halves report completions through a [SharedIrq]: an RX "available" event that stays pending
//! for as long as received frames are queued, and a TX "done" event that is latched once per sent
//! frame.

mod event;
mod reader;
mod ready_queue;
mod slot_pool;
pub mod smoltcp;
mod stream;
mod writer;

pub use event::{Events, LevelEvent, PulseEvent, SharedIrq};
pub use reader::ReadSequencer;
pub use ready_queue::{FrameDescriptor, ReadySlotQueue};
pub use slot_pool::{Owner, SlotPool};
pub use stream::{
    last_word_mask, mask_to_valid_bytes, valid_bytes_to_mask, FrameWords, StreamWord, WORD_SIZE,
};
pub use writer::WriteSequencer;

use core::cell::RefCell;
use critical_section::Mutex;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A slot id beyond the end of the pool was given.
    InvalidSlotError,
    /// A frame length of zero, or one exceeding the slot capacity, was given.
    InvalidLengthError,
    /// The slot isn't in a state that allows the requested operation (e.g. it is still queued for
    /// sending).
    SlotBusyError,
    /// A different TX slot is already being written to by software.
    WriterBusyError,
    /// The TX command queue can't take another frame.
    TxQueueFullError,
    /// No received frame is waiting to be consumed.
    NoFrameReadyError,
}
pub type Result<T> = core::result::Result<T, Error>;

/// A trait that the PHY layer should implement to accept the words of outgoing frames.
pub trait PhyTx {
    /// Offers a word to the PHY, which returns whether it accepted it. A word that isn't accepted is
    /// offered again in the next step.
    fn offer(&mut self, word: StreamWord) -> bool;
}

/// The combined RX/TX frame buffer, with `RX_SLOTS` receive slots, `TX_SLOTS` transmit slots, and
/// slots of `DEPTH` words each.
///
/// The PHY side drives the buffer through [Sram::sink_step] and [Sram::source_step], once per
/// step. The remaining methods make up the register surface used by software.
pub struct Sram<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> {
    rx_pool: SlotPool<RX_SLOTS, DEPTH>,
    rx_queue: ReadySlotQueue<RX_SLOTS>,
    writer: WriteSequencer<RX_SLOTS>,
    tx_pool: SlotPool<TX_SLOTS, DEPTH>,
    tx_queue: ReadySlotQueue<TX_SLOTS>,
    reader: ReadSequencer<TX_SLOTS>,
    /// The TX slot that [Sram::tx_send] will use next.
    tx_slot_cursor: usize,
    irq: SharedIrq,
}

impl<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize>
    Sram<RX_SLOTS, TX_SLOTS, DEPTH>
{
    /// The capacity of a single slot, in bytes. This is the largest frame the buffer can hold.
    pub const CAPACITY: usize = SlotPool::<RX_SLOTS, DEPTH>::CAPACITY;

    /// Constructs a new instance with all slots free and all events disabled.
    pub const fn new() -> Sram<RX_SLOTS, TX_SLOTS, DEPTH> {
        Sram {
            rx_pool: SlotPool::new(),
            rx_queue: ReadySlotQueue::new(),
            writer: WriteSequencer::new(),
            tx_pool: SlotPool::new(),
            tx_queue: ReadySlotQueue::new(),
            reader: ReadSequencer::new(),
            tx_slot_cursor: 0,
            irq: SharedIrq::new(),
        }
    }

    /// Advances the RX half by one step, consuming the word the PHY presents in this step (if any).
    pub fn sink_step(&mut self, word: Option<StreamWord>) {
        self.writer.step(word, &mut self.rx_pool, &mut self.rx_queue);
        self.update_rx_level();
    }

    /// Feeds all words of a received frame to the RX half, followed by an idle step so that the
    /// frame is published (unless it gets dropped).
    pub fn sink_frame(&mut self, frame: &[u8]) {
        for word in StreamWord::frame_words(frame) {
            self.sink_step(Some(word));
        }
        self.sink_step(None);
    }

    /// Advances the TX half by one step, offering the next word of the frame being sent to `phy`.
    ///
    /// Returns `true` in the step in which a frame finished sending (i.e. when the "done" event
    /// pulses).
    pub fn source_step<P: PhyTx>(&mut self, phy: &mut P) -> bool {
        let done = self.reader.step(&mut self.tx_pool, &mut self.tx_queue, phy);
        self.irq.done.step(done);
        done
    }

    /// Returns the descriptor of the oldest received frame, if any.
    pub fn rx_ready(&self) -> Option<FrameDescriptor> {
        self.rx_queue.peek()
    }

    /// Returns the oldest received frame along with its data. The frame stays queued until it is
    /// acknowledged with [Sram::rx_ack].
    pub fn rx_read(&mut self) -> Option<(FrameDescriptor, &mut [u8])> {
        let descriptor = self.rx_queue.peek()?;
        if self.rx_pool.owner(descriptor.slot) == Owner::Queued {
            self.rx_pool.transition(descriptor.slot, Owner::ClaimedByReader);
        }
        let data = &mut self.rx_pool.bytes_mut(descriptor.slot)[..descriptor.length];
        Some((descriptor, data))
    }

    /// Acknowledges the oldest received frame, releasing its slot for new frames.
    pub fn rx_ack(&mut self) -> Result<FrameDescriptor> {
        let descriptor = self.rx_queue.pop().ok_or(Error::NoFrameReadyError)?;
        if self.rx_pool.owner(descriptor.slot) == Owner::Queued {
            self.rx_pool.transition(descriptor.slot, Owner::ClaimedByReader);
        }
        self.rx_pool.transition(descriptor.slot, Owner::Free);
        self.update_rx_level();
        Ok(descriptor)
    }

    /// Whether the TX command queue has room for another frame.
    pub fn tx_ready(&self) -> bool {
        self.tx_queue.has_room()
    }

    /// Whether [Sram::tx_send] would currently succeed for a frame of valid length.
    pub fn tx_can_send(&self) -> bool {
        self.tx_queue.has_room()
            && (0..TX_SLOTS).all(|slot| match self.tx_pool.owner(slot) {
                Owner::Free => true,
                Owner::ClaimedByWriter => false,
                Owner::Queued | Owner::ClaimedByReader => slot != self.tx_slot_cursor,
            })
    }

    pub fn tx_slot_owner(&self, slot: usize) -> Result<Owner> {
        Self::check_tx_slot(slot)?;
        Ok(self.tx_pool.owner(slot))
    }

    /// Claims a free TX slot for writing a frame into it, and returns its buffer. Calling this again
    /// for an already claimed slot returns the same buffer.
    ///
    /// Only one TX slot can be claimed at a time.
    pub fn tx_slot_mut(&mut self, slot: usize) -> Result<&mut [u8]> {
        Self::check_tx_slot(slot)?;
        match self.tx_pool.owner(slot) {
            Owner::ClaimedByWriter => {}
            Owner::Free => {
                if (0..TX_SLOTS).any(|other| self.tx_pool.owner(other) == Owner::ClaimedByWriter) {
                    return Err(Error::WriterBusyError);
                }
                self.tx_pool.transition(slot, Owner::ClaimedByWriter);
            }
            Owner::Queued | Owner::ClaimedByReader => return Err(Error::SlotBusyError),
        }
        Ok(self.tx_pool.bytes_mut(slot))
    }

    /// Releases a claimed TX slot without sending its contents.
    pub fn tx_abandon(&mut self, slot: usize) -> Result<()> {
        Self::check_tx_slot(slot)?;
        if self.tx_pool.owner(slot) != Owner::ClaimedByWriter {
            return Err(Error::SlotBusyError);
        }
        self.tx_pool.transition(slot, Owner::Free);
        Ok(())
    }

    /// Submits the first `length` bytes of a claimed TX slot for sending.
    pub fn tx_submit(&mut self, slot: usize, length: usize) -> Result<()> {
        Self::check_tx_slot(slot)?;
        Self::check_length(length)?;
        if self.tx_pool.owner(slot) != Owner::ClaimedByWriter {
            return Err(Error::SlotBusyError);
        }
        if !self.tx_queue.has_room() {
            return Err(Error::TxQueueFullError);
        }
        self.tx_pool.set_length(slot, length);
        self.tx_pool.transition(slot, Owner::Queued);
        if self.tx_queue.push(FrameDescriptor { slot, length }).is_err() {
            panic!("TX queue overflowed after checking for room");
        }
        debug!("TX queued {length} byte frame in slot {slot}");
        Ok(())
    }

    /// Sends a frame of `length` bytes produced by `f`, using the TX slots in round-robin order.
    ///
    /// Returns [Error::SlotBusyError] without calling `f` if the next slot is still in use, including
    /// when software claimed it through [Sram::tx_slot_mut].
    pub fn tx_send_with<F, R>(&mut self, length: usize, f: F) -> Result<R>
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        Self::check_length(length)?;
        let slot = self.tx_slot_cursor;
        if self.tx_pool.owner(slot) != Owner::Free {
            return Err(Error::SlotBusyError);
        }
        let result = f(&mut self.tx_slot_mut(slot)?[..length]);
        self.tx_submit(slot, length)?;
        self.tx_slot_cursor = (slot + 1) % TX_SLOTS;
        Ok(result)
    }

    /// Sends a copy of the given frame. See [Sram::tx_send_with].
    pub fn tx_send(&mut self, frame: &[u8]) -> Result<FrameDescriptor> {
        let slot = self.tx_slot_cursor;
        self.tx_send_with(frame.len(), |buffer| buffer.copy_from_slice(frame))?;
        Ok(FrameDescriptor {
            slot,
            length: frame.len(),
        })
    }

    /// Returns the current state of each event source.
    pub fn ev_status(&self) -> Events {
        self.irq.status()
    }

    /// Returns which events are pending.
    pub fn ev_pending(&self) -> Events {
        self.irq.pending()
    }

    pub fn ev_enabled(&self) -> Events {
        self.irq.enabled()
    }

    /// Selects which pending events assert the interrupt line.
    pub fn set_ev_enabled(&mut self, enabled: Events) {
        self.irq.set_enabled(enabled);
    }

    /// Clears the given pending TX "done" events. The RX "available" event can only be cleared by
    /// acknowledging all received frames.
    pub fn ev_clear_pending(&mut self, events: Events) {
        self.irq.clear_pending(events);
    }

    /// Whether the shared interrupt line is asserted.
    pub fn irq(&self) -> bool {
        self.irq.irq()
    }

    fn update_rx_level(&mut self) {
        self.irq.available.step(!self.rx_queue.is_empty());
    }

    fn check_tx_slot(slot: usize) -> Result<()> {
        if slot >= TX_SLOTS {
            return Err(Error::InvalidSlotError);
        }
        Ok(())
    }

    fn check_length(length: usize) -> Result<()> {
        if length == 0 || length > Self::CAPACITY {
            return Err(Error::InvalidLengthError);
        }
        Ok(())
    }
}

impl<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> Default
    for Sram<RX_SLOTS, TX_SLOTS, DEPTH>
{
    fn default() -> Self {
        Self::new()
    }
}

/// An [Sram] that can be shared between code running in interrupt handlers (e.g. the PHY stepping
/// the sequencers) and the main thread of execution (e.g. software consuming frames).
///
/// To use this you generally will define a static singleton of this type.
pub struct SharedSram<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> {
    sram: Mutex<RefCell<Sram<RX_SLOTS, TX_SLOTS, DEPTH>>>,
}

impl<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize>
    SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>
{
    pub const fn new() -> SharedSram<RX_SLOTS, TX_SLOTS, DEPTH> {
        SharedSram {
            sram: Mutex::new(RefCell::new(Sram::new())),
        }
    }

    /// Obtains exclusive access to the [Sram] and invokes the given callback with it, within a
    /// critical section.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Sram<RX_SLOTS, TX_SLOTS, DEPTH>) -> R,
    {
        critical_section::with(|cs| f(&mut self.sram.borrow_ref_mut(cs)))
    }
}

impl<const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> Default
    for SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>
{
    fn default() -> Self {
        Self::new()
    }
}

/// A [PhyTx] that records the words it accepts and reassembles them into frames.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingPhy {
    /// All accepted words.
    pub words: Vec<StreamWord>,
    /// The frames reassembled from the accepted words.
    pub frames: Vec<Vec<u8>>,
    /// Rejects every offer while set.
    pub stalled: bool,
    /// Only accepts every n-th offer, if larger than 1.
    pub accept_every: usize,
    offers: usize,
    current: Vec<u8>,
}

#[cfg(test)]
impl PhyTx for RecordingPhy {
    fn offer(&mut self, word: StreamWord) -> bool {
        if self.stalled {
            return false;
        }
        self.offers += 1;
        if self.accept_every > 1 && self.offers % self.accept_every != 0 {
            return false;
        }
        self.words.push(word);
        if word.sop {
            self.current.clear();
        }
        let valid = if word.eop {
            word.valid_bytes()
        } else {
            WORD_SIZE
        };
        self.current.extend_from_slice(&word.bytes()[..valid]);
        if word.eop {
            self.frames.push(core::mem::take(&mut self.current));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 RX and 2 TX slots of 2048 bytes each.
    type TestSram = Sram<2, 2, 512>;

    fn frame(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| seed ^ (i as u8)).collect()
    }

    fn drain_tx(sram: &mut TestSram, phy: &mut RecordingPhy, steps: usize) -> usize {
        (0..steps).filter(|_| sram.source_step(&mut *phy)).count()
    }

    #[test]
    fn two_slot_scenario() {
        let mut sram = TestSram::new();
        assert_eq!(TestSram::CAPACITY, 2048);
        let frame_a = frame(64, 0xA0);
        let frame_b = frame(128, 0xB0);
        let frame_c = frame(96, 0xC0);

        sram.sink_frame(&frame_a);
        assert_eq!(sram.rx_ready(), Some(FrameDescriptor { slot: 0, length: 64 }));
        sram.sink_frame(&frame_b);
        // Both slots are occupied, so frame C gets dropped.
        sram.sink_frame(&frame_c);
        assert_eq!(
            sram.rx_queue.iter().copied().collect::<Vec<_>>(),
            [
                FrameDescriptor { slot: 0, length: 64 },
                FrameDescriptor { slot: 1, length: 128 }
            ]
        );

        // Drain the head through a read sequencer. The PHY stalls once frame A is through, so the
        // sequencer gets stuck on frame B and the completion pulse must fire exactly once.
        let mut reader = ReadSequencer::<2>::new();
        let mut phy = RecordingPhy::default();
        let mut done = PulseEvent::new();
        let mut pulses = 0;
        for _ in 0..100 {
            done.step(reader.step(&mut sram.rx_pool, &mut sram.rx_queue, &mut phy));
            if done.status() {
                pulses += 1;
            }
            phy.stalled = !phy.frames.is_empty();
        }
        assert_eq!(pulses, 1);
        assert!(done.pending());
        assert_eq!(phy.frames, [frame_a]);
        assert_eq!(sram.rx_pool.owner(0), Owner::Free);
        assert_eq!(sram.rx_pool.owner(1), Owner::ClaimedByReader);
        assert_eq!(sram.rx_ready(), Some(FrameDescriptor { slot: 1, length: 128 }));
        assert!(sram.ev_status().available);
    }

    #[test]
    fn rx_read_and_ack() {
        let mut sram = TestSram::new();
        assert_eq!(sram.rx_read(), None);
        assert_eq!(sram.rx_ack(), Err(Error::NoFrameReadyError));

        let data = frame(61, 0x11);
        sram.sink_frame(&data);
        let (descriptor, frame_data) = sram.rx_read().unwrap();
        assert_eq!(descriptor, FrameDescriptor { slot: 0, length: 61 });
        assert_eq!(frame_data, &data[..]);
        assert_eq!(sram.rx_pool.owner(0), Owner::ClaimedByReader);

        assert_eq!(sram.rx_ack(), Ok(descriptor));
        assert_eq!(sram.rx_pool.owner(0), Owner::Free);
        assert_eq!(sram.rx_ready(), None);
    }

    #[test]
    fn rx_ack_without_read() {
        let mut sram = TestSram::new();
        sram.sink_frame(&frame(8, 0));
        sram.sink_frame(&frame(9, 0));
        assert_eq!(sram.rx_ack().map(|d| d.length), Ok(8));
        assert_eq!(sram.rx_pool.owner(0), Owner::Free);
        assert_eq!(sram.rx_ready(), Some(FrameDescriptor { slot: 1, length: 9 }));
    }

    #[test]
    fn rx_frames_arrive_in_order_across_slot_reuse() {
        let mut sram = TestSram::new();
        let frames: Vec<Vec<u8>> = (0..7).map(|i| frame(40 + i * 13, i as u8)).collect();
        let mut received = Vec::new();
        for data in &frames {
            sram.sink_frame(data);
            // Consume a frame whenever the queue fills up.
            if sram.rx_queue.len() == 2 {
                let (_, frame_data) = sram.rx_read().unwrap();
                received.push(frame_data.to_vec());
                sram.rx_ack().unwrap();
            }
        }
        while let Some((_, frame_data)) = sram.rx_read() {
            received.push(frame_data.to_vec());
            sram.rx_ack().unwrap();
        }
        assert_eq!(received, frames);
    }

    #[test]
    fn available_event_follows_rx_queue() {
        let mut sram = TestSram::new();
        sram.set_ev_enabled(Events {
            available: true,
            done: false,
        });
        assert!(!sram.irq());
        sram.sink_frame(&frame(20, 0));
        sram.sink_frame(&frame(20, 1));
        assert!(sram.ev_status().available);
        assert!(sram.irq());
        // Clearing doesn't work for level events.
        sram.ev_clear_pending(Events::ALL);
        assert!(sram.irq());
        sram.rx_ack().unwrap();
        assert!(sram.irq());
        sram.rx_ack().unwrap();
        assert!(!sram.irq());
        assert_eq!(sram.ev_pending(), Events::NONE);
    }

    #[test]
    fn tx_send_and_done_event() {
        let mut sram = TestSram::new();
        sram.set_ev_enabled(Events {
            available: false,
            done: true,
        });
        let data = frame(70, 0x22);
        assert!(sram.tx_ready());
        assert_eq!(
            sram.tx_send(&data),
            Ok(FrameDescriptor { slot: 0, length: 70 })
        );
        assert_eq!(sram.tx_slot_owner(0), Ok(Owner::Queued));
        assert!(!sram.irq());

        let mut phy = RecordingPhy::default();
        let mut status_highs = 0;
        for _ in 0..100 {
            sram.source_step(&mut phy);
            if sram.ev_status().done {
                status_highs += 1;
            }
        }
        assert_eq!(status_highs, 1);
        assert_eq!(phy.frames, [data]);
        assert_eq!(sram.tx_slot_owner(0), Ok(Owner::Free));
        assert!(sram.ev_pending().done);
        assert!(sram.irq());
        sram.ev_clear_pending(Events {
            available: false,
            done: true,
        });
        assert!(!sram.irq());
    }

    #[test]
    fn tx_send_uses_slots_round_robin_and_reports_full() {
        let mut sram = TestSram::new();
        assert_eq!(sram.tx_send(&frame(10, 0)).map(|d| d.slot), Ok(0));
        assert_eq!(sram.tx_send(&frame(11, 0)).map(|d| d.slot), Ok(1));
        assert!(!sram.tx_ready());
        let mut called = false;
        assert_eq!(
            sram.tx_send_with(12, |_| called = true),
            Err(Error::SlotBusyError)
        );
        assert!(!called);

        let mut phy = RecordingPhy::default();
        assert_eq!(drain_tx(&mut sram, &mut phy, 100), 2);
        assert_eq!(sram.tx_send(&frame(12, 0)).map(|d| d.slot), Ok(0));
        assert_eq!(phy.frames.len(), 2);
    }

    #[test]
    fn tx_submit_validation() {
        let mut sram = TestSram::new();
        assert_eq!(sram.tx_slot_mut(2).err(), Some(Error::InvalidSlotError));
        assert_eq!(sram.tx_submit(2, 10), Err(Error::InvalidSlotError));
        // Submitting an unclaimed slot.
        assert_eq!(sram.tx_submit(0, 10), Err(Error::SlotBusyError));

        sram.tx_slot_mut(1).unwrap()[..3].copy_from_slice(&[1, 2, 3]);
        assert_eq!(sram.tx_slot_mut(0).err(), Some(Error::WriterBusyError));
        assert_eq!(sram.tx_submit(1, 0), Err(Error::InvalidLengthError));
        assert_eq!(sram.tx_submit(1, 2049), Err(Error::InvalidLengthError));
        assert_eq!(sram.tx_submit(1, 3), Ok(()));
        // Queued slots can't be written to, or submitted again.
        assert_eq!(sram.tx_slot_mut(1).err(), Some(Error::SlotBusyError));
        assert_eq!(sram.tx_submit(1, 3), Err(Error::SlotBusyError));

        let mut phy = RecordingPhy::default();
        drain_tx(&mut sram, &mut phy, 20);
        assert_eq!(phy.frames, [vec![1, 2, 3]]);
    }

    #[test]
    fn tx_abandon_releases_slot() {
        let mut sram = TestSram::new();
        sram.tx_slot_mut(0).unwrap();
        assert_eq!(sram.tx_abandon(1), Err(Error::SlotBusyError));
        assert_eq!(sram.tx_abandon(0), Ok(()));
        assert_eq!(sram.tx_slot_owner(0), Ok(Owner::Free));
        sram.tx_slot_mut(1).unwrap();
    }

    #[test]
    fn tx_send_leaves_claimed_slot_alone() {
        let mut sram = TestSram::new();
        sram.tx_slot_mut(0).unwrap()[..4].copy_from_slice(&[1, 2, 3, 4]);
        assert!(!sram.tx_can_send());
        let mut called = false;
        assert_eq!(
            sram.tx_send_with(2, |_| called = true),
            Err(Error::SlotBusyError)
        );
        assert!(!called);
        assert_eq!(sram.tx_send(&[9, 9]), Err(Error::SlotBusyError));
        assert_eq!(sram.tx_slot_owner(0), Ok(Owner::ClaimedByWriter));

        assert_eq!(sram.tx_submit(0, 4), Ok(()));
        let mut phy = RecordingPhy::default();
        drain_tx(&mut sram, &mut phy, 50);
        assert_eq!(phy.frames, [vec![1, 2, 3, 4]]);
    }

    #[test]
    fn tx_can_send_requires_no_claimed_slot() {
        let mut sram = TestSram::new();
        assert!(sram.tx_can_send());
        // A claim on a slot other than the next one still blocks sending.
        sram.tx_slot_mut(1).unwrap();
        assert!(!sram.tx_can_send());
        assert_eq!(sram.tx_send(&[1]), Err(Error::WriterBusyError));
        sram.tx_abandon(1).unwrap();
        assert!(sram.tx_can_send());
    }

    #[test]
    fn rx_drops_frames_while_head_is_being_read() {
        let mut sram = TestSram::new();
        let frame_a = frame(40, 0x01);
        sram.sink_frame(&frame_a);
        let (descriptor, _) = sram.rx_read().unwrap();
        assert_eq!(sram.rx_pool.owner(descriptor.slot), Owner::ClaimedByReader);

        sram.sink_frame(&frame(44, 0x02));
        // Slot 0 is still claimed by the reader and slot 1 is queued, so these get dropped.
        sram.sink_frame(&frame(48, 0x03));
        sram.sink_frame(&frame(52, 0x04));
        assert_eq!(sram.rx_queue.len(), 2);
        assert_eq!(sram.rx_pool.owner(0), Owner::ClaimedByReader);
        assert_eq!(sram.rx_pool.owner(1), Owner::Queued);
        assert_eq!(&sram.rx_pool.bytes(0)[..40], &frame_a[..]);

        let (_, data) = sram.rx_read().unwrap();
        assert_eq!(data, &frame_a[..]);
        sram.rx_ack().unwrap();
        assert_eq!(sram.rx_ready(), Some(FrameDescriptor { slot: 1, length: 44 }));
    }

    #[test]
    fn tx_length_mask_round_trip() {
        for (length, mask) in [(64, 0b0001), (65, 0b1000), (66, 0b0100), (67, 0b0010)] {
            let mut sram = TestSram::new();
            let data = frame(length, 0x33);
            sram.tx_send(&data).unwrap();
            let mut phy = RecordingPhy::default();
            drain_tx(&mut sram, &mut phy, 100);
            assert_eq!(phy.words.last().unwrap().last_be, mask, "length {length}");
            assert_eq!(phy.frames, [data]);
        }
    }

    #[test]
    fn loopback_from_tx_to_rx() {
        let mut sram = TestSram::new();
        let data = frame(93, 0x44);
        sram.tx_send(&data).unwrap();
        let mut phy = RecordingPhy::default();
        drain_tx(&mut sram, &mut phy, 100);
        for word in phy.words {
            sram.sink_step(Some(word));
        }
        sram.sink_step(None);
        let (descriptor, received) = sram.rx_read().unwrap();
        assert_eq!(descriptor.length, 93);
        assert_eq!(received, &data[..]);
    }

    #[test]
    fn shared_sram() {
        static SRAM: SharedSram<2, 2, 16> = SharedSram::new();
        SRAM.with(|sram| sram.sink_frame(&[1, 2, 3, 4, 5]));
        let length = SRAM.with(|sram| sram.rx_ready().map(|d| d.length));
        assert_eq!(length, Some(5));
    }
}
