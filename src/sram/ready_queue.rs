//! A bounded FIFO of frame descriptors.

use heapless::Deque;

/// Identifies a complete frame held in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub slot: usize,
    /// The frame length, in bytes.
    pub length: usize,
}

/// A FIFO of up to `SLOTS` [FrameDescriptor]s, one per slot.
///
/// On the RX side this queue holds received frames waiting for software to consume them, on the TX
/// side it holds frames submitted by software waiting to be sent.
pub struct ReadySlotQueue<const SLOTS: usize> {
    descriptors: Deque<FrameDescriptor, SLOTS>,
}

impl<const SLOTS: usize> ReadySlotQueue<SLOTS> {
    pub const fn new() -> ReadySlotQueue<SLOTS> {
        ReadySlotQueue {
            descriptors: Deque::new(),
        }
    }

    /// Appends a descriptor, handing it back if the queue is full.
    pub fn push(&mut self, descriptor: FrameDescriptor) -> Result<(), FrameDescriptor> {
        self.descriptors.push_back(descriptor)
    }

    /// Removes and returns the oldest descriptor.
    pub fn pop(&mut self) -> Option<FrameDescriptor> {
        self.descriptors.pop_front()
    }

    /// Returns the oldest descriptor without removing it.
    pub fn peek(&self) -> Option<FrameDescriptor> {
        self.descriptors.front().copied()
    }

    /// Whether another descriptor can be pushed.
    pub fn has_room(&self) -> bool {
        !self.descriptors.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Iterates over the queued descriptors, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FrameDescriptor> {
        self.descriptors.iter()
    }
}

impl<const SLOTS: usize> Default for ReadySlotQueue<SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}
