//! An implementation of smoltcp's `Device` trait, built on top of the [super::Sram] register
//! surface.
//!
//! Frames are copied between the slots and buffers owned by the device, so that the critical
//! sections guarding the shared [SharedSram] stay short.

use super::{SharedSram, Sram, WORD_SIZE};
use log::{debug, error, warn};

pub struct SramDevice<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> {
    sram: &'a SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>,
    rx_buffer: [[u8; WORD_SIZE]; DEPTH],
    tx_buffer: [[u8; WORD_SIZE]; DEPTH],
}

impl<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize>
    SramDevice<'a, RX_SLOTS, TX_SLOTS, DEPTH>
{
    pub fn new(
        sram: &'a SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>,
    ) -> SramDevice<'a, RX_SLOTS, TX_SLOTS, DEPTH> {
        SramDevice {
            sram,
            rx_buffer: [[0; WORD_SIZE]; DEPTH],
            tx_buffer: [[0; WORD_SIZE]; DEPTH],
        }
    }
}

impl<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> smoltcp::phy::Device
    for SramDevice<'a, RX_SLOTS, TX_SLOTS, DEPTH>
{
    type RxToken<'b> = SramRxToken<'b, RX_SLOTS, TX_SLOTS, DEPTH> where Self: 'b;
    type TxToken<'b> = SramTxToken<'b, RX_SLOTS, TX_SLOTS, DEPTH> where Self: 'b;

    fn receive(
        &mut self,
        _timestamp: smoltcp::time::Instant,
    ) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        // Frames are only handed to smoltcp if a reply can be sent right away, so that a full TX
        // side holds back RX processing instead of losing the reply.
        if !self
            .sram
            .with(|sram| sram.rx_ready().is_some() && sram.tx_can_send())
        {
            return None;
        }
        Some((
            SramRxToken {
                sram: self.sram,
                buffer: &mut self.rx_buffer,
            },
            SramTxToken {
                sram: self.sram,
                buffer: &mut self.tx_buffer,
            },
        ))
    }

    fn transmit(&mut self, _timestamp: smoltcp::time::Instant) -> Option<Self::TxToken<'_>> {
        if !self.sram.with(|sram| sram.tx_can_send()) {
            return None;
        }
        Some(SramTxToken {
            sram: self.sram,
            buffer: &mut self.tx_buffer,
        })
    }

    fn capabilities(&self) -> smoltcp::phy::DeviceCapabilities {
        let mut caps = smoltcp::phy::DeviceCapabilities::default();
        caps.medium = smoltcp::phy::Medium::Ethernet;
        caps.max_transmission_unit = Sram::<RX_SLOTS, TX_SLOTS, DEPTH>::CAPACITY;
        caps.max_burst_size = None;
        caps
    }
}

pub struct SramRxToken<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> {
    sram: &'a SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>,
    buffer: &'a mut [[u8; WORD_SIZE]; DEPTH],
}

impl<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> smoltcp::phy::RxToken
    for SramRxToken<'a, RX_SLOTS, TX_SLOTS, DEPTH>
{
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let buffer = self.buffer.as_flattened_mut();
        // Copy the oldest frame out and acknowledge it right away, which frees its slot for the
        // next incoming frame.
        let length = self.sram.with(|sram| {
            let (descriptor, data) = sram.rx_read()?;
            buffer[..descriptor.length].copy_from_slice(data);
            sram.rx_ack().ok().map(|descriptor| descriptor.length)
        });
        let Some(length) = length else {
            warn!("SmolTcp RX consume called, but the frame was already acknowledged");
            return f(&mut buffer[..0]);
        };
        debug!("SmolTcp RX consume called for {length} byte frame");
        f(&mut buffer[..length])
    }
}

pub struct SramTxToken<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> {
    sram: &'a SharedSram<RX_SLOTS, TX_SLOTS, DEPTH>,
    buffer: &'a mut [[u8; WORD_SIZE]; DEPTH],
}

impl<'a, const RX_SLOTS: usize, const TX_SLOTS: usize, const DEPTH: usize> smoltcp::phy::TxToken
    for SramTxToken<'a, RX_SLOTS, TX_SLOTS, DEPTH>
{
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let capacity = Sram::<RX_SLOTS, TX_SLOTS, DEPTH>::CAPACITY;
        let buffer = self.buffer.as_flattened_mut();
        if len > capacity {
            // Only happens if smoltcp exceeds the MTU we advertise.
            error!(
                "SmolTcp TX dropping {len} byte frame, which exceeds the MTU of {capacity} bytes"
            );
            return f(buffer);
        }
        let buffer = &mut buffer[..len];
        let result = f(&mut *buffer);
        match self.sram.with(|sram| sram.tx_send(buffer)) {
            Ok(descriptor) => debug!(
                "SmolTcp TX consume called, queued {len} byte frame in slot {}",
                descriptor.slot
            ),
            // Tokens are only handed out while a TX slot is available, and only the device submits
            // frames while it holds a token.
            Err(err) => panic!("SmolTcp TX slot was taken while holding a token: {err:?}"),
        }
        result
    }
}
