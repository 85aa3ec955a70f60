//! A multi-slot SRAM frame buffer for an Ethernet MAC, decoupling the word stream produced and
//! consumed by a PHY from the discrete frames handled by software.
//!
//! Received words are accumulated into one of a fixed number of RX slots and published to software
//! as `(slot, length)` descriptors, while frames written into TX slots by software are streamed out
//! to the PHY word by word. See the [sram] module for the details.
#![cfg_attr(not(test), no_std)]

pub mod debug_util;
pub mod sram;
