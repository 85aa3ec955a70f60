//! The word format exchanged with the PHY, in both the ingress (RX) and egress (TX) direction.

use bitvec::prelude::*;
use byteorder::{ByteOrder, NetworkEndian};

/// The width of a single stream word, in bytes.
pub const WORD_SIZE: usize = 4;

/// A single data word plus its side-band signals.
///
/// The first byte of a word occupies the most significant byte lane (i.e. the data is in network
/// byte order). Byte lane `i`'s flag in the `error` and `last_be` masks is bit `WORD_SIZE - 1 - i`,
/// so `0b1000` refers to the first byte of the word and `0b0001` to the last.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamWord {
    pub data: u32,
    /// Start of frame.
    pub sop: bool,
    /// End of frame.
    pub eop: bool,
    /// Per-byte-lane error flags. Ignored on egress.
    pub error: u8,
    /// Marks the last valid byte lane of the final word of a frame. Zero on all other words.
    pub last_be: u8,
}

impl StreamWord {
    /// Returns the word's data as bytes, in the order in which they appear in the frame.
    pub fn bytes(&self) -> [u8; WORD_SIZE] {
        let mut bytes = [0; WORD_SIZE];
        NetworkEndian::write_u32(&mut bytes, self.data);
        bytes
    }

    /// Returns how many bytes of this word belong to the frame. Only the final word of a frame can
    /// contribute fewer than [WORD_SIZE] bytes.
    pub fn valid_bytes(&self) -> usize {
        mask_to_valid_bytes(self.last_be)
    }

    /// Whether this word flags the frame as erroneous.
    ///
    /// Only error flags on valid byte lanes of a final word count. Note that this means that error
    /// flags on non-final words (where `last_be` is zero) are ignored.
    pub fn has_error(&self) -> bool {
        self.error & self.last_be != 0
    }

    /// Splits a frame into the sequence of words a PHY would present for it, with the start marker
    /// on the first word and the end marker and last-valid-byte mask on the last word.
    pub fn frame_words(frame: &[u8]) -> FrameWords<'_> {
        FrameWords {
            chunks: frame.chunks(WORD_SIZE),
            first: true,
        }
    }
}

/// An iterator over the [StreamWord]s making up a frame. See [StreamWord::frame_words].
pub struct FrameWords<'a> {
    chunks: core::slice::Chunks<'a, u8>,
    first: bool,
}

impl<'a> Iterator for FrameWords<'a> {
    type Item = StreamWord;

    fn next(&mut self) -> Option<StreamWord> {
        let chunk = self.chunks.next()?;
        let last = self.chunks.len() == 0;
        let mut bytes = [0; WORD_SIZE];
        bytes[..chunk.len()].copy_from_slice(chunk);
        let word = StreamWord {
            data: NetworkEndian::read_u32(&bytes),
            sop: self.first,
            eop: last,
            error: 0,
            last_be: if last { valid_bytes_to_mask(chunk.len()) } else { 0 },
        };
        self.first = false;
        Some(word)
    }
}

/// Decodes a last-valid-byte mask into the number of valid bytes in its word.
///
/// The highest flagged lane wins. A zero mask denotes a full word.
pub fn mask_to_valid_bytes(last_be: u8) -> usize {
    match last_be.view_bits::<Lsb0>()[..WORD_SIZE].last_one() {
        Some(lane_bit) => WORD_SIZE - lane_bit,
        None => WORD_SIZE,
    }
}

/// Encodes the number of valid bytes in a word (1 to [WORD_SIZE]) as a last-valid-byte mask.
pub fn valid_bytes_to_mask(valid_bytes: usize) -> u8 {
    assert!((1..=WORD_SIZE).contains(&valid_bytes));
    let mut mask = 0u8;
    mask.view_bits_mut::<Lsb0>().set(WORD_SIZE - valid_bytes, true);
    mask
}

/// Returns the last-valid-byte mask of the final word of a frame of `length` bytes.
pub fn last_word_mask(length: usize) -> u8 {
    match length % WORD_SIZE {
        0 => valid_bytes_to_mask(WORD_SIZE),
        remainder => valid_bytes_to_mask(remainder),
    }
}
