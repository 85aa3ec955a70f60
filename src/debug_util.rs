//! Contains debug utilities that may be useful for users of this crate.

use crate::sram::{StreamWord, WORD_SIZE};

/// The number of bytes printed per row by [log_data_hex].
const ROW_LEN: usize = 16;

/// A wrapper struct whose [core::fmt::Display] implementation prints the provided data in rows of
/// 16 bytes each, with the bytes of each row grouped per word.
struct FormatDataInWordRows<'a> {
    data: &'a [u8],
}
impl<'a> core::fmt::Display for FormatDataInWordRows<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (row_idx, row_values) in self.data.chunks(ROW_LEN).enumerate() {
            if row_idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{:04x}:", row_idx * ROW_LEN)?;
            for word in row_values.chunks(WORD_SIZE) {
                write!(f, " ")?;
                for byte in word {
                    write!(f, "{byte:02x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Logs the given data buffer in a human-readable format, with each byte printed in its hexadecimal
/// representation and the bytes grouped by the word they'd be stored in within a slot.
pub fn log_data_hex(log_level: log::Level, data: &[u8]) {
    log::log!(
        log_level,
        "Length: {} bytes\n{}",
        data.len(),
        FormatDataInWordRows { data }
    );
}

/// Formats a [StreamWord] with its side-band signals, e.g. `01020304 sop last_be:0000 error:0000`.
pub struct FormatStreamWord<'a>(pub &'a StreamWord);
impl<'a> core::fmt::Display for FormatStreamWord<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let word = self.0;
        write!(f, "{:08x}", word.data)?;
        if word.sop {
            write!(f, " sop")?;
        }
        if word.eop {
            write!(f, " eop")?;
        }
        write!(f, " last_be:{:04b} error:{:04b}", word.last_be, word.error)
    }
}
