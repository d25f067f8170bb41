//! Consistent Overhead Byte Stuffing with a leading delimiter.
//!
//! Stuffing removes every `0x00` from a packet so that `0x00` can mark
//! message boundaries. Each group starts with a code byte `k + 1` followed
//! by `k` non-zero literals; the group implies a zero after it unless its
//! code is `0xFF` (254 literals, no implied zero). The final implied zero
//! is a stuffing artefact and is dropped by readers that know the packet
//! length.
//!
//! On the wire every message is `0x00` followed by the stuffed bytes.

use crate::packet::MAX_PACKET_SIZE;

/// Message delimiter
pub const DELIMITER: u8 = 0x00;

/// Group code for a full group of 254 literals with no implied zero
pub const MAX_GROUP_CODE: u8 = 0xFF;

/// Worst-case stuffed size of `raw_len` bytes (no delimiter)
pub const fn max_encoded_len(raw_len: usize) -> usize {
    raw_len + raw_len / 254 + 1
}

/// Worst-case wire size of one packet, leading delimiter included
pub const MAX_ENCODED_SIZE: usize = 1 + max_encoded_len(MAX_PACKET_SIZE);

/// Errors from the one-shot codec functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Output buffer too small
    BufferTooSmall,
    /// A `0x00` appeared inside stuffed data
    UnexpectedDelimiter,
    /// A group code promised more literals than were present
    Truncated,
}

/// Stuff `raw` into `out` without a delimiter
///
/// Returns the number of bytes written
pub fn encode(raw: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    if out.is_empty() {
        return Err(CodecError::BufferTooSmall);
    }

    let mut code_at = 0;
    let mut write = 1;
    let mut code: u8 = 1;

    for &byte in raw {
        if byte == 0 {
            out[code_at] = code;
            code = 1;
            code_at = write;
            write += 1;
            if code_at >= out.len() {
                return Err(CodecError::BufferTooSmall);
            }
            continue;
        }

        if write >= out.len() {
            return Err(CodecError::BufferTooSmall);
        }
        out[write] = byte;
        write += 1;
        code += 1;

        if code == MAX_GROUP_CODE {
            out[code_at] = code;
            code = 1;
            code_at = write;
            write += 1;
            if code_at >= out.len() {
                return Err(CodecError::BufferTooSmall);
            }
        }
    }

    out[code_at] = code;
    Ok(write)
}

/// Write a complete wire message: delimiter followed by stuffed `raw`
///
/// Returns the number of bytes written
pub fn encode_message(raw: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    let (first, rest) = out.split_first_mut().ok_or(CodecError::BufferTooSmall)?;
    *first = DELIMITER;
    Ok(1 + encode(raw, rest)?)
}

/// Unstuff one complete message body (no delimiter) into `out`
///
/// The trailing implied zero of the final group is not emitted.
/// Returns the number of bytes written
pub fn decode(encoded: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    let mut read = 0;
    let mut write = 0;

    while read < encoded.len() {
        let code = encoded[read];
        if code == DELIMITER {
            return Err(CodecError::UnexpectedDelimiter);
        }
        read += 1;

        let literals = code as usize - 1;
        let group = encoded
            .get(read..read + literals)
            .ok_or(CodecError::Truncated)?;
        if group.contains(&DELIMITER) {
            return Err(CodecError::UnexpectedDelimiter);
        }
        out.get_mut(write..write + literals)
            .ok_or(CodecError::BufferTooSmall)?
            .copy_from_slice(group);
        read += literals;
        write += literals;

        if code != MAX_GROUP_CODE && read < encoded.len() {
            *out.get_mut(write).ok_or(CodecError::BufferTooSmall)? = 0;
            write += 1;
        }
    }

    Ok(write)
}
