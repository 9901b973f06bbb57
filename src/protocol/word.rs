//! Word codec
//!
//! Every unit on the wire is a "word": a variable-length length header
//! followed by that many bytes of UTF-8.
//!
//! ## Length Header
//! ```text
//! first byte   header bytes   length
//! 0xxxxxxx     1              c
//! 10xxxxxx     2              (c & 0x3F) << 8  | b1
//! 110xxxxx     3              (c & 0x1F) << 16 | b1 b2
//! 1110xxxx     4              (c & 0x0F) << 24 | b1 b2 b3
//! 11110xxx     5              b1 b2 b3 b4 (big-endian u32)
//! ```
//!
//! A zero length is the empty word, which terminates a sentence.

use std::io::{self, ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, RosError};

/// Largest length representable by the 5-byte header
pub const MAX_WORD_LEN: usize = u32::MAX as usize;

/// Number of header bytes used for a payload of `len` bytes
pub fn header_len(len: u32) -> usize {
    match len {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Append the length header for `len` to `buf`
pub fn encode_length(len: u32, buf: &mut BytesMut) {
    match header_len(len) {
        1 => buf.put_u8(len as u8),
        2 => buf.put_u16(len as u16 | 0x8000),
        3 => {
            let tagged = len | 0x00C0_0000;
            buf.put_u8((tagged >> 16) as u8);
            buf.put_u16(tagged as u16);
        }
        4 => buf.put_u32(len | 0xE000_0000),
        _ => {
            // Control byte, then the plain length
            buf.put_u8(0xF0);
            buf.put_u32(len);
        }
    }
}

/// Read one length header from a stream
pub fn read_length<R: Read>(reader: &mut R) -> Result<u32> {
    let mut first = [0u8; 1];
    read_full(reader, &mut first)?;
    let c = first[0];

    let (extra, initial) = if c & 0x80 == 0x00 {
        (0, c as u32)
    } else if c & 0xC0 == 0x80 {
        (1, (c & 0x3F) as u32)
    } else if c & 0xE0 == 0xC0 {
        (2, (c & 0x1F) as u32)
    } else if c & 0xF0 == 0xE0 {
        (3, (c & 0x0F) as u32)
    } else if c & 0xF8 == 0xF0 {
        (4, 0)
    } else {
        return Err(RosError::Stream(format!(
            "Reserved control byte in length header: 0x{:02x}",
            c
        )));
    };

    let mut rest = [0u8; 4];
    read_full(reader, &mut rest[..extra])?;

    Ok(rest[..extra]
        .iter()
        .fold(initial, |acc, &b| (acc << 8) | b as u32))
}

/// Append one framed word to `buf`
pub fn encode_word(word: &str, buf: &mut BytesMut) -> Result<()> {
    let bytes = word.as_bytes();
    if bytes.len() > MAX_WORD_LEN {
        return Err(RosError::Io(io::Error::new(
            ErrorKind::InvalidInput,
            format!("word too large: {} bytes (max {})", bytes.len(), MAX_WORD_LEN),
        )));
    }

    let len = bytes.len() as u32;
    buf.reserve(header_len(len) + bytes.len());
    encode_length(len, buf);
    buf.put_slice(bytes);
    Ok(())
}

/// Write one framed word to a stream
pub fn write_word<W: Write>(writer: &mut W, word: &str) -> Result<()> {
    let mut buf = BytesMut::new();
    encode_word(word, &mut buf)?;
    writer.write_all(&buf)?;
    Ok(())
}

/// Read one word from a stream
///
/// Blocks until the whole word has arrived. A short read (peer closed,
/// read timeout) is a `Stream` error and is never mistaken for the empty
/// end-of-sentence word.
pub fn read_word<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_length(reader)?;
    if len == 0 {
        return Ok(String::new());
    }

    // Grow with the data instead of trusting the header for the allocation
    let mut payload = Vec::new();
    Read::take(&mut *reader, len as u64)
        .read_to_end(&mut payload)
        .map_err(stream_error)?;

    if payload.len() < len as usize {
        return Err(RosError::Stream(format!(
            "Connection closed mid-word: got {} of {} bytes",
            payload.len(),
            len
        )));
    }

    String::from_utf8(payload)
        .map_err(|e| RosError::Stream(format!("Word is not valid UTF-8: {}", e)))
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(stream_error)
}

fn stream_error(e: io::Error) -> RosError {
    match e.kind() {
        ErrorKind::UnexpectedEof => {
            RosError::Stream("Connection closed while reading word".to_string())
        }
        // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
        ErrorKind::WouldBlock | ErrorKind::TimedOut => {
            RosError::Stream(format!("Timed out waiting for data: {}", e))
        }
        _ => RosError::Stream(e.to_string()),
    }
}
