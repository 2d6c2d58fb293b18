//! Command frame parsing.
//!
//! A frame is a type byte, a little-endian u16 total length (header
//! included), and `length - 3` payload bytes. Framing never looks inside
//! the payload; see [`crate::decode`] for that.

use crate::cursor::Cursor;
use crate::error::ParseError;

/// Size of the type + length header that starts every frame.
pub const FRAME_HEADER_LEN: usize = 3;

/// One framed command, borrowed from the body buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame<'a> {
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> RawFrame<'a> {
    /// The type byte.
    pub fn command_type(&self) -> u8 {
        self.bytes[0]
    }

    /// Total frame length as declared in the header.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame carries no payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == FRAME_HEADER_LEN
    }

    /// Absolute offset of the type byte within the body.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Header and payload, exactly as they appear in the body.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload bytes only.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[FRAME_HEADER_LEN..]
    }

    /// A cursor over the payload that reports body-absolute offsets.
    pub fn payload_cursor(&self) -> Cursor<'a> {
        Cursor::with_base(self.payload(), self.offset + FRAME_HEADER_LEN)
    }
}

/// Read one frame from `cursor`.
///
/// The caller treats fewer than [`FRAME_HEADER_LEN`] remaining bytes as the
/// end of the body; if called anyway the short header read fails with
/// [`ParseError::OutOfData`]. A declared length below the header size is
/// [`ParseError::MalformedFrame`], and a payload running past the end of
/// the buffer is [`ParseError::OutOfData`]. On error the cursor is left at
/// the start of the offending frame.
pub fn next_frame<'a>(cursor: &mut Cursor<'a>) -> Result<RawFrame<'a>, ParseError> {
    let offset = cursor.offset();
    let mut probe = cursor.clone();
    probe.read_u8()?;
    let length = probe.read_u16_le()?;

    let total = usize::from(length);
    if total < FRAME_HEADER_LEN {
        return Err(ParseError::MalformedFrame { offset, length });
    }
    if total > cursor.remaining() {
        return Err(ParseError::OutOfData {
            offset: offset + FRAME_HEADER_LEN,
            needed: total - FRAME_HEADER_LEN,
            available: cursor.remaining() - FRAME_HEADER_LEN,
        });
    }

    let bytes = cursor.read(total)?;
    Ok(RawFrame { offset, bytes })
}
