//! Error types for replay body parsing.
//!
//! Every variant is structural: once one is returned the frame boundaries
//! of the remaining buffer can no longer be trusted, so the pass that
//! produced it is over. Desyncs are not errors; they are recorded as data
//! by the body engine.

use crate::command::CommandType;

/// Errors that can occur while framing or decoding a replay body.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A read needed more bytes than the buffer had left.
    #[error("out of data at offset {offset}: needed {needed} bytes, {available} available")]
    OutOfData {
        /// Absolute offset of the failed read.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes that were left.
        available: usize,
    },
    /// A frame declared a total length shorter than its own header.
    #[error("malformed frame at offset {offset}: declared length {length} is below the 3-byte header")]
    MalformedFrame {
        /// Offset of the frame's type byte.
        offset: usize,
        /// The declared total length.
        length: u16,
    },
    /// A frame carried a command type with no registered decoder.
    #[error("unknown command type {command_type} at offset {offset}")]
    UnknownCommandType {
        /// The unrecognized type byte.
        command_type: u8,
        /// Offset of the frame's type byte.
        offset: usize,
    },
    /// A payload was long enough but its contents are invalid.
    #[error("malformed {command} payload: {detail}")]
    MalformedPayload {
        /// The command whose payload failed to decode.
        command: CommandType,
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl ParseError {
    /// Build a [`ParseError::MalformedPayload`] for `command`.
    pub fn malformed(command: CommandType, detail: impl Into<String>) -> Self {
        Self::MalformedPayload {
            command,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = ParseError::OutOfData {
            offset: 10,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "out of data at offset 10: needed 4 bytes, 1 available"
        );

        let err = ParseError::malformed(CommandType::SetCommandTarget, "unknown target kind 9");
        assert_eq!(
            err.to_string(),
            "malformed SetCommandTarget payload: unknown target kind 9"
        );
    }
}
