//! Core types and decoders for FAF replay bodies.
//!
//! This is the leaf crate of the workspace. It owns the binary side of a
//! replay body: the bounds-checked [`Cursor`], the command frame parser,
//! the [`CommandType`] table, the decoded [`Command`] variants, the Lua
//! value model carried by script commands, and the payload decoder
//! dispatch. Session bookkeeping lives in `fafreplay-body`.
//!
//! # Format
//!
//! ```text
//! [type u8][length u16 LE][payload: length - 3 bytes]
//! [type u8][length u16 LE][payload: length - 3 bytes]
//! ...
//! ```
//!
//! Frames are packed back-to-back with no padding. `length` counts the
//! 3-byte header, so an empty command has `length == 3`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod frame;
pub mod id;
pub mod lua;

pub use command::{
    Checksum, Command, CommandType, CommandTypeSet, EntityIds, Formation, Target, UnitCommand,
    Vector3,
};
pub use cursor::Cursor;
pub use decode::{decode, decode_frame, decode_payload, resolve_type, DecodeFn};
pub use error::ParseError;
pub use frame::{next_frame, RawFrame, FRAME_HEADER_LEN};
pub use id::{CommandSource, PlayerId, Tick, TICKS_PER_SECOND};
pub use lua::{LuaTable, LuaValue};
