//! fafreplay: a parser for Forged Alliance Forever replay bodies.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the fafreplay sub-crates. For most users, adding `fafreplay` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fafreplay::prelude::*;
//!
//! // SetCommandSource(3), Advance(20), then a VerifyChecksum for tick 20.
//! let mut body = vec![1, 4, 0, 3, 0, 7, 0, 20, 0, 0, 0];
//! body.extend_from_slice(&[3, 23, 0]);
//! body.extend_from_slice(&[0xAB; 16]);
//! body.extend_from_slice(&20u32.to_le_bytes());
//!
//! let config = BodyConfig {
//!     selected: [CommandType::VerifyChecksum].into_iter().collect(),
//!     ..Default::default()
//! };
//! let mut replay = ReplayBody::new(&body, config);
//! let checks: Vec<_> = replay
//!     .by_ref()
//!     .filter_map(|event| event.unwrap().command)
//!     .collect();
//!
//! assert_eq!(checks.len(), 1);
//! assert_eq!(replay.end(), Some(BodyEnd::Exhausted));
//! assert_eq!(replay.state().tick(), Tick(20));
//! assert_eq!(replay.state().command_source(), CommandSource::Player(PlayerId(3)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`format`] | `fafreplay-core` | Frames, command types, payload decoders, Lua values, IDs |
//! | [`body`] | `fafreplay-body` | Body engine, configuration, and session bookkeeping |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Wire format: framing, decoding, and core types (`fafreplay-core`).
///
/// Use [`format::next_frame`] and [`format::decode_frame`] directly to
/// walk a body without any bookkeeping.
pub use fafreplay_core as format;

/// Replay-body engine (`fafreplay-body`).
///
/// [`body::ReplayBody`] drives a pass over a body buffer and keeps
/// [`body::SessionState`] up to date.
pub use fafreplay_body as body;

/// Common imports for typical fafreplay usage.
///
/// ```rust
/// use fafreplay::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use fafreplay_core::{
        Command, CommandSource, CommandType, CommandTypeSet, LuaValue, PlayerId, Tick,
    };

    // Errors
    pub use fafreplay_core::ParseError;

    // Engine
    pub use fafreplay_body::{
        BodyConfig, BodyEnd, BodyEvent, ChatMessage, ReplayBody, SessionState, Step,
    };
}
