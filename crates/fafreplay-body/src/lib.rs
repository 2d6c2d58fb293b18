//! Replay-body engine for FAF replays.
//!
//! Drives the frame parser over a decompressed body buffer, keeps the
//! session bookkeeping consistent across the whole command stream, and
//! yields one event per frame.
//!
//! # Architecture
//!
//! - [`BodyConfig`] selects which commands are surfaced decoded, whether
//!   a desync ends the pass, and whether per-tick command groups are kept
//! - [`SessionState`] owns the bookkeeping: tick, command source,
//!   last tick per player, checksum observations, desyncs, chat messages
//! - [`ReplayBody`] is the pull-based driver; it implements [`Iterator`]
//!   and also exposes a [`step`](ReplayBody::step) method whose
//!   [`Step::End`] value says why the pass ended
//!
//! # Example
//!
//! ```
//! use fafreplay_body::{BodyConfig, BodyEnd, ReplayBody};
//! use fafreplay_core::Tick;
//!
//! // SetCommandSource(0), Advance(5), CommandSourceTerminated.
//! let body = [1, 4, 0, 0, 0, 7, 0, 5, 0, 0, 0, 2, 3, 0];
//! let (state, end) = ReplayBody::new(&body, BodyConfig::default()).run().unwrap();
//!
//! assert_eq!(end, BodyEnd::Exhausted);
//! assert_eq!(state.tick(), Tick(5));
//! assert_eq!(state.last_tick_by_player().values().next(), Some(&Tick(5)));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod config;
pub mod state;

pub use body::{BodyEnd, BodyEvent, ReplayBody, Step};
pub use config::BodyConfig;
pub use state::{
    BodyEntry, ChatMessage, ChecksumObservation, SessionState, TickCommands, TickGroup,
    RESOURCE_RELAY_CALLBACK,
};
