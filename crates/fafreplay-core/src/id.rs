//! Strongly-typed identifiers for replay time and command attribution.

use std::fmt;

/// Simulation ticks per second of game time.
pub const TICKS_PER_SECOND: u64 = 10;

/// Discrete simulation time.
///
/// Starts at zero and only moves forward, by the delta carried in each
/// `Advance` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// The tick `delta` steps after this one, saturating at `u64::MAX`.
    pub fn advanced_by(self, delta: u32) -> Self {
        Self(self.0.saturating_add(u64::from(delta)))
    }

    /// Game time in seconds at [`TICKS_PER_SECOND`].
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Tick {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a player (command source) within a replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for PlayerId {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// The origin attributed to the commands currently being read.
///
/// A replay body names its source with `SetCommandSource`; commands read
/// before the first one are [`Unassigned`](CommandSource::Unassigned).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandSource {
    /// No `SetCommandSource` has been seen yet.
    #[default]
    Unassigned,
    /// Commands are attributed to this player.
    Player(PlayerId),
}

impl CommandSource {
    /// The attributed player, if any.
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Self::Unassigned => None,
            Self::Player(id) => Some(id),
        }
    }
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "unassigned"),
            Self::Player(id) => write!(f, "player {id}"),
        }
    }
}

impl From<PlayerId> for CommandSource {
    fn from(id: PlayerId) -> Self {
        Self::Player(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_and_converts_to_seconds() {
        let t = Tick(0).advanced_by(15);
        assert_eq!(t, Tick(15));
        assert_eq!(t.as_seconds(), 1.5);
        assert_eq!(Tick(u64::MAX).advanced_by(1), Tick(u64::MAX));
    }

    #[test]
    fn command_source_defaults_to_unassigned() {
        assert_eq!(CommandSource::default(), CommandSource::Unassigned);
        assert_eq!(CommandSource::default().player(), None);
        assert_eq!(CommandSource::from(PlayerId(3)).player(), Some(PlayerId(3)));
        assert_eq!(CommandSource::Player(PlayerId(2)).to_string(), "player 2");
    }
}
