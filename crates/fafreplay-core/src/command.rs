//! Command types and decoded command payloads.

use std::fmt;

use smallvec::SmallVec;

use crate::id::PlayerId;
use crate::lua::LuaValue;

/// The command type carried in a frame's first byte.
///
/// Every identifier the replay format defines has a variant, so matching
/// on a `CommandType` is exhaustive over the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CommandType {
    /// Moves simulation time forward.
    Advance = 0,
    /// Attributes subsequent commands to a player.
    SetCommandSource = 1,
    /// The current command source left the game.
    CommandSourceTerminated = 2,
    /// Reports a simulation checksum for a tick.
    VerifyChecksum = 3,
    /// Pause request.
    RequestPause = 4,
    /// Resume after pause.
    Resume = 5,
    /// Single-step while paused.
    SingleStep = 6,
    /// Cheat/debug unit creation.
    CreateUnit = 7,
    /// Cheat/debug prop creation.
    CreateProp = 8,
    /// Removes an entity.
    DestroyEntity = 9,
    /// Teleports an entity.
    WarpEntity = 10,
    /// Sets a named key/value on an entity.
    ProcessInfoPair = 11,
    /// Issues an order to a unit selection.
    IssueCommand = 12,
    /// Issues a build order to a factory selection.
    IssueFactoryCommand = 13,
    /// Increases a queued order's count.
    IncreaseCommandCount = 14,
    /// Decreases a queued order's count.
    DecreaseCommandCount = 15,
    /// Retargets a queued order.
    SetCommandTarget = 16,
    /// Changes a queued order's type.
    SetCommandType = 17,
    /// Updates a queued order's cells.
    SetCommandCells = 18,
    /// Removes an order from a unit's queue.
    RemoveCommandFromQueue = 19,
    /// Console debug command.
    DebugCommand = 20,
    /// Runs a Lua snippet in the sim.
    ExecuteLuaInSim = 21,
    /// Invokes a named sim callback with Lua arguments.
    LuaSimCallback = 22,
    /// End of game.
    EndGame = 23,
}

impl CommandType {
    /// Every command type, in identifier order.
    pub const ALL: [CommandType; 24] = [
        Self::Advance,
        Self::SetCommandSource,
        Self::CommandSourceTerminated,
        Self::VerifyChecksum,
        Self::RequestPause,
        Self::Resume,
        Self::SingleStep,
        Self::CreateUnit,
        Self::CreateProp,
        Self::DestroyEntity,
        Self::WarpEntity,
        Self::ProcessInfoPair,
        Self::IssueCommand,
        Self::IssueFactoryCommand,
        Self::IncreaseCommandCount,
        Self::DecreaseCommandCount,
        Self::SetCommandTarget,
        Self::SetCommandType,
        Self::SetCommandCells,
        Self::RemoveCommandFromQueue,
        Self::DebugCommand,
        Self::ExecuteLuaInSim,
        Self::LuaSimCallback,
        Self::EndGame,
    ];

    /// Resolve a type byte, or `None` if it names no command.
    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }

    /// The wire identifier.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The command's protocol name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Advance => "Advance",
            Self::SetCommandSource => "SetCommandSource",
            Self::CommandSourceTerminated => "CommandSourceTerminated",
            Self::VerifyChecksum => "VerifyChecksum",
            Self::RequestPause => "RequestPause",
            Self::Resume => "Resume",
            Self::SingleStep => "SingleStep",
            Self::CreateUnit => "CreateUnit",
            Self::CreateProp => "CreateProp",
            Self::DestroyEntity => "DestroyEntity",
            Self::WarpEntity => "WarpEntity",
            Self::ProcessInfoPair => "ProcessInfoPair",
            Self::IssueCommand => "IssueCommand",
            Self::IssueFactoryCommand => "IssueFactoryCommand",
            Self::IncreaseCommandCount => "IncreaseCommandCount",
            Self::DecreaseCommandCount => "DecreaseCommandCount",
            Self::SetCommandTarget => "SetCommandTarget",
            Self::SetCommandType => "SetCommandType",
            Self::SetCommandCells => "SetCommandCells",
            Self::RemoveCommandFromQueue => "RemoveCommandFromQueue",
            Self::DebugCommand => "DebugCommand",
            Self::ExecuteLuaInSim => "ExecuteLuaInSim",
            Self::LuaSimCallback => "LuaSimCallback",
            Self::EndGame => "EndGame",
        }
    }

    /// Whether session bookkeeping reads this command.
    ///
    /// These types are decoded on every pass, whatever the selection.
    pub fn is_bookkeeping(self) -> bool {
        matches!(
            self,
            Self::Advance
                | Self::SetCommandSource
                | Self::CommandSourceTerminated
                | Self::VerifyChecksum
                | Self::LuaSimCallback
        )
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`CommandType`]s, stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CommandTypeSet(u32);

impl CommandTypeSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a type.
    pub fn insert(&mut self, ty: CommandType) {
        self.0 |= 1 << ty.id();
    }

    /// Whether `ty` is in the set.
    pub fn contains(&self, ty: CommandType) -> bool {
        self.0 & (1 << ty.id()) != 0
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = CommandType> + '_ {
        CommandType::ALL.into_iter().filter(|ty| self.contains(*ty))
    }
}

impl FromIterator<CommandType> for CommandTypeSet {
    fn from_iter<I: IntoIterator<Item = CommandType>>(iter: I) -> Self {
        let mut set = Self::empty();
        for ty in iter {
            set.insert(ty);
        }
        set
    }
}

/// Entity ids of a unit selection.
///
/// Most selections are small; up to 8 ids stay inline.
pub type EntityIds = SmallVec<[u32; 8]>;

/// A world-space position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    /// East-west.
    pub x: f32,
    /// Height.
    pub y: f32,
    /// North-south.
    pub z: f32,
}

/// The 16-byte simulation checksum reported by `VerifyChecksum`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Checksum(pub [u8; 16]);

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// What an order is aimed at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Target {
    /// No target.
    None,
    /// An entity.
    Entity {
        /// The targeted entity.
        entity_id: u32,
    },
    /// A ground position.
    Position(Vector3),
}

/// Formation placement attached to an order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Formation {
    /// Formation identifier.
    pub id: i32,
    /// Orientation quaternion.
    pub orientation: [f32; 4],
    /// Formation scale.
    pub scale: f32,
}

/// The order carried by `IssueCommand` and `IssueFactoryCommand`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitCommand {
    /// Identifier later commands use to refer to this order.
    pub command_id: u32,
    /// Engine order type (move, attack, build, ...).
    pub command_type: u8,
    /// What the order is aimed at.
    pub target: Target,
    /// Formation placement, if the order uses one.
    pub formation: Option<Formation>,
    /// Blueprint to build, empty when the order builds nothing.
    pub blueprint: String,
    /// Order cells, `nil` when absent.
    pub cells: LuaValue,
}

/// A decoded command payload, one variant per [`CommandType`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Move simulation time forward by `delta` ticks.
    Advance {
        /// Ticks to advance.
        delta: u32,
    },
    /// Attribute subsequent commands to `player_id`.
    SetCommandSource {
        /// The new command source.
        player_id: PlayerId,
    },
    /// The current command source left.
    CommandSourceTerminated,
    /// A checksum report.
    VerifyChecksum {
        /// The reported checksum.
        checksum: Checksum,
        /// The tick the checksum was computed for.
        tick: u32,
    },
    /// Pause request.
    RequestPause,
    /// Resume.
    Resume,
    /// Single step.
    SingleStep,
    /// Create a unit.
    CreateUnit {
        /// Owning army.
        army: u8,
        /// Unit blueprint id.
        blueprint: String,
        /// X position.
        x: f32,
        /// Z position.
        z: f32,
        /// Facing.
        heading: f32,
    },
    /// Create a prop.
    CreateProp {
        /// Prop blueprint id.
        blueprint: String,
        /// Placement.
        position: Vector3,
    },
    /// Destroy an entity.
    DestroyEntity {
        /// The entity.
        entity_id: u32,
    },
    /// Teleport an entity.
    WarpEntity {
        /// The entity.
        entity_id: u32,
        /// Destination.
        position: Vector3,
    },
    /// Set a key/value pair on an entity.
    ProcessInfoPair {
        /// The entity.
        entity_id: u32,
        /// Key.
        name: String,
        /// Value.
        value: String,
    },
    /// Order a unit selection.
    IssueCommand {
        /// The ordered units.
        units: EntityIds,
        /// The order.
        command: UnitCommand,
    },
    /// Order a factory selection.
    IssueFactoryCommand {
        /// The ordered factories.
        units: EntityIds,
        /// The order.
        command: UnitCommand,
    },
    /// Raise a queued order's count.
    IncreaseCommandCount {
        /// The order.
        command_id: u32,
        /// Amount.
        delta: i32,
    },
    /// Lower a queued order's count.
    DecreaseCommandCount {
        /// The order.
        command_id: u32,
        /// Amount.
        delta: i32,
    },
    /// Retarget a queued order.
    SetCommandTarget {
        /// The order.
        command_id: u32,
        /// New target.
        target: Target,
    },
    /// Change a queued order's type.
    SetCommandType {
        /// The order.
        command_id: u32,
        /// New order type.
        command_type: u32,
    },
    /// Replace a queued order's cells.
    SetCommandCells {
        /// The order.
        command_id: u32,
        /// New cells.
        cells: LuaValue,
        /// Anchor position.
        position: Vector3,
    },
    /// Drop an order from a unit's queue.
    RemoveCommandFromQueue {
        /// The order.
        command_id: u32,
        /// The unit.
        unit_id: u32,
    },
    /// Console debug command.
    DebugCommand {
        /// Command text.
        command: String,
        /// Cursor position.
        position: Vector3,
        /// Army in focus.
        focus_army: u8,
        /// Selected units.
        units: EntityIds,
    },
    /// Run Lua in the sim.
    ExecuteLuaInSim {
        /// Lua source.
        code: String,
    },
    /// Invoke a sim callback.
    LuaSimCallback {
        /// Callback function name.
        lua_name: String,
        /// Callback argument.
        lua: LuaValue,
        /// Units selected when the callback fired.
        units: EntityIds,
    },
    /// End of game.
    EndGame,
}

impl Command {
    /// The type this payload belongs to.
    pub fn command_type(&self) -> CommandType {
        match self {
            Self::Advance { .. } => CommandType::Advance,
            Self::SetCommandSource { .. } => CommandType::SetCommandSource,
            Self::CommandSourceTerminated => CommandType::CommandSourceTerminated,
            Self::VerifyChecksum { .. } => CommandType::VerifyChecksum,
            Self::RequestPause => CommandType::RequestPause,
            Self::Resume => CommandType::Resume,
            Self::SingleStep => CommandType::SingleStep,
            Self::CreateUnit { .. } => CommandType::CreateUnit,
            Self::CreateProp { .. } => CommandType::CreateProp,
            Self::DestroyEntity { .. } => CommandType::DestroyEntity,
            Self::WarpEntity { .. } => CommandType::WarpEntity,
            Self::ProcessInfoPair { .. } => CommandType::ProcessInfoPair,
            Self::IssueCommand { .. } => CommandType::IssueCommand,
            Self::IssueFactoryCommand { .. } => CommandType::IssueFactoryCommand,
            Self::IncreaseCommandCount { .. } => CommandType::IncreaseCommandCount,
            Self::DecreaseCommandCount { .. } => CommandType::DecreaseCommandCount,
            Self::SetCommandTarget { .. } => CommandType::SetCommandTarget,
            Self::SetCommandType { .. } => CommandType::SetCommandType,
            Self::SetCommandCells { .. } => CommandType::SetCommandCells,
            Self::RemoveCommandFromQueue { .. } => CommandType::RemoveCommandFromQueue,
            Self::DebugCommand { .. } => CommandType::DebugCommand,
            Self::ExecuteLuaInSim { .. } => CommandType::ExecuteLuaInSim,
            Self::LuaSimCallback { .. } => CommandType::LuaSimCallback,
            Self::EndGame => CommandType::EndGame,
        }
    }
}
