//! Session bookkeeping for one pass over a replay body.
//!
//! [`SessionState`] is owned by the engine and changed only through
//! [`apply`](SessionState::apply) and [`record`](SessionState::record).
//! `apply` matches every [`Command`] variant explicitly, so a new
//! command type has to be considered here before the crate compiles.

use indexmap::IndexMap;

use fafreplay_core::{
    Checksum, Command, CommandSource, CommandType, LuaValue, PlayerId, Tick,
};

/// Sim callback whose argument may carry a chat message.
pub const RESOURCE_RELAY_CALLBACK: &str = "GiveResourcesToPlayer";

/// A `(tick, checksum)` pair reported by `VerifyChecksum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecksumObservation {
    /// The tick the checksum was computed for, as reported.
    pub tick: u32,
    /// The reported checksum.
    pub checksum: Checksum,
}

/// A chat message relayed through a resource-transfer callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sending player's name.
    pub sender: String,
    /// Recipient: a player, an army index, or a channel such as `"all"`.
    pub recipient: String,
    /// Message text.
    pub text: String,
}

/// A command kept by body accumulation.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyEntry {
    /// The command was decoded.
    Decoded(Command),
    /// The command was not decoded; holds the raw frame.
    Raw(Vec<u8>),
}

/// Commands of one tick, grouped by source then by command type.
///
/// A later command of the same type from the same source replaces the
/// earlier one.
pub type TickCommands = IndexMap<CommandSource, IndexMap<CommandType, BodyEntry>>;

/// The commands collected during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickGroup {
    /// The tick the commands were issued at.
    pub tick: Tick,
    /// The commands, by source and type.
    pub commands: TickCommands,
}

/// Bookkeeping derived from the command stream.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    tick: Tick,
    source: CommandSource,
    last_tick_by_player: IndexMap<PlayerId, Tick>,
    previous_checksum: Option<ChecksumObservation>,
    desync_ticks: Vec<Tick>,
    messages: IndexMap<Tick, ChatMessage>,
    store_body: bool,
    body: Vec<TickGroup>,
    current: TickCommands,
}

impl SessionState {
    /// Fresh state at tick zero. `store_body` enables body accumulation.
    pub fn new(store_body: bool) -> Self {
        Self {
            store_body,
            ..Self::default()
        }
    }

    /// Current tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Source the next commands are attributed to.
    pub fn command_source(&self) -> CommandSource {
        self.source
    }

    /// Tick at which each player's command source terminated.
    pub fn last_tick_by_player(&self) -> &IndexMap<PlayerId, Tick> {
        &self.last_tick_by_player
    }

    /// The most recent checksum observation.
    pub fn previous_checksum(&self) -> Option<&ChecksumObservation> {
        self.previous_checksum.as_ref()
    }

    /// Ticks at which desyncs were detected, in detection order.
    pub fn desync_ticks(&self) -> &[Tick] {
        &self.desync_ticks
    }

    /// Chat messages by the tick they were sent at.
    pub fn messages(&self) -> &IndexMap<Tick, ChatMessage> {
        &self.messages
    }

    /// Whether body accumulation is enabled.
    pub fn stores_body(&self) -> bool {
        self.store_body
    }

    /// Completed tick groups. Empty unless body accumulation is enabled.
    pub fn body(&self) -> &[TickGroup] {
        &self.body
    }

    /// The group still being collected for the current tick.
    ///
    /// It moves into [`body`](Self::body) at the next `Advance`; a pass
    /// that ends first leaves it here.
    pub fn current_tick_commands(&self) -> &TickCommands {
        &self.current
    }

    /// Update bookkeeping for one decoded command.
    ///
    /// Returns the current tick if the command revealed a desync.
    pub fn apply(&mut self, command: &Command) -> Option<Tick> {
        match command {
            Command::Advance { delta } => self.on_advance(*delta),
            Command::SetCommandSource { player_id } => self.on_set_command_source(*player_id),
            Command::CommandSourceTerminated => self.on_command_source_terminated(),
            Command::VerifyChecksum { checksum, tick } => {
                return self.on_verify_checksum(*checksum, *tick);
            }
            Command::LuaSimCallback { lua_name, lua, .. } => {
                self.on_lua_sim_callback(lua_name, lua)
            }
            Command::RequestPause
            | Command::Resume
            | Command::SingleStep
            | Command::CreateUnit { .. }
            | Command::CreateProp { .. }
            | Command::DestroyEntity { .. }
            | Command::WarpEntity { .. }
            | Command::ProcessInfoPair { .. }
            | Command::IssueCommand { .. }
            | Command::IssueFactoryCommand { .. }
            | Command::IncreaseCommandCount { .. }
            | Command::DecreaseCommandCount { .. }
            | Command::SetCommandTarget { .. }
            | Command::SetCommandType { .. }
            | Command::SetCommandCells { .. }
            | Command::RemoveCommandFromQueue { .. }
            | Command::DebugCommand { .. }
            | Command::ExecuteLuaInSim { .. }
            | Command::EndGame => {}
        }
        None
    }

    /// Keep a command in the current tick group, under the active source.
    ///
    /// No-op unless body accumulation is enabled.
    pub fn record(&mut self, command_type: CommandType, entry: BodyEntry) {
        if !self.store_body {
            return;
        }
        self.current
            .entry(self.source)
            .or_default()
            .insert(command_type, entry);
    }

    fn on_advance(&mut self, delta: u32) {
        if self.store_body && !self.current.is_empty() {
            let commands = std::mem::take(&mut self.current);
            tracing::debug!(tick = %self.tick, sources = commands.len(), "tick group flushed");
            self.body.push(TickGroup {
                tick: self.tick,
                commands,
            });
        }
        self.tick = self.tick.advanced_by(delta);
    }

    fn on_set_command_source(&mut self, player_id: PlayerId) {
        self.source = CommandSource::Player(player_id);
    }

    fn on_command_source_terminated(&mut self) {
        match self.source {
            CommandSource::Player(id) => {
                self.last_tick_by_player.insert(id, self.tick);
            }
            CommandSource::Unassigned => {
                tracing::warn!(tick = %self.tick, "command source terminated before any was set");
            }
        }
    }

    fn on_verify_checksum(&mut self, checksum: Checksum, tick: u32) -> Option<Tick> {
        let desync = matches!(
            self.previous_checksum,
            Some(prev) if prev.tick == tick && prev.checksum != checksum
        );
        self.previous_checksum = Some(ChecksumObservation { tick, checksum });

        if !desync {
            return None;
        }
        tracing::warn!(
            tick = %self.tick,
            reported_tick = tick,
            %checksum,
            "desync detected"
        );
        self.desync_ticks.push(self.tick);
        Some(self.tick)
    }

    fn on_lua_sim_callback(&mut self, lua_name: &str, lua: &LuaValue) {
        if lua_name != RESOURCE_RELAY_CALLBACK {
            return;
        }
        let Some(msg) = lua.get("Msg") else {
            return;
        };

        let sender = lua.get("Sender").and_then(LuaValue::to_text);
        let recipient = msg.get("to").and_then(LuaValue::to_text);
        let text = msg.get("text").and_then(LuaValue::to_text);
        match (sender, recipient, text) {
            (Some(sender), Some(recipient), Some(text)) => {
                self.messages.insert(
                    self.tick,
                    ChatMessage {
                        sender,
                        recipient,
                        text,
                    },
                );
            }
            _ => tracing::warn!(tick = %self.tick, %msg, "malformed chat message skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fafreplay_test_utils::{chat_lua, checksum, lua_table};

    fn verify(fill: u8, tick: u32) -> Command {
        Command::VerifyChecksum {
            checksum: checksum(fill),
            tick,
        }
    }

    fn callback(name: &str, lua: LuaValue) -> Command {
        Command::LuaSimCallback {
            lua_name: name.into(),
            lua,
            units: Default::default(),
        }
    }

    #[test]
    fn advance_accumulates_ticks() {
        let mut s = SessionState::new(false);
        s.apply(&Command::Advance { delta: 3 });
        s.apply(&Command::Advance { delta: 0 });
        s.apply(&Command::Advance { delta: 4 });
        assert_eq!(s.tick(), Tick(7));
    }

    #[test]
    fn terminated_records_the_active_player() {
        let mut s = SessionState::new(false);
        s.apply(&Command::SetCommandSource {
            player_id: PlayerId(2),
        });
        s.apply(&Command::Advance { delta: 10 });
        s.apply(&Command::CommandSourceTerminated);
        assert_eq!(s.last_tick_by_player().get(&PlayerId(2)), Some(&Tick(10)));
    }

    #[test]
    fn terminated_without_source_records_nothing() {
        let mut s = SessionState::new(false);
        s.apply(&Command::CommandSourceTerminated);
        assert!(s.last_tick_by_player().is_empty());
    }

    #[test]
    fn matching_checksums_are_not_a_desync() {
        let mut s = SessionState::new(false);
        assert_eq!(s.apply(&verify(1, 50)), None);
        assert_eq!(s.apply(&verify(1, 50)), None);
        assert!(s.desync_ticks().is_empty());
    }

    #[test]
    fn differing_checksums_for_the_same_tick_desync_at_the_current_tick() {
        let mut s = SessionState::new(false);
        s.apply(&verify(1, 50));
        s.apply(&Command::Advance { delta: 2 });
        assert_eq!(s.apply(&verify(2, 50)), Some(Tick(2)));
        assert_eq!(s.desync_ticks(), &[Tick(2)]);
        assert_eq!(
            s.previous_checksum(),
            Some(&ChecksumObservation {
                tick: 50,
                checksum: checksum(2)
            })
        );
    }

    #[test]
    fn differing_checksums_for_different_ticks_are_not_compared() {
        let mut s = SessionState::new(false);
        s.apply(&verify(1, 50));
        assert_eq!(s.apply(&verify(2, 51)), None);
    }

    #[test]
    fn only_the_immediately_preceding_observation_counts() {
        let mut s = SessionState::new(false);
        s.apply(&verify(1, 50));
        s.apply(&verify(9, 51));
        assert_eq!(s.apply(&verify(2, 50)), None);
    }

    #[test]
    fn relay_callback_with_message_is_recorded() {
        let mut s = SessionState::new(false);
        s.apply(&Command::Advance { delta: 30 });
        s.apply(&callback(RESOURCE_RELAY_CALLBACK, chat_lua("A", "B", "hi")));
        assert_eq!(
            s.messages().get(&Tick(30)),
            Some(&ChatMessage {
                sender: "A".into(),
                recipient: "B".into(),
                text: "hi".into(),
            })
        );
    }

    #[test]
    fn numeric_recipient_renders_as_integer() {
        let lua = lua_table([
            ("Sender", LuaValue::from("A")),
            (
                "Msg",
                lua_table([
                    ("to", LuaValue::Number(3.0)),
                    ("text", LuaValue::from("gg")),
                ]),
            ),
        ]);
        let mut s = SessionState::new(false);
        s.apply(&callback(RESOURCE_RELAY_CALLBACK, lua));
        assert_eq!(s.messages()[&Tick(0)].recipient, "3");
    }

    #[test]
    fn other_callbacks_and_plain_transfers_are_ignored() {
        let mut s = SessionState::new(false);
        s.apply(&callback("Ping", chat_lua("A", "B", "hi")));
        s.apply(&callback(
            RESOURCE_RELAY_CALLBACK,
            lua_table([("Sender", LuaValue::from("A")), ("Mass", LuaValue::Number(100.0))]),
        ));
        assert!(s.messages().is_empty());
    }

    #[test]
    fn malformed_message_is_skipped() {
        let lua = lua_table([
            ("Sender", LuaValue::from("A")),
            ("Msg", lua_table([("to", LuaValue::from("B"))])),
        ]);
        let mut s = SessionState::new(false);
        s.apply(&callback(RESOURCE_RELAY_CALLBACK, lua));
        assert!(s.messages().is_empty());
    }

    #[test]
    fn body_groups_flush_on_advance() {
        let mut s = SessionState::new(true);
        s.apply(&Command::SetCommandSource {
            player_id: PlayerId(0),
        });
        s.record(
            CommandType::SetCommandSource,
            BodyEntry::Decoded(Command::SetCommandSource {
                player_id: PlayerId(0),
            }),
        );
        s.record(CommandType::IssueCommand, BodyEntry::Raw(vec![12, 3, 0]));

        s.apply(&Command::Advance { delta: 1 });
        s.record(
            CommandType::Advance,
            BodyEntry::Decoded(Command::Advance { delta: 1 }),
        );

        assert_eq!(s.body().len(), 1);
        let group = &s.body()[0];
        assert_eq!(group.tick, Tick(0));
        let player0 = &group.commands[&CommandSource::Player(PlayerId(0))];
        assert_eq!(
            player0.keys().copied().collect::<Vec<_>>(),
            [CommandType::SetCommandSource, CommandType::IssueCommand]
        );
        assert_eq!(s.current_tick_commands().len(), 1);
    }

    #[test]
    fn recording_is_a_no_op_without_store_body() {
        let mut s = SessionState::new(false);
        s.record(CommandType::EndGame, BodyEntry::Decoded(Command::EndGame));
        s.apply(&Command::Advance { delta: 1 });
        assert!(s.body().is_empty());
        assert!(s.current_tick_commands().is_empty());
    }
}
