//! Test utilities for fafreplay development.
//!
//! Provides the write side of the body format, which the library itself
//! never needs: [`encode_payload`] mirrors every decoder, [`encode_lua`]
//! mirrors the Lua reader, and [`BodyBuilder`] packs commands into a
//! framed body buffer.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use fafreplay_core::{
    Checksum, Command, CommandType, EntityIds, LuaTable, LuaValue, PlayerId, Target,
    UnitCommand, Vector3, FRAME_HEADER_LEN,
};

// ── Primitive writers ───────────────────────────────────────────

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_cstr(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn put_vector3(buf: &mut Vec<u8>, v: &Vector3) {
    put_f32(buf, v.x);
    put_f32(buf, v.y);
    put_f32(buf, v.z);
}

fn put_entity_ids(buf: &mut Vec<u8>, ids: &EntityIds) {
    put_u32(buf, ids.len() as u32);
    for &id in ids {
        put_u32(buf, id);
    }
}

fn put_target(buf: &mut Vec<u8>, target: &Target) {
    match target {
        Target::None => buf.push(0),
        Target::Entity { entity_id } => {
            buf.push(1);
            put_u32(buf, *entity_id);
        }
        Target::Position(v) => {
            buf.push(2);
            put_vector3(buf, v);
        }
    }
}

fn put_cells(buf: &mut Vec<u8>, cells: &LuaValue) {
    encode_lua(buf, cells);
    if !cells.is_nil() {
        buf.push(0);
    }
}

fn put_unit_command(buf: &mut Vec<u8>, cmd: &UnitCommand) {
    put_u32(buf, cmd.command_id);
    put_i32(buf, -1);
    buf.push(cmd.command_type);
    put_i32(buf, -1);
    put_target(buf, &cmd.target);
    buf.push(0);
    match &cmd.formation {
        None => put_i32(buf, -1),
        Some(f) => {
            put_i32(buf, f.id);
            for q in f.orientation {
                put_f32(buf, q);
            }
            put_f32(buf, f.scale);
        }
    }
    put_cstr(buf, &cmd.blueprint);
    buf.extend_from_slice(&[0; 12]);
    put_cells(buf, &cmd.cells);
}

// ── Lua ─────────────────────────────────────────────────────────

/// Append the wire encoding of a Lua value.
pub fn encode_lua(buf: &mut Vec<u8>, value: &LuaValue) {
    match value {
        LuaValue::Number(n) => {
            buf.push(0);
            put_f32(buf, *n);
        }
        LuaValue::String(s) => {
            buf.push(1);
            put_cstr(buf, s);
        }
        LuaValue::Nil => buf.extend_from_slice(&[2, 0]),
        LuaValue::Bool(b) => buf.extend_from_slice(&[3, u8::from(*b)]),
        LuaValue::Table(t) => {
            buf.push(4);
            for (k, v) in t.iter() {
                encode_lua(buf, k);
                encode_lua(buf, v);
            }
            buf.push(5);
        }
    }
}

/// Build a table from string keys.
pub fn lua_table<'a>(entries: impl IntoIterator<Item = (&'a str, LuaValue)>) -> LuaValue {
    LuaValue::Table(
        entries
            .into_iter()
            .map(|(k, v)| (LuaValue::from(k), v))
            .collect::<LuaTable>(),
    )
}

// ── Commands ────────────────────────────────────────────────────

/// Encode a command's payload, the inverse of its decoder.
pub fn encode_payload(command: &Command) -> Vec<u8> {
    let mut buf = Vec::new();
    match command {
        Command::Advance { delta } => put_u32(&mut buf, *delta),
        Command::SetCommandSource { player_id } => buf.push(player_id.0),
        Command::CommandSourceTerminated
        | Command::RequestPause
        | Command::Resume
        | Command::SingleStep
        | Command::EndGame => {}
        Command::VerifyChecksum { checksum, tick } => {
            buf.extend_from_slice(&checksum.0);
            put_u32(&mut buf, *tick);
        }
        Command::CreateUnit {
            army,
            blueprint,
            x,
            z,
            heading,
        } => {
            buf.push(*army);
            put_cstr(&mut buf, blueprint);
            put_f32(&mut buf, *x);
            put_f32(&mut buf, *z);
            put_f32(&mut buf, *heading);
        }
        Command::CreateProp {
            blueprint,
            position,
        } => {
            put_cstr(&mut buf, blueprint);
            put_vector3(&mut buf, position);
        }
        Command::DestroyEntity { entity_id } => put_u32(&mut buf, *entity_id),
        Command::WarpEntity {
            entity_id,
            position,
        } => {
            put_u32(&mut buf, *entity_id);
            put_vector3(&mut buf, position);
        }
        Command::ProcessInfoPair {
            entity_id,
            name,
            value,
        } => {
            put_u32(&mut buf, *entity_id);
            put_cstr(&mut buf, name);
            put_cstr(&mut buf, value);
        }
        Command::IssueCommand { units, command }
        | Command::IssueFactoryCommand { units, command } => {
            put_entity_ids(&mut buf, units);
            put_unit_command(&mut buf, command);
        }
        Command::IncreaseCommandCount { command_id, delta }
        | Command::DecreaseCommandCount { command_id, delta } => {
            put_u32(&mut buf, *command_id);
            put_i32(&mut buf, *delta);
        }
        Command::SetCommandTarget { command_id, target } => {
            put_u32(&mut buf, *command_id);
            put_target(&mut buf, target);
        }
        Command::SetCommandType {
            command_id,
            command_type,
        } => {
            put_u32(&mut buf, *command_id);
            put_u32(&mut buf, *command_type);
        }
        Command::SetCommandCells {
            command_id,
            cells,
            position,
        } => {
            put_u32(&mut buf, *command_id);
            put_cells(&mut buf, cells);
            put_vector3(&mut buf, position);
        }
        Command::RemoveCommandFromQueue {
            command_id,
            unit_id,
        } => {
            put_u32(&mut buf, *command_id);
            put_u32(&mut buf, *unit_id);
        }
        Command::DebugCommand {
            command,
            position,
            focus_army,
            units,
        } => {
            put_cstr(&mut buf, command);
            put_vector3(&mut buf, position);
            buf.push(*focus_army);
            put_entity_ids(&mut buf, units);
        }
        Command::ExecuteLuaInSim { code } => put_cstr(&mut buf, code),
        Command::LuaSimCallback {
            lua_name,
            lua,
            units,
        } => {
            put_cstr(&mut buf, lua_name);
            encode_lua(&mut buf, lua);
            if !units.is_empty() {
                put_entity_ids(&mut buf, units);
            }
        }
    }
    buf
}

/// Frame a payload under an arbitrary type byte.
///
/// # Panics
///
/// Panics if the payload does not fit a u16 frame length.
pub fn frame(command_type: u8, payload: &[u8]) -> Vec<u8> {
    let total = u16::try_from(payload.len() + FRAME_HEADER_LEN)
        .expect("payload too large for a single frame");
    let mut buf = Vec::with_capacity(usize::from(total));
    buf.push(command_type);
    buf.extend_from_slice(&total.to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Encode a command as a complete frame.
pub fn encode_command(command: &Command) -> Vec<u8> {
    frame(command.command_type().id(), &encode_payload(command))
}

/// A checksum with every byte set to `fill`.
pub fn checksum(fill: u8) -> Checksum {
    Checksum([fill; 16])
}

/// The argument table of a chat relay callback.
pub fn chat_lua(sender: &str, to: &str, text: &str) -> LuaValue {
    lua_table([
        ("Sender", LuaValue::from(sender)),
        (
            "Msg",
            lua_table([("to", LuaValue::from(to)), ("text", LuaValue::from(text))]),
        ),
    ])
}

// ── Body builder ────────────────────────────────────────────────

/// Packs commands into a body buffer.
///
/// ```
/// use fafreplay_test_utils::BodyBuilder;
///
/// let body = BodyBuilder::new().set_command_source(0).advance(1).build();
/// assert_eq!(body.len(), 4 + 7);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BodyBuilder {
    buf: Vec<u8>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: &Command) -> Self {
        self.buf.extend_from_slice(&encode_command(command));
        self
    }

    pub fn commands<'a>(mut self, commands: impl IntoIterator<Item = &'a Command>) -> Self {
        for c in commands {
            self = self.command(c);
        }
        self
    }

    pub fn advance(self, delta: u32) -> Self {
        self.command(&Command::Advance { delta })
    }

    pub fn set_command_source(self, player: u8) -> Self {
        self.command(&Command::SetCommandSource {
            player_id: PlayerId(player),
        })
    }

    pub fn command_source_terminated(self) -> Self {
        self.command(&Command::CommandSourceTerminated)
    }

    pub fn verify_checksum(self, fill: u8, tick: u32) -> Self {
        self.command(&Command::VerifyChecksum {
            checksum: checksum(fill),
            tick,
        })
    }

    pub fn lua_sim_callback(self, lua_name: &str, lua: LuaValue) -> Self {
        self.command(&Command::LuaSimCallback {
            lua_name: lua_name.to_owned(),
            lua,
            units: EntityIds::new(),
        })
    }

    /// A resource-relay callback carrying a chat message.
    pub fn chat(self, sender: &str, to: &str, text: &str) -> Self {
        self.lua_sim_callback("GiveResourcesToPlayer", chat_lua(sender, to, text))
    }

    /// A frame with an arbitrary type byte and payload.
    pub fn raw(mut self, command_type: u8, payload: &[u8]) -> Self {
        self.buf.extend_from_slice(&frame(command_type, payload));
        self
    }

    /// Unframed bytes appended as-is.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn empty(self, command_type: CommandType) -> Self {
        self.raw(command_type.id(), &[])
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
