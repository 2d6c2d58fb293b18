//! Payload decoder dispatch.
//!
//! Each [`CommandType`] maps to one plain decoder function through an
//! exhaustive `match`, so adding a command type without a decoder does
//! not compile. Decoders read from a payload [`Cursor`] and are expected
//! to consume all of it.

use crate::command::{
    Checksum, Command, CommandType, EntityIds, Formation, Target, UnitCommand, Vector3,
};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::frame::RawFrame;
use crate::id::PlayerId;
use crate::lua::read_lua;

/// Signature shared by every payload decoder.
pub type DecodeFn = fn(&mut Cursor<'_>) -> Result<Command, ParseError>;

const TARGET_NONE: u8 = 0;
const TARGET_ENTITY: u8 = 1;
const TARGET_POSITION: u8 = 2;

/// Formation id meaning "no formation".
const NO_FORMATION: i32 = -1;

impl CommandType {
    /// The decoder registered for this type.
    pub fn decoder(self) -> DecodeFn {
        match self {
            Self::Advance => decode_advance,
            Self::SetCommandSource => decode_set_command_source,
            Self::CommandSourceTerminated => decode_command_source_terminated,
            Self::VerifyChecksum => decode_verify_checksum,
            Self::RequestPause => decode_request_pause,
            Self::Resume => decode_resume,
            Self::SingleStep => decode_single_step,
            Self::CreateUnit => decode_create_unit,
            Self::CreateProp => decode_create_prop,
            Self::DestroyEntity => decode_destroy_entity,
            Self::WarpEntity => decode_warp_entity,
            Self::ProcessInfoPair => decode_process_info_pair,
            Self::IssueCommand => decode_issue_command,
            Self::IssueFactoryCommand => decode_issue_factory_command,
            Self::IncreaseCommandCount => decode_increase_command_count,
            Self::DecreaseCommandCount => decode_decrease_command_count,
            Self::SetCommandTarget => decode_set_command_target,
            Self::SetCommandType => decode_set_command_type,
            Self::SetCommandCells => decode_set_command_cells,
            Self::RemoveCommandFromQueue => decode_remove_command_from_queue,
            Self::DebugCommand => decode_debug_command,
            Self::ExecuteLuaInSim => decode_execute_lua_in_sim,
            Self::LuaSimCallback => decode_lua_sim_callback,
            Self::EndGame => decode_end_game,
        }
    }
}

/// Resolve a frame's type byte.
pub fn resolve_type(frame: &RawFrame<'_>) -> Result<CommandType, ParseError> {
    CommandType::from_u8(frame.command_type()).ok_or(ParseError::UnknownCommandType {
        command_type: frame.command_type(),
        offset: frame.offset(),
    })
}

/// Decode a payload with the decoder registered for `command_type`.
///
/// Bytes the decoder leaves behind are logged and ignored.
pub fn decode_payload(
    command_type: CommandType,
    payload: &mut Cursor<'_>,
) -> Result<Command, ParseError> {
    let command = (command_type.decoder())(payload)?;
    if !payload.is_empty() {
        tracing::warn!(
            command = %command_type,
            offset = payload.offset(),
            leftover = payload.remaining(),
            "payload not fully consumed"
        );
    }
    Ok(command)
}

/// Decode a framed command.
pub fn decode_frame(frame: &RawFrame<'_>) -> Result<Command, ParseError> {
    let command_type = resolve_type(frame)?;
    decode_payload(command_type, &mut frame.payload_cursor())
}

/// Decode a bare payload given its type byte.
///
/// Fails with [`ParseError::UnknownCommandType`] if no decoder is
/// registered for `command_type`.
pub fn decode(command_type: u8, payload: &[u8]) -> Result<Command, ParseError> {
    let ty = CommandType::from_u8(command_type).ok_or(ParseError::UnknownCommandType {
        command_type,
        offset: 0,
    })?;
    decode_payload(ty, &mut Cursor::new(payload))
}

// ── Shared shapes ───────────────────────────────────────────────

fn read_vector3(c: &mut Cursor<'_>) -> Result<Vector3, ParseError> {
    Ok(Vector3 {
        x: c.read_f32_le()?,
        y: c.read_f32_le()?,
        z: c.read_f32_le()?,
    })
}

fn read_entity_ids(c: &mut Cursor<'_>) -> Result<EntityIds, ParseError> {
    let count = c.read_u32_le()? as usize;
    // Bound the count by the bytes left before allocating.
    let needed = count.saturating_mul(4);
    if needed > c.remaining() {
        return Err(ParseError::OutOfData {
            offset: c.offset(),
            needed,
            available: c.remaining(),
        });
    }
    let mut ids = EntityIds::with_capacity(count);
    for _ in 0..count {
        ids.push(c.read_u32_le()?);
    }
    Ok(ids)
}

fn read_target(c: &mut Cursor<'_>, command: CommandType) -> Result<Target, ParseError> {
    match c.read_u8()? {
        TARGET_NONE => Ok(Target::None),
        TARGET_ENTITY => Ok(Target::Entity {
            entity_id: c.read_u32_le()?,
        }),
        TARGET_POSITION => Ok(Target::Position(read_vector3(c)?)),
        kind => Err(ParseError::malformed(
            command,
            format!("unknown target kind {kind}"),
        )),
    }
}

fn read_unit_command(c: &mut Cursor<'_>, command: CommandType) -> Result<UnitCommand, ParseError> {
    let command_id = c.read_u32_le()?;
    c.skip(4)?;
    let command_type = c.read_u8()?;
    c.skip(4)?;
    let target = read_target(c, command)?;
    c.skip(1)?;

    let formation_id = c.read_i32_le()?;
    let formation = if formation_id == NO_FORMATION {
        None
    } else {
        Some(Formation {
            id: formation_id,
            orientation: [
                c.read_f32_le()?,
                c.read_f32_le()?,
                c.read_f32_le()?,
                c.read_f32_le()?,
            ],
            scale: c.read_f32_le()?,
        })
    };

    let blueprint = c.read_cstr()?;
    c.skip(12)?;
    let cells = read_lua(c, command)?;
    if !cells.is_nil() {
        c.skip(1)?;
    }

    Ok(UnitCommand {
        command_id,
        command_type,
        target,
        formation,
        blueprint,
        cells,
    })
}

// ── Decoders ────────────────────────────────────────────────────

fn decode_advance(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::Advance {
        delta: c.read_u32_le()?,
    })
}

fn decode_set_command_source(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::SetCommandSource {
        player_id: PlayerId(c.read_u8()?),
    })
}

fn decode_verify_checksum(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::VerifyChecksum {
        checksum: Checksum(c.read_array()?),
        tick: c.read_u32_le()?,
    })
}

fn decode_create_unit(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::CreateUnit {
        army: c.read_u8()?,
        blueprint: c.read_cstr()?,
        x: c.read_f32_le()?,
        z: c.read_f32_le()?,
        heading: c.read_f32_le()?,
    })
}

fn decode_create_prop(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::CreateProp {
        blueprint: c.read_cstr()?,
        position: read_vector3(c)?,
    })
}

fn decode_destroy_entity(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::DestroyEntity {
        entity_id: c.read_u32_le()?,
    })
}

fn decode_warp_entity(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::WarpEntity {
        entity_id: c.read_u32_le()?,
        position: read_vector3(c)?,
    })
}

fn decode_process_info_pair(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::ProcessInfoPair {
        entity_id: c.read_u32_le()?,
        name: c.read_cstr()?,
        value: c.read_cstr()?,
    })
}

fn decode_issue_command(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::IssueCommand {
        units: read_entity_ids(c)?,
        command: read_unit_command(c, CommandType::IssueCommand)?,
    })
}

fn decode_issue_factory_command(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::IssueFactoryCommand {
        units: read_entity_ids(c)?,
        command: read_unit_command(c, CommandType::IssueFactoryCommand)?,
    })
}

fn decode_increase_command_count(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::IncreaseCommandCount {
        command_id: c.read_u32_le()?,
        delta: c.read_i32_le()?,
    })
}

fn decode_decrease_command_count(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::DecreaseCommandCount {
        command_id: c.read_u32_le()?,
        delta: c.read_i32_le()?,
    })
}

fn decode_set_command_target(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::SetCommandTarget {
        command_id: c.read_u32_le()?,
        target: read_target(c, CommandType::SetCommandTarget)?,
    })
}

fn decode_set_command_type(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::SetCommandType {
        command_id: c.read_u32_le()?,
        command_type: c.read_u32_le()?,
    })
}

fn decode_set_command_cells(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    let command_id = c.read_u32_le()?;
    let cells = read_lua(c, CommandType::SetCommandCells)?;
    if !cells.is_nil() {
        c.skip(1)?;
    }
    Ok(Command::SetCommandCells {
        command_id,
        cells,
        position: read_vector3(c)?,
    })
}

fn decode_remove_command_from_queue(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::RemoveCommandFromQueue {
        command_id: c.read_u32_le()?,
        unit_id: c.read_u32_le()?,
    })
}

fn decode_debug_command(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::DebugCommand {
        command: c.read_cstr()?,
        position: read_vector3(c)?,
        focus_army: c.read_u8()?,
        units: read_entity_ids(c)?,
    })
}

fn decode_execute_lua_in_sim(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::ExecuteLuaInSim {
        code: c.read_cstr()?,
    })
}

fn decode_lua_sim_callback(c: &mut Cursor<'_>) -> Result<Command, ParseError> {
    let lua_name = c.read_cstr()?;
    let lua = read_lua(c, CommandType::LuaSimCallback)?;
    let units = if c.is_empty() {
        EntityIds::new()
    } else {
        read_entity_ids(c)?
    };
    Ok(Command::LuaSimCallback {
        lua_name,
        lua,
        units,
    })
}

fn decode_command_source_terminated(_: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::CommandSourceTerminated)
}

fn decode_request_pause(_: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::RequestPause)
}

fn decode_resume(_: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::Resume)
}

fn decode_single_step(_: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::SingleStep)
}

fn decode_end_game(_: &mut Cursor<'_>) -> Result<Command, ParseError> {
    Ok(Command::EndGame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::next_frame;
    use crate::lua::LuaValue;

    #[test]
    fn every_type_has_a_decoder() {
        // Empty-payload commands decode from nothing; the rest run out of data.
        for ty in CommandType::ALL {
            let result = decode(ty.id(), &[]);
            match result {
                Ok(cmd) => assert_eq!(cmd.command_type(), ty),
                Err(e) => assert!(matches!(e, ParseError::OutOfData { .. }), "{ty}: {e}"),
            }
        }
    }

    #[test]
    fn unknown_type_byte() {
        assert_eq!(
            decode(24, &[]).unwrap_err(),
            ParseError::UnknownCommandType {
                command_type: 24,
                offset: 0
            }
        );
    }

    #[test]
    fn resolve_reports_frame_offset() {
        let data = [0x17, 0x03, 0x00, 0xC8, 0x03, 0x00];
        let mut c = Cursor::new(&data);
        let end_game = next_frame(&mut c).unwrap();
        assert_eq!(resolve_type(&end_game).unwrap(), CommandType::EndGame);
        let bogus = next_frame(&mut c).unwrap();
        assert_eq!(
            resolve_type(&bogus).unwrap_err(),
            ParseError::UnknownCommandType {
                command_type: 0xC8,
                offset: 3
            }
        );
    }

    #[test]
    fn advance_and_source() {
        assert_eq!(
            decode(0, &7u32.to_le_bytes()).unwrap(),
            Command::Advance { delta: 7 }
        );
        assert_eq!(
            decode(1, &[4]).unwrap(),
            Command::SetCommandSource {
                player_id: PlayerId(4)
            }
        );
    }

    #[test]
    fn verify_checksum() {
        let mut payload = vec![0xEE; 16];
        payload.extend_from_slice(&300u32.to_le_bytes());
        assert_eq!(
            decode(3, &payload).unwrap(),
            Command::VerifyChecksum {
                checksum: Checksum([0xEE; 16]),
                tick: 300
            }
        );
    }

    #[test]
    fn set_command_target_rejects_unknown_kind() {
        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.push(7);
        assert!(matches!(
            decode(CommandType::SetCommandTarget.id(), &payload),
            Err(ParseError::MalformedPayload {
                command: CommandType::SetCommandTarget,
                ..
            })
        ));
    }

    #[test]
    fn entity_id_count_is_checked_before_allocating() {
        let mut payload = u32::MAX.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 8]);
        assert!(matches!(
            decode(CommandType::IssueCommand.id(), &payload),
            Err(ParseError::OutOfData { offset: 4, .. })
        ));
    }

    #[test]
    fn lua_sim_callback_without_selection() {
        let payload = b"Ping\0\x02\x00";
        assert_eq!(
            decode(CommandType::LuaSimCallback.id(), payload).unwrap(),
            Command::LuaSimCallback {
                lua_name: "Ping".into(),
                lua: LuaValue::Nil,
                units: EntityIds::new(),
            }
        );
    }

    #[test]
    fn leftover_bytes_are_tolerated() {
        let mut payload = 5u32.to_le_bytes().to_vec();
        payload.push(0xFF);
        assert_eq!(
            decode(0, &payload).unwrap(),
            Command::Advance { delta: 5 }
        );
    }
}
