//! Canned commands for decoder and engine tests.

use fafreplay_core::{
    Command, CommandType, EntityIds, Formation, LuaValue, PlayerId, Target, UnitCommand, Vector3,
};

use crate::{checksum, chat_lua, lua_table};

fn ids(v: &[u32]) -> EntityIds {
    v.iter().copied().collect()
}

fn pos(x: f32, y: f32, z: f32) -> Vector3 {
    Vector3 { x, y, z }
}

/// A move order to a ground position, no formation.
pub fn move_order(command_id: u32) -> UnitCommand {
    UnitCommand {
        command_id,
        command_type: 2,
        target: Target::Position(pos(128.0, 20.5, 256.0)),
        formation: None,
        blueprint: String::new(),
        cells: LuaValue::Nil,
    }
}

/// A formation build order with cells.
pub fn build_order(command_id: u32) -> UnitCommand {
    UnitCommand {
        command_id,
        command_type: 8,
        target: Target::Entity { entity_id: 0x0010_0004 },
        formation: Some(Formation {
            id: 0,
            orientation: [1.0, 0.0, 0.0, 0.0],
            scale: 1.0,
        }),
        blueprint: "ueb0101".into(),
        cells: lua_table([("1", LuaValue::Number(3.0))]),
    }
}

/// One command of every type, in identifier order.
pub fn one_of_each() -> Vec<Command> {
    let all = vec![
        Command::Advance { delta: 1 },
        Command::SetCommandSource {
            player_id: PlayerId(1),
        },
        Command::CommandSourceTerminated,
        Command::VerifyChecksum {
            checksum: checksum(0x5A),
            tick: 50,
        },
        Command::RequestPause,
        Command::Resume,
        Command::SingleStep,
        Command::CreateUnit {
            army: 2,
            blueprint: "uel0001".into(),
            x: 10.0,
            z: 20.0,
            heading: 0.5,
        },
        Command::CreateProp {
            blueprint: "/env/common/props/rocks/rock01_prop.bp".into(),
            position: pos(1.0, 2.0, 3.0),
        },
        Command::DestroyEntity { entity_id: 42 },
        Command::WarpEntity {
            entity_id: 42,
            position: pos(4.0, 5.0, 6.0),
        },
        Command::ProcessInfoPair {
            entity_id: 7,
            name: "SetAutoMode".into(),
            value: "true".into(),
        },
        Command::IssueCommand {
            units: ids(&[1, 2, 3]),
            command: move_order(100),
        },
        Command::IssueFactoryCommand {
            units: ids(&[9]),
            command: build_order(101),
        },
        Command::IncreaseCommandCount {
            command_id: 101,
            delta: 5,
        },
        Command::DecreaseCommandCount {
            command_id: 101,
            delta: -1,
        },
        Command::SetCommandTarget {
            command_id: 100,
            target: Target::None,
        },
        Command::SetCommandType {
            command_id: 100,
            command_type: 3,
        },
        Command::SetCommandCells {
            command_id: 100,
            cells: lua_table([("x", LuaValue::Bool(true))]),
            position: pos(7.0, 8.0, 9.0),
        },
        Command::RemoveCommandFromQueue {
            command_id: 100,
            unit_id: 2,
        },
        Command::DebugCommand {
            command: "dbg navwaypoints".into(),
            position: pos(0.0, 0.0, 0.0),
            focus_army: 1,
            units: ids(&[]),
        },
        Command::ExecuteLuaInSim {
            code: "LOG('hi')".into(),
        },
        Command::LuaSimCallback {
            lua_name: "GiveResourcesToPlayer".into(),
            lua: chat_lua("Alice", "all", "gl hf"),
            units: ids(&[5, 6]),
        },
        Command::EndGame,
    ];
    debug_assert!(all
        .iter()
        .zip(CommandType::ALL)
        .all(|(c, ty)| c.command_type() == ty));
    all
}
