//! Benchmark profiles for the FAF replay-body parser.
//!
//! Provides synthetic bodies shaped like real multiplayer games:
//!
//! - [`reference_body`]: 8 players, 3000 ticks (five game minutes)
//! - [`stress_body`]: 16 players, 36000 ticks (an hour-long game)
//! - [`game_body`]: the generator both profiles are built on

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fafreplay_core::{Command, Target, Vector3};
use fafreplay_test_utils::{fixtures, BodyBuilder};

/// Ticks between `VerifyChecksum` rounds.
pub const CHECKSUM_INTERVAL: u32 = 50;

/// Build the reference benchmark body: 8 players, 3000 ticks.
pub fn reference_body(seed: u64) -> Vec<u8> {
    game_body(8, 3_000, seed)
}

/// Build the stress benchmark body: 16 players, 36000 ticks.
pub fn stress_body(seed: u64) -> Vec<u8> {
    game_body(16, 36_000, seed)
}

/// Generate a deterministic body of `players` sources over `ticks` ticks.
///
/// Every tick each player gets a source switch and, depending on a
/// simple hash of the seed, a move order, a factory order, a target
/// change, or nothing. Every [`CHECKSUM_INTERVAL`] ticks all players
/// report the same checksum, and every 200 ticks one of them chats. The
/// body never desyncs.
pub fn game_body(players: u8, ticks: u32, seed: u64) -> Vec<u8> {
    let mut b = BodyBuilder::new();
    let mut state = seed;

    for tick in 0..ticks {
        for player in 0..players {
            b = b.set_command_source(player);
            state = next(state);
            let unit = (state >> 32) as u32;
            b = match state % 8 {
                0 | 1 => b.command(&Command::IssueCommand {
                    units: [unit, unit.wrapping_add(1)].into_iter().collect(),
                    command: fixtures::move_order(tick),
                }),
                2 => b.command(&Command::IssueFactoryCommand {
                    units: [unit].into_iter().collect(),
                    command: fixtures::build_order(tick),
                }),
                3 => b.command(&Command::SetCommandTarget {
                    command_id: tick,
                    target: Target::Position(Vector3 {
                        x: (unit % 512) as f32,
                        y: 0.0,
                        z: (unit % 256) as f32,
                    }),
                }),
                _ => b,
            };
            if tick % CHECKSUM_INTERVAL == 0 {
                b = b.verify_checksum((tick / CHECKSUM_INTERVAL) as u8, tick);
            }
            if tick % 200 == 0 && u32::from(player) == (tick / 200) % u32::from(players) {
                b = b.chat(&format!("player{player}"), "all", "gg");
            }
        }
        b = b.advance(1);
    }

    for player in 0..players {
        b = b.set_command_source(player).command_source_terminated();
    }
    b.build()
}

fn next(state: u64) -> u64 {
    state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}
