#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level lifecycle system: escapes advance, captures restart from scratch.

use maze_escape_core::{Command, Event, Level};

/// Stateless system that turns terminal level events into level starts.
#[derive(Debug, Default)]
pub struct Progression;

impl Progression {
    /// Consumes world events and emits the next level start, if any.
    ///
    /// An escape and a capture in the same batch cannot both win; the escape
    /// is emitted first by the world and takes precedence here too.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ExitReached { level } => {
                    out.push(Command::StartLevel {
                        level: level.next(),
                    });
                    return;
                }
                Event::PlayerCaught { .. } => {
                    out.push(Command::StartLevel {
                        level: Level::first(),
                    });
                    return;
                }
                _ => {}
            }
        }
    }
}
