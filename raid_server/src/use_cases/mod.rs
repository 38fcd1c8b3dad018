// Use cases layer: room lifecycle, intents and the simulation loop.

pub mod engine;
pub mod game;
pub mod intents;
pub mod registry;
pub mod schedule;
pub mod snapshot;
pub mod tick;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::RaidEngine;
pub use game::world_task;
pub use registry::RoomRegistry;
pub use types::{Delivery, GameEvent, RoomEvent, RoomSnapshot, RoomUpdate};
