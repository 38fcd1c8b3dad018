use super::engine::RaidEngine;
use super::types::{GameEvent, RoomUpdate};
use crate::domain::Clock;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drives the engine: applies intents as they arrive and ticks every room on a
/// fixed interval.
///
/// Intents win ties with the tick so anything queued before a tick boundary is
/// applied first. Exits on shutdown or when every intent sender is gone.
pub async fn world_task<C, R>(
    mut input_rx: mpsc::Receiver<GameEvent>,
    update_tx: mpsc::Sender<RoomUpdate>,
    mut engine: RaidEngine<C, R>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) where
    C: Clock,
    R: Rng,
{
    let mut interval = tokio::time::interval(tick_interval);
    // A slow tick shifts the schedule instead of bursting to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.notified() => {
                info!(ticks, "world task shutting down");
                break;
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    info!(ticks, "input channel closed; world task exiting");
                    break;
                };
                publish(&update_tx, engine.handle_event(event)).await;
            }
            _ = interval.tick() => {
                ticks += 1;
                publish(&update_tx, engine.tick()).await;
            }
        }
    }
}

/// Hands every update to the fan-out. A full channel holds the world back
/// instead of dropping snapshots.
async fn publish(update_tx: &mpsc::Sender<RoomUpdate>, updates: Vec<RoomUpdate>) {
    for update in updates {
        if update_tx.send(update).await.is_err() {
            warn!("room update receiver gone; update dropped");
            break;
        }
    }
}
