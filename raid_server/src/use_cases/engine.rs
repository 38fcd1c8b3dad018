// Raid engine: the registry, reset queue and tick loop body behind one handle.

use crate::domain::{Clock, RaidTuning};
use crate::use_cases::intents::{self, AbilityOutcome, IntentError, active_room};
use crate::use_cases::registry::RoomRegistry;
use crate::use_cases::schedule::ScheduledResets;
use crate::use_cases::snapshot;
use crate::use_cases::tick::tick_room;
use crate::use_cases::types::{GameEvent, RoomUpdate};
use rand::Rng;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, error, info};

/// Owns all room state. Driven by a single task, so nothing here locks.
pub struct RaidEngine<C, R> {
    registry: RoomRegistry,
    resets: ScheduledResets,
    clock: C,
    rng: R,
    tuning: RaidTuning,
    reset_delay_ms: u64,
}

impl<C: Clock, R: Rng> RaidEngine<C, R> {
    pub fn new(clock: C, rng: R, tuning: RaidTuning, reset_delay: Duration) -> Self {
        Self {
            registry: RoomRegistry::new(tuning),
            resets: ScheduledResets::new(),
            clock,
            rng,
            tuning,
            reset_delay_ms: u64::try_from(reset_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RoomRegistry {
        &mut self.registry
    }

    /// Applies one intent. Only a join produces output: the init for the joiner.
    ///
    /// Rejected intents are logged at debug and otherwise ignored.
    pub fn handle_event(&mut self, event: GameEvent) -> Vec<RoomUpdate> {
        let now = self.clock.now_millis();
        let result = match event {
            GameEvent::Join {
                conn_id,
                class_tag,
                room_code,
            } => {
                match intents::join(
                    &mut self.registry,
                    &mut self.rng,
                    &self.tuning,
                    &conn_id,
                    &class_tag,
                    &room_code,
                ) {
                    Ok(joined) => {
                        return vec![snapshot::init(
                            room_code.trim(),
                            &conn_id,
                            joined.snapshot,
                        )];
                    }
                    Err(err) => Err((conn_id, "join", err)),
                }
            }
            GameEvent::Move { conn_id, angle } => active_room(&mut self.registry, &conn_id)
                .and_then(|room| intents::move_player(room, &conn_id, angle))
                .map_err(|err| (conn_id, "move", err)),
            GameEvent::Shoot { conn_id, vx, vy } => {
                let tuning = &self.tuning.projectile;
                active_room(&mut self.registry, &conn_id)
                    .and_then(|room| intents::shoot(room, &conn_id, vx, vy, tuning))
                    .map(|_| ())
                    .map_err(|err| (conn_id, "shoot", err))
            }
            GameEvent::UseAbility { conn_id, class_tag } => {
                let tuning = &self.tuning.ability;
                match active_room(&mut self.registry, &conn_id)
                    .and_then(|room| intents::use_ability(room, &conn_id, &class_tag, tuning, now))
                {
                    Ok(AbilityOutcome::Applied { .. }) => Ok(()),
                    Ok(AbilityOutcome::InsufficientCharge) => {
                        debug!(conn_id = %conn_id, class = %class_tag, "not enough shared charge");
                        Ok(())
                    }
                    Err(err) => Err((conn_id, "useAbility", err)),
                }
            }
            GameEvent::Leave { conn_id } => match intents::leave(&mut self.registry, &conn_id) {
                // Connections that never joined have nothing to clean up.
                Ok(()) | Err(IntentError::UnknownConnection) => Ok(()),
                Err(err) => Err((conn_id, "leave", err)),
            },
        };

        if let Err((conn_id, intent, err)) = result {
            debug!(conn_id = %conn_id, intent, error = ?err, "intent dropped");
        }
        Vec::new()
    }

    /// Retires idle rooms, runs due replacements, then steps every room.
    ///
    /// A replaced room gets one tick for its players to rejoin before it counts
    /// as idle. A room whose step panics is ended without an outcome and replaced
    /// on the next tick; the other rooms are unaffected.
    pub fn tick(&mut self) -> Vec<RoomUpdate> {
        let now = self.clock.now_millis();

        self.registry.retire_idle_rooms();

        for code in self.resets.take_due(now) {
            if self.registry.replace_room(&code) {
                info!(room_code = %code, "room reset");
            }
        }

        let mut updates = Vec::new();
        let mut finished: Vec<(String, u64)> = Vec::new();
        let rng = &mut self.rng;
        let tuning = &self.tuning;

        for (code, room) in self.registry.rooms_mut() {
            let stepped = panic::catch_unwind(AssertUnwindSafe(|| {
                tick_room(&mut *room, now, &mut *rng, tuning)
            }));
            match stepped {
                Ok(Some(outcome)) => {
                    info!(room_code = %code, outcome = outcome.as_str(), "game over");
                    updates.push(snapshot::game_over(code, outcome));
                    finished.push((code.clone(), now.saturating_add(self.reset_delay_ms)));
                }
                Ok(None) => updates.extend(snapshot::state_update(room)),
                Err(_) => {
                    error!(room_code = %code, "room tick panicked; replacing room");
                    room.end(None);
                    finished.push((code.clone(), now));
                }
            }
        }

        for (code, due_at) in finished {
            self.resets.schedule(&code, due_at);
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;
    use crate::use_cases::test_support::{ManualClock, quiet_tuning, seeded_rng};
    use crate::use_cases::types::{Delivery, RoomEvent};
    use rand::RngCore;
    use rand::rngs::StdRng;

    const TICK_MS: u64 = 50;

    fn engine(tuning: RaidTuning) -> (RaidEngine<ManualClock, StdRng>, ManualClock) {
        let clock = ManualClock::default();
        let engine = RaidEngine::new(
            clock.clone(),
            seeded_rng(),
            tuning,
            Duration::from_millis(5_000),
        );
        (engine, clock)
    }

    fn join(engine: &mut RaidEngine<ManualClock, StdRng>, conn: &str, class: &str, code: &str) {
        let updates = engine.handle_event(GameEvent::Join {
            conn_id: conn.to_string(),
            class_tag: class.to_string(),
            room_code: code.to_string(),
        });
        assert_eq!(updates.len(), 1, "join should answer with an init");
    }

    fn step(engine: &mut RaidEngine<ManualClock, StdRng>, clock: &ManualClock) -> Vec<RoomUpdate> {
        clock.advance(TICK_MS);
        engine.tick()
    }

    /// Fires `shots` from `conn` straight at the boss at full speed.
    fn fire_at_boss(engine: &mut RaidEngine<ManualClock, StdRng>, conn: &str, shots: usize) {
        let room = engine.registry_mut().room_for_connection_mut(conn).unwrap();
        let player = &room.players[conn];
        let (x, y) = (player.x(), player.y());
        let len = x.hypot(y);
        for _ in 0..shots {
            engine.handle_event(GameEvent::Shoot {
                conn_id: conn.to_string(),
                vx: -x / len * 10.0,
                vy: -y / len * 10.0,
            });
        }
    }

    #[test]
    fn join_answers_with_init_for_the_joiner_only() {
        let (mut engine, _clock) = engine(quiet_tuning());
        let updates = engine.handle_event(GameEvent::Join {
            conn_id: "c1".to_string(),
            class_tag: "Healer".to_string(),
            room_code: " ABCD ".to_string(),
        });
        assert_eq!(updates.len(), 1);
        assert_eq!(&*updates[0].room_code, "ABCD");
        assert_eq!(updates[0].delivery, Delivery::Connection("c1".to_string()));
        match &updates[0].event {
            RoomEvent::Init(snapshot) => assert!(snapshot.players.contains_key("c1")),
            other => panic!("expected init, got {other:?}"),
        }
    }

    #[test]
    fn each_tick_broadcasts_state_for_occupied_rooms() {
        let (mut engine, clock) = engine(quiet_tuning());
        join(&mut engine, "c1", "Tank", "AAAA");
        join(&mut engine, "c2", "Tank", "BBBB");

        let updates = step(&mut engine, &clock);
        let mut codes: Vec<&str> = updates
            .iter()
            .filter(|u| matches!(u.event, RoomEvent::StateUpdate(_)))
            .map(|u| &*u.room_code)
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["AAAA", "BBBB"]);
    }

    #[test]
    fn intents_from_unknown_connections_are_ignored() {
        let (mut engine, _clock) = engine(quiet_tuning());
        assert!(engine
            .handle_event(GameEvent::Move {
                conn_id: "ghost".to_string(),
                angle: 1.0,
            })
            .is_empty());
        assert!(engine
            .handle_event(GameEvent::Leave {
                conn_id: "ghost".to_string(),
            })
            .is_empty());
        assert_eq!(engine.registry().room_count(), 0);
    }

    #[test]
    fn victory_is_announced_once_and_room_resets_after_delay() {
        let mut tuning = quiet_tuning();
        tuning.boss.max_health = 30;
        let (mut engine, clock) = engine(tuning);
        join(&mut engine, "tank", "Tank", "ABCD");
        join(&mut engine, "sniper", "Sniper", "ABCD");
        fire_at_boss(&mut engine, "tank", 3);

        let mut game_overs = Vec::new();
        let mut updates_after_end = 0;
        for _ in 0..100 {
            for update in step(&mut engine, &clock) {
                match update.event {
                    RoomEvent::GameOver { outcome } => game_overs.push(outcome),
                    RoomEvent::StateUpdate(_) if !game_overs.is_empty() => updates_after_end += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(game_overs, vec![Outcome::Victory]);
        assert_eq!(updates_after_end, 0);

        // Intents against the ended room change nothing.
        engine.handle_event(GameEvent::UseAbility {
            conn_id: "tank".to_string(),
            class_tag: "Tank".to_string(),
        });
        assert!(engine.registry().room("ABCD").unwrap().shield.is_none());

        clock.advance(5_000);
        assert!(engine.tick().is_empty());
        let room = engine.registry().room("ABCD").expect("fresh room");
        assert!(!room.ended);
        assert!(room.players.is_empty());
        assert_eq!(room.boss.current_health(), 30);
        assert_eq!(engine.registry().room_code_for("tank"), None);

        join(&mut engine, "tank", "Tank", "ABCD");
        assert_eq!(step(&mut engine, &clock).len(), 1);
    }

    #[test]
    fn finished_rooms_nobody_rejoins_are_released() {
        let (mut engine, clock) = engine(quiet_tuning());
        for i in 0..50 {
            let code = format!("R{i:03}");
            join(&mut engine, &format!("c{i}"), "Tank", &code);
            engine.registry_mut().room_mut(&code).unwrap().boss.set_health(0);
        }

        let over = step(&mut engine, &clock)
            .iter()
            .filter(|u| matches!(u.event, RoomEvent::GameOver { .. }))
            .count();
        assert_eq!(over, 50);
        assert_eq!(engine.registry().room_count(), 50);

        clock.advance(5_000);
        engine.tick();
        for _ in 0..100 {
            assert!(step(&mut engine, &clock).is_empty());
        }
        assert_eq!(engine.registry().room_count(), 0);
        assert!(engine.resets.is_empty());
    }

    #[test]
    fn defeat_is_announced_when_everyone_is_down() {
        let (mut engine, clock) = engine(quiet_tuning());
        join(&mut engine, "a", "Healer", "DOWN");
        join(&mut engine, "b", "Sniper", "DOWN");
        for player in engine
            .registry_mut()
            .room_mut("DOWN")
            .unwrap()
            .players
            .values_mut()
        {
            player.health = 0;
        }

        let updates = step(&mut engine, &clock);
        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates[0].event,
            RoomEvent::GameOver {
                outcome: Outcome::Defeat
            }
        ));
        assert!(step(&mut engine, &clock).is_empty());
    }

    #[test]
    fn ability_spends_shared_charge() {
        let (mut engine, _clock) = engine(quiet_tuning());
        join(&mut engine, "t", "Tank", "CHRG");
        engine.registry_mut().room_mut("CHRG").unwrap().shared_charge = 4;

        for _ in 0..2 {
            engine.handle_event(GameEvent::UseAbility {
                conn_id: "t".to_string(),
                class_tag: "Tank".to_string(),
            });
        }
        let room = engine.registry().room("CHRG").unwrap();
        assert_eq!(room.shared_charge, 1);
        assert!(room.shield.is_some());
    }

    /// Rng that panics the first time it is asked for randomness.
    struct PanicsOnce(bool);

    impl RngCore for PanicsOnce {
        fn next_u32(&mut self) -> u32 {
            if std::mem::replace(&mut self.0, false) {
                panic!("rng exploded");
            }
            7
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.next_u32())
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.next_u32() as u8);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn panicking_room_is_isolated_and_replaced() {
        let mut tuning = quiet_tuning();
        // Certain barrage, so every room tick draws an angle from the rng.
        tuning.boss.barrage_chance = 1.0;
        let clock = ManualClock::default();
        let mut engine = RaidEngine::new(
            clock.clone(),
            PanicsOnce(false),
            tuning,
            Duration::from_millis(5_000),
        );
        for (conn, code) in [("a", "ONE"), ("b", "TWO")] {
            engine.handle_event(GameEvent::Join {
                conn_id: conn.to_string(),
                class_tag: "Tank".to_string(),
                room_code: code.to_string(),
            });
        }
        engine.rng.0 = true;

        clock.advance(TICK_MS);
        let updates = engine.tick();
        assert_eq!(updates.len(), 1, "only the healthy room reports");
        assert!(matches!(updates[0].event, RoomEvent::StateUpdate(_)));
        let survivor = updates[0].room_code.to_string();
        let crashed = if survivor == "ONE" { "TWO" } else { "ONE" };
        assert!(engine.registry().room(crashed).unwrap().ended);

        // Replaced on the following tick without waiting for the reset delay.
        clock.advance(TICK_MS);
        engine.tick();
        let replaced = engine.registry().room(crashed).unwrap();
        assert!(!replaced.ended);
        assert!(replaced.players.is_empty());
        assert!(engine.registry().room(&survivor).unwrap().players.len() == 1);
    }
}
