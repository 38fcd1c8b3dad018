// Shared fixtures for deterministic use-case tests.

use crate::domain::{Clock, RaidTuning};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock the test moves by hand; clones share the same time.
#[derive(Clone, Default)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

/// Default tuning with the boss barrage switched off.
pub(crate) fn quiet_tuning() -> RaidTuning {
    let mut tuning = RaidTuning::default();
    tuning.boss.barrage_chance = 0.0;
    tuning
}
