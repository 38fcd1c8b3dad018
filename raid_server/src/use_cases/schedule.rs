// Room replacement queue driven by the tick clock.

use std::collections::HashMap;

/// Pending room replacements keyed by room code.
///
/// Scheduling a code that is already pending moves its due time.
#[derive(Debug, Default)]
pub struct ScheduledResets {
    due: HashMap<String, u64>,
}

impl ScheduledResets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, room_code: &str, due_at: u64) {
        self.due.insert(room_code.to_string(), due_at);
    }

    pub fn due_at(&self, room_code: &str) -> Option<u64> {
        self.due.get(room_code).copied()
    }

    pub fn len(&self) -> usize {
        self.due.len()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }

    /// Removes and returns every room code due at or before `now`, in code order.
    pub fn take_due(&mut self, now: u64) -> Vec<String> {
        let mut ready: Vec<String> = self
            .due
            .iter()
            .filter(|(_, due_at)| **due_at <= now)
            .map(|(code, _)| code.clone())
            .collect();
        ready.sort();
        for code in &ready {
            self.due.remove(code);
        }
        ready
    }
}
