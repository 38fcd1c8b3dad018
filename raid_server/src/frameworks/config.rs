use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("RAID_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub fn tick_interval() -> Duration {
    let millis = env::var("RAID_TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(50);
    Duration::from_millis(millis)
}

pub fn room_reset_delay() -> Duration {
    let millis = env::var("RAID_ROOM_RESET_DELAY_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
// World task -> fan-out; the world waits rather than drop an update.
pub const UPDATE_CHANNEL_CAPACITY: usize = 1024;
// Per room, so one busy room never crowds out another.
pub const ROOM_BROADCAST_CAPACITY: usize = 128;
pub const CONNECTION_QUEUE_CAPACITY: usize = 32;
