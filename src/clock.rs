use std::sync::OnceLock;
use std::time::Instant;

use async_bumperbot::ClockBackend;

static START: OnceLock<Instant> = OnceLock::new();

/// Milliseconds since the first clock read of the process.
pub struct StdClock;

impl ClockBackend for StdClock {
    fn now() -> u32 {
        let elapsed = START.get_or_init(Instant::now).elapsed();
        u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX)
    }

    fn ticks_per_milli() -> u32 {
        1
    }
}
