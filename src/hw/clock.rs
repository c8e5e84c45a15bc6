//! Wall clock.
//!
//! The board has no RTC backup, so time starts at the firmware build time
//! (written by `build.rs`) and advances with the embassy time driver.

use embassy_time::{Duration, Instant, Timer};
use wristface::config::UTC_OFFSET_SECS;
use wristface::{TickUnit, TimeSample};

include!(concat!(env!("OUT_DIR"), "/build_time.rs"));

/// Seconds since the Unix epoch, as far as the board knows.
pub fn epoch_secs() -> i64 {
    BUILD_EPOCH.saturating_add(Instant::now().as_secs() as i64)
}

/// Current local time of day.
pub fn now() -> TimeSample {
    TimeSample::from_timestamp(epoch_secs(), UTC_OFFSET_SECS).unwrap_or(TimeSample::MIDNIGHT)
}

/// Sleep until the middle of the current wall-clock second.
pub async fn align_to_half_second() {
    let delay = TickUnit::phase_delay_ms(Instant::now().as_millis());
    Timer::after(Duration::from_millis(delay)).await;
}
