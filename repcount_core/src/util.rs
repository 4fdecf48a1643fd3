//! Common time and integer helpers.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Frame period in microseconds for a loop rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// `sum / n` rounded to nearest, halves rounding up. `n == 0` yields 0.
#[inline]
pub fn div_round_half_up(sum: u32, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let (sum, n) = (u64::from(sum), u64::from(n));
    ((2 * sum + n) / (2 * n)) as u32
}

/// Format a duration as `mm:ss` (minutes keep growing past 59).
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
