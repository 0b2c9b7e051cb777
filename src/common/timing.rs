// src/common/timing.rs

use core::time::Duration;

// Delays are nominal values for the Si1132 at room temperature. The chip has no
// ready line, so every wait below is a fixed sleep through the injected timer.

// === Command Protocol ===

/// Pause between NOP writes while draining a stale response counter.
pub const DRAIN_RETRY_INTERVAL: Duration = Duration::from_millis(5);
/// Upper bound on NOP writes before the drain gives up.
pub const DRAIN_MAX_ATTEMPTS: usize = 50;

/// Pause between re-issues of an unacknowledged command.
pub const COMMAND_RETRY_INTERVAL: Duration = Duration::from_millis(5);
/// Re-issues after the first write before the command counts as timed out.
pub const COMMAND_MAX_RETRIES: usize = 10;

// === Reset ===

/// Settle time after the reset command and after the hardware key write.
pub const RESET_SETTLE: Duration = Duration::from_millis(20);

// === Measurement ===

/// Wait after ALS_FORCE before reading results.
/// Covers the worst-case ADC integration at the highest gain.
pub const MEASUREMENT_SETTLE: Duration = Duration::from_millis(1000);

// === Sleep Polling ===

/// Pause between CHIP_STAT polls in `wait_until_sleep`.
pub const SLEEP_POLL_INTERVAL: Duration = Duration::from_millis(5);
/// CHIP_STAT polls before `wait_until_sleep` reports the chip busy.
pub const SLEEP_POLL_MAX_ATTEMPTS: usize = 20;
