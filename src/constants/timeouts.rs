use std::time::Duration;

/// Retention windows for broadcasts posted from the button panel
pub const NOW_BROADCAST_RETENTION: Duration = Duration::from_secs(5 * 60);
pub const NIGHT_BROADCAST_RETENTION: Duration = Duration::from_secs(5 * 60);
pub const OCCUPY_ALERT_RETENTION: Duration = Duration::from_secs(10 * 60);

/// Purge settings used when a button channel is reconciled (defaults, can be overridden via env vars)
pub const DEFAULT_PURGE_LIMIT: u8 = 20;
pub const DEFAULT_PURGE_PACING_MS: u64 = 1000;

/// Discord returns at most 100 messages per history request
pub const MAX_HISTORY_PAGE: u8 = 100;

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{}秒", total_secs)
    } else if total_secs < 3600 {
        format!("{}分", total_secs / 60)
    } else {
        format!("{}時間", total_secs / 3600)
    }
}
