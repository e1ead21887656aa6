//! Human-readable duration formatting
//!
//! Consistent duration display for track lengths and listening totals across
//! the dashboard, the shell and flat-text snapshots.

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// Format a track duration as `M:SS`, or `H:MM:SS` once it reaches an hour.
///
/// # Examples
///
/// ```
/// use playwise_core::human_time::format_duration;
///
/// assert_eq!(format_duration(0), "0:00");
/// assert_eq!(format_duration(354), "5:54");
/// assert_eq!(format_duration(3661), "1:01:01");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let secs = seconds % SECS_PER_MINUTE;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Parse a duration written by [`format_duration`].
///
/// Accepts `SS`, `M:SS` and `H:MM:SS`. Returns `None` for anything else,
/// including minute or second fields of 60 or more in the colon forms and
/// totals that do not fit in a `u64`.
pub fn parse_duration(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let fields: Vec<u64> = parts
        .iter()
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match fields.as_slice() {
        [secs] => Some(*secs),
        [minutes, secs] if *secs < SECS_PER_MINUTE => {
            minutes.checked_mul(SECS_PER_MINUTE)?.checked_add(*secs)
        }
        [hours, minutes, secs] if *minutes < 60 && *secs < SECS_PER_MINUTE => hours
            .checked_mul(SECS_PER_HOUR)?
            .checked_add(minutes * SECS_PER_MINUTE + secs),
        _ => None,
    }
}

/// Format an accumulated listening total as `N min S sec`.
pub fn format_listening_time(seconds: u64) -> String {
    format!(
        "{} min {} sec",
        seconds / SECS_PER_MINUTE,
        seconds % SECS_PER_MINUTE
    )
}
