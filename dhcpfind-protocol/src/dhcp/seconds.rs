//! Human readable breakdown of lease, renewal and rebinding times

/// Format a duration in seconds as a parenthesized breakdown
///
/// Durations under a minute produce an empty string, so the result can be
/// appended directly after `"<n> seconds"`.
///
/// ```
/// use dhcpfind_protocol::dhcp::seconds::format_duration;
///
/// assert_eq!(format_duration(59), "");
/// assert_eq!(format_duration(90), " (1:30 minutes)");
/// assert_eq!(format_duration(86400), " (1:00:00:00 days)");
/// ```
pub fn format_duration(seconds: u32) -> String {
    const MINUTE: u32 = 60;
    const HOUR: u32 = 60 * MINUTE;
    const DAY: u32 = 24 * HOUR;

    if seconds < MINUTE {
        String::new()
    } else if seconds < HOUR {
        format!(" ({}:{:02} minutes)", seconds / MINUTE, seconds % MINUTE)
    } else if seconds < DAY {
        format!(
            " ({}:{:02}:{:02} hours)",
            seconds / HOUR,
            (seconds / MINUTE) % 60,
            seconds % MINUTE
        )
    } else {
        format!(
            " ({}:{:02}:{:02}:{:02} days)",
            seconds / DAY,
            (seconds / HOUR) % 24,
            (seconds / MINUTE) % 60,
            seconds % MINUTE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(59), "");
        assert_eq!(format_duration(60), " (1:00 minutes)");
        assert_eq!(format_duration(90), " (1:30 minutes)");
        assert_eq!(format_duration(3599), " (59:59 minutes)");
        assert_eq!(format_duration(3661), " (1:01:01 hours)");
        assert_eq!(format_duration(86399), " (23:59:59 hours)");
        assert_eq!(format_duration(86400), " (1:00:00:00 days)");
        assert_eq!(format_duration(90000), " (1:01:00:00 days)");
        assert_eq!(format_duration(u32::MAX), " (49710:06:28:15 days)");
    }
}
