use chrono::Duration;

/// This is the standard timestamp format of the session table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format used for report boundaries and chart axis labels.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compact elapsed-time rendering for the status line.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

/// Breaks a stored fractional-hour duration into whole hours, minutes and
/// seconds. The fraction is converted to integer seconds by truncation, so
/// sub-second noise from the float representation never rounds upward.
pub fn decompose_hours(hours: f64) -> (i64, i64, i64) {
    let total_seconds = (hours * 3600.0) as i64;
    let (h, remainder) = (total_seconds / 3600, total_seconds % 3600);
    (h, remainder / 60, remainder % 60)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{decompose_hours, format_duration};

    #[test]
    fn decomposes_whole_and_fractional_hours() {
        assert_eq!(decompose_hours(1.5), (1, 30, 0));
        assert_eq!(decompose_hours(0.0), (0, 0, 0));
        assert_eq!(decompose_hours(2.0), (2, 0, 0));
        // 1s = 1/3600h, float round trip must not lose the second
        assert_eq!(decompose_hours(3601.0 / 3600.0), (1, 0, 1));
    }

    #[test]
    fn formats_duration_compactly() {
        assert_eq!(format_duration(Duration::seconds(59)), "59s");
        assert_eq!(format_duration(Duration::seconds(61)), "1m1s");
        assert_eq!(format_duration(Duration::seconds(3600 + 90)), "1h1m30s");
    }
}
