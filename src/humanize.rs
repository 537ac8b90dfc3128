use chrono::{DateTime, Utc};

const BYTE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// `"12.34s"` below a minute, otherwise `"1d 2h 3m 4s"` with leading zero
/// units left out.
pub fn human_time(seconds: f64) -> String {
    // pick the format from the value that is actually printed
    let rounded = (seconds * 100.0).round() / 100.0;
    if rounded < 60.0 {
        return format!("{:.2}s", rounded);
    }

    let whole = rounded as u64;
    let days = whole / 86_400;
    let hours = whole % 86_400 / 3_600;
    let minutes = whole % 3_600 / 60;
    let secs = whole % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    out.push_str(&format!("{}m {}s", minutes, secs));
    out
}

pub fn human_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} {}", bytes, BYTE_UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, BYTE_UNITS[unit])
}

/// ISO-8601 UTC timestamp truncated to the second.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn current_iso_timestamp() -> String {
    iso_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn it_formats_short_durations_in_seconds() {
        assert_eq!(human_time(0.0), "0.00s");
        assert_eq!(human_time(2.3), "2.30s");
        assert_eq!(human_time(12.341), "12.34s");
        assert_eq!(human_time(59.994), "59.99s");
    }

    #[test]
    fn it_switches_to_minutes_when_seconds_round_up_to_sixty() {
        assert_eq!(human_time(59.996), "1m 0s");
        assert_eq!(human_time(3_599.996), "1h 0m 0s");
    }

    #[test]
    fn it_formats_long_durations_in_units() {
        assert_eq!(human_time(60.0), "1m 0s");
        assert_eq!(human_time(3_725.9), "1h 2m 5s");
        assert_eq!(human_time(90_061.0), "1d 1h 1m 1s");
        assert_eq!(human_time(86_400.0), "1d 0h 0m 0s");
    }

    #[test]
    fn it_formats_bytes_in_binary_units() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(1536), "1.50 KiB");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(human_bytes(u64::MAX), "16777216.00 TiB");
    }

    #[test]
    fn it_truncates_timestamps_to_the_second() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(iso_timestamp(at), "2024-03-09T07:05:01Z");
    }
}
