/// Formats a nanosecond sensor timestamp (time since boot) as
/// HH:MM:SS.mmm for log lines.
pub fn format_timestamp_ns(timestamp_ns: i64) -> String {
    if timestamp_ns < 0 {
        return format!("invalid timestamp: {}", timestamp_ns);
    }

    let total_ms = timestamp_ns / 1_000_000;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let secs = total_secs % 60;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_ns() {
        assert_eq!(format_timestamp_ns(0), "00:00:00.000");
        assert_eq!(format_timestamp_ns(1_500_000_000), "00:00:01.500");
        // 1h 2m 3s 45ms
        assert_eq!(format_timestamp_ns(3_723_045_000_000), "01:02:03.045");
        assert_eq!(format_timestamp_ns(-1), "invalid timestamp: -1");
    }
}
