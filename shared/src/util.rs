/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Format a millisecond timestamp as a `YYYY-MM-DD` date string (UTC)
///
/// Falls back to the epoch date for out-of-range values instead of panicking;
/// stored timestamps are always in range in practice.
pub fn date_string(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .date_naive()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_string_formats_utc_date() {
        // 2024-01-01 00:00:00 UTC
        assert_eq!(date_string(1_704_067_200_000), "2024-01-01");
    }
}
