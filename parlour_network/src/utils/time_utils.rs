use chrono::{TimeZone, Utc};

/// Current wall-clock time as a Unix timestamp
pub fn now() -> i64
{
    Utc::now().timestamp()
}

/// Human-readable rendering of a Unix timestamp, as used in RPL_CREATED
pub fn format_timestamp(ts: i64) -> String
{
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%a %b %e %Y at %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch() {
        assert_eq!(format_timestamp(0), "Thu Jan  1 1970 at 00:00:00 UTC");
    }
}
