use std::time::Duration;

use chrono::{DateTime, Utc};

const NANOS_PER_SEC: i128 = 1_000_000_000;

fn nanos_since_epoch(t: DateTime<Utc>) -> i128 {
    i128::from(t.timestamp()) * NANOS_PER_SEC + i128::from(t.timestamp_subsec_nanos())
}

/// Start of the fixed window containing `now`: `now` truncated down to the
/// nearest multiple of `interval` since the Unix epoch.
///
/// Windows are aligned to the epoch, not to limiter creation. A caller that
/// times admissions around a boundary can fit up to twice the capacity into
/// two adjacent windows; that is an accepted property of fixed-window
/// counting. Pre-epoch instants floor towards the earlier boundary.
pub fn window_start(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let interval = interval.as_nanos() as i128;
    if interval <= 0 {
        return now;
    }
    let now_ns = nanos_since_epoch(now);
    let start_ns = now_ns - now_ns.rem_euclid(interval);
    DateTime::from_timestamp(
        start_ns.div_euclid(NANOS_PER_SEC) as i64,
        start_ns.rem_euclid(NANOS_PER_SEC) as u32,
    )
    .unwrap_or(now)
}
