//! Poll windows travel as Go duration text (`1m30s`, `500ms`, `1.5µs`) since
//! that is what the store's parser accepts.

use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

pub fn format_poll_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return with_fraction(nanos, NANOS_PER_MICRO, "µs");
    }
    if nanos < NANOS_PER_SEC {
        return with_fraction(nanos, NANOS_PER_MILLI, "ms");
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs_nanos =
        u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());
    let seconds = with_fraction(secs_nanos, NANOS_PER_SEC, "s");

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}")
    } else {
        seconds
    }
}

fn with_fraction(nanos: u128, unit: u128, suffix: &str) -> String {
    let whole = nanos / unit;
    let fraction = nanos % unit;
    if fraction == 0 {
        return format!("{whole}{suffix}");
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}{suffix}", digits.trim_end_matches('0'))
}
