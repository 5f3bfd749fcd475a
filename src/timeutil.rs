// ===============================
// src/timeutil.rs
// ===============================
use chrono::{DateTime, Utc};

const UNITS: [(i64, &str, &str); 4] = [
    (86_400, "day", "days"),
    (3_600, "hour", "hours"),
    (60, "min", "mins"),
    (1, "sec", "secs"),
];

// Full names used when only a single unit is shown ("21 seconds").
const LONG_UNITS: [&str; 4] = ["day", "hour", "minute", "second"];

/// Elapsed time between two instants, rendered with the two largest non-zero
/// units: "2 days 3 hours", "5 mins 12 secs". A lone unit uses its full name:
/// "21 seconds", "3 minutes".
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let mut secs = (end - start).num_seconds().max(0);

    let mut parts: Vec<(usize, i64)> = Vec::with_capacity(2);
    for (idx, (unit_secs, _, _)) in UNITS.iter().enumerate() {
        let count = secs / unit_secs;
        if count > 0 {
            parts.push((idx, count));
            secs -= count * unit_secs;
        }
        if parts.len() == 2 {
            break;
        }
    }

    match parts.as_slice() {
        [] => "0 seconds".to_string(),
        [(idx, count)] => {
            let name = LONG_UNITS[*idx];
            if *count == 1 {
                format!("1 {name}")
            } else {
                format!("{count} {name}s")
            }
        }
        [(i1, c1), (i2, c2)] => {
            let label = |idx: usize, count: i64| {
                let (_, one, many) = UNITS[idx];
                if count == 1 {
                    one
                } else {
                    many
                }
            };
            format!("{c1} {} {c2} {}", label(*i1, *c1), label(*i2, *c2))
        }
        _ => unreachable!(),
    }
}
