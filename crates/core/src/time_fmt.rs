// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable durations for status output.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Format seconds as `"5s"`, `"2m"`, `"1h30m"` or `"3d"`.
///
/// Minutes are shown alongside hours only when non-zero.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        s if s < MINUTE => format!("{}s", s),
        s if s < HOUR => format!("{}m", s / MINUTE),
        s if s < DAY => match (s % HOUR) / MINUTE {
            0 => format!("{}h", s / HOUR),
            m => format!("{}h{}m", s / HOUR, m),
        },
        s => format!("{}d", s / DAY),
    }
}

/// Millisecond variant of [`format_elapsed`]
pub fn format_elapsed_ms(ms: u64) -> String {
    format_elapsed(ms / 1000)
}

/// Age of an optional epoch-ms stamp relative to `now_ms`, or `"-"` if unset
pub fn format_since(stamp_ms: Option<u64>, now_ms: u64) -> String {
    match stamp_ms {
        Some(stamp) => format!("{} ago", format_elapsed_ms(now_ms.saturating_sub(stamp))),
        None => "-".to_string(),
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
