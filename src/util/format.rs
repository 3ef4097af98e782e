// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Human-readable formatting helpers.
//!
//! Small pure functions used by the display layer and by draft
//! validation: file sizes, relative timestamps, email shape checks,
//! and character-safe truncation.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count using 1024-based units, rounded to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// Format a timestamp relative to `now` ("2 hours ago", "just now").
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();

    let intervals: [(&str, i64); 7] = [
        ("year", 31_536_000),
        ("month", 2_592_000),
        ("week", 604_800),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
        ("second", 1),
    ];

    for (unit, seconds_in_unit) in intervals {
        let interval = seconds.div_euclid(seconds_in_unit);
        if interval >= 1 {
            let plural = if interval == 1 { "" } else { "s" };
            return format!("{} {}{} ago", interval, unit, plural);
        }
    }

    "just now".to_string()
}

/// Check that an email has a plausible `local@domain.tld` shape.
///
/// Matches the widget's historical acceptance: non-empty local part, a
/// single `@`, no whitespace, and a dot inside the domain with at least
/// one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };

    let domain: Vec<char> = domain.chars().collect();
    if local.is_empty() || domain.len() < 3 || domain.contains(&'@') {
        return false;
    }

    // A dot with at least one character before and after it.
    domain[1..domain.len() - 1].contains(&'.')
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5_242_880), "5 MB");
        assert_eq!(format_file_size(1_073_741_824), "1 GB");
    }

    #[test]
    fn test_format_relative_time() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let two_hours = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(format_relative_time(two_hours, now), "2 hours ago");

        let one_day = Utc.with_ymd_and_hms(2025, 5, 31, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(one_day, now), "1 day ago");

        assert_eq!(format_relative_time(now, now), "just now");

        // Future timestamps also read as "just now".
        let future = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 30).unwrap();
        assert_eq!(format_relative_time(future, now), "just now");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@com."));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@@example.com"));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
