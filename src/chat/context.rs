use chrono::{DateTime, Local, TimeZone};

/// Queries containing any of these words get a time-context system
/// message prepended to the request.
const TIME_KEYWORDS: [&str; 5] = ["time", "date", "day", "month", "year"];

/// Case-insensitive substring match against the time keyword set.
pub fn needs_time_context(query: &str) -> bool {
    let query = query.to_lowercase();
    TIME_KEYWORDS.iter().any(|word| query.contains(word))
}

/// Formats `now` as the time-context message body.
pub fn time_context<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Day: {}, Date: {}, Time: {}",
        now.format("%A"),
        now.format("%d %B %Y"),
        now.format("%H:%M:%S")
    )
}

/// The time-context message for the current wall-clock moment in the
/// process's local timezone.
pub fn current_time_context() -> String {
    time_context(Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn it_matches_time_keywords_case_insensitively() {
        assert!(needs_time_context("What's the Date today?"));
        assert!(needs_time_context("WHAT TIME IS IT"));
        assert!(needs_time_context("which year are we in"));
        assert!(needs_time_context("what day comes after monday"));
    }

    #[test]
    fn it_matches_keywords_as_substrings() {
        // "today" contains "day"
        assert!(needs_time_context("any plans today?"));
    }

    #[test]
    fn it_ignores_queries_without_time_keywords() {
        assert!(!needs_time_context("Tell me a joke"));
        assert!(!needs_time_context(""));
    }

    #[test]
    fn it_formats_a_fixed_clock() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = tz.with_ymd_and_hms(2026, 1, 5, 9, 8, 7).unwrap();
        assert_eq!(
            time_context(now),
            "Day: Monday, Date: 05 January 2026, Time: 09:08:07"
        );
    }
}
