//! Primitives for writing iCalendar content lines.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Maximum number of octets on one physical line, excluding the line break.
pub const FOLD_LIMIT: usize = 75;
/// Line terminator required by the iCalendar grammar.
pub const CRLF: &str = "\r\n";

static DATE_FORMAT: &str = "%Y%m%d";
static DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
static UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Fold a logical content line into physical lines.
///
/// The first line holds at most [`FOLD_LIMIT`] octets, every continuation starts with
/// a line break and a single space and holds at most `FOLD_LIMIT - 1` further octets.
/// Fold points never split a UTF-8 sequence, so a line may be cut a few octets early.
pub fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_LIMIT {
        return line.to_string();
    }
    let mut folded = String::with_capacity(line.len() + line.len() / FOLD_LIMIT * 3);
    let mut rest = line;
    let mut limit = FOLD_LIMIT;
    while rest.len() > limit {
        let mut split = limit;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        let (head, tail) = rest.split_at(split);
        folded.push_str(head);
        folded.push_str(CRLF);
        folded.push(' ');
        rest = tail;
        limit = FOLD_LIMIT - 1;
    }
    folded.push_str(rest);
    folded
}

/// Undo [`fold_line`] on a whole document.
pub fn unfold(content: &str) -> String {
    content.replace("\r\n ", "")
}

/// Escape a TEXT value.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(character),
        }
    }
    escaped
}

/// Format a date as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a floating (or zone-qualified) local date and time as `YYYYMMDDTHHMMSS`.
pub fn format_date_time(date: NaiveDate, time: NaiveTime) -> String {
    date.and_time(time).format(DATE_TIME_FORMAT).to_string()
}

/// Format a UTC instant as `YYYYMMDDTHHMMSSZ`.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use crate::format::{
        escape_text, fold_line, format_date, format_date_time, format_utc, unfold, FOLD_LIMIT,
    };

    #[test]
    fn test_fold_line_short() {
        let line = "SUMMARY:🍏 Matavfall";
        assert_eq!(fold_line(line), line);
        let exact = "X".repeat(FOLD_LIMIT);
        assert_eq!(fold_line(&exact), exact);
    }

    #[test]
    fn test_fold_line_ascii() {
        let line = format!("DESCRIPTION:{}", "a".repeat(200));
        let folded = fold_line(&line);
        let physical: Vec<&str> = folded.split("\r\n").collect();
        assert_eq!(physical[0].len(), 75);
        for continuation in &physical[1..] {
            assert!(continuation.starts_with(' '));
            assert!(continuation.len() <= 75);
        }
        assert_eq!(physical[1].len(), 75);
        assert_eq!(unfold(&folded), line);
    }

    #[test]
    fn test_fold_line_keeps_multibyte_sequences() {
        let line = format!("SUMMARY:{}", "ø🗑️å".repeat(30));
        let folded = fold_line(&line);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= FOLD_LIMIT);
        }
        assert!(folded.split("\r\n").count() > 1);
        assert_eq!(unfold(&folded), line);
    }

    #[test]
    fn test_fold_line_is_idempotent_below_limit() {
        let folded = fold_line("VERSION:2.0");
        assert_eq!(fold_line(&folded), folded);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(
            escape_text("Knyt en pose, så\nkr. 65; C:\\"),
            "Knyt en pose\\, så\\nkr. 65\\; C:\\\\"
        );
        assert_eq!(escape_text("line\r\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_timestamps() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(format_date(date), "20260107");
        let time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(format_date_time(date, time), "20260107T070000");
        let instant = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(format_utc(instant), "20260203T040506Z");
    }
}
