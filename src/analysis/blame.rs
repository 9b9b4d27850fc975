//! Parser for `git blame` textual output.
//!
//! Blame formats drift across tool versions and configurations (column
//! widths, optional line numbers, UTC offsets), so parsing is deliberately
//! loose: take the first parenthesized group on each line, locate the
//! embedded `YYYY-MM-DD HH:MM:SS` timestamp inside it, and treat whatever
//! precedes the timestamp as the author. Lines that do not fit are
//! skipped, never fatal.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

static GROUP_RE: OnceLock<Regex> = OnceLock::new();
static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();

fn group_re() -> &'static Regex {
    GROUP_RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("valid regex"))
}

fn timestamp_re() -> &'static Regex {
    TIMESTAMP_RE
        .get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").expect("valid regex"))
}

/// Authorship of a single physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLineRecord {
    /// Author name as printed by the tool. May legitimately be empty.
    pub author: String,
    /// The tool's already-localized timestamp; no timezone conversion is
    /// applied to the offset that may follow it in the source text.
    pub timestamp: NaiveDateTime,
}

/// Parse one line of blame output. `None` when the line carries no
/// parenthesized group or no timestamp inside it.
pub fn parse_line(line: &str) -> Option<BlameLineRecord> {
    let group = group_re().captures(line)?.get(1)?.as_str();
    let ts = timestamp_re().find(group)?;
    let timestamp = NaiveDateTime::parse_from_str(ts.as_str(), "%Y-%m-%d %H:%M:%S").ok()?;
    let author = group[..ts.start()].trim().to_string();
    Some(BlameLineRecord { author, timestamp })
}

/// Parse a full blame dump into one record per parseable physical line.
pub fn parse(raw: &str) -> Vec<BlameLineRecord> {
    raw.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_author_and_timestamp() {
        let rec = parse_line("(Jane Doe 2021-03-04 10:00:00 +0000 12) some code").unwrap();
        assert_eq!(rec.author, "Jane Doe");
        assert_eq!(rec.timestamp, ts(2021, 3, 4, 10, 0, 0));
    }

    #[test]
    fn tolerates_hash_prefix_and_trailing_content() {
        let line = "^4832fe2 (Ove Karlsen  2019-08-01 12:34:56 +0200  7)   let x = 1;";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.author, "Ove Karlsen");
        assert_eq!(rec.timestamp, ts(2019, 8, 1, 12, 34, 56));
    }

    #[test]
    fn empty_author_is_retained() {
        let rec = parse_line("( 2021-03-04 10:00:00 +0000 1) text").unwrap();
        assert_eq!(rec.author, "");
    }

    #[test]
    fn line_without_group_is_skipped() {
        assert!(parse_line("no parens here 2021-03-04 10:00:00").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn group_without_timestamp_is_skipped() {
        assert!(parse_line("call(foo) and more").is_none());
    }

    #[test]
    fn impossible_calendar_date_is_skipped() {
        // Shape matches but the instant does not exist.
        assert!(parse_line("(Jane 2021-13-40 25:61:61 +0000 1) x").is_none());
    }

    #[test]
    fn parse_handles_blank_trailing_lines() {
        let raw = "(A 2020-01-01 00:00:00 +0000 1) one\n\n(B 2020-01-02 00:00:00 +0000 2) two\n\n";
        let records = parse(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author, "A");
        assert_eq!(records[1].author, "B");
    }

    #[test]
    fn parse_is_idempotent() {
        let raw = "abc123 (Jane Doe 2021-03-04 10:00:00 +0000 1) fn main() {}\n\
                   abc123 (Jane Doe 2021-03-04 10:00:00 +0000 2) junk\n";
        assert_eq!(parse(raw), parse(raw));
    }
}
