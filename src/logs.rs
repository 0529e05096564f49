// Local log console: a read-only query surface over the newline-delimited
// log export written by the "retrieve system logs" action. Everything here
// is pure and file-local; the interactive loop lives in `ui`.
//
// A log line looks like:
//
//     2024-01-01T00:00:00.000Z ORDERS CREATERESERVATION ERROR: Payment declined.
//
// i.e. a timestamp, then a tag segment of space-separated uppercase tokens
// running up to the first colon after the timestamp, then free-form message
// text. Filtering matches keywords against the tag set, never against the
// message.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// The file the "retrieve system logs" action writes and this console reads.
pub const LOG_EXPORT_FILE: &str = "opshub-logs.txt";

/// Shortest structurally valid line: a line must at least cover the
/// timestamp region before a tag segment can exist.
const MIN_LINE_LEN: usize = 23;

/// A structurally parsed log line. Tags are stored uppercased so matching
/// is a plain equality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub tags: Vec<String>,
    pub message: String,
}

impl LogEntry {
    /// Case-insensitive exact-token membership (no substring matching).
    pub fn has_tag(&self, keyword: &str) -> bool {
        let keyword = keyword.to_uppercase();
        self.tags.iter().any(|tag| *tag == keyword)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogParseError {
    #[error("line is shorter than the timestamp region")]
    TooShort,
    #[error("no tag delimiter (':') after the timestamp")]
    MissingDelimiter,
}

/// Parse one log line into its timestamp, tag set and message. Fails
/// explicitly instead of slicing blindly; filter queries drop failing lines
/// from their candidate set.
pub fn parse_line(line: &str) -> Result<LogEntry, LogParseError> {
    if line.len() < MIN_LINE_LEN {
        return Err(LogParseError::TooShort);
    }
    let (timestamp, rest) = line.split_once(' ').ok_or(LogParseError::MissingDelimiter)?;
    let (tag_segment, message) = rest.split_once(':').ok_or(LogParseError::MissingDelimiter)?;
    Ok(LogEntry {
        timestamp: timestamp.to_string(),
        tags: tag_segment
            .split_whitespace()
            .map(|tag| tag.to_uppercase())
            .collect(),
        message: message.trim_start().to_string(),
    })
}

/// Every line of the log export, oldest first, line terminators stripped.
/// A missing file is an empty log, not an error.
pub fn read_all(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// The last `count` lines in original order. A count beyond the total is
/// clamped to the total.
pub fn tail(lines: &[String], count: usize) -> &[String] {
    let count = count.min(lines.len());
    &lines[lines.len() - count..]
}

/// Lines whose tag set contains every keyword. Lines that fail structural
/// parsing are excluded from the candidate set for this query only.
pub fn filter_by_tags(lines: &[String], keywords: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| match parse_line(line) {
            Ok(entry) => keywords.iter().all(|keyword| entry.has_tag(keyword)),
            Err(_) => false,
        })
        .cloned()
        .collect()
}

/// One console command. The grammar:
///
/// ```text
/// read                       -> ReadAll
/// read <N>                   -> Tail(N), N a positive integer
/// read .filter <kw> [<kw>..] -> Filter(keywords)
/// exit                       -> Exit
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ReadAll,
    Tail(usize),
    Filter(Vec<String>),
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized command: {0}")]
    Unrecognized(String),
    #[error("log count must be a positive integer")]
    BadCount,
    #[error("log filter requires at least one keyword (format: read .filter <keywords>)")]
    MissingKeywords,
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let mut words = input.split_whitespace();
    let head = words.next().unwrap_or("");
    if head.eq_ignore_ascii_case("exit") {
        return Ok(Command::Exit);
    }
    if !head.eq_ignore_ascii_case("read") {
        return Err(CommandError::Unrecognized(input.trim().to_string()));
    }

    let args: Vec<&str> = words.collect();
    if args.is_empty() {
        return Ok(Command::ReadAll);
    }
    if args[0].eq_ignore_ascii_case(".filter") {
        let keywords: Vec<String> = args[1..].iter().map(|word| word.to_string()).collect();
        if keywords.is_empty() {
            return Err(CommandError::MissingKeywords);
        }
        return Ok(Command::Filter(keywords));
    }
    match args[0].parse::<usize>() {
        Ok(count) if count > 0 => Ok(Command::Tail(count)),
        _ => Err(CommandError::BadCount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_lines() -> Vec<String> {
        vec![
            "2024-01-01T00:00:00Z ERROR LOGIN: user not found".to_string(),
            "2024-01-01T00:00:01Z INFO SIGNUP: ok".to_string(),
        ]
    }

    #[test]
    fn parses_timestamp_tags_and_message() {
        let entry = parse_line("2024-01-01T00:00:00Z ERROR LOGIN: user not found").unwrap();
        assert_eq!(entry.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(entry.tags, vec!["ERROR", "LOGIN"]);
        assert_eq!(entry.message, "user not found");
    }

    #[test]
    fn tags_are_uppercased_and_matching_is_case_insensitive() {
        let entry = parse_line("2024-01-01T00:00:00Z orders CreateReservation: declined").unwrap();
        assert_eq!(entry.tags, vec!["ORDERS", "CREATERESERVATION"]);
        assert!(entry.has_tag("orders"));
        assert!(entry.has_tag("CREATERESERVATION"));
        assert!(!entry.has_tag("ORDER"));
    }

    #[test]
    fn short_or_undelimited_lines_fail_parsing() {
        assert_eq!(parse_line("too short"), Err(LogParseError::TooShort));
        assert_eq!(
            parse_line("2024-01-01T00:00:00Z no delimiter in this line"),
            Err(LogParseError::MissingDelimiter)
        );
    }

    #[test]
    fn colons_inside_the_timestamp_do_not_end_the_tag_segment() {
        let entry = parse_line("2024-01-01T10:30:00.000Z LOGGER: setup complete").unwrap();
        assert_eq!(entry.tags, vec!["LOGGER"]);
        assert_eq!(entry.message, "setup complete");
    }

    #[test]
    fn tail_returns_the_suffix_clamped_to_the_total() {
        let lines: Vec<String> = (0..5).map(|i| format!("line {}", i)).collect();
        assert_eq!(tail(&lines, 2), &lines[3..]);
        assert_eq!(tail(&lines, 5), &lines[..]);
        assert_eq!(tail(&lines, 50), &lines[..]);
    }

    #[test]
    fn filter_requires_every_keyword_as_a_tag() {
        let lines = sample_lines();

        let hits = filter_by_tags(&lines, &["ERROR".to_string()]);
        assert_eq!(hits, vec![lines[0].clone()]);

        let hits = filter_by_tags(&lines, &["LOGIN".to_string(), "ERROR".to_string()]);
        assert_eq!(hits, vec![lines[0].clone()]);

        let hits = filter_by_tags(&lines, &["SIGNUP".to_string(), "ERROR".to_string()]);
        assert!(hits.is_empty());
    }

    #[test]
    fn unparseable_lines_are_excluded_from_filtering() {
        let mut lines = sample_lines();
        lines.push("garbage".to_string());
        lines.push("2024-01-01T00:00:02Z ERROR SIGNUP no colon here at all".to_string());

        let hits = filter_by_tags(&lines, &["error".to_string()]);
        assert_eq!(hits, vec![lines[0].clone()]);
    }

    #[test]
    fn missing_log_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let lines = read_all(&dir.path().join("nope.txt")).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn read_all_strips_terminators_and_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        std::fs::write(&path, "first line\nsecond line\n").unwrap();
        assert_eq!(read_all(&path).unwrap(), vec!["first line", "second line"]);
    }

    #[test]
    fn command_grammar() {
        assert_eq!(parse_command("read"), Ok(Command::ReadAll));
        assert_eq!(parse_command("READ 50"), Ok(Command::Tail(50)));
        assert_eq!(
            parse_command("read .filter LOGIN ERROR"),
            Ok(Command::Filter(vec!["LOGIN".to_string(), "ERROR".to_string()]))
        );
        assert_eq!(parse_command("exit"), Ok(Command::Exit));

        // The whole command line is case-insensitive, including the
        // .filter token; keyword case only matters at match time.
        assert_eq!(
            parse_command("READ .FILTER ERROR"),
            Ok(Command::Filter(vec!["ERROR".to_string()]))
        );

        assert_eq!(parse_command("read 0"), Err(CommandError::BadCount));
        assert_eq!(parse_command("read -3"), Err(CommandError::BadCount));
        assert_eq!(parse_command("read fifty"), Err(CommandError::BadCount));
        assert_eq!(parse_command("read .filter"), Err(CommandError::MissingKeywords));
        assert_eq!(
            parse_command("destroy"),
            Err(CommandError::Unrecognized("destroy".to_string()))
        );
    }
}
