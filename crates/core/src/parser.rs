//! Streaming transcript parser.
//!
//! Recovers a well-formed sequence of [`Entry`] values from the line-oriented
//! export format. A header line opens an entry; lines that fail the header
//! grammar extend the open entry's body; the next header (or end of input)
//! seals it. The parser is single-pass, holds at most one open entry, and
//! never fails on malformed content: bad headers and unattributable lines are
//! dropped, because real-world exports routinely contain artifacts.

use crate::entry::{Entry, normalize_line};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::io::BufRead;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Progress callback invoked as `(lines_consumed, lines_total)` after each
/// consumed line. Observational only; not part of the entry contract.
pub type ProgressSink = Box<dyn FnMut(usize, usize)>;

/// Header grammar: `[D/M/Y, H:MM(:SS)( AM|PM)] sender: body`.
///
/// Case-insensitivity is only observable on the AM/PM marker; the sender
/// capture is non-greedy, so it stops at the first colon boundary.
fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\[(\d{1,2}/\d{1,2}/\d{2,4}),\s*(\d{1,2}:\d{2}(?::\d{2})?\s*(?:AM|PM)?)\]\s*(.*?):\s?(.*)$")
            .unwrap()
    })
}

/// Resolve a `D/M/Y` date token with mandatory day-first precedence.
///
/// Two-digit years follow the strftime `%y` convention: 00-68 map to 20xx,
/// 69-99 to 19xx.
fn resolve_date(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split('/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_token = parts.next()?;
    let year: i32 = year_token.parse().ok()?;
    let year = if year_token.len() <= 2 {
        if year <= 68 { 2000 + year } else { 1900 + year }
    } else {
        year
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve an `H:MM(:SS)` token with an optional trailing AM/PM marker.
///
/// Marked hours must be 1-12 (12 AM is midnight, 12 PM is noon); bare hours
/// are 0-23.
fn resolve_time(token: &str) -> Option<NaiveTime> {
    let token = token.trim();
    let lower = token.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(stripped) = lower.strip_suffix("am") {
        (stripped.trim_end(), Some(false))
    } else if let Some(stripped) = lower.strip_suffix("pm") {
        (stripped.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            if is_pm { hour % 12 + 12 } else { hour % 12 }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, second)
}

fn resolve_timestamp(date_token: &str, time_token: &str) -> Option<NaiveDateTime> {
    Some(NaiveDateTime::new(resolve_date(date_token)?, resolve_time(time_token)?))
}

/// Classification of a single normalized, non-blank line
enum LineKind {
    /// Valid header; opens a new entry
    Header(Entry),
    /// Matched the header grammar but the date/time is not a valid calendar
    /// moment; the line's content is lost
    MalformedHeader,
    /// Anything else; extends the open entry or is dropped
    Continuation(String),
}

fn classify(line: &str) -> LineKind {
    match header_regex().captures(line) {
        Some(caps) => match resolve_timestamp(&caps[1], &caps[2]) {
            Some(timestamp) => LineKind::Header(Entry::new(timestamp, &caps[3], &caps[4])),
            None => LineKind::MalformedHeader,
        },
        None => LineKind::Continuation(line.to_string()),
    }
}

/// Lazy, single-pass iterator of sealed entries over a transcript stream.
///
/// Yielding is one-entry-delayed relative to recognition: an entry is
/// returned the moment the *next* valid header is seen, or at end of input.
pub struct EntryParser<R: BufRead> {
    lines: std::io::Lines<R>,
    current: Option<Entry>,
    consumed: usize,
    total: usize,
    progress: Option<ProgressSink>,
    done: bool,
}

impl<R: BufRead> EntryParser<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), current: None, consumed: 0, total: 0, progress: None, done: false }
    }

    /// Attach a progress sink for a known-length input.
    pub fn with_progress(mut self, lines_total: usize, sink: impl FnMut(usize, usize) + 'static) -> Self {
        self.total = lines_total;
        self.progress = Some(Box::new(sink));
        self
    }

    /// Number of raw lines consumed so far
    pub fn lines_consumed(&self) -> usize {
        self.consumed
    }

    fn seal_current(&mut self) -> Option<Entry> {
        self.current.take()
    }
}

impl<R: BufRead> Iterator for EntryParser<R> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if self.done {
            return None;
        }

        loop {
            let raw = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    // Fail-soft: a read error ends the stream early instead
                    // of aborting the program.
                    warn!(error = %e, "transcript read failed, stopping parse");
                    self.done = true;
                    return self.seal_current();
                }
                None => {
                    self.done = true;
                    return self.seal_current();
                }
            };

            self.consumed += 1;
            if let Some(sink) = self.progress.as_mut() {
                sink(self.consumed, self.total);
            }

            let line = normalize_line(&raw);
            if line.is_empty() {
                // Blank lines neither open nor extend an entry; an interior
                // blank line inside a message is unrecoverable.
                continue;
            }

            match classify(&line) {
                LineKind::Header(entry) => {
                    let sealed = self.current.replace(entry);
                    if sealed.is_some() {
                        return sealed;
                    }
                }
                LineKind::MalformedHeader => {
                    debug!(line = self.consumed, "dropping header with unresolvable timestamp");
                    let sealed = self.seal_current();
                    if sealed.is_some() {
                        return sealed;
                    }
                }
                LineKind::Continuation(text) => match self.current.as_mut() {
                    Some(entry) => entry.push_line(&text),
                    None => debug!(line = self.consumed, "dropping unattributable line"),
                },
            }
        }
    }
}
