//! Transcript file discovery.
//!
//! An exported chat folder contains a single `.txt` transcript next to its
//! media files. When several candidates exist the alphabetically-last file
//! name wins; exports number their parts, so the last name is the main chat.
//! (Documented quirk of the export layout, preserved on purpose.)

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locate the transcript file inside a chat folder.
///
/// Missing folder or no `.txt` candidate is the only fatal condition in the
/// core; callers report it and exit non-zero.
pub fn find_transcript(folder: &Path) -> Result<PathBuf> {
    if !folder.is_dir() {
        return Err(Error::NotADirectory(folder.to_path_buf()));
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .collect();

    candidates.sort();
    debug!(folder = %folder.display(), candidates = candidates.len(), "transcript discovery");

    candidates.pop().ok_or_else(|| Error::NoTranscript(folder.to_path_buf()))
}

/// Count the lines of a transcript, for the progress denominator.
pub fn count_lines(path: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader.lines().map_while(|line| line.ok()).count())
}
