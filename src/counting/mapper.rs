//! Map stage: one unit count per character and per word.

use crate::error::Result;
use std::fmt;
use std::io::{BufRead, Write};

pub const CHAR_PREFIX: &str = "CHAR_";
pub const WORD_PREFIX: &str = "WORD_";

/// Key of a count record. Its wire form is `CHAR_<c>` or `WORD_<w>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CountKey {
    Char(char),
    Word(String),
}

impl CountKey {
    /// Parses the wire form. A `CHAR_` key must carry exactly one character.
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(rest) = key.strip_prefix(CHAR_PREFIX) {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(CountKey::Char(c)),
                _ => None,
            }
        } else {
            key.strip_prefix(WORD_PREFIX)
                .filter(|w| !w.is_empty())
                .map(|w| CountKey::Word(w.to_string()))
        }
    }
}

impl fmt::Display for CountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountKey::Char(c) => write!(f, "{CHAR_PREFIX}{c}"),
            CountKey::Word(w) => write!(f, "{WORD_PREFIX}{w}"),
        }
    }
}

/// Emissions for one input line, every occurrence separately.
///
/// Trailing whitespace is dropped first. Characters come first (spaces and
/// punctuation included), then the whitespace-separated words.
pub fn map_line(line: &str) -> impl Iterator<Item = (CountKey, u64)> + '_ {
    let line = line.trim_end();
    let chars = line.chars().map(|c| (CountKey::Char(c), 1));
    let words = line
        .split_whitespace()
        .map(|w| (CountKey::Word(w.to_string()), 1));
    chars.chain(words)
}

/// Streams `reader` line by line and writes `<key>\t<value>` records.
/// Returns the number of records written.
pub fn run_mapper<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<usize> {
    let mut emitted = 0;
    for line in reader.lines() {
        let line = line?;
        for (key, value) in map_line(&line) {
            writeln!(writer, "{key}\t{value}")?;
            emitted += 1;
        }
    }
    writer.flush()?;
    Ok(emitted)
}
