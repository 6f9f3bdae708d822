//! Reduce stage: sum counts per key, then report characters and words.

use crate::MalformedPolicy;
use crate::counting::mapper::CountKey;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

/// Splits `key<TAB>value`.
///
/// The split is on the last tab, so a key for the tab character itself
/// (`CHAR_` followed by a tab) survives.
pub fn parse_record(line: &str) -> Option<(&str, u64)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (key, value) = line.rsplit_once('\t')?;
    if key.is_empty() {
        return None;
    }
    let value = value.trim().parse::<u64>().ok()?;
    Some((key, value))
}

/// Accumulates counts keyed by their wire form. Sums start at zero.
#[derive(Debug, Default)]
pub struct Reducer {
    counts: BTreeMap<String, u64>,
    policy: MalformedPolicy,
    lines: usize,
    skipped: usize,
}

impl Reducer {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn add(&mut self, key: &str, value: u64) {
        let total = self.counts.entry(key.to_string()).or_insert(0);
        *total = total.saturating_add(value);
    }

    pub fn add_key(&mut self, key: &CountKey, value: u64) {
        self.add(&key.to_string(), value);
    }

    /// Feeds one `key<TAB>value` line. Blank lines are ignored.
    pub fn accept_line(&mut self, line: &str) -> Result<()> {
        self.lines += 1;
        if line.trim().is_empty() {
            return Ok(());
        }
        match parse_record(line) {
            Some((key, value)) => {
                self.add(key, value);
                Ok(())
            }
            None => match self.policy {
                MalformedPolicy::Skip => {
                    warn!("skipping malformed line {}: {:?}", self.lines, line);
                    self.skipped += 1;
                    Ok(())
                }
                MalformedPolicy::Fail => Err(Error::MalformedInput {
                    line: self.lines,
                    content: line.to_string(),
                }),
            },
        }
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Lines dropped under [`MalformedPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sorted sections with the key prefixes stripped.
    /// Keys that do not parse as a [`CountKey`] are kept in
    /// [`Reducer::counts`] but not reported.
    pub fn report(&self) -> Report {
        let mut report = Report::default();
        for (key, &total) in &self.counts {
            match CountKey::parse(key) {
                Some(CountKey::Char(c)) => report.characters.push((c.to_string(), total)),
                Some(CountKey::Word(w)) => report.words.push((w, total)),
                None => debug!("unreported key {key:?}"),
            }
        }
        report
    }
}

/// Character and word totals, each in lexicographic order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub characters: Vec<(String, u64)>,
    pub words: Vec<(String, u64)>,
}

impl Report {
    pub fn character_total(&self) -> u64 {
        self.characters.iter().map(|(_, n)| n).sum()
    }

    pub fn word_total(&self) -> u64 {
        self.words.iter().map(|(_, n)| n).sum()
    }

    pub fn character(&self, c: &str) -> Option<u64> {
        lookup(&self.characters, c)
    }

    pub fn word(&self, w: &str) -> Option<u64> {
        lookup(&self.words, w)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "=== Character Counts ===")?;
        for (c, total) in &self.characters {
            writeln!(writer, "{c}\t{total}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "=== Word Counts ===")?;
        for (w, total) in &self.words {
            writeln!(writer, "{w}\t{total}")?;
        }
        writer.flush()
    }
}

fn lookup(section: &[(String, u64)], key: &str) -> Option<u64> {
    section
        .binary_search_by(|(k, _)| k.as_str().cmp(key))
        .ok()
        .map(|i| section[i].1)
}

/// Reads every record from `reader`, then writes the report.
/// Nothing is written until the input is exhausted.
pub fn run_reducer<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    policy: MalformedPolicy,
) -> Result<Report> {
    let mut reducer = Reducer::new(policy);
    for line in reader.lines() {
        reducer.accept_line(&line?)?;
    }
    if reducer.skipped() > 0 {
        warn!("skipped {} malformed line(s)", reducer.skipped());
    }
    let report = reducer.report();
    report.write_to(writer)?;
    Ok(report)
}
