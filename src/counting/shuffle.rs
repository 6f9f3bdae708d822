//! In-process stand-in for the sort/shuffle step between map and reduce.
//!
//! Emissions are folded straight into the reducer's ordered map, so the
//! grouping a batch framework would do between processes happens here in
//! memory.

use crate::counting::mapper::{CountKey, map_line};
use crate::counting::reducer::{Reducer, Report};
use crate::error::Result;
use log::info;
use std::io::{BufRead, Write};

/// Folds any stream of emissions into `reducer`.
pub fn shuffle_into<I>(emissions: I, reducer: &mut Reducer)
where
    I: IntoIterator<Item = (CountKey, u64)>,
{
    for (key, value) in emissions {
        reducer.add_key(&key, value);
    }
}

/// Map, shuffle and reduce `reader` in one pass, then write the report.
pub fn count_in_process<R: BufRead, W: Write>(reader: R, writer: W) -> Result<Report> {
    let mut reducer = Reducer::default();
    let mut lines = 0usize;
    for line in reader.lines() {
        let line = line?;
        shuffle_into(map_line(&line), &mut reducer);
        lines += 1;
    }
    let report = reducer.report();
    info!(
        "counted {} line(s): {} character(s), {} word(s)",
        lines,
        report.character_total(),
        report.word_total()
    );
    report.write_to(writer)?;
    Ok(report)
}
