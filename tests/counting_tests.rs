use std::collections::HashMap;
use std::io::Cursor;
use symbios_lab::{
    Error, MalformedPolicy,
    counting::{CountKey, Reducer, count_in_process, map_line, run_mapper, run_reducer},
    counting::reducer::parse_record,
};

fn tally(line: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for (key, value) in map_line(line) {
        *counts.entry(key.to_string()).or_insert(0) += value;
    }
    counts
}

fn mapped(input: &str) -> String {
    let mut out = Vec::new();
    run_mapper(Cursor::new(input), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn reduced(input: &str) -> String {
    let mut out = Vec::new();
    run_reducer(Cursor::new(input), &mut out, MalformedPolicy::Skip).unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Mapper
// ============================================================================

#[test]
fn test_mapper_emits_every_unit() {
    let counts = tally("ab ab");
    let expected: HashMap<String, u64> = [
        ("CHAR_a", 2),
        ("CHAR_b", 2),
        ("CHAR_ ", 1),
        ("WORD_ab", 2),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(counts, expected);
}

#[test]
fn test_mapper_does_not_aggregate() {
    let emissions: Vec<_> = map_line("aa").collect();
    assert_eq!(
        emissions,
        vec![
            (CountKey::Char('a'), 1),
            (CountKey::Char('a'), 1),
            (CountKey::Word("aa".to_string()), 1),
        ]
    );
}

#[test]
fn test_mapper_strips_trailing_whitespace_only() {
    let counts = tally("  hi, there!  \t");
    assert_eq!(counts["CHAR_ "], 3);
    assert!(!counts.contains_key("CHAR_\t"));
    assert_eq!(counts["CHAR_,"], 1);
    assert_eq!(counts["CHAR_!"], 1);
    assert_eq!(counts["WORD_hi,"], 1);
    assert_eq!(counts["WORD_there!"], 1);
}

#[test]
fn test_mapper_wire_format() {
    assert_eq!(
        mapped("a b\n"),
        "CHAR_a\t1\nCHAR_ \t1\nCHAR_b\t1\nWORD_a\t1\nWORD_b\t1\n"
    );
    assert_eq!(mapped("\n\n"), "");
}

#[test]
fn test_count_key_parse() {
    assert_eq!(CountKey::parse("CHAR_x"), Some(CountKey::Char('x')));
    assert_eq!(CountKey::parse("CHAR_é"), Some(CountKey::Char('é')));
    assert_eq!(CountKey::parse("WORD_hello"), Some(CountKey::Word("hello".into())));
    assert_eq!(CountKey::parse("CHAR_xy"), None);
    assert_eq!(CountKey::parse("CHAR_"), None);
    assert_eq!(CountKey::parse("WORD_"), None);
    assert_eq!(CountKey::parse("LINE_1"), None);
}

// ============================================================================
// Reducer
// ============================================================================

#[test]
fn test_reducer_sums_by_key() {
    let out = reduced("CHAR_a\t1\nCHAR_a\t1\nWORD_ab\t1\nWORD_ab\t1\n");
    assert_eq!(
        out,
        "=== Character Counts ===\na\t2\n\n=== Word Counts ===\nab\t2\n"
    );
}

#[test]
fn test_reducer_accepts_unsorted_partial_sums() {
    let mut reducer = Reducer::default();
    for line in ["WORD_b\t3", "CHAR_z\t1", "WORD_a\t1", "WORD_b\t4", "CHAR_a\t10"] {
        reducer.accept_line(line).unwrap();
    }
    let report = reducer.report();

    assert_eq!(
        report.characters,
        vec![("a".to_string(), 10), ("z".to_string(), 1)]
    );
    assert_eq!(report.words, vec![("a".to_string(), 1), ("b".to_string(), 7)]);
    assert_eq!(reducer.counts().get("WORD_b"), Some(&7));
    assert_eq!(reducer.counts().get("WORD_missing"), None);
}

#[test]
fn test_reducer_empty_input_prints_headers() {
    assert_eq!(
        reduced(""),
        "=== Character Counts ===\n\n=== Word Counts ===\n"
    );
}

#[test]
fn test_reducer_keeps_but_hides_unknown_prefixes() {
    let mut reducer = Reducer::default();
    reducer.accept_line("LINE_7\t2").unwrap();
    reducer.accept_line("CHAR_q\t1").unwrap();
    reducer.accept_line("CHAR_qq\t5").unwrap();
    reducer.accept_line("WORD_\t3").unwrap();

    assert_eq!(reducer.counts().get("LINE_7"), Some(&2));
    assert_eq!(reducer.counts().get("CHAR_qq"), Some(&5));
    let report = reducer.report();
    assert_eq!(report.characters, vec![("q".to_string(), 1)]);
    assert!(report.words.is_empty());
}

#[test]
fn test_parse_record_splits_on_last_tab() {
    assert_eq!(parse_record("CHAR_\t\t1"), Some(("CHAR_\t", 1)));
    assert_eq!(parse_record("WORD_x\t12\r\n"), Some(("WORD_x", 12)));
    assert_eq!(parse_record("CHAR_ \t1"), Some(("CHAR_ ", 1)));
    assert_eq!(parse_record("no separator"), None);
    assert_eq!(parse_record("WORD_x\tmany"), None);
    assert_eq!(parse_record("WORD_x\t-1"), None);
    assert_eq!(parse_record("\t1"), None);
}

#[test]
fn test_tab_character_round_trips() {
    let report = {
        let mut out = Vec::new();
        let records = mapped("a\tb");
        run_reducer(Cursor::new(records), &mut out, MalformedPolicy::Fail).unwrap()
    };
    assert_eq!(report.character("\t"), Some(1));
    assert_eq!(report.word("a"), Some(1));
    assert_eq!(report.word("b"), Some(1));
}

#[test]
fn test_malformed_lines_skipped_by_default() {
    let mut reducer = Reducer::new(MalformedPolicy::Skip);
    reducer.accept_line("CHAR_a\t1").unwrap();
    reducer.accept_line("garbage").unwrap();
    reducer.accept_line("").unwrap();
    reducer.accept_line("CHAR_a\t2").unwrap();

    assert_eq!(reducer.skipped(), 1);
    assert_eq!(reducer.report().character("a"), Some(3));
}

#[test]
fn test_malformed_lines_fatal_when_strict() {
    let mut out = Vec::new();
    let result = run_reducer(
        Cursor::new("CHAR_a\t1\nbroken line\n"),
        &mut out,
        MalformedPolicy::Fail,
    );
    match result {
        Err(Error::MalformedInput { line, content }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "broken line");
        }
        other => panic!("expected malformed input error, got {:?}", other),
    }
    assert!(out.is_empty(), "nothing is written before input is exhausted");
}

// ============================================================================
// End to end
// ============================================================================

const PHRASE: &str = "to be or not to be";

#[test]
fn test_two_stage_pipeline() {
    let out = reduced(&mapped(PHRASE));
    let (chars, words) = out.split_once("\n\n").unwrap();

    assert_eq!(
        words,
        "=== Word Counts ===\nbe\t2\nnot\t1\nor\t1\nto\t2\n"
    );

    let char_sum: u64 = chars
        .lines()
        .skip(1)
        .map(|l| l.rsplit_once('\t').unwrap().1.parse::<u64>().unwrap())
        .sum();
    assert_eq!(char_sum, PHRASE.chars().count() as u64);
}

#[test]
fn test_in_process_matches_two_stage() {
    let input = "to be or not to be\nthat is the question\n\n  whether 'tis nobler\n";

    let mut in_process = Vec::new();
    let report = count_in_process(Cursor::new(input), &mut in_process).unwrap();

    assert_eq!(String::from_utf8(in_process).unwrap(), reduced(&mapped(input)));
    assert_eq!(report.word("to"), Some(2));
    assert_eq!(report.word("'tis"), Some(1));
}

#[test]
fn test_totals_match_input() {
    let input = "the quick brown fox\njumps over\tthe lazy dog  \n";
    let mut out = Vec::new();
    let report = count_in_process(Cursor::new(input), &mut out).unwrap();

    let expected_chars: usize = input.lines().map(|l| l.trim_end().chars().count()).sum();
    let expected_words: usize = input.lines().map(|l| l.split_whitespace().count()).sum();
    assert_eq!(report.character_total(), expected_chars as u64);
    assert_eq!(report.word_total(), expected_words as u64);
    assert_eq!(report.word("the"), Some(2));
}
