use docx_conformity::ExtractionRecord;
use docx_conformity::analysis::{is_effectively_empty, sanitize};

fn records(descriptions: &[&str]) -> Vec<ExtractionRecord> {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| ExtractionRecord {
            description: d.to_string(),
            source_table_index: i + 1,
        })
        .collect()
}

#[test]
fn empty_detection() {
    assert!(is_effectively_empty(""));
    assert!(is_effectively_empty("  \t\n"));
    assert!(is_effectively_empty("\u{200B}\u{FEFF} \u{00AD}"));
    assert!(is_effectively_empty("\u{200C}\u{200D}\u{2060}\u{180E}"));
    assert!(!is_effectively_empty("\u{200B}x"));
    assert!(!is_effectively_empty("."));
}

#[test]
fn removes_empties_when_counts_reconcile() {
    // V = 2, E = 3, nao_conforme = 5
    let input = records(&["a", "\u{200B}", "b", " ", "\u{FEFF}"]);
    let (kept, outcome) = sanitize(5, input);

    let descriptions: Vec<&str> = kept.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, ["a", "b"]);
    assert_eq!(kept[1].source_table_index, 3);
    assert_eq!(outcome.empty, 3);
    assert_eq!(outcome.non_empty, 2);
    assert_eq!(outcome.removed, 3);
    assert!(outcome.reconciled());
}

#[test]
fn leaves_records_when_counts_do_not_reconcile() {
    for nao_conforme in [0, 2, 3, 4, 6, 10] {
        let input = records(&["a", "\u{200B}", "b", " ", "\u{FEFF}"]);
        let (kept, outcome) = sanitize(nao_conforme, input.clone());
        assert_eq!(kept, input, "nao_conforme={nao_conforme}");
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.discrepancy, nao_conforme as i64 - 5);
        assert!(!outcome.reconciled());
    }
}

#[test]
fn nothing_to_remove() {
    let input = records(&["a", "b"]);
    let (kept, outcome) = sanitize(2, input.clone());
    assert_eq!(kept, input);
    assert_eq!(outcome.removed, 0);
    assert!(outcome.reconciled());

    let (kept, outcome) = sanitize(0, Vec::new());
    assert!(kept.is_empty());
    assert!(outcome.reconciled());
}

#[test]
fn more_descriptions_than_markers() {
    let input = records(&["a", "b", "c"]);
    let (kept, outcome) = sanitize(1, input);
    assert_eq!(kept.len(), 3);
    assert_eq!(outcome.discrepancy, -2);
}
