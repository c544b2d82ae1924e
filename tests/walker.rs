use docx_conformity::analysis::{
    AnnotationExtractor, MarkerClassifier, StructuralAnomaly, WalkOutput, Walker,
};
use docx_conformity::model::{Document, Paragraph, Run, Table, TableCell, TableRow};
use docx_conformity::{AnalysisOptions, CountTotals, analyze};

const RED: [u8; 3] = [0xFF, 0x00, 0x00];

fn described(text: &str) -> Paragraph {
    Paragraph::new(vec![Run::plain("Descrição: "), Run::colored(text, RED)])
}

fn text(t: &str) -> Paragraph {
    Paragraph::new(vec![Run::plain(t)])
}

fn cell(paragraphs: Vec<Paragraph>, tables: Vec<Table>) -> TableCell {
    TableCell { paragraphs, tables }
}

fn table(rows: Vec<Vec<TableCell>>) -> Table {
    Table {
        rows: rows.into_iter().map(|cells| TableRow { cells }).collect(),
    }
}

/// `depth` levels of nesting below a root table; the innermost cell holds `inner`.
fn nested(depth: usize, inner: Paragraph) -> Table {
    let mut t = table(vec![vec![cell(vec![inner], vec![])]]);
    for _ in 0..depth {
        t = table(vec![vec![cell(vec![], vec![t])]]);
    }
    t
}

fn descriptions(doc: &Document, options: &AnalysisOptions) -> Vec<(String, usize)> {
    analyze(doc, options)
        .extractions
        .into_iter()
        .map(|r| (r.description, r.source_table_index))
        .collect()
}

#[test]
fn zero_tables() {
    let result = analyze(&Document::default(), &AnalysisOptions::default());
    assert_eq!(result.totals, CountTotals::default());
    assert!(result.extractions.is_empty());
    assert!(result.anomalies.is_empty());
}

#[test]
fn tables_are_numbered_from_one() {
    let doc = Document::new(vec![
        table(vec![vec![cell(vec![described("a")], vec![])]]),
        table(vec![vec![cell(vec![text("nada")], vec![])]]),
        table(vec![vec![cell(vec![described("c")], vec![])]]),
    ]);
    assert_eq!(
        descriptions(&doc, &AnalysisOptions::default()),
        [("a".to_string(), 1), ("c".to_string(), 3)]
    );
}

#[test]
fn nested_tables_inherit_top_level_index() {
    for depth in 1..6 {
        let doc = Document::new(vec![
            table(vec![vec![cell(vec![text("x")], vec![])]]),
            nested(depth, described("fundo")),
        ]);
        assert_eq!(
            descriptions(&doc, &AnalysisOptions::default()),
            [("fundo".to_string(), 2)],
            "depth {depth}"
        );
    }
}

#[test]
fn cell_paragraphs_come_before_nested_tables() {
    let inner = table(vec![vec![cell(vec![described("interno")], vec![])]]);
    let doc = Document::new(vec![table(vec![
        vec![
            cell(vec![described("primeiro")], vec![inner]),
            cell(vec![described("segundo")], vec![]),
        ],
        vec![cell(vec![described("terceiro")], vec![])],
    ])]);
    let order: Vec<String> = descriptions(&doc, &AnalysisOptions::default())
        .into_iter()
        .map(|(d, _)| d)
        .collect();
    assert_eq!(order, ["primeiro", "interno", "segundo", "terceiro"]);
}

#[test]
fn reordering_rows_reorders_records() {
    let rows = |names: &[&str]| {
        table(
            names
                .iter()
                .map(|n| vec![cell(vec![described(n)], vec![])])
                .collect(),
        )
    };
    let options = AnalysisOptions::default();
    let forward = Document::new(vec![rows(&["a", "b", "c"])]);
    let backward = Document::new(vec![rows(&["c", "b", "a"])]);
    let mut f: Vec<String> = descriptions(&forward, &options)
        .into_iter()
        .map(|(d, _)| d)
        .collect();
    let b: Vec<String> = descriptions(&backward, &options)
        .into_iter()
        .map(|(d, _)| d)
        .collect();
    f.reverse();
    assert_eq!(f, b);
}

#[test]
fn counts_accumulate_across_nesting() {
    let inner = table(vec![vec![cell(
        vec![
            Paragraph::new(vec![Run::plain("✔️"), Run::plain(" "), Run::plain("Conforme")]),
            text("Não conforme"),
        ],
        vec![],
    )]]);
    let doc = Document::new(vec![table(vec![vec![cell(
        vec![text("Não conforme"), text("Não conforme")],
        vec![inner],
    )]])]);
    let result = analyze(&doc, &AnalysisOptions::default());
    assert_eq!(
        result.totals,
        CountTotals {
            conforme: 1,
            nao_conforme: 3
        }
    );
}

#[test]
fn too_deep_table_is_skipped_and_siblings_survive() {
    let deep = nested(3, text("Não conforme"));
    let doc = Document::new(vec![table(vec![vec![
        cell(vec![text("Não conforme")], vec![deep]),
        cell(vec![described("irmão")], vec![]),
    ]])]);
    let options = AnalysisOptions::default().with_max_depth(2);
    let result = analyze(&doc, &options);

    assert_eq!(result.totals.nao_conforme, 1);
    assert_eq!(result.extractions.len(), 1);
    assert_eq!(result.extractions[0].description, "irmão");
    assert_eq!(
        result.anomalies,
        [StructuralAnomaly {
            table_index: 1,
            depth: 3,
            limit: 2
        }]
    );

    let unbounded = analyze(&doc, &AnalysisOptions::default());
    assert_eq!(unbounded.totals.nao_conforme, 2);
    assert!(unbounded.anomalies.is_empty());
}

#[test]
fn max_depth_zero_scans_only_top_level() {
    let doc = Document::new(vec![table(vec![vec![cell(
        vec![text("Não conforme")],
        vec![nested(0, text("Não conforme")), nested(0, text("Não conforme"))],
    )]])]);
    let result = analyze(&doc, &AnalysisOptions::default().with_max_depth(0));
    assert_eq!(result.totals.nao_conforme, 1);
    assert_eq!(result.anomalies.len(), 2);
}

#[test]
fn sanitizer_runs_on_analysis_output() {
    let doc = Document::new(vec![table(vec![
        vec![cell(vec![text("Não conforme"), described("real")], vec![])],
        vec![cell(vec![text("Não conforme"), described("\u{200B}")], vec![])],
    ])]);
    let result = analyze(&doc, &AnalysisOptions::default());
    assert_eq!(result.extractions.len(), 1);
    assert_eq!(result.totals.nao_conforme, 2);
    assert_eq!(result.sanitize.as_ref().map(|s| s.removed), Some(1));

    let raw = analyze(&doc, &AnalysisOptions::default().with_sanitize(false));
    assert_eq!(raw.extractions.len(), 2);
    assert!(raw.sanitize.is_none());
}

#[test]
fn result_is_stable_across_runs() {
    // Sequential and parallel walks merge in table order; repeated runs agree.
    let doc = Document::new((0..40)
        .map(|i| {
            table(vec![vec![cell(
                vec![text("Não conforme"), described(&format!("item {i}"))],
                vec![nested(i % 4, described(&format!("aninhado {i}")))],
            )]])
        })
        .collect());
    let options = AnalysisOptions::default();
    let first = analyze(&doc, &options);
    for _ in 0..5 {
        assert_eq!(analyze(&doc, &options), first);
    }
    let indices: Vec<usize> = first
        .extractions
        .iter()
        .map(|r| r.source_table_index)
        .collect();
    let mut sorted = indices.clone();
    sorted.sort();
    assert_eq!(indices, sorted);
    assert_eq!(first.extractions.len(), 80);
    assert_eq!(first.extractions[1].description, "aninhado 0");
}

#[test]
fn walk_matches_table_by_table_merge() {
    // With the `parallel` feature `walk` scans tables on the rayon pool; the
    // merged output must equal scanning them one by one in order.
    let doc = Document::new(
        (0..64)
            .map(|i| {
                table(vec![
                    vec![cell(
                        vec![text("Não conforme"), described(&format!("item {i}"))],
                        vec![nested(i % 5, described(&format!("aninhado {i}")))],
                    )],
                    vec![cell(
                        vec![Paragraph::new(vec![
                            Run::plain("✔"),
                            Run::plain(" "),
                            Run::plain("Conforme"),
                        ])],
                        vec![],
                    )],
                ])
            })
            .collect(),
    );
    let options = AnalysisOptions::default();
    let classifier = MarkerClassifier::new(&options.glyphs);
    let extractor = AnnotationExtractor::new(&options.label, &options.annotation_colors);
    let walker = Walker::new(&classifier, &extractor, 4);

    let sequential = WalkOutput::merge(
        doc.tables
            .iter()
            .enumerate()
            .map(|(i, t)| walker.scan_table(i + 1, t))
            .collect(),
    );
    let walked = walker.walk(&doc);

    assert_eq!(walked, sequential);
    assert_eq!(walked.totals.conforme, 64);
    assert_eq!(walked.totals.nao_conforme, 64);
    // i % 5 == 4 puts the innermost table at depth 5, past the limit of 4.
    assert_eq!(walked.anomalies.len(), 12);
    assert!(
        walked
            .anomalies
            .windows(2)
            .all(|w| w[0].table_index < w[1].table_index)
    );
}
