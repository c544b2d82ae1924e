//! Conformity scan over a parsed document.
//!
//! [`analyze`] walks every top-level table (and the tables nested inside its
//! cells), counts "Conforme" / "Não conforme" markers per paragraph, collects
//! red annotations written after the description label, and finally runs the
//! empty-description reconciliation.

mod annotations;
mod markers;
mod options;
mod sanitize;
mod walker;

use std::ops::AddAssign;

use serde::Serialize;

use crate::model::Document;

pub use annotations::AnnotationExtractor;
pub use markers::{MarkerClassifier, count_nao_conforme};
pub use options::{
    AnalysisOptions, AnnotationColor, DEFAULT_GLYPHS, DEFAULT_LABEL, DEFAULT_MAX_DEPTH,
};
pub use sanitize::{SanitizeOutcome, is_effectively_empty, sanitize};
pub use walker::{StructuralAnomaly, TableScan, WalkOutput, Walker};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CountTotals {
    pub conforme: usize,
    pub nao_conforme: usize,
}

impl CountTotals {
    pub fn total(&self) -> usize {
        self.conforme + self.nao_conforme
    }
}

impl AddAssign for CountTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.conforme += rhs.conforme;
        self.nao_conforme += rhs.nao_conforme;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractionRecord {
    pub description: String,
    /// 1-based index of the top-level table the description was found under.
    pub source_table_index: usize,
}

/// Outcome of one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportResult {
    pub totals: CountTotals,
    pub extractions: Vec<ExtractionRecord>,
    pub anomalies: Vec<StructuralAnomaly>,
    /// `None` when sanitizing was disabled.
    pub sanitize: Option<SanitizeOutcome>,
}

/// Scan `doc` and build the report. Never fails: any tree yields a result.
pub fn analyze(doc: &Document, options: &AnalysisOptions) -> ReportResult {
    let classifier = MarkerClassifier::new(&options.glyphs);
    let extractor = AnnotationExtractor::new(&options.label, &options.annotation_colors);
    let walker = Walker::new(&classifier, &extractor, options.max_depth);

    let WalkOutput {
        totals,
        extractions,
        mut anomalies,
    } = walker.walk(doc);

    // Tables the reader dropped sit below a table the walker already skipped
    // unless max_depth reaches past the reader's own limit.
    let dropped = doc
        .skipped_tables
        .iter()
        .filter(|t| t.depth <= options.max_depth)
        .map(|t| StructuralAnomaly {
            table_index: t.table_index,
            depth: t.depth,
            limit: t.limit,
        });
    anomalies.extend(dropped);
    anomalies.sort_by_key(|a| a.table_index);

    if !anomalies.is_empty() {
        log::warn!(
            "{} nested tables skipped; totals exclude their contents",
            anomalies.len()
        );
    }

    let (extractions, sanitize_outcome) = if options.sanitize {
        let (kept, outcome) = sanitize(totals.nao_conforme, extractions);
        (kept, Some(outcome))
    } else {
        (extractions, None)
    };

    ReportResult {
        totals,
        extractions,
        anomalies,
        sanitize: sanitize_outcome,
    }
}
