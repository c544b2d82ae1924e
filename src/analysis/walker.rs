use std::fmt;

use serde::Serialize;

use crate::model::{Document, Table};

use super::annotations::AnnotationExtractor;
use super::markers::MarkerClassifier;
use super::{CountTotals, ExtractionRecord};

/// A nested table that was not scanned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StructuralAnomaly {
    pub table_index: usize,
    /// Nesting level of the skipped table (1 = directly inside a top-level table).
    pub depth: usize,
    pub limit: usize,
}

impl fmt::Display for StructuralAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table {}: nested table at depth {} exceeds limit {} and was skipped",
            self.table_index, self.depth, self.limit
        )
    }
}

/// Everything found under one top-level table.
#[derive(Debug, Default)]
pub struct TableScan {
    pub table_index: usize,
    pub totals: CountTotals,
    pub extractions: Vec<ExtractionRecord>,
    pub anomalies: Vec<StructuralAnomaly>,
}

/// Merged result of a whole document walk, in traversal order.
#[derive(Debug, Default, PartialEq)]
pub struct WalkOutput {
    pub totals: CountTotals,
    pub extractions: Vec<ExtractionRecord>,
    pub anomalies: Vec<StructuralAnomaly>,
}

impl WalkOutput {
    /// Fold per-table scans in table-index order.
    pub fn merge(mut scans: Vec<TableScan>) -> Self {
        scans.sort_by_key(|s| s.table_index);
        let mut out = WalkOutput::default();
        for scan in scans {
            out.totals += scan.totals;
            out.extractions.extend(scan.extractions);
            out.anomalies.extend(scan.anomalies);
        }
        out
    }
}

pub struct Walker<'a> {
    classifier: &'a MarkerClassifier,
    extractor: &'a AnnotationExtractor,
    max_depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(
        classifier: &'a MarkerClassifier,
        extractor: &'a AnnotationExtractor,
        max_depth: usize,
    ) -> Self {
        Self {
            classifier,
            extractor,
            max_depth,
        }
    }

    /// Scan one top-level table; nested tables report under the same index.
    pub fn scan_table(&self, table_index: usize, table: &Table) -> TableScan {
        let mut scan = TableScan {
            table_index,
            ..TableScan::default()
        };
        self.visit_table(table, 0, &mut scan);
        log::debug!(
            "Table {table_index}: conforme={} nao_conforme={} descriptions={}",
            scan.totals.conforme,
            scan.totals.nao_conforme,
            scan.extractions.len()
        );
        scan
    }

    fn visit_table(&self, table: &Table, depth: usize, scan: &mut TableScan) {
        for row in &table.rows {
            for cell in &row.cells {
                for paragraph in &cell.paragraphs {
                    scan.totals += self.classifier.classify(paragraph);
                    if let Some(description) = self.extractor.extract(paragraph) {
                        log::debug!("Table {}: description {description:?}", scan.table_index);
                        scan.extractions.push(ExtractionRecord {
                            description,
                            source_table_index: scan.table_index,
                        });
                    }
                }
                for nested in &cell.tables {
                    let nested_depth = depth + 1;
                    if nested_depth > self.max_depth {
                        let anomaly = StructuralAnomaly {
                            table_index: scan.table_index,
                            depth: nested_depth,
                            limit: self.max_depth,
                        };
                        log::warn!("{anomaly}");
                        scan.anomalies.push(anomaly);
                        continue;
                    }
                    self.visit_table(nested, nested_depth, scan);
                }
            }
        }
    }

    /// Scan every top-level table, numbering them from 1.
    #[cfg(not(feature = "parallel"))]
    pub fn walk(&self, doc: &Document) -> WalkOutput {
        let scans = doc
            .tables
            .iter()
            .enumerate()
            .map(|(i, table)| self.scan_table(i + 1, table))
            .collect();
        WalkOutput::merge(scans)
    }

    /// Scan every top-level table, numbering them from 1. Tables are scanned
    /// concurrently; the merge restores document order.
    #[cfg(feature = "parallel")]
    pub fn walk(&self, doc: &Document) -> WalkOutput {
        use rayon::prelude::*;

        let scans = doc
            .tables
            .par_iter()
            .enumerate()
            .map(|(i, table)| self.scan_table(i + 1, table))
            .collect();
        WalkOutput::merge(scans)
    }
}
