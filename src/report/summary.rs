use std::fmt::Write;

use serde::Serialize;

use crate::analysis::{CountTotals, ReportResult};

pub const CONFORME_LABEL: &str = "Conforme";
pub const NAO_CONFORME_LABEL: &str = "Não conforme";

pub const CONFORME_COLOR: [u8; 3] = [0x4C, 0xAF, 0x50];
pub const NAO_CONFORME_COLOR: [u8; 3] = [0xF4, 0x43, 0x36];

/// One slice of the conformity proportion chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Proportion {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
    pub color: [u8; 3],
}

impl Proportion {
    /// Slice caption, e.g. `80.0% (12)`.
    pub fn caption(&self) -> String {
        format!("{:.1}% ({})", self.percent, self.count)
    }
}

/// Chart data for the two totals. Percentages are 0 when nothing was counted.
pub fn proportions(totals: &CountTotals) -> [Proportion; 2] {
    let total = totals.total();
    let percent = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    };
    [
        Proportion {
            label: CONFORME_LABEL,
            count: totals.conforme,
            percent: percent(totals.conforme),
            color: CONFORME_COLOR,
        },
        Proportion {
            label: NAO_CONFORME_LABEL,
            count: totals.nao_conforme,
            percent: percent(totals.nao_conforme),
            color: NAO_CONFORME_COLOR,
        },
    ]
}

/// Human-readable report: counts, proportions, descriptions and warnings.
pub fn summary_text(result: &ReportResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Contagem");
    let _ = writeln!(out, "  {CONFORME_LABEL}: {}", result.totals.conforme);
    let _ = writeln!(out, "  {NAO_CONFORME_LABEL}: {}", result.totals.nao_conforme);

    if result.totals.total() > 0 {
        let _ = writeln!(out, "\nProporção");
        for p in proportions(&result.totals) {
            let _ = writeln!(out, "  {}: {}", p.label, p.caption());
        }
    }

    let _ = writeln!(out, "\nDescrições encontradas ({})", result.extractions.len());
    if result.extractions.is_empty() {
        let _ = writeln!(out, "  (nenhuma)");
    }
    for record in &result.extractions {
        let _ = writeln!(
            out,
            "  [tabela {}] {}",
            record.source_table_index, record.description
        );
    }

    let mut warnings = Vec::new();
    for anomaly in &result.anomalies {
        warnings.push(anomaly.to_string());
    }
    if let Some(outcome) = &result.sanitize {
        if outcome.removed > 0 {
            warnings.push(format!("{} descrições vazias removidas", outcome.removed));
        } else if outcome.discrepancy != 0 {
            warnings.push(format!(
                "descrições não conferem com as não conformidades (diferença {})",
                outcome.discrepancy
            ));
        }
    }
    if !warnings.is_empty() {
        let _ = writeln!(out, "\nAvisos");
        for w in warnings {
            let _ = writeln!(out, "  - {w}");
        }
    }

    out
}
