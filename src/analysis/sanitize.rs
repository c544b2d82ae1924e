use serde::Serialize;

use super::ExtractionRecord;

/// Code points that render as nothing but survive `str::trim`.
const INVISIBLE: &[char] = &[
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space
    '\u{180E}', // mongolian vowel separator
    '\u{00AD}', // soft hyphen
];

/// True when nothing visible is left once whitespace and invisible code
/// points are removed.
pub fn is_effectively_empty(description: &str) -> bool {
    description
        .chars()
        .all(|c| c.is_whitespace() || INVISIBLE.contains(&c))
}

/// What the reconciliation check saw and did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    pub empty: usize,
    pub non_empty: usize,
    pub removed: usize,
    /// `nao_conforme - non_empty - empty`; zero when every non-conformity is
    /// matched by a description.
    pub discrepancy: i64,
}

impl SanitizeOutcome {
    pub fn reconciled(&self) -> bool {
        self.discrepancy == 0
    }
}

/// Remove empty descriptions when they exactly account for the gap between
/// the non-conformity count and the visible descriptions.
///
/// Some checklists carry one invisible red run per "Não conforme" marker.
/// Those are only dropped when `nao_conforme - non_empty == empty`; any other
/// mismatch has a different cause and the records are left untouched.
pub fn sanitize(
    nao_conforme: usize,
    extractions: Vec<ExtractionRecord>,
) -> (Vec<ExtractionRecord>, SanitizeOutcome) {
    let empty = extractions
        .iter()
        .filter(|r| is_effectively_empty(&r.description))
        .count();
    let non_empty = extractions.len() - empty;
    let gap = nao_conforme as i64 - non_empty as i64;

    if empty > 0 && gap == empty as i64 {
        log::info!(
            "Removed {empty} empty descriptions ({nao_conforme} non-conformities, {non_empty} descriptions)"
        );
        let kept = extractions
            .into_iter()
            .filter(|r| !is_effectively_empty(&r.description))
            .collect();
        let outcome = SanitizeOutcome {
            empty,
            non_empty,
            removed: empty,
            discrepancy: 0,
        };
        return (kept, outcome);
    }

    let discrepancy = gap - empty as i64;
    if discrepancy != 0 {
        log::info!(
            "Descriptions do not reconcile with non-conformities: {nao_conforme} markers, {non_empty} descriptions, {empty} empty (difference {discrepancy})"
        );
    }
    let outcome = SanitizeOutcome {
        empty,
        non_empty,
        removed: 0,
        discrepancy,
    };
    (extractions, outcome)
}
