//! Conformity status markers.
//!
//! Checklists mark a line as compliant with a check-mark glyph followed by
//! the word "Conforme", and as non-compliant with the words "Não conforme".
//! Word splits these into runs unpredictably: glyph and word may share a run
//! or sit in separate runs with whitespace runs in between. Two detectors
//! cover the two layouts and their counts add up.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{UnicodeNormalization, is_nfc};

use crate::model::{Paragraph, Run};

use super::CountTotals;

static NAO_CONFORME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)não\s*conforme").expect("valid marker pattern"));

/// Non-blank runs examined after a glyph run.
const LOOKAHEAD_RUNS: usize = 3;

const CONFORME: &str = "conforme";

pub(crate) fn nfc(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Number of non-overlapping "não conforme" matches in `text`.
pub fn count_nao_conforme(text: &str) -> usize {
    NAO_CONFORME.find_iter(&nfc(text)).count()
}

pub struct MarkerClassifier {
    glyphs: Vec<String>,
}

impl MarkerClassifier {
    pub fn new<S: AsRef<str>>(glyphs: &[S]) -> Self {
        Self {
            glyphs: glyphs
                .iter()
                .map(|g| g.as_ref().trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }

    /// Tally contributed by one paragraph.
    pub fn classify(&self, paragraph: &Paragraph) -> CountTotals {
        let text = paragraph.text();
        CountTotals {
            conforme: self.adjacent_conforme(&paragraph.runs) + self.fused_conforme(&paragraph.runs),
            nao_conforme: count_nao_conforme(&text),
        }
    }

    fn is_glyph(&self, text: &str) -> bool {
        self.glyphs.iter().any(|g| g == text)
    }

    /// Glyph run followed, within the next few non-blank runs, by a run that
    /// reads "conforme". At most one per paragraph.
    pub fn adjacent_conforme(&self, runs: &[Run]) -> usize {
        for (i, run) in runs.iter().enumerate() {
            if !self.is_glyph(run.text.trim()) {
                continue;
            }
            let hit = runs[i + 1..]
                .iter()
                .filter(|r| !r.is_blank())
                .take(LOOKAHEAD_RUNS)
                .any(|r| r.text.trim().to_lowercase() == CONFORME);
            if hit {
                return 1;
            }
        }
        0
    }

    /// A single run carrying both a glyph and the word "conforme".
    pub fn fused_conforme(&self, runs: &[Run]) -> usize {
        let fused = runs.iter().any(|run| {
            let text = run.text.trim();
            text.to_lowercase().contains(CONFORME)
                && self.glyphs.iter().any(|g| text.contains(g.as_str()))
        });
        usize::from(fused)
    }
}
