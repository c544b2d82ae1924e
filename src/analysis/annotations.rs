use crate::model::Paragraph;

use super::markers::nfc;
use super::options::AnnotationColor;

/// Collects the colored commentary written after a field label, e.g.
/// `Descrição: <red text>`.
pub struct AnnotationExtractor {
    label: String,
    colors: Vec<AnnotationColor>,
}

impl AnnotationExtractor {
    pub fn new(label: &str, colors: &[AnnotationColor]) -> Self {
        Self {
            label: nfc(label).into_owned(),
            colors: colors.to_vec(),
        }
    }

    fn is_annotation_color(&self, color: Option<[u8; 3]>) -> bool {
        color.is_some_and(|rgb| self.colors.iter().any(|c| c.matches(rgb)))
    }

    /// All annotation runs after the label, merged into one description.
    ///
    /// Returns `None` when the paragraph has no label or no annotation run
    /// follows it.
    pub fn extract(&self, paragraph: &Paragraph) -> Option<String> {
        if self.label.is_empty() || !nfc(&paragraph.text()).contains(self.label.as_str()) {
            return None;
        }

        let mut scanned = String::new();
        let mut past_label = false;
        let mut fragments: Vec<&str> = Vec::new();

        for run in &paragraph.runs {
            if !past_label {
                // The label may be split over several runs; the run that
                // completes it is still part of the label.
                scanned.push_str(&run.text);
                past_label = nfc(&scanned).contains(self.label.as_str());
                continue;
            }
            let text = run.text.trim();
            if !text.is_empty() && self.is_annotation_color(run.color) {
                fragments.push(text);
            }
        }

        if fragments.is_empty() {
            return None;
        }
        Some(fragments.join(" ").trim().to_string())
    }
}
