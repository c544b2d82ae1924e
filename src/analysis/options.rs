use serde::Serialize;

/// Foreground colors that mark a run as annotation text.
///
/// Compared by exact RGB equality; anything else is ordinary text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AnnotationColor {
    /// `FF0000`
    Red,
    /// `EE0000`, what several Word palettes insert for "red".
    NearRed,
    Custom([u8; 3]),
}

impl AnnotationColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            AnnotationColor::Red => [0xFF, 0x00, 0x00],
            AnnotationColor::NearRed => [0xEE, 0x00, 0x00],
            AnnotationColor::Custom(rgb) => rgb,
        }
    }

    pub fn matches(self, color: [u8; 3]) -> bool {
        self.rgb() == color
    }

    /// Parse a six digit hex value such as `C00000` (a leading `#` is accepted).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let rgb = crate::docx::parse_hex_color(hex)?;
        Some(match rgb {
            [0xFF, 0x00, 0x00] => AnnotationColor::Red,
            [0xEE, 0x00, 0x00] => AnnotationColor::NearRed,
            other => AnnotationColor::Custom(other),
        })
    }
}

pub const DEFAULT_LABEL: &str = "Descrição";

pub const DEFAULT_GLYPHS: &[&str] = &[
    "\u{2714}\u{FE0F}", // ✔️
    "\u{2714}",
    "\u{2714}\u{FE0E}",
    "\u{2713}",
    "\u{2705}",
    "\u{2611}\u{FE0F}",
    "\u{2611}",
];

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Knobs of one analysis run.
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    /// Field label after which annotation runs are collected (case-sensitive).
    pub label: String,
    /// Check-mark glyphs recognized in front of "conforme".
    pub glyphs: Vec<String>,
    pub annotation_colors: Vec<AnnotationColor>,
    /// Nesting levels followed below a top-level table before a nested
    /// table is skipped as a structural anomaly.
    pub max_depth: usize,
    /// Drop spurious empty descriptions when the counts reconcile exactly.
    pub sanitize: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            glyphs: DEFAULT_GLYPHS.iter().map(|g| g.to_string()).collect(),
            annotation_colors: vec![AnnotationColor::Red, AnnotationColor::NearRed],
            max_depth: DEFAULT_MAX_DEPTH,
            sanitize: true,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_glyphs<I, S>(mut self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glyphs = glyphs.into_iter().map(Into::into).collect();
        self
    }

    /// Accept one more annotation color on top of the current set.
    pub fn with_annotation_color(mut self, color: AnnotationColor) -> Self {
        if !self.annotation_colors.contains(&color) {
            self.annotation_colors.push(color);
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }
}
