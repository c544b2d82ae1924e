//! In-memory document tree consumed by the analysis.
//!
//! Only what the conformity scan needs survives parsing: tables, their rows
//! and cells, the paragraphs of each cell and the runs of each paragraph.
//! Cells keep nested tables separately from their paragraphs.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub color: Option<[u8; 3]>, // None = no direct color, or "auto"
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// Flattened text of all runs, in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Depth of the deepest nested table below this one (0 = no nesting).
    pub fn nesting_depth(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .flat_map(|cell| &cell.tables)
            .map(|t| t.nesting_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// A nested table the reader dropped because it sat too deep in the XML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkippedTable {
    /// 1-based index of the top-level table it was found under.
    pub table_index: usize,
    pub depth: usize,
    pub limit: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Top-level tables of the body, in document order.
    pub tables: Vec<Table>,
    pub skipped_tables: Vec<SkippedTable>,
}

impl Document {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables,
            skipped_tables: Vec::new(),
        }
    }
}
