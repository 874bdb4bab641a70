//! Fixed-width and TSV report rendering.

/// One report cell. The variant controls formatting: text and integers are
/// rendered as-is, floats are rounded to two decimals in table mode.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn fixed(&self, width: usize) -> String {
        match self {
            Cell::Text(text) => format!("{text:>width$}"),
            Cell::Int(value) => format!("{value:>width$}"),
            Cell::Float(value) => format!("{value:>width$.2}"),
        }
    }

    fn tsv(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) => value.to_string(),
        }
    }
}

/// Right-aligned fixed-width table writer with a TSV mode for
/// machine-readable output.
pub struct TableReport {
    columns: Vec<(&'static str, usize)>,
}

impl TableReport {
    pub fn new(columns: Vec<(&'static str, usize)>) -> Self {
        Self { columns }
    }

    pub fn header(&self) -> String {
        let cells: Vec<Cell> = self.columns.iter().map(|(name, _)| Cell::text(*name)).collect();
        self.row(&cells)
    }

    pub fn row(&self, cells: &[Cell]) -> String {
        assert_eq!(cells.len(), self.columns.len(), "cell count mismatch");
        cells
            .iter()
            .zip(&self.columns)
            .map(|(cell, (_, width))| cell.fixed(*width))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn divider(&self) -> String {
        "-".repeat(self.width())
    }

    pub fn tsv_header(&self) -> String {
        self.columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("\t")
    }

    pub fn tsv_row(&self, cells: &[Cell]) -> String {
        cells.iter().map(Cell::tsv).collect::<Vec<_>>().join("\t")
    }

    fn width(&self) -> usize {
        let widths: usize = self.columns.iter().map(|(_, width)| width).sum();
        widths + self.columns.len().saturating_sub(1)
    }
}
