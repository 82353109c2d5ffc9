use std::fmt;

/// One row's display text: the `Name` and `With` fields joined by a space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label(String);

impl Label {
    /// Control characters (in-cell line breaks, tabs) become spaces; a label
    /// is drawn on a single line.
    pub fn from_fields(name: &str, with: &str) -> Self {
        let text = format!("{name} {with}")
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        Label(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Portrait (width, height) in points.
    pub fn portrait(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.2756, 841.8898),
            PageSize::Letter => (612.0, 792.0),
        }
    }

    /// Landscape (width, height) in points; width is the long side.
    pub fn landscape(self) -> (f32, f32) {
        let (w, h) = self.portrait();
        (h, w)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Page size, margins and grid of a label sheet. All lengths in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub rows: usize,
    pub columns: usize,
    pub col_gap: f32,
    pub row_gap: f32,
}

impl PageGeometry {
    pub fn landscape(
        size: PageSize,
        margins: Margins,
        rows: usize,
        columns: usize,
        col_gap: f32,
        row_gap: f32,
    ) -> Self {
        let (page_width, page_height) = size.landscape();
        PageGeometry {
            page_width,
            page_height,
            margins,
            rows,
            columns,
            col_gap,
            row_gap,
        }
    }

    /// Number of labels that fit on one page; saturates for absurd grids,
    /// which `GridMetrics::new` rejects.
    pub fn capacity(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }
}

/// Grid coordinates of a cell; row 0 is the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub col: usize,
    pub row: usize,
}

/// A batch of at most `rows * columns` labels, filled column by column.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub number: usize,
    pub labels: Vec<Label>,
    pub(crate) rows: usize,
}

impl Page {
    /// Cell of the label at `position` within this page (`idx = col * rows + row`).
    pub fn cell_of(&self, position: usize) -> CellIndex {
        CellIndex {
            col: position / self.rows,
            row: position % self.rows,
        }
    }

    /// Occupied cells in column-major order. Unoccupied cells are never yielded.
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, &Label)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (self.cell_of(i), label))
    }

    pub fn label_at(&self, cell: CellIndex) -> Option<&Label> {
        if cell.row >= self.rows {
            return None;
        }
        self.labels.get(cell.col * self.rows + cell.row)
    }
}

/// A single "draw string at (x, y)" command.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub x: f32,
    pub y: f32, // baseline
    pub font_size: f32,
}
