use crate::error::Error;
use crate::fonts::TextMeasure;
use crate::model::{CellIndex, Label, Page, PageGeometry, TextDraw};

/// Baseline sits this fraction of the cell height above the cell's bottom edge.
const BASELINE_RATIO: f32 = 0.60;

/// Cell dimensions derived from a [`PageGeometry`], checked to be drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    pub cell_width: f32,
    pub cell_height: f32,
    geometry: PageGeometry,
}

impl GridMetrics {
    pub fn new(geometry: &PageGeometry) -> Result<Self, Error> {
        let g = geometry;
        if g.rows == 0 || g.columns == 0 {
            return Err(Error::Configuration(format!(
                "grid must have at least one row and one column (got {}x{})",
                g.rows, g.columns
            )));
        }
        if g.rows.checked_mul(g.columns).is_none() {
            return Err(Error::Configuration(format!(
                "grid of {}x{} cells is too large",
                g.rows, g.columns
            )));
        }
        let lengths = [
            g.page_width,
            g.page_height,
            g.margins.left,
            g.margins.right,
            g.margins.top,
            g.margins.bottom,
            g.col_gap,
            g.row_gap,
        ];
        if lengths.iter().any(|v| !v.is_finite()) {
            return Err(Error::Configuration("page lengths must be finite".into()));
        }

        let usable_width = g.page_width - g.margins.left - g.margins.right;
        let usable_height = g.page_height - g.margins.top - g.margins.bottom;
        let cell_width = (usable_width - g.col_gap) / g.columns as f32;
        let cell_height = (usable_height - (g.rows - 1) as f32 * g.row_gap) / g.rows as f32;

        if cell_width <= 0.0 || cell_height <= 0.0 {
            return Err(Error::Configuration(format!(
                "cells would be {cell_width:.2}x{cell_height:.2}pt; margins and gaps leave no room"
            )));
        }

        Ok(GridMetrics {
            cell_width,
            cell_height,
            geometry: *geometry,
        })
    }

    /// Left edge of the cell.
    pub fn cell_x(&self, cell: CellIndex) -> f32 {
        self.geometry.margins.left + cell.col as f32 * (self.cell_width + self.geometry.col_gap)
    }

    /// Top edge of the cell (PDF y grows upwards).
    pub fn cell_top(&self, cell: CellIndex) -> f32 {
        self.geometry.page_height
            - self.geometry.margins.top
            - cell.row as f32 * (self.cell_height + self.geometry.row_gap)
    }

    pub fn baseline_y(&self, cell: CellIndex) -> f32 {
        self.cell_top(cell) - self.cell_height + self.cell_height * BASELINE_RATIO
    }

    /// X at which text of `text_width` is horizontally centered in the cell.
    /// Wider text is not clamped and starts left of the cell.
    pub fn centered_x(&self, cell: CellIndex, text_width: f32) -> f32 {
        self.cell_x(cell) + (self.cell_width - text_width) / 2.0
    }
}

/// Split `labels` into pages of `rows * columns`, preserving order.
pub fn paginate(labels: &[Label], geometry: &PageGeometry) -> Result<Vec<Page>, Error> {
    GridMetrics::new(geometry)?;
    let pages = labels
        .chunks(geometry.capacity())
        .enumerate()
        .map(|(number, chunk)| Page {
            number,
            labels: chunk.to_vec(),
            rows: geometry.rows,
        })
        .collect();
    Ok(pages)
}

/// One centered draw per occupied cell of `page`.
pub fn render_page<M: TextMeasure + ?Sized>(
    page: &Page,
    geometry: &PageGeometry,
    font: &M,
    font_size: f32,
) -> Result<Vec<TextDraw>, Error> {
    if !(font_size.is_finite() && font_size > 0.0) {
        return Err(Error::Configuration(format!(
            "font size must be positive (got {font_size})"
        )));
    }
    let grid = GridMetrics::new(geometry)?;

    page.cells()
        .map(|(cell, label)| {
            let text_width = font.text_width(label.as_str(), font_size)?;
            Ok(TextDraw {
                text: label.as_str().to_string(),
                x: grid.centered_x(cell, text_width),
                y: grid.baseline_y(cell),
                font_size,
            })
        })
        .collect()
}
