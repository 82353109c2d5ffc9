mod delimited;
mod xlsx;

use std::path::Path;

use crate::error::Error;
use crate::model::Label;

pub(crate) const NAME_COLUMN: &str = "Name";
pub(crate) const WITH_COLUMN: &str = "With";

/// A header row plus data rows of display strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows; the first non-blank row is the header.
    /// Headers are trimmed and blank data rows are dropped.
    pub(crate) fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let is_blank = |row: &Vec<String>| row.iter().all(|cell| cell.trim().is_empty());
        let mut rows = rows.into_iter().skip_while(is_blank);
        let Some(header_row) = rows.next() else {
            return Table::default();
        };
        let headers = header_row
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let rows = rows.filter(|row| !is_blank(row)).collect();
        Table { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text, or `""` for cells past the end of a short row.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Open `path`, naming it in not-found and permission errors.
pub(crate) fn open_input(path: &Path) -> Result<std::fs::File, Error> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })
}

/// Read the first worksheet of an `.xlsx` workbook, or a `.csv` file.
pub fn read_table(path: &Path) -> Result<Table, Error> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx" | "xlsm") => xlsx::read(path),
        Some("csv") => delimited::read(path),
        Some("xls") => Err(Error::InvalidSpreadsheet(
            "legacy .xls workbooks are not supported; save the file as .xlsx".into(),
        )),
        _ => Err(Error::InvalidSpreadsheet(format!(
            "unsupported file type: {} (expected .xlsx or .csv)",
            path.display()
        ))),
    }
}

/// One label per data row: `Name` and `With` joined by a space, in row order.
pub fn labels_from_table(table: &Table) -> Result<Vec<Label>, Error> {
    let name_col = table.column_index(NAME_COLUMN);
    let with_col = table.column_index(WITH_COLUMN);
    let (Some(name_col), Some(with_col)) = (name_col, with_col) else {
        let missing: Vec<&str> = [(NAME_COLUMN, name_col), (WITH_COLUMN, with_col)]
            .into_iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name)
            .collect();
        return Err(Error::Schema(missing.join(", ")));
    };

    Ok((0..table.rows.len())
        .map(|r| Label::from_fields(table.cell(r, name_col), table.cell(r, with_col)))
        .collect())
}

pub fn read_labels(path: &Path) -> Result<Vec<Label>, Error> {
    let table = read_table(path)?;
    log::debug!(
        "read_labels: {} columns, {} data rows from {}",
        table.headers.len(),
        table.rows.len(),
        path.display()
    );
    labels_from_table(&table)
}
