use std::path::Path;

use crate::error::Error;

use super::Table;

pub(super) fn read(path: &Path) -> Result<Table, Error> {
    let file = super::open_input(path)?;
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::from_rows(rows))
}
