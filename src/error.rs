use std::path::PathBuf;

/// Everything that can abort an export.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The header row lacks one or more required columns.
    #[error("missing required column(s): {0}")]
    Schema(String),

    /// A font file is missing, unreadable or not a usable TrueType/OpenType face.
    #[error("cannot load font {}: {reason}", .path.display())]
    FontLoad { path: PathBuf, reason: String },

    /// Page geometry or font size that leaves no room to draw.
    #[error("invalid layout configuration: {0}")]
    Configuration(String),

    /// The font has no glyph for a character of a label.
    #[error("font has no glyph for {ch:?} in label {label:?}")]
    MissingGlyph { ch: char, label: String },

    /// Unsupported format or a broken ZIP/XML/CSV container.
    #[error("invalid spreadsheet: {0}")]
    InvalidSpreadsheet(String),

    /// The page sink was used out of order.
    #[error("page sink: {0}")]
    Sink(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => Error::Io(io),
            other => Error::InvalidSpreadsheet(format!("not a valid workbook archive: {other}")),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::InvalidSpreadsheet(format!("malformed XML: {e}"))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            _ => Error::InvalidSpreadsheet(format!("malformed CSV: {message}")),
        }
    }
}
