use std::path::{Path, PathBuf};

use crate::model::{Margins, PageGeometry, PageSize};

/// Points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

pub fn mm(v: f32) -> f32 {
    v * POINTS_PER_MM
}

pub const DEFAULT_PAGE_SIZE: PageSize = PageSize::A4;
pub const DEFAULT_ROWS: usize = 12;
pub const DEFAULT_COLUMNS: usize = 2;
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

const MARGIN_LEFT_MM: f32 = 36.0;
const MARGIN_RIGHT_MM: f32 = 29.0;
const MARGIN_TOP_MM: f32 = 18.0;
const MARGIN_BOTTOM_MM: f32 = 16.0;
const COL_GAP_MM: f32 = 3.0;
const ROW_GAP_MM: f32 = 3.0;

pub const REGULAR_FONT_FILE: &str = "Saysettha-Regular.ttf";
pub const BOLD_FONT_FILE: &str = "Saysettha-Bold.ttf";

/// Overrides the font directory when `--font-dir` is not given.
pub const FONT_DIR_ENV: &str = "LABEL_GRID_FONTS";

pub fn default_margins() -> Margins {
    Margins {
        left: mm(MARGIN_LEFT_MM),
        right: mm(MARGIN_RIGHT_MM),
        top: mm(MARGIN_TOP_MM),
        bottom: mm(MARGIN_BOTTOM_MM),
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::with_grid(DEFAULT_PAGE_SIZE, DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

impl PageGeometry {
    /// Default margins and gaps on a landscape `size` page with a custom grid.
    pub fn with_grid(size: PageSize, rows: usize, columns: usize) -> Self {
        PageGeometry::landscape(
            size,
            default_margins(),
            rows,
            columns,
            mm(COL_GAP_MM),
            mm(ROW_GAP_MM),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    #[default]
    Bold,
}

/// Everything an export needs besides its input and output paths.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub geometry: PageGeometry,
    pub font_size: f32,
    /// `None` resolves through [`FONT_DIR_ENV`], then the executable's directory.
    pub font_dir: Option<PathBuf>,
    pub weight: FontWeight,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            geometry: PageGeometry::default(),
            font_size: DEFAULT_FONT_SIZE,
            font_dir: None,
            weight: FontWeight::Bold,
        }
    }
}

impl ExportOptions {
    pub fn resolved_font_dir(&self) -> PathBuf {
        if let Some(dir) = &self.font_dir {
            return dir.clone();
        }
        if let Ok(val) = std::env::var(FONT_DIR_ENV) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        executable_dir()
    }
}

/// Directory holding the running binary, or the working directory if unknown.
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
