mod config;
mod error;
mod fonts;
mod model;
mod pdf;
mod sheet;

pub use config::{
    BOLD_FONT_FILE, DEFAULT_COLUMNS, DEFAULT_FONT_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_ROWS,
    ExportOptions, FONT_DIR_ENV, FontWeight, POINTS_PER_MM, REGULAR_FONT_FILE, default_margins,
    mm,
};
pub use error::Error;
pub use fonts::{FontSet, LoadedFont, TextMeasure};
pub use model::{CellIndex, Label, Margins, Page, PageGeometry, PageSize, TextDraw};
pub use pdf::layout::{GridMetrics, paginate, render_page};
pub use pdf::{PageSink, PdfSink};
pub use sheet::{Table, labels_from_table, read_labels, read_table};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Append-only stream of human-readable progress lines.
pub trait LogSink {
    fn line(&mut self, msg: &str);
}

impl LogSink for Vec<String> {
    fn line(&mut self, msg: &str) {
        self.push(msg.to_string());
    }
}

impl<F: FnMut(&str)> LogSink for F {
    fn line(&mut self, msg: &str) {
        self(msg)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub labels: usize,
    pub pages: usize,
    pub bytes: usize,
}

/// Paginate `labels`, render every page into `sink`, then finalize it once.
/// Returns the number of pages drawn.
pub fn export_labels_to_pdf<M, S>(
    labels: &[Label],
    geometry: &PageGeometry,
    font: &M,
    font_size: f32,
    sink: &mut S,
) -> Result<usize, Error>
where
    M: TextMeasure + ?Sized,
    S: PageSink + ?Sized,
{
    log::debug!("export: paginating {} labels", labels.len());
    let pages = paginate(labels, geometry)?;

    for page in &pages {
        log::debug!("export: rendering page {}/{}", page.number + 1, pages.len());
        for draw in render_page(page, geometry, font, font_size)? {
            sink.draw_text(&draw)?;
        }
        sink.show_page()?;
    }

    sink.finalize()?;
    log::debug!("export: done, {} pages", pages.len());
    Ok(pages.len())
}

/// Write `bytes` to `output` through a sibling temp file renamed into place,
/// so a failed export never truncates or removes an existing file.
fn write_output(output: &Path, bytes: &[u8]) -> Result<(), Error> {
    let annotate =
        |e: io::Error| Error::Io(io::Error::new(e.kind(), format!("{}: {}", e, output.display())));

    if let Ok(meta) = std::fs::metadata(output)
        && meta.permissions().readonly()
    {
        return Err(annotate(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "output file is read-only",
        )));
    }

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".label-grid-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)
        .map_err(annotate)?;
    tmp.write_all(bytes).map_err(annotate)?;
    tmp.as_file().sync_all().map_err(annotate)?;
    tmp.persist(output).map_err(|e| annotate(e.error))?;
    Ok(())
}

fn convert_with_progress(
    input: &Path,
    output: &Path,
    options: &ExportOptions,
    log: &mut dyn LogSink,
) -> Result<ExportSummary, Error> {
    let t0 = Instant::now();

    log.line("Loading spreadsheet...");
    let labels = read_labels(input)?;
    let t_read = t0.elapsed();

    log.line("Registering fonts...");
    let fonts = FontSet::load(&options.resolved_font_dir())?;
    let font = fonts.select(options.weight);
    let t_fonts = t0.elapsed();

    log.line("Generating PDF...");
    let mut sink = PdfSink::new(Vec::new(), font, &options.geometry);
    let pages = export_labels_to_pdf(&labels, &options.geometry, font, options.font_size, &mut sink)?;
    let bytes = sink.into_inner();
    let t_render = t0.elapsed();

    write_output(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, fonts={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_fonts - t_read).as_secs_f64() * 1000.0,
        (t_render - t_fonts).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(ExportSummary {
        output: output.to_path_buf(),
        labels: labels.len(),
        pages,
        bytes: bytes.len(),
    })
}

/// Read `input`, lay its labels out and save the PDF at `output`.
///
/// Spreadsheet and font problems are detected before `output` is touched.
/// A failed write leaves any existing `output` as it was.
pub fn convert_spreadsheet_to_pdf(
    input: &Path,
    output: &Path,
    options: &ExportOptions,
) -> Result<ExportSummary, Error> {
    convert_with_progress(input, output, options, &mut |_: &str| {})
}

/// Like [`convert_spreadsheet_to_pdf`], reporting progress to `log`.
///
/// This is the error boundary for a front end: any failure is reported to
/// `log` once as an `[ERROR]` line and then returned.
pub fn run_export(
    input: &Path,
    output: &Path,
    options: &ExportOptions,
    log: &mut dyn LogSink,
) -> Result<ExportSummary, Error> {
    match convert_with_progress(input, output, options, log) {
        Ok(summary) => {
            log.line(&format!("PDF saved to: {}", summary.output.display()));
            Ok(summary)
        }
        Err(e) => {
            log::error!("export of {} failed: {e}", input.display());
            log.line(&format!("[ERROR] {e}"));
            Err(e)
        }
    }
}
