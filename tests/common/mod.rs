#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use label_grid_pdf::{
    BOLD_FONT_FILE, Error, Label, PageSink, REGULAR_FONT_FILE, TextDraw, TextMeasure,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every character advances `em_fraction * font_size`.
pub struct FixedAdvance {
    pub em_fraction: f32,
}

impl TextMeasure for FixedAdvance {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, Error> {
        Ok(text.chars().count() as f32 * self.em_fraction * font_size)
    }
}

/// Measures every string as exactly `width` points.
pub struct ConstantWidth(pub f32);

impl TextMeasure for ConstantWidth {
    fn text_width(&self, _text: &str, _font_size: f32) -> Result<f32, Error> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Draw(TextDraw),
    ShowPage,
    Finalize,
}

/// Records calls in order; optionally fails on the n-th `show_page`.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    pub fail_on_page: Option<usize>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn draws(&self) -> Vec<&TextDraw> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }
}

impl PageSink for RecordingSink {
    fn draw_text(&mut self, draw: &TextDraw) -> Result<(), Error> {
        self.events.push(SinkEvent::Draw(draw.clone()));
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), Error> {
        let pages = self.count(|e| *e == SinkEvent::ShowPage);
        if self.fail_on_page == Some(pages) {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.events.push(SinkEvent::ShowPage);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), Error> {
        self.events.push(SinkEvent::Finalize);
        Ok(())
    }
}

pub fn labels(texts: &[&str]) -> Vec<Label> {
    texts.iter().map(|t| Label::from(*t)).collect()
}

pub fn numbered_labels(n: usize) -> Vec<Label> {
    (0..n).map(|i| Label::from(format!("L{i}"))).collect()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn column_letter(col: usize) -> String {
    let mut n = col + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

/// Minimal workbook: one sheet, every non-empty cell an inline string,
/// except cells that parse as numbers, which are stored numerically.
pub fn write_xlsx(path: &Path, rows: &[Vec<&str>]) {
    let mut sheet_rows = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_rows.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_letter(c), r + 1);
            if value.parse::<f64>().is_ok() {
                sheet_rows.push_str(&format!("<c r=\"{cell_ref}\"><v>{value}</v></c>"));
            } else {
                sheet_rows.push_str(&format!(
                    "<c r=\"{cell_ref}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    xml_escape(value)
                ));
            }
        }
        sheet_rows.push_str("</row>");
    }
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
    );
    write_xlsx_parts(
        path,
        &[
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ],
    );
}

/// Workbook with the standard workbook/rels parts plus `extra` parts.
pub fn write_xlsx_parts(path: &Path, extra: &[(&str, &str)]) {
    let workbook = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    let file = fs::File::create(path).expect("create xlsx");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    let mut parts: Vec<(&str, &str)> = vec![
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
    ];
    parts.extend_from_slice(extra);
    for (name, content) in parts {
        zip.start_file(name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish xlsx");
}

const FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

/// A directory containing the two label fonts, copied from a TrueType
/// family found on this machine. `None` when no candidate is installed.
pub fn font_dir() -> Option<tempfile::TempDir> {
    let (regular, bold) = FONT_CANDIDATES
        .iter()
        .map(|(r, b)| (PathBuf::from(r), PathBuf::from(b)))
        .find(|(r, b)| r.exists() && b.exists())?;
    let dir = tempfile::tempdir().ok()?;
    fs::copy(&regular, dir.path().join(REGULAR_FONT_FILE)).ok()?;
    fs::copy(&bold, dir.path().join(BOLD_FONT_FILE)).ok()?;
    Some(dir)
}
