use std::io::Read;
use std::path::Path;

use crate::error::Error;

use super::Table;

type Archive = zip::ZipArchive<std::fs::File>;

const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Column count of an Excel worksheet (`A`..=`XFD`).
const MAX_COLUMNS: usize = 16_384;

fn read_zip_text(zip: &mut Archive, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Local-name match; covers both transitional and strict OOXML namespaces.
fn child<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| n.tag_name().name() == name)
}

fn children<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    node.children().filter(move |n| n.tag_name().name() == name)
}

/// `r:id` attribute, whatever the relationships prefix is bound to.
fn relationship_id<'a>(node: roxmltree::Node<'a, 'a>) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == "id" && a.namespace().is_some())
        .map(|a| a.value())
}

/// Concatenated `<t>` text of a string item, skipping phonetic runs.
fn string_item_text(node: roxmltree::Node) -> String {
    let mut out = String::new();
    for n in node.descendants() {
        if n.tag_name().name() != "t" {
            continue;
        }
        let in_phonetic = n.ancestors().any(|a| a.tag_name().name() == "rPh");
        if !in_phonetic && let Some(text) = n.text() {
            out.push_str(text);
        }
    }
    out
}

/// Zip path of the first worksheet listed in the workbook.
fn first_sheet_path(zip: &mut Archive) -> Result<String, Error> {
    let workbook_xml = read_zip_text(zip, "xl/workbook.xml").ok_or_else(|| {
        Error::InvalidSpreadsheet("missing xl/workbook.xml (is this an XLSX file?)".into())
    })?;
    let workbook = roxmltree::Document::parse(&workbook_xml)?;
    let Some(sheet_rid) = child(workbook.root_element(), "sheets")
        .and_then(|sheets| child(sheets, "sheet"))
        .and_then(relationship_id)
    else {
        return Ok(DEFAULT_SHEET.to_string());
    };

    let Some(rels_xml) = read_zip_text(zip, "xl/_rels/workbook.xml.rels") else {
        return Ok(DEFAULT_SHEET.to_string());
    };
    let rels = roxmltree::Document::parse(&rels_xml)?;
    let target = children(rels.root_element(), "Relationship")
        .find(|r| r.attribute("Id") == Some(sheet_rid))
        .and_then(|r| r.attribute("Target"));

    Ok(match target {
        Some(t) if t.starts_with('/') => t.trim_start_matches('/').to_string(),
        Some(t) => format!("xl/{t}"),
        None => DEFAULT_SHEET.to_string(),
    })
}

fn parse_shared_strings(zip: &mut Archive) -> Result<Vec<String>, Error> {
    let Some(xml_content) = read_zip_text(zip, "xl/sharedStrings.xml") else {
        return Ok(Vec::new());
    };
    let xml = roxmltree::Document::parse(&xml_content)?;
    Ok(children(xml.root_element(), "si")
        .map(string_item_text)
        .collect())
}

/// Zero-based column of a reference like `"C12"` or `"$AB$3"`.
/// `Ok(None)` when the reference has no column letters.
fn column_of(cell_ref: &str) -> Result<Option<usize>, Error> {
    let out_of_range =
        || Error::InvalidSpreadsheet(format!("cell reference {cell_ref:?} is past column XFD"));
    let mut col = 0usize;
    let mut saw_col = false;
    for ch in cell_ref.chars() {
        if ch == '$' {
            continue;
        }
        if !ch.is_ascii_alphabetic() {
            break;
        }
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .filter(|&c| c <= MAX_COLUMNS)
            .ok_or_else(out_of_range)?;
        saw_col = true;
    }
    Ok(saw_col.then(|| col - 1))
}

/// Display text of a numeric cell: integral values without a fraction.
fn format_number(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Ok(v) if v.is_finite() => format!("{v}"),
        _ => raw.to_string(),
    }
}

fn cell_text(cell: roxmltree::Node, shared_strings: &[String]) -> String {
    let value = child(cell, "v").and_then(|v| v.text());
    match cell.attribute("t") {
        Some("s") => value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(|idx| shared_strings.get(idx))
            .cloned()
            .unwrap_or_default(),
        Some("inlineStr") => child(cell, "is").map(string_item_text).unwrap_or_default(),
        Some("b") => match value.map(str::trim) {
            Some("1" | "true") => "True".to_string(),
            Some("0" | "false") => "False".to_string(),
            other => other.unwrap_or("").to_string(),
        },
        Some("str" | "e" | "d") => value.unwrap_or("").to_string(),
        _ => value.map(format_number).unwrap_or_default(),
    }
}

fn parse_sheet(xml_content: &str, shared_strings: &[String]) -> Result<Vec<Vec<String>>, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let sheet_data = child(xml.root_element(), "sheetData")
        .ok_or_else(|| Error::InvalidSpreadsheet("worksheet has no sheetData".into()))?;

    let mut rows = Vec::new();
    for row in children(sheet_data, "row") {
        let mut values: Vec<String> = Vec::new();
        for cell in children(row, "c") {
            let col = match cell.attribute("r") {
                Some(r) => column_of(r)?,
                None => None,
            }
            .unwrap_or(values.len());
            if col >= MAX_COLUMNS {
                return Err(Error::InvalidSpreadsheet(format!(
                    "row has more than {MAX_COLUMNS} cells"
                )));
            }
            if values.len() <= col {
                values.resize(col + 1, String::new());
            }
            values[col] = cell_text(cell, shared_strings);
        }
        rows.push(values);
    }
    Ok(rows)
}

pub(super) fn read(path: &Path) -> Result<Table, Error> {
    let file = super::open_input(path)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|_| Error::InvalidSpreadsheet("file is not a ZIP archive".into()))?;

    let sheet_path = first_sheet_path(&mut zip)?;
    let shared_strings = parse_shared_strings(&mut zip)?;

    let mut xml_content = String::new();
    zip.by_name(&sheet_path)
        .map_err(|_| Error::InvalidSpreadsheet(format!("missing worksheet {sheet_path}")))?
        .read_to_string(&mut xml_content)?;

    let rows = parse_sheet(&xml_content, &shared_strings)?;
    log::debug!(
        "xlsx: {} rows from {sheet_path}, {} shared strings",
        rows.len(),
        shared_strings.len()
    );
    Ok(Table::from_rows(rows))
}
