mod common;

use std::fs;

use label_grid_pdf::{Error, Label, Table, labels_from_table, read_labels, read_table};

fn texts(labels: &[Label]) -> Vec<&str> {
    labels.iter().map(Label::as_str).collect()
}

#[test]
fn xlsx_rows_become_labels_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guests.xlsx");
    common::write_xlsx(
        &path,
        &[
            vec!["Name", "With"],
            vec!["A", "1"],
            vec!["B", "2"],
            vec!["Chanthavong", "Family of 4"],
        ],
    );
    let labels = read_labels(&path).unwrap();
    assert_eq!(texts(&labels), ["A 1", "B 2", "Chanthavong Family of 4"]);
}

#[test]
fn headers_are_trimmed_and_column_order_is_free() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("padded.xlsx");
    common::write_xlsx(
        &path,
        &[
            vec!["  With ", "Table", " Name"],
            vec!["+1", "7", "Somchai"],
        ],
    );
    let table = read_table(&path).unwrap();
    assert_eq!(table.headers, ["With", "Table", "Name"]);
    assert_eq!(texts(&labels_from_table(&table).unwrap()), ["Somchai 1"]);
}

#[test]
fn missing_with_column_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_with.xlsx");
    common::write_xlsx(&path, &[vec!["Name", "Guest"], vec!["A", "B"]]);
    match read_labels(&path) {
        Err(Error::Schema(missing)) => assert_eq!(missing, "With"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn schema_error_names_every_missing_column() {
    let table = Table {
        headers: vec!["Guest".into()],
        rows: vec![],
    };
    let err = labels_from_table(&table).unwrap_err();
    assert_eq!(err.to_string(), "missing required column(s): Name, With");
}

#[test]
fn shared_strings_numbers_and_booleans() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typed.xlsx");
    let shared = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
<si><t>Name</t></si>
<si><t>With</t></si>
<si><r><t>Keo</t></r><r><t>ta</t></r><rPh sb="0" eb="1"><t>ignored</t></rPh></si>
<si><t xml:space="preserve">Bounmy </t></si>
</sst>"#;
    let sheet = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>3.0</v></c></row>
<row r="3"><c r="A3" t="s"><v>3</v></c><c r="B3"><v>2.5</v></c></row>
<row r="4"><c r="A4" t="str"><v>Formula</v></c><c r="B4" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;
    common::write_xlsx_parts(
        &path,
        &[
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet1.xml", sheet),
        ],
    );
    let labels = read_labels(&path).unwrap();
    assert_eq!(texts(&labels), ["Keota 3", "Bounmy  2.5", "Formula True"]);
}

#[test]
fn sparse_cells_and_blank_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.xlsx");
    let sheet = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="2"><c r="B2" t="inlineStr"><is><t>Name</t></is></c><c r="D2" t="inlineStr"><is><t>With</t></is></c></row>
<row r="3"><c r="B3" t="inlineStr"><is><t>Noy</t></is></c></row>
<row r="4"></row>
<row r="5"><c r="D5" t="inlineStr"><is><t>alone</t></is></c></row>
</sheetData></worksheet>"#;
    common::write_xlsx_parts(&path, &[("xl/worksheets/sheet1.xml", sheet)]);
    let table = read_table(&path).unwrap();
    assert_eq!(table.headers, ["", "Name", "", "With"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(texts(&labels_from_table(&table).unwrap()), ["Noy ", " alone"]);
}

#[test]
fn cell_reference_past_last_column_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    for r in ["ZZZZZZZZZZZZZZZ1", "ZZZZZZ1"] {
        let path = dir.path().join(format!("{r}.xlsx"));
        let sheet = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="{r}" t="inlineStr"><is><t>Name</t></is></c></row>
</sheetData></worksheet>"#
        );
        common::write_xlsx_parts(&path, &[("xl/worksheets/sheet1.xml", sheet.as_str())]);
        assert!(matches!(read_table(&path), Err(Error::InvalidSpreadsheet(_))));
    }
}

#[test]
fn csv_input_with_bom_and_ragged_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guests.CSV");
    fs::write(&path, "\u{feff}Name , With\nA,1\n\nB\n\"C, Jr.\",3\n").unwrap();
    let labels = read_labels(&path).unwrap();
    assert_eq!(texts(&labels), ["A 1", "B ", "C, Jr. 3"]);
}

#[test]
fn unsupported_inputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let xls = dir.path().join("old.xls");
    fs::write(&xls, b"\xD0\xCF\x11\xE0").unwrap();
    assert!(matches!(read_table(&xls), Err(Error::InvalidSpreadsheet(_))));

    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "Name,With").unwrap();
    assert!(matches!(read_table(&txt), Err(Error::InvalidSpreadsheet(_))));

    let fake = dir.path().join("fake.xlsx");
    fs::write(&fake, "Name,With\nA,1\n").unwrap();
    assert!(matches!(read_table(&fake), Err(Error::InvalidSpreadsheet(_))));
}

#[test]
fn missing_input_is_an_io_error_naming_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.xlsx");
    match read_table(&path) {
        Err(Error::Io(e)) => assert!(e.to_string().contains("absent.xlsx")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn line_breaks_inside_a_cell_become_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multiline.csv");
    fs::write(&path, "Name,With\n\"Noy\nSouk\",\"plus\t2\"\n").unwrap();
    let labels = read_labels(&path).unwrap();
    assert_eq!(texts(&labels), ["Noy Souk plus 2"]);
    assert_eq!(Label::from_fields("a\r\n", "b").as_str(), "a   b");
}
