use orderlist::OrderError;
use orderlist::loader::{decode_workbook, file_stem, format_number};
use orderlist::workbook::{Sheet, parse_cell_address};

#[test]
fn test_csv_decode() {
    let csv = b"Panel No,Material\nP1,\"Fabric, blue\"\nP2,Foam\n";
    let workbook = decode_workbook("cut list.csv", csv).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["cut list"]);
    let sheet = workbook.first_sheet().unwrap();
    assert_eq!(sheet.cell("A1"), Some("Panel No"));
    assert_eq!(sheet.cell("B2"), Some("Fabric, blue"));
    assert_eq!(sheet.cell("C9"), None);
}

#[test]
fn test_unsupported_and_empty_files() {
    match decode_workbook("notes.txt", b"hello") {
        Err(OrderError::Decode { file, .. }) => assert_eq!(file, "notes.txt"),
        other => panic!("expected decode error, got {:?}", other.map(|w| w.sheets.len())),
    }
    assert!(decode_workbook("empty.csv", b"").is_err());
    assert!(decode_workbook("README", b"abc").is_err());

    let err = decode_workbook("broken.xlsx", b"definitely not a zip").unwrap_err();
    assert!(err.to_string().starts_with("Error processing file broken.xlsx"));
}

#[test]
fn test_xlsx_decode() {
    use orderlist::downloader::to_xlsx;
    use orderlist::merge::{MergedTable, WebbingTable};

    let merged = MergedTable {
        header: vec!["Panel No".to_string(), "Material".to_string()],
        body: vec![vec!["P1".to_string(), "Oak".to_string()]],
        ..Default::default()
    };
    let bytes = to_xlsx(&merged, &WebbingTable::default()).unwrap();

    let workbook = decode_workbook("order.xlsx", &bytes).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Order"]);
    let sheet = workbook.first_sheet().unwrap();
    assert_eq!(sheet.cell("A1"), Some("Panel No"));
    assert_eq!(sheet.cell("B2"), Some("Oak"));
}

#[test]
fn test_records_labels() {
    let sheet = Sheet::from_rows(
        "S",
        &[
            &["", "", ""],
            &["Panel No", "", "Panel No"],
            &["P1", "x", "P1b"],
            &["", "", ""],
            &["P2", "", ""],
        ],
    );
    let records = sheet.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].nth_key(1), Some("__EMPTY"));
    assert_eq!(records[0].get("Panel No_1"), Some("P1b"));
    // Empty cells are left out of a record.
    assert_eq!(records[1].fields.len(), 1);
    assert_eq!(records[1].get("Panel No"), Some("P2"));
}

#[test]
fn test_records_start_at_first_used_column() {
    let sheet = Sheet::from_rows("S", &[&["", "Panel No", "Material"], &["", "P1", "Oak"]]);
    let records = sheet.records();
    assert_eq!(records[0].nth_key(0), Some("Panel No"));
    assert_eq!(records[0].nth_value(1), Some("Oak"));
}

#[test]
fn test_cell_addresses() {
    assert_eq!(parse_cell_address("A1"), Some((0, 0)));
    assert_eq!(parse_cell_address("b3"), Some((2, 1)));
    assert_eq!(parse_cell_address("AA10"), Some((9, 26)));
    assert_eq!(parse_cell_address("A0"), None);
    assert_eq!(parse_cell_address("1A"), None);
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_number(12.0), "12");
    assert_eq!(format_number(-3.0), "-3");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(file_stem("orders.v2.xlsx"), "orders.v2");
    assert_eq!(file_stem("plain"), "plain");
}
