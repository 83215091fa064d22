use orderlist::OrderError;
use orderlist::downloader::{to_csv, to_xlsx};
use orderlist::merge::{MergedTable, WebbingTable};
use orderlist::report::{ROWS_PER_PAGE, ReportInput, column_hidden, page_sizes, render_report};
use orderlist::store::HighlightSet;

// Helper function to build a merged table with `datasets` column pairs
fn merged(datasets: usize, rows: usize) -> MergedTable {
    let header = (0..datasets)
        .flat_map(|d| [format!("Panel {}", d), format!("Material {}", d)])
        .collect();
    let body = (0..rows)
        .map(|r| {
            (0..datasets)
                .flat_map(|d| [format!("p{}r{}", d, r), format!("m{}r{}", d, r)])
                .collect()
        })
        .collect();
    MergedTable {
        header,
        body,
        ..Default::default()
    }
}

fn render(input: &ReportInput) -> String {
    render_report(input, "2024-05-01 09:30:00").expect("report should render")
}

#[test]
fn test_empty_report_is_an_error() {
    let err = render_report(&ReportInput::default(), "now").unwrap_err();
    assert!(matches!(err, OrderError::EmptyReport));
    assert_eq!(err.to_string(), "No data available to export.");
}

#[test]
fn test_page_sizes() {
    assert_eq!(page_sizes(0), vec![0]);
    assert_eq!(page_sizes(30), vec![30]);
    assert_eq!(page_sizes(31), vec![30, 1]);
    assert_eq!(page_sizes(75), vec![30, 30, 15]);
    assert_eq!(ROWS_PER_PAGE, 30);
}

#[test]
fn test_page_breaks_between_chunks() {
    let input = ReportInput {
        merged: merged(1, 65),
        ..Default::default()
    };
    let html = render(&input);
    assert_eq!(html.matches("class=\"page-break\"").count(), 2);
    assert_eq!(html.matches("<th>").count(), 2, "header printed once");
    assert!(html.contains("p0r64"));
    // Pages are full, so no padding rows are needed.
    assert_eq!(html.matches("class=\"empty-row\"").count(), 0);
}

#[test]
fn test_single_page_has_no_break() {
    let input = ReportInput {
        merged: merged(2, 12),
        ..Default::default()
    };
    let html = render(&input);
    assert!(!html.contains("class=\"page-break\""));
    assert!(html.contains("Generated: 2024-05-01 09:30:00"));
}

#[test]
fn test_hidden_panel_columns() {
    assert!(!column_hidden(0, true));
    assert!(!column_hidden(1, true));
    assert!(column_hidden(2, true));
    assert!(column_hidden(4, true));
    assert!(!column_hidden(2, false));

    let input = ReportInput {
        merged: merged(3, 2),
        hide_panel_columns: true,
        ..Default::default()
    };
    let html = render(&input);
    assert!(html.contains("<th>Panel 0</th>"));
    assert!(!html.contains("Panel 1"));
    assert!(!html.contains("p2r1"));
    assert!(html.contains("m2r1"));
    assert!(!html.contains("colspan"));
}

#[test]
fn test_highlights_use_body_row_index() {
    let input = ReportInput {
        merged: merged(2, 40),
        highlights: HighlightSet::from_keys(&["material-1-35", "panel-0-0"]),
        ..Default::default()
    };
    let html = render(&input);
    assert!(html.contains("<td class=\"highlighted\">m1r35</td>"));
    assert!(html.contains("<td class=\"highlighted\">p0r0</td>"));
    assert!(html.contains("<td>m1r34</td>"));
}

#[test]
fn test_header_block_and_escaping() {
    let input = ReportInput {
        order_no: "ORD-1".to_string(),
        shop_order_note: "Line one\n<b>Line two</b>".to_string(),
        badge: Some("Badge 9".to_string()),
        merged: merged(1, 1),
        ..Default::default()
    };
    let html = render(&input);
    assert!(html.contains("<title>ORD-1</title>"));
    assert!(html.contains("Line one<br>&lt;b&gt;Line two&lt;/b&gt;"));
    assert!(html.contains("Badge 9"));
}

#[test]
fn test_webbing_section() {
    let webbing = WebbingTable {
        header: vec!["Panel No".to_string(), "Material".to_string()],
        body: vec![vec!["W1".to_string(), "Webbing 25mm".to_string()]],
        source: Some(0),
    };
    let input = ReportInput {
        merged: merged(1, 1),
        webbing,
        ..Default::default()
    };
    let html = render(&input);
    assert!(html.contains("Webbing Details"));
    assert!(html.contains("<td>W1</td><td>Webbing 25mm</td>"));

    let without = render(&ReportInput {
        merged: merged(1, 1),
        ..Default::default()
    });
    assert!(!without.contains("Webbing Details"));
}

#[test]
fn test_csv_export() {
    let webbing = WebbingTable {
        header: vec!["Panel No".to_string(), "Material".to_string()],
        body: vec![vec!["W1".to_string(), "Webbing".to_string()]],
        source: Some(0),
    };
    let csv = to_csv(&merged(1, 1), &webbing).unwrap();
    assert_eq!(
        csv,
        "Panel 0,Material 0\np0r0,m0r0\nWebbing Details\nPanel No,Material\nW1,Webbing\n"
    );
    assert!(matches!(
        to_csv(&MergedTable::default(), &WebbingTable::default()),
        Err(OrderError::EmptyReport)
    ));
}

#[test]
fn test_xlsx_export() {
    let bytes = to_xlsx(&merged(2, 3), &WebbingTable::default()).unwrap();
    // XLSX files are zip archives.
    assert_eq!(&bytes[..2], b"PK");
}
