use orderlist::batch::{UploadedFile, process_batch, process_batch_at};

fn csv(name: &str, body: &str) -> UploadedFile {
    UploadedFile::new(name, body.as_bytes().to_vec())
}

#[test]
fn test_two_file_upload() {
    let files = vec![
        csv("a.csv", "Panel No,Material\nP1,Webbing Blue\nP2,Fabric\n"),
        csv("b.csv", "Panel No,Material\nQ1,Strap\n"),
    ];
    let outcome = process_batch_at(&files, &[], 1000);

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(outcome.datasets.len(), 2);
    assert_eq!(outcome.datasets[0].id, "excel-1000-0");
    assert_eq!(outcome.datasets[1].rows[0].id, "1000-1-0");

    let tables = orderlist::merge_datasets(&outcome.datasets);
    assert_eq!(tables.merged.body, vec![vec!["P2", "Fabric", "Q1", "Strap"]]);
    assert_eq!(tables.webbing.body, vec![vec!["P1", "Webbing Blue"]]);
}

#[test]
fn test_bad_file_does_not_abort_batch() {
    let files = vec![
        csv("broken.xlsx", "not a workbook"),
        csv("orders.csv", "Panel No,Material\nP1,Fabric\n"),
        csv("notes.txt", "hello"),
    ];
    let outcome = process_batch_at(&files, &[], 7);

    assert_eq!(outcome.datasets.len(), 1);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[0].contains("broken.xlsx"));
    // The first file that decodes seeds the order info.
    let info = outcome.order_info.expect("order info from orders.csv");
    assert_eq!(info.order_no, "Fabric");
    // File index stays tied to the upload position.
    assert_eq!(outcome.datasets[0].id, "excel-7-1");
}

#[test]
fn test_keywords_filter_rows() {
    let files = vec![csv("a.csv", "Panel No,Material\nP1,Foam\nP2,Fabric\nP3,FOAM pad\n")];
    let outcome = process_batch(&files, &["foam".to_string()]);
    let panels: Vec<&str> = outcome.datasets[0].rows.iter().map(|r| r.panel_no.as_str()).collect();
    assert_eq!(panels, vec!["P2"]);
}

#[test]
fn test_fixed_cells_kept_per_dataset() {
    let files = vec![
        csv("a.csv", "Panel No,Material\nBadge A,Job: 11\n"),
        csv("b.csv", "Panel No,Material\nBadge B,Job: 22\n"),
    ];
    let outcome = process_batch_at(&files, &[], 1);
    assert_eq!(outcome.datasets[0].cell_a2_value.as_deref(), Some("Badge A"));
    assert_eq!(outcome.datasets[1].cell_b2_value.as_deref(), Some("Job: 22"));
    assert_eq!(outcome.order_info.unwrap().order_no, "11");
}

#[test]
fn test_empty_batches() {
    let outcome = process_batch(&[], &[]);
    assert!(outcome.is_empty());
    assert_eq!(outcome.errors[0], "No files selected for upload");

    let outcome = process_batch(&[csv("x.doc", "?")], &[]);
    assert!(outcome.is_empty());
    assert_eq!(
        outcome.errors.last().map(String::as_str),
        Some("No valid data could be extracted from the uploaded files.")
    );
}
