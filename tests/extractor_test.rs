use orderlist::extractor::{extract_rows, row_id, strip_cutting_prefix};
use orderlist::workbook::RowRecord;

// Helper function to extract a single record
fn extract_one(fields: Vec<(&str, &str)>) -> (String, String) {
    let rows = extract_rows(&[RowRecord::new(fields)], 1, 0);
    assert_eq!(rows.len(), 1, "one record should give one row");
    (rows[0].panel_no.clone(), rows[0].material.clone())
}

#[test]
fn test_panel_key_priority() {
    let (panel, _) = extract_one(vec![
        ("Cutting", "C-1"),
        ("Note Text", "N-1"),
        ("Panel No", "P-1"),
    ]);
    assert_eq!(panel, "P-1");

    let (panel, _) = extract_one(vec![("Cutting", "C-1"), ("Note Text", "N-1")]);
    assert_eq!(panel, "N-1");

    let (panel, _) = extract_one(vec![("Other", "X"), ("Cutting", "C-1")]);
    assert_eq!(panel, "C-1");
}

#[test]
fn test_material_key_priority() {
    let (_, material) = extract_one(vec![
        ("Panel No", "P1"),
        ("Material", "Oak"),
        ("Description", "Walnut"),
    ]);
    assert_eq!(material, "Walnut");

    let (_, material) = extract_one(vec![("Panel No", "P1"), ("Material", "Oak")]);
    assert_eq!(material, "Oak");
}

#[test]
fn test_positional_fallback() {
    let (panel, material) = extract_one(vec![("Part", "A7"), ("Stuff", "Canvas"), ("Qty", "3")]);
    assert_eq!(panel, "A7");
    assert_eq!(material, "Canvas");
}

#[test]
fn test_empty_named_field_falls_through() {
    let (panel, material) =
        extract_one(vec![("Panel No", ""), ("Cutting", "C9"), ("Material", "")]);
    assert_eq!(panel, "C9");
    // Material falls back to the second key present, which is "Cutting".
    assert_eq!(material, "C9");
}

#[test]
fn test_missing_fields_degrade_to_empty() {
    let rows = extract_rows(&[RowRecord::default()], 1, 0);
    assert_eq!(rows[0].panel_no, "");
    assert_eq!(rows[0].material, "");

    let (panel, material) = extract_one(vec![("Only", "one")]);
    assert_eq!(panel, "one");
    assert_eq!(material, "");
}

#[test]
fn test_prefix_strip() {
    assert_eq!(strip_cutting_prefix("Cutting-S Panel A"), "Panel A");
    assert_eq!(strip_cutting_prefix("CUTTINGFrame"), "Frame");
    assert_eq!(strip_cutting_prefix("Cutting-S"), "");
    assert_eq!(strip_cutting_prefix("cutting-s   Side  "), "Side");
    assert_eq!(strip_cutting_prefix("Panel Cutting"), "Panel Cutting");
    assert_eq!(strip_cutting_prefix("  Cutting X"), "  Cutting X");
    assert_eq!(strip_cutting_prefix(""), "");
    assert_eq!(strip_cutting_prefix("Cut"), "Cut");
}

#[test]
fn test_prefix_strip_applies_to_both_fields() {
    let (panel, material) =
        extract_one(vec![("Panel No", "cutting P4"), ("Material", "Cutting-S Mesh")]);
    assert_eq!(panel, "P4");
    assert_eq!(material, "Mesh");
}

#[test]
fn test_row_ids_unique_across_batch() {
    let records = vec![
        RowRecord::new(vec![("Panel No", "P1")]),
        RowRecord::new(vec![("Panel No", "P2")]),
    ];
    let first = extract_rows(&records, 42, 0);
    let second = extract_rows(&records, 42, 1);

    let mut ids: Vec<String> = first.iter().chain(second.iter()).map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4, "ids must not collide within a batch");
    assert_eq!(first[1].id, row_id(42, 0, 1));
    assert_eq!(second[0].id, "42-1-0");
}
