use crate::loader::file_stem;
use crate::workbook::{RowRecord, Workbook};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref B2_TAIL_REGEX: Regex = Regex::new(r":([^:]+)$").unwrap();
    static ref SHOP_NOTE_LABEL_REGEX: Regex =
        Regex::new(r"(?i)shop\s+order\s+note[:\s]*(.+)").unwrap();
    static ref ORDER_NO_LABEL_REGEX: Regex = Regex::new(r"(?i)order\s+no[:.;\s]*(.+)").unwrap();
    static ref ORDER_NO_PREFIX_REGEX: Regex = Regex::new(r"(?i)order\s*no\s*[:.]").unwrap();
    static ref SHOP_NOTE_PREFIX_REGEX: Regex =
        Regex::new(r"(?i)shop\s*order\s*note\s*[:.]").unwrap();
}

const HEADER_SCAN_ROWS: usize = 10;

/// Order identification pulled out of the first file of a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_no: String,
    pub shop_order_note: String,
    #[serde(rename = "cellA2Value")]
    pub cell_a2_value: String,
    #[serde(rename = "cellB2Value")]
    pub cell_b2_value: String,
}

/// Raw values of the fixed cells A2, B2 and B3 of the first sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedCells {
    pub a2: String,
    pub b2: String,
    pub b3: String,
}

pub fn fixed_cells(workbook: &Workbook) -> FixedCells {
    let Some(sheet) = workbook.first_sheet() else {
        return FixedCells::default();
    };
    let read = |address: &str| sheet.cell(address).unwrap_or_default().to_string();
    FixedCells {
        a2: read("A2"),
        b2: read("B2"),
        b3: read("B3"),
    }
}

/// Order number held in a B2 value: the trimmed text after the last colon,
/// or the whole trimmed value when there is no such tail.
pub fn order_no_from_b2(raw: &str) -> String {
    match B2_TAIL_REGEX.captures(raw) {
        Some(caps) => caps[1].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Best-effort scan for the order number and shop order note
///
/// Tiers are tried in order and each only fills what is still empty:
/// 1. fixed cells (B2 order number, B3 note, A2/B2 kept raw);
/// 2. labelled cells in the first rows of every sheet, the value one row
///    below a label, `Label: value` strings, then the first non-empty data
///    value of a labelled column;
/// 3. any record key or value mentioning "order", "note" or "shop".
///
/// Substring matching here is loose on purpose and can pick up unrelated
/// cells that merely contain "order". Nothing in here fails; when every tier
/// comes up empty the order number falls back to the file name without its
/// extension.
///
/// # Arguments
/// * `workbook` - The decoded first file
/// * `records` - Row records of its first sheet
/// * `file_name` - Name of the uploaded file
///
/// # Returns
/// * `OrderInfo` - Extracted values, empty strings where nothing was found
pub fn extract_order_info(
    workbook: &Workbook,
    records: &[RowRecord],
    file_name: &str,
) -> OrderInfo {
    let cells = fixed_cells(workbook);

    let mut order_no = if cells.b2.is_empty() {
        String::new()
    } else {
        order_no_from_b2(&cells.b2)
    };
    let mut shop_order_note = cells.b3.clone();

    if order_no.is_empty() || shop_order_note.is_empty() {
        let (scanned_order, scanned_note) = scan_labels(workbook, records);
        let (scanned_order, scanned_note) = scan_records(records, scanned_order, scanned_note);
        if order_no.is_empty() {
            order_no = scanned_order;
        }
        if shop_order_note.is_empty() {
            shop_order_note = scanned_note;
        }
    }

    if let Some(sheet) = workbook.first_sheet() {
        if order_no.is_empty() && sheet.cell("A1").is_some_and(|v| v.contains("Order No")) {
            order_no = sheet.cell("B1").unwrap_or_default().trim().to_string();
        }

        if shop_order_note.is_empty() {
            if file_name.contains("QuickReportOverview") {
                shop_order_note = file_stem(file_name);
            } else if sheet.cell("A2").is_some_and(|v| v.contains("Shop Order Note")) {
                shop_order_note = match sheet.cell("B2") {
                    Some(b2) => b2.trim().to_string(),
                    None => file_stem(file_name),
                };
            }
        }
    }

    if order_no.is_empty() {
        order_no = file_stem(file_name);
    }

    debug!("Order info for {}: order no '{}', note '{}'", file_name, order_no, shop_order_note);

    OrderInfo {
        order_no,
        shop_order_note,
        cell_a2_value: cells.a2,
        cell_b2_value: cells.b2,
    }
}

fn scan_labels(workbook: &Workbook, records: &[RowRecord]) -> (String, String) {
    let mut order_no = String::new();
    let mut note = String::new();
    let mut order_col: Option<usize> = None;
    let mut note_col: Option<usize> = None;

    for sheet in &workbook.sheets {
        let rows = sheet.rows();
        for (i, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
            for (j, raw) in row.iter().enumerate() {
                let cell = raw.trim();
                let lower = cell.to_lowercase();
                let below = rows
                    .get(i + 1)
                    .and_then(|r| r.get(j))
                    .filter(|v| !v.is_empty());

                if lower.contains("shop") && lower.contains("order") && lower.contains("note") {
                    note_col = Some(j);
                    if let Some(v) = below {
                        note = v.clone();
                    }
                }

                if lower.contains("order") && lower.contains("no") {
                    order_col = Some(j);
                    if let Some(v) = below {
                        order_no = v.clone();
                    }
                }

                if note.is_empty()
                    && cell.chars().count() > 5
                    && lower.contains("shop")
                    && lower.contains("order")
                {
                    if let Some(caps) = SHOP_NOTE_LABEL_REGEX.captures(cell) {
                        note = caps[1].trim().to_string();
                    }
                }

                if order_no.is_empty()
                    && cell.chars().count() > 3
                    && lower.contains("order")
                    && lower.contains("no")
                {
                    if let Some(caps) = ORDER_NO_LABEL_REGEX.captures(cell) {
                        order_no = caps[1].trim().to_string();
                    }
                }
            }
        }

        if order_col.is_some() || note_col.is_some() {
            for record in records {
                if let Some(col) = order_col.filter(|_| order_no.is_empty()) {
                    if let Some(v) = filled_value(record, col) {
                        order_no = v.to_string();
                        break;
                    }
                }
                if let Some(col) = note_col.filter(|_| note.is_empty()) {
                    if let Some(v) = filled_value(record, col) {
                        note = v.to_string();
                        break;
                    }
                }
            }
        }

        if !order_no.is_empty() && !note.is_empty() {
            break;
        }
    }

    (order_no, note)
}

fn filled_value(record: &RowRecord, col: usize) -> Option<&str> {
    record.nth_value(col).map(str::trim).filter(|v| !v.is_empty())
}

fn scan_records(records: &[RowRecord], mut order_no: String, mut note: String) -> (String, String) {
    if !order_no.is_empty() && !note.is_empty() {
        return (order_no, note);
    }

    for record in records {
        for (key, value) in &record.fields {
            let value = value.trim();
            let key_lower = key.to_lowercase();
            let value_lower = value.to_lowercase();

            let mentions_order = key_lower.contains("order") || value_lower.contains("order");
            if order_no.is_empty() && mentions_order {
                let candidate = ORDER_NO_PREFIX_REGEX.replace(value, "").trim().to_string();
                if !candidate.is_empty() {
                    order_no = candidate;
                }
            }

            let mentions_note = ["note", "shop"]
                .iter()
                .any(|w| key_lower.contains(w) || value_lower.contains(w));
            if note.is_empty() && mentions_note {
                let candidate = SHOP_NOTE_PREFIX_REGEX.replace(value, "").trim().to_string();
                if candidate.chars().count() > 5 {
                    note = candidate;
                }
            }
        }
    }

    (order_no, note)
}
