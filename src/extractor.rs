use crate::dataset::OrderRow;
use crate::workbook::RowRecord;

const PANEL_KEYS: [&str; 3] = ["Panel No", "Note Text", "Cutting"];
const MATERIAL_KEYS: [&str; 2] = ["Description", "Material"];

/// Turn the row records of one sheet into cutting-list rows
///
/// `panel_no` comes from the first non-empty of `Panel No`, `Note Text`,
/// `Cutting` or the first column present in the record; `material` from
/// `Description`, `Material` or the second column present. Both then lose a
/// leading `cutting-s` / `cutting` marker.
///
/// # Arguments
/// * `records` - Records of the sheet, in sheet order
/// * `batch_stamp` - Timestamp shared by every file of one upload batch
/// * `file_index` - Position of the file within the batch
///
/// # Returns
/// * `Vec<OrderRow>` - One row per record; ids are `{stamp}-{file}-{row}`
///
/// # Examples
/// ```
/// use orderlist::extractor::extract_rows;
/// use orderlist::workbook::RowRecord;
///
/// let records = vec![RowRecord::new(vec![("Panel No", "Cutting-S P1"), ("Material", "Oak")])];
/// let rows = extract_rows(&records, 1700000000000, 0);
/// assert_eq!(rows[0].panel_no, "P1");
/// assert_eq!(rows[0].id, "1700000000000-0-0");
/// ```
pub fn extract_rows(records: &[RowRecord], batch_stamp: i64, file_index: usize) -> Vec<OrderRow> {
    records
        .iter()
        .enumerate()
        .map(|(row_index, record)| {
            let panel_no = first_non_empty(record, &PANEL_KEYS, 0);
            let material = first_non_empty(record, &MATERIAL_KEYS, 1);

            OrderRow {
                id: row_id(batch_stamp, file_index, row_index),
                panel_no: strip_cutting_prefix(&panel_no),
                material: strip_cutting_prefix(&material),
            }
        })
        .collect()
}

pub fn row_id(batch_stamp: i64, file_index: usize, row_index: usize) -> String {
    format!("{}-{}-{}", batch_stamp, file_index, row_index)
}

fn first_non_empty(record: &RowRecord, keys: &[&str], fallback_position: usize) -> String {
    keys.iter()
        .filter_map(|key| record.get(key))
        .chain(record.nth_value(fallback_position))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Remove a leading `cutting-s` or `cutting` marker, ignoring case, and trim
/// what is left. Other values come back unchanged.
///
/// ```
/// use orderlist::extractor::strip_cutting_prefix;
///
/// assert_eq!(strip_cutting_prefix("Cutting-S Panel A"), "Panel A");
/// assert_eq!(strip_cutting_prefix("CUTTINGFrame"), "Frame");
/// assert_eq!(strip_cutting_prefix("Frame"), "Frame");
/// ```
pub fn strip_cutting_prefix(value: &str) -> String {
    for prefix in ["cutting-s", "cutting"] {
        let matches = value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return value[prefix.len()..].trim().to_string();
        }
    }
    value.to_string()
}
