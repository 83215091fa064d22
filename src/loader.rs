use crate::error::{OrderError, Result};
use crate::workbook::{Sheet, Workbook};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

/// Decode a CSV file into a single-sheet workbook
///
/// The sheet takes the file stem as its name. Rows may have different
/// lengths; quoting follows the usual CSV rules.
///
/// # Arguments
/// * `file_name` - Original file name, used for the sheet name and errors
/// * `bytes` - Raw file content
///
/// # Returns
/// * `Result<Workbook>` - The decoded workbook or a `Decode` error
pub fn from_csv(file_name: &str, bytes: &[u8]) -> Result<Workbook> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| OrderError::decode(file_name, e))?;
        grid.push(record.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }

    if grid.is_empty() {
        return Err(OrderError::decode(file_name, "CSV file is empty"));
    }

    Ok(Workbook::new(vec![Sheet::new(file_stem(file_name), grid)]))
}

/// Decode an Excel or OpenDocument workbook
///
/// Every worksheet is read; cells are rendered as display strings and placed
/// at their absolute position so that `A2` style lookups keep working when
/// the used range does not start at `A1`.
///
/// # Arguments
/// * `file_name` - Original file name, used in error messages
/// * `bytes` - Raw file content
///
/// # Returns
/// * `Result<Workbook>` - The decoded workbook or a `Decode` error
///
/// # Errors
/// * The content is not a workbook calamine understands
/// * The workbook has no worksheets
pub fn from_excel(file_name: &str, bytes: &[u8]) -> Result<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| OrderError::decode(file_name, e))?;

    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(OrderError::decode(file_name, "No worksheets found"));
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| OrderError::decode(file_name, e))?;

        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut grid = vec![Vec::new(); row0 as usize + range.height()];
        for (r, row) in range.rows().enumerate() {
            let target = &mut grid[row0 as usize + r];
            target.resize(col0 as usize + row.len(), String::new());
            for (c, cell) in row.iter().enumerate() {
                target[col0 as usize + c] = data_to_string(cell);
            }
        }
        sheets.push(Sheet::new(name, grid));
    }

    Ok(Workbook::new(sheets))
}

/// Render one calamine cell the way a spreadsheet would display it.
pub fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integral floats lose their fractional part (`12.0` -> `12`).
pub fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Detect file type from the extension and decode
///
/// # Arguments
/// * `file_name` - Name of the uploaded file (only the extension is inspected)
/// * `bytes` - Raw file content
///
/// # Returns
/// * `Result<Workbook>` - The decoded workbook or a `Decode` error
pub fn decode_workbook(file_name: &str, bytes: &[u8]) -> Result<Workbook> {
    if bytes.is_empty() {
        return Err(OrderError::decode(file_name, "No data found"));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(file_name, bytes),
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
            from_excel(file_name, bytes)
        }
        Some(ext) => Err(OrderError::decode(
            file_name,
            format!("Unsupported file extension: {}", ext),
        )),
        None => Err(OrderError::decode(file_name, "File has no extension")),
    }
}

/// Read a workbook from disk.
pub fn load_workbook(path: impl AsRef<Path>) -> Result<Workbook> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    decode_workbook(name, &bytes)
}

/// File name without its last extension (`orders.v2.xlsx` -> `orders.v2`).
pub fn file_stem(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name[..idx].to_string(),
        _ => file_name.to_string(),
    }
}
