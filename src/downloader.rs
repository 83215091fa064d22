use crate::error::{OrderError, Result};
use crate::merge::{MergedTable, WebbingTable};
use rust_xlsxwriter::{Format, Workbook};

const WEBBING_TITLE: &str = "Webbing Details";

/// Convert the merged table to CSV
///
/// The merged header and body are written first. When there are webbing
/// rows they follow, introduced by a "Webbing Details" line and their own
/// two-column header.
///
/// # Arguments
/// * `merged` - The merged order table
/// * `webbing` - The webbing table, possibly empty
///
/// # Returns
/// * `Result<String>` - CSV content, or `EmptyReport` when there is no data
///
/// # Examples
/// ```
/// use orderlist::merge::{MergedTable, WebbingTable};
/// use orderlist::downloader::to_csv;
///
/// let merged = MergedTable {
///     header: vec!["Panel No".to_string(), "Material".to_string()],
///     body: vec![vec!["P1".to_string(), "Fabric, blue".to_string()]],
///     ..Default::default()
/// };
/// let csv = to_csv(&merged, &WebbingTable::default()).unwrap();
/// assert_eq!(csv, "Panel No,Material\nP1,\"Fabric, blue\"\n");
/// ```
pub fn to_csv(merged: &MergedTable, webbing: &WebbingTable) -> Result<String> {
    if merged.is_empty() {
        return Err(OrderError::EmptyReport);
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    let csv_err = |e: csv::Error| OrderError::Persistence(e.to_string());

    writer.write_record(&merged.header).map_err(csv_err)?;
    for row in &merged.body {
        writer.write_record(row).map_err(csv_err)?;
    }

    if !webbing.is_empty() {
        writer.write_record([WEBBING_TITLE]).map_err(csv_err)?;
        writer.write_record(&webbing.header).map_err(csv_err)?;
        for row in &webbing.body {
            writer.write_record(row).map_err(csv_err)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OrderError::Persistence(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OrderError::Persistence(e.to_string()))
}

/// Convert the merged table to XLSX
///
/// One worksheet "Order" holds the merged table with a bold header row; a
/// second worksheet "Webbing" is added when there are webbing rows.
///
/// # Arguments
/// * `merged` - The merged order table
/// * `webbing` - The webbing table, possibly empty
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes
pub fn to_xlsx(merged: &MergedTable, webbing: &WebbingTable) -> Result<Vec<u8>> {
    if merged.is_empty() {
        return Err(OrderError::EmptyReport);
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Order")?;
    write_table(worksheet, &merged.header, &merged.body, &bold)?;

    if !webbing.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Webbing")?;
        write_table(worksheet, &webbing.header, &webbing.body, &bold)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    header: &[String],
    body: &[Vec<String>],
    bold: &Format,
) -> Result<()> {
    for (c, text) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, text, bold)?;
    }
    for (r, row) in body.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            if !text.is_empty() {
                worksheet.write_string((r + 1) as u32, c as u16, text)?;
            }
        }
    }
    Ok(())
}
