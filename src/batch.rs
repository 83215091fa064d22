use crate::dataset::Dataset;
use crate::error::{OrderError, Result};
use crate::extractor::extract_rows;
use crate::filter::filter_rows;
use crate::loader::decode_workbook;
use crate::order_info::{OrderInfo, extract_order_info, fixed_cells};
use crate::workbook::Workbook;
use log::{debug, info, warn};

/// One file of an upload batch.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Everything one upload batch produced, including per-file failures.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    pub datasets: Vec<Dataset>,
    pub order_info: Option<OrderInfo>,
    pub errors: Vec<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes,
        }
    }
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Decode, extract and filter a batch of uploaded files
///
/// Files are handled strictly one after another so that dataset order equals
/// upload order. A file that cannot be decoded adds a message to `errors` and
/// the batch carries on with the next file. The first file that decodes
/// seeds the order information.
///
/// # Arguments
/// * `files` - Uploaded files, in upload order
/// * `keywords` - Exclusion keywords applied to every file's rows
///
/// # Returns
/// * `BatchOutcome` - Datasets, order info and surfaced error messages
pub fn process_batch(files: &[UploadedFile], keywords: &[String]) -> BatchOutcome {
    let stamp = chrono::Utc::now().timestamp_millis();
    process_batch_at(files, keywords, stamp)
}

/// Same as [`process_batch`] with an explicit batch timestamp.
pub fn process_batch_at(files: &[UploadedFile], keywords: &[String], stamp: i64) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    if files.is_empty() {
        outcome.errors.push("No files selected for upload".to_string());
        return outcome;
    }

    info!("Processing {} uploaded file(s)", files.len());

    for (index, file) in files.iter().enumerate() {
        let workbook = match decode_workbook(&file.name, &file.bytes) {
            Ok(workbook) => workbook,
            Err(e) => {
                warn!("{}", e);
                outcome.errors.push(e.to_string());
                continue;
            }
        };

        let seed_order_info = outcome.order_info.is_none();
        match build_dataset(&workbook, &file.name, index, keywords, stamp, seed_order_info) {
            Ok((dataset, order_info)) => {
                if order_info.is_some() {
                    outcome.order_info = order_info;
                }
                outcome.datasets.push(dataset);
            }
            Err(e) => {
                warn!("{}", e);
                outcome.errors.push(e.to_string());
            }
        }
    }

    if outcome.datasets.is_empty() {
        outcome
            .errors
            .push("No valid data could be extracted from the uploaded files.".to_string());
    }

    outcome
}

fn build_dataset(
    workbook: &Workbook,
    file_name: &str,
    index: usize,
    keywords: &[String],
    stamp: i64,
    seed_order_info: bool,
) -> Result<(Dataset, Option<OrderInfo>)> {
    let sheet = workbook
        .first_sheet()
        .ok_or_else(|| OrderError::decode(file_name, "No worksheets found"))?;

    let records = sheet.records();
    let rows = extract_rows(&records, stamp, index);
    let total = rows.len();
    let rows = filter_rows(rows, keywords);
    debug!(
        "File {} parsed: {} rows, {} kept after keyword filter",
        file_name,
        total,
        rows.len()
    );

    let cells = fixed_cells(workbook);
    let dataset = Dataset::create(format!("excel-{}-{}", stamp, index), rows)
        .with_fixed_cells(non_empty(cells.a2), non_empty(cells.b2));

    let order_info = seed_order_info.then(|| extract_order_info(workbook, &records, file_name));
    Ok((dataset, order_info))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
