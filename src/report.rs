use crate::dataset::{DEFAULT_MATERIAL_HEADING, DEFAULT_PANEL_HEADING};
use crate::error::{OrderError, Result};
use crate::merge::{MergedTable, WebbingTable};
use crate::store::{CellKey, HighlightSet};
use handlebars::Handlebars;
use serde::Serialize;

pub const ROWS_PER_PAGE: usize = 30;

const REPORT_TEMPLATE: &str = include_str!("./templates/report.hbs");

/// What the printable report is built from.
#[derive(Clone, Debug, Default)]
pub struct ReportInput {
    pub order_no: String,
    pub shop_order_note: String,
    /// Shown top right; the first dataset's A2 value.
    pub badge: Option<String>,
    pub merged: MergedTable,
    pub webbing: WebbingTable,
    pub hide_panel_columns: bool,
    pub highlights: HighlightSet,
}

#[derive(Serialize)]
struct CellView {
    text: String,
    highlighted: bool,
}

#[derive(Serialize)]
struct PageView {
    rows: Vec<Vec<CellView>>,
    filler_rows: Vec<usize>,
}

#[derive(Serialize)]
struct WebbingView {
    panel_heading: String,
    material_heading: String,
    rows: Vec<WebbingRowView>,
}

#[derive(Serialize)]
struct WebbingRowView {
    panel: String,
    material: String,
}

#[derive(Serialize)]
struct ReportView {
    title: String,
    note_lines: Vec<String>,
    badge: String,
    headers: Vec<String>,
    column_count: usize,
    blank_cells: Vec<usize>,
    pages: Vec<PageView>,
    webbing: Option<WebbingView>,
    generated_at: String,
}

/// Whether merged-table column `column` is left out of the report.
///
/// Only the first dataset keeps its panel column when panel columns are
/// hidden.
pub fn column_hidden(column: usize, hide_panel_columns: bool) -> bool {
    hide_panel_columns && column > 0 && column % 2 == 0
}

/// Split `rows` body rows into page sizes of [`ROWS_PER_PAGE`].
pub fn page_sizes(rows: usize) -> Vec<usize> {
    if rows == 0 {
        return vec![0];
    }
    (0..rows)
        .step_by(ROWS_PER_PAGE)
        .map(|start| (rows - start).min(ROWS_PER_PAGE))
        .collect()
}

/// Render the printable order report as an HTML document
///
/// Body rows are laid out in pages of 30 with a page-break row between
/// pages; the table header is printed once. Every page that is followed by
/// another one is padded with empty rows to a full page. Highlights are
/// looked up by each cell's position in the merged body.
///
/// # Arguments
/// * `input` - Tables, order info and display flags
/// * `generated_at` - Timestamp printed at the bottom of the report
///
/// # Returns
/// * `Result<String>` - The HTML document, or `EmptyReport` when there is no
///   merged header
///
/// # Examples
/// ```
/// use orderlist::merge::MergedTable;
/// use orderlist::report::{ReportInput, render_report};
///
/// let input = ReportInput {
///     order_no: "ORD-1".to_string(),
///     merged: MergedTable {
///         header: vec!["Panel No".to_string(), "Material".to_string()],
///         body: vec![vec!["P1".to_string(), "Fabric".to_string()]],
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let html = render_report(&input, "2024-01-01 10:00").unwrap();
/// assert!(html.contains("Fabric"));
/// ```
pub fn render_report(input: &ReportInput, generated_at: &str) -> Result<String> {
    if input.merged.is_empty() {
        return Err(OrderError::EmptyReport);
    }

    let view = build_view(input, generated_at);

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars.register_template_string("report", REPORT_TEMPLATE)?;

    Ok(handlebars.render("report", &view)?)
}

fn build_view(input: &ReportInput, generated_at: &str) -> ReportView {
    let hide = input.hide_panel_columns;
    let visible: Vec<usize> = (0..input.merged.header.len())
        .filter(|&c| !column_hidden(c, hide))
        .collect();

    let headers = visible
        .iter()
        .map(|&c| input.merged.header[c].clone())
        .collect();

    let sizes = page_sizes(input.merged.body.len());
    let page_count = sizes.len();
    let mut pages = Vec::with_capacity(page_count);
    let mut start = 0;

    for (page_index, size) in sizes.into_iter().enumerate() {
        let rows = input.merged.body[start..start + size]
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let row_index = start + offset;
                visible
                    .iter()
                    .map(|&c| CellView {
                        text: row.get(c).cloned().unwrap_or_default(),
                        highlighted: input.highlights.contains(&CellKey::for_column(c, row_index)),
                    })
                    .collect()
            })
            .collect();

        let filler = if page_index + 1 < page_count {
            ROWS_PER_PAGE - size
        } else {
            0
        };

        pages.push(PageView {
            rows,
            filler_rows: (0..filler).collect(),
        });
        start += size;
    }

    let webbing = (!input.webbing.is_empty()).then(|| WebbingView {
        panel_heading: heading_or(&input.webbing.header, 0, DEFAULT_PANEL_HEADING),
        material_heading: heading_or(&input.webbing.header, 1, DEFAULT_MATERIAL_HEADING),
        rows: input
            .webbing
            .body
            .iter()
            .map(|r| WebbingRowView {
                panel: r.first().cloned().unwrap_or_default(),
                material: r.get(1).cloned().unwrap_or_default(),
            })
            .collect(),
    });

    let title = if input.order_no.is_empty() {
        "Order Data".to_string()
    } else {
        input.order_no.clone()
    };

    ReportView {
        title,
        note_lines: input.shop_order_note.lines().map(str::to_string).collect(),
        badge: input.badge.clone().unwrap_or_default(),
        column_count: visible.len(),
        blank_cells: (0..visible.len()).collect(),
        headers,
        pages,
        webbing,
        generated_at: generated_at.to_string(),
    }
}

fn heading_or(header: &[String], index: usize, fallback: &str) -> String {
    match header.get(index) {
        Some(h) if !h.is_empty() => h.clone(),
        _ => fallback.to_string(),
    }
}
