use crate::dataset::{Dataset, OrderRow};

/// Drop every row whose material contains one of the keywords
///
/// Matching is a case-insensitive substring test against `material` only.
/// Survivors keep their order. An empty keyword list keeps everything.
///
/// # Arguments
/// * `rows` - Rows to filter
/// * `keywords` - Exclusion keywords as configured by the user
///
/// # Returns
/// * `Vec<OrderRow>` - The retained rows
pub fn filter_rows(rows: Vec<OrderRow>, keywords: &[String]) -> Vec<OrderRow> {
    if keywords.is_empty() {
        return rows;
    }

    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    rows.into_iter()
        .filter(|row| !is_excluded(&row.material, &lowered))
        .collect()
}

fn is_excluded(material: &str, lowered_keywords: &[String]) -> bool {
    let material = material.to_lowercase();
    lowered_keywords.iter().any(|k| material.contains(k.as_str()))
}

/// A dataset's rows split into regular and webbing items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitRows {
    pub regular: Vec<OrderRow>,
    pub webbing: Vec<OrderRow>,
}

/// Partition a dataset into regular rows and webbing rows, both in their
/// original relative order.
pub fn split_webbing(dataset: &Dataset) -> SplitRows {
    let (webbing, regular) = dataset.rows.iter().cloned().partition(OrderRow::is_webbing);
    SplitRows { regular, webbing }
}
