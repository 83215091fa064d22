use crate::dataset::Dataset;
use crate::filter::{SplitRows, split_webbing};
use crate::store::RowPosition;
use serde::{Deserialize, Serialize};

/// All datasets' regular rows side by side, two columns per dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTable {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
    /// For each body row, the `dataset.rows` index each column pair came
    /// from, or `None` for padding.
    #[serde(default)]
    pub sources: Vec<Vec<Option<usize>>>,
}

/// The webbing rows of a single dataset, always two columns wide.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebbingTable {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
    /// Index of the dataset the rows came from.
    pub source: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutput {
    pub merged: MergedTable,
    pub webbing: WebbingTable,
}

impl MergedTable {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Body row showing the dataset row at `pos`, if it is visible.
    pub fn body_row(&self, pos: RowPosition) -> Option<usize> {
        self.sources
            .iter()
            .position(|row| row.get(pos.dataset).copied().flatten() == Some(pos.row))
    }
}

impl WebbingTable {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Merge a snapshot of datasets into the merged and webbing tables
///
/// Webbing rows are split out of every dataset first. Row `i` of the merged
/// body holds row `i` of each dataset's regular rows (or two empty cells when
/// the dataset is shorter); rows that end up entirely blank are dropped.
/// The webbing table is built from the lowest-index dataset that has any
/// webbing rows. Webbing rows of later datasets appear in neither table.
///
/// This is a pure function of `datasets`.
///
/// # Arguments
/// * `datasets` - The dataset store, in column order
///
/// # Returns
/// * `MergeOutput` - Merged table and webbing table
pub fn merge_datasets(datasets: &[Dataset]) -> MergeOutput {
    let splits: Vec<SplitRows> = datasets.iter().map(split_webbing).collect();

    let max_rows = splits.iter().map(|s| s.regular.len()).max().unwrap_or(0);
    if max_rows == 0 && splits.iter().all(|s| s.webbing.is_empty()) {
        return MergeOutput::default();
    }

    let header: Vec<String> = datasets.iter().flat_map(|d| d.headings()).collect();

    let regular_indices: Vec<Vec<usize>> = datasets
        .iter()
        .map(|d| {
            d.rows
                .iter()
                .enumerate()
                .filter(|(_, r)| !r.is_webbing())
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let mut body = Vec::with_capacity(max_rows);
    let mut sources = Vec::with_capacity(max_rows);
    for i in 0..max_rows {
        let mut row = Vec::with_capacity(header.len());
        let mut origin = Vec::with_capacity(splits.len());
        for (split, indices) in splits.iter().zip(&regular_indices) {
            match split.regular.get(i) {
                Some(r) => {
                    row.push(r.panel_no.clone());
                    row.push(r.material.clone());
                    origin.push(indices.get(i).copied());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                    origin.push(None);
                }
            }
        }
        if row.iter().any(|cell| !cell.trim().is_empty()) {
            body.push(row);
            sources.push(origin);
        }
    }

    MergeOutput {
        merged: MergedTable {
            header,
            body,
            sources,
        },
        webbing: webbing_table(datasets, &splits),
    }
}

fn webbing_table(datasets: &[Dataset], splits: &[SplitRows]) -> WebbingTable {
    let Some(source) = splits.iter().position(|s| !s.webbing.is_empty()) else {
        return WebbingTable::default();
    };

    let dataset = &datasets[source];
    WebbingTable {
        header: dataset.headings().to_vec(),
        body: splits[source]
            .webbing
            .iter()
            .map(|r| vec![r.panel_no.clone(), r.material.clone()])
            .collect(),
        source: Some(source),
    }
}
