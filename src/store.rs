use crate::dataset::Dataset;
use crate::merge::{MergeOutput, merge_datasets};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Ordered datasets, one per uploaded file. Column order of the merged table
/// is the order of this store.
///
/// Snapshots are values: every edit returns a new store and leaves the
/// original untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStore {
    datasets: Vec<Dataset>,
}

/// Address of one row inside one dataset (not inside the merged table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowPosition {
    pub dataset: usize,
    pub row: usize,
}

/// What a reorder exchanges between two positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    /// Exchange panel number and material; each row keeps its id.
    #[default]
    CellPair,
    /// Exchange the complete rows, ids included.
    WholeRow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOptions {
    #[serde(default)]
    pub mode: SwapMode,
    /// Move highlight marks together with the swapped content.
    #[serde(default)]
    pub carry_highlights: bool,
}

impl RowPosition {
    pub fn new(dataset: usize, row: usize) -> Self {
        RowPosition { dataset, row }
    }
}

impl DatasetStore {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        DatasetStore { datasets }
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn into_datasets(self) -> Vec<Dataset> {
        self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dataset> {
        self.datasets.get(index)
    }

    pub fn contains(&self, pos: RowPosition) -> bool {
        self.datasets
            .get(pos.dataset)
            .is_some_and(|d| pos.row < d.rows.len())
    }

    pub fn merge(&self) -> MergeOutput {
        merge_datasets(&self.datasets)
    }

    /// Snapshot with one heading replaced. Any string is accepted, the empty
    /// string included. An out-of-range index returns an unchanged copy.
    pub fn with_heading(&self, dataset: usize, panel_column: bool, value: &str) -> DatasetStore {
        let mut next = self.clone();
        if let Some(d) = next.datasets.get_mut(dataset) {
            if panel_column {
                d.panel_heading = value.to_string();
            } else {
                d.material_heading = value.to_string();
            }
        }
        next
    }

    /// Snapshot with the rows at `a` and `b` swapped
    ///
    /// Returns `None` when nothing changes: both positions are the same, or
    /// either one does not address an existing row.
    ///
    /// # Arguments
    /// * `a` - Dragged position
    /// * `b` - Drop position
    /// * `mode` - Swap content only, or whole rows including ids
    pub fn swapped(&self, a: RowPosition, b: RowPosition, mode: SwapMode) -> Option<DatasetStore> {
        if a == b || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let mut next = self.clone();
        let first = next.datasets[a.dataset].rows[a.row].clone();
        let second = next.datasets[b.dataset].rows[b.row].clone();

        match mode {
            SwapMode::CellPair => {
                let target = &mut next.datasets[a.dataset].rows[a.row];
                target.panel_no = second.panel_no;
                target.material = second.material;
                let target = &mut next.datasets[b.dataset].rows[b.row];
                target.panel_no = first.panel_no;
                target.material = first.material;
            }
            SwapMode::WholeRow => {
                next.datasets[a.dataset].rows[a.row] = second;
                next.datasets[b.dataset].rows[b.row] = first;
            }
        }

        Some(next)
    }
}

/// Which half of a dataset's column pair a cell belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Panel,
    Material,
}

impl CellKind {
    pub fn for_column(column: usize) -> Self {
        if column % 2 == 0 {
            CellKind::Panel
        } else {
            CellKind::Material
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Panel => "panel",
            CellKind::Material => "material",
        }
    }
}

/// Key of a highlighted cell, written `"{panel|material}-{dataset}-{row}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellKey {
    pub kind: CellKind,
    pub dataset: usize,
    pub row: usize,
}

impl CellKey {
    pub fn new(kind: CellKind, dataset: usize, row: usize) -> Self {
        CellKey { kind, dataset, row }
    }

    /// Key for column `column` of a merged-table row.
    pub fn for_column(column: usize, row: usize) -> Self {
        CellKey::new(CellKind::for_column(column), column / 2, row)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.kind.as_str(), self.dataset, self.row)
    }
}

impl FromStr for CellKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '-');
        let kind = match parts.next() {
            Some("panel") => CellKind::Panel,
            Some("material") => CellKind::Material,
            _ => return Err(format!("invalid cell key: {}", s)),
        };
        let dataset = parts.next().and_then(|p| p.parse().ok());
        let row = parts.next().and_then(|p| p.parse().ok());
        match (dataset, row) {
            (Some(dataset), Some(row)) => Ok(CellKey { kind, dataset, row }),
            _ => Err(format!("invalid cell key: {}", s)),
        }
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CellKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Cells the user marked for emphasis in the printed report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSet {
    keys: BTreeSet<CellKey>,
}

impl HighlightSet {
    pub fn new() -> Self {
        HighlightSet::default()
    }

    /// Build from stored keys; unparseable entries are skipped.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        HighlightSet {
            keys: keys.iter().filter_map(|k| k.as_ref().parse().ok()).collect(),
        }
    }

    /// Flip a key; returns whether it is highlighted afterwards.
    pub fn toggle(&mut self, key: CellKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_keys(&self) -> Vec<String> {
        self.keys.iter().map(CellKey::to_string).collect()
    }

    /// Move the marks of whole column-pair rows, both halves of the pair
    ///
    /// Each move is `(dataset, body row)` to an optional `(dataset, body row)`;
    /// a move without a destination drops the marks. All marks are lifted
    /// before any is placed, so moves may exchange rows.
    pub fn move_rows(&mut self, moves: &[((usize, usize), Option<(usize, usize)>)]) {
        let mut lifted = Vec::new();
        for &(from, to) in moves {
            for kind in [CellKind::Panel, CellKind::Material] {
                if self.keys.remove(&CellKey::new(kind, from.0, from.1)) {
                    lifted.push((kind, to));
                }
            }
        }
        for (kind, to) in lifted {
            if let Some((dataset, row)) = to {
                self.keys.insert(CellKey::new(kind, dataset, row));
            }
        }
    }
}

/// Reorder a store and its highlights in one step
///
/// Positions address `dataset.rows`; highlight keys address merged-body
/// rows. With `carry_highlights` each position's marks follow its content
/// to the body row it lands on after the swap.
///
/// # Returns
/// * `Option<DatasetStore>` - The new snapshot, or `None` for a no-op
pub fn reorder(
    store: &DatasetStore,
    highlights: &mut HighlightSet,
    from: RowPosition,
    to: RowPosition,
    options: ReorderOptions,
) -> Option<DatasetStore> {
    let next = store.swapped(from, to, options.mode)?;
    if options.carry_highlights {
        let before = store.merge().merged;
        let after = next.merge().merged;
        let mut moves = Vec::with_capacity(2);
        for (source, target) in [(from, to), (to, from)] {
            if let Some(row) = before.body_row(source) {
                let landed = after.body_row(target).map(|r| (target.dataset, r));
                moves.push(((source.dataset, row), landed));
            }
        }
        highlights.move_rows(&moves);
    }
    Some(next)
}
