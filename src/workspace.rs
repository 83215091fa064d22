use crate::batch::BatchOutcome;
use crate::error::{OrderError, Result};
use crate::images::{ImageCanvas, ImageItem};
use crate::merge::MergeOutput;
use crate::order_info::OrderInfo;
use crate::project::{Project, StoredProject};
use crate::report::ReportInput;
use crate::store::{CellKey, DatasetStore, HighlightSet, ReorderOptions, RowPosition, reorder};
use log::info;
use serde::Serialize;

/// Editing session for one order
///
/// Owns the current dataset snapshot and everything derived from it. Every
/// operation that changes the snapshot re-runs the merge, so `tables` always
/// matches `store`.
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    order_no: String,
    shop_order_note: String,
    store: DatasetStore,
    tables: MergeOutput,
    highlights: HighlightSet,
    canvas: ImageCanvas,
    hide_panel_columns: bool,
}

/// Serialisable view of a workspace for the browser.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView<'a> {
    pub order_no: &'a str,
    pub shop_order_note: &'a str,
    pub datasets: &'a [crate::dataset::Dataset],
    pub merged: &'a crate::merge::MergedTable,
    pub webbing: &'a crate::merge::WebbingTable,
    pub highlighted_cells: Vec<String>,
    pub images: &'a [ImageItem],
    pub hide_panel_columns: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace::default()
    }

    pub fn order_no(&self) -> &str {
        &self.order_no
    }

    pub fn shop_order_note(&self) -> &str {
        &self.shop_order_note
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn tables(&self) -> &MergeOutput {
        &self.tables
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn images(&self) -> &[ImageItem] {
        self.canvas.items()
    }

    pub fn hide_panel_columns(&self) -> bool {
        self.hide_panel_columns
    }

    pub fn view(&self) -> WorkspaceView<'_> {
        WorkspaceView {
            order_no: &self.order_no,
            shop_order_note: &self.shop_order_note,
            datasets: self.store.datasets(),
            merged: &self.tables.merged,
            webbing: &self.tables.webbing,
            highlighted_cells: self.highlights.to_keys(),
            images: self.canvas.items(),
            hide_panel_columns: self.hide_panel_columns,
        }
    }

    fn replace_store(&mut self, store: DatasetStore) {
        self.tables = store.merge();
        self.store = store;
    }

    /// Replace all datasets with the result of an upload batch
    ///
    /// Highlights are cleared since their positions refer to the old rows.
    /// Order number and note are overwritten only when the batch produced
    /// order info; images stay where they are.
    pub fn apply_batch(&mut self, outcome: BatchOutcome) {
        if let Some(OrderInfo {
            order_no,
            shop_order_note,
            ..
        }) = outcome.order_info
        {
            self.order_no = order_no;
            self.shop_order_note = shop_order_note;
        }
        self.highlights.clear();
        info!("Workspace now holds {} dataset(s)", outcome.datasets.len());
        self.replace_store(DatasetStore::new(outcome.datasets));
    }

    pub fn edit_heading(&mut self, dataset: usize, panel_column: bool, value: &str) {
        let next = self.store.with_heading(dataset, panel_column, value);
        self.replace_store(next);
    }

    /// Swap two rows. Returns `false` when the swap was a no-op.
    pub fn reorder(&mut self, from: RowPosition, to: RowPosition, options: ReorderOptions) -> bool {
        match reorder(&self.store, &mut self.highlights, from, to, options) {
            Some(next) => {
                self.replace_store(next);
                true
            }
            None => false,
        }
    }

    pub fn toggle_highlight(&mut self, key: CellKey) -> bool {
        self.highlights.toggle(key)
    }

    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    pub fn set_order_info(&mut self, order_no: &str, shop_order_note: &str) {
        self.order_no = order_no.to_string();
        self.shop_order_note = shop_order_note.to_string();
    }

    pub fn set_hide_panel_columns(&mut self, hide: bool) {
        self.hide_panel_columns = hide;
    }

    pub fn add_image(&mut self, src: impl Into<String>, natural: (u32, u32)) -> ImageItem {
        self.canvas.add(src, natural).clone()
    }

    pub fn move_image(&mut self, id: &str, x: i32, y: i32) -> Result<ImageItem> {
        let item = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| OrderError::NotFound(format!("Image {}", id)))?;
        item.move_to(x, y);
        Ok(item.clone())
    }

    pub fn resize_image(&mut self, id: &str, delta: i32) -> Result<ImageItem> {
        let item = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| OrderError::NotFound(format!("Image {}", id)))?;
        item.resize_by(delta);
        Ok(item.clone())
    }

    pub fn remove_image(&mut self, id: &str) -> Option<ImageItem> {
        self.canvas.remove(id)
    }

    /// The project to persist
    ///
    /// Fails with a validation error, before anything touches a store, when
    /// the order number is blank or there is no dataset.
    pub fn to_project(&self) -> Result<Project> {
        if self.order_no.trim().is_empty() {
            return Err(OrderError::Validation("Order No is required.".to_string()));
        }
        if self.store.is_empty() {
            return Err(OrderError::Validation(
                "Please upload at least one Excel file before saving.".to_string(),
            ));
        }

        Ok(Project {
            order_no: self.order_no.clone(),
            shop_order_note: self.shop_order_note.clone(),
            datasets: self.store.datasets().to_vec(),
            images: self.canvas.items().to_vec(),
            highlighted_cells: self.highlights.to_keys(),
        })
    }

    /// Replace the whole session with a saved project. Panel columns are
    /// hidden after loading.
    pub fn load_project(&mut self, stored: StoredProject) {
        let project = stored.project;
        info!("Loading project {} ({})", stored.id, project.order_no);

        self.order_no = project.order_no;
        self.shop_order_note = project.shop_order_note;
        self.highlights = HighlightSet::from_keys(&project.highlighted_cells);
        self.canvas = ImageCanvas::new(project.images);
        self.hide_panel_columns = true;
        self.replace_store(DatasetStore::new(project.datasets));
    }

    pub fn report_input(&self) -> ReportInput {
        ReportInput {
            order_no: self.order_no.clone(),
            shop_order_note: self.shop_order_note.clone(),
            badge: self
                .store
                .get(0)
                .and_then(|d| d.cell_a2_value.clone())
                .filter(|v| !v.is_empty()),
            merged: self.tables.merged.clone(),
            webbing: self.tables.webbing.clone(),
            hide_panel_columns: self.hide_panel_columns,
            highlights: self.highlights.clone(),
        }
    }
}
