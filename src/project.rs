use crate::dataset::Dataset;
use crate::images::ImageItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted aggregate. Upserts are keyed by `order_no`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub order_no: String,
    pub shop_order_note: String,
    pub datasets: Vec<Dataset>,
    pub images: Vec<ImageItem>,
    pub highlighted_cells: Vec<String>,
}

/// A project as held by a repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProject {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project: Project,
}

/// One line of the saved-projects list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub order_no: String,
    pub shop_order_note: String,
    pub created_at: DateTime<Utc>,
    pub dataset_count: usize,
    pub row_count: usize,
    pub image_count: usize,
}

impl StoredProject {
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            order_no: self.project.order_no.clone(),
            shop_order_note: self.project.shop_order_note.clone(),
            created_at: self.created_at,
            dataset_count: self.project.datasets.len(),
            row_count: self.project.datasets.iter().map(|d| d.rows.len()).sum(),
            image_count: self.project.images.len(),
        }
    }
}
