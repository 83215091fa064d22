use serde::{Deserialize, Serialize};

pub const DEFAULT_PANEL_HEADING: &str = "Panel No";
pub const DEFAULT_MATERIAL_HEADING: &str = "Material";

/// One line of a cutting list.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: String,
    pub panel_no: String,
    pub material: String,
}

impl OrderRow {
    pub fn new(
        id: impl Into<String>,
        panel_no: impl Into<String>,
        material: impl Into<String>,
    ) -> Self {
        OrderRow {
            id: id.into(),
            panel_no: panel_no.into(),
            material: material.into(),
        }
    }

    /// Whether the material mentions webbing, in any case.
    pub fn is_webbing(&self) -> bool {
        self.material.to_lowercase().contains("webbing")
    }
}

/// The rows and headings contributed by one uploaded spreadsheet.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub rows: Vec<OrderRow>,
    pub panel_heading: String,
    pub material_heading: String,
    #[serde(rename = "cellA2Value", default)]
    pub cell_a2_value: Option<String>,
    #[serde(rename = "cellB2Value", default)]
    pub cell_b2_value: Option<String>,
}

impl Dataset {
    pub fn create(id: impl Into<String>, rows: Vec<OrderRow>) -> Self {
        Dataset {
            id: id.into(),
            rows,
            panel_heading: DEFAULT_PANEL_HEADING.to_string(),
            material_heading: DEFAULT_MATERIAL_HEADING.to_string(),
            cell_a2_value: None,
            cell_b2_value: None,
        }
    }

    pub fn with_fixed_cells(mut self, a2: Option<String>, b2: Option<String>) -> Self {
        self.cell_a2_value = a2;
        self.cell_b2_value = b2;
        self
    }

    pub fn headings(&self) -> [String; 2] {
        [self.panel_heading.clone(), self.material_heading.clone()]
    }
}
