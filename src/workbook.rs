use serde::{Deserialize, Serialize};

/// A decoded spreadsheet file: ordered sheets of display strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// One worksheet. `grid[r][c]` is the cell at absolute row `r` and column
/// `c` (both 0-based), so `A1` is always `grid[0][0]`. Empty cells are empty
/// strings and rows may be ragged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub grid: Vec<Vec<String>>,
}

/// A data row keyed by header labels, in column order. Empty cells are not
/// present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowRecord {
    pub fields: Vec<(String, String)>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

impl Sheet {
    pub fn new(name: impl Into<String>, grid: Vec<Vec<String>>) -> Self {
        Sheet {
            name: name.into(),
            grid,
        }
    }

    /// Convenience constructor for literal grids.
    pub fn from_rows(name: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Sheet::new(name, grid)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
    }

    /// Value of a cell addressed like `B2`, or `None` when absent or empty.
    pub fn cell(&self, address: &str) -> Option<&str> {
        let (row, col) = parse_cell_address(address)?;
        self.get(row, col).filter(|v| !v.is_empty())
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.grid
    }

    /// Objects keyed by the labels of the first non-blank row.
    ///
    /// Blank labels become `__EMPTY`, `__EMPTY_1`, ...; a repeated label `L`
    /// becomes `L_1`, `L_2`, ... Blank data rows are skipped.
    pub fn records(&self) -> Vec<RowRecord> {
        let Some(header_idx) = self.grid.iter().position(|r| !is_blank(r)) else {
            return Vec::new();
        };
        let first_col = self
            .grid
            .iter()
            .filter_map(|r| r.iter().position(|c| !c.trim().is_empty()))
            .min()
            .unwrap_or(0);
        let width = self.grid.iter().map(|r| r.len()).max().unwrap_or(0);

        let header = &self.grid[header_idx];
        let mut labels: Vec<String> = Vec::with_capacity(width.saturating_sub(first_col));
        for col in first_col..width {
            let raw = header.get(col).map(|s| s.trim()).unwrap_or("");
            let base = if raw.is_empty() { "__EMPTY" } else { raw };
            let mut label = base.to_string();
            let mut n = 0;
            while labels.contains(&label) {
                n += 1;
                label = format!("{}_{}", base, n);
            }
            labels.push(label);
        }

        self.grid[header_idx + 1..]
            .iter()
            .filter_map(|row| {
                let fields: Vec<(String, String)> = labels
                    .iter()
                    .enumerate()
                    .filter_map(|(i, label)| {
                        let value = row.get(first_col + i)?;
                        if value.is_empty() {
                            None
                        } else {
                            Some((label.clone(), value.clone()))
                        }
                    })
                    .collect();
                if fields.is_empty() {
                    None
                } else {
                    Some(RowRecord { fields })
                }
            })
            .collect()
    }
}

impl RowRecord {
    pub fn new(fields: Vec<(&str, &str)>) -> Self {
        RowRecord {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the `n`-th key present in this record.
    pub fn nth_value(&self, n: usize) -> Option<&str> {
        self.fields.get(n).map(|(_, v)| v.as_str())
    }

    pub fn nth_key(&self, n: usize) -> Option<&str> {
        self.fields.get(n).map(|(k, _)| k.as_str())
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Parse an `A1`-style address into 0-based `(row, col)`.
pub fn parse_cell_address(address: &str) -> Option<(usize, usize)> {
    let mut letters = String::new();
    let mut digits = String::new();

    for c in address.trim().chars() {
        if c.is_ascii_alphabetic() {
            if !digits.is_empty() {
                return None;
            }
            letters.push(c.to_ascii_uppercase());
        } else if c.is_ascii_digit() {
            digits.push(c);
        } else {
            return None;
        }
    }

    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1));
    let row = digits.parse::<usize>().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
