/*!
# Order List

A small web application that merges cutting-list spreadsheets into a single
printable order table, built in Rust.

## Overview

Each uploaded spreadsheet becomes a dataset of `(panel number, material)`
rows. Datasets are laid side by side, two columns each, in upload order.
Rows whose material mentions webbing are pulled out into a separate table,
and rows matching user-defined filter keywords are dropped. The order number
and shop order note are read from the first uploaded file.

## Architecture

### Core
- **workbook / loader**: decode CSV and Excel-family files into sheets with
  cell addressing and a row-record view
- **extractor**: turn row records into order rows
- **filter**: keyword exclusion and the webbing split
- **merge**: build the merged and webbing tables
- **store**: immutable dataset snapshots, heading edits, reordering and
  highlighted cells
- **order_info**: best-effort order number and shop order note detection
- **batch**: sequential processing of an upload batch

### Session and persistence
- **workspace**: the editing session the web layer works on
- **images**: the image canvas next to the order table
- **project / saving**: saved projects (gzip-compressed bincode files),
  filter keywords with a local cache, uploaded image files

### Output
- **report**: paginated printable HTML report (handlebars)
- **downloader**: CSV and XLSX export

### Web (feature `web`)
- **config**: server configuration
- **app**: axum routes

## REST API Endpoints

- `/api/upload` - Upload a batch of spreadsheets
- `/api/reorder`, `/api/heading`, `/api/highlight` - Edit the merged table
- `/api/save`, `/api/projects` - Save, list, load and delete projects
- `/api/keywords` - Manage filter keywords
- `/api/images` - Image canvas
- `/report`, `/api/export/csv`, `/api/export/xlsx` - Output
*/

pub mod batch;
pub mod config;
pub mod dataset;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod images;
pub mod loader;
pub mod merge;
pub mod order_info;
pub mod project;
pub mod report;
pub mod saving;
pub mod store;
pub mod workbook;
pub mod workspace;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the main types to make them easier to use
pub use batch::{BatchOutcome, UploadedFile, process_batch};
pub use dataset::{Dataset, OrderRow};
pub use error::{OrderError, Result};
pub use merge::{MergeOutput, MergedTable, WebbingTable, merge_datasets};
pub use order_info::{OrderInfo, extract_order_info};
pub use store::{CellKey, DatasetStore, HighlightSet, ReorderOptions, RowPosition, SwapMode};
pub use workbook::{Sheet, Workbook};
pub use workspace::Workspace;
