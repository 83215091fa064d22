#![cfg(not(tarpaulin_include))]

use clap::{Parser, ValueEnum};
use orderlist::batch::{UploadedFile, process_batch};
use orderlist::downloader::{to_csv, to_xlsx};
use orderlist::report::render_report;
use orderlist::workspace::Workspace;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Html,
    Csv,
    Xlsx,
}

/// Merge cutting-list spreadsheets into one order table
#[derive(Debug, Parser)]
#[command(name = "orderlist-cli", version, about)]
struct Cli {
    /// Spreadsheets to merge, in column order (.xlsx, .xls, .ods, .csv, ...)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Leave out rows whose material contains this keyword (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// JSON file holding a list of keywords
    #[arg(long)]
    keywords_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Output file; standard output when missing (not for xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep only the first dataset's panel column in the report
    #[arg(long)]
    hide_panels: bool,

    /// Use this order number instead of the one found in the first file
    #[arg(long)]
    order_no: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let mut keywords = cli.keywords.clone();
    if let Some(path) = &cli.keywords_file {
        let listed: Vec<String> = serde_json::from_str(&fs::read_to_string(path)?)?;
        keywords.extend(listed);
    }

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        files.push(UploadedFile::new(name, fs::read(path)?));
    }

    let outcome = process_batch(&files, &keywords);
    for message in &outcome.errors {
        eprintln!("{}", message);
    }
    if outcome.is_empty() {
        return Err("nothing to merge".into());
    }

    let mut workspace = Workspace::new();
    workspace.apply_batch(outcome);
    workspace.set_hide_panel_columns(cli.hide_panels);
    if let Some(order_no) = &cli.order_no {
        let note = workspace.shop_order_note().to_string();
        workspace.set_order_info(order_no, &note);
    }

    let tables = workspace.tables();
    let bytes = match cli.format {
        OutputFormat::Html => {
            let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            render_report(&workspace.report_input(), &generated_at)?.into_bytes()
        }
        OutputFormat::Csv => to_csv(&tables.merged, &tables.webbing)?.into_bytes(),
        OutputFormat::Xlsx => to_xlsx(&tables.merged, &tables.webbing)?,
    };

    match &cli.output {
        Some(path) => fs::write(path, &bytes)?,
        None if matches!(cli.format, OutputFormat::Xlsx) => {
            return Err("xlsx output needs --output".into());
        }
        None => io::stdout().write_all(&bytes)?,
    }

    eprintln!(
        "[{:.1}] order {}: {} dataset(s), {} merged row(s), {} webbing row(s)",
        start.elapsed().as_secs_f64(),
        workspace.order_no(),
        workspace.store().len(),
        tables.merged.body.len(),
        tables.webbing.body.len()
    );
    Ok(())
}
