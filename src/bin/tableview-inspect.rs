/// TableView Inspector
///
/// Loads JSON rows into a pipeline, applies the configured filter and sort,
/// and prints the resulting view.
///
/// Configuration comes from the environment:
/// - `TABLEVIEW_ROWS`: path to a JSON array of row objects (required)
/// - `TABLEVIEW_COLUMNS`: path to a JSON array of column specs
/// - `TABLEVIEW_FILTER`: filter expression, e.g. `score > 90 AND name ^= 'A'`
/// - `TABLEVIEW_SORT`: sort spec, e.g. `score:desc,name:asc`
/// - `TABLEVIEW_LIMIT`: rows to print (default 20)
/// - `TABLEVIEW_FORMAT`: `table` or `json` (default `table`)

use log::{error, info};
use std::fs;
use std::process::ExitCode;
use tableview::json::infer_columns;
use tableview::{
    compile_filters, export, parse_columns, parse_rows, parse_sorts, ColumnSpec, Pipeline, View, ViewError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

#[derive(Debug)]
struct InspectConfig {
    rows: String,
    columns: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    limit: usize,
    format: Format,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl InspectConfig {
    fn from_env() -> Result<Self, ViewError> {
        let rows = optional_var("TABLEVIEW_ROWS")
            .ok_or_else(|| ViewError::config("TABLEVIEW_ROWS", "path to a JSON rows file is required"))?;
        let limit = std::env::var("TABLEVIEW_LIMIT")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|_| ViewError::config("TABLEVIEW_LIMIT", "must be a non-negative number"))?;
        let format = match std::env::var("TABLEVIEW_FORMAT")
            .unwrap_or_else(|_| "table".to_string())
            .as_str()
        {
            "table" => Format::Table,
            "json" => Format::Json,
            other => return Err(ViewError::config("TABLEVIEW_FORMAT", format!("unknown format '{}'", other))),
        };

        Ok(InspectConfig {
            rows,
            columns: optional_var("TABLEVIEW_COLUMNS"),
            filter: optional_var("TABLEVIEW_FILTER"),
            sort: optional_var("TABLEVIEW_SORT"),
            limit,
            format,
        })
    }
}

fn read(name: &str, path: &str) -> Result<String, ViewError> {
    fs::read_to_string(path).map_err(|e| ViewError::config(name, format!("{}: {}", path, e)))
}

fn run(config: &InspectConfig) -> Result<(), ViewError> {
    let rows = parse_rows(&read("TABLEVIEW_ROWS", &config.rows)?)?;
    let specs = match &config.columns {
        Some(path) => parse_columns(&read("TABLEVIEW_COLUMNS", path)?)?,
        None => infer_columns(&rows),
    };
    info!("loaded {} rows, {} columns", rows.len(), specs.len());

    let descriptors: Vec<_> = specs.into_iter().map(ColumnSpec::into_descriptor).collect();
    let pipeline = Pipeline::new(&descriptors, rows);
    if let Some(filter) = &config.filter {
        pipeline.filter().set_filters(compile_filters(filter)?);
    }
    if let Some(sort) = &config.sort {
        pipeline.sort().set_sorts(parse_sorts(sort)?);
    }

    let output = pipeline.output();
    info!("{} of {} rows visible", output.len(), pipeline.root().len());

    match config.format {
        Format::Json => {
            let mut document = export(&*output)?;
            if let Some(rows) = document.get_mut("rows").and_then(|r| r.as_array_mut()) {
                rows.truncate(config.limit);
            }
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Format::Table => print_table(&*output, config.limit),
    }
    Ok(())
}

fn print_table(view: &dyn View<serde_json::Value>, limit: usize) {
    let columns = view.columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| ((c.layout().width / 8.0) as usize).max(c.id().len()).max(4))
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.id(), w = *w))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));

    let data = view.data();
    for row in data.iter().take(limit) {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let text: String = c.cell(row).to_string().chars().take(*w).collect();
                format!("{:<w$}", text, w = *w)
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    if data.len() > limit {
        println!("... {} more rows", data.len() - limit);
    }
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let result = InspectConfig::from_env().and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
