//! JSON rows and column specs
//!
//! Lets a pipeline run over `serde_json::Value` rows: objects are read by
//! field name, column declarations can be loaded from JSON, and a view's
//! current state can be exported as a JSON document.

use crate::column::{Accessor, Align, CellProps, CellStyle, ColumnDescriptor, Layout, Record, DEFAULT_WIDTH};
use crate::error::ViewError;
use crate::props::Props;
use crate::value::CellValue;
use crate::view::View;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;

impl Record for JsonValue {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).map(json_to_cell).unwrap_or_default()
    }
}

impl Record for Map<String, JsonValue> {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).map(json_to_cell).unwrap_or_default()
    }
}

/// Convert a JSON value to a cell. Arrays and objects become their JSON text.
pub fn json_to_cell(value: &JsonValue) -> CellValue {
    match value {
        JsonValue::Null => CellValue::Null,
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map_or(CellValue::Null, CellValue::Float),
        },
        JsonValue::String(s) => CellValue::String(s.clone()),
        other => CellValue::String(other.to_string()),
    }
}

/// Convert a cell to JSON. Non-finite floats become `null`.
pub fn cell_to_json(value: &CellValue) -> JsonValue {
    match value {
        CellValue::Int(v) => JsonValue::Number((*v).into()),
        CellValue::Float(v) => Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
        CellValue::String(v) => JsonValue::String(v.clone()),
        CellValue::Bool(v) => JsonValue::Bool(*v),
        CellValue::Null => JsonValue::Null,
    }
}

/// Column declaration as written in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub id: String,
    /// Field to read; defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink: Option<f64>,
    #[serde(default)]
    pub align: Align,
    /// Class name applied to every cell of the column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>) -> Self {
        ColumnSpec {
            id: id.into(),
            field: None,
            width: None,
            min_width: None,
            max_width: None,
            grow: None,
            shrink: None,
            align: Align::Left,
            class_name: None,
        }
    }

    pub fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.id)
    }

    pub fn into_descriptor(self) -> ColumnDescriptor<JsonValue> {
        let layout = Layout {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            min_width: self.min_width,
            max_width: self.max_width,
            grow: self.grow,
            shrink: self.shrink,
            align: self.align,
        };
        let accessor = Accessor::field(self.field_name());
        let descriptor = ColumnDescriptor::new(self.id, accessor).layout(layout);
        match self.class_name {
            Some(class) => descriptor.cell_props(CellProps::fixed(Props::class_name(class))),
            None => descriptor,
        }
    }
}

/// Parse rows from a top-level JSON array.
pub fn parse_rows(input: &str) -> Result<Vec<JsonValue>, ViewError> {
    match serde_json::from_str(input)? {
        JsonValue::Array(rows) => Ok(rows),
        _ => Err(ViewError::NotAnArray),
    }
}

/// Parse an array of column specs.
pub fn parse_columns(input: &str) -> Result<Vec<ColumnSpec>, ViewError> {
    Ok(serde_json::from_str(input)?)
}

/// One column spec per key of the first row, in key order.
pub fn infer_columns(rows: &[JsonValue]) -> Vec<ColumnSpec> {
    rows.first()
        .and_then(JsonValue::as_object)
        .map(|row| row.keys().map(ColumnSpec::new).collect())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct ExportColumn<'a> {
    id: &'a str,
    style: &'a CellStyle,
}

#[derive(Serialize)]
struct ExportRow {
    cells: BTreeMap<String, JsonValue>,
    props: Props,
}

#[derive(Serialize)]
struct Export<'a> {
    columns: Vec<ExportColumn<'a>>,
    rows: Vec<ExportRow>,
}

/// Render a view's columns, rows and row props as JSON:
/// `{ columns: [{id, style}], rows: [{cells: {id: rawCell}, props}] }`.
pub fn export<T, V>(view: &V) -> Result<JsonValue, ViewError>
where
    V: View<T> + ?Sized,
{
    let snapshot = view.snapshot();
    let rows = snapshot
        .rows
        .iter()
        .map(|row| ExportRow {
            cells: snapshot
                .columns
                .iter()
                .map(|column| (column.id().to_string(), cell_to_json(&column.raw_cell(row))))
                .collect(),
            props: view.row_props(row),
        })
        .collect();
    let columns = snapshot
        .columns
        .iter()
        .map(|column| ExportColumn {
            id: column.id(),
            style: column.style(),
        })
        .collect();

    Ok(serde_json::to_value(Export { columns, rows })?)
}
