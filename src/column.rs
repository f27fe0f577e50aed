//! Column descriptors and normalization
//!
//! A `ColumnDescriptor` is what callers declare: an id, a cell accessor and
//! optional raw-cell accessor, cell props and sizing hints. Normalizing it
//! yields a `Column`, the uniform record every view in a pipeline works with.
//!
//! # Defaults
//!
//! - `raw_cell` falls back to the `cell` accessor, so filters and sorts always
//!   have a scalar to work with.
//! - `cell_props` falls back to an empty attribute map.
//!
//! # Examples
//!
//! ```
//! use tableview::{Accessor, CellValue, ColumnDescriptor};
//! use std::collections::HashMap;
//!
//! type Row = HashMap<String, CellValue>;
//!
//! let name = ColumnDescriptor::<Row>::new("name", "name").width(160.0);
//! let initial = ColumnDescriptor::<Row>::new(
//!     "initial",
//!     Accessor::func(|row: &Row| {
//!         let name = row.get("name").and_then(|v| v.as_str()).unwrap_or("");
//!         CellValue::from(name.chars().next().map(String::from))
//!     }),
//! );
//!
//! let mut row = Row::new();
//! row.insert("name".to_string(), CellValue::from("Abe"));
//!
//! assert_eq!(name.normalize().raw_cell(&row), CellValue::from("Abe"));
//! assert_eq!(initial.normalize().cell(&row), CellValue::from("A"));
//! ```

use crate::props::{Props, CLASS_NAME};
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

pub const DEFAULT_WIDTH: f64 = 100.0;

/// Shared, immutable column list handed out by views
pub type Columns<T> = Rc<[Column<T>]>;

type CellFn<T> = Rc<dyn Fn(&T) -> CellValue>;
type PropsFn<T> = Rc<dyn Fn(&T) -> Props>;

/// Rows that can be read by field name.
///
/// This is what backs the field-accessor shorthand: a column declared with a
/// field name reads `row.field(name)`. Missing fields read as `Null`.
pub trait Record {
    fn field(&self, name: &str) -> CellValue;
}

impl Record for HashMap<String, CellValue> {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl Record for BTreeMap<String, CellValue> {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

/// Shared rows, the recommended row shape: views clone rows into their
/// arrays, and cloning an `Rc` never copies the record.
impl<R: Record> Record for Rc<R> {
    fn field(&self, name: &str) -> CellValue {
        (**self).field(name)
    }
}

/// Projection from a row to a cell value
pub struct Accessor<T> {
    field: Option<String>,
    get: CellFn<T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Accessor {
            field: self.field.clone(),
            get: Rc::clone(&self.get),
        }
    }
}

impl<T> Accessor<T> {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&T) -> CellValue + 'static,
    {
        Accessor {
            field: None,
            get: Rc::new(f),
        }
    }

    pub fn get(&self, row: &T) -> CellValue {
        (self.get)(row)
    }

    /// The field name, when this accessor was declared with the shorthand.
    pub fn name(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// True when both accessors share the same underlying function.
    pub fn ptr_eq(&self, other: &Accessor<T>) -> bool {
        Rc::ptr_eq(&self.get, &other.get)
    }
}

impl<T: Record + 'static> Accessor<T> {
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = name.clone();
        Accessor {
            field: Some(name),
            get: Rc::new(move |row: &T| row.field(&key)),
        }
    }
}

impl<T: Record + 'static> From<&str> for Accessor<T> {
    fn from(name: &str) -> Self {
        Accessor::field(name)
    }
}

impl<T: Record + 'static> From<String> for Accessor<T> {
    fn from(name: String) -> Self {
        Accessor::field(name)
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(name) => write!(f, "Accessor::field({:?})", name),
            None => f.write_str("Accessor::func(..)"),
        }
    }
}

/// Per-cell props declaration
pub enum CellProps<T> {
    /// The same props for every row.
    Fixed(Props),
    /// Props computed from the row.
    Func(PropsFn<T>),
}

impl<T> Clone for CellProps<T> {
    fn clone(&self) -> Self {
        match self {
            CellProps::Fixed(props) => CellProps::Fixed(props.clone()),
            CellProps::Func(f) => CellProps::Func(Rc::clone(f)),
        }
    }
}

impl<T: 'static> CellProps<T> {
    pub fn fixed(props: Props) -> Self {
        CellProps::Fixed(props)
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&T) -> Props + 'static,
    {
        CellProps::Func(Rc::new(f))
    }

    fn into_fn(self) -> PropsFn<T> {
        match self {
            CellProps::Fixed(props) => Rc::new(move |_: &T| props.clone()),
            CellProps::Func(f) => f,
        }
    }
}

impl<T: Record + 'static> CellProps<T> {
    /// Reads a field and uses its text as the cell's class name.
    /// Null fields produce no props.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        CellProps::func(move |row: &T| match row.field(&name) {
            CellValue::Null => Props::new(),
            value => Props::class_name(value.to_string()),
        })
    }
}

/// Horizontal alignment of a column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

impl Align {
    /// Flexbox `justify-content` value for this alignment.
    pub fn justify(&self) -> &'static str {
        match self {
            Align::Left => "flex-start",
            Align::Right => "flex-end",
            Align::Center => "center",
        }
    }
}

/// Sizing and alignment hints as declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub width: f64,
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
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            width: DEFAULT_WIDTH,
            min_width: None,
            max_width: None,
            grow: None,
            shrink: None,
            align: Align::Left,
        }
    }
}

/// Layout hints resolved into flex style values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub flex_basis: f64,
    pub flex_grow: f64,
    pub flex_shrink: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    pub justify_content: &'static str,
}

impl From<&Layout> for CellStyle {
    fn from(layout: &Layout) -> Self {
        CellStyle {
            flex_basis: layout.width,
            flex_grow: layout.grow.unwrap_or(0.0),
            flex_shrink: layout.shrink.unwrap_or(0.0),
            min_width: layout.min_width,
            max_width: layout.max_width,
            justify_content: layout.align.justify(),
        }
    }
}

/// User-facing column declaration
pub struct ColumnDescriptor<T> {
    id: String,
    cell: Accessor<T>,
    raw_cell: Option<Accessor<T>>,
    cell_props: Option<CellProps<T>>,
    layout: Layout,
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        ColumnDescriptor {
            id: self.id.clone(),
            cell: self.cell.clone(),
            raw_cell: self.raw_cell.clone(),
            cell_props: self.cell_props.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<T: 'static> ColumnDescriptor<T> {
    pub fn new(id: impl Into<String>, cell: impl Into<Accessor<T>>) -> Self {
        ColumnDescriptor {
            id: id.into(),
            cell: cell.into(),
            raw_cell: None,
            cell_props: None,
            layout: Layout::default(),
        }
    }

    pub fn raw_cell(mut self, raw_cell: impl Into<Accessor<T>>) -> Self {
        self.raw_cell = Some(raw_cell.into());
        self
    }

    pub fn cell_props(mut self, cell_props: CellProps<T>) -> Self {
        self.cell_props = Some(cell_props);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.layout.width = width;
        self
    }

    pub fn min_width(mut self, min_width: f64) -> Self {
        self.layout.min_width = Some(min_width);
        self
    }

    pub fn max_width(mut self, max_width: f64) -> Self {
        self.layout.max_width = Some(max_width);
        self
    }

    pub fn grow(mut self, grow: f64) -> Self {
        self.layout.grow = Some(grow);
        self
    }

    pub fn shrink(mut self, shrink: f64) -> Self {
        self.layout.shrink = Some(shrink);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.layout.align = align;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Build the normalized column record. Pure: normalizing the same
    /// descriptor twice yields columns that behave identically.
    pub fn normalize(&self) -> Column<T> {
        let raw_cell = self.raw_cell.clone().unwrap_or_else(|| self.cell.clone());
        let cell_props: PropsFn<T> = match &self.cell_props {
            Some(props) => props.clone().into_fn(),
            None => Rc::new(|_: &T| Props::new()),
        };

        Column {
            id: self.id.clone(),
            cell: self.cell.clone(),
            raw_cell,
            cell_props,
            style: CellStyle::from(&self.layout),
            layout: self.layout.clone(),
        }
    }
}

/// Normalize a list of descriptors, keeping their declared order.
pub fn normalize_all<T: 'static>(descriptors: &[ColumnDescriptor<T>]) -> Columns<T> {
    descriptors.iter().map(ColumnDescriptor::normalize).collect()
}

/// Sum of the columns' flex basis, i.e. the natural row width.
pub fn total_width<T>(columns: &[Column<T>]) -> f64 {
    columns.iter().map(|c| c.style.flex_basis).sum()
}

/// Normalized column record
pub struct Column<T> {
    id: String,
    cell: Accessor<T>,
    raw_cell: Accessor<T>,
    cell_props: PropsFn<T>,
    layout: Layout,
    style: CellStyle,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Column {
            id: self.id.clone(),
            cell: self.cell.clone(),
            raw_cell: self.raw_cell.clone(),
            cell_props: Rc::clone(&self.cell_props),
            layout: self.layout.clone(),
            style: self.style.clone(),
        }
    }
}

impl<T> Column<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cell(&self, row: &T) -> CellValue {
        self.cell.get(row)
    }

    /// Scalar used for filtering and sorting.
    pub fn raw_cell(&self, row: &T) -> CellValue {
        self.raw_cell.get(row)
    }

    pub fn cell_props(&self, row: &T) -> Props {
        (self.cell_props)(row)
    }

    pub fn cell_accessor(&self) -> &Accessor<T> {
        &self.cell
    }

    pub fn raw_cell_accessor(&self) -> &Accessor<T> {
        &self.raw_cell
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("cell", &self.cell)
            .field("raw_cell", &self.raw_cell)
            .field("layout", &self.layout)
            .finish()
    }
}
