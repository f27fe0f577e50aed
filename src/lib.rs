/// TableView - Reactive Data-Table View Pipeline
///
/// A small dataflow graph of observable table views: a root view holds the
/// canonical columns and rows, and filter, sort and row-prop views derive
/// from it, recomputing synchronously and re-emitting whenever their parent
/// or their own configuration changes.

pub mod column;
pub mod error;
pub mod expr;
pub mod json;
pub mod listeners;
pub mod mapping;
pub mod props;
pub mod value;
pub mod view;

pub use column::{
    normalize_all, total_width, Accessor, Align, CellProps, CellStyle, Column, ColumnDescriptor, Columns, Layout,
    Record,
};
pub use error::ViewError;
pub use expr::{compile_filters, parse_expr, CompareOp, Expr};
pub use json::{export, parse_columns, parse_rows, ColumnSpec};
pub use listeners::{Listener, ListenerId, Listeners, Subscription};
pub use mapping::{parse_sorts, ColumnMap, Comparator, Filters, Predicate, SortKey, SortOrder, Sorts};
pub use props::{Props, CLASS_NAME};
pub use value::{CellValue, Nulls};
pub use view::{Decorator, FilterView, Pipeline, PropView, RootView, Rows, Snapshot, SortView, View};
