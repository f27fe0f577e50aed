//! TableView views
//!
//! Views are nodes of a table pipeline: a `RootView` holds the canonical
//! columns and rows, and derived views (`FilterView`, `SortView`, `PropView`)
//! each wrap one parent and re-derive their state whenever it changes.
//!
//! Every mutation is synchronous: a setter recomputes the node and notifies
//! its listeners before returning, and each derived node re-emits after its
//! own recompute, so a change at the root reaches the end of the chain within
//! the same call.
//!
//! # Examples
//!
//! ```
//! use tableview::{CellValue, ColumnDescriptor, FilterView, Filters, RootView, SortView, Sorts, View};
//! use std::collections::HashMap;
//!
//! type Row = HashMap<String, CellValue>;
//!
//! fn row(id: i64) -> Row {
//!     HashMap::from([("id".to_string(), CellValue::Int(id))])
//! }
//!
//! let root = RootView::new(&[ColumnDescriptor::<Row>::new("id", "id")], vec![row(3), row(1), row(2)]);
//! let filtered = FilterView::new(root.clone());
//! let sorted = SortView::new(filtered.clone());
//!
//! filtered.set_filters(Filters::new().with("id", |v| v.as_i64().unwrap_or(0) > 1));
//! sorted.set_sorts(Sorts::new().ascending("id"));
//!
//! let ids: Vec<i64> = sorted.data().iter().map(|r| r["id"].as_i64().unwrap()).collect();
//! assert_eq!(ids, vec![2, 3]);
//! ```

mod filter;
mod pipeline;
mod prop;
mod root;
mod sort;

pub use filter::FilterView;
pub use pipeline::Pipeline;
pub use prop::{Decorator, PropView};
pub use root::RootView;
pub use sort::SortView;

use crate::column::Columns;
use crate::listeners::{Listener, ListenerId, Listeners, Subscription};
use crate::props::Props;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared, immutable row array handed out by views
pub type Rows<T> = Rc<[T]>;

/// A view's columns and rows at one point in time
pub struct Snapshot<T> {
    pub columns: Columns<T>,
    pub rows: Rows<T>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot {
            columns: Rc::clone(&self.columns),
            rows: Rc::clone(&self.rows),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish()
    }
}

/// A node in a table pipeline.
///
/// Reads are cheap and never recompute: `columns()` and `data()` return the
/// state as of the most recent update. The returned arrays are shared with
/// the node and must be treated as read-only.
pub trait View<T> {
    fn columns(&self) -> Columns<T>;

    fn data(&self) -> Rows<T>;

    /// Display attributes for one row. Views that do not decorate rows
    /// return empty props.
    fn row_props(&self, _row: &T) -> Props {
        Props::new()
    }

    fn listeners(&self) -> &Listeners<T>;

    fn on_update(&self, listener: Listener<T>) -> ListenerId {
        self.listeners().on_update(listener)
    }

    fn off_update(&self, id: ListenerId) {
        self.listeners().off_update(id)
    }

    fn subscribe(&self, listener: Listener<T>) -> Subscription<T> {
        self.listeners().subscribe(listener)
    }

    fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            columns: self.columns(),
            rows: self.data(),
        }
    }

    fn len(&self) -> usize {
        self.data().len()
    }

    fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

/// Notify a view's listeners with one snapshot shared across all of them.
pub(crate) fn emit_update<T, V>(view: &V)
where
    V: View<T> + ?Sized,
{
    let columns = view.columns();
    let rows = view.data();
    view.listeners().emit(&columns, &rows);
}

/// A view that re-derives its state from a parent
pub(crate) trait Derived<T>: View<T> {
    fn parent_updated(&self, columns: &Columns<T>, rows: &Rows<T>);
}

/// The parent a derived view is bound to, plus its registration on that
/// parent. Dropping it unsubscribes.
pub(crate) struct Upstream<T> {
    parent: Rc<dyn View<T>>,
    _subscription: Subscription<T>,
}

impl<T: 'static> Upstream<T> {
    /// Subscribe `node` to `parent`. The listener holds the node weakly.
    pub(crate) fn attach<V>(node: Weak<V>, parent: Rc<dyn View<T>>) -> Self
    where
        V: Derived<T> + 'static,
    {
        let listener: Listener<T> = Rc::new(move |columns: &Columns<T>, rows: &Rows<T>| {
            if let Some(node) = node.upgrade() {
                node.parent_updated(columns, rows);
            }
        });
        let subscription = parent.subscribe(listener);
        Upstream {
            parent,
            _subscription: subscription,
        }
    }

    pub(crate) fn parent(&self) -> &Rc<dyn View<T>> {
        &self.parent
    }
}
