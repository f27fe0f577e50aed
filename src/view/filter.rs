use super::{emit_update, Derived, Rows, Upstream, View};
use crate::column::{Column, Columns};
use crate::listeners::Listeners;
use crate::mapping::{Filters, Predicate};
use crate::props::Props;
use log::{debug, trace};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A FilterView shows the parent rows accepted by every mapped predicate.
///
/// Predicates receive the mapped column's raw cell. Columns pass through
/// unchanged. With an empty mapping the parent's row array is reused as is.
/// Mapped ids that match no column impose no constraint. Kept rows are
/// cloned into the view's array, which for `Rc<R>` rows is a refcount bump.
pub struct FilterView<T> {
    this: Weak<Self>,
    upstream: RefCell<Upstream<T>>,
    filters: RefCell<Filters>,
    data: RefCell<Rows<T>>,
    listeners: Listeners<T>,
}

impl<T: Clone + 'static> FilterView<T> {
    pub fn new(parent: Rc<dyn View<T>>) -> Rc<Self> {
        Self::with_filters(parent, Filters::new())
    }

    pub fn with_filters(parent: Rc<dyn View<T>>, filters: Filters) -> Rc<Self> {
        let view = Rc::new_cyclic(|this: &Weak<Self>| FilterView {
            this: this.clone(),
            data: RefCell::new(parent.data()),
            upstream: RefCell::new(Upstream::attach(this.clone(), parent)),
            filters: RefCell::new(filters),
            listeners: Listeners::new(),
        });
        let snapshot = view.parent().snapshot();
        view.recompute(&snapshot.columns, &snapshot.rows);
        view
    }

    pub fn parent(&self) -> Rc<dyn View<T>> {
        Rc::clone(self.upstream.borrow().parent())
    }

    /// Rebind to `parent`: the old subscription is dropped, the view
    /// recomputes from the new parent and notifies before returning.
    pub fn set_parent(&self, parent: Rc<dyn View<T>>) {
        debug!("filter view: rebinding parent");
        let upstream = Upstream::attach(self.this.clone(), parent);
        drop(self.upstream.replace(upstream));
        self.refresh();
    }

    pub fn filters(&self) -> Filters {
        self.filters.borrow().clone()
    }

    pub fn set_filters(&self, filters: Filters) {
        *self.filters.borrow_mut() = filters;
        self.refresh();
    }

    pub fn clear_filters(&self) {
        self.set_filters(Filters::new());
    }

    /// Recompute from the parent's current state and notify.
    pub fn refresh(&self) {
        let snapshot = self.parent().snapshot();
        self.recompute(&snapshot.columns, &snapshot.rows);
        emit_update(self);
    }

    fn recompute(&self, columns: &Columns<T>, rows: &Rows<T>) {
        let filters = self.filters();
        let data = if filters.is_empty() {
            Rc::clone(rows)
        } else {
            let active = resolve(columns, &filters);
            rows.iter()
                .filter(|row| active.iter().all(|(column, accept)| accept(&column.raw_cell(row))))
                .cloned()
                .collect()
        };
        trace!("filter view: {} of {} rows visible", data.len(), rows.len());
        *self.data.borrow_mut() = data;
    }
}

/// Pair each mapped predicate with its column. With duplicate ids the last
/// column wins.
fn resolve<'a, T>(columns: &'a [Column<T>], filters: &'a Filters) -> Vec<(&'a Column<T>, &'a Predicate)> {
    filters
        .iter()
        .filter_map(|(id, predicate)| {
            let column = columns.iter().rev().find(|c| c.id() == id.as_str());
            if column.is_none() {
                debug!("filter view: no column '{}', filter ignored", id);
            }
            column.map(|c| (c, predicate))
        })
        .collect()
}

impl<T: Clone + 'static> Derived<T> for FilterView<T> {
    fn parent_updated(&self, columns: &Columns<T>, rows: &Rows<T>) {
        self.recompute(columns, rows);
        emit_update(self);
    }
}

impl<T: Clone + 'static> View<T> for FilterView<T> {
    fn columns(&self) -> Columns<T> {
        self.parent().columns()
    }

    fn data(&self) -> Rows<T> {
        Rc::clone(&self.data.borrow())
    }

    fn row_props(&self, row: &T) -> Props {
        self.parent().row_props(row)
    }

    fn listeners(&self) -> &Listeners<T> {
        &self.listeners
    }
}
