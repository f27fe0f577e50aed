use super::{emit_update, Rows, View};
use crate::column::{normalize_all, ColumnDescriptor, Columns};
use crate::listeners::Listeners;
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// Source of truth for a pipeline: the canonical columns and rows.
///
/// The only view that accepts new columns and rows from outside the pipeline.
///
/// Derived views clone each row they keep, so rows should be cheap handles:
/// `Rc<R>` rows share one allocation across every stage (`Record` is
/// implemented for `Rc<R>`), while owned maps are deep-copied on every
/// filter or sort recompute.
pub struct RootView<T> {
    columns: RefCell<Columns<T>>,
    data: RefCell<Rows<T>>,
    listeners: Listeners<T>,
}

impl<T: 'static> RootView<T> {
    pub fn new(columns: &[ColumnDescriptor<T>], rows: impl Into<Rows<T>>) -> Rc<Self> {
        Rc::new(RootView {
            columns: RefCell::new(normalize_all(columns)),
            data: RefCell::new(rows.into()),
            listeners: Listeners::new(),
        })
    }

    pub fn empty() -> Rc<Self> {
        Self::new(&[], Vec::<T>::new())
    }

    /// Normalize and replace the column list, then notify.
    pub fn set_columns(&self, columns: &[ColumnDescriptor<T>]) {
        let columns = normalize_all(columns);
        trace!("root view: {} columns", columns.len());
        *self.columns.borrow_mut() = columns;
        emit_update(self);
    }

    /// Replace the rows by reference, then notify.
    pub fn set_data(&self, rows: impl Into<Rows<T>>) {
        let rows = rows.into();
        trace!("root view: {} rows", rows.len());
        *self.data.borrow_mut() = rows;
        emit_update(self);
    }
}

impl<T> View<T> for RootView<T> {
    fn columns(&self) -> Columns<T> {
        Rc::clone(&self.columns.borrow())
    }

    fn data(&self) -> Rows<T> {
        Rc::clone(&self.data.borrow())
    }

    fn listeners(&self) -> &Listeners<T> {
        &self.listeners
    }
}
