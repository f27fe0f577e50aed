//! Filter and sort mappings
//!
//! Both mappings are keyed by column id. A `FilterView` keeps a row when every
//! mapped column's predicate accepts the row's raw cell; a `SortView` orders
//! rows by consulting mapped comparators in the view's column order.

use crate::error::ViewError;
use crate::value::{CellValue, Nulls};
use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::rc::Rc;

/// Test applied to a column's raw cell value
pub type Predicate = Rc<dyn Fn(&CellValue) -> bool>;

/// Ordering of two raw cell values of one column
pub type Comparator = Rc<dyn Fn(&CellValue, &CellValue) -> Ordering>;

/// Column id → callback
pub struct ColumnMap<F> {
    entries: BTreeMap<String, F>,
}

pub type Filters = ColumnMap<Predicate>;
pub type Sorts = ColumnMap<Comparator>;

impl<F> Default for ColumnMap<F> {
    fn default() -> Self {
        ColumnMap {
            entries: BTreeMap::new(),
        }
    }
}

impl<F: Clone> Clone for ColumnMap<F> {
    fn clone(&self) -> Self {
        ColumnMap {
            entries: self.entries.clone(),
        }
    }
}

impl<F> ColumnMap<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for a column, returning the one it replaced.
    pub fn insert(&mut self, column: impl Into<String>, f: F) -> Option<F> {
        self.entries.insert(column.into(), f)
    }

    pub fn remove(&mut self, column: &str) -> Option<F> {
        self.entries.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&F> {
        self.entries.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, F> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F> fmt::Debug for ColumnMap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl ColumnMap<Predicate> {
    pub fn with<P>(mut self, column: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&CellValue) -> bool + 'static,
    {
        self.insert(column, Rc::new(predicate));
        self
    }
}

impl ColumnMap<Comparator> {
    pub fn with<C>(mut self, column: impl Into<String>, comparator: C) -> Self
    where
        C: Fn(&CellValue, &CellValue) -> Ordering + 'static,
    {
        self.insert(column, Rc::new(comparator));
        self
    }

    pub fn by(mut self, column: impl Into<String>, key: SortKey) -> Self {
        self.insert(column, key.comparator());
        self
    }

    pub fn ascending(self, column: impl Into<String>) -> Self {
        self.by(column, SortKey::ascending())
    }

    pub fn descending(self, column: impl Into<String>) -> Self {
        self.by(column, SortKey::descending())
    }
}

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[default]
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// Options for the built-in comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortKey {
    pub order: SortOrder,
    /// NULL placement, applied after `order`: nulls stay last (or first)
    /// in both directions.
    pub nulls: Nulls,
}

impl SortKey {
    /// Ascending, nulls last
    pub fn ascending() -> Self {
        SortKey {
            order: SortOrder::Ascending,
            nulls: Nulls::Last,
        }
    }

    /// Descending, nulls last
    pub fn descending() -> Self {
        SortKey {
            order: SortOrder::Descending,
            nulls: Nulls::Last,
        }
    }

    pub fn new(order: SortOrder, nulls: Nulls) -> Self {
        SortKey { order, nulls }
    }

    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        let base = a.compare(b, self.nulls);
        if a.is_null() || b.is_null() {
            return base;
        }
        match self.order {
            SortOrder::Ascending => base,
            SortOrder::Descending => base.reverse(),
        }
    }

    pub fn comparator(self) -> Comparator {
        Rc::new(move |a: &CellValue, b: &CellValue| self.compare(a, b))
    }
}

/// Parse a sort spec such as `"id:asc,name:desc"`. A bare column id sorts
/// ascending. Comparators still apply in column order, not in the order listed.
pub fn parse_sorts(spec: &str) -> Result<Sorts, ViewError> {
    let mut sorts = Sorts::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (column, order) = match part.split_once(':') {
            Some((column, order)) => (column.trim(), order.trim()),
            None => (part, "asc"),
        };
        let order = match order.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Ascending,
            "desc" => SortOrder::Descending,
            _ => return Err(ViewError::InvalidSort { spec: part.to_string() }),
        };
        if column.is_empty() {
            return Err(ViewError::InvalidSort { spec: part.to_string() });
        }
        sorts = sorts.by(column, SortKey::new(order, Nulls::Last));
    }
    Ok(sorts)
}
