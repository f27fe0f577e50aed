use super::{emit_update, Derived, Rows, Upstream, View};
use crate::column::{Column, Columns};
use crate::listeners::Listeners;
use crate::mapping::{Comparator, Sorts};
use crate::props::Props;
use crate::value::CellValue;
use log::{debug, trace};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

/// A SortView presents the parent's rows in comparator order.
///
/// Mapped comparators are consulted in the view's column order (left to
/// right), not in mapping order; the first non-equal result decides. The
/// sort is stable, so rows that tie on every mapped column keep their parent
/// order. The parent's array is never mutated: a non-empty mapping produces a
/// sorted copy, and an empty one adopts the parent's array by reference.
/// The copy clones each row; use `Rc<R>` rows to keep that shallow.
pub struct SortView<T> {
    this: Weak<Self>,
    upstream: RefCell<Upstream<T>>,
    sorts: RefCell<Sorts>,
    data: RefCell<Rows<T>>,
    listeners: Listeners<T>,
}

impl<T: Clone + 'static> SortView<T> {
    pub fn new(parent: Rc<dyn View<T>>) -> Rc<Self> {
        Self::with_sorts(parent, Sorts::new())
    }

    pub fn with_sorts(parent: Rc<dyn View<T>>, sorts: Sorts) -> Rc<Self> {
        let view = Rc::new_cyclic(|this: &Weak<Self>| SortView {
            this: this.clone(),
            data: RefCell::new(parent.data()),
            upstream: RefCell::new(Upstream::attach(this.clone(), parent)),
            sorts: RefCell::new(sorts),
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
        debug!("sort view: rebinding parent");
        let upstream = Upstream::attach(self.this.clone(), parent);
        drop(self.upstream.replace(upstream));
        self.refresh();
    }

    pub fn sorts(&self) -> Sorts {
        self.sorts.borrow().clone()
    }

    pub fn set_sorts(&self, sorts: Sorts) {
        *self.sorts.borrow_mut() = sorts;
        self.refresh();
    }

    /// Drop every comparator; the view then mirrors its parent's order.
    pub fn clear_sorts(&self) {
        self.set_sorts(Sorts::new());
    }

    /// Recompute from the parent's current state and notify.
    pub fn refresh(&self) {
        let snapshot = self.parent().snapshot();
        self.recompute(&snapshot.columns, &snapshot.rows);
        emit_update(self);
    }

    fn recompute(&self, columns: &Columns<T>, rows: &Rows<T>) {
        let sorts = self.sorts();
        let data = if sorts.is_empty() {
            Rc::clone(rows)
        } else {
            sorted_copy(columns, rows, &sorts)
        };
        trace!("sort view: {} rows, {} sort columns", data.len(), sorts.len());
        *self.data.borrow_mut() = data;
    }
}

/// Stable sort of `rows` by the mapped columns in declared column order.
/// Raw cells are read once per row and key column.
fn sorted_copy<T: Clone>(columns: &[Column<T>], rows: &[T], sorts: &Sorts) -> Rows<T> {
    let keys: Vec<(&Column<T>, &Comparator)> = columns
        .iter()
        .filter_map(|column| sorts.get(column.id()).map(|cmp| (column, cmp)))
        .collect();

    let cells: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| keys.iter().map(|(column, _)| column.raw_cell(row)).collect())
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        for (i, (_, cmp)) in keys.iter().enumerate() {
            let result = cmp(&cells[a][i], &cells[b][i]);
            if result != Ordering::Equal {
                return result;
            }
        }
        Ordering::Equal
    });

    order.into_iter().map(|i| rows[i].clone()).collect()
}

impl<T: Clone + 'static> Derived<T> for SortView<T> {
    fn parent_updated(&self, columns: &Columns<T>, rows: &Rows<T>) {
        self.recompute(columns, rows);
        emit_update(self);
    }
}

impl<T: Clone + 'static> View<T> for SortView<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::mapping::{Filters, SortKey, SortOrder};
    use crate::value::Nulls;
    use crate::view::test_support::*;
    use crate::view::{FilterView, RootView};
    use std::collections::HashMap;

    fn kn(k: i64, n: &str) -> Row {
        HashMap::from([
            ("k".to_string(), CellValue::Int(k)),
            ("n".to_string(), CellValue::from(n)),
        ])
    }

    fn kn_columns() -> Vec<ColumnDescriptor<Row>> {
        vec![ColumnDescriptor::new("k", "k"), ColumnDescriptor::new("n", "n")]
    }

    fn ns(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r["n"].to_string()).collect()
    }

    #[test]
    fn test_empty_sorts_adopt_parent_array() {
        let root = RootView::new(&columns(), vec![row(2, "b"), row(1, "a")]);
        let filtered = FilterView::new(root.clone());
        let sorted = SortView::new(filtered.clone());
        assert!(Rc::ptr_eq(&sorted.data(), &filtered.data()));
        assert_eq!(ids(&sorted.data()), vec![2, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let root = RootView::new(&kn_columns(), vec![kn(1, "b"), kn(1, "a")]);
        let sorted = SortView::with_sorts(root, Sorts::new().ascending("k"));
        assert_eq!(ns(&sorted.data()), vec!["b", "a"]);
    }

    #[test]
    fn test_parent_array_is_not_mutated() {
        let root = RootView::new(&columns(), vec![row(3, "c"), row(1, "a"), row(2, "b")]);
        let before = root.data();
        let sorted = SortView::with_sorts(root.clone(), Sorts::new().ascending("id"));
        assert_eq!(ids(&sorted.data()), vec![1, 2, 3]);
        assert!(!Rc::ptr_eq(&sorted.data(), &root.data()));
        assert_eq!(ids(&root.data()), vec![3, 1, 2]);
        assert!(Rc::ptr_eq(&before, &root.data()));
    }

    #[test]
    fn test_single_mapped_column_decides() {
        let root = RootView::new(&kn_columns(), vec![kn(1, "c"), kn(2, "a"), kn(0, "b")]);
        let sorted = SortView::with_sorts(root, Sorts::new().ascending("n"));
        assert_eq!(ns(&sorted.data()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_column_order_sets_precedence() {
        let rows = vec![kn(2, "a"), kn(1, "b"), kn(1, "a"), kn(2, "b")];
        let sorts = Sorts::new().descending("n").ascending("k");

        let root = RootView::new(&kn_columns(), rows.clone());
        let sorted = SortView::with_sorts(root.clone(), sorts.clone());
        let pairs: Vec<(i64, String)> = sorted
            .data()
            .iter()
            .map(|r| (r["k"].as_i64().unwrap(), r["n"].to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, "b".to_string()), (1, "a".to_string()), (2, "b".to_string()), (2, "a".to_string())]
        );

        root.set_columns(&[ColumnDescriptor::new("n", "n"), ColumnDescriptor::new("k", "k")]);
        let pairs: Vec<(i64, String)> = sorted
            .data()
            .iter()
            .map(|r| (r["k"].as_i64().unwrap(), r["n"].to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, "b".to_string()), (2, "b".to_string()), (1, "a".to_string()), (2, "a".to_string())]
        );
    }

    #[test]
    fn test_custom_comparator() {
        let root = RootView::new(&columns(), vec![row(1, "bb"), row(2, "a"), row(3, "ccc")]);
        let by_length = Sorts::new().with("name", |a, b| {
            let len = |v: &CellValue| v.as_str().map_or(0, str::len);
            len(b).cmp(&len(a))
        });
        let sorted = SortView::with_sorts(root, by_length);
        assert_eq!(ids(&sorted.data()), vec![3, 1, 2]);
    }

    #[test]
    fn test_nulls_follow_sort_key() {
        let mut blank = row(4, "d");
        blank.remove("name");
        let root = RootView::new(&columns(), vec![row(1, "b"), blank, row(2, "a")]);

        let sorted = SortView::with_sorts(root.clone(), Sorts::new().ascending("name"));
        assert_eq!(ids(&sorted.data()), vec![2, 1, 4]);

        sorted.set_sorts(Sorts::new().by("name", SortKey::new(SortOrder::Descending, Nulls::First)));
        assert_eq!(ids(&sorted.data()), vec![4, 1, 2]);
    }

    #[test]
    fn test_clear_sorts_restores_parent_order() {
        let root = RootView::new(&columns(), vec![row(3, "c"), row(1, "a")]);
        let sorted = SortView::with_sorts(root.clone(), Sorts::new().ascending("id"));
        assert_eq!(ids(&sorted.data()), vec![1, 3]);
        sorted.clear_sorts();
        assert!(Rc::ptr_eq(&sorted.data(), &root.data()));
        assert!(sorted.sorts().is_empty());
    }

    #[test]
    fn test_follows_filter_changes() {
        let root = RootView::new(&columns(), vec![row(5, "e"), row(1, "a"), row(3, "c")]);
        let filtered = FilterView::new(root.clone());
        let sorted = SortView::with_sorts(filtered.clone(), Sorts::new().ascending("id"));
        let probe = Probe::attach(&*sorted);

        filtered.set_filters(Filters::new().with("id", |v| v.as_i64().map_or(false, |n| n > 1)));
        assert_eq!(ids(&sorted.data()), vec![3, 5]);
        root.set_data(vec![row(9, "i"), row(2, "b")]);
        assert_eq!(ids(&sorted.data()), vec![2, 9]);
        assert_eq!(*probe.calls.borrow(), vec![2, 2]);
    }

    #[test]
    fn test_set_parent_rebinds() {
        let a = RootView::new(&columns(), vec![row(2, "b"), row(1, "a")]);
        let b = RootView::new(&columns(), vec![row(8, "h"), row(7, "g")]);
        let sorted = SortView::with_sorts(a.clone(), Sorts::new().ascending("id"));

        sorted.set_parent(b.clone());
        assert_eq!(ids(&sorted.data()), vec![7, 8]);
        assert!(a.listeners().is_empty());

        let probe = Probe::attach(&*sorted);
        a.set_data(vec![row(0, "z")]);
        assert_eq!(probe.count(), 0);
    }
}
