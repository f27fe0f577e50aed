use super::{emit_update, Derived, Rows, Upstream, View};
use crate::column::Columns;
use crate::listeners::Listeners;
use crate::props::Props;
use log::debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Per-row props function
pub type Decorator<T> = Rc<dyn Fn(&T) -> Props>;

/// A PropView decorates rows with extra display attributes.
///
/// Columns and rows are the parent's, unchanged. `row_props` merges the
/// parent's props for a row with this view's decorator output, the decorator
/// winning on key conflicts.
pub struct PropView<T> {
    this: Weak<Self>,
    upstream: RefCell<Upstream<T>>,
    decorator: RefCell<Decorator<T>>,
    listeners: Listeners<T>,
}

fn no_props<T>() -> Decorator<T> {
    Rc::new(|_: &T| Props::new())
}

impl<T: 'static> PropView<T> {
    pub fn new(parent: Rc<dyn View<T>>) -> Rc<Self> {
        Self::with_decorator(parent, no_props())
    }

    pub fn with_props<F>(parent: Rc<dyn View<T>>, decorator: F) -> Rc<Self>
    where
        F: Fn(&T) -> Props + 'static,
    {
        Self::with_decorator(parent, Rc::new(decorator))
    }

    pub fn with_decorator(parent: Rc<dyn View<T>>, decorator: Decorator<T>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| PropView {
            this: this.clone(),
            upstream: RefCell::new(Upstream::attach(this.clone(), parent)),
            decorator: RefCell::new(decorator),
            listeners: Listeners::new(),
        })
    }

    pub fn parent(&self) -> Rc<dyn View<T>> {
        Rc::clone(self.upstream.borrow().parent())
    }

    /// Rebind to `parent` and notify before returning.
    pub fn set_parent(&self, parent: Rc<dyn View<T>>) {
        debug!("prop view: rebinding parent");
        let upstream = Upstream::attach(self.this.clone(), parent);
        drop(self.upstream.replace(upstream));
        emit_update(self);
    }

    pub fn props(&self) -> Decorator<T> {
        Rc::clone(&self.decorator.borrow())
    }

    pub fn set_props<F>(&self, decorator: F)
    where
        F: Fn(&T) -> Props + 'static,
    {
        self.set_decorator(Rc::new(decorator));
    }

    pub fn set_decorator(&self, decorator: Decorator<T>) {
        *self.decorator.borrow_mut() = decorator;
        emit_update(self);
    }

    pub fn clear_props(&self) {
        self.set_decorator(no_props());
    }
}

impl<T: 'static> Derived<T> for PropView<T> {
    fn parent_updated(&self, _columns: &Columns<T>, _rows: &Rows<T>) {
        emit_update(self);
    }
}

impl<T: 'static> View<T> for PropView<T> {
    fn columns(&self) -> Columns<T> {
        self.parent().columns()
    }

    fn data(&self) -> Rows<T> {
        self.parent().data()
    }

    fn row_props(&self, row: &T) -> Props {
        let decorator = self.props();
        self.parent().row_props(row).merged(decorator(row))
    }

    fn listeners(&self) -> &Listeners<T> {
        &self.listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Filters, Sorts};
    use crate::props::CLASS_NAME;
    use crate::view::test_support::*;
    use crate::view::{FilterView, RootView, SortView};

    fn parity(r: &Row) -> Props {
        if r["id"].as_i64().unwrap_or(0) % 2 == 0 {
            Props::class_name("even")
        } else {
            Props::class_name("odd")
        }
    }

    #[test]
    fn test_rows_and_columns_pass_through() {
        let root = RootView::new(&columns(), vec![row(1, "a"), row(2, "b")]);
        let view = PropView::with_props(root.clone(), parity);
        assert!(Rc::ptr_eq(&view.data(), &root.data()));
        assert!(Rc::ptr_eq(&view.columns(), &root.columns()));
    }

    #[test]
    fn test_default_decorator_is_empty() {
        let root = RootView::new(&columns(), vec![row(1, "a")]);
        let view = PropView::new(root.clone());
        assert!(view.row_props(&view.data()[0]).is_empty());
    }

    #[test]
    fn test_decorator_overrides_parent_keys() {
        let root = RootView::new(&columns(), vec![row(1, "a")]);
        let inner = PropView::with_props(root.clone(), |_: &Row| Props::class_name("a"));
        let outer = PropView::with_props(inner.clone(), |_: &Row| Props::class_name("b").with("title", "t"));

        let data = outer.data();
        let r = &data[0];
        assert_eq!(inner.row_props(r), Props::class_name("a"));
        assert_eq!(outer.row_props(r), Props::class_name("b").with("title", "t"));
    }

    #[test]
    fn test_merge_keeps_parent_only_keys() {
        let root = RootView::new(&columns(), vec![row(2, "a")]);
        let inner = PropView::with_props(root.clone(), |_: &Row| Props::new().with("data-row", "x"));
        let outer = PropView::with_props(inner.clone(), parity);
        let props = outer.row_props(&outer.data()[0]);
        assert_eq!(props.get("data-row"), Some("x"));
        assert_eq!(props.get(CLASS_NAME), Some("even"));
    }

    #[test]
    fn test_set_props_notifies_and_replaces() {
        let root = RootView::new(&columns(), vec![row(1, "a")]);
        let view = PropView::with_props(root.clone(), parity);
        let probe = Probe::attach(&*view);

        view.set_props(|_: &Row| Props::class_name("marked"));
        assert_eq!(probe.count(), 1);
        assert_eq!(view.row_props(&view.data()[0]).get(CLASS_NAME), Some("marked"));

        view.clear_props();
        assert_eq!(probe.count(), 2);
        assert!(view.row_props(&view.data()[0]).is_empty());
    }

    #[test]
    fn test_reflects_upstream_chain() {
        let root = RootView::new(&columns(), vec![row(4, "d"), row(1, "a"), row(3, "c")]);
        let filtered = FilterView::new(root.clone());
        let sorted = SortView::with_sorts(filtered.clone(), Sorts::new().ascending("id"));
        let decorated = PropView::with_props(sorted.clone(), parity);
        let probe = Probe::attach(&*decorated);

        assert_eq!(ids(&decorated.data()), vec![1, 3, 4]);

        filtered.set_filters(Filters::new().with("id", |v| v.as_i64().map_or(false, |n| n > 1)));
        assert_eq!(ids(&decorated.data()), vec![3, 4]);

        root.set_data(vec![row(6, "f"), row(2, "b")]);
        assert_eq!(ids(&decorated.data()), vec![2, 6]);
        assert_eq!(*probe.calls.borrow(), vec![2, 2]);

        let classes: Vec<Option<String>> = decorated
            .data()
            .iter()
            .map(|r| decorated.row_props(r).get(CLASS_NAME).map(String::from))
            .collect();
        assert_eq!(classes, vec![Some("even".to_string()), Some("even".to_string())]);
    }

    #[test]
    fn test_props_flow_through_filter_and_sort() {
        let root = RootView::new(&columns(), vec![row(1, "a")]);
        let decorated = PropView::with_props(root.clone(), parity);
        let sorted = SortView::new(FilterView::new(decorated.clone()));
        assert_eq!(sorted.row_props(&sorted.data()[0]).get(CLASS_NAME), Some("odd"));
    }

    #[test]
    fn test_set_parent_rebinds() {
        let a = RootView::new(&columns(), vec![row(1, "a")]);
        let b = RootView::new(&columns(), vec![row(2, "b"), row(3, "c")]);
        let view = PropView::with_props(a.clone(), parity);
        let probe = Probe::attach(&*view);

        view.set_parent(b.clone());
        assert_eq!(probe.last(), Some(2));
        assert_eq!(ids(&view.data()), vec![2, 3]);
        assert!(a.listeners().is_empty());

        a.set_data(Vec::<Row>::new());
        assert_eq!(probe.count(), 1);
    }
}
