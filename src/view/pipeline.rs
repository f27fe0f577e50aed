use super::{FilterView, PropView, RootView, SortView, View};
use crate::column::ColumnDescriptor;
use crate::view::Rows;
use std::rc::Rc;

/// The canonical chain: root → filter → sort → props.
///
/// Each stage stays individually addressable; `output()` is the view a
/// renderer should subscribe to.
pub struct Pipeline<T> {
    root: Rc<RootView<T>>,
    filter: Rc<FilterView<T>>,
    sort: Rc<SortView<T>>,
    props: Rc<PropView<T>>,
}

impl<T: Clone + 'static> Pipeline<T> {
    pub fn new(columns: &[ColumnDescriptor<T>], rows: impl Into<Rows<T>>) -> Self {
        let root = RootView::new(columns, rows);
        let filter = FilterView::new(root.clone());
        let sort = SortView::new(filter.clone());
        let props = PropView::new(sort.clone());
        Pipeline {
            root,
            filter,
            sort,
            props,
        }
    }

    pub fn root(&self) -> &Rc<RootView<T>> {
        &self.root
    }

    pub fn filter(&self) -> &Rc<FilterView<T>> {
        &self.filter
    }

    pub fn sort(&self) -> &Rc<SortView<T>> {
        &self.sort
    }

    pub fn props(&self) -> &Rc<PropView<T>> {
        &self.props
    }

    pub fn output(&self) -> Rc<dyn View<T>> {
        self.props.clone()
    }
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Pipeline {
            root: Rc::clone(&self.root),
            filter: Rc::clone(&self.filter),
            sort: Rc::clone(&self.sort),
            props: Rc::clone(&self.props),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Filters, Sorts};
    use crate::props::{Props, CLASS_NAME};
    use crate::view::test_support::*;

    #[test]
    fn test_pipeline_end_to_end() {
        let pipeline = Pipeline::new(&columns(), vec![row(3, "Cy"), row(1, "Abe"), row(2, "Bo"), row(4, "Al")]);
        let output = pipeline.output();
        let probe = Probe::attach(&*output);

        pipeline
            .filter()
            .set_filters(Filters::new().with("name", |v| v.as_str().map_or(false, |s| s.starts_with('A'))));
        pipeline.sort().set_sorts(Sorts::new().descending("id"));
        pipeline.props().set_props(|r: &Row| Props::class_name(format!("row-{}", r["id"])));

        assert_eq!(ids(&output.data()), vec![4, 1]);
        assert_eq!(*probe.calls.borrow(), vec![2, 2, 2]);
        let data = output.data();
        assert_eq!(output.row_props(&data[0]).get(CLASS_NAME), Some("row-4"));

        pipeline.root().set_data(vec![row(7, "Ava"), row(9, "Ann"), row(8, "Ben")]);
        assert_eq!(ids(&output.data()), vec![9, 7]);
        assert_eq!(probe.count(), 4);
    }

    #[test]
    fn test_pipeline_identity_when_unconfigured() {
        let pipeline = Pipeline::new(&columns(), vec![row(2, "b"), row(1, "a")]);
        assert!(Rc::ptr_eq(&pipeline.output().data(), &pipeline.root().data()));
        assert!(Rc::ptr_eq(&pipeline.output().columns(), &pipeline.root().columns()));
    }
}
