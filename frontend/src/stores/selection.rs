use indexmap::IndexSet;

use super::SelectionStore;
use crate::dataflow::{Atom, Subscription};

/// Selected data point ids, in selection order.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: Atom<IndexSet<String>>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.with(IndexSet::is_empty)
    }

    /// Register a listener for selection changes. Re-selecting the same ids
    /// does not notify.
    pub fn on_selection_changed(
        &self,
        listener: impl Fn(&IndexSet<String>) + Send + Sync + 'static,
    ) -> Subscription {
        self.ids.subscribe(listener)
    }
}

impl SelectionStore for SelectionSet {
    fn selected_ids(&self) -> IndexSet<String> {
        self.ids.get_cloned()
    }

    fn select_ids(&self, ids: IndexSet<String>) {
        self.ids.set_neq(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_listeners_see_cleared_selection() {
        let selection = SelectionSet::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = selection.on_selection_changed(move |ids| {
            sink.lock().unwrap().push(ids.len());
        });

        selection.select_ids(IndexSet::from(["3".to_string(), "9".to_string()]));
        selection.select_ids(IndexSet::new());
        selection.select_ids(IndexSet::new());

        assert!(selection.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![2, 0]);
        subscription.unsubscribe();
    }
}
