// ── Recovered-file catalog ──
//
// Holds the last listing of recovered files and the active type/source
// filters, and publishes the filtered view. Filtering is pure and keeps
// catalog order; the view is recomputed on every catalog or filter change.

mod filter;

use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::model::RecoveredFile;
use crate::stream::StateStream;

pub use filter::{ALL, Filter, FilterState};

/// The subset of `files` that passes `filters`, in catalog order.
pub fn visible_files(
    files: &[Arc<RecoveredFile>],
    filters: &FilterState,
) -> Vec<Arc<RecoveredFile>> {
    files
        .iter()
        .filter(|f| filters.matches(f))
        .cloned()
        .collect()
}

/// One consistent snapshot of the catalog and its filtered view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogView {
    pub files: Arc<Vec<Arc<RecoveredFile>>>,
    pub filters: FilterState,
    pub visible: Arc<Vec<Arc<RecoveredFile>>>,
}

impl CatalogView {
    fn rebuild(&mut self) {
        self.visible = Arc::new(visible_files(&self.files, &self.filters));
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

/// Recovered-file catalog with reactive filtering.
///
/// Every mutation goes through `watch::Sender::send_modify`, so the
/// catalog, the filters, and the view always change together.
pub struct Catalog {
    view: watch::Sender<CatalogView>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let (view, _) = watch::channel(CatalogView::default());
        Self { view }
    }

    /// Replace the whole catalog. Filters are kept.
    pub fn set_catalog(&self, files: Vec<RecoveredFile>) {
        let files: Vec<Arc<RecoveredFile>> = files.into_iter().map(Arc::new).collect();
        self.view.send_modify(|v| {
            v.files = Arc::new(files);
            v.rebuild();
            debug!(total = v.total(), visible = v.visible_count(), "catalog replaced");
        });
    }

    pub fn set_type_filter(&self, filter: Filter) {
        self.view.send_modify(|v| {
            v.filters.type_filter = filter;
            v.rebuild();
        });
    }

    pub fn set_source_filter(&self, filter: Filter) {
        self.view.send_modify(|v| {
            v.filters.source_filter = filter;
            v.rebuild();
        });
    }

    pub fn set_filters(&self, filters: FilterState) {
        self.view.send_modify(|v| {
            v.filters = filters;
            v.rebuild();
        });
    }

    pub fn filters(&self) -> FilterState {
        self.view.borrow().filters.clone()
    }

    pub fn snapshot(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Files passing the current filters, in catalog order.
    pub fn visible(&self) -> Arc<Vec<Arc<RecoveredFile>>> {
        Arc::clone(&self.view.borrow().visible)
    }

    pub fn total(&self) -> usize {
        self.view.borrow().total()
    }

    pub fn visible_count(&self) -> usize {
        self.view.borrow().visible_count()
    }

    /// Distinct formats, in first-seen catalog order.
    pub fn formats(&self) -> Vec<String> {
        distinct(self.view.borrow().files.iter().map(|f| Some(f.format.as_str())))
    }

    /// Distinct sources, in first-seen catalog order.
    pub fn sources(&self) -> Vec<String> {
        distinct(self.view.borrow().files.iter().map(|f| f.source.as_deref()))
    }

    pub fn subscribe(&self) -> StateStream<CatalogView> {
        StateStream::new(self.view.subscribe())
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
