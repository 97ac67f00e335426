//! The document store seam: everything the app needs from the hosted database.

use futures_util::future::LocalBoxFuture;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use super::path::DocPath;
use super::value::{Document, Fields, Value};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("not signed in")]
    Unauthenticated,

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Request(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type DocumentCallback = Rc<dyn Fn(Option<Document>)>;
pub type CollectionCallback = Rc<dyn Fn(Vec<Document>)>;

/// Handle for a live subscription. Delivery stops when it is cancelled or dropped.
pub struct Subscription {
    active: Rc<Cell<bool>>,
    on_cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(active: Rc<Cell<bool>>, on_cancel: impl FnOnce() + 'static) -> Self {
        Self {
            active,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// A subscription whose only state is the shared flag.
    pub fn from_flag(active: Rc<Cell<bool>>) -> Self {
        Self {
            active,
            on_cancel: None,
        }
    }

    pub fn cancel(&mut self) {
        self.active.set(false);
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal(String, Value),
    ArrayContains(String, Value),
    NotNull(String),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equal(field, value) => doc.get(field) == Some(value),
            Filter::ArrayContains(field, value) => match doc.get(field) {
                Some(Value::Array(values)) => values.contains(value),
                _ => false,
            },
            Filter::NotNull(field) => doc.get(field).is_some_and(|v| !v.is_null()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: DocPath,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: DocPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hosted document database as seen by the app.
///
/// Runs on a single-threaded event loop, so futures and callbacks are not `Send`.
/// Subscriptions deliver an initial snapshot and then one snapshot per change.
pub trait DocumentStore {
    fn subscribe_document(&self, path: DocPath, callback: DocumentCallback) -> Subscription;

    fn subscribe_collection(&self, path: DocPath, callback: CollectionCallback) -> Subscription;

    fn get(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<Option<Document>>>;

    fn query(&self, query: Query) -> LocalBoxFuture<'_, StoreResult<Vec<Document>>>;

    /// Creates a document with a generated id and returns that id.
    fn add(&self, collection: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<String>>;

    fn set(&self, path: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<()>>;

    /// Merges `partial` into an existing document.
    fn update(&self, path: DocPath, partial: Fields) -> LocalBoxFuture<'_, StoreResult<()>>;

    fn delete(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<()>>;

    /// Appends each value not already present in the array field.
    fn array_union(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>>;

    /// Removes every occurrence of each value from the array field.
    fn array_remove(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn dropping_subscription_runs_cancel_once() {
        let flag = Rc::new(Cell::new(true));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut sub = Subscription::new(flag.clone(), move || counter.set(counter.get() + 1));
        sub.cancel();
        drop(sub);
        assert!(!flag.get());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn array_contains_filter_matches_member() {
        let doc = Document::new(
            DocPath::parse("playlists/p1"),
            fields! { "contributors" => vec!["a@x.com".to_string()] },
        );
        assert!(Filter::ArrayContains("contributors".into(), "a@x.com".into()).matches(&doc));
        assert!(!Filter::ArrayContains("contributors".into(), "b@x.com".into()).matches(&doc));
        assert!(!Filter::NotNull("lastPlayed".into()).matches(&doc));
    }
}
