//! In-process document store and auth provider used by the test suite.
//!
//! Subscriptions deliver synchronously: once on registration and once after each
//! write that touches the watched path.

use chrono::{Duration, TimeZone, Utc};
use futures_util::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::auth::{AuthError, AuthProvider, AuthUser, SessionCallback};
use super::path::DocPath;
use super::store::{
    CollectionCallback, Direction, DocumentCallback, DocumentStore, Query, StoreError,
    StoreResult, Subscription,
};
use super::value::{Document, Fields, Value};

struct StoredDoc {
    fields: Fields,
    seq: u64,
}

enum Listener {
    Document(DocPath, DocumentCallback),
    Collection(DocPath, CollectionCallback),
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<DocPath, StoredDoc>,
    listeners: BTreeMap<u64, Listener>,
    next_listener: u64,
    next_seq: u64,
    next_id: u64,
    writes: Vec<String>,
    fail_writes: bool,
}

impl Inner {
    fn snapshot(&self, path: &DocPath) -> Option<Document> {
        self.docs.get(path).map(|stored| {
            let mut doc = Document::new(path.clone(), stored.fields.clone());
            doc.created_at = Some(seq_time(stored.seq));
            doc
        })
    }

    fn children(&self, collection: &DocPath) -> Vec<Document> {
        let mut docs: Vec<(u64, Document)> = self
            .docs
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(collection))
            .filter_map(|(path, stored)| self.snapshot(path).map(|doc| (stored.seq, doc)))
            .collect();
        docs.sort_by_key(|(seq, _)| *seq);
        docs.into_iter().map(|(_, doc)| doc).collect()
    }
}

fn seq_time(seq: u64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seq as i64)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
    held: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, path: DocPath, fields: Fields) {
        self.write(path, |_| Some(fields));
    }

    pub fn document(&self, path: &DocPath) -> Option<Document> {
        self.inner.borrow().snapshot(path)
    }

    pub fn children(&self, collection: &DocPath) -> Vec<Document> {
        self.inner.borrow().children(collection)
    }

    /// Every successful write, formatted as `"<op> <path>"`.
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Parks every write until [`MemoryStore::release_writes`] is called.
    pub fn hold_writes(&self) {
        self.held.set(true);
    }

    pub fn release_writes(&self) {
        self.held.set(false);
    }

    fn write(&self, path: DocPath, apply: impl FnOnce(Option<&Fields>) -> Option<Fields>) {
        let deliveries = {
            let mut inner = self.inner.borrow_mut();
            let current = inner.docs.get(&path).map(|stored| stored.fields.clone());
            match apply(current.as_ref()) {
                Some(fields) => {
                    let seq = match inner.docs.get(&path) {
                        Some(existing) => existing.seq,
                        None => {
                            inner.next_seq += 1;
                            inner.next_seq
                        }
                    };
                    inner.docs.insert(path.clone(), StoredDoc { fields, seq });
                }
                None => {
                    inner.docs.remove(&path);
                }
            }
            collect_deliveries(&inner, &path)
        };
        for delivery in deliveries {
            delivery();
        }
    }

    fn gated<T: 'static>(
        &self,
        op: &'static str,
        path: DocPath,
        run: impl FnOnce(&MemoryStore) -> StoreResult<T> + 'static,
    ) -> LocalBoxFuture<'static, StoreResult<T>> {
        let store = self.clone();
        async move {
            while store.held.get() {
                tokio::task::yield_now().await;
            }
            if store.inner.borrow().fail_writes {
                return Err(StoreError::Request("simulated network failure".to_string()));
            }
            let result = run(&store)?;
            store
                .inner
                .borrow_mut()
                .writes
                .push(format!("{op} {path}"));
            Ok(result)
        }
        .boxed_local()
    }

    fn subscribe(&self, listener: Listener, initial: Box<dyn FnOnce()>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_listener += 1;
            let id = inner.next_listener;
            inner.listeners.insert(id, listener);
            id
        };
        initial();
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        Subscription::new(Rc::new(Cell::new(true)), move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.remove(&id);
            }
        })
    }
}

fn collect_deliveries(inner: &Inner, path: &DocPath) -> Vec<Box<dyn FnOnce()>> {
    let parent = path.parent();
    let mut deliveries: Vec<Box<dyn FnOnce()>> = Vec::new();
    for listener in inner.listeners.values() {
        match listener {
            Listener::Document(watched, callback) if watched == path => {
                let snapshot = inner.snapshot(path);
                let callback = callback.clone();
                deliveries.push(Box::new(move || callback(snapshot)));
            }
            Listener::Collection(watched, callback) if Some(watched) == parent.as_ref() => {
                let snapshot = inner.children(watched);
                let callback = callback.clone();
                deliveries.push(Box::new(move || callback(snapshot)));
            }
            _ => {}
        }
    }
    deliveries
}

impl DocumentStore for MemoryStore {
    fn subscribe_document(&self, path: DocPath, callback: DocumentCallback) -> Subscription {
        let snapshot = self.document(&path);
        let first = callback.clone();
        self.subscribe(
            Listener::Document(path, callback),
            Box::new(move || first(snapshot)),
        )
    }

    fn subscribe_collection(&self, path: DocPath, callback: CollectionCallback) -> Subscription {
        let snapshot = self.children(&path);
        let first = callback.clone();
        self.subscribe(
            Listener::Collection(path, callback),
            Box::new(move || first(snapshot)),
        )
    }

    fn get(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<Option<Document>>> {
        futures_util::future::ready(Ok(self.document(&path))).boxed_local()
    }

    fn query(&self, query: Query) -> LocalBoxFuture<'_, StoreResult<Vec<Document>>> {
        let mut docs: Vec<Document> = self
            .children(&query.collection)
            .into_iter()
            .filter(|doc| query.filters.iter().all(|f| f.matches(doc)))
            .collect();
        if let Some(order) = &query.order_by {
            docs.sort_by(|a, b| {
                let left = a.get(&order.field).cloned().unwrap_or(Value::Null);
                let right = b.get(&order.field).cloned().unwrap_or(Value::Null);
                match order.direction {
                    Direction::Ascending => left.total_cmp(&right),
                    Direction::Descending => right.total_cmp(&left),
                }
            });
        }
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        futures_util::future::ready(Ok(docs)).boxed_local()
    }

    fn add(&self, collection: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<String>> {
        let target = collection.clone();
        self.gated("add", collection, move |store| {
            let id = {
                let mut inner = store.inner.borrow_mut();
                inner.next_id += 1;
                format!("doc{}", inner.next_id)
            };
            store.write(target.child(&id), |_| Some(fields));
            Ok(id)
        })
    }

    fn set(&self, path: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<()>> {
        let target = path.clone();
        self.gated("set", path, move |store| {
            store.write(target, |_| Some(fields));
            Ok(())
        })
    }

    fn update(&self, path: DocPath, partial: Fields) -> LocalBoxFuture<'_, StoreResult<()>> {
        let target = path.clone();
        self.gated("update", path, move |store| {
            if store.document(&target).is_none() {
                return Err(StoreError::NotFound(target.to_string()));
            }
            store.write(target, |current| {
                let mut merged = current.cloned().unwrap_or_default();
                merged.extend(partial);
                Some(merged)
            });
            Ok(())
        })
    }

    fn delete(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<()>> {
        let target = path.clone();
        self.gated("delete", path, move |store| {
            store.write(target, |_| None);
            Ok(())
        })
    }

    fn array_union(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>> {
        let target = path.clone();
        let field = field.to_string();
        self.gated("array_union", path, move |store| {
            if store.document(&target).is_none() {
                return Err(StoreError::NotFound(target.to_string()));
            }
            store.write(target, |current| {
                let mut fields = current.cloned().unwrap_or_default();
                let mut array = match fields.remove(&field) {
                    Some(Value::Array(existing)) => existing,
                    _ => Vec::new(),
                };
                for value in values {
                    if !array.contains(&value) {
                        array.push(value);
                    }
                }
                fields.insert(field, Value::Array(array));
                Some(fields)
            });
            Ok(())
        })
    }

    fn array_remove(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>> {
        let target = path.clone();
        let field = field.to_string();
        self.gated("array_remove", path, move |store| {
            if store.document(&target).is_none() {
                return Err(StoreError::NotFound(target.to_string()));
            }
            store.write(target, |current| {
                let mut fields = current.cloned().unwrap_or_default();
                if let Some(Value::Array(existing)) = fields.get_mut(&field) {
                    existing.retain(|v| !values.contains(v));
                }
                Some(fields)
            });
            Ok(())
        })
    }
}

#[derive(Default)]
struct AuthInner {
    accounts: BTreeMap<String, (String, String)>,
    user: Option<AuthUser>,
    listeners: BTreeMap<u64, SessionCallback>,
    next_listener: u64,
    restored: bool,
}

/// Auth provider keeping accounts in memory.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Rc<RefCell<AuthInner>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self) {
        let (user, listeners): (Option<AuthUser>, Vec<SessionCallback>) = {
            let inner = self.inner.borrow();
            (inner.user.clone(), inner.listeners.values().cloned().collect())
        };
        for listener in listeners {
            listener(user.clone());
        }
    }
}

impl AuthProvider for MemoryAuth {
    fn sign_in(
        &self,
        email: String,
        password: String,
    ) -> LocalBoxFuture<'_, Result<AuthUser, AuthError>> {
        let result = {
            let mut inner = self.inner.borrow_mut();
            match inner.accounts.get(&email).cloned() {
                Some((uid, stored)) if stored == password => {
                    let user = AuthUser::new(uid, email);
                    inner.user = Some(user.clone());
                    Ok(user)
                }
                _ => Err(AuthError::InvalidCredentials),
            }
        };
        if result.is_ok() {
            self.notify();
        }
        futures_util::future::ready(result).boxed_local()
    }

    fn sign_up(
        &self,
        email: String,
        password: String,
    ) -> LocalBoxFuture<'_, Result<AuthUser, AuthError>> {
        let result = {
            let mut inner = self.inner.borrow_mut();
            if inner.accounts.contains_key(&email) {
                Err(AuthError::EmailExists)
            } else if password.len() < 6 {
                Err(AuthError::WeakPassword)
            } else {
                let uid = format!("uid{}", inner.accounts.len() + 1);
                inner
                    .accounts
                    .insert(email.clone(), (uid.clone(), password));
                let user = AuthUser::new(uid, email);
                inner.user = Some(user.clone());
                Ok(user)
            }
        };
        if result.is_ok() {
            self.notify();
        }
        futures_util::future::ready(result).boxed_local()
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>> {
        self.inner.borrow_mut().user = None;
        self.notify();
        futures_util::future::ready(Ok(())).boxed_local()
    }

    fn restore_session(&self) -> LocalBoxFuture<'_, ()> {
        self.inner.borrow_mut().restored = true;
        self.notify();
        futures_util::future::ready(()).boxed_local()
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_listener += 1;
            let id = inner.next_listener;
            inner.listeners.insert(id, callback.clone());
            (id, inner.restored.then(|| inner.user.clone()))
        };
        if let Some(user) = initial {
            callback(user);
        }
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(Rc::new(Cell::new(true)), move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.remove(&id);
            }
        })
    }
}
