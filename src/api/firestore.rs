//! Cloud Firestore over its REST API.
//!
//! Live subscriptions are emulated with a polling task per subscription that only
//! delivers when the snapshot differs from the last one delivered.

use chrono::{DateTime, Utc};
use dioxus::prelude::spawn;
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

use super::auth::TokenSource;
use super::path::DocPath;
use super::store::{
    CollectionCallback, Direction, DocumentCallback, DocumentStore, Filter, Query, StoreError,
    StoreResult, Subscription,
};
use super::value::{fields_from_rest, fields_to_rest, Document, Fields, Value};
use super::HTTP_CLIENT;
use crate::utils::sleep_ms;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: usize = 300;

#[derive(Clone)]
pub struct FirestoreStore {
    project_id: String,
    poll_interval_ms: u32,
    tokens: Rc<dyn TokenSource>,
}

impl FirestoreStore {
    pub fn new(project_id: String, poll_interval_ms: u32, tokens: Rc<dyn TokenSource>) -> Self {
        Self {
            project_id,
            poll_interval_ms,
            tokens,
        }
    }

    fn database_name(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn documents_url(&self) -> String {
        format!("{FIRESTORE_URL}/{}", self.database_name())
    }

    fn path_url(&self, path: &DocPath) -> String {
        format!("{}/{}", self.documents_url(), path.encoded())
    }

    fn resource_name(&self, path: &DocPath) -> String {
        format!("{}/{}", self.database_name(), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> StoreResult<reqwest::Response> {
        let token = self
            .tokens
            .id_token()
            .await
            .ok_or(StoreError::Unauthenticated)?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.to_string());

        Err(match status.as_u16() {
            401 => StoreError::Unauthenticated,
            403 => StoreError::PermissionDenied,
            404 => StoreError::NotFound(message),
            code => StoreError::Status {
                status: code,
                message,
            },
        })
    }

    async fn fetch_document(&self, path: DocPath) -> StoreResult<Option<Document>> {
        match self.send(HTTP_CLIENT.get(self.path_url(&path))).await {
            Ok(response) => {
                let body: serde_json::Value = response.json().await?;
                decode_document(&body).map(Some)
            }
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_collection(&self, path: DocPath) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}?pageSize={PAGE_SIZE}", self.path_url(&path));
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }
            let body: serde_json::Value = match self.send(HTTP_CLIENT.get(&url)).await {
                Ok(response) => response.json().await?,
                // A collection with no documents does not exist.
                Err(StoreError::NotFound(_)) => break,
                Err(err) => return Err(err),
            };

            if let Some(raw) = body.get("documents").and_then(|d| d.as_array()) {
                for doc in raw {
                    documents.push(decode_document(doc)?);
                }
            }

            page_token = body
                .get("nextPageToken")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    async fn run_query(&self, query: Query) -> StoreResult<Vec<Document>> {
        let parent = query
            .collection
            .parent()
            .map(|p| self.path_url(&p))
            .unwrap_or_else(|| self.documents_url());
        let url = format!("{parent}:runQuery");
        let body = json!({ "structuredQuery": structured_query(&query) });

        let response = self.send(HTTP_CLIENT.post(&url).json(&body)).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }

    async fn patch(&self, path: DocPath, fields: Fields, mask: bool) -> StoreResult<()> {
        let mut url = self.path_url(&path);
        if mask {
            let params: Vec<String> = fields
                .keys()
                .map(|key| format!("updateMask.fieldPaths={}", urlencoding::encode(key)))
                .chain(std::iter::once("currentDocument.exists=true".to_string()))
                .collect();
            url = format!("{url}?{}", params.join("&"));
        }
        let body = json!({ "fields": fields_to_rest(&fields) });
        self.send(HTTP_CLIENT.patch(&url).json(&body)).await?;
        Ok(())
    }

    async fn transform_array(
        &self,
        path: DocPath,
        field: String,
        values: Vec<Value>,
        kind: &str,
    ) -> StoreResult<()> {
        let url = format!("{}:commit", self.documents_url());
        let encoded: Vec<serde_json::Value> = values.iter().map(Value::to_rest).collect();
        let body = json!({
            "writes": [{
                "transform": {
                    "document": self.resource_name(&path),
                    "fieldTransforms": [{
                        "fieldPath": field,
                        kind: { "values": encoded }
                    }]
                },
                "currentDocument": { "exists": true }
            }]
        });
        self.send(HTTP_CLIENT.post(&url).json(&body)).await?;
        Ok(())
    }

    fn poll<T, F>(&self, label: String, fetch: F, deliver: Rc<dyn Fn(T)>) -> Subscription
    where
        T: PartialEq + Clone + 'static,
        F: Fn(FirestoreStore) -> LocalBoxFuture<'static, StoreResult<T>> + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let flag = active.clone();
        let store = self.clone();
        let interval = self.poll_interval_ms;

        debug!(path = %label, "Opening subscription");
        spawn(async move {
            let mut last: Option<T> = None;
            while flag.get() {
                match fetch(store.clone()).await {
                    Ok(snapshot) => {
                        if flag.get() && last.as_ref() != Some(&snapshot) {
                            last = Some(snapshot.clone());
                            deliver(snapshot);
                        }
                    }
                    Err(err) => warn!(path = %label, error = %err, "Subscription poll failed"),
                }
                sleep_ms(interval).await;
            }
            debug!(path = %label, "Subscription closed");
        });

        Subscription::from_flag(active)
    }
}

fn decode_document(raw: &serde_json::Value) -> StoreResult<Document> {
    let name = raw
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| StoreError::Decode("document without a name".to_string()))?;
    let relative = name
        .split_once("/documents/")
        .map(|(_, rest)| rest)
        .ok_or_else(|| StoreError::Decode(format!("unexpected document name {name}")))?;

    let mut doc = Document::new(DocPath::parse(relative), fields_from_rest(raw.get("fields")));
    doc.created_at = raw
        .get("createTime")
        .and_then(|t| t.as_str())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));
    Ok(doc)
}

fn encode_filter(filter: &Filter) -> serde_json::Value {
    match filter {
        Filter::Equal(field, value) => json!({
            "fieldFilter": { "field": { "fieldPath": field }, "op": "EQUAL", "value": value.to_rest() }
        }),
        Filter::ArrayContains(field, value) => json!({
            "fieldFilter": { "field": { "fieldPath": field }, "op": "ARRAY_CONTAINS", "value": value.to_rest() }
        }),
        Filter::NotNull(field) => json!({
            "unaryFilter": { "field": { "fieldPath": field }, "op": "IS_NOT_NULL" }
        }),
    }
}

fn structured_query(query: &Query) -> serde_json::Value {
    let mut structured = json!({ "from": [{ "collectionId": query.collection.id() }] });

    match query.filters.as_slice() {
        [] => {}
        [single] => structured["where"] = encode_filter(single),
        many => {
            structured["where"] = json!({
                "compositeFilter": {
                    "op": "AND",
                    "filters": many.iter().map(encode_filter).collect::<Vec<_>>()
                }
            });
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([{ "field": { "fieldPath": order.field }, "direction": direction }]);
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }

    structured
}

impl DocumentStore for FirestoreStore {
    fn subscribe_document(&self, path: DocPath, callback: DocumentCallback) -> Subscription {
        let target = path.clone();
        self.poll(
            path.to_string(),
            move |store| {
                let target = target.clone();
                async move { store.fetch_document(target).await }.boxed_local()
            },
            callback,
        )
    }

    fn subscribe_collection(&self, path: DocPath, callback: CollectionCallback) -> Subscription {
        let target = path.clone();
        self.poll(
            path.to_string(),
            move |store| {
                let target = target.clone();
                async move { store.list_collection(target).await }.boxed_local()
            },
            callback,
        )
    }

    fn get(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<Option<Document>>> {
        self.fetch_document(path).boxed_local()
    }

    fn query(&self, query: Query) -> LocalBoxFuture<'_, StoreResult<Vec<Document>>> {
        self.run_query(query).boxed_local()
    }

    fn add(&self, collection: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<String>> {
        async move {
            let body = json!({ "fields": fields_to_rest(&fields) });
            let response = self
                .send(HTTP_CLIENT.post(self.path_url(&collection)).json(&body))
                .await?;
            let created: serde_json::Value = response.json().await?;
            let doc = decode_document(&created)?;
            debug!(path = %doc.path, "Created document");
            Ok(doc.id().to_string())
        }
        .boxed_local()
    }

    fn set(&self, path: DocPath, fields: Fields) -> LocalBoxFuture<'_, StoreResult<()>> {
        self.patch(path, fields, false).boxed_local()
    }

    fn update(&self, path: DocPath, partial: Fields) -> LocalBoxFuture<'_, StoreResult<()>> {
        self.patch(path, partial, true).boxed_local()
    }

    fn delete(&self, path: DocPath) -> LocalBoxFuture<'_, StoreResult<()>> {
        async move {
            self.send(HTTP_CLIENT.delete(self.path_url(&path))).await?;
            Ok(())
        }
        .boxed_local()
    }

    fn array_union(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>> {
        self.transform_array(path, field.to_string(), values, "appendMissingElements")
            .boxed_local()
    }

    fn array_remove(
        &self,
        path: DocPath,
        field: &str,
        values: Vec<Value>,
    ) -> LocalBoxFuture<'_, StoreResult<()>> {
        self.transform_array(path, field.to_string(), values, "removeAllFromArray")
            .boxed_local()
    }
}
