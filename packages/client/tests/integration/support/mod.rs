use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use client::{CabinService, RestBackend};
use common::cabin::{CabinDraft, CabinFields, CabinImage, ImageUpload};
use common::config::BackendConfig;
use common::storage::memory::MemoryObjectStore;
use common::table::memory::MemoryCabinTable;
use serde_json::{Value, json};

pub const API_KEY: &str = "test-anon-key";
pub const MEMORY_BASE: &str = "https://test.supabase.co/storage/v1/object/public/avatars/";

pub fn fields(name: &str) -> CabinFields {
    CabinFields {
        name: name.into(),
        max_capacity: 4,
        regular_price: 450,
        discount: 50,
        description: "Cabin by the lake".into(),
    }
}

pub fn upload_draft(name: &str) -> CabinDraft {
    CabinDraft {
        fields: fields(name),
        image: CabinImage::Upload(ImageUpload::new("cabin-002.jpg", b"JPEG_DATA".to_vec())),
    }
}

pub fn stored_draft(name: &str, uri: &str) -> CabinDraft {
    CabinDraft {
        fields: fields(name),
        image: CabinImage::Stored(uri.into()),
    }
}

/// Service wired to in-memory seams, with handles for inspection.
pub struct MemoryApp {
    pub service: CabinService,
    pub table: Arc<MemoryCabinTable>,
    pub storage: Arc<MemoryObjectStore>,
}

impl MemoryApp {
    pub fn new() -> Self {
        let table = Arc::new(MemoryCabinTable::new());
        let storage = Arc::new(MemoryObjectStore::new(MEMORY_BASE));
        Self {
            service: CabinService::new(table.clone(), storage.clone()),
            table,
            storage,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct FakeState {
    pub rows: BTreeMap<i64, Value>,
    pub next_id: i64,
    pub objects: HashMap<String, Vec<u8>>,
    pub requests: Vec<RecordedRequest>,
    pub fail_uploads: bool,
    pub fail_writes: bool,
}

type Shared = Arc<Mutex<FakeState>>;

/// An in-process stand-in for the hosted backend's REST and storage APIs.
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: Shared,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            next_id: 1,
            ..Default::default()
        }));

        let app = Router::new()
            .route(
                "/rest/v1/cabins",
                get(select_rows)
                    .post(insert_row)
                    .patch(update_row)
                    .delete(delete_rows),
            )
            .route("/storage/v1/object/avatars/{name}", post(upload_object))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend crashed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig::new(self.url(), API_KEY)
    }

    pub fn service(&self) -> CabinService {
        RestBackend::connect(&self.config())
            .expect("Failed to build REST backend")
            .into_service()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake backend state poisoned")
    }

    pub fn seed(&self, name: &str, image: &str) -> i64 {
        self.seed_row(json!({
            "created_at": "2024-03-01T10:00:00Z",
            "name": name,
            "maxCapacity": 2,
            "regularPrice": 250,
            "discount": 0,
            "description": "Seeded",
            "image": image,
        }))
    }

    /// Insert `row` as stored, assigning the next id.
    pub fn seed_row(&self, mut row: Value) -> i64 {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        row["id"] = json!(id);
        state.rows.insert(id, row);
        id
    }

    /// Seed a row whose nullable columns are `null`.
    pub fn seed_sparse(&self, name: &str, image: &str) -> i64 {
        self.seed_row(json!({
            "created_at": "2024-03-01T10:00:00Z",
            "name": name,
            "maxCapacity": 6,
            "regularPrice": 500,
            "discount": null,
            "description": null,
            "image": image,
        }))
    }

    pub fn requests(&self, method: Method, path_prefix: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .cloned()
            .collect()
    }
}

fn record(
    state: &mut FakeState,
    method: Method,
    path: String,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
) {
    state.requests.push(RecordedRequest {
        method,
        path,
        query: query.clone(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });
}

fn unauthorized(headers: &HeaderMap) -> Option<Response> {
    let key = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let expected_bearer = format!("Bearer {API_KEY}");
    if key == Some(API_KEY) && bearer == Some(expected_bearer.as_str()) {
        return None;
    }
    Some(
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response(),
    )
}

fn id_filter(query: &HashMap<String, String>) -> Option<i64> {
    query.get("id")?.strip_prefix("eq.")?.parse().ok()
}

fn write_failure() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "code": "23502",
            "message": "null value in column \"name\" violates not-null constraint",
        })),
    )
        .into_response()
}

async fn select_rows(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let mut state = state.lock().expect("poisoned");
    record(&mut state, Method::GET, "/rest/v1/cabins".into(), &query, &headers);
    let rows: Vec<Value> = state.rows.values().cloned().collect();
    Json(Value::Array(rows)).into_response()
}

async fn insert_row(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let mut state = state.lock().expect("poisoned");
    record(&mut state, Method::POST, "/rest/v1/cabins".into(), &query, &headers);
    if state.fail_writes {
        return write_failure();
    }

    let id = state.next_id;
    state.next_id += 1;
    body["id"] = json!(id);
    body["created_at"] = json!("2024-03-02T08:30:00Z");
    state.rows.insert(id, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_row(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let mut state = state.lock().expect("poisoned");
    record(&mut state, Method::PATCH, "/rest/v1/cabins".into(), &query, &headers);
    if state.fail_writes {
        return write_failure();
    }

    let row = match id_filter(&query) {
        Some(id) => state.rows.get_mut(&id),
        None => None,
    };
    let Some(row) = row else {
        return (
            StatusCode::NOT_ACCEPTABLE,
            Json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned",
            })),
        )
            .into_response();
    };

    if let (Some(target), Some(patch)) = (row.as_object_mut(), body.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(row.clone()).into_response()
}

async fn delete_rows(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let mut state = state.lock().expect("poisoned");
    record(&mut state, Method::DELETE, "/rest/v1/cabins".into(), &query, &headers);

    let removed: Vec<Value> = id_filter(&query)
        .and_then(|id| state.rows.remove(&id))
        .into_iter()
        .collect();
    Json(Value::Array(removed)).into_response()
}

async fn upload_object(
    State(state): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let mut state = state.lock().expect("poisoned");
    record(
        &mut state,
        Method::POST,
        format!("/storage/v1/object/avatars/{name}"),
        &HashMap::new(),
        &headers,
    );

    if state.fail_uploads {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": "413",
                "error": "Payload too large",
                "message": "The object exceeded the maximum allowed size",
            })),
        )
            .into_response();
    }
    if state.objects.contains_key(&name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": "409",
                "error": "Duplicate",
                "message": "The resource already exists",
            })),
        )
            .into_response();
    }

    state.objects.insert(name.clone(), body.to_vec());
    Json(json!({ "Key": format!("avatars/{name}") })).into_response()
}
