//! In-process notifications backend
//!
//! Serves the three notification endpoints from memory on a random port and
//! records every request it receives. When dropped, the server shuts down.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bistro_notifications::notifications::{
    HttpNotificationsRemote, MARK_ALL_READ_PATH, MARK_READ_PATH, NOTIFICATIONS_PATH,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use super::constants::{REMOTE_ID_1, REMOTE_ID_2};

#[derive(Default)]
struct BackendData {
    notifications: Vec<Value>,
    failure: Option<StatusCode>,
    fetch_user_ids: Vec<Option<String>>,
    mark_read_ids: Vec<String>,
    mark_all_read_user_ids: Vec<Option<String>>,
}

type SharedData = Arc<Mutex<BackendData>>;

/// Default records, in the shape the backend serializes them
pub fn default_records() -> Vec<Value> {
    vec![
        json!({
            "id": REMOTE_ID_1,
            "type": "success",
            "title": "Order Delivered",
            "message": "Enjoy your meal!",
            "referenceId": "ORD-2001",
            "createdAt": "2024-05-01T18:30:00",
            "isRead": false,
        }),
        json!({
            "id": REMOTE_ID_2,
            "type": "info",
            "title": "Loyalty Points",
            "message": "You earned 40 points.",
            "referenceId": null,
            "createdAt": "2024-05-01T17:00:00.123456",
            "isRead": true,
        }),
    ]
}

/// Test backend instance
pub struct TestBackend {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    data: SharedData,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl TestBackend {
    /// Spawns a backend serving [`default_records`].
    pub async fn spawn() -> Self {
        Self::spawn_with(default_records()).await
    }

    /// Spawns a backend serving `records` verbatim.
    pub async fn spawn_with(records: Vec<Value>) -> Self {
        let data: SharedData = Arc::new(Mutex::new(BackendData {
            notifications: records,
            ..Default::default()
        }));

        let app = Router::new()
            .route(NOTIFICATIONS_PATH, get(list_notifications))
            .route(MARK_READ_PATH, post(mark_read))
            .route(MARK_ALL_READ_PATH, post(mark_all_read))
            .with_state(data.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Backend failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            data,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// HTTP remote pointed at this backend.
    pub fn remote(&self, user_id: Option<&str>) -> HttpNotificationsRemote {
        HttpNotificationsRemote::new(self.base_url.clone(), user_id.map(String::from), 5)
            .expect("Failed to create remote")
    }

    /// Make every endpoint answer with `status` and an error body.
    pub fn fail_with(&self, status: StatusCode) {
        self.data.lock().unwrap().failure = Some(status);
    }

    pub fn fetch_user_ids(&self) -> Vec<Option<String>> {
        self.data.lock().unwrap().fetch_user_ids.clone()
    }

    pub fn mark_read_ids(&self) -> Vec<String> {
        self.data.lock().unwrap().mark_read_ids.clone()
    }

    pub fn mark_all_read_user_ids(&self) -> Vec<Option<String>> {
        self.data.lock().unwrap().mark_all_read_user_ids.clone()
    }

    /// Read flag of a record as currently held by the backend.
    pub fn is_read(&self, id: &str) -> Option<bool> {
        self.data
            .lock()
            .unwrap()
            .notifications
            .iter()
            .find(|n| n["id"] == id)
            .and_then(|n| n["isRead"].as_bool())
    }
}

fn failure_response(status: StatusCode) -> Response {
    (status, Json(json!({ "error": "backend_unavailable" }))).into_response()
}

async fn list_notifications(
    State(data): State<SharedData>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut data = data.lock().unwrap();
    data.fetch_user_ids.push(params.get("userId").cloned());
    if let Some(status) = data.failure {
        return failure_response(status);
    }
    Json(json!({ "notifications": data.notifications })).into_response()
}

async fn mark_read(State(data): State<SharedData>, Json(body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    let Some(id) = body["id"].as_str().filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "id_required" }))).into_response();
    };
    data.mark_read_ids.push(id.to_string());
    if let Some(status) = data.failure {
        return failure_response(status);
    }

    match data.notifications.iter_mut().find(|n| n["id"] == id) {
        Some(record) => {
            record["isRead"] = json!(true);
            Json(json!({ "ok": true })).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" }))).into_response(),
    }
}

async fn mark_all_read(
    State(data): State<SharedData>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut data = data.lock().unwrap();
    data.mark_all_read_user_ids.push(params.get("userId").cloned());
    if let Some(status) = data.failure {
        return failure_response(status);
    }
    for record in data.notifications.iter_mut() {
        record["isRead"] = json!(true);
    }
    Json(json!({ "ok": true })).into_response()
}
