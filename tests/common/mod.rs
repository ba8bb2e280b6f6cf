#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Multipart, Path, RawQuery, State},
    http::StatusCode,
    routing::{get, post},
};
use once_cell::sync::Lazy;
use reqwest::{Client, redirect};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// In-memory stand-in for the shop's REST API.
#[derive(Clone, Default)]
pub struct Upstream {
    store: Arc<Mutex<Store>>,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    tables: HashMap<&'static str, Vec<Value>>,
    queries: Vec<(&'static str, String)>,
}

pub struct MockUpstream {
    pub base_url: String,
    pub state: Upstream,
}

impl Upstream {
    pub fn seed(&self, table: &'static str, mut row: Value) -> i64 {
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = store.next_id;
        row["id"] = json!(id);
        store.tables.entry(table).or_default().push(row);
        id
    }

    pub fn rows(&self, table: &'static str) -> Vec<Value> {
        let store = self.store.lock().unwrap();
        store.tables.get(table).cloned().unwrap_or_default()
    }

    /// Query strings seen on a filtered list route, oldest first.
    pub fn received_queries(&self, path: &str) -> Vec<String> {
        let store = self.store.lock().unwrap();
        store
            .queries
            .iter()
            .filter(|(seen, _)| *seen == path)
            .map(|(_, query)| query.clone())
            .collect()
    }

    fn list(&self, table: &'static str) -> Json<Value> {
        Json(Value::Array(self.rows(table)))
    }

    /// Records the raw query, then applies any `key=value` pairs as equality filters.
    fn list_filtered(
        &self,
        path: &'static str,
        table: &'static str,
        query: Option<String>,
    ) -> Json<Value> {
        let query = query.unwrap_or_default();
        self.store.lock().unwrap().queries.push((path, query.clone()));
        let filters: Vec<(&str, &str)> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        let rows = self
            .rows(table)
            .into_iter()
            .filter(|row| {
                filters.iter().all(|(key, value)| match &row[*key] {
                    Value::String(text) => text == value,
                    Value::Null => false,
                    other => other.to_string() == *value,
                })
            })
            .collect();
        Json(Value::Array(rows))
    }

    fn fetch(&self, table: &'static str, id: i64) -> Reply {
        self.rows(table)
            .into_iter()
            .find(|row| row["id"] == json!(id))
            .map(Json)
            .ok_or_else(|| not_found(table, id))
    }

    fn insert(&self, table: &'static str, body: Value) -> (StatusCode, Json<Value>) {
        let id = self.seed(table, body);
        let row = self.fetch(table, id).map(|Json(row)| row).unwrap_or_default();
        (StatusCode::CREATED, Json(row))
    }

    fn update(&self, table: &'static str, id: i64, patch: Value) -> Reply {
        let mut store = self.store.lock().unwrap();
        let rows = store.tables.entry(table).or_default();
        let row = rows
            .iter_mut()
            .find(|row| row["id"] == json!(id))
            .ok_or_else(|| not_found(table, id))?;
        if let (Some(row), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in patch {
                row.insert(key.clone(), value.clone());
            }
        }
        Ok(Json(row.clone()))
    }

    fn remove(&self, table: &'static str, id: i64) -> Reply {
        let mut store = self.store.lock().unwrap();
        let rows = store.tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| row["id"] != json!(id));
        if rows.len() == before {
            return Err(not_found(table, id));
        }
        Ok(Json(json!({ "deleted": id })))
    }
}

fn not_found(table: &str, id: i64) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{table} {id} not found") })),
    )
}

fn crud(router: Router<Upstream>, table: &'static str) -> Router<Upstream> {
    router
        .route(
            &format!("/api/{table}"),
            get(move |State(up): State<Upstream>| async move { up.list(table) }).post(
                move |State(up): State<Upstream>, Json(body): Json<Value>| async move {
                    up.insert(table, body)
                },
            ),
        )
        .route(
            &format!("/api/{table}/:id"),
            get(move |State(up): State<Upstream>, Path(id): Path<i64>| async move {
                up.fetch(table, id)
            })
            .put(
                move |State(up): State<Upstream>,
                      Path(id): Path<i64>,
                      Json(body): Json<Value>| async move { up.update(table, id, body) },
            )
            .delete(move |State(up): State<Upstream>, Path(id): Path<i64>| async move {
                up.remove(table, id)
            }),
        )
}

async fn create_session(
    State(up): State<Upstream>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    body["status"] = json!("active");
    body["start_time"] = json!("2026-01-05T09:00:00Z");
    body["total_photos"] = json!(0);
    up.insert("photo-sessions", body)
}

async fn close_session(State(up): State<Upstream>, Path(id): Path<i64>) -> Reply {
    up.update(
        "photo-sessions",
        id,
        json!({ "status": "closed", "end_time": "2026-01-05T10:00:00Z" }),
    )
}

async fn upload_photo(State(up): State<Upstream>, mut multipart: Multipart) -> Reply {
    let mut photo = json!({ "timestamp": "2026-01-05T09:30:00Z" });
    let mut size = 0usize;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        match name.as_str() {
            "file" => size = bytes.len(),
            "session_id" | "vehicle_id" | "customer_id" => {
                let text = String::from_utf8_lossy(&bytes).to_string();
                photo[name.as_str()] = json!(text.parse::<i64>().unwrap_or_default());
            }
            _ => photo[name.as_str()] = json!(String::from_utf8_lossy(&bytes).to_string()),
        }
    }
    if size == 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "file is required" })),
        ));
    }

    if let Some(session_id) = photo["session_id"].as_i64() {
        let total = up
            .fetch("photo-sessions", session_id)
            .map(|Json(session)| session["total_photos"].as_i64().unwrap_or_default())
            .unwrap_or_default();
        let _ = up.update("photo-sessions", session_id, json!({ "total_photos": total + 1 }));
    }

    let (_, row) = up.insert("photos", photo);
    Ok(row)
}

pub fn upstream_router(state: Upstream) -> Router {
    let router = Router::new().route("/api", get(|| async { Json(json!({ "status": "ok" })) }));
    let router = crud(router, "customers");
    let router = crud(router, "vehicles");
    let router = crud(router, "services");
    router
        .route(
            "/api/photo-sessions",
            get(
                |State(up): State<Upstream>, RawQuery(query): RawQuery| async move {
                    up.list_filtered("/api/photo-sessions", "photo-sessions", query)
                },
            )
            .post(create_session),
        )
        .route(
            "/api/photo-sessions/:id",
            get(|State(up): State<Upstream>, Path(id): Path<i64>| async move {
                up.fetch("photo-sessions", id)
            }),
        )
        .route("/api/photo-sessions/:id/close", post(close_session))
        .route(
            "/api/photos",
            get(
                |State(up): State<Upstream>, RawQuery(query): RawQuery| async move {
                    up.list_filtered("/api/photos", "photos", query)
                },
            )
            .post(upload_photo),
        )
        .with_state(state)
}

/// Runs on its own thread and runtime so it outlives any single test.
pub fn spawn_upstream() -> MockUpstream {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock upstream");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("mock upstream addr");
    let state = Upstream::default();
    let app = upstream_router(state.clone());

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock upstream runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("mock upstream serve");
        });
    });

    MockUpstream {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// The `garage_pos` binary, killed when the last handle drops.
pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Shared by every test in a binary so the spawned server can point at it.
pub static UPSTREAM: Lazy<MockUpstream> = Lazy::new(spawn_upstream);
static SERVER: Lazy<tokio::sync::Mutex<Option<Arc<TestServer>>>> =
    Lazy::new(|| tokio::sync::Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_garage_pos"))
        .env("PORT", port.to_string())
        .env("API_BASE_URL", &UPSTREAM.base_url)
        .env("REQUIRED_ANGLES", "front,rear,left")
        .env("OPERATOR_NAME", "http-test")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

pub async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

pub fn no_redirects() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}
