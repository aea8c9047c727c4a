use axum::{response::Html, routing::get, Router};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Task {
    name: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct Collectible {
    name: String,
    priority: String,
    target_count: u32,
    held_count: u32,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct DailyCount {
    date: String,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    daily: Vec<DailyCount>,
}

#[derive(Debug, Deserialize)]
struct GridEditResponse {
    changed: bool,
    rows: Vec<Collectible>,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    added: usize,
    rows: Vec<Collectible>,
}

struct TestServer {
    base_url: String,
    data_dir: PathBuf,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

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

fn unique_data_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("dqw_tracker_http_{}_{}", std::process::id(), nanos));
    path
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/tasks")).send().await {
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
    let data_dir = unique_data_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_dqw_tracker"))
        .env("PORT", port.to_string())
        .env("STORAGE_BACKEND", "file")
        .env("APP_DATA_DIR", &data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_dir,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Serves a fixed page with one kokoro table on a random local port.
async fn spawn_table_page(names: &[&str]) -> String {
    let rows: String = names
        .iter()
        .map(|name| format!("<tr><td>{name}</td><td>S</td></tr>"))
        .collect();
    let page = format!(
        "<html><body><table><tr><th>name</th><th>rank</th></tr>{rows}</table></body></html>"
    );
    let app = Router::new().route(
        "/list",
        get(move || {
            let page = page.clone();
            async move { Html(page) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/list")
}

async fn history_count_today(client: &Client, server: &TestServer) -> usize {
    let history: HistoryResponse = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let today = today().to_string();
    history
        .daily
        .iter()
        .find(|point| point.date == today)
        .map(|point| point.count)
        .unwrap_or(0)
}

#[tokio::test]
async fn http_task_toggle_logs_history_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("walk-{}", std::process::id());

    let created = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);
    let tasks: Vec<Task> = created.json().await.unwrap();
    let index = tasks.iter().position(|task| task.name == name).unwrap();
    assert!(!tasks[index].done);

    let before = history_count_today(&client, &server).await;

    let toggled: Vec<Task> = client
        .post(format!("{}/api/tasks/{index}/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(toggled[index].done);
    assert_eq!(history_count_today(&client, &server).await, before + 1);

    client
        .post(format!("{}/api/tasks/{index}/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(history_count_today(&client, &server).await, before);

    let csv = std::fs::read_to_string(server.data_dir.join("history.csv")).unwrap();
    let lines = csv.lines().filter(|line| line.contains(&name)).count();
    assert_eq!(lines, 1);
    assert!(csv.lines().any(|line| line.contains(&name) && line.ends_with("todo")));

    let removed = client
        .delete(format!("{}/api/tasks/{index}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(removed.status().is_success());
}

#[tokio::test]
async fn http_blank_task_and_bad_index_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let blank = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), reqwest::StatusCode::BAD_REQUEST);

    let missing = client
        .post(format!("{}/api/tasks/9999/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_pacing_reports_quota_and_deadline() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let target_date = today() + chrono::Duration::days(100);
    let on_track: Value = client
        .get(format!(
            "{}/api/pacing?current=1000&target=2000&target_date={target_date}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(on_track["state"], "on_track");
    assert_eq!(on_track["per_day"], 10.0);
    assert_eq!(on_track["advisory"], "easy");

    let passed: Value = client
        .get(format!(
            "{}/api/pacing?current=1000&target=2000&target_date={}",
            server.base_url,
            today()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(passed["state"], "deadline_passed");
    assert!(passed.get("per_day").is_none());

    let negative = client
        .get(format!(
            "{}/api/pacing?current=-1&target=9223372036854775807&target_date={target_date}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(negative.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(negative.text().await.unwrap(), "current must not be negative");
}

#[tokio::test]
async fn http_kokoro_grid_edit_recomputes_completion() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("grid-{}", std::process::id());

    let rows: Vec<Collectible> = client
        .get(format!("{}/api/kokoro", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut grid: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "name": row.name,
                "priority": row.priority,
                "target_count": row.target_count,
                "held_count": row.held_count,
            })
        })
        .collect();
    grid.push(json!({ "name": name, "priority": "high", "target_count": 2, "held_count": 2 }));

    let edited: GridEditResponse = client
        .put(format!("{}/api/kokoro", server.base_url))
        .json(&grid)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(edited.changed);
    let row = edited.rows.iter().find(|row| row.name == name).unwrap();
    assert!(row.completed);

    let unchanged: GridEditResponse = client
        .put(format!("{}/api/kokoro", server.base_url))
        .json(&grid)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!unchanged.changed);

    let index = unchanged.rows.iter().position(|row| row.name == name).unwrap();
    let patched: Collectible = client
        .patch(format!("{}/api/kokoro/{index}", server.base_url))
        .json(&json!({ "held_count": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!patched.completed);

    let csv = std::fs::read_to_string(server.data_dir.join("kokoro.csv")).unwrap();
    assert!(csv.contains(&format!("{name},high,2,1,false")));
}

#[tokio::test]
async fn http_import_adds_only_new_names() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let existing = format!("known-{}", std::process::id());
    let fresh = format!("fresh-{}", std::process::id());

    client
        .post(format!("{}/api/kokoro", server.base_url))
        .json(&json!({ "name": existing }))
        .send()
        .await
        .unwrap();

    let url = spawn_table_page(&[existing.as_str(), fresh.as_str()]).await;
    let tables: Vec<Value> = client
        .post(format!("{}/api/import/preview", server.base_url))
        .json(&json!({ "url": url }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tables.len(), 1);

    let imported: ImportResponse = client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!({ "table_index": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(imported.added, 1);
    let row = imported.rows.iter().find(|row| row.name == fresh).unwrap();
    assert_eq!(row.priority, "medium");
    assert_eq!(row.target_count, 2);
    assert_eq!(row.held_count, 0);
    assert!(!row.completed);

    let again: ImportResponse = client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!({ "table_index": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again.added, 0);
}

#[tokio::test]
async fn http_unreachable_import_yields_no_tables() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let url = format!("http://127.0.0.1:{}/nothing", pick_free_port());
    let tables: Vec<Value> = client
        .post(format!("{}/api/import/preview", server.base_url))
        .json(&json!({ "url": url }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(tables.is_empty());

    let import = client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!({ "table_index": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(import.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_export_serves_csv() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/export/kokoro.csv", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    let body = response.text().await.unwrap();
    assert!(body.starts_with("name,priority,target_count,held_count,completed"));

    let unknown = client
        .get(format!("{}/api/export/secrets", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_index_renders_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let body = Client::new()
        .get(&server.base_url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("DQW Progress Manager"));
    assert!(!body.contains("{{"));
}
