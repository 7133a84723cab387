// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

use recipehub::db::{FirestoreDb, MemoryStore};
use recipehub::mirror::{ScreenState, ScreenView};
use recipehub::models::{Ingredient, Recipe, RecipeDraft, Timestamp};
use recipehub::services::RecipeService;
use recipehub::session::{Identity, SessionHandle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique id for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// In-memory store plus a recipe service signed in as `uid` (or signed out).
#[allow(dead_code)]
pub fn offline_service(uid: Option<&str>) -> (MemoryStore, RecipeService<MemoryStore>) {
    let store = MemoryStore::new();
    let identity = uid.map(|u| Identity::new(u).with_email(format!("{}@example.com", u)));
    let service = RecipeService::new(store.clone(), SessionHandle::fixed(identity));
    (store, service)
}

#[allow(dead_code)]
pub fn recipe(id: &str, owner: &str, created_millis: i64, keywords: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: id.to_string(),
        owner_id: owner.to_string(),
        created_at: Timestamp::from_millis(created_millis),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn tacos_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Tacos".to_string(),
        ingredients: vec![Ingredient::named("Tortilla")],
        instructions: "Fill and fold".to_string(),
        ..Default::default()
    }
}

/// Wait (bounded) until the screen state satisfies `done`.
#[allow(dead_code)]
pub async fn settle(state: &ScreenState, done: impl Fn(&ScreenView) -> bool) -> ScreenView {
    tokio::time::timeout(Duration::from_secs(5), state.wait_until(done))
        .await
        .expect("screen state did not settle")
}

/// Ids of a view's items, in display order.
#[allow(dead_code)]
pub fn ids(view: &ScreenView) -> Vec<String> {
    view.items.iter().map(|r| r.id.clone()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// STUB HTTP SERVER
// ═══════════════════════════════════════════════════════════════════════════

/// A request seen by [`StubServer`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct StubRequest {
    /// Request target including the query string
    pub target: String,
    pub body: String,
}

#[allow(dead_code)]
impl StubRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Minimal HTTP/1.1 server answering canned responses by path fragment.
#[allow(dead_code)]
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    task: JoinHandle<()>,
}

#[allow(dead_code)]
impl StubServer {
    /// `routes` maps a fragment of the request target to `(status, body)`.
    /// Unmatched requests get a 404.
    pub async fn start(routes: Vec<(&'static str, u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let seen = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let _ = answer(stream, &routes, &seen).await;
                });
            }
        });

        Self {
            base_url,
            requests,
            task,
        }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[allow(dead_code)]
async fn answer(
    mut stream: TcpStream,
    routes: &[(&'static str, u16, String)],
    seen: &Mutex<Vec<StubRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    seen.lock().unwrap().push(StubRequest {
        target: target.clone(),
        body,
    });

    let (status, reply) = routes
        .iter()
        .find(|(fragment, _, _)| target.contains(fragment))
        .map(|(_, status, reply)| (*status, reply.clone()))
        .unwrap_or((404, "{}".to_string()));
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
