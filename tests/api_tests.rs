//! Black-box tests against the full router, with test doubles for the
//! mail and image-host collaborators.

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

use fountain_api::auth::TokenService;
use fountain_api::config::Config;
use fountain_api::db::Storage;
use fountain_api::error::FountainError;
use fountain_api::router::{FountainState, fountain_router};
use fountain_api::service::chat::ChatClient;
use fountain_api::service::{ChatCompleter, Mailer, ObjectStore, StoredObject, seed};

#[derive(Debug, Clone)]
struct SentMail {
    to: String,
    body: String,
}

/// Mailer double; records sends, or fails every dispatch when told to.
struct RecordingMailer {
    succeed: bool,
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<(), FountainError> {
        if !self.succeed {
            return Err(FountainError::Mail("dispatch double set to fail".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Object-store double; hands out deterministic URLs and records deletes.
/// Can be told to fail every upload from the Nth one onward.
struct MemoryStore {
    counter: AtomicU64,
    deleted: Mutex<Vec<String>>,
    fail_from: Mutex<Option<u64>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            deleted: Mutex::new(Vec::new()),
            fail_from: Mutex::new(None),
        }
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Uploads numbered `n` (zero-based) and later will fail.
    fn fail_from(&self, n: u64) {
        *self.fail_from.lock().unwrap() = Some(n);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredObject, FountainError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_from.lock().unwrap() {
            if n >= limit {
                return Err(FountainError::Storage("host double set to fail".into()));
            }
        }
        Ok(StoredObject {
            url: format!("https://img.test/{folder}/{n}-{filename}"),
            public_id: format!("{folder}/obj-{n}"),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), FountainError> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Completion-upstream double; replies with a fixed line and records what
/// it was asked.
struct ScriptedChat {
    reply: String,
    asked: Mutex<Vec<(String, usize)>>,
}

impl ScriptedChat {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<(String, usize)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompleter for ScriptedChat {
    async fn complete(
        &self,
        message: &str,
        history: &[fountain_api::service::ChatTurn],
    ) -> Result<String, FountainError> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), history.len()));
        Ok(self.reply.clone())
    }
}

struct TestApp {
    app: Router,
    storage: Storage,
    mailer: Arc<RecordingMailer>,
    store: Arc<MemoryStore>,
    db_path: PathBuf,
}

impl TestApp {
    async fn spawn() -> Self {
        Self::spawn_inner(true, None).await
    }

    async fn spawn_with_mailer(mail_succeeds: bool) -> Self {
        Self::spawn_inner(mail_succeeds, None).await
    }

    async fn spawn_with_chat(completer: Arc<dyn ChatCompleter>) -> Self {
        Self::spawn_inner(true, Some(completer)).await
    }

    async fn spawn_inner(mail_succeeds: bool, completer: Option<Arc<dyn ChatCompleter>>) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut db_path = std::env::temp_dir();
        db_path.push(format!(
            "fountain-api-test-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));

        let cfg = Config::default();
        let storage = Storage::connect(&format!("sqlite:{}", db_path.display()))
            .await
            .expect("test database should open");
        seed::seed_admin(&storage, &cfg)
            .await
            .expect("admin seeding should succeed");

        let mailer = Arc::new(RecordingMailer::new(mail_succeeds));
        let store = Arc::new(MemoryStore::new());
        let chat: Arc<dyn ChatCompleter> = completer
            .unwrap_or_else(|| Arc::new(ChatClient::new(reqwest::Client::new(), &cfg.chat)));
        let state = FountainState::new(
            storage.clone(),
            TokenService::from_config(&cfg),
            mailer.clone(),
            store.clone(),
            chat,
            &cfg.cloud.folder_prefix,
        );

        Self {
            app: fountain_router(state),
            storage,
            mailer,
            store,
            db_path,
        }
    }

    async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("request failed")
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    async fn login(&self) -> String {
        let resp = self
            .send_json(
                "POST",
                "/api/login",
                None,
                json!({"email": "admin@fountainofpeace.com", "password": "admin123"}),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        read_json(resp).await["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
        for suffix in ["-wal", "-shm"] {
            let mut side = self.db_path.as_os_str().to_owned();
            side.push(suffix);
            let _ = std::fs::remove_file(PathBuf::from(side));
        }
    }
}

async fn read_json(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}

fn multipart_body(boundary: &str, category: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\n{category}\r\n"
        )
        .as_bytes(),
    );
    for (filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; \
                 filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, category: &str, files: &[(&str, &[u8])]) -> Response<Body> {
    let boundary = "X-FOUNTAIN-TEST-BOUNDARY";
    let body = multipart_body(boundary, category, files);
    app.request(
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn contact_form_validates_and_creates() {
    let app = TestApp::spawn().await;

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane Doe", "email": "jane@example.com", "tourDate": "2026-09-15"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], "new");
    assert_eq!(body["data"]["tourDate"], "2026-09-15");
    assert!(body["data"]["id"].as_i64().is_some());

    // Missing name and malformed email both reject without writing a row.
    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "  ", "email": "jane@example.com"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane", "email": "not-an-email"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let token = app.login().await;
    let resp = app.get("/api/inquiries", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = read_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn inquiry_lifecycle_new_read_replied() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane Doe", "email": "jane@example.com"}),
        )
        .await;
    let id = read_json(resp).await["data"]["id"].as_i64().unwrap();

    // Operator opens the detail view: mark read. Idempotent on repeat.
    let resp = app
        .send_json(
            "PATCH",
            &format!("/api/inquiries/{id}/status"),
            Some(&token),
            json!({"status": "read"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["status"], "read");

    let resp = app
        .send_json(
            "PATCH",
            &format!("/api/inquiries/{id}/status"),
            Some(&token),
            json!({"status": "read"}),
        )
        .await;
    assert_eq!(read_json(resp).await["status"], "read");

    // Reply dispatches mail, then transitions to replied.
    let resp = app
        .send_json(
            "POST",
            &format!("/api/inquiries/{id}/reply"),
            Some(&token),
            json!({"replyMessage": "We'd love to have you tour!"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
    assert_eq!(sent[0].body, "We'd love to have you tour!");

    // A status transition never reverses.
    let resp = app
        .send_json(
            "PATCH",
            &format!("/api/inquiries/{id}/status"),
            Some(&token),
            json!({"status": "read"}),
        )
        .await;
    assert_eq!(read_json(resp).await["status"], "replied");

    // Gone from the "new" filter for good.
    let resp = app.get("/api/inquiries?status=new", Some(&token)).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 0);
    let resp = app.get("/api/inquiries?status=replied", Some(&token)).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_dispatch_leaves_status_unchanged() {
    let app = TestApp::spawn_with_mailer(false).await;
    let token = app.login().await;

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane Doe", "email": "jane@example.com"}),
        )
        .await;
    let id = read_json(resp).await["data"]["id"].as_i64().unwrap();

    let resp = app
        .send_json(
            "POST",
            &format!("/api/inquiries/{id}/reply"),
            Some(&token),
            json!({"replyMessage": "hello"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app.get("/api/inquiries?status=new", Some(&token)).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reply_rejects_blank_body_and_unknown_id() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane", "email": "jane@example.com"}),
        )
        .await;
    let id = read_json(resp).await["data"]["id"].as_i64().unwrap();

    let resp = app
        .send_json(
            "POST",
            &format!("/api/inquiries/{id}/reply"),
            Some(&token),
            json!({"replyMessage": "   "}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());

    let resp = app
        .send_json(
            "POST",
            "/api/inquiries/9999/reply",
            Some(&token),
            json!({"replyMessage": "hello"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let app = TestApp::spawn().await;

    // No credential at all: 401.
    let resp = app.get("/api/inquiries", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong scheme: 401.
    let resp = app
        .request(
            Request::builder()
                .method("GET")
                .uri("/api/inquiries")
                .header("authorization", "Basic YWJjOmRlZg==")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unverifiable token: 403.
    let resp = app.get("/api/inquiries", Some("not-a-real-token")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = upload(&app, "not-a-real-token", "hero", &[("a.jpg", b"x".as_slice())]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_rejects_unknown_user_and_wrong_password() {
    let app = TestApp::spawn().await;

    let resp = app
        .send_json(
            "POST",
            "/api/login",
            None,
            json!({"email": "nobody@example.com", "password": "admin123"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .send_json(
            "POST",
            "/api/login",
            None,
            json!({"email": "admin@fountainofpeace.com", "password": "wrong"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_lists_newest_first_and_deletes_by_id() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let resp = upload(
        &app,
        &token,
        "hero",
        &[
            ("one.jpg", b"aaaa".as_slice()),
            ("two.jpg", b"bbbb".as_slice()),
            ("three.jpg", b"cccc".as_slice()),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["type"], "hero");
    let file_paths: Vec<String> = body["filePaths"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(file_paths.len(), 3);

    // Same-second inserts: newest-first means reverse upload order.
    let resp = app.get("/api/images?type=hero", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let urls: Vec<String> = read_json(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    let mut expected = file_paths.clone();
    expected.reverse();
    assert_eq!(urls, expected);

    // Delete one by row id; the remote destroy happens too.
    let newest = app
        .storage
        .list_images(Some(fountain_api::db::ImageCategory::Hero))
        .await
        .unwrap();
    let target = newest.first().unwrap().clone();
    let resp = app
        .request(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/images/{}", target.id))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.store.deleted(), vec![target.public_id.clone().unwrap()]);

    // Idempotent: deleting it again (or any unknown id) is still success.
    let resp = app
        .request(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/images/{}", target.id))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        read_json(resp).await["message"],
        "Image already deleted/not found"
    );

    let resp = app.get("/api/images?type=hero", None).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn upload_partial_failure_keeps_earlier_files() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    // Third push to the host fails; the first two rows stay committed.
    app.store.fail_from(2);
    let resp = upload(
        &app,
        &token,
        "gallery",
        &[
            ("one.jpg", b"aaaa".as_slice()),
            ("two.jpg", b"bbbb".as_slice()),
            ("three.jpg", b"cccc".as_slice()),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(resp).await["error"]["code"], "STORAGE_ERROR");

    let resp = app.get("/api/images?type=gallery", None).await;
    let urls: Vec<String> = read_json(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(urls.len(), 2);
    // Newest-first: the second committed file, then the first. The failed
    // third file left nothing behind.
    assert!(urls[0].ends_with("1-two.jpg"));
    assert!(urls[1].ends_with("0-one.jpg"));
}

#[tokio::test]
async fn upload_rejects_empty_unknown_and_oversized_batches() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let resp = upload(&app, &token, "hero", &[]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = upload(&app, &token, "banner", &[("a.jpg", b"x".as_slice())]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let file: (&str, &[u8]) = ("a.jpg", b"x");
    let eleven = vec![file; 11];
    let resp = upload(&app, &token, "gallery", &eleven).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was committed by any rejected request.
    let resp = app.get("/api/images?type=gallery", None).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn images_list_rejects_unknown_category() {
    let app = TestApp::spawn().await;
    let resp = app.get("/api/images?type=banner", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn testimonials_append_and_list() {
    let app = TestApp::spawn().await;

    let resp = app
        .send_json(
            "POST",
            "/api/testimonials",
            None,
            json!({"author": "Mary", "relation": "Daughter of resident", "text": "Wonderful care."}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .send_json(
            "POST",
            "/api/testimonials",
            None,
            json!({"author": "Tom", "relation": "Son of resident", "text": "Feels like family."}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .send_json(
            "POST",
            "/api/testimonials",
            None,
            json!({"author": "Eve", "relation": "", "text": "hi"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.get("/api/testimonials", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = read_json(resp).await;
    let authors: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["author"].as_str().unwrap())
        .collect();
    assert_eq!(authors, vec!["Tom", "Mary"]);
}

#[tokio::test]
async fn chat_requires_a_message() {
    let app = TestApp::spawn().await;
    let resp = app
        .send_json("POST", "/api/chat", None, json!({"message": "  "}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // With no upstream configured the relay reports a gateway failure.
    let resp = app
        .send_json("POST", "/api/chat", None, json!({"message": "hello"}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn chat_relays_upstream_reply() {
    let completer = Arc::new(ScriptedChat::new("We offer daily tours at 10am."));
    let app = TestApp::spawn_with_chat(completer.clone()).await;

    let resp = app
        .send_json(
            "POST",
            "/api/chat",
            None,
            json!({
                "message": "When can I visit?",
                "history": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello! How can I help?"}
                ]
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        read_json(resp).await["reply"],
        "We offer daily tours at 10am."
    );

    // The upstream saw the trimmed message plus both prior turns.
    assert_eq!(
        completer.asked(),
        vec![("When can I visit?".to_string(), 2)]
    );
}

#[tokio::test]
async fn status_patch_rejects_unknown_status() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let resp = app
        .send_json(
            "POST",
            "/api/contact",
            None,
            json!({"name": "Jane", "email": "jane@example.com"}),
        )
        .await;
    let id = read_json(resp).await["data"]["id"].as_i64().unwrap();

    let resp = app
        .send_json(
            "PATCH",
            &format!("/api/inquiries/{id}/status"),
            Some(&token),
            json!({"status": "archived"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(resp).await["error"]["code"], "VALIDATION_ERROR");

    // The row is untouched.
    let resp = app.get("/api/inquiries?status=new", Some(&token)).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 1);
}
