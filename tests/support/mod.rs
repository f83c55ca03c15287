#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use roster_admin::services::auth::SessionManager;
use roster_admin::store::CredentialStore;

/// Request counters per collection, bumped for every request whether or
/// not it succeeds.
#[derive(Default)]
pub struct Counters {
    pub student_reads: AtomicUsize,
    pub student_writes: AtomicUsize,
    pub user_reads: AtomicUsize,
    pub user_writes: AtomicUsize,
}

#[derive(Clone)]
struct MockState {
    counters: Arc<Counters>,
    students: Arc<Mutex<Vec<Value>>>,
    users: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
}

/// In-process stand-in for the roster service: issues HS256 tokens on
/// login, requires a bearer on student reads and on every mutation, and
/// answers 409 on email/username conflicts.
pub struct MockApi {
    pub base_url: String,
    counters: Arc<Counters>,
    students: Arc<Mutex<Vec<Value>>>,
    users: Arc<Mutex<Vec<Value>>>,
}

impl MockApi {
    pub fn seed_student(&self, id: i64, firstname: &str, lastname: &str, email: &str) {
        self.students.lock().unwrap().push(json!({
            "id": id,
            "firstname": firstname,
            "lastname": lastname,
            "email": email,
        }));
    }

    pub fn seed_user(&self, id: i64, username: &str, role: &str) {
        self.users.lock().unwrap().push(json!({
            "id": id,
            "username": username,
            "role": role,
        }));
    }

    pub fn student_reads(&self) -> usize {
        self.counters.student_reads.load(Ordering::SeqCst)
    }

    pub fn student_writes(&self) -> usize {
        self.counters.student_writes.load(Ordering::SeqCst)
    }

    pub fn user_reads(&self) -> usize {
        self.counters.user_reads.load(Ordering::SeqCst)
    }

    pub fn user_writes(&self) -> usize {
        self.counters.user_writes.load(Ordering::SeqCst)
    }
}

pub async fn spawn() -> MockApi {
    let state = MockState {
        counters: Arc::new(Counters::default()),
        students: Arc::new(Mutex::new(Vec::new())),
        users: Arc::new(Mutex::new(Vec::new())),
        next_id: Arc::new(AtomicI64::new(1000)),
    };

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/{id}",
            put(update_student).delete(delete_student),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{addr}/api"),
        counters: state.counters,
        students: state.students,
        users: state.users,
    }
}

/// A session manager backed by a store inside `dir`, pointed at the
/// mock API.
pub fn session_at(dir: &tempfile::TempDir, base_url: &str) -> Arc<SessionManager> {
    let store = CredentialStore::new(dir.path().join("session.json"));
    Arc::new(SessionManager::new(
        reqwest::Client::new(),
        base_url,
        store,
    ))
}

pub fn mint_token(sub: &str, role: Option<&str>) -> String {
    let mut claims = json!({ "sub": sub });
    if let Some(role) = role {
        claims["role"] = json!(role);
    }
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"mock-secret"),
    )
    .unwrap()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let role = match (username, password) {
        ("alice", "secret") => Some(Some("ADMIN")),
        ("bob", "secret") => Some(Some("USER")),
        ("norole", "secret") => Some(None),
        _ => None,
    };
    match role {
        Some(role) => Json(json!({ "token": mint_token(username, role) })).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn list_students(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.counters.student_reads.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.students.lock().unwrap().clone()).into_response()
}

async fn create_student(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.student_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut students = state.students.lock().unwrap();
    if email_taken(&students, &body, None) {
        return StatusCode::CONFLICT.into_response();
    }
    let mut record = body;
    record["id"] = json!(state.next_id.fetch_add(1, Ordering::SeqCst));
    students.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_student(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.student_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut students = state.students.lock().unwrap();
    if email_taken(&students, &body, Some(id)) {
        return StatusCode::CONFLICT.into_response();
    }
    match students.iter_mut().find(|s| s["id"].as_i64() == Some(id)) {
        Some(existing) => {
            let mut record = body;
            record["id"] = json!(id);
            *existing = record.clone();
            Json(record).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_student(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    state.counters.student_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state
        .students
        .lock()
        .unwrap()
        .retain(|s| s["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_users(State(state): State<MockState>) -> Response {
    state.counters.user_reads.fetch_add(1, Ordering::SeqCst);
    Json(state.users.lock().unwrap().clone()).into_response()
}

async fn create_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.user_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut users = state.users.lock().unwrap();
    if username_taken(&users, &body, None) {
        return StatusCode::CONFLICT.into_response();
    }
    let mut record = body;
    record["id"] = json!(state.next_id.fetch_add(1, Ordering::SeqCst));
    users.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_user(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.user_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut users = state.users.lock().unwrap();
    if username_taken(&users, &body, Some(id)) {
        return StatusCode::CONFLICT.into_response();
    }
    match users.iter_mut().find(|u| u["id"].as_i64() == Some(id)) {
        Some(existing) => {
            let mut record = body;
            record["id"] = json!(id);
            *existing = record.clone();
            Json(record).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_user(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    state.counters.user_writes.fetch_add(1, Ordering::SeqCst);
    if bearer_token(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state
        .users
        .lock()
        .unwrap()
        .retain(|u| u["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

fn email_taken(students: &[Value], body: &Value, exclude: Option<i64>) -> bool {
    let email = body["email"].as_str().unwrap_or_default().to_lowercase();
    students.iter().any(|s| {
        s["id"].as_i64() != exclude
            && s["email"].as_str().unwrap_or_default().to_lowercase() == email
    })
}

fn username_taken(users: &[Value], body: &Value, exclude: Option<i64>) -> bool {
    let username = body["username"].as_str().unwrap_or_default().to_lowercase();
    users.iter().any(|u| {
        u["id"].as_i64() != exclude
            && u["username"].as_str().unwrap_or_default().to_lowercase() == username
    })
}
