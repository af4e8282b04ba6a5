//! Shared helpers for the dashboard conformance test suite.
//!
//! Provides [`spawn_api`] — a stub of the remote API bound to an ephemeral
//! port — and [`Harness`], which wires a real [`SessionStore`] and
//! [`ResourceFetcher`] to it with hooks that record every side effect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sensordash::{FailureClass, Notice};
use sensordash_api::{ApiEndpoints, AuthenticationRequest, AuthenticationResponse, NetworkRecord};
use sensordash_client::{
    Logout, MemoryStorage, Notifier, Reload, ResourceFetcher, SessionStorage, SessionStore,
};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Stub API
// ---------------------------------------------------------------------------

/// How the stub answers `GET /networks` when an override is set.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this status and an empty JSON object.
    Status(u16),
    /// Respond 200 with this JSON body.
    Json(Value),
    /// Respond 200 with this raw body.
    Raw(String),
}

struct Account {
    password: String,
    user_identifier: String,
    access_token: String,
}

/// State of the stub remote API. Tests mutate it directly.
#[derive(Default)]
pub struct StubApi {
    accounts: Mutex<HashMap<String, Account>>,
    networks: Mutex<HashMap<String, Vec<NetworkRecord>>>,
    networks_override: Mutex<Option<Reply>>,
    authentication_override: Mutex<Option<Reply>>,
    network_requests: AtomicUsize,
    authorization_headers: Mutex<Vec<String>>,
}

impl StubApi {
    /// Register an account whose login yields `access_token`.
    pub fn add_account(
        &self,
        user_name: &str,
        password: &str,
        user_identifier: &str,
        access_token: &str,
    ) {
        self.accounts.lock().unwrap().insert(
            user_name.to_string(),
            Account {
                password: password.to_string(),
                user_identifier: user_identifier.to_string(),
                access_token: access_token.to_string(),
            },
        );
    }

    /// Networks returned to requests bearing `access_token`.
    pub fn set_networks(&self, access_token: &str, networks: Vec<NetworkRecord>) {
        self.networks
            .lock()
            .unwrap()
            .insert(access_token.to_string(), networks);
    }

    pub fn override_networks(&self, reply: Reply) {
        *self.networks_override.lock().unwrap() = Some(reply);
    }

    pub fn override_authentication(&self, reply: Reply) {
        *self.authentication_override.lock().unwrap() = Some(reply);
    }

    /// Number of `GET /networks` requests received.
    pub fn network_requests(&self) -> usize {
        self.network_requests.load(Ordering::SeqCst)
    }

    /// `Authorization` header values received on `GET /networks`, in order.
    pub fn authorization_headers(&self) -> Vec<String> {
        self.authorization_headers.lock().unwrap().clone()
    }
}

fn reply(r: Reply) -> Response {
    match r {
        Reply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(serde_json::json!({}))).into_response()
        }
        Reply::Json(body) => (StatusCode::OK, Json(body)).into_response(),
        Reply::Raw(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
    }
}

async fn authenticate(
    State(api): State<Arc<StubApi>>,
    Json(req): Json<AuthenticationRequest>,
) -> Response {
    if let Some(r) = api.authentication_override.lock().unwrap().clone() {
        return reply(r);
    }
    let accounts = api.accounts.lock().unwrap();
    match accounts.get(&req.user_name) {
        Some(a) if a.password == req.password => Json(AuthenticationResponse {
            user_identifier: a.user_identifier.clone(),
            access_token: a.access_token.clone(),
        })
        .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn list_networks(State(api): State<Arc<StubApi>>, headers: HeaderMap) -> Response {
    api.network_requests.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    api.authorization_headers
        .lock()
        .unwrap()
        .push(authorization.clone());

    // Give concurrent callers a chance to overlap with this request.
    tokio::time::sleep(Duration::from_millis(20)).await;

    if let Some(r) = api.networks_override.lock().unwrap().clone() {
        return reply(r);
    }
    let token = authorization.strip_prefix("Bearer ").unwrap_or_default();
    match api.networks.lock().unwrap().get(token) {
        Some(networks) => Json(networks.clone()).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Start the stub API on an ephemeral port and return `(base_url, api)`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_api() -> (String, Arc<StubApi>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let api = Arc::new(StubApi::default());
    let router = Router::new()
        .route("/authentication", post(authenticate))
        .route("/networks", get(list_networks))
        .with_state(Arc::clone(&api));

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub api error");
    });

    (base_url, api)
}

// ---------------------------------------------------------------------------
// Recording hooks
// ---------------------------------------------------------------------------

/// A side effect observed during a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Notice(FailureClass),
    Logout,
    Reload,
}

/// Records every hook call, then delegates logout and reload to the real
/// session store.
pub struct Recorder {
    session: Arc<SessionStore>,
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: &Notice) {
        self.push(Event::Notice(notice.class));
    }
}

#[async_trait]
impl Logout for Recorder {
    async fn logout(&self) {
        self.push(Event::Logout);
        Logout::logout(self.session.as_ref()).await;
    }
}

#[async_trait]
impl Reload for Recorder {
    async fn reload(&self) {
        self.push(Event::Reload);
        Reload::reload(self.session.as_ref()).await;
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A stub API plus a client wired to it.
pub struct Harness {
    pub base_url: String,
    pub api: Arc<StubApi>,
    pub storage: Arc<MemoryStorage>,
    pub session: Arc<SessionStore>,
    pub recorder: Arc<Recorder>,
    pub fetcher: Arc<ResourceFetcher>,
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Spawn a stub API with one account (`ada` / `pw`, token `abc123`) and a
/// client whose session storage starts empty.
pub async fn harness() -> Harness {
    let (base_url, api) = spawn_api().await;
    api.add_account("ada", "pw", "u-ada", "abc123");

    let endpoints = ApiEndpoints::new(&base_url);
    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(SessionStore::new(
        Arc::clone(&storage) as Arc<dyn SessionStorage>,
        http_client(),
        endpoints.clone(),
    ));
    let recorder = Arc::new(Recorder::new(Arc::clone(&session)));
    let fetcher = Arc::new(ResourceFetcher::new(
        http_client(),
        endpoints,
        Arc::clone(&recorder) as Arc<dyn Notifier>,
        Arc::clone(&recorder) as Arc<dyn Reload>,
    ));

    Harness {
        base_url,
        api,
        storage,
        session,
        recorder,
        fetcher,
    }
}
