//! End-to-end tests of the dashboard client.
//!
//! Each test spawns a stub of the remote API (real TCP, real HTTP) via
//! [`sensordash_conformance::harness`] and drives the real session store and
//! fetcher against it.
//!
//! # Coverage
//!
//! | Test | Behavior |
//! |------|----------|
//! | `login_persists_session_and_logs_in` | login persists both entries |
//! | `login_with_wrong_password_persists_nothing` | failed login |
//! | `login_with_malformed_body_persists_nothing` | login schema failure |
//! | `login_against_unreachable_server_persists_nothing` | login transport failure |
//! | `logout_clears_session_and_is_idempotent` | logout |
//! | `absent_token_makes_no_request` | no token, no network call |
//! | `networks_are_renamed_and_sent_with_bearer_token` | success scenario |
//! | `networks_keep_response_order` | ordering |
//! | `unauthorized_clears_session_and_reloads` | 401 |
//! | `server_errors_clear_session_and_reload` | 5xx |
//! | `other_statuses_clear_session_and_reload` | other non-2xx |
//! | `schema_failure_propagates_and_keeps_session` | invalid records |
//! | `non_json_body_propagates` | invalid body |
//! | `concurrent_revalidations_share_one_request` | cache de-duplication |
//! | `stale_token_result_is_discarded` | cache key switch |
//! | `background_revalidation_*` | interval revalidation |
//! | `dashboard_end_to_end` | facade |
//! | `dashboard_background_tasks_use_configured_interval` | refresh + revalidation loops |

use std::sync::Arc;
use std::time::Duration;

use sensordash::{AuthenticationState, FailureClass, Network, Session, SessionLookup};
use sensordash_api::{ApiEndpoints, NetworkRecord};
use sensordash_client::storage::{ACCESS_TOKEN_KEY, USER_IDENTIFIER_KEY};
use sensordash_client::{
    ClientConfig, ClientError, Dashboard, MemoryStorage, Networks, ResourceCache, SessionStorage,
    SessionStore, TracingNotifier,
};
use sensordash_conformance::{harness, http_client, Event, Harness, Reply};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lab_a() -> Vec<NetworkRecord> {
    vec![NetworkRecord::new("n1", "Lab A")]
}

/// Harness that is already logged in as `ada` with token `abc123`.
async fn logged_in() -> Harness {
    let h = harness().await;
    h.session.login("ada", "pw").await.expect("login");
    h
}

async fn fetch_networks(h: &Harness) -> Option<Vec<Network>> {
    let token = h.session.access_token();
    h.fetcher
        .fetch::<Networks>(token.as_deref(), h.recorder.as_ref())
        .await
        .expect("no schema failure")
}

async fn assert_session_cleared(h: &Harness) {
    assert!(h.storage.get(USER_IDENTIFIER_KEY).await.unwrap().is_none());
    assert!(h.storage.get(ACCESS_TOKEN_KEY).await.unwrap().is_none());
    assert_eq!(h.session.authentication_state(), AuthenticationState::LoggedOut);
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_persists_session_and_logs_in() {
    let h = harness().await;
    assert_eq!(h.session.authentication_state(), AuthenticationState::Loading);

    let session = h.session.login("ada", "pw").await.unwrap();

    assert_eq!(session, Session::new("u-ada", "abc123"));
    assert_eq!(
        h.storage.get(USER_IDENTIFIER_KEY).await.unwrap().as_deref(),
        Some("u-ada")
    );
    assert_eq!(
        h.storage.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
        Some("abc123")
    );
    assert_eq!(h.session.authentication_state(), AuthenticationState::LoggedIn);
    assert_eq!(h.session.current(), SessionLookup::Found(session));
}

#[tokio::test]
async fn login_with_wrong_password_persists_nothing() {
    let h = harness().await;

    let err = h.session.login("ada", "nope").await.unwrap_err();

    assert!(matches!(err, ClientError::BadStatus(401)), "got {err:?}");
    assert!(h.storage.load_session().await.unwrap().is_none());
    assert_ne!(h.session.authentication_state(), AuthenticationState::LoggedIn);
}

#[tokio::test]
async fn login_with_malformed_body_persists_nothing() {
    let h = harness().await;
    h.api
        .override_authentication(Reply::Json(json!({ "user_identifier": "u-ada" })));

    let err = h.session.login("ada", "pw").await.unwrap_err();

    assert!(matches!(err, ClientError::Schema(_)), "got {err:?}");
    assert!(h.storage.get(USER_IDENTIFIER_KEY).await.unwrap().is_none());
    assert!(h.storage.get(ACCESS_TOKEN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn login_against_unreachable_server_persists_nothing() {
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(
        Arc::clone(&storage) as Arc<dyn SessionStorage>,
        http_client(),
        ApiEndpoints::new("http://127.0.0.1:9"),
    );

    let err = session.login("ada", "pw").await.unwrap_err();

    assert!(matches!(err, ClientError::Http(_)), "got {err:?}");
    assert!(storage.get(USER_IDENTIFIER_KEY).await.unwrap().is_none());
    assert!(storage.get(ACCESS_TOKEN_KEY).await.unwrap().is_none());
    assert_ne!(session.authentication_state(), AuthenticationState::LoggedIn);
}

#[tokio::test]
async fn logout_clears_session_and_is_idempotent() {
    let h = logged_in().await;

    h.session.logout().await.unwrap();
    assert_session_cleared(&h).await;

    h.session.logout().await.unwrap();
    assert_session_cleared(&h).await;
}

// ---------------------------------------------------------------------------
// Fetcher: success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn absent_token_makes_no_request() {
    let h = harness().await;

    let out = h
        .fetcher
        .fetch::<Networks>(None, h.recorder.as_ref())
        .await
        .unwrap();

    assert!(out.is_none());
    assert_eq!(h.api.network_requests(), 0);
    assert!(h.recorder.events().is_empty());
}

#[tokio::test]
async fn networks_are_renamed_and_sent_with_bearer_token() {
    let h = logged_in().await;
    h.api.set_networks("abc123", lab_a());

    let out = fetch_networks(&h).await;

    assert_eq!(out, Some(vec![Network::new("n1", "Lab A")]));
    assert_eq!(h.api.authorization_headers(), vec!["Bearer abc123".to_string()]);
    assert!(h.recorder.events().is_empty());
    assert_eq!(h.session.authentication_state(), AuthenticationState::LoggedIn);
}

#[tokio::test]
async fn networks_keep_response_order() {
    let h = logged_in().await;
    h.api.set_networks(
        "abc123",
        vec![
            NetworkRecord::new("n3", "Roof"),
            NetworkRecord::new("n1", "Lab A"),
            NetworkRecord::new("n2", "Basement"),
        ],
    );

    let out = fetch_networks(&h).await.unwrap();

    let ids: Vec<&str> = out.iter().map(|n| n.identifier.as_str()).collect();
    assert_eq!(ids, vec!["n3", "n1", "n2"]);
}

// ---------------------------------------------------------------------------
// Fetcher: failures
// ---------------------------------------------------------------------------

async fn assert_recovered(status: u16, class: FailureClass) {
    let h = logged_in().await;
    h.api.override_networks(Reply::Status(status));

    let out = fetch_networks(&h).await;

    assert!(out.is_none(), "status {status}");
    assert_eq!(
        h.recorder.events(),
        vec![Event::Notice(class), Event::Logout, Event::Reload],
        "status {status}"
    );
    assert_session_cleared(&h).await;
}

#[tokio::test]
async fn unauthorized_clears_session_and_reloads() {
    assert_recovered(401, FailureClass::SessionExpired).await;
}

#[tokio::test]
async fn unknown_token_is_treated_as_expired() {
    let h = logged_in().await;
    // No networks registered for abc123: the stub answers 401.

    assert!(fetch_networks(&h).await.is_none());
    assert_eq!(
        h.recorder.events().first(),
        Some(&Event::Notice(FailureClass::SessionExpired))
    );
    assert_session_cleared(&h).await;
}

#[tokio::test]
async fn server_errors_clear_session_and_reload() {
    for status in [500, 502, 503, 599] {
        assert_recovered(status, FailureClass::ServerError).await;
    }
}

#[tokio::test]
async fn other_statuses_clear_session_and_reload() {
    for status in [400, 403, 404, 418, 429] {
        assert_recovered(status, FailureClass::ClientError).await;
    }
}

#[tokio::test]
async fn schema_failure_propagates_and_keeps_session() {
    let h = logged_in().await;
    h.api.override_networks(Reply::Json(json!([
        { "network_identifier": "n1", "network_name": "Lab A" },
        { "network_identifier": "n2" }
    ])));

    let token = h.session.access_token();
    let err = h
        .fetcher
        .fetch::<Networks>(token.as_deref(), h.recorder.as_ref())
        .await
        .unwrap_err();

    assert_eq!(err.endpoint, "/networks");
    assert!(h.recorder.events().is_empty());
    assert_eq!(h.session.authentication_state(), AuthenticationState::LoggedIn);
    assert!(h.storage.load_session().await.unwrap().is_some());
}

#[tokio::test]
async fn non_json_body_propagates() {
    let h = logged_in().await;
    h.api.override_networks(Reply::Raw("<html>maintenance</html>".into()));

    let token = h.session.access_token();
    let result = h
        .fetcher
        .fetch::<Networks>(token.as_deref(), h.recorder.as_ref())
        .await;

    assert!(result.is_err());
    assert!(h.recorder.events().is_empty());
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_revalidations_share_one_request() {
    let h = logged_in().await;
    h.api.set_networks("abc123", lab_a());
    let cache: ResourceCache<Networks> = ResourceCache::new(Arc::clone(&h.fetcher));

    let (a, b) = tokio::join!(
        cache.revalidate(Some("abc123"), h.recorder.as_ref()),
        cache.revalidate(Some("abc123"), h.recorder.as_ref()),
    );

    let expected = Some(vec![Network::new("n1", "Lab A")]);
    assert_eq!(a.unwrap(), expected);
    assert_eq!(b.unwrap(), expected);
    assert_eq!(h.api.network_requests(), 1);
    assert_eq!(cache.data(), expected);
}

#[tokio::test]
async fn stale_token_result_is_discarded() {
    let h = logged_in().await;
    h.api.set_networks("abc123", lab_a());
    h.api
        .set_networks("def456", vec![NetworkRecord::new("n2", "Lab B")]);
    let cache: ResourceCache<Networks> = ResourceCache::new(Arc::clone(&h.fetcher));

    let (old, new) = tokio::join!(
        cache.revalidate(Some("abc123"), h.recorder.as_ref()),
        cache.revalidate(Some("def456"), h.recorder.as_ref()),
    );

    assert_eq!(old.unwrap(), Some(vec![Network::new("n1", "Lab A")]));
    assert_eq!(new.unwrap(), Some(vec![Network::new("n2", "Lab B")]));
    assert_eq!(cache.data(), Some(vec![Network::new("n2", "Lab B")]));
    assert_eq!(h.api.network_requests(), 2);
}

#[tokio::test]
async fn background_revalidation_fills_the_cache() {
    let h = logged_in().await;
    h.api.set_networks("abc123", lab_a());
    let cache = Arc::new(ResourceCache::<Networks>::new(Arc::clone(&h.fetcher)));

    let handle = cache.spawn_revalidation(Arc::clone(&h.session), Duration::from_millis(10));
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while cache.data().is_none() {
        assert!(tokio::time::Instant::now() < deadline, "cache never filled");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    handle.abort();

    assert_eq!(cache.data(), Some(vec![Network::new("n1", "Lab A")]));
}

#[tokio::test]
async fn background_revalidation_stops_on_schema_failure() {
    let h = logged_in().await;
    h.api.override_networks(Reply::Json(json!({ "not": "an array" })));
    let cache = Arc::new(ResourceCache::<Networks>::new(Arc::clone(&h.fetcher)));

    let handle = cache.spawn_revalidation(Arc::clone(&h.session), Duration::from_millis(10));
    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop should stop")
        .expect("task should not panic");

    assert!(result.is_err());
    assert_eq!(h.session.authentication_state(), AuthenticationState::LoggedIn);
}

// ---------------------------------------------------------------------------
// Dashboard facade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_end_to_end() {
    let h = harness().await;
    h.api.set_networks("abc123", lab_a());

    let storage = Arc::new(MemoryStorage::new());
    let dashboard = Dashboard::new(
        &ClientConfig::new(h.base_url.clone()),
        Arc::clone(&storage) as Arc<dyn SessionStorage>,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    assert_eq!(dashboard.session.refresh().await, AuthenticationState::LoggedOut);
    assert!(dashboard.networks().await.unwrap().is_none());
    assert_eq!(h.api.network_requests(), 0);

    dashboard.session.login("ada", "pw").await.unwrap();
    let networks = dashboard.networks().await.unwrap();
    assert_eq!(networks, Some(vec![Network::new("n1", "Lab A")]));
    assert_eq!(dashboard.networks.data(), networks);

    h.api.override_networks(Reply::Status(401));
    assert!(dashboard.networks().await.unwrap().is_none());
    assert!(storage.load_session().await.unwrap().is_none());
    assert_eq!(dashboard.session.authentication_state(), AuthenticationState::LoggedOut);
    assert!(dashboard.networks.data().is_none());
}

#[tokio::test]
async fn dashboard_background_tasks_use_configured_interval() {
    let h = harness().await;
    h.api.set_networks("abc123", lab_a());

    let storage = Arc::new(MemoryStorage::new());
    let config = ClientConfig {
        refresh_interval: Duration::from_millis(10),
        ..ClientConfig::new(h.base_url.clone())
    };
    let dashboard = Dashboard::new(
        &config,
        Arc::clone(&storage) as Arc<dyn SessionStorage>,
        Arc::new(TracingNotifier),
    )
    .unwrap();
    let tasks = dashboard.spawn_background();

    // A login written straight to storage is only seen through the refresh loop.
    storage
        .set_session(&Session::new("u-ada", "abc123"))
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while dashboard.networks.data().is_none() {
        assert!(tokio::time::Instant::now() < deadline, "background loops never ran");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tasks.abort();

    assert_eq!(dashboard.session.authentication_state(), AuthenticationState::LoggedIn);
    assert_eq!(dashboard.networks.data(), Some(vec![Network::new("n1", "Lab A")]));
}
