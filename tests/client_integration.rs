use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pagerduty_http::{
    ClientConfig, ConnectionManager, PagerDutyClient, PagerDutyError, Scheme, MAX_CONNECTIONS,
};
use reqwest::Url;
use serde_json::json;

const TENANT_HOST: &str = "acme.pagerduty.com";

#[derive(Clone, Debug, Default)]
struct SeenRequest {
    host: Option<String>,
    authorization: Option<String>,
    user_agent: Option<String>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    delay: Duration,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    hits: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

async fn incidents_handler(State(state): State<MockState>, headers: HeaderMap) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    state
        .seen
        .lock()
        .expect("seen mutex must not be poisoned")
        .push(SeenRequest {
            host: header("host"),
            authorization: header("authorization"),
            user_agent: header("user-agent"),
        });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    if state.status.is_success() {
        (state.status, Json(json!({ "incidents": [] })))
    } else {
        (state.status, Json(json!({ "error": { "message": "Unauthorized" } })))
    }
}

struct TestServer {
    address: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    hits: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    /// Base URL keeping the tenant host name; DNS is pinned to the stub.
    fn tenant_url(&self) -> Url {
        Url::parse(&format!("http://{TENANT_HOST}:{}/", self.address.port()))
            .expect("tenant url must parse")
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen mutex must not be poisoned").clone()
    }

    fn client(&self, config: ClientConfig) -> PagerDutyClient {
        let connections = ConnectionManager::builder()
            .register(Scheme::http())
            .resolve(TENANT_HOST, self.address)
            .build()
            .expect("connection manager must build");
        PagerDutyClient::from_parts(config, connections)
            .expect("client must build")
            .with_base_url(self.tenant_url())
    }
}

async fn spawn_server(status: StatusCode, delay: Duration) -> TestServer {
    let state = MockState {
        status,
        delay,
        seen: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
        in_flight: Arc::new(AtomicUsize::new(0)),
        max_in_flight: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/api/v1/incidents", get(incidents_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        address,
        seen: state.seen,
        hits: state.hits,
        max_in_flight: state.max_in_flight,
        task,
    }
}

#[tokio::test]
async fn plain_http_to_tenant_host_carries_no_credentials() {
    let server = spawn_server(StatusCode::OK, Duration::ZERO).await;
    let client = server.client(ClientConfig::for_basic_auth("acme", "alice", "secret"));

    let request = client.get("/api/v1/incidents").expect("request must build");
    let response = client.send(request).await.expect("request must succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let seen = server.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].authorization.is_none());
    assert_eq!(
        seen[0].host.as_deref(),
        Some(format!("{TENANT_HOST}:{}", server.address.port()).as_str())
    );
}

#[tokio::test]
async fn user_agent_is_sent_on_the_wire() {
    let server = spawn_server(StatusCode::OK, Duration::ZERO).await;
    let client = server.client(ClientConfig::for_token_auth("acme", "abc123"));

    let request = client.get("/api/v1/incidents").expect("request must build");
    let body: serde_json::Value = client
        .send(request)
        .await
        .expect("request must succeed")
        .json()
        .await
        .expect("body must be json");
    assert_eq!(body, json!({ "incidents": [] }));

    let seen = server.seen();
    assert_eq!(
        seen[0].user_agent.as_deref(),
        Some(format!("PagerDuty Client/{}", env!("CARGO_PKG_VERSION")).as_str())
    );
}

#[tokio::test]
async fn no_more_than_four_requests_are_in_flight() {
    let server = spawn_server(StatusCode::OK, Duration::from_millis(200)).await;
    let client = server.client(ClientConfig::for_token_auth("acme", "abc123"));

    let mut handles = Vec::new();
    for _ in 0..12 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let request = client.get("/api/v1/incidents").expect("request must build");
            let response = client.send(request).await?;
            response.text().await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("task must not panic")
            .expect("request must succeed");
    }

    assert_eq!(server.hits.load(Ordering::SeqCst), 12);
    let peak = server.max_in_flight.load(Ordering::SeqCst);
    assert!(
        peak <= MAX_CONNECTIONS,
        "{peak} requests in flight, limit is {MAX_CONNECTIONS}"
    );
    assert_eq!(client.connections().available_connections(), MAX_CONNECTIONS);
}

#[tokio::test]
async fn unauthorized_is_returned_without_retry() {
    let server = spawn_server(StatusCode::UNAUTHORIZED, Duration::ZERO).await;
    let client = server.client(ClientConfig::for_basic_auth("acme", "alice", "wrong"));

    let request = client.get("/api/v1/incidents").expect("request must build");
    let err = client
        .send(request)
        .await
        .expect_err("401 must surface as an error");

    match err {
        PagerDutyError::Http { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    assert_eq!(client.connections().available_connections(), MAX_CONNECTIONS);
}

#[tokio::test]
async fn requests_to_other_hosts_carry_no_credentials() {
    let server = spawn_server(StatusCode::OK, Duration::ZERO).await;
    let client = server
        .client(ClientConfig::for_token_auth("acme", "abc123"))
        .with_base_url(
            Url::parse(&format!("http://{}/", server.address)).expect("stub url must parse"),
        );

    let request = client.get("/api/v1/incidents").expect("request must build");
    client.send(request).await.expect("request must succeed");

    let seen = server.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].authorization.is_none());
    assert!(seen[0].user_agent.is_some());
}

#[tokio::test]
async fn https_only_manager_refuses_plain_http() {
    let server = spawn_server(StatusCode::OK, Duration::ZERO).await;
    let client = PagerDutyClient::new(ClientConfig::for_token_auth("acme", "abc123"))
        .expect("client must build")
        .with_base_url(server.tenant_url());

    let err = client
        .get("/api/v1/incidents")
        .expect_err("http must not be accepted");
    assert!(matches!(err, PagerDutyError::UnsupportedScheme(_)));
    assert_eq!(server.hits.load(Ordering::SeqCst), 0);
}
