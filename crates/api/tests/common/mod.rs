//! Shared test harness: stub scan runner, app builder, seed helpers.
//!
//! Mirrors the router construction in `main.rs` so integration tests
//! exercise the same middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery) that production uses, with the real nmap
//! binary swapped for a deterministic stub.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;

use vigil_api::auth::jwt::{create_token, JwtConfig};
use vigil_api::config::ServerConfig;
use vigil_api::orchestrator::ScanOrchestrator;
use vigil_api::router::build_app_router;
use vigil_api::state::AppState;
use vigil_core::report::{HostReport, OsMatchReport, PortReport, ServiceReport};
use vigil_core::scanning::{ScanError, ScanRunner};
use vigil_core::types::DbId;
use vigil_db::models::endpoint::CreateEndpoint;
use vigil_db::models::status::ScanStatus;
use vigil_db::models::user::CreateUser;
use vigil_db::repositories::{EndpointRepo, ScanRepo, UserRepo};
use vigil_events::EventBus;

/// Build a test `ServerConfig` with a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            expiry_secs: 3600,
        },
    }
}

/// Deterministic scan runner used in place of nmap.
///
/// Returns a fixed two-open-port report, fails for addresses listed in
/// `fail_addresses`, and can be slowed down to hold a scan in `running`
/// long enough for lifecycle tests to act on it.
#[derive(Default)]
pub struct StubRunner {
    pub fail_addresses: Vec<String>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl ScanRunner for StubRunner {
    async fn run(
        &self,
        address: &str,
        _args: &[String],
        _timeout: Duration,
    ) -> Result<HostReport, ScanError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_addresses.iter().any(|a| a == address) {
            return Err(ScanError::Failed {
                exit_code: 1,
                stderr: "stub failure".to_string(),
            });
        }
        Ok(sample_report(address))
    }
}

/// A fixed report: ports 22 and 80 open with full service info, one OS
/// match.
pub fn sample_report(address: &str) -> HostReport {
    HostReport {
        address: address.to_string(),
        state: "up".to_string(),
        ports: vec![
            PortReport {
                protocol: "tcp".to_string(),
                port: 22,
                state: "open".to_string(),
                service: Some(ServiceReport {
                    name: "ssh".to_string(),
                    product: Some("OpenSSH".to_string()),
                    version: Some("9.6p1".to_string()),
                }),
                scripts: Vec::new(),
            },
            PortReport {
                protocol: "tcp".to_string(),
                port: 80,
                state: "open".to_string(),
                service: Some(ServiceReport {
                    name: "http".to_string(),
                    product: Some("nginx".to_string()),
                    version: Some("1.24.0".to_string()),
                }),
                scripts: Vec::new(),
            },
        ],
        os_matches: vec![OsMatchReport {
            name: "Linux 5.X".to_string(),
            accuracy: 96,
            os_type: Some("general purpose".to_string()),
        }],
        host_scripts: Vec::new(),
    }
}

/// Build the full application router around a stub runner.
pub fn build_test_app(pool: PgPool, runner: StubRunner) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let orchestrator = Arc::new(ScanOrchestrator::new(
        pool.clone(),
        Arc::new(runner),
        Arc::clone(&event_bus),
        2,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        orchestrator,
    };

    (build_app_router(state, &config), event_bus)
}

/// Insert a user and mint a matching bearer token.
pub async fn seed_user_with_token(pool: &PgPool, email: &str) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: None,
            role: None,
        },
    )
    .await
    .expect("create user");

    let token = create_token(user.id, &user.role, &test_config().jwt).expect("create token");
    (user.id, token)
}

/// Insert an endpoint owned by `user_id`.
pub async fn seed_endpoint(pool: &PgPool, user_id: DbId, name: &str, address: &str) -> DbId {
    EndpointRepo::create(
        pool,
        user_id,
        &CreateEndpoint {
            name: name.to_string(),
            address: address.to_string(),
            description: None,
        },
    )
    .await
    .expect("create endpoint")
    .id
}

/// Poll until the scan reaches `status`, panicking after ~5 seconds.
pub async fn wait_for_status(pool: &PgPool, scan_id: DbId, status: ScanStatus) {
    for _ in 0..200 {
        let scan = ScanRepo::find_by_id(pool, scan_id)
            .await
            .expect("find scan")
            .expect("scan exists");
        if scan.status_id == status.id() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("scan {scan_id} never reached status {}", status.as_str());
}

/// Build an authenticated JSON request.
pub fn request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
