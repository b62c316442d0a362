use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_core::scanning::NmapRunner;
use vigil_db::repositories::ScanRepo;

use vigil_api::config::{ScannerConfig, ServerConfig};
use vigil_api::orchestrator::ScanOrchestrator;
use vigil_api::router::build_app_router;
use vigil_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let scanner_config = ScannerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = vigil_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    vigil_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    vigil_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Scanner ---
    // A missing scanner is a deployment problem; fail before binding
    // rather than surfacing it as per-scan failures later.
    let runner = NmapRunner::detect(&scanner_config.nmap_path)
        .await
        .expect("Scanner binary unavailable; set NMAP_PATH");
    tracing::info!(binary = %runner.binary(), "Scanner detected");

    // --- Interrupted scan recovery ---
    // Scans left `running` by a previous process have no orchestration
    // task anymore; drive them to `failed` so they do not dangle.
    match ScanRepo::fail_interrupted(&pool).await {
        Ok(0) => {}
        Ok(n) => tracing::warn!(count = n, "Failed scans interrupted by restart"),
        Err(e) => tracing::error!(error = %e, "Interrupted-scan recovery failed"),
    }

    // --- Event bus ---
    let event_bus = Arc::new(vigil_events::EventBus::default());

    // --- Orchestrator ---
    let orchestrator = Arc::new(ScanOrchestrator::new(
        pool.clone(),
        Arc::new(runner),
        Arc::clone(&event_bus),
        scanner_config.scan_concurrency,
    ));
    tracing::info!(
        concurrency = scanner_config.scan_concurrency,
        "Scan orchestrator ready"
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        orchestrator,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
