//! Axum-based API gateway for the Ilm assistant. Config-driven via CoreConfig.

mod handlers;

use axum::extract::State;
use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use ilm_core::{Assistant, CoreConfig, InteractionStore, KnowledgeBase, LearningMonitor};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pre-flight check: config, knowledge file, learning store and port.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking knowledge base... ");
    match config.knowledge_path.as_deref() {
        Some(path) => {
            let kb = KnowledgeBase::load_json_path(path).map_err(|e| format!("Knowledge file {} invalid: {}", path, e))?;
            println!("OK ({} topics from {})", kb.topics().len(), path);
        }
        None => println!("OK (built-in seed)"),
    }

    let db_path = config.learning_db_path();
    print!("Checking learning store at {}... ", db_path.display());
    let store = InteractionStore::open_path(&db_path, config.max_interactions)
        .map_err(|e| format!("learning store LOCKED or inaccessible: {}", e))?;
    store.probe().map_err(|e| format!("learning store probe failed: {}", e))?;
    drop(store);
    println!("OK");

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\n✅ SUCCESS: All systems GO. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[ilm-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(target: "ilm::gateway", error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let assistant = Arc::new(Assistant::from_config(config.as_ref().clone()));

    // Storage health poll; reopens the store after repeated probe failures.
    LearningMonitor::spawn(
        Arc::clone(&assistant),
        Duration::from_secs(config.monitor_interval_secs.max(1)),
        config.monitor_failure_threshold,
    );

    let app = build_app(AppState {
        config: Arc::clone(&config),
        assistant,
    });

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(target: "ilm::gateway", %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "ilm::gateway", "{} listening on {}", config.app_name, addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(target: "ilm::gateway", error = %e, "Server stopped");
    }
}

fn build_app(state: AppState) -> Router {
    // CORS: allow Backend/API (8001-8099) and Frontend/UI (3001-3099) port ranges.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            let port = s
                .split(':')
                .last()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(0);
            (3001..=3099).contains(&port) || (8001..=8099).contains(&port)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/status", get(status))
        .route("/api/v1/chat", post(handlers::chat::chat))
        .route("/api/v1/feedback", post(handlers::learning::feedback))
        .route("/api/v1/topics", get(topics))
        .route("/api/v1/learning/patterns", get(handlers::learning::patterns))
        .route("/api/v1/learning/interactions", get(handlers::learning::interactions))
        .with_state(state)
        .layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) assistant: Arc<Assistant>,
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/v1/status – app identity, learning stats and topic count.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let assistant = Arc::clone(&state.assistant);
    let stats = tokio::task::spawn_blocking(move || assistant.learning_stats())
        .await
        .unwrap_or_else(|e| {
            tracing::error!(target: "ilm::gateway", error = %e, "Stats worker failed");
            ilm_core::LearningStats::degraded(false)
        });
    let strategies: Vec<&str> = state.assistant.strategy_steps().iter().map(|s| s.as_str()).collect();

    axum::Json(serde_json::json!({
        "status": if stats.learning_active { "ok" } else { "degraded" },
        "app_name": state.config.app_name,
        "port": state.config.port,
        "topics": state.assistant.topic_count(),
        "strategies": strategies,
        "learning": stats,
    }))
}

/// GET /api/v1/topics – knowledge base keys and canonical questions.
async fn topics(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let topics = state.assistant.topics();
    axum::Json(serde_json::json!({ "count": topics.len(), "topics": topics }))
}
