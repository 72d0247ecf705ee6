//! HTTP/WebSocket transport for the chat engine

pub mod state;
pub mod ws;

use axum::{extract::State, routing::get, Json, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::Result;
use state::{AppState, CorpusSummary};

/// Chat HTTP/WebSocket server
pub struct ChatServer {
    config: RagConfig,
    state: AppState,
}

impl ChatServer {
    /// Create a new chat server. Runs the full startup pipeline; fails fatally
    /// on an empty corpus or an embedding dimension mismatch.
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/", get(info))
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .route("/api/corpus", get(corpus_summary))
            .route("/ws/chat", get(ws::ws_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting chat server on http://{}", addr);
        tracing::info!("WebSocket endpoint: ws://{}/ws/chat", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Service info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "convo-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Conversational RAG assistant over a private document corpus",
        "endpoints": {
            "GET /ws/chat": "WebSocket chat (one text message per turn, streamed reply)",
            "GET /api/corpus": "Corpus summary",
            "GET /health": "Liveness check",
            "GET /ready": "Readiness check"
        },
        "models": {
            "embedding": state.config().llm.embed_model,
            "generation": state.config().llm.generate_model,
        }
    }))
}

/// Corpus summary endpoint
async fn corpus_summary(State(state): State<AppState>) -> Json<CorpusSummary> {
    Json(state.corpus().clone())
}
