//! LexLens Server
//!
//! Plain-language review of legal documents. The server renders both pages
//! and sits between the browser and the analysis backend:
//!
//! - Entry page with file upload, pasted text and URL forms
//! - Submission to the backend's `/analyzeDocument`
//! - Dashboard with summary, risk flags, key clauses and a chat panel
//! - Chat answered by the backend's `/askQuestion` or offline keyword rules
//!
//! ## Architecture
//!
//! Each submission creates a session in an in-memory store; the dashboard is
//! reached with the session id in its URL. With `--mock-backend` the server
//! also serves the analysis endpoints itself with canned lease data.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use lexlens_core::PolicyMode;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod mock_backend;
mod pages;
mod state;

use api::{handle_chat, handle_export_bridge, handle_health, handle_import_bridge};
use config::{ChatMode, Config, MockConfig};
use pages::{
    handle_chat_form, handle_dashboard, handle_index, handle_paste, handle_stylesheet,
    handle_upload, handle_url,
};
use state::AppState;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Command-line arguments for the LexLens server
#[derive(Parser, Debug)]
#[command(name = "lexlens-server")]
#[command(about = "LexLens server for plain-language legal document review")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "LEXLENS_PORT")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "LEXLENS_HOST")]
    host: String,

    /// Path to a TOML config file
    #[arg(short, long, env = "LEXLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Analysis backend base URL
    #[arg(long, env = "LEXLENS_BACKEND_URL")]
    backend_url: Option<String>,

    /// Where chat answers come from
    #[arg(long, value_enum, env = "LEXLENS_CHAT_MODE")]
    chat_mode: Option<ChatMode>,

    /// Skip the upload type and size checks
    #[arg(long, env = "LEXLENS_LENIENT_UPLOADS")]
    lenient_uploads: bool,

    /// Serve the analysis endpoints from this server with canned data
    #[arg(long, env = "LEXLENS_MOCK_BACKEND")]
    mock_backend: bool,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10", env = "LEXLENS_RATE_LIMIT")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command-line values win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.backend_url {
            config.backend.base_url = Some(url.clone());
        }
        if let Some(mode) = self.chat_mode {
            config.chat.mode = mode;
        }
        if self.lenient_uploads {
            config.upload.mode = PolicyMode::Lenient;
        }
        if self.mock_backend && config.backend.base_url.is_none() {
            config.backend.base_url = Some(format!("http://127.0.0.1:{}", self.port));
        }
    }
}

/// All page and API routes, without rate limiting or CORS
pub fn router(state: AppState, mock: Option<&MockConfig>) -> Router {
    // Multipart framing adds overhead on top of the file itself. Lenient
    // uploads have no size check, so their bodies are not capped either.
    let body_limit = match state.pipeline.policy().size_limit() {
        Some(max) => {
            DefaultBodyLimit::max(usize::try_from(max.saturating_mul(2)).unwrap_or(usize::MAX))
        }
        None => DefaultBodyLimit::disable(),
    };

    let app = Router::new()
        // Pages
        .route("/", get(handle_index))
        .route("/index.html", get(handle_index))
        .route("/dashboard.html", get(handle_dashboard))
        .route("/static/styles.css", get(handle_stylesheet))
        // Submissions
        .route("/upload", post(handle_upload))
        .route("/paste", post(handle_paste))
        .route("/url", post(handle_url))
        .route("/chat", post(handle_chat_form))
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/chat", post(handle_chat))
        .route("/api/bridge", post(handle_import_bridge))
        .route("/api/session/:id/bridge", get(handle_export_bridge))
        .with_state(state);

    let app = match mock {
        Some(config) => app.merge(mock_backend::router(config)),
        None => app,
    };

    app.layer(body_limit)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LexLens server on {}:{}", args.host, args.port);

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    // Create shared state
    let state = AppState::from_config(&config).context("Failed to create analysis client")?;

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            sessions.purge_expired();
        }
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mock = args.mock_backend.then_some(&config.mock);
    let app = router(state, mock)
        // Apply middleware
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    if args.mock_backend {
        info!("Mock analysis backend enabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
