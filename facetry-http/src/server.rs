use axum::{
    routing::{delete, get, post, put},
    Router,
};
use facetry::{EngineSettings, FacetryError, QueryEngine, RecordStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{
    clear_filter, clear_filters, create_session, delete_session, get_all_facet_counts,
    get_facet_counts, get_results, get_session, health, list_facets, search_facet_values,
    set_filter, set_query, set_sort, AppState,
};
use crate::session::{SessionRegistry, DEFAULT_IDLE_TTL};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `settings.json` and `records.json`.
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub max_sessions: usize,
    /// Idle time after which a session is dropped.
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:7700".to_string(),
            max_sessions: 10_000,
            session_ttl: DEFAULT_IDLE_TTL,
        }
    }
}

/// Build the session template from `settings.json` and `records.json` in
/// `data_dir`. A missing `records.json` means an empty catalog.
pub fn load_engine(data_dir: &Path) -> Result<QueryEngine, FacetryError> {
    let settings = EngineSettings::load(data_dir.join("settings.json"))?;
    let mut engine = QueryEngine::from_settings(&settings)?;

    let records_path = data_dir.join("records.json");
    if records_path.exists() {
        engine.use_store(RecordStore::load_json_file(&records_path)?);
    } else {
        tracing::warn!(path = %records_path.display(), "records file not found, serving an empty catalog");
    }
    Ok(engine)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let sessions = Router::new()
        .route("/1/facets", get(list_facets))
        .route("/1/sessions", post(create_session))
        .route(
            "/1/sessions/:sessionId",
            get(get_session).delete(delete_session),
        )
        .route("/1/sessions/:sessionId/filters", delete(clear_filters))
        .route(
            "/1/sessions/:sessionId/filters/:facetId",
            put(set_filter).delete(clear_filter),
        )
        .route("/1/sessions/:sessionId/query", put(set_query))
        .route("/1/sessions/:sessionId/sort", put(set_sort))
        .route("/1/sessions/:sessionId/results", get(get_results))
        .route("/1/sessions/:sessionId/facets", get(get_all_facet_counts))
        .route(
            "/1/sessions/:sessionId/facets/:facetId",
            get(get_facet_counts),
        )
        .route(
            "/1/sessions/:sessionId/facets/:facetId/query",
            post(search_facet_values),
        );

    Router::new()
        .route("/health", get(health))
        .merge(sessions)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive().max_age(Duration::from_secs(86400)))
}

pub async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let startup_start = std::time::Instant::now();

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let engine = load_engine(&config.data_dir)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        records = engine.records().len(),
        facets = engine.facets().count(),
        max_sessions = config.max_sessions,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Catalog loaded"
    );

    let state = Arc::new(AppState {
        sessions: SessionRegistry::new(engine, config.max_sessions)
            .with_idle_ttl(config.session_ttl),
        start_time: std::time::Instant::now(),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    print_startup_banner(
        &local_addr.to_string(),
        startup_start.elapsed().as_millis(),
        &config.data_dir,
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn print_startup_banner(bind_addr: &str, startup_ms: u128, data_dir: &Path) {
    use colored::Colorize;

    let url = format!("http://{}", bind_addr);
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let timing = format!("ready in {}ms", startup_ms);

    println!();
    println!(
        "  {} {}  {}",
        "Facetry".bold().bright_green(),
        version.as_str().dimmed(),
        timing.as_str().dimmed(),
    );
    println!();
    println!("  {}  Local:    {}", "➜".green(), url.as_str().cyan());
    println!(
        "  {}  Catalog:  {}",
        "➜".green(),
        data_dir.display().to_string().as_str().cyan()
    );
    println!();
}
