use std::{path::PathBuf, sync::Arc};

#[cfg(feature = "utoipa")]
use axum::Json;
use axum::{Router, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
#[cfg(feature = "utoipa")]
use utoipa_scalar::{Scalar, Servable};

mod config;
mod db;
mod middleware;
mod models;
pub mod observability;
#[cfg(feature = "utoipa")]
pub mod openapi;
mod routes;
pub mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub db: Option<Arc<db::DbPool>>,
    /// Present whenever a database is configured.
    pub services: Option<services::Services>,
}

impl AppState {
    pub async fn new(config: config::AppConfig) -> Result<Self, db::DbError> {
        let (db, services) = if config.database.is_none() {
            tracing::warn!("No database configured; only health endpoints are functional");
            (None, None)
        } else {
            let pool = db::DbPool::from_config(&config.database).await?;
            if config.database.run_migrations() {
                pool.run_migrations().await?;
            }
            tracing::info!(backend = pool.backend(), "Database connected");

            let db = Arc::new(pool);
            let services = services::Services::new(db.clone(), &config.cleanup);
            (Some(db), Some(services))
        };

        if config.cleanup.secret().is_none() {
            tracing::warn!(
                "cleanup.secret is not set; POST /api/cleanup will reject every request"
            );
        }

        Ok(Self {
            config: Arc::new(config),
            db,
            services,
        })
    }
}

/// CLI arguments for Routinely
#[derive(Parser, Debug)]
#[command(version, about = "Routinely habit tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./routinely.toml if it exists,
    /// otherwise a built-in SQLite configuration)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Export the OpenAPI specification (JSON format)
    Openapi {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run database migrations and exit
    Migrate,
    /// Show enabled compile-time features
    Features,
}

/// Configuration used when no config file is found.
fn default_config_toml() -> &'static str {
    r#"# Routinely configuration
[server]
host = "127.0.0.1"
port = 3000

[database]
type = "sqlite"
path = "routinely.db"

[observability.logging]
level = "info"
format = "pretty"
"#
}

/// Where the configuration comes from.
#[derive(Debug, PartialEq)]
enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

fn resolve_config_source(explicit_path: Option<&str>) -> Result<ConfigSource, String> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok(ConfigSource::File(path));
    }

    let cwd_config = PathBuf::from("routinely.toml");
    if cwd_config.exists() {
        return Ok(ConfigSource::File(cwd_config));
    }

    Ok(ConfigSource::BuiltIn)
}

/// Load configuration or exit with a message on stderr.
fn load_config(explicit_path: Option<&str>) -> (config::AppConfig, ConfigSource) {
    let source = match resolve_config_source(explicit_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let loaded = match &source {
        ConfigSource::File(path) => config::AppConfig::from_file(path),
        ConfigSource::BuiltIn => config::AppConfig::from_str(default_config_toml()),
    };

    match loaded {
        Ok(config) => (config, source),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_observability(config: &config::AppConfig) {
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = observability::metrics::init_metrics(&config.observability.metrics) {
        tracing::warn!(error = %e, "Failed to initialize metrics");
    }
}

pub fn build_app(config: &config::AppConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness));

    #[cfg(feature = "utoipa")]
    {
        app = app
            .route("/openapi.json", get(openapi_json))
            .merge(Scalar::with_url("/api/docs", openapi::ApiDoc::build()));
    }

    if config.observability.metrics.enabled {
        app = app.route(
            &config.observability.metrics.path,
            get(routes::health::metrics),
        );
    }

    app = app.nest("/api", routes::get_api_routes(state.clone()));

    app.layer(axum::middleware::from_fn(
        middleware::http_metrics_middleware,
    ))
    .layer(axum::middleware::from_fn(middleware::request_id_middleware))
    .layer(TraceLayer::new_for_http())
    .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
    .with_state(state)
}

/// Returns the OpenAPI spec as JSON
#[cfg(feature = "utoipa")]
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::build())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Openapi { output }) => run_openapi_export(output),
        Some(Command::Migrate) => run_migrate(args.config.as_deref()).await,
        Some(Command::Features) => run_features(),
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

fn run_openapi_export(output: Option<String>) {
    #[cfg(feature = "utoipa")]
    {
        let spec = match openapi::ApiDoc::build().to_pretty_json() {
            Ok(spec) => spec,
            Err(e) => {
                eprintln!("Error: failed to serialize OpenAPI spec: {}", e);
                std::process::exit(1);
            }
        };
        match output {
            Some(path) => {
                if let Err(e) = std::fs::write(&path, spec) {
                    eprintln!("Error: failed to write {}: {}", path, e);
                    std::process::exit(1);
                }
                eprintln!("OpenAPI spec written to {}", path);
            }
            None => println!("{}", spec),
        }
    }
    #[cfg(not(feature = "utoipa"))]
    {
        let _ = output;
        eprintln!("Error: OpenAPI export requires the 'utoipa' feature to be enabled");
        std::process::exit(1);
    }
}

fn run_features() {
    let features: &[(&str, bool)] = &[
        ("database-sqlite", cfg!(feature = "database-sqlite")),
        ("database-postgres", cfg!(feature = "database-postgres")),
        ("prometheus", cfg!(feature = "prometheus")),
        ("utoipa", cfg!(feature = "utoipa")),
    ];

    println!("Routinely v{}", env!("CARGO_PKG_VERSION"));
    println!();
    for (name, enabled) in features {
        let mark = if *enabled { "+" } else { "-" };
        println!("  [{}] {}", mark, name);
    }
}

async fn run_server(explicit_config_path: Option<&str>) {
    let (config, source) = load_config(explicit_config_path);
    init_observability(&config);

    match &source {
        ConfigSource::File(path) => {
            tracing::info!(config_file = %path.display(), "Starting Routinely")
        }
        ConfigSource::BuiltIn => {
            tracing::info!("Starting Routinely with built-in configuration")
        }
    }

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    let app = build_app(&config, state);

    let bind_addr = config.server.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %bind_addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config, _) = load_config(explicit_config_path);
    init_observability(&config);

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!(backend = pool.backend(), "Database migrations completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "database-sqlite")]
    #[test]
    fn test_default_config_parses() {
        let config = config::AppConfig::from_str(default_config_toml()).unwrap();
        assert!(!config.database.is_none());
        assert!(config.cleanup.secret().is_none());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(resolve_config_source(Some(missing.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_explicit_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routinely.toml");
        std::fs::write(&path, "[cleanup]\nsecret = \"x\"\n").unwrap();

        let source = resolve_config_source(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(source, ConfigSource::File(path));
    }
}
