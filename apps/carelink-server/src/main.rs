mod config;
mod logging;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderName, Request, StatusCode};
use care_coordination::CareModule;
use care_coordination::infra::storage::db;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// CareLink Server - care-coordination backend
#[derive(Parser)]
#[command(name = "carelink-server")]
#[command(about = "CareLink Server - care-coordination backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON, secrets masked) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // 1) defaults -> 2) YAML (if provided) -> 3) env (CARELINK__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    });

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_redacted_json()?);
        return Ok(());
    }

    logging::init(&config.logging);
    tracing::info!("CareLink Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config
        .reminders
        .run_at()
        .context("reminders.hour/minute out of range")?;
    config
        .bind_addr()
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid bind address '{}'", config.bind_addr()))?;
    println!("Configuration is valid");
    println!("{}", config.to_redacted_json()?);
    Ok(())
}

/// Request ids, tracing and the request timeout around the module router.
fn with_http_layers(router: Router, timeout: Duration) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            timeout,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

async fn run_server(config: AppConfig) -> Result<()> {
    if config.auth.jwt_secret == carelink_auth::AuthConfig::default().jwt_secret {
        tracing::warn!("auth.jwt_secret is the built-in default; set CARELINK__AUTH__JWT_SECRET");
    }

    let conn = db::connect(&config.database.dsn, config.database.max_connections).await?;
    CareModule::migrate(&conn).await?;
    let cancel = CancellationToken::new();
    let module = CareModule::init(&conn, config.module_config())?.with_shutdown(cancel.clone());

    let cancel_for_signals = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            tracing::warn!(error = %e, "shutdown: signal waiter failed, falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
        cancel_for_signals.cancel();
    });

    let scheduler = module
        .reminder_scheduler()?
        .map(|s| tokio::spawn(s.run(cancel.child_token())));

    let router = with_http_layers(
        module.router(),
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(cancel.clone().cancelled_owned())
    .await
    .context("HTTP server failed")?;

    cancel.cancel();
    if let Some(handle) = scheduler
        && let Err(e) = handle.await
    {
        tracing::error!(error = %e, "reminder scheduler task failed");
    }
    tracing::info!("CareLink Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("failed to listen for Ctrl+C")?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    tracing::info!("Shutdown signal received, initiating graceful shutdown");
    Ok(())
}
