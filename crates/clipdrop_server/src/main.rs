//! ClipDrop API server entrypoint.

use chrono::Utc;
use clipdrop_server::config::env_flag_enabled;
use clipdrop_server::{
    config::Config, db::Database, resolve_bind_address, serve_router, AppState, SweeperHandle,
    DEFAULT_PORT,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sweep: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--sweep" => flags.sweep = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipdrop=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;

    if cli_flags.sweep {
        let removed = database.items.sweep(Utc::now())?;
        println!("Removed {} expired item(s)", removed);
        return Ok(());
    }

    let state = AppState::new(config.clone(), database);

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }
    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET is not set - /api/cleanup accepts unauthenticated requests");
    }

    let bind_addr = resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("ClipDrop running at http://{}", actual_addr);

    let sweeper = match config.sweep_interval() {
        Some(interval) => Some(SweeperHandle::start(state.db.clone(), interval)),
        None => {
            tracing::info!("Background sweeper disabled (SWEEP_INTERVAL_SECS=0)");
            None
        }
    };

    let serve_result = serve_router(listener, state, allow_public, shutdown_signal()).await;
    drop(sweeper);
    serve_result?;

    Ok(())
}

fn print_help() {
    println!("ClipDrop Server\n");
    println!("Usage: clipdrop [OPTIONS]\n");
    println!("Options:");
    println!("  --sweep           Remove expired items once and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/clipdrop/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  CRON_SECRET       Bearer secret required by /api/cleanup (default: unset)");
    println!("  SWEEP_INTERVAL_SECS  Seconds between background sweeps, 0 disables (default: 60)");
    println!("  STORAGE_TIMEOUT_MS   Bound on each storage call (default: 5000)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin and non-loopback binds");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
    tracing::info!("Shutdown signal received");
}
