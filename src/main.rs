// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result
    )
)]

use affairs_daemon::config::{load_config, StorageBackend};
use affairs_daemon::cors::{build_cors_layer, DEFAULT_CORS_ORIGINS};
use affairs_daemon::grpc_logging::GrpcLoggingLayer;
use affairs_daemon::logging::{
    self, default_log_dir, init_logging, parse_rotation, LogConfig, LOG_FILENAME,
};
use affairs_daemon::record::expiry::spawn_sweeper;
use affairs_daemon::record::{Clock, FileStore, MemoryStore, RecordStore, SystemClock};
use affairs_daemon::server::proto::affairs_daemon_server::AffairsDaemonServer;
use affairs_daemon::server::{AffairsDaemonService, FILE_DESCRIPTOR_SET};
use affairs_daemon::utils::DAEMON_VERSION;
use clap::Parser;
use color_eyre::eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "127.0.0.1:50051";

/// Affairs Daemon - record store, approval workflow and statistics for the
/// international affairs dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, env = "AFFAIRS_DAEMON_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Config file (default: ~/.affairs/config.toml, optional)
    #[arg(short, long, env = "AFFAIRS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory; overrides `storage.data_dir` from the config file
    #[arg(long, env = "AFFAIRS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Comma-separated list of allowed CORS origins.
    /// Use "*" to allow all origins.
    #[arg(
        long,
        env = "AFFAIRS_CORS_ORIGINS",
        default_value = DEFAULT_CORS_ORIGINS,
        value_delimiter = ','
    )]
    cors_origins: Vec<String>,

    /// Enable JSON log format (for production/log aggregation)
    #[arg(long, env = "AFFAIRS_LOG_JSON", default_value = "false")]
    log_json: bool,

    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "AFFAIRS_LOG_ROTATION", default_value = "daily")]
    log_rotation: String,

    /// Custom log directory (default: ~/.affairs/logs)
    #[arg(long, env = "AFFAIRS_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn report_server_error(
    addr: std::net::SocketAddr,
    log_file: &std::path::Path,
    e: &tonic::transport::Error,
) {
    let err_string = format!("{e:?}");
    eprintln!();
    if err_string.contains("AddrInUse") {
        eprintln!("Error: Failed to start server - address {addr} is already in use");
        eprintln!();
        eprintln!("Another instance of affairs-daemon may already be running.");
        eprintln!("Use a different port: affairs-daemon --addr 127.0.0.1:50052");
    } else {
        eprintln!("Error: Failed to start server: {e}");
    }
    eprintln!();
    eprintln!("Logs: {}", log_file.display());
    eprintln!();
}

async fn open_store(backend: StorageBackend, data_dir: PathBuf) -> Result<Arc<dyn RecordStore>> {
    match backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            info!(data_dir = %data_dir.display(), "Opening file store");
            Ok(Arc::new(FileStore::open(data_dir).await?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse CLI arguments first (before logging, so we can use log config)
    let args = Args::parse();

    let log_dir = args.log_dir.unwrap_or_else(default_log_dir);
    let log_file = log_dir.join(LOG_FILENAME);
    logging::set_log_file_path(log_file.to_string_lossy().to_string());

    let log_config = LogConfig {
        log_dir,
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..Default::default()
    };

    if let Err(e) = init_logging(log_config) {
        eprintln!();
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!("Logs: {}", log_file.display());
        eprintln!();
        return Err(e);
    }

    let config = load_config(args.config.as_deref())?;
    let sweep_settings = config.sweep_settings()?;
    let data_dir = args
        .data_dir
        .unwrap_or_else(|| config.storage.resolved_data_dir());

    let store = open_store(config.storage.backend, data_dir).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = AffairsDaemonService::new(store.clone(), clock.clone(), config.stats);

    if config.expiry.enabled {
        info!(
            interval = %humantime::format_duration(sweep_settings.interval),
            "Starting expiry sweeper"
        );
        let _sweeper =
            spawn_sweeper(store, service.engine().journal().clone(), clock, sweep_settings);
    } else {
        warn!("Expiry sweeper disabled; record status is only refreshed on write");
    }

    let addr = args.addr.parse()?;

    let cors_origins: Vec<String> = args
        .cors_origins
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    info!("CORS origins: {}", cors_origins.join(", "));
    let cors = build_cors_layer(cors_origins);

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    info!("Starting affairs daemon v{DAEMON_VERSION} on {addr} (gRPC + gRPC-Web)");

    let server_result = Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(cors)
        .layer(GrpcLoggingLayer)
        .layer(tonic_web::GrpcWebLayer::new())
        .add_service(reflection_service)
        .add_service(AffairsDaemonServer::new(service))
        .serve_with_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, stopping server...");
        })
        .await;

    if let Err(e) = server_result {
        report_server_error(addr, &log_file, &e);
        return Err(e.into());
    }

    info!("Affairs daemon stopped");
    Ok(())
}
