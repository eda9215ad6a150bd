//! kyt-vt (Verification Tracker) - KYC submission workflow service
//!
//! Tracks marketer identity-verification submissions through the fixed
//! Admin -> SuperAdmin -> MasterAdmin review pipeline and serves derived
//! timeline, progress, and SLA views over HTTP.

use anyhow::Result;
use clap::Parser;
use kyt_common::config::{database_path, resolve_port, resolve_root_folder, SlaThresholds};
use kyt_common::db::init_database;
use kyt_vt::{build_router, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "kyt-vt", about = "KYC verification tracker service")]
struct Args {
    /// Root folder holding kyt.db (overrides KYT_ROOT_FOLDER and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port (overrides KYT_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting KYT Verification Tracker (kyt-vt) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref());
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    info!("✓ Database ready");

    let sla = SlaThresholds::load(&pool).await?;
    info!(
        "SLA thresholds (hours): forms={} admin={} superadmin={} masteradmin={}",
        sla.forms_ms / 3_600_000,
        sla.admin_review_ms / 3_600_000,
        sla.superadmin_review_ms / 3_600_000,
        sla.masteradmin_approval_ms / 3_600_000
    );

    let state = AppState::new(pool, sla);
    let app = build_router(state);

    let port = resolve_port(args.port);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("kyt-vt listening on http://127.0.0.1:{port}");
    info!("Health check: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
