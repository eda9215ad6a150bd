//! Database initialization
//!
//! Creates the database on first run with the full schema, and re-applies
//! idempotent `CREATE TABLE IF NOT EXISTS` statements on every startup.
//! Default SLA settings are seeded here and read back by the service.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Seconds-per-hour defaults for the per-stage SLA thresholds, stored in
/// the `settings` table so operators can correct them without a redeploy.
pub const DEFAULT_SLA_FORMS_HOURS: i64 = 72;
pub const DEFAULT_SLA_ADMIN_REVIEW_HOURS: i64 = 48;
pub const DEFAULT_SLA_SUPERADMIN_REVIEW_HOURS: i64 = 48;
pub const DEFAULT_SLA_MASTERADMIN_APPROVAL_HOURS: i64 = 24;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema. Test helper.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer, so timeline reads
    // never block workflow transitions
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    // Losing writers wait this long before the optimistic version check
    // reports ConcurrentModification
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Run all idempotent schema statements and seed default settings
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_submissions_table(pool).await?;
    create_submission_audit_table(pool).await?;
    create_settings_table(pool).await?;
    init_default_settings(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            guid TEXT PRIMARY KEY,
            marketer_guid TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending_admin_review',
            version INTEGER NOT NULL DEFAULT 0,
            biodata_submitted INTEGER NOT NULL DEFAULT 0,
            biodata_submitted_at TIMESTAMP,
            biodata_payload TEXT,
            guarantor_submitted INTEGER NOT NULL DEFAULT 0,
            guarantor_submitted_at TIMESTAMP,
            guarantor_payload TEXT,
            commitment_submitted INTEGER NOT NULL DEFAULT 0,
            commitment_submitted_at TIMESTAMP,
            commitment_payload TEXT,
            admin_uploaded_at TIMESTAMP,
            admin_notes TEXT,
            superadmin_reviewed_at TIMESTAMP,
            superadmin_result TEXT,
            superadmin_notes TEXT,
            master_decided_at TIMESTAMP,
            master_result TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_marketer ON submissions(marketer_guid)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_submissions_status ON submissions(status)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Append-only transition/audit history. The timeline builder reads stage
/// boundaries from here, not from the scalar columns on `submissions`.
async fn create_submission_audit_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submission_audit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_guid TEXT NOT NULL,
            actor_guid TEXT NOT NULL,
            actor_role TEXT,
            action TEXT NOT NULL,
            from_status TEXT,
            to_status TEXT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL,
            FOREIGN KEY (submission_guid) REFERENCES submissions(guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_audit_submission ON submission_audit(submission_guid)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure all required settings exist with default values.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "sla_forms_hours", &DEFAULT_SLA_FORMS_HOURS.to_string()).await?;
    ensure_setting(
        pool,
        "sla_admin_review_hours",
        &DEFAULT_SLA_ADMIN_REVIEW_HOURS.to_string(),
    )
    .await?;
    ensure_setting(
        pool,
        "sla_superadmin_review_hours",
        &DEFAULT_SLA_SUPERADMIN_REVIEW_HOURS.to_string(),
    )
    .await?;
    ensure_setting(
        pool,
        "sla_masteradmin_approval_hours",
        &DEFAULT_SLA_MASTERADMIN_APPROVAL_HOURS.to_string(),
    )
    .await?;

    Ok(())
}

/// Insert a setting if missing; reset NULL values to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE settings SET value = ? WHERE key = ? AND value IS NULL")
        .bind(default_value)
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

/// Read an integer setting, falling back to the given default when the row
/// is missing or unparseable.
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value.and_then(|v| v.parse().ok()).unwrap_or(default))
}
