use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::domain::{NormalizedLead, SYSTEM_OWNER};

/// Persistence seam for bulk imports.
pub trait LeadStore: Send + Sync {
    /// Creates every lead plus one history entry each, atomically. Returns the number of
    /// leads written; on error nothing is written.
    fn create_many_with_audit(
        &self,
        leads: &[NormalizedLead],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to encode lead payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// SQLite-backed store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `url` and makes sure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = connect(url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl LeadStore for SqliteLeadStore {
    async fn create_many_with_audit(&self, leads: &[NormalizedLead]) -> Result<usize, StoreError> {
        let diff = json!({ "imported": true }).to_string();
        let now = Utc::now();

        // Dropping `tx` on any early return rolls the whole batch back.
        let mut tx = self.pool.begin().await?;

        for lead in leads {
            let lead_id = Uuid::new_v4().to_string();
            let tags = serde_json::to_string(&lead.tags)?;

            sqlx::query(
                r#"
                INSERT INTO leads (
                    id, full_name, email, phone, city,
                    property_type, bhk, purpose, budget_min, budget_max,
                    timeline, source, status, notes, tags,
                    owner_id, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&lead_id)
            .bind(&lead.full_name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.city)
            .bind(&lead.property_type)
            .bind(&lead.bhk)
            .bind(&lead.purpose)
            .bind(lead.budget_min)
            .bind(lead.budget_max)
            .bind(&lead.timeline)
            .bind(&lead.source)
            .bind(&lead.status)
            .bind(&lead.notes)
            .bind(&tags)
            .bind(&lead.owner_id)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO lead_history (id, lead_id, changed_by, changed_at, diff)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&lead_id)
            .bind(&lead.owner_id)
            .bind(now)
            .bind(&diff)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(count = leads.len(), "lead batch committed");

        Ok(leads.len())
    }
}

/// Opens a pool for `url` and bootstraps the schema.
///
/// In-memory databases live only as long as their connection, so they get exactly one
/// connection that is never recycled.
pub async fn connect(url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    init_schema(&pool).await?;
    info!(url, "lead store ready");

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Creates the users, leads and history tables if missing and registers the system owner.
/// Safe to run on every start.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE,
            name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT,
            phone TEXT NOT NULL,
            city TEXT,
            property_type TEXT,
            bhk TEXT,
            purpose TEXT,
            budget_min INTEGER,
            budget_max INTEGER,
            timeline TEXT,
            source TEXT,
            status TEXT NOT NULL DEFAULT 'New',
            notes TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            owner_id TEXT NOT NULL REFERENCES users(id),
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lead_history (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
            changed_by TEXT NOT NULL,
            changed_at TIMESTAMP NOT NULL,
            diff TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lead_history_lead ON lead_history(lead_id)")
        .execute(pool)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO users (id, name) VALUES (?, ?)")
        .bind(SYSTEM_OWNER)
        .bind("System")
        .execute(pool)
        .await?;

    Ok(())
}
