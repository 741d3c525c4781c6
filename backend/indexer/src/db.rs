//! SQLite persistence: migrations, the resume cursor, and event queries.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventKind, EventRecord, GovernanceEvent};

const EVENT_COLUMNS: &str = "id, event_id, event_type, proposal_id, cycle, actor, amount, \
     detail, ledger, timestamp, contract_id, tx_hash, created_at";

/// Open the pool and apply pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let url = if url.contains('?') || url.contains(":memory:") {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    // Each in-memory connection is its own database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor
// ─────────────────────────────────────────────────────────

/// Saved `(last_ledger, last_cursor)`; `(0, None)` on a fresh database.
pub async fn load_cursor(pool: &SqlitePool) -> Result<(i64, Option<String>)> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT last_ledger, last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.unwrap_or((0, None)))
}

pub async fn save_cursor(pool: &SqlitePool, last_ledger: i64, last_cursor: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Store a batch in one transaction. Rows whose `event_id` is already present
/// are skipped, so replaying a page is harmless. Returns the number inserted.
pub async fn insert_events(pool: &SqlitePool, events: &[GovernanceEvent]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for ev in events {
        inserted += sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, proposal_id, cycle, actor, amount, detail,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.proposal_id)
        .bind(ev.cycle)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.detail)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

/// Every event, oldest first.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    Ok(sqlx::query_as::<_, EventRecord>(&sql).fetch_all(pool).await?)
}

/// History of one proposal: submission, verification, votes, payouts.
pub async fn get_events_for_proposal(pool: &SqlitePool, proposal_id: u64) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE proposal_id = ?1 ORDER BY ledger ASC, id ASC"
    );
    Ok(sqlx::query_as::<_, EventRecord>(&sql)
        .bind(proposal_id.to_string())
        .fetch_all(pool)
        .await?)
}

/// One row per closed cycle, oldest first.
pub async fn get_winners(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 ORDER BY ledger ASC, id ASC"
    );
    Ok(sqlx::query_as::<_, EventRecord>(&sql)
        .bind(EventKind::WinnerSelected.as_str())
        .fetch_all(pool)
        .await?)
}
