//! Background task that follows the contract's event stream into SQLite.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq)]
struct Position {
    ledger: u32,
    cursor: Option<String>,
}

/// Poll until `shutdown` fires, persisting the position after each page.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    let mut position = match db::load_cursor(&state.pool).await {
        Ok((last_ledger, cursor)) => resume_position(last_ledger, cursor, state.config.start_ledger),
        Err(e) => {
            warn!("Could not read saved cursor, starting from configuration: {e}");
            resume_position(0, None, state.config.start_ledger)
        }
    };
    info!(ledger = position.ledger, cursor = ?position.cursor, "Resuming");

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = poll_once(&state, &position) => result,
        };
        match polled {
            Ok(next) => position = next,
            Err(e) => error!("Indexer poll failed: {e}"),
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!(ledger = position.ledger, "Indexer stopped");
}

fn resume_position(last_ledger: i64, cursor: Option<String>, start_ledger: u32) -> Position {
    if last_ledger > 0 {
        Position {
            ledger: u32::try_from(last_ledger).unwrap_or(u32::MAX),
            cursor,
        }
    } else {
        Position {
            ledger: start_ledger,
            cursor: None,
        }
    }
}

async fn poll_once(state: &IndexerState, position: &Position) -> Result<Position> {
    let config = &state.config;
    let page = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            fetched = page.events.len(),
            inserted, "Stored contract events"
        );
    }

    let next = advance(position, page.cursor, page.latest_ledger);
    db::save_cursor(&state.pool, next.ledger as i64, next.cursor.as_deref()).await?;
    Ok(next)
}

/// The RPC cursor continues pagination; the ledger only moves forward.
fn advance(position: &Position, cursor: Option<String>, latest_ledger: Option<u64>) -> Position {
    let ledger = latest_ledger
        .and_then(|l| u32::try_from(l).ok())
        .map_or(position.ledger, |l| l.max(position.ledger));
    Position { ledger, cursor }
}
