//! Soroban RPC client: pages through `getEvents` and decodes contract events.
//!
//! Network failures, rate limiting and soft RPC errors are retried with
//! exponential back-off capped at [`MAX_BACKOFF_SECS`]. Malformed requests
//! (`-32600`, `-32601`) are returned as errors.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, GovernanceEvent, TopicScope};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// One entry of `getEvents` output, requested with `xdrFormat: "json"` so
/// topics and body arrive as ScVal JSON instead of base64 XDR.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub topic_json: Vec<Value>,
    #[serde(default)]
    pub value_json: Value,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    pub ledger_closed_at: Option<String>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Fetching
// ─────────────────────────────────────────────────────────

/// Fetch one page of contract events.
///
/// With a `cursor` the RPC continues from it; otherwise scanning starts at
/// `start_ledger`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("getEvents request failed, retrying in {backoff}s: {e}");
                backoff = wait(backoff).await;
                continue;
            }
        };

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC, retrying in {backoff}s");
            backoff = wait(backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC error {} ({}), retrying in {backoff}s",
                err.code, err.message
            );
            backoff = wait(backoff).await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("getEvents returned no result".into()))?;
        debug!(
            events = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "Fetched event page"
        );
        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

/// Sleep for `secs` and return the next back-off interval.
async fn wait(secs: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    (secs * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [{ "type": "contract", "contractIds": [contract_id] }],
        "pagination": { "limit": limit },
        "xdrFormat": "json",
    });
    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }
    params
}

// ─────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────

/// Decode a page of raw events. Events without a topic are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<GovernanceEvent> {
    raw.iter()
        .enumerate()
        .filter_map(|(pos, e)| decode_single(e, pos, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, pos: usize, contract_id: &str) -> Option<GovernanceEvent> {
    let kind = EventKind::from_topic(&scalar(raw.topic_json.first()?)?);
    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let subject = raw.topic_json.get(1).and_then(scalar);
    let (mut proposal_id, mut cycle, mut actor) = (None, None, None);
    match kind.scope() {
        TopicScope::Proposal => proposal_id = subject,
        TopicScope::Account => actor = subject,
        TopicScope::Cycle => cycle = subject.and_then(|s| s.parse().ok()),
        TopicScope::None => {}
    }

    let data = decode_data(&raw.value_json, &kind);
    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!("{ledger}-{}-{pos}", raw.tx_hash.as_deref().unwrap_or("none"))
    });

    Some(GovernanceEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        proposal_id,
        cycle,
        actor: actor.or(data.actor),
        amount: data.amount,
        detail: data.detail,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

#[derive(Debug, Default, PartialEq)]
struct EventData {
    actor: Option<String>,
    amount: Option<String>,
    detail: Option<String>,
}

/// Pull the interesting fields out of the ScVal JSON event body.
fn decode_data(value: &Value, kind: &EventKind) -> EventData {
    match kind {
        EventKind::MakerRegistered => EventData {
            detail: map_field(value, "name"),
            ..Default::default()
        },
        EventKind::ProposalSubmitted => EventData {
            actor: map_field(value, "maker"),
            amount: map_field(value, "min_required_investment"),
            detail: map_field(value, "name"),
        },
        EventKind::ProposalVerified => EventData {
            actor: map_field(value, "auditor"),
            ..Default::default()
        },
        EventKind::VoteCast => EventData {
            actor: map_field(value, "voter"),
            amount: map_field(value, "amount"),
            ..Default::default()
        },
        EventKind::ClosingAuthorized => EventData {
            actor: map_field(value, "auditor"),
            detail: match (map_field(value, "count"), map_field(value, "threshold")) {
                (Some(count), Some(threshold)) => Some(format!("{count}/{threshold}")),
                _ => None,
            },
            ..Default::default()
        },
        EventKind::PeriodChanged => EventData {
            detail: enum_variant(value),
            ..Default::default()
        },
        EventKind::WinnerSelected => EventData {
            actor: map_field(value, "maker"),
            amount: map_field(value, "total_balance"),
            detail: map_field(value, "name"),
        },
        EventKind::PayoutCredited => EventData {
            actor: map_field(value, "recipient"),
            amount: map_field(value, "amount"),
            detail: map_entry(value, "kind").and_then(enum_variant),
        },
        EventKind::Withdrawn => EventData {
            amount: scalar(value),
            ..Default::default()
        },
        EventKind::ContractPaused | EventKind::ContractUnpaused => EventData {
            actor: scalar(value),
            ..Default::default()
        },
        EventKind::AuditorRegistered | EventKind::Unknown => EventData::default(),
    }
}

const SCALAR_TAGS: [&str; 10] = [
    "symbol", "string", "address", "u32", "i32", "u64", "i64", "u128", "i128", "bool",
];

/// Render a scalar ScVal such as `{"u64":"7"}` or `{"symbol":"voted"}`.
///
/// 64 and 128-bit integers arrive as decimal strings. Older RPC releases
/// send 128-bit values as `{"hi":..,"lo":..}` parts, which are recombined.
fn scalar(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    let inner = SCALAR_TAGS.iter().find_map(|tag| map.get(*tag))?;
    match inner {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(parts) => {
            let hi = parts.get("hi").and_then(Value::as_i64)?;
            let lo = parts.get("lo").and_then(Value::as_u64)?;
            Some((((hi as i128) << 64) | lo as i128).to_string())
        }
        _ => None,
    }
}

/// Value stored under the symbol key `key` of a `{"map":[..]}` ScVal.
fn map_entry<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .get("map")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
}

fn map_field(value: &Value, key: &str) -> Option<String> {
    map_entry(value, key).and_then(scalar)
}

/// Unit enum variants are encoded as a one-element vector holding the
/// variant symbol: `{"vec":[{"symbol":"Voting"}]}`.
fn enum_variant(value: &Value) -> Option<String> {
    value.get("vec")?.as_array()?.first().and_then(scalar)
}

fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}
