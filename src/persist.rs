use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::batch::Batch;
use crate::candidate::Candidate;
use crate::search::Ticket;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketsFile {
    pub generated_at: String,
    /// `null` when no combination of the required size existed.
    pub tickets: BTreeMap<String, Option<Ticket>>,
}

impl TicketsFile {
    pub fn from_batch(batch: &Batch, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            tickets: batch
                .entries
                .iter()
                .map(|e| (e.name.clone(), e.outcome.ticket.clone()))
                .collect(),
        }
    }
}

/// Reads either a bare array of candidates or an object carrying them under `events`.
/// Rows that don't have the candidate shape are skipped.
pub fn parse_pool(raw: &str) -> Result<Vec<Candidate>> {
    let value: Value = serde_json::from_str(raw).context("invalid pool json")?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("events") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(anyhow!("pool json object has no `events` array")),
        },
        _ => return Err(anyhow!("pool json must be an array or an object with `events`")),
    };

    let total = rows.len();
    let pool: Vec<Candidate> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<Candidate>(row).ok())
        .collect();
    if pool.len() < total {
        warn!(skipped = total - pool.len(), total, "skipped malformed pool rows");
    }
    Ok(pool)
}

pub fn load_pool(path: &Path) -> Result<Vec<Candidate>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading pool {}", path.display()))?;
    parse_pool(&raw).with_context(|| format!("failed parsing pool {}", path.display()))
}

/// Writes next to the target and swaps it in, so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("failed writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed swapping {}", path.display()))?;
    Ok(())
}

pub fn save_tickets(path: &Path, file: &TicketsFile) -> Result<()> {
    let json = serde_json::to_string_pretty(file).context("serialize tickets")?;
    write_atomic(path, &json)
}
