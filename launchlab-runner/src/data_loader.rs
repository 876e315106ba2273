//! Sqlite event/quote loader with fuzzy schema discovery.
//!
//! The recorder's quote schema drifted across deployments: the table and
//! several columns go by different names in different captures. Discovery
//! picks the first candidate that exists; anything missing is a
//! configuration error raised before the sweep starts, never mid-run.
//!
//! Everything returned here is normalized: unix-second timestamps, per-mint
//! ascending time order, and quotes restricted to the requested size tiers.

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use launchlab_core::domain::{Quote, SizeKey, Snapshot};

/// Origin the strategy is calibrated for; events from other venues are
/// ignored at load time.
pub const TRACKED_ORIGIN: &str = "pumpfun";

const QUOTE_TABLES: &[&str] = &["quotes", "price_quotes", "px_quotes"];
const MINT_COLUMNS: &[&str] = &["mint", "mint_address", "token", "asset"];
const TS_COLUMNS: &[&str] = &["ts", "timestamp", "time"];
const SIZE_COLUMNS: &[&str] = &["size_sol", "size", "quote_size_sol"];
const PRICE_COLUMNS: &[&str] = &[
    "est_fill_price_sol",
    "price",
    "fill_price_sol",
    "est_price_sol",
];

/// Errors from opening or interrogating the recorded history.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("none of the expected tables exist: {candidates}")]
    MissingTable { candidates: String },
    #[error("missing required column in {table}: one of {candidates}")]
    MissingColumn { table: String, candidates: String },
}

/// Load observation snapshots, keyed by mint and ordered by timestamp.
///
/// The events table has a fixed schema; the stored same-funder ratio is
/// converted back to a buyer count so the scorer works on raw counts.
pub fn load_events(
    db_path: &Path,
    start_ts: Option<i64>,
    end_ts: Option<i64>,
) -> Result<BTreeMap<String, Vec<Snapshot>>, LoadError> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let mut stmt = conn.prepare(
        "SELECT
           mint,
           ts,
           buyers,
           unique_funders,
           CAST(ROUND(same_funder_ratio * buyers) AS INTEGER) AS same_count,
           price_jumps,
           depth_est,
           origin
         FROM events
         WHERE origin = ?1
         ORDER BY ts",
    )?;

    let mut out: BTreeMap<String, Vec<Snapshot>> = BTreeMap::new();

    let rows = stmt.query_map([TRACKED_ORIGIN], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Value>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, Option<i64>>(3)?,
            row.get::<_, Option<i64>>(4)?,
            row.get::<_, Option<i64>>(5)?,
            row.get::<_, Option<f64>>(6)?,
            row.get::<_, Option<String>>(7)?,
        ))
    })?;

    for row in rows {
        let (mint, raw_ts, buyers, unique, same, price_jumps, depth, origin) = row?;
        let ts = normalize_ts(&raw_ts);
        if start_ts.is_some_and(|start| ts < start) {
            continue;
        }
        if end_ts.is_some_and(|end| ts > end) {
            continue;
        }

        out.entry(mint.clone()).or_default().push(Snapshot {
            mint,
            ts,
            buyers: buyers.unwrap_or(0).max(0) as u32,
            unique: unique.unwrap_or(0).max(0) as u32,
            same: same.unwrap_or(0).max(0) as u32,
            price_jumps: price_jumps.unwrap_or(0).max(0) as u32,
            depth: depth.unwrap_or(0.0),
            origin: origin.unwrap_or_default(),
        });
    }

    // Normalization can reorder rows the db sorted on raw values.
    for snapshots in out.values_mut() {
        snapshots.sort_by_key(|s| s.ts);
    }

    Ok(out)
}

/// Load quotes for the requested size tiers, keyed by mint and ordered by
/// timestamp. Only mints that have tracked events are joined in.
pub fn load_quotes(
    db_path: &Path,
    sizes: &[f64],
) -> Result<BTreeMap<String, Vec<Quote>>, LoadError> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let table = find_table(&conn, QUOTE_TABLES)?;
    let columns = table_columns(&conn, &table)?;
    let pick = |candidates: &[&str]| -> Result<String, LoadError> {
        candidates
            .iter()
            .find(|c| columns.iter().any(|have| have == *c))
            .map(|c| c.to_string())
            .ok_or_else(|| LoadError::MissingColumn {
                table: table.clone(),
                candidates: candidates.join(", "),
            })
    };

    let mint_col = pick(MINT_COLUMNS)?;
    let ts_col = pick(TS_COLUMNS)?;
    let size_col = pick(SIZE_COLUMNS)?;
    let price_col = pick(PRICE_COLUMNS)?;

    // Identifiers come from the fixed candidate lists above, so the dynamic
    // SQL cannot smuggle anything in.
    let query = format!(
        "SELECT q.{mint_col}, q.{ts_col}, q.{size_col}, q.{price_col}
         FROM {table} AS q
         JOIN (SELECT DISTINCT mint FROM events WHERE origin = ?1) AS e
           ON e.mint = q.{mint_col}
         ORDER BY q.{ts_col} ASC",
    );

    let wanted: Vec<SizeKey> = sizes.iter().copied().map(SizeKey::from_sol).collect();
    let mut out: BTreeMap<String, Vec<Quote>> = BTreeMap::new();

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([TRACKED_ORIGIN], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Value>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, Option<f64>>(3)?,
        ))
    })?;

    for row in rows {
        let (mint, raw_ts, size, price) = row?;
        let size = size.unwrap_or(0.0);
        if !wanted.contains(&SizeKey::from_sol(size)) {
            continue;
        }
        out.entry(mint.clone()).or_default().push(Quote {
            mint,
            ts: normalize_ts(&raw_ts),
            size,
            price: price.unwrap_or(0.0),
        });
    }

    for quotes in out.values_mut() {
        quotes.sort_by_key(|q| q.ts);
    }

    Ok(out)
}

fn find_table(conn: &Connection, candidates: &[&str]) -> Result<String, LoadError> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;

    candidates
        .iter()
        .find(|c| existing.iter().any(|have| have == *c))
        .map(|c| c.to_string())
        .ok_or_else(|| LoadError::MissingTable {
            candidates: candidates.join(", "),
        })
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, LoadError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    // PRAGMA table_info rows: (cid, name, type, notnull, dflt_value, pk)
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;
    Ok(columns)
}

/// Normalize a stored timestamp to unix seconds.
///
/// Accepts integers (auto-detecting millisecond precision), floats, and
/// ISO-8601-ish text. Unparseable values collapse to 0 and fall out of any
/// date filter.
fn normalize_ts(value: &Value) -> i64 {
    let ts = match value {
        Value::Integer(v) => *v,
        Value::Real(v) => *v as i64,
        Value::Text(s) => parse_ts_text(s),
        _ => 0,
    };
    if ts > 1_000_000_000_000 {
        ts / 1000
    } else {
        ts
    }
}

fn parse_ts_text(s: &str) -> i64 {
    if let Ok(v) = s.parse::<i64>() {
        return v;
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().timestamp();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.timestamp();
    }
    0
}
