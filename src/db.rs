use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

const DB_PATH: &str = "data/rto.sqlite";

/// One employer row as exported from the tracking spreadsheet.
///
/// Accepts both snake_case keys and the spreadsheet's column headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(alias = "Employer")]
    pub employer: Option<String>,
    #[serde(default, alias = "WFH Start Date")]
    pub wfh_start_text: Option<String>,
    #[serde(default, alias = "Hybrid Transition Date")]
    pub hybrid_transition_text: Option<String>,
    #[serde(default, alias = "5-Day RTO Date")]
    pub rto_date_text: Option<String>,
    #[serde(default, alias = "Notes")]
    pub notes_text: Option<String>,
}

impl RawRecord {
    pub fn name(&self) -> &str {
        self.employer.as_deref().unwrap_or_default().trim()
    }
}

// ── JSON export ──

pub fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    parse_json(&raw).with_context(|| format!("Failed to parse {:?}", path))
}

pub fn parse_json(raw: &str) -> Result<Vec<RawRecord>> {
    let records: Vec<RawRecord> = serde_json::from_str(raw)?;
    Ok(records)
}

// ── SQLite store ──

pub fn path() -> PathBuf {
    env::var("RTO_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DB_PATH))
}

pub fn connect() -> Result<Connection> {
    let p = path();
    if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(&p).with_context(|| format!("Failed to open {:?}", p))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS rto_policies (
            id                INTEGER PRIMARY KEY,
            employer          TEXT NOT NULL,
            wfh_start         TEXT,
            hybrid_transition TEXT,
            rto_date          TEXT,
            notes             TEXT,
            imported_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_policies_employer ON rto_policies(employer);
        ",
    )?;
    Ok(())
}

/// Upsert by trimmed employer name. Returns the number of rows written.
///
/// Nothing is written if any record lacks a name.
pub fn save_records(conn: &Connection, records: &[RawRecord]) -> Result<usize> {
    if let Some(index) = records.iter().position(|r| r.name().is_empty()) {
        return Err(TimelineError::MissingIdentity { index }.into());
    }
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO rto_policies (employer, wfh_start, hybrid_transition, rto_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(employer) DO UPDATE SET
                wfh_start = excluded.wfh_start,
                hybrid_transition = excluded.hybrid_transition,
                rto_date = excluded.rto_date,
                notes = excluded.notes,
                imported_at = datetime('now')",
        )?;
        for r in records {
            count += stmt.execute(rusqlite::params![
                r.name(),
                r.wfh_start_text,
                r.hybrid_transition_text,
                r.rto_date_text,
                r.notes_text,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Records in import order.
pub fn fetch_records(conn: &Connection) -> Result<Vec<RawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT employer, wfh_start, hybrid_transition, rto_date, notes
         FROM rto_policies ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawRecord {
                employer: row.get(0)?,
                wfh_start_text: row.get(1)?,
                hybrid_transition_text: row.get(2)?,
                rto_date_text: row.get(3)?,
                notes_text: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Read records from a `.json` export, or from the SQLite store when no path is given.
pub fn load_records(input: Option<&Path>) -> Result<Vec<RawRecord>> {
    match input {
        Some(p) if p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) => load_json(p),
        Some(p) => {
            let conn = Connection::open_with_flags(p, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .with_context(|| format!("Failed to open {:?}", p))?;
            fetch_records(&conn)
        }
        None => {
            let conn = connect()?;
            init_schema(&conn)?;
            fetch_records(&conn)
        }
    }
}
