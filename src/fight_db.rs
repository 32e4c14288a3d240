//! SQLite storage: schema, replace-style batch writes, and run bookkeeping.
//!
//! Batch writes are delete-then-insert inside a single transaction per
//! table, keyed by fight_uid, so re-parsing a file fully replaces its prior
//! rows.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::issues::IssueSummary;
use crate::models::{Fight, RoundSigStats, RoundStats, RoundTotalStats, UfcEvent};

pub fn default_db_path() -> PathBuf {
    std::env::var("OCTAGON_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data").join("octagon.db"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS ufc_events (
            event_uid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            event_date TEXT NOT NULL,
            event_location TEXT NOT NULL,
            downloaded_ts TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_events_date ON ufc_events(event_date);

        CREATE TABLE IF NOT EXISTS ufc_fights (
            event_uid TEXT NOT NULL,
            fight_uid TEXT NOT NULL,
            fight_style TEXT NOT NULL,
            fight_type TEXT NULL,
            fight_division TEXT NULL,
            fighter1_uid TEXT NOT NULL,
            fighter2_uid TEXT NOT NULL,
            fighter1_result TEXT NULL,
            fighter2_result TEXT NULL,
            decision TEXT NULL,
            decision_round INTEGER NULL,
            decision_time_seconds INTEGER NULL,
            referee TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (event_uid, fight_uid)
        );
        CREATE INDEX IF NOT EXISTS idx_fights_fight_uid ON ufc_fights(fight_uid);

        CREATE TABLE IF NOT EXISTS ufc_fight_stats (
            fight_uid TEXT NOT NULL,
            fighter_uid TEXT NOT NULL,
            round_num INTEGER NOT NULL,
            knockdowns INTEGER NULL,
            total_strikes_landed INTEGER NULL,
            total_strikes_attempted INTEGER NULL,
            takedowns_landed INTEGER NULL,
            takedowns_attempted INTEGER NULL,
            submissions_attempted INTEGER NULL,
            reversals INTEGER NULL,
            control_time_seconds INTEGER NULL,
            sig_strikes_landed INTEGER NULL,
            sig_strikes_attempted INTEGER NULL,
            sig_strikes_head_landed INTEGER NULL,
            sig_strikes_head_attempted INTEGER NULL,
            sig_strikes_body_landed INTEGER NULL,
            sig_strikes_body_attempted INTEGER NULL,
            sig_strikes_leg_landed INTEGER NULL,
            sig_strikes_leg_attempted INTEGER NULL,
            sig_strikes_distance_landed INTEGER NULL,
            sig_strikes_distance_attempted INTEGER NULL,
            sig_strikes_clinch_landed INTEGER NULL,
            sig_strikes_clinch_attempted INTEGER NULL,
            sig_strikes_ground_landed INTEGER NULL,
            sig_strikes_ground_attempted INTEGER NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (fight_uid, fighter_uid, round_num)
        );

        CREATE TABLE IF NOT EXISTS parse_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            files_total INTEGER NOT NULL,
            clean INTEGER NOT NULL,
            flagged INTEGER NOT NULL,
            failed INTEGER NOT NULL,
            skipped INTEGER NOT NULL,
            issues_json TEXT NOT NULL
        );
        "#,
    )
    .context("init sqlite schema")?;
    Ok(())
}

pub fn upsert_events(conn: &mut Connection, events: &[UfcEvent]) -> Result<usize> {
    let tx = conn.transaction().context("begin events transaction")?;
    for event in events {
        tx.execute(
            r#"
            INSERT INTO ufc_events (event_uid, title, event_date, event_location, downloaded_ts)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(event_uid) DO UPDATE SET
                title = excluded.title,
                event_date = excluded.event_date,
                event_location = excluded.event_location
            "#,
            params![
                event.event_uid,
                event.title,
                event.event_date,
                event.event_location,
                event.downloaded_ts,
            ],
        )
        .with_context(|| format!("upsert event {}", event.event_uid))?;
    }
    tx.commit().context("commit events transaction")?;
    Ok(events.len())
}

/// Past events whose fight pages have not been downloaded yet (all past
/// events when `force` is set).
pub fn events_to_download(conn: &Connection, force: bool) -> Result<Vec<String>> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let sql = if force {
        "SELECT event_uid FROM ufc_events WHERE event_date < ?1 ORDER BY event_date"
    } else {
        "SELECT event_uid FROM ufc_events
         WHERE event_date < ?1 AND downloaded_ts IS NULL
         ORDER BY event_date"
    };
    let mut stmt = conn.prepare(sql).context("prepare events query")?;
    let uids = stmt
        .query_map(params![today], |row| row.get::<_, String>(0))
        .context("query events to download")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("read event uids")?;
    Ok(uids)
}

pub fn mark_event_downloaded(conn: &Connection, event_uid: &str) -> Result<()> {
    conn.execute(
        "UPDATE ufc_events SET downloaded_ts = ?1 WHERE event_uid = ?2",
        params![Utc::now().to_rfc3339(), event_uid],
    )
    .with_context(|| format!("mark event {event_uid} downloaded"))?;
    Ok(())
}

/// Fight uids already in storage; the parse binary skips their files unless
/// forced.
pub fn parsed_fight_uids(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn
        .prepare("SELECT fight_uid FROM ufc_fights")
        .context("prepare fights query")?;
    let uids = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query parsed fights")?
        .collect::<std::result::Result<HashSet<_>, _>>()
        .context("read fight uids")?;
    Ok(uids)
}

pub fn replace_fights(conn: &mut Connection, fights: &[Fight]) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin fights transaction")?;
    for fight in fights {
        tx.execute(
            "DELETE FROM ufc_fights WHERE fight_uid = ?1",
            params![fight.fight_uid],
        )
        .with_context(|| format!("delete fight {}", fight.fight_uid))?;
        tx.execute(
            r#"
            INSERT INTO ufc_fights (
                event_uid, fight_uid, fight_style, fight_type, fight_division,
                fighter1_uid, fighter2_uid, fighter1_result, fighter2_result,
                decision, decision_round, decision_time_seconds, referee, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                fight.event_uid,
                fight.fight_uid,
                fight.fight_style.as_str(),
                fight.fight_type.map(|t| t.as_str()),
                fight.fight_division.map(|d| d.as_str()),
                fight.fighter1_uid,
                fight.fighter2_uid,
                fight.fighter1_result.map(|r| r.as_str()),
                fight.fighter2_result.map(|r| r.as_str()),
                fight.decision.map(|d| d.as_str()),
                fight.decision_round,
                fight.decision_time_seconds,
                fight.referee,
                updated_at,
            ],
        )
        .with_context(|| format!("insert fight {}", fight.fight_uid))?;
    }
    tx.commit().context("commit fights transaction")?;
    Ok(fights.len())
}

/// Joins the totals and significant-strikes batches on their shared
/// (fight_uid, fighter_uid, round_num) key. Rows missing from either side
/// drop out (inner join); output is sorted by the key for determinism.
pub fn combine_round_stats(
    totals: &[RoundTotalStats],
    sig_stats: &[RoundSigStats],
) -> Vec<RoundStats> {
    let by_key: HashMap<(&str, &str, u32), &RoundTotalStats> = totals
        .iter()
        .map(|t| ((t.fight_uid.as_str(), t.fighter_uid.as_str(), t.round_num), t))
        .collect();

    let mut combined: Vec<RoundStats> = sig_stats
        .iter()
        .filter_map(|s| {
            let totals = by_key.get(&(s.fight_uid.as_str(), s.fighter_uid.as_str(), s.round_num))?;
            Some(RoundStats {
                fight_uid: s.fight_uid.clone(),
                fighter_uid: s.fighter_uid.clone(),
                round_num: s.round_num,
                knockdowns: totals.knockdowns,
                total_strikes_landed: totals.total_strikes_landed,
                total_strikes_attempted: totals.total_strikes_attempted,
                takedowns_landed: totals.takedowns_landed,
                takedowns_attempted: totals.takedowns_attempted,
                submissions_attempted: totals.submissions_attempted,
                reversals: totals.reversals,
                control_time_seconds: totals.control_time_seconds,
                sig_strikes_landed: s.sig_strikes_landed,
                sig_strikes_attempted: s.sig_strikes_attempted,
                sig_strikes_head_landed: s.sig_strikes_head_landed,
                sig_strikes_head_attempted: s.sig_strikes_head_attempted,
                sig_strikes_body_landed: s.sig_strikes_body_landed,
                sig_strikes_body_attempted: s.sig_strikes_body_attempted,
                sig_strikes_leg_landed: s.sig_strikes_leg_landed,
                sig_strikes_leg_attempted: s.sig_strikes_leg_attempted,
                sig_strikes_distance_landed: s.sig_strikes_distance_landed,
                sig_strikes_distance_attempted: s.sig_strikes_distance_attempted,
                sig_strikes_clinch_landed: s.sig_strikes_clinch_landed,
                sig_strikes_clinch_attempted: s.sig_strikes_clinch_attempted,
                sig_strikes_ground_landed: s.sig_strikes_ground_landed,
                sig_strikes_ground_attempted: s.sig_strikes_ground_attempted,
            })
        })
        .collect();

    combined.sort_by(|a, b| {
        (&a.fight_uid, &a.fighter_uid, a.round_num)
            .cmp(&(&b.fight_uid, &b.fighter_uid, b.round_num))
    });
    combined
}

pub fn replace_round_stats(conn: &mut Connection, rows: &[RoundStats]) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let mut fight_uids: Vec<&str> = rows.iter().map(|r| r.fight_uid.as_str()).collect();
    fight_uids.sort_unstable();
    fight_uids.dedup();

    let tx = conn.transaction().context("begin stats transaction")?;
    for fight_uid in fight_uids {
        tx.execute(
            "DELETE FROM ufc_fight_stats WHERE fight_uid = ?1",
            params![fight_uid],
        )
        .with_context(|| format!("delete stats for fight {fight_uid}"))?;
    }
    for row in rows {
        tx.execute(
            r#"
            INSERT INTO ufc_fight_stats (
                fight_uid, fighter_uid, round_num,
                knockdowns, total_strikes_landed, total_strikes_attempted,
                takedowns_landed, takedowns_attempted, submissions_attempted,
                reversals, control_time_seconds,
                sig_strikes_landed, sig_strikes_attempted,
                sig_strikes_head_landed, sig_strikes_head_attempted,
                sig_strikes_body_landed, sig_strikes_body_attempted,
                sig_strikes_leg_landed, sig_strikes_leg_attempted,
                sig_strikes_distance_landed, sig_strikes_distance_attempted,
                sig_strikes_clinch_landed, sig_strikes_clinch_attempted,
                sig_strikes_ground_landed, sig_strikes_ground_attempted,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26
            )
            "#,
            params![
                row.fight_uid,
                row.fighter_uid,
                row.round_num,
                row.knockdowns,
                row.total_strikes_landed,
                row.total_strikes_attempted,
                row.takedowns_landed,
                row.takedowns_attempted,
                row.submissions_attempted,
                row.reversals,
                row.control_time_seconds,
                row.sig_strikes_landed,
                row.sig_strikes_attempted,
                row.sig_strikes_head_landed,
                row.sig_strikes_head_attempted,
                row.sig_strikes_body_landed,
                row.sig_strikes_body_attempted,
                row.sig_strikes_leg_landed,
                row.sig_strikes_leg_attempted,
                row.sig_strikes_distance_landed,
                row.sig_strikes_distance_attempted,
                row.sig_strikes_clinch_landed,
                row.sig_strikes_clinch_attempted,
                row.sig_strikes_ground_landed,
                row.sig_strikes_ground_attempted,
                updated_at,
            ],
        )
        .with_context(|| {
            format!(
                "insert stats {} {} round {}",
                row.fight_uid, row.fighter_uid, row.round_num
            )
        })?;
    }
    tx.commit().context("commit stats transaction")?;
    Ok(rows.len())
}

/// End-of-run bookkeeping row, with the issue summaries serialized alongside.
#[derive(Debug, Clone)]
pub struct ParseRunSummary {
    pub started_at: String,
    pub finished_at: String,
    pub files_total: usize,
    pub clean: usize,
    pub flagged: usize,
    pub failed: usize,
    pub skipped: usize,
    pub issues: Vec<IssueSummary>,
}

pub fn record_parse_run(conn: &Connection, summary: &ParseRunSummary) -> Result<()> {
    let issues_json = serde_json::to_string(&summary.issues).context("serialize issues")?;
    conn.execute(
        r#"
        INSERT INTO parse_runs (
            started_at, finished_at, files_total, clean, flagged, failed, skipped, issues_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            summary.started_at,
            summary.finished_at,
            summary.files_total,
            summary.clean,
            summary.flagged,
            summary.failed,
            summary.skipped,
            issues_json,
        ],
    )
    .context("record parse run")?;
    Ok(())
}
