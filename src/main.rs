//! Parse pipeline: load downloaded fight pages, parse them in parallel,
//! report issues, and write clean results to SQLite.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;

use octagon_stats::error::ParseError;
use octagon_stats::fight_db::{self, ParseRunSummary};
use octagon_stats::fight_parse::parse_fight;
use octagon_stats::files::{self, FileContents};
use octagon_stats::issues;
use octagon_stats::models::FightParsingResult;
use octagon_stats::report::{CHECK, CROSS, HEADER_WIDTH, RunStats, create_header, report_stats};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let start = Instant::now();
    let started_at = Utc::now().to_rfc3339();
    println!("{}", create_header(HEADER_WIDTH, "OCTAGON STATS", true, "="));
    let footer = create_header(HEADER_WIDTH, "", true, "=");

    let force = has_flag("--force");
    let db_path = path_arg("--db").unwrap_or_else(fight_db::default_db_path);
    let data_dir = path_arg("--data-dir")
        .or_else(|| std::env::var("OCTAGON_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data").join("raw").join("fights"));
    let issues_json = path_arg("--issues-json");

    let mut conn = fight_db::open_db(&db_path)?;

    let skip_uids = if force {
        HashSet::new()
    } else {
        fight_db::parsed_fight_uids(&conn)?
    };
    let mut fights_to_parse = files::load_html_files(&data_dir, &HashSet::new())?;
    // Fight files are named <event_uid>_<fight_uid>.html; parsing and the
    // already-parsed filter key on the fight uid alone.
    for fight in &mut fights_to_parse {
        if let Some((_, fight_uid)) = fight.uid.rsplit_once('_') {
            fight.uid = fight_uid.to_string();
        }
    }
    fights_to_parse.retain(|fight| !skip_uids.contains(&fight.uid));
    let n_files = fights_to_parse.len();
    for (file_num, fight) in fights_to_parse.iter_mut().enumerate() {
        fight.file_num = file_num;
        fight.n_files = n_files;
    }

    if fights_to_parse.is_empty() {
        println!("no fights to parse. exiting early");
        println!("{footer}");
        return Ok(());
    }

    println!(
        "{}",
        create_header(HEADER_WIDTH, &format!("PARSING n={n_files} fights"), true, "-")
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parse_jobs())
        .build()
        .context("build parse pool")?;
    let outcomes: Vec<(String, Result<FightParsingResult, ParseError>)> = pool.install(|| {
        fights_to_parse
            .par_iter()
            .map(|fight: &FileContents| (fight.uid.clone(), parse_fight(fight)))
            .collect()
    });

    let mut results: Vec<FightParsingResult> = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    for (uid, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                failed += 1;
                log::warn!("failed to parse {uid}: {err}");
            }
        }
    }

    let skipped = results.iter().filter(|r| r.was_skipped()).count();
    let summaries = issues::summarize(&results);
    issues::print_summaries(&summaries);
    if let Some(path) = issues_json {
        let json = serde_json::to_string_pretty(&summaries).context("serialize issues")?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        println!("issue summaries written to {}", path.display());
    }

    let (clean, flagged) = issues::split_clean(results);
    if !flagged.is_empty() {
        println!(
            "[n={:5}] removing flagged fights from insert",
            flagged.len() - skipped
        );
    }

    write_results(&mut conn, &clean)?;

    let summary = ParseRunSummary {
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        files_total: n_files,
        clean: clean.len(),
        flagged: flagged.len() - skipped,
        failed,
        skipped,
        issues: summaries,
    };
    fight_db::record_parse_run(&conn, &summary)?;

    println!(
        "{CHECK} {} clean | {CROSS} {} flagged | {CROSS} {failed} failed | {} skipped",
        summary.clean, summary.flagged, summary.skipped
    );
    report_stats(&RunStats {
        elapsed: start.elapsed(),
        n_ops: Some(n_files),
        op_name: "fight".to_string(),
        successes: Some(summary.clean),
        failures: Some(summary.flagged + failed + skipped),
    });
    println!("{footer}");
    Ok(())
}

fn write_results(
    conn: &mut rusqlite::Connection,
    clean: &[FightParsingResult],
) -> Result<()> {
    println!("{}", create_header(HEADER_WIDTH, "ufc_fights", true, "-"));
    let fights: Vec<_> = clean
        .iter()
        .filter_map(|r| r.fight.as_ref())
        .map(|p| p.result.clone())
        .collect();
    if fights.is_empty() {
        println!("no fights to write");
        return Ok(());
    }
    let n_fights = fight_db::replace_fights(conn, &fights)?;
    println!("[n={n_fights:5}] writing records");

    println!("{}", create_header(HEADER_WIDTH, "ufc_fight_stats", true, "-"));
    let totals: Vec<_> = clean
        .iter()
        .filter_map(|r| r.total_stats.as_ref())
        .flat_map(|p| p.result.iter().cloned())
        .collect();
    let sig_stats: Vec<_> = clean
        .iter()
        .filter_map(|r| r.sig_stats.as_ref())
        .flat_map(|p| p.result.iter().cloned())
        .collect();
    let combined = fight_db::combine_round_stats(&totals, &sig_stats);
    let n_rows = fight_db::replace_round_stats(conn, &combined)?;
    println!("[n={n_rows:5}] writing records");
    Ok(())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn path_arg(name: &str) -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn parse_jobs() -> usize {
    std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .windows(2)
        .find(|pair| pair[0] == "--jobs")
        .and_then(|pair| pair[1].parse::<usize>().ok())
        .or_else(|| {
            std::env::var("PARSE_JOBS")
                .ok()
                .and_then(|val| val.parse::<usize>().ok())
        })
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(4)
        })
        .clamp(1, 64)
}
