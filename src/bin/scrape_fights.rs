//! Downloads fight pages for every event not yet fetched.
//!
//! Each event page lists its bouts; every bout page is downloaded with the
//! retry loop and checked with the write-success heuristic. Files that still
//! look broken after the retries are deleted so the next run tries again.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use octagon_stats::fight_db;
use octagon_stats::report::{
    CROSS, DOWN_ARROW, HEADER_WIDTH, RunStats, create_header, report_stats,
};
use octagon_stats::scrape::{self, FIGHT_DETAILS_URL, ScrapeTarget};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let start = Instant::now();
    println!("{}", create_header(HEADER_WIDTH, "FIGHT SCRAPER", true, "="));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let force = args.iter().any(|arg| arg == "--force");
    let db_path = args
        .windows(2)
        .find(|pair| pair[0] == "--db")
        .map(|pair| PathBuf::from(&pair[1]))
        .unwrap_or_else(fight_db::default_db_path);
    let base_dir = args
        .windows(2)
        .find(|pair| pair[0] == "--data-dir")
        .map(|pair| PathBuf::from(&pair[1]))
        .or_else(|| std::env::var("OCTAGON_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data").join("raw").join("fights"));
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("create {}", base_dir.display()))?;

    let conn = fight_db::open_db(&db_path)?;
    let event_uids = fight_db::events_to_download(&conn, force)?;
    if event_uids.is_empty() {
        println!("no events to download. exiting early");
        return Ok(());
    }

    let downloaded: HashSet<String> = std::fs::read_dir(&base_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let stem = path.file_stem()?.to_str()?;
            // <event_uid>_<fight_uid>.html
            stem.rsplit_once('_').map(|(_, fight)| fight.to_string())
        })
        .collect();

    let n_events = event_uids.len();
    let mut successes = 0usize;
    let mut failures = 0usize;
    for (i, event_uid) in event_uids.iter().enumerate() {
        let header_title = format!("[{:03}/{:03}] {event_uid}", i + 1, n_events);

        let fight_uids = match scrape::fetch_fight_uids(event_uid) {
            Ok(uids) => uids,
            Err(err) => {
                failures += 1;
                log::warn!("event {event_uid}: {err}");
                continue;
            }
        };

        let targets: Vec<ScrapeTarget> = fight_uids
            .iter()
            .filter(|uid| !downloaded.contains(*uid))
            .map(|uid| ScrapeTarget {
                uid: uid.clone(),
                description: "fight",
                base_url: FIGHT_DETAILS_URL,
                path: base_dir.join(format!("{event_uid}_{uid}.html")),
            })
            .collect();

        if targets.is_empty() {
            println!("{}", create_header(HEADER_WIDTH, &header_title, false, "."));
            fight_db::mark_event_downloaded(&conn, event_uid)?;
            successes += 1;
            continue;
        }

        let write_results: Vec<_> = targets.iter().map(scrape::scrape_page).collect();
        let bad_writes: Vec<_> = write_results.iter().filter(|w| !w.success).collect();
        let fights_downloaded = write_results.len() - bad_writes.len();

        let results = format!(
            "{DOWN_ARROW} {fights_downloaded:02} | {CROSS} {:02}",
            bad_writes.len()
        );
        println!(
            "{}",
            create_header(HEADER_WIDTH, &format!("{header_title} | {results}"), false, " ")
        );

        for bad_write in &bad_writes {
            println!("deleting {}", bad_write.uid);
            if let Err(err) = std::fs::remove_file(&bad_write.path) {
                log::warn!("could not delete {}: {err}", bad_write.path.display());
            }
        }

        if bad_writes.is_empty() {
            fight_db::mark_event_downloaded(&conn, event_uid)?;
            successes += 1;
        } else {
            failures += 1;
        }
    }

    report_stats(&RunStats {
        elapsed: start.elapsed(),
        n_ops: Some(n_events),
        op_name: "event".to_string(),
        successes: Some(successes),
        failures: Some(failures),
    });
    println!("{}", create_header(HEADER_WIDTH, "", true, "="));
    Ok(())
}
