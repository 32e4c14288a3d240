//! Downloads the completed-events listing and upserts the events table.

use anyhow::Result;

use octagon_stats::fight_db;
use octagon_stats::report::{HEADER_WIDTH, create_header};
use octagon_stats::scrape;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    println!("{}", create_header(HEADER_WIDTH, "EVENT SCRAPER", true, "="));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let all_events = args.iter().any(|arg| arg == "--all");
    let page_num = args
        .windows(2)
        .find(|pair| pair[0] == "--page")
        .and_then(|pair| pair[1].parse::<u32>().ok())
        .unwrap_or(1);
    let db_path = args
        .windows(2)
        .find(|pair| pair[0] == "--db")
        .map(|pair| pair[1].clone().into())
        .unwrap_or_else(fight_db::default_db_path);

    let events = scrape::fetch_events(all_events, page_num)?;
    println!("[n={:5}] events fetched", events.len());

    let mut conn = fight_db::open_db(&db_path)?;
    let n_written = fight_db::upsert_events(&mut conn, &events)?;
    println!("[n={n_written:5}] events upserted");
    println!("{}", create_header(HEADER_WIDTH, "", true, "="));
    Ok(())
}
