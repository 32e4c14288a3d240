//! Page fetching: event listings, per-event fight links, and fight-page
//! downloads with a retry loop and a write-success heuristic.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use once_cell::sync::{Lazy, OnceCell};
use rand::Rng;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::models::UfcEvent;
use crate::page;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const EVENTS_URL: &str = "http://www.ufcstats.com/statistics/events/completed";
pub const EVENT_DETAILS_URL: &str = "http://www.ufcstats.com/event-details";
pub const FIGHT_DETAILS_URL: &str = "http://www.ufcstats.com/fight-details";

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0")
            .build()
            .context("failed to build http client")
    })
}

static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));
static DATE_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.b-statistics__date").expect("static selector"));

/// One page to download and where to put it.
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    pub uid: String,
    pub description: &'static str,
    pub base_url: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScrapeWriteResult {
    pub uid: String,
    pub path: PathBuf,
    pub success: bool,
    pub attempts: usize,
}

/// Fetches the target's page and writes the body to disk.
pub fn dump_html(target: &ScrapeTarget) -> Result<()> {
    let url = format!("{}/{}", target.base_url, target.uid);
    let body = http_client()?
        .get(&url)
        .send()
        .with_context(|| format!("request {url}"))?
        .text()
        .with_context(|| format!("read body of {url}"))?;
    std::fs::write(&target.path, body)
        .with_context(|| format!("write {}", target.path.display()))?;
    Ok(())
}

const WRITE_ISSUE_INDICATORS: [&str; 3] =
    ["Internal Server Error", "Too Many Requests", "Search results"];
const MIN_EXPECTED_FILE_BYTES: u64 = 1024;

/// The site answers throttled or broken requests with HTTP 200 and an error
/// page, so success is judged from the written file's content and size.
pub fn check_write_success(target: &ScrapeTarget) -> bool {
    let Ok(contents) = std::fs::read_to_string(&target.path) else {
        return false;
    };
    let Ok(meta) = std::fs::metadata(&target.path) else {
        return false;
    };
    let file_too_small = meta.len() < MIN_EXPECTED_FILE_BYTES;
    let issues_exist =
        WRITE_ISSUE_INDICATORS.iter().any(|i| contents.contains(i)) || file_too_small;
    !issues_exist
}

const MAX_SCRAPE_ATTEMPTS: usize = 3;
const SLEEP_MULTIPLIER_INCREMENT: u64 = 10;

/// Downloads one page, re-trying with a growing jittered backoff until the
/// written file passes [`check_write_success`].
pub fn scrape_page(target: &ScrapeTarget) -> ScrapeWriteResult {
    let mut write_success = false;
    let mut attempts = 0;
    let mut sleep_multiplier: u64 = 0;
    let mut rng = rand::thread_rng();

    while !write_success && attempts < MAX_SCRAPE_ATTEMPTS {
        let ms_to_sleep = rng.gen_range(100 * sleep_multiplier..=200 * sleep_multiplier);
        std::thread::sleep(Duration::from_millis(ms_to_sleep));

        if let Err(err) = dump_html(target) {
            log::warn!("{} {}: {err}", target.description, target.uid);
        }

        write_success = check_write_success(target);
        sleep_multiplier += SLEEP_MULTIPLIER_INCREMENT;
        attempts += 1;
    }

    ScrapeWriteResult {
        uid: target.uid.clone(),
        path: target.path.clone(),
        success: write_success,
        attempts,
    }
}

/// Parses the completed-events listing into event records.
pub fn parse_event_listing(html: &str) -> Result<Vec<UfcEvent>> {
    let doc = Html::parse_document(html);
    let rows = page::table_rows(&doc, 0)?;

    let mut events: Vec<UfcEvent> = Vec::new();
    let mut unparsed: Vec<String> = Vec::new();
    for row in rows {
        let cells: Vec<_> = row.select(&TD).collect();
        if cells.len() != 2 {
            continue;
        }
        let Some(link) = row.select(&ANCHOR).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let event_uid = page::uid_from_href(href);
        let title = page::element_text(link);
        let event_location = page::element_text(cells[1]);

        let date_text = row
            .select(&DATE_SPAN)
            .next()
            .map(page::element_text)
            .unwrap_or_default();
        if date_text.is_empty() {
            unparsed.push(event_uid);
            continue;
        }
        let Ok(date) = NaiveDate::parse_from_str(&date_text, "%B %d, %Y") else {
            unparsed.push(event_uid);
            continue;
        };
        let event_date = date.format("%Y-%m-%d").to_string();

        if title.is_empty() || event_location.is_empty() {
            unparsed.push(event_uid);
            continue;
        }

        events.push(UfcEvent {
            event_uid,
            title,
            event_date,
            event_location,
            downloaded_ts: None,
        });
    }

    if !unparsed.is_empty() {
        bail!("{} unparsed events: {unparsed:?}", unparsed.len());
    }
    Ok(events)
}

/// Fetches one page of the completed-events listing, or the full archive.
pub fn fetch_events(all_events: bool, page_num: u32) -> Result<Vec<UfcEvent>> {
    let url = if all_events {
        format!("{EVENTS_URL}?page=all")
    } else {
        format!("{EVENTS_URL}?page={page_num}")
    };
    let body = http_client()?
        .get(&url)
        .send()
        .with_context(|| format!("request {url}"))?
        .text()
        .context("read events listing")?;
    parse_event_listing(&body)
}

/// Extracts the fight uids linked from an event page's bout table.
pub fn parse_fight_links(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let rows = page::table_rows(&doc, 0)?;

    let mut fight_uids: Vec<String> = Vec::new();
    for row in rows {
        let Some(href) = row
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .next()
        else {
            continue;
        };
        fight_uids.push(page::uid_from_href(href));
    }
    Ok(fight_uids)
}

/// Fetches an event page and returns the uids of its fights.
pub fn fetch_fight_uids(event_uid: &str) -> Result<Vec<String>> {
    let url = format!("{EVENT_DETAILS_URL}/{event_uid}");
    let body = http_client()?
        .get(&url)
        .send()
        .with_context(|| format!("request {url}"))?
        .text()
        .context("read event page")?;
    parse_fight_links(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body><table><tbody>
          <tr><th>Name</th><th>Location</th></tr>
          <tr>
            <td><a href="http://www.ufcstats.com/event-details/a390eb8a9b2df298">UFC 300</a>
                <span class="b-statistics__date">April 13, 2024</span></td>
            <td>Las Vegas, Nevada, USA</td>
          </tr>
          <tr>
            <td><a href="http://www.ufcstats.com/event-details/deadbeef00000001">UFC 299</a>
                <span class="b-statistics__date">March 9, 2024</span></td>
            <td>Miami, Florida, USA</td>
          </tr>
        </tbody></table></body></html>"#;

    #[test]
    fn event_listing_parses_rows() {
        let events = parse_event_listing(LISTING).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_uid, "a390eb8a9b2df298");
        assert_eq!(events[0].title, "UFC 300");
        assert_eq!(events[0].event_date, "2024-04-13");
        assert_eq!(events[0].event_location, "Las Vegas, Nevada, USA");
    }

    #[test]
    fn event_listing_rejects_missing_dates() {
        let html = r#"
            <table><tbody>
              <tr><td><a href="/event-details/x">X</a></td><td>Somewhere</td></tr>
            </tbody></table>"#;
        assert!(parse_event_listing(html).is_err());
    }

    #[test]
    fn fight_links_come_from_row_anchors() {
        let html = r#"
            <table><tbody>
              <tr><td>no link here</td></tr>
              <tr><td><a href="http://www.ufcstats.com/fight-details/6a060498e60756af">view</a></td></tr>
              <tr><td><a href="http://www.ufcstats.com/fight-details/00835554f95fa911">view</a></td></tr>
            </tbody></table>"#;
        let uids = parse_fight_links(html).unwrap();
        assert_eq!(uids, vec!["6a060498e60756af", "00835554f95fa911"]);
    }
}
