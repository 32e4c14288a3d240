//! Fight-page extraction: metadata, round totals and significant strikes.
//!
//! All three extractors are pure functions over an already-parsed document.
//! Unknown vocabulary accumulates on the stage's issue list; broken page
//! structure or malformed values abort the fight with a [`ParseError`].

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::files::FileContents;
use crate::models::{
    Fight, FightParsingResult, FightStyle, Parsed, RoundSigStats, RoundTotalStats,
};
use crate::normalize::{
    normalize_decision, normalize_division_and_type, normalize_result, parse_clock, parse_count,
    split_ratio,
};
use crate::page;
use crate::report::{HEADER_WIDTH, create_header};

/// Column headers the totals table must carry, in order. Column order
/// determines field mapping, so any mismatch is fatal for the fight.
pub const TOTALS_COLS: [&str; 10] = [
    "Fighter",
    "KD",
    "Sig. str.",
    "Sig. str. %",
    "Total str.",
    "Td",
    "Td %",
    "Sub. att",
    "Rev.",
    "Ctrl",
];

/// Column headers the significant-strikes table must carry, in order.
pub const SIG_STATS_COLS: [&str; 9] = [
    "Fighter",
    "Sig. str",
    "Sig. str. %",
    "Head",
    "Body",
    "Leg",
    "Distance",
    "Clinch",
    "Ground",
];

/// Site error banners that mean the file can never be parsed.
const FILE_ERROR_BANNERS: [&str; 1] = ["Round-by-round stats not currently available."];

/// A well-formed fight page carries the result table, the two per-round
/// tables and the whole-fight significant-strikes table.
const EXPECTED_TABLE_COUNT: usize = 4;

static TABLE_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.b-fight-details__table-text").expect("static selector"));
static PERSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.b-fight-details__person").expect("static selector"));
static ITALIC: Lazy<Selector> = Lazy::new(|| Selector::parse("i").expect("static selector"));
static DETAIL_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("i.b-fight-details__label").expect("static selector"));
static DETAIL_TEXT_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("i.b-fight-details__text-item").expect("static selector"));
static DECISION_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"i[style="font-style: normal"]"#).expect("static selector"));
static FIGHT_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("i.b-fight-details__fight-title").expect("static selector"));

/// One fighter's raw cell values for one round, aligned with the schema
/// minus its leading Fighter column (the uid comes from the link instead).
struct RoundRow {
    fighter_uid: String,
    values: Vec<String>,
}

/// Looks a value up by schema column name. Positions are re-derived from the
/// schema on every call rather than hardcoded as offsets.
fn column<'a>(schema: &[&str], row: &'a RoundRow, name: &str) -> Result<&'a str, ParseError> {
    let idx = schema
        .iter()
        .position(|col| *col == name)
        .ok_or_else(|| ParseError::format(format!("column '{name}' missing from schema")))?;
    idx.checked_sub(1)
        .and_then(|i| row.values.get(i))
        .map(String::as_str)
        .ok_or_else(|| ParseError::format(format!("no value captured for column '{name}'")))
}

/// Splits one round's row group into the two per-fighter value rows.
///
/// The cells interleave the two fighters' values: even positions belong to
/// the first fighter, odd to the second. Fighter order within the group is
/// fixed by the order of the two identifier links.
fn round_rows(group: ElementRef<'_>, schema: &[&str]) -> Result<[RoundRow; 2], ParseError> {
    let hrefs = page::anchor_hrefs(group);
    let [f1_href, f2_href] = hrefs.as_slice() else {
        return Err(ParseError::structure(format!(
            "expected two fighter links per round row, got {}",
            hrefs.len()
        )));
    };

    let vals: Vec<String> = group.select(&TABLE_TEXT).map(page::element_text).collect();
    let f1_vals: Vec<String> = vals.iter().step_by(2).cloned().collect();
    let f2_vals: Vec<String> = vals.iter().skip(1).step_by(2).cloned().collect();
    if f1_vals.len() != schema.len() || f2_vals.len() != schema.len() {
        return Err(ParseError::format(format!(
            "expecting {} columns, got {} values",
            schema.len(),
            vals.len()
        )));
    }

    Ok([
        RoundRow {
            fighter_uid: page::uid_from_href(f1_href),
            values: f1_vals[1..].to_vec(),
        },
        RoundRow {
            fighter_uid: page::uid_from_href(f2_href),
            values: f2_vals[1..].to_vec(),
        },
    ])
}

/// Fails unless the observed header row equals the expected schema exactly.
fn check_header(doc: &Html, table_num: usize, expected: &[&str]) -> Result<(), ParseError> {
    let actual = page::header_cells(doc, table_num)?;
    if actual != expected {
        return Err(ParseError::structure(format!(
            "table {table_num} header mismatch: expected {expected:?}, got {actual:?}"
        )));
    }
    Ok(())
}

/// Extracts one [`RoundTotalStats`] per (fighter, round) from the per-round
/// totals table. Round numbers come from row position, 1-based; the page has
/// no round-number column.
pub fn parse_round_totals(
    doc: &Html,
    fight_uid: &str,
) -> Result<Parsed<Vec<RoundTotalStats>>, ParseError> {
    check_header(doc, 0, &TOTALS_COLS)?;

    let groups = page::table_rows(doc, 1)?;
    let mut totals = Vec::with_capacity(groups.len() * 2);
    for (i, group) in groups.into_iter().enumerate() {
        let round_num = (i + 1) as u32;
        for row in round_rows(group, &TOTALS_COLS)? {
            let (total_strikes_landed, total_strikes_attempted) =
                split_ratio(column(&TOTALS_COLS, &row, "Total str.")?, "of")?;
            let (takedowns_landed, takedowns_attempted) =
                split_ratio(column(&TOTALS_COLS, &row, "Td")?, "of")?;
            totals.push(RoundTotalStats {
                fight_uid: fight_uid.to_string(),
                fighter_uid: row.fighter_uid.clone(),
                round_num,
                knockdowns: parse_count(column(&TOTALS_COLS, &row, "KD")?)?,
                total_strikes_landed,
                total_strikes_attempted,
                takedowns_landed,
                takedowns_attempted,
                submissions_attempted: parse_count(column(&TOTALS_COLS, &row, "Sub. att")?)?,
                reversals: parse_count(column(&TOTALS_COLS, &row, "Rev.")?)?,
                control_time_seconds: parse_clock(column(&TOTALS_COLS, &row, "Ctrl")?)?,
            });
        }
    }

    Ok(Parsed {
        uid: fight_uid.to_string(),
        result: totals,
        issues: Vec::new(),
    })
}

/// Extracts one [`RoundSigStats`] per (fighter, round) from the per-round
/// significant-strikes table.
pub fn parse_sig_stats(
    doc: &Html,
    fight_uid: &str,
) -> Result<Parsed<Vec<RoundSigStats>>, ParseError> {
    check_header(doc, 2, &SIG_STATS_COLS)?;

    let groups = page::table_rows(doc, 3)?;
    let mut stats = Vec::with_capacity(groups.len() * 2);
    for (i, group) in groups.into_iter().enumerate() {
        let round_num = (i + 1) as u32;
        for row in round_rows(group, &SIG_STATS_COLS)? {
            let ratio = |name: &str| -> Result<(u32, u32), ParseError> {
                split_ratio(column(&SIG_STATS_COLS, &row, name)?, "of")
            };
            let (sig_strikes_landed, sig_strikes_attempted) = ratio("Sig. str")?;
            let (sig_strikes_head_landed, sig_strikes_head_attempted) = ratio("Head")?;
            let (sig_strikes_body_landed, sig_strikes_body_attempted) = ratio("Body")?;
            let (sig_strikes_leg_landed, sig_strikes_leg_attempted) = ratio("Leg")?;
            let (sig_strikes_distance_landed, sig_strikes_distance_attempted) =
                ratio("Distance")?;
            let (sig_strikes_clinch_landed, sig_strikes_clinch_attempted) = ratio("Clinch")?;
            let (sig_strikes_ground_landed, sig_strikes_ground_attempted) = ratio("Ground")?;

            stats.push(RoundSigStats {
                fight_uid: fight_uid.to_string(),
                fighter_uid: row.fighter_uid.clone(),
                round_num,
                sig_strikes_landed,
                sig_strikes_attempted,
                sig_strikes_head_landed,
                sig_strikes_head_attempted,
                sig_strikes_body_landed,
                sig_strikes_body_attempted,
                sig_strikes_leg_landed,
                sig_strikes_leg_attempted,
                sig_strikes_distance_landed,
                sig_strikes_distance_attempted,
                sig_strikes_clinch_landed,
                sig_strikes_clinch_attempted,
                sig_strikes_ground_landed,
                sig_strikes_ground_attempted,
            });
        }
    }

    Ok(Parsed {
        uid: fight_uid.to_string(),
        result: stats,
        issues: Vec::new(),
    })
}

/// Extracts the fight-level record: fighter identities and results, decision
/// method/round/time, referee, and the division/type recovered from the
/// free-text fight title.
pub fn parse_fight_details(
    doc: &Html,
    event_uid: &str,
    fight_uid: &str,
) -> Result<Parsed<Fight>, ParseError> {
    let mut issues: Vec<String> = Vec::new();

    let rows = page::table_rows(doc, 0)?;
    let first_row = rows
        .first()
        .ok_or_else(|| ParseError::structure("fight result table has no rows"))?;
    let hrefs = page::anchor_hrefs(*first_row);
    let [f1_href, f2_href] = hrefs.as_slice() else {
        return Err(ParseError::structure(format!(
            "expected exactly two fighter links, got {}",
            hrefs.len()
        )));
    };
    let fighter1_uid = page::uid_from_href(f1_href);
    let fighter2_uid = page::uid_from_href(f2_href);

    let persons: Vec<ElementRef<'_>> = doc.select(&PERSON).collect();
    let [person1, person2] = persons.as_slice() else {
        return Err(ParseError::structure(format!(
            "expected two fighter result blocks, got {}",
            persons.len()
        )));
    };
    let result_code = |person: &ElementRef<'_>| -> Result<String, ParseError> {
        person
            .select(&ITALIC)
            .next()
            .map(page::element_text)
            .ok_or_else(|| ParseError::structure("fighter result block has no status marker"))
    };
    let fighter1_result = normalize_result(&result_code(person1)?).record(&mut issues);
    let fighter2_result = normalize_result(&result_code(person2)?).record(&mut issues);

    // The first label is the decision method, which has its own node below;
    // the rest pair positionally with the detail text items.
    let detail_headers: Vec<String> = doc
        .select(&DETAIL_LABEL)
        .skip(1)
        .map(|el| page::element_text(el).replace(':', "").trim().to_string())
        .collect();
    let detail_values: Vec<String> = doc
        .select(&DETAIL_TEXT_ITEM)
        .map(|el| {
            let text = page::element_text(el);
            match text.rsplit_once(": ") {
                Some((_, value)) => value.to_string(),
                None => text,
            }
        })
        .collect();
    let detail = |name: &str| -> Option<&str> {
        detail_headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| detail_values.get(i))
            .map(String::as_str)
    };

    let decision_round = match detail("Round") {
        Some(value) => Some(parse_count(value)?),
        None => None,
    };
    let decision_time_seconds = match detail("Time") {
        Some(value) => parse_clock(value)?,
        None => None,
    };
    let referee = detail("Referee").map(str::to_string);

    let decision = doc
        .select(&DECISION_TEXT)
        .next()
        .map(page::element_text)
        .and_then(|raw| normalize_decision(&raw).record(&mut issues));

    // Untitled fights carry no title node at all; that is not an issue.
    let (fight_division, fight_type) = match doc.select(&FIGHT_TITLE).next() {
        Some(title) => {
            let parsed = normalize_division_and_type(&page::element_text(title));
            issues.extend(parsed.issues);
            (parsed.division, parsed.fight_type)
        }
        None => (None, None),
    };

    let fight = Fight {
        event_uid: event_uid.to_string(),
        fight_uid: fight_uid.to_string(),
        fight_style: FightStyle::Mma,
        fight_type,
        fight_division,
        fighter1_uid,
        fighter2_uid,
        fighter1_result,
        fighter2_result,
        decision,
        decision_round,
        decision_time_seconds,
        referee,
    };

    Ok(Parsed {
        uid: fight_uid.to_string(),
        result: fight,
        issues,
    })
}

/// Pre-extraction corruption checks. A known site-error banner means the
/// file will never parse, so the source file is deleted on the spot; a wrong
/// table count marks an incomplete scrape. Both skip the fight with the
/// reason as its sole issue.
fn check_file_issues(contents: &FileContents, doc: &Html) -> Option<FightParsingResult> {
    let fight_text = page::page_text(doc);
    for banner in FILE_ERROR_BANNERS {
        if fight_text.contains(banner) {
            println!("[deleting {}] - {banner}", contents.uid);
            if let Err(err) = std::fs::remove_file(&contents.path) {
                log::warn!("could not delete {}: {err}", contents.path.display());
            }
            return Some(FightParsingResult::skipped(&contents.uid, banner.to_string()));
        }
    }

    let n_tables = page::table_count(doc);
    if n_tables != EXPECTED_TABLE_COUNT {
        return Some(FightParsingResult::skipped(
            &contents.uid,
            format!("unhandled number of tables: {n_tables}"),
        ));
    }
    None
}

/// Parses one fight page end to end: corruption pre-checks, then the three
/// extraction stages with independently retained issue lists.
pub fn parse_fight(contents: &FileContents) -> Result<FightParsingResult, ParseError> {
    if contents.file_num % 100 == 0 {
        let title = format!(
            "[{:05} / {:05}]",
            contents.file_num,
            contents.n_files.saturating_sub(1)
        );
        println!("{}", create_header(HEADER_WIDTH, &title, false, "."));
    }

    let doc = Html::parse_document(&contents.contents);
    if let Some(skipped) = check_file_issues(contents, &doc) {
        return Ok(skipped);
    }

    let event_uid = page::event_uid(&doc)?;
    let fight = parse_fight_details(&doc, &event_uid, &contents.uid)?;
    let total_stats = parse_round_totals(&doc, &contents.uid)?;
    let sig_stats = parse_sig_stats(&doc, &contents.uid)?;

    Ok(FightParsingResult {
        fight_uid: contents.uid.clone(),
        fight: Some(fight),
        total_stats: Some(total_stats),
        sig_stats: Some(sig_stats),
        file_issues: Vec::new(),
    })
}
