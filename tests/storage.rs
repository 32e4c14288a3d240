use rusqlite::Connection;

use octagon_stats::fight_db::{
    ParseRunSummary, combine_round_stats, events_to_download, init_schema, mark_event_downloaded,
    parsed_fight_uids, record_parse_run, replace_fights, replace_round_stats, upsert_events,
};
use octagon_stats::models::{
    Decision, Division, Fight, FightResult, FightStyle, FightType, RoundSigStats, RoundTotalStats,
    UfcEvent,
};

fn test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite");
    init_schema(&conn).expect("schema");
    conn
}

fn sample_fight(fight_uid: &str) -> Fight {
    Fight {
        event_uid: "ev1".to_string(),
        fight_uid: fight_uid.to_string(),
        fight_style: FightStyle::Mma,
        fight_type: Some(FightType::Bout),
        fight_division: Some(Division::Lightweight),
        fighter1_uid: "f1".to_string(),
        fighter2_uid: "f2".to_string(),
        fighter1_result: Some(FightResult::Win),
        fighter2_result: Some(FightResult::Loss),
        decision: Some(Decision::Submission),
        decision_round: Some(2),
        decision_time_seconds: Some(154),
        referee: Some("Marc Goddard".to_string()),
    }
}

fn sample_totals(fight_uid: &str, fighter_uid: &str, round_num: u32) -> RoundTotalStats {
    RoundTotalStats {
        fight_uid: fight_uid.to_string(),
        fighter_uid: fighter_uid.to_string(),
        round_num,
        knockdowns: 0,
        total_strikes_landed: 20,
        total_strikes_attempted: 40,
        takedowns_landed: 1,
        takedowns_attempted: 2,
        submissions_attempted: 0,
        reversals: 0,
        control_time_seconds: Some(65),
    }
}

fn sample_sig(fight_uid: &str, fighter_uid: &str, round_num: u32) -> RoundSigStats {
    RoundSigStats {
        fight_uid: fight_uid.to_string(),
        fighter_uid: fighter_uid.to_string(),
        round_num,
        sig_strikes_landed: 10,
        sig_strikes_attempted: 25,
        sig_strikes_head_landed: 6,
        sig_strikes_head_attempted: 18,
        sig_strikes_body_landed: 3,
        sig_strikes_body_attempted: 5,
        sig_strikes_leg_landed: 1,
        sig_strikes_leg_attempted: 2,
        sig_strikes_distance_landed: 8,
        sig_strikes_distance_attempted: 22,
        sig_strikes_clinch_landed: 2,
        sig_strikes_clinch_attempted: 3,
        sig_strikes_ground_landed: 0,
        sig_strikes_ground_attempted: 0,
    }
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).expect("count query")
}

#[test]
fn replacing_fights_is_idempotent() {
    let mut conn = test_db();
    replace_fights(&mut conn, &[sample_fight("fa"), sample_fight("fb")]).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM ufc_fights"), 2);

    let mut updated = sample_fight("fa");
    updated.referee = Some("Dan Miragliotta".to_string());
    replace_fights(&mut conn, &[updated]).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM ufc_fights"), 2);

    let referee: String = conn
        .query_row(
            "SELECT referee FROM ufc_fights WHERE fight_uid = 'fa'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(referee, "Dan Miragliotta");

    let uids = parsed_fight_uids(&conn).unwrap();
    assert!(uids.contains("fa") && uids.contains("fb"));
}

#[test]
fn stats_join_matches_on_the_round_key() {
    let totals = vec![
        sample_totals("fa", "f1", 1),
        sample_totals("fa", "f2", 1),
        sample_totals("fa", "f1", 2),
    ];
    // No totals row for (fa, f2, 2): that sig row must drop out of the join.
    let sig = vec![
        sample_sig("fa", "f1", 1),
        sample_sig("fa", "f2", 1),
        sample_sig("fa", "f1", 2),
        sample_sig("fa", "f2", 2),
    ];

    let combined = combine_round_stats(&totals, &sig);
    assert_eq!(combined.len(), 3);
    assert_eq!(combined[0].fighter_uid, "f1");
    assert_eq!(combined[0].round_num, 1);
    assert_eq!(combined[1].round_num, 2);
    assert_eq!(combined[2].fighter_uid, "f2");
    assert_eq!(combined[0].total_strikes_landed, 20);
    assert_eq!(combined[0].sig_strikes_landed, 10);
}

#[test]
fn replacing_round_stats_replaces_prior_rows() {
    let mut conn = test_db();
    let totals = vec![sample_totals("fa", "f1", 1), sample_totals("fa", "f2", 1)];
    let sig = vec![sample_sig("fa", "f1", 1), sample_sig("fa", "f2", 1)];
    let combined = combine_round_stats(&totals, &sig);

    replace_round_stats(&mut conn, &combined).unwrap();
    replace_round_stats(&mut conn, &combined).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM ufc_fight_stats"), 2);
}

#[test]
fn event_upsert_keeps_download_timestamps() {
    let mut conn = test_db();
    let event = UfcEvent {
        event_uid: "ev1".to_string(),
        title: "UFC 300".to_string(),
        event_date: "2024-04-13".to_string(),
        event_location: "Las Vegas, Nevada, USA".to_string(),
        downloaded_ts: None,
    };
    upsert_events(&mut conn, std::slice::from_ref(&event)).unwrap();
    assert_eq!(events_to_download(&conn, false).unwrap(), vec!["ev1"]);

    mark_event_downloaded(&conn, "ev1").unwrap();
    assert!(events_to_download(&conn, false).unwrap().is_empty());
    assert_eq!(events_to_download(&conn, true).unwrap(), vec!["ev1"]);

    // Re-upserting the listing must not clear the download marker.
    upsert_events(&mut conn, &[event]).unwrap();
    assert!(events_to_download(&conn, false).unwrap().is_empty());
}

#[test]
fn parse_runs_are_recorded() {
    let conn = test_db();
    record_parse_run(
        &conn,
        &ParseRunSummary {
            started_at: "2024-04-13T00:00:00+00:00".to_string(),
            finished_at: "2024-04-13T00:05:00+00:00".to_string(),
            files_total: 10,
            clean: 8,
            flagged: 1,
            failed: 1,
            skipped: 0,
            issues: Vec::new(),
        },
    )
    .unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM parse_runs"), 1);
}
