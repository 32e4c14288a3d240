//! Batch-level grouping and reporting of non-fatal parsing issues.
//!
//! Identical issue strings are grouped across the batch, ranked by how many
//! fights they touched, and printed with a sample of affected uids. A fight
//! carrying any issue is dropped from the write batch; the summaries stay
//! inspectable for manual correction or a future retry.

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::models::FightParsingResult;
use crate::report::{HEADER_WIDTH, create_header};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub issue: String,
    pub uids: Vec<String>,
}

/// Groups every issue across all stages of the batch. Output is ordered by
/// affected-fight count, descending, ties by issue text for determinism.
pub fn summarize(results: &[FightParsingResult]) -> Vec<IssueSummary> {
    let mut summaries: Vec<IssueSummary> = Vec::new();
    for result in results {
        for issue in result.all_issues() {
            match summaries.iter_mut().find(|s| s.issue == issue) {
                Some(summary) => summary.uids.push(result.fight_uid.clone()),
                None => summaries.push(IssueSummary {
                    issue: issue.to_string(),
                    uids: vec![result.fight_uid.clone()],
                }),
            }
        }
    }
    summaries.sort_by(|a, b| b.uids.len().cmp(&a.uids.len()).then(a.issue.cmp(&b.issue)));
    summaries
}

const N_UIDS_SAMPLE: usize = 5;

pub fn print_summaries(summaries: &[IssueSummary]) {
    if summaries.is_empty() {
        return;
    }
    println!("{}", create_header(HEADER_WIDTH, "parsing issues", false, "."));

    let mut rng = rand::thread_rng();
    for summary in summaries {
        let n_uids = summary.uids.len();
        let mut uids: Vec<&String> = summary.uids.iter().collect();
        if uids.len() > N_UIDS_SAMPLE {
            uids = uids
                .choose_multiple(&mut rng, N_UIDS_SAMPLE)
                .copied()
                .collect();
        }

        let max_issue_len = HEADER_WIDTH - 20;
        let issue = if summary.issue.chars().count() > max_issue_len {
            let prefix: String = summary.issue.chars().take(max_issue_len).collect();
            format!("{prefix}...")
        } else {
            summary.issue.clone()
        };

        println!(
            "{}",
            create_header(HEADER_WIDTH, &format!("[n={n_uids:5}] {issue}"), false, "")
        );
        for uid in uids {
            println!("{uid}");
        }
    }
}

/// Splits a batch into clean results (eligible for writing) and flagged ones.
pub fn split_clean(
    results: Vec<FightParsingResult>,
) -> (Vec<FightParsingResult>, Vec<FightParsingResult>) {
    results.into_iter().partition(|r| r.is_clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fight, FightParsingResult, FightStyle, Parsed};

    fn clean_result(uid: &str) -> FightParsingResult {
        let fight = Fight {
            event_uid: "ev".to_string(),
            fight_uid: uid.to_string(),
            fight_style: FightStyle::Mma,
            fight_type: None,
            fight_division: None,
            fighter1_uid: "f1".to_string(),
            fighter2_uid: "f2".to_string(),
            fighter1_result: None,
            fighter2_result: None,
            decision: None,
            decision_round: None,
            decision_time_seconds: None,
            referee: None,
        };
        FightParsingResult {
            fight_uid: uid.to_string(),
            fight: Some(Parsed {
                uid: uid.to_string(),
                result: fight,
                issues: Vec::new(),
            }),
            total_stats: Some(Parsed {
                uid: uid.to_string(),
                result: Vec::new(),
                issues: Vec::new(),
            }),
            sig_stats: Some(Parsed {
                uid: uid.to_string(),
                result: Vec::new(),
                issues: Vec::new(),
            }),
            file_issues: Vec::new(),
        }
    }

    #[test]
    fn groups_identical_issues_across_fights() {
        let mut a = clean_result("a");
        a.fight.as_mut().unwrap().issues.push("bad label".to_string());
        let mut b = clean_result("b");
        b.sig_stats.as_mut().unwrap().issues.push("bad label".to_string());
        let mut c = clean_result("c");
        c.file_issues.push("other".to_string());

        let summaries = summarize(&[a, b, c]);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].issue, "bad label");
        assert_eq!(summaries[0].uids, vec!["a", "b"]);
        assert_eq!(summaries[1].uids, vec!["c"]);
    }

    #[test]
    fn one_issued_stage_flags_the_whole_fight() {
        let clean = clean_result("ok");
        let mut flagged = clean_result("bad");
        flagged
            .total_stats
            .as_mut()
            .unwrap()
            .issues
            .push("unrecognized".to_string());

        let (clean_out, flagged_out) = split_clean(vec![clean, flagged]);
        assert_eq!(clean_out.len(), 1);
        assert_eq!(clean_out[0].fight_uid, "ok");
        assert_eq!(flagged_out.len(), 1);
        assert_eq!(flagged_out[0].fight_uid, "bad");
    }

    #[test]
    fn skipped_results_are_not_clean() {
        let skipped = FightParsingResult::skipped("gone", "banner".to_string());
        assert!(!skipped.is_clean());
        assert!(skipped.was_skipped());
        assert_eq!(skipped.all_issues(), vec!["banner"]);
    }
}
