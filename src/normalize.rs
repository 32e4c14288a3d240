//! Text-cleaning rules that turn raw captured strings into typed values.
//!
//! Everything here is a pure function. Fatal lexical mismatches (a ratio
//! without its separator, a non-integer count) return [`ParseError`];
//! unrecognized vocabulary for the closed enums comes back as
//! [`Normalized::Unrecognized`] so the caller can record an issue and keep
//! the rest of the fight.

use crate::error::ParseError;
use crate::models::{Decision, Division, FightResult, FightType};

/// Outcome of matching free text against a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<T> {
    Recognized(T),
    Unrecognized { raw: String, issue: String },
}

impl<T: Copy> Normalized<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Normalized::Recognized(v) => Some(*v),
            Normalized::Unrecognized { .. } => None,
        }
    }

    /// Unwraps the recognized value, pushing the issue string otherwise.
    pub fn record(self, issues: &mut Vec<String>) -> Option<T> {
        match self {
            Normalized::Recognized(v) => Some(v),
            Normalized::Unrecognized { issue, .. } => {
                issues.push(issue);
                None
            }
        }
    }
}

/// Parses a stat like `"12 of 34"` into `(12, 34)`.
pub fn split_ratio(stat: &str, sep: &str) -> Result<(u32, u32), ParseError> {
    let token = format!(" {sep} ");
    let parts: Vec<&str> = stat.split(&token).collect();
    let [landed, attempted] = parts.as_slice() else {
        return Err(ParseError::format(format!(
            "cannot split '{stat}' on '{sep}'"
        )));
    };
    Ok((parse_count(landed)?, parse_count(attempted)?))
}

/// Parses `"M:SS"` into total seconds. The `"--"` placeholder means
/// not-applicable (e.g. no control time recorded) and maps to `None`.
pub fn parse_clock(text: &str) -> Result<Option<u32>, ParseError> {
    let text = text.trim();
    if text == "--" {
        return Ok(None);
    }
    let Some((minutes, seconds)) = text.split_once(':') else {
        return Err(ParseError::format(format!("expected M:SS, got '{text}'")));
    };
    Ok(Some(parse_count(minutes)? * 60 + parse_count(seconds)?))
}

/// Plain integer column value.
pub fn parse_count(text: &str) -> Result<u32, ParseError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ParseError::format(format!("expected integer, got '{text}'")))
}

/// Maps raw decision text onto [`Decision`]. Abbreviations are rewritten to
/// their long forms first; the order matters because "KO/TKO" and "TKO" both
/// contain "KO".
pub fn normalize_decision(raw: &str) -> Normalized<Decision> {
    let cleaned = raw
        .replace("KO/TKO", "TKO")
        .replace("TKO", "Technical Knockout")
        .replace("KO", "Knockout")
        .replace("DQ", "Disqualification");
    let cleaned = cleaned.trim();
    let label = if cleaned.contains("Doctor's Stoppage") {
        "Doctor's Stoppage"
    } else {
        cleaned
    };

    match Decision::from_label(label) {
        Some(decision) => Normalized::Recognized(decision),
        None => Normalized::Unrecognized {
            raw: raw.to_string(),
            issue: format!("'{label}' is not a recognized decision"),
        },
    }
}

/// Maps the short per-fighter result code (W/L/D/NC) onto [`FightResult`].
pub fn normalize_result(raw: &str) -> Normalized<FightResult> {
    let result = match raw.trim() {
        "W" => Some(FightResult::Win),
        "L" => Some(FightResult::Loss),
        "D" => Some(FightResult::Draw),
        "NC" => Some(FightResult::NoContest),
        other => FightResult::from_label(other),
    };

    match result {
        Some(result) => Normalized::Recognized(result),
        None => Normalized::Unrecognized {
            raw: raw.to_string(),
            issue: format!("'{}' is not a recognized fight result", raw.trim()),
        },
    }
}

/// Division and fight type recovered from a free-text fight title, plus any
/// issues hit along the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DivisionFightType {
    pub division: Option<Division>,
    pub fight_type: Option<FightType>,
    pub issues: Vec<String>,
}

/// Shape recovered by the token-count grammar before vocabulary lookup.
#[derive(Debug, PartialEq, Eq)]
enum TitleShape {
    Parsed { division: String, fight_type: String },
    Unhandled(String),
}

// Noise rewrites applied before tokenizing. Order matters: overlapping
// substrings ("Tournament Title" vs "Tournament", the apostrophe strip
// feeding the Womens repair) must run in this sequence.
const TITLE_REWRITES: &[(&str, &str)] = &[
    ("UFC", ""),
    ("Ultimate Fighter", ""),
    ("Ultimate", ""),
    ("Latin America", ""),
    ("Australia vs. UK", ""),
    ("TUF Nations Canada vs. Australia", ""),
    ("Japan", ""),
    ("Championship", "Title"),
    ("Superfight", "Open Weight"),
    ("Tournament Title", "Title"),
    ("Tournament", "Open Weight"),
    ("'", ""),
    ("Womens", "Women's"),
    ("Road To", ""),
    ("Road to", ""),
];

// Second pass, applied after digits are stripped.
const TITLE_REWRITES_AFTER_DIGITS: &[(&str, &str)] = &[
    ("Brazil", ""),
    ("China", ""),
    ("Interim", ""),
];

/// Recovers (weight division, fight type) from a fight-title string such as
/// `"UFC Women's Strawweight Title Bout"`.
///
/// The source site encodes both halves as unstructured prose; after noise
/// stripping, the token count is the only reliable disambiguator. The
/// 3-token branches cover the shapes observed in the archive; a novel
/// phrasing lands in the unhandled-case issue instead of a guess.
pub fn normalize_division_and_type(raw_title: &str) -> DivisionFightType {
    let mut cleaned = raw_title.to_string();
    for (pattern, replacement) in TITLE_REWRITES {
        cleaned = cleaned.replace(pattern, replacement);
    }
    let cleaned: String = cleaned.chars().filter(|c| !c.is_ascii_digit()).collect();
    let mut cleaned = cleaned.trim().to_string();
    for (pattern, replacement) in TITLE_REWRITES_AFTER_DIGITS {
        cleaned = cleaned.replace(pattern, replacement);
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let shape = match tokens.len() {
        4 => TitleShape::Parsed {
            division: tokens[..2].join(" "),
            fight_type: tokens[2..].join(" "),
        },
        3 => {
            if tokens.contains(&"Title") {
                TitleShape::Parsed {
                    division: tokens[0].to_string(),
                    fight_type: tokens[1..].join(" "),
                }
            } else if tokens[2] == "Bout" {
                TitleShape::Parsed {
                    division: tokens[..2].join(" "),
                    fight_type: tokens[2].to_string(),
                }
            } else {
                TitleShape::Unhandled(format!(
                    "unhandled 3-word division/fight type: {tokens:?}"
                ))
            }
        }
        2 => {
            if tokens == ["Title", "Bout"] {
                TitleShape::Parsed {
                    division: "Open Weight".to_string(),
                    fight_type: "Title Bout".to_string(),
                }
            } else {
                TitleShape::Parsed {
                    division: tokens[0].to_string(),
                    fight_type: tokens[1].to_string(),
                }
            }
        }
        n => TitleShape::Unhandled(format!(
            "unhandled division/fight type word count {n}: {tokens:?}"
        )),
    };

    let mut out = DivisionFightType::default();
    match shape {
        TitleShape::Unhandled(issue) => out.issues.push(issue),
        TitleShape::Parsed {
            division,
            fight_type,
        } => {
            out.division = match Division::from_label(&division) {
                Some(d) => Some(d),
                None => {
                    out.issues
                        .push(format!("'{division}' is not a recognized weight division"));
                    None
                }
            };
            out.fight_type = match FightType::from_label(&fight_type) {
                Some(t) => Some(t),
                None => {
                    out.issues
                        .push(format!("'{fight_type}' is not a recognized fight type"));
                    None
                }
            };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ratio_works() {
        assert_eq!(split_ratio("12 of 34", "of").unwrap(), (12, 34));
        assert_eq!(split_ratio("0 of 0", "of").unwrap(), (0, 0));
        assert!(split_ratio("12 vs 34", "of").is_err());
        assert!(split_ratio("12 of 34 of 56", "of").is_err());
        assert!(split_ratio("x of y", "of").is_err());
    }

    #[test]
    fn parse_clock_works() {
        assert_eq!(parse_clock("3:45").unwrap(), Some(225));
        assert_eq!(parse_clock("0:00").unwrap(), Some(0));
        assert_eq!(parse_clock("--").unwrap(), None);
        assert!(parse_clock("345").is_err());
        assert!(parse_clock("a:b").is_err());
    }

    #[test]
    fn decision_abbreviations_expand() {
        assert_eq!(
            normalize_decision("KO/TKO").value(),
            Some(Decision::TechnicalKnockout)
        );
        assert_eq!(normalize_decision("KO").value(), Some(Decision::Knockout));
        assert_eq!(
            normalize_decision("DQ").value(),
            Some(Decision::Disqualification)
        );
        assert_eq!(
            normalize_decision("Decision - Split").value(),
            Some(Decision::SplitDecision)
        );
        assert_eq!(
            normalize_decision("TKO - Doctor's Stoppage").value(),
            Some(Decision::DoctorsStoppage)
        );
    }

    #[test]
    fn decision_unknown_is_an_issue() {
        let norm = normalize_decision("Coin Toss");
        assert_eq!(norm.value(), None);
        let mut issues = Vec::new();
        assert_eq!(norm.record(&mut issues), None);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Coin Toss"));
    }

    #[test]
    fn result_codes_map() {
        assert_eq!(normalize_result("W").value(), Some(FightResult::Win));
        assert_eq!(normalize_result("L").value(), Some(FightResult::Loss));
        assert_eq!(normalize_result("D").value(), Some(FightResult::Draw));
        assert_eq!(normalize_result("NC").value(), Some(FightResult::NoContest));
        assert_eq!(normalize_result("X").value(), None);
    }

    #[test]
    fn division_two_words() {
        let parsed = normalize_division_and_type("UFC Heavyweight Bout");
        assert_eq!(parsed.division, Some(Division::Heavyweight));
        assert_eq!(parsed.fight_type, Some(FightType::Bout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_four_words() {
        let parsed = normalize_division_and_type("UFC Women's Strawweight Title Bout");
        assert_eq!(parsed.division, Some(Division::WomensStrawweight));
        assert_eq!(parsed.fight_type, Some(FightType::TitleBout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_apostrophe_variant_repaired() {
        let parsed = normalize_division_and_type("UFC Womens Bantamweight Bout");
        assert_eq!(parsed.division, Some(Division::WomensBantamweight));
        assert_eq!(parsed.fight_type, Some(FightType::Bout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_three_words_with_title() {
        let parsed = normalize_division_and_type("UFC Lightweight Title Bout");
        assert_eq!(parsed.division, Some(Division::Lightweight));
        assert_eq!(parsed.fight_type, Some(FightType::TitleBout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_three_words_trailing_bout() {
        let parsed = normalize_division_and_type("UFC Light Heavyweight Bout");
        assert_eq!(parsed.division, Some(Division::LightHeavyweight));
        assert_eq!(parsed.fight_type, Some(FightType::Bout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_three_words_unhandled() {
        let parsed = normalize_division_and_type("UFC Heavyweight Exhibition Match");
        assert_eq!(parsed.division, None);
        assert_eq!(parsed.fight_type, None);
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].contains("unhandled 3-word"));
    }

    #[test]
    fn division_bare_title_bout_is_open_weight() {
        let parsed = normalize_division_and_type("UFC Title Bout");
        assert_eq!(parsed.division, Some(Division::OpenWeight));
        assert_eq!(parsed.fight_type, Some(FightType::TitleBout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_superfight_rewrites_to_open_weight() {
        let parsed = normalize_division_and_type("UFC Superfight Championship Bout");
        assert_eq!(parsed.division, Some(Division::OpenWeight));
        assert_eq!(parsed.fight_type, Some(FightType::TitleBout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_noise_and_digits_stripped() {
        let parsed = normalize_division_and_type("UFC 229 Lightweight Title Bout");
        assert_eq!(parsed.division, Some(Division::Lightweight));
        assert_eq!(parsed.fight_type, Some(FightType::TitleBout));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn division_empty_after_stripping_is_an_issue() {
        let parsed = normalize_division_and_type("UFC 2");
        assert_eq!(parsed.division, None);
        assert_eq!(parsed.fight_type, None);
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].contains("word count 0"));
    }

    #[test]
    fn division_unknown_vocabulary_is_an_issue() {
        let parsed = normalize_division_and_type("UFC Cruiserweight Bout");
        assert_eq!(parsed.division, None);
        assert_eq!(parsed.fight_type, Some(FightType::Bout));
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].contains("Cruiserweight"));
    }
}
