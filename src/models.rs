//! Shared record types and the closed vocabularies observed on fight pages.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightStyle {
    Mma,
    MuayThai,
    Bjj,
}

impl FightStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FightStyle::Mma => "MMA",
            FightStyle::MuayThai => "Muay Thai",
            FightStyle::Bjj => "Brazilian Jiu-Jitsu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightType {
    Bout,
    TitleBout,
}

impl FightType {
    pub fn as_str(self) -> &'static str {
        match self {
            FightType::Bout => "Bout",
            FightType::TitleBout => "Title Bout",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Bout" => Some(FightType::Bout),
            "Title Bout" => Some(FightType::TitleBout),
            _ => None,
        }
    }
}

/// Fight-ending method as printed on the page, post-normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Knockout,
    TechnicalKnockout,
    DoctorsStoppage,
    Submission,
    UnanimousDecision,
    SplitDecision,
    MajorityDecision,
    Draw,
    NoContest,
    Disqualification,
    Overturned,
    CouldNotContinue,
    Other,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Knockout => "Knockout",
            Decision::TechnicalKnockout => "Technical Knockout",
            Decision::DoctorsStoppage => "Doctor's Stoppage",
            Decision::Submission => "Submission",
            Decision::UnanimousDecision => "Decision - Unanimous",
            Decision::SplitDecision => "Decision - Split",
            Decision::MajorityDecision => "Decision - Majority",
            Decision::Draw => "Draw",
            Decision::NoContest => "No Contest",
            Decision::Disqualification => "Disqualification",
            Decision::Overturned => "Overturned",
            Decision::CouldNotContinue => "Could Not Continue",
            Decision::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Knockout" => Some(Decision::Knockout),
            "Technical Knockout" => Some(Decision::TechnicalKnockout),
            "Doctor's Stoppage" => Some(Decision::DoctorsStoppage),
            "Submission" => Some(Decision::Submission),
            "Decision - Unanimous" => Some(Decision::UnanimousDecision),
            "Decision - Split" => Some(Decision::SplitDecision),
            "Decision - Majority" => Some(Decision::MajorityDecision),
            "Draw" => Some(Decision::Draw),
            "No Contest" => Some(Decision::NoContest),
            "Disqualification" => Some(Decision::Disqualification),
            "Overturned" => Some(Decision::Overturned),
            "Could Not Continue" => Some(Decision::CouldNotContinue),
            "Other" => Some(Decision::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightResult {
    Win,
    Loss,
    NoContest,
    Disqualification,
    Draw,
}

impl FightResult {
    pub fn as_str(self) -> &'static str {
        match self {
            FightResult::Win => "Win",
            FightResult::Loss => "Loss",
            FightResult::NoContest => "No Contest",
            FightResult::Disqualification => "Disqualification",
            FightResult::Draw => "Draw",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Win" => Some(FightResult::Win),
            "Loss" => Some(FightResult::Loss),
            "No Contest" => Some(FightResult::NoContest),
            "Disqualification" => Some(FightResult::Disqualification),
            "Draw" => Some(FightResult::Draw),
            _ => None,
        }
    }
}

/// The sixteen weight divisions observed across the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    Strawweight,
    WomensStrawweight,
    Flyweight,
    WomensFlyweight,
    Bantamweight,
    WomensBantamweight,
    Featherweight,
    WomensFeatherweight,
    Lightweight,
    Welterweight,
    Middleweight,
    LightHeavyweight,
    Heavyweight,
    SuperHeavyweight,
    CatchWeight,
    OpenWeight,
}

impl Division {
    pub fn as_str(self) -> &'static str {
        match self {
            Division::Strawweight => "Strawweight",
            Division::WomensStrawweight => "Women's Strawweight",
            Division::Flyweight => "Flyweight",
            Division::WomensFlyweight => "Women's Flyweight",
            Division::Bantamweight => "Bantamweight",
            Division::WomensBantamweight => "Women's Bantamweight",
            Division::Featherweight => "Featherweight",
            Division::WomensFeatherweight => "Women's Featherweight",
            Division::Lightweight => "Lightweight",
            Division::Welterweight => "Welterweight",
            Division::Middleweight => "Middleweight",
            Division::LightHeavyweight => "Light Heavyweight",
            Division::Heavyweight => "Heavyweight",
            Division::SuperHeavyweight => "Super Heavyweight",
            Division::CatchWeight => "Catch Weight",
            Division::OpenWeight => "Open Weight",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Strawweight" => Some(Division::Strawweight),
            "Women's Strawweight" => Some(Division::WomensStrawweight),
            "Flyweight" => Some(Division::Flyweight),
            "Women's Flyweight" => Some(Division::WomensFlyweight),
            "Bantamweight" => Some(Division::Bantamweight),
            "Women's Bantamweight" => Some(Division::WomensBantamweight),
            "Featherweight" => Some(Division::Featherweight),
            "Women's Featherweight" => Some(Division::WomensFeatherweight),
            "Lightweight" => Some(Division::Lightweight),
            "Welterweight" => Some(Division::Welterweight),
            "Middleweight" => Some(Division::Middleweight),
            "Light Heavyweight" => Some(Division::LightHeavyweight),
            "Heavyweight" => Some(Division::Heavyweight),
            "Super Heavyweight" => Some(Division::SuperHeavyweight),
            "Catch Weight" => Some(Division::CatchWeight),
            "Open Weight" => Some(Division::OpenWeight),
            _ => None,
        }
    }
}

/// One fight's metadata record. Fighter order is fixed by the result table's
/// row order and must match the per-round stats extractions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fight {
    pub event_uid: String,
    pub fight_uid: String,
    pub fight_style: FightStyle,
    pub fight_type: Option<FightType>,
    pub fight_division: Option<Division>,
    pub fighter1_uid: String,
    pub fighter2_uid: String,
    pub fighter1_result: Option<FightResult>,
    pub fighter2_result: Option<FightResult>,
    pub decision: Option<Decision>,
    pub decision_round: Option<u32>,
    pub decision_time_seconds: Option<u32>,
    pub referee: Option<String>,
}

/// Per-fighter, per-round counts from the totals table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTotalStats {
    pub fight_uid: String,
    pub fighter_uid: String,
    pub round_num: u32,
    pub knockdowns: u32,
    pub total_strikes_landed: u32,
    pub total_strikes_attempted: u32,
    pub takedowns_landed: u32,
    pub takedowns_attempted: u32,
    pub submissions_attempted: u32,
    pub reversals: u32,
    pub control_time_seconds: Option<u32>,
}

/// Per-fighter, per-round significant-strike counts broken out by target
/// zone and range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSigStats {
    pub fight_uid: String,
    pub fighter_uid: String,
    pub round_num: u32,
    pub sig_strikes_landed: u32,
    pub sig_strikes_attempted: u32,
    pub sig_strikes_head_landed: u32,
    pub sig_strikes_head_attempted: u32,
    pub sig_strikes_body_landed: u32,
    pub sig_strikes_body_attempted: u32,
    pub sig_strikes_leg_landed: u32,
    pub sig_strikes_leg_attempted: u32,
    pub sig_strikes_distance_landed: u32,
    pub sig_strikes_distance_attempted: u32,
    pub sig_strikes_clinch_landed: u32,
    pub sig_strikes_clinch_attempted: u32,
    pub sig_strikes_ground_landed: u32,
    pub sig_strikes_ground_attempted: u32,
}

/// Storage-side join of totals and significant strikes on
/// (fight_uid, fighter_uid, round_num).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStats {
    pub fight_uid: String,
    pub fighter_uid: String,
    pub round_num: u32,
    pub knockdowns: u32,
    pub total_strikes_landed: u32,
    pub total_strikes_attempted: u32,
    pub takedowns_landed: u32,
    pub takedowns_attempted: u32,
    pub submissions_attempted: u32,
    pub reversals: u32,
    pub control_time_seconds: Option<u32>,
    pub sig_strikes_landed: u32,
    pub sig_strikes_attempted: u32,
    pub sig_strikes_head_landed: u32,
    pub sig_strikes_head_attempted: u32,
    pub sig_strikes_body_landed: u32,
    pub sig_strikes_body_attempted: u32,
    pub sig_strikes_leg_landed: u32,
    pub sig_strikes_leg_attempted: u32,
    pub sig_strikes_distance_landed: u32,
    pub sig_strikes_distance_attempted: u32,
    pub sig_strikes_clinch_landed: u32,
    pub sig_strikes_clinch_attempted: u32,
    pub sig_strikes_ground_landed: u32,
    pub sig_strikes_ground_attempted: u32,
}

/// One event from the completed-events listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UfcEvent {
    pub event_uid: String,
    pub title: String,
    pub event_date: String,
    pub event_location: String,
    pub downloaded_ts: Option<String>,
}

/// One extraction stage's output plus the non-fatal issues it accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub uid: String,
    pub result: T,
    pub issues: Vec<String>,
}

/// Per-page aggregate of the three extraction stages. A skipped page
/// (corrupt-file banner, wrong table count) carries `None` stages and the
/// reason under `file_issues`.
#[derive(Debug, Clone, PartialEq)]
pub struct FightParsingResult {
    pub fight_uid: String,
    pub fight: Option<Parsed<Fight>>,
    pub total_stats: Option<Parsed<Vec<RoundTotalStats>>>,
    pub sig_stats: Option<Parsed<Vec<RoundSigStats>>>,
    pub file_issues: Vec<String>,
}

impl FightParsingResult {
    pub fn skipped(fight_uid: &str, issue: String) -> Self {
        FightParsingResult {
            fight_uid: fight_uid.to_string(),
            fight: None,
            total_stats: None,
            sig_stats: None,
            file_issues: vec![issue],
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.fight.is_none()
    }

    /// Zero issues across every stage and the file level. Only clean fights
    /// reach the write batch; one issued stage excludes the whole fight.
    pub fn is_clean(&self) -> bool {
        self.file_issues.is_empty()
            && self.fight.as_ref().is_some_and(|p| p.issues.is_empty())
            && self.total_stats.as_ref().is_some_and(|p| p.issues.is_empty())
            && self.sig_stats.as_ref().is_some_and(|p| p.issues.is_empty())
    }

    pub fn all_issues(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.file_issues.iter().map(String::as_str).collect();
        for issues in [
            self.fight.as_ref().map(|p| &p.issues),
            self.total_stats.as_ref().map(|p| &p.issues),
            self.sig_stats.as_ref().map(|p| &p.issues),
        ]
        .into_iter()
        .flatten()
        {
            out.extend(issues.iter().map(String::as_str));
        }
        out
    }
}
