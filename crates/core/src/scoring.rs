//! Deterministic prompt scoring.
//!
//! A score is a pure function of the submitted prompt, the lab, elapsed time and
//! whether the hint was used. Wall-clock sampling happens in the caller.

use serde::Serialize;

use crate::model::LabDefinition;

pub const BASE_SCORE: u32 = 50;
pub const KEYWORD_POINTS: u32 = 5;
pub const KEYWORD_CAP: u32 = 30;
pub const TIME_BONUS_MAX: u32 = 20;
pub const HINT_PENALTY: u32 = 10;
pub const MAX_SCORE: u32 = 100;

/// Lowest score a hint can push a submission down to.
///
/// Equal to the base score: using the hint costs bonus points, never the points
/// every submission earns.
pub const HINT_FLOOR: u32 = BASE_SCORE;

/// Every component that went into a final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: u32,
    pub base: u32,
    pub keyword_score: u32,
    pub matched_keywords: Vec<String>,
    pub time_bonus: u32,
    pub elapsed_secs: u64,
    pub hint_penalty: u32,
}

/// Score a submission.
///
/// `elapsed_secs` must come from wall-clock timestamps, not from counting ticks.
#[must_use]
pub fn score_submission(
    prompt: &str,
    lab: &LabDefinition,
    elapsed_secs: u64,
    hint_used: bool,
) -> ScoreBreakdown {
    let matched_keywords = keyword_matches(prompt, lab.keywords());
    let matched = u32::try_from(matched_keywords.len()).unwrap_or(u32::MAX);
    let keyword_score = matched.saturating_mul(KEYWORD_POINTS).min(KEYWORD_CAP);
    let time_bonus = time_bonus(lab.time_limit_secs(), elapsed_secs);

    let mut score = BASE_SCORE + keyword_score + time_bonus;
    let hint_penalty = if hint_used {
        score = score.saturating_sub(HINT_PENALTY).max(HINT_FLOOR);
        HINT_PENALTY
    } else {
        0
    };

    ScoreBreakdown {
        total: score.min(MAX_SCORE),
        base: BASE_SCORE,
        keyword_score,
        matched_keywords,
        time_bonus,
        elapsed_secs,
        hint_penalty,
    }
}

/// Keywords that occur in `prompt`, compared case-insensitively as substrings.
#[must_use]
pub fn keyword_matches(prompt: &str, keywords: &[&str]) -> Vec<String> {
    let haystack = prompt.to_lowercase();
    keywords
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .map(|kw| (*kw).to_string())
        .collect()
}

/// `round(max(0, (limit - elapsed) / limit) * 20)`, rounding halves up.
#[must_use]
pub fn time_bonus(time_limit_secs: u32, elapsed_secs: u64) -> u32 {
    if time_limit_secs == 0 {
        return 0;
    }
    let limit = u64::from(time_limit_secs);
    let remaining = limit.saturating_sub(elapsed_secs);
    let bonus = (remaining * u64::from(TIME_BONUS_MAX) * 2 + limit) / (2 * limit);
    u32::try_from(bonus).unwrap_or(TIME_BONUS_MAX)
}
