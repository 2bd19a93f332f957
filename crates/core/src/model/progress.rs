use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::evaluation::AiEvaluation;
use crate::model::ids::LabId;
use crate::model::track::Track;

/// Persisted outcome of one completed lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub score: u32,
    pub user_prompt: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_evaluation: Option<AiEvaluation>,
}

impl LabResult {
    #[must_use]
    pub fn new(score: u32, user_prompt: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            score,
            user_prompt: user_prompt.into(),
            completed_at,
            ai_evaluation: None,
        }
    }
}

/// Learner progress across the whole course.
///
/// Completion and the aggregate total are derived from the per-lab entries, so a
/// lab is completed exactly when it has a recorded result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProgressDocument", into = "ProgressDocument")]
pub struct ProgressRecord {
    results: BTreeMap<LabId, LabResult>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the result for `lab_id`.
    pub fn record(&mut self, lab_id: LabId, result: LabResult) {
        self.results.insert(lab_id, result);
    }

    /// Attach an AI evaluation to an existing entry without touching its score.
    ///
    /// Returns `false` when the lab has no recorded result.
    pub fn attach_evaluation(&mut self, lab_id: LabId, evaluation: AiEvaluation) -> bool {
        match self.results.get_mut(&lab_id) {
            Some(entry) => {
                entry.ai_evaluation = Some(evaluation);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn result(&self, lab_id: LabId) -> Option<&LabResult> {
        self.results.get(&lab_id)
    }

    #[must_use]
    pub fn is_completed(&self, lab_id: LabId) -> bool {
        self.results.contains_key(&lab_id)
    }

    pub fn completed_labs(&self) -> impl Iterator<Item = LabId> + '_ {
        self.results.keys().copied()
    }

    pub fn results(&self) -> impl Iterator<Item = (LabId, &LabResult)> + '_ {
        self.results.iter().map(|(id, result)| (*id, result))
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Sum of every recorded lab score.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.results.values().map(|r| r.score).sum()
    }

    #[must_use]
    pub fn track_progress(&self, track: &Track) -> TrackProgress {
        let total = track.labs().len();
        let completed = track
            .labs()
            .iter()
            .filter(|id| self.is_completed(**id))
            .count();
        TrackProgress::new(completed, total)
    }
}

/// Completion counts for one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl TrackProgress {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            // Both values are tiny catalog counts.
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pct = ((completed as f64 / total as f64) * 100.0).round() as u32;
            pct
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.completed > 0
    }
}

//
// ─── PERSISTED SHAPE ───────────────────────────────────────────────────────────
//

/// On-disk document: `{ completedLabs, scores: { "<id>": entry }, totalScore }`.
///
/// `completedLabs` and `totalScore` are written for readers of the raw document but
/// recomputed from `scores` on load, which also drops keys that are not lab ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDocument {
    #[serde(default)]
    completed_labs: Vec<u32>,
    #[serde(default)]
    scores: BTreeMap<String, LabResult>,
    #[serde(default)]
    total_score: u32,
}

impl From<ProgressDocument> for ProgressRecord {
    fn from(doc: ProgressDocument) -> Self {
        let results = doc
            .scores
            .into_iter()
            .filter_map(|(key, result)| key.parse::<LabId>().ok().map(|id| (id, result)))
            .collect();
        Self { results }
    }
}

impl From<ProgressRecord> for ProgressDocument {
    fn from(record: ProgressRecord) -> Self {
        let total_score = record.total_score();
        Self {
            completed_labs: record.results.keys().map(LabId::value).collect(),
            scores: record
                .results
                .into_iter()
                .map(|(id, result)| (id.to_string(), result))
                .collect(),
            total_score,
        }
    }
}
