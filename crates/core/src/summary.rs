//! Course-wide statistics derived from stored progress.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::LabCatalog;
use crate::model::{LabId, ProgressRecord, TrackId, TrackProgress};

const PROMPT_EXCERPT_CHARS: usize = 200;

/// Mean AI grading per dimension, one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAverages {
    pub specificity: f64,
    pub completeness: f64,
    pub structure: f64,
    pub actionability: f64,
    pub output_control: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabScoreLine {
    pub lab_id: LabId,
    pub title: &'static str,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub track: TrackId,
    pub name: &'static str,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub total_minutes: u32,
    /// `None` until at least one lab of the track is scored.
    pub average_score: Option<u32>,
    pub labs: Vec<LabScoreLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub average_score: u32,
    pub completed: usize,
    pub lab_count: usize,
    pub is_complete: bool,
    pub dimensions: DimensionAverages,
    pub tracks: Vec<TrackSummary>,
}

impl CourseSummary {
    #[must_use]
    pub fn compute(catalog: &LabCatalog, progress: &ProgressRecord) -> Self {
        let scores: Vec<u32> = progress.results().map(|(_, r)| r.score).collect();

        let tracks = catalog
            .tracks()
            .map(|track| {
                let TrackProgress {
                    completed,
                    total,
                    percentage,
                } = progress.track_progress(track);
                let labs: Vec<LabScoreLine> = catalog
                    .get_track_labs(track.id())
                    .into_iter()
                    .filter_map(|lab| {
                        progress.result(lab.id()).map(|r| LabScoreLine {
                            lab_id: lab.id(),
                            title: lab.title(),
                            score: r.score,
                        })
                    })
                    .collect();
                let track_scores: Vec<u32> = labs.iter().map(|line| line.score).collect();
                TrackSummary {
                    track: track.id(),
                    name: track.name(),
                    completed,
                    total,
                    percentage,
                    total_minutes: catalog.track_total_minutes(track.id()),
                    average_score: rounded_mean(&track_scores),
                    labs,
                }
            })
            .collect();

        let lab_count = catalog.lab_count();
        let completed = catalog
            .all_labs()
            .filter(|lab| progress.is_completed(lab.id()))
            .count();

        Self {
            average_score: rounded_mean(&scores).unwrap_or(0),
            completed,
            lab_count,
            is_complete: lab_count > 0 && completed == lab_count,
            dimensions: dimension_averages(progress),
            tracks,
        }
    }

    /// Shown when no AI diagnostic is available.
    #[must_use]
    pub fn fallback_diagnostic(&self) -> String {
        format!(
            "Your overall score of {}/100 shows solid prompting fundamentals.\n\n\
             Focus on the techniques you used least often to improve your scores on future prompts.\n\n\
             Keep practicing - effective prompting is a skill that improves with repetition!",
            self.average_score
        )
    }

    /// Coaching request sent to the text model for a personalised diagnostic.
    #[must_use]
    pub fn diagnostic_prompt(&self, catalog: &LabCatalog, progress: &ProgressRecord) -> String {
        let mut prompt = format!(
            "You are an AI prompting coach writing a personalized assessment for a student who completed a {}-lab AI prompting course.\n\nPERFORMANCE BY LAB:\n",
            self.lab_count
        );

        for (lab_id, result) in progress.results() {
            let Some(lab) = catalog.get_lab(lab_id) else {
                continue;
            };
            let excerpt: String = result.user_prompt.chars().take(PROMPT_EXCERPT_CHARS).collect();
            let ellipsis = if result.user_prompt.chars().count() > PROMPT_EXCERPT_CHARS {
                "..."
            } else {
                ""
            };
            let feedback = result
                .ai_evaluation
                .as_ref()
                .map_or("N/A", |eval| eval.brief_feedback.as_str());
            let _ = write!(
                prompt,
                "\nLab: {} ({})\nScore: {}/100\nPrompt: \"{excerpt}{ellipsis}\"\nFeedback: {feedback}\n",
                lab.title(),
                lab.difficulty().as_str(),
                result.score,
            );
        }

        let d = &self.dimensions;
        let _ = write!(
            prompt,
            "\nAGGREGATED SCORES (0-10 scale):\n\
             - Specificity: {}\n\
             - Completeness: {}\n\
             - Structure: {}\n\
             - Actionability: {}\n\
             - Output Control: {}\n\n\
             Write a personalized 3-paragraph diagnostic (150 words total):\n\n\
             PARAGRAPH 1 - STRENGTHS: What did they do well? Be specific, reference actual labs.\n\
             PARAGRAPH 2 - OPPORTUNITY: Their biggest area for improvement. Pick ONE focus area.\n\
             PARAGRAPH 3 - NEXT STEP: ONE concrete, actionable tip for their next prompt.\n\n\
             Tone: Encouraging coach. Specific, not generic. Celebratory but honest.",
            d.specificity, d.completeness, d.structure, d.actionability, d.output_control,
        );
        prompt
    }
}

/// Mean rounded to the nearest integer, halves up.
fn rounded_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let n = u64::try_from(values.len()).ok()?;
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    u32::try_from((sum * 2 + n) / (2 * n)).ok()
}

/// Labs without an AI evaluation count as zero on every dimension.
fn dimension_averages(progress: &ProgressRecord) -> DimensionAverages {
    let count = progress.completed_count();
    if count == 0 {
        return DimensionAverages::default();
    }

    let mut sums = [0u32; 5];
    for (_, result) in progress.results() {
        if let Some(eval) = &result.ai_evaluation {
            let s = eval.scores;
            for (sum, value) in sums.iter_mut().zip([
                s.specificity,
                s.completeness,
                s.structure,
                s.actionability,
                s.output_control,
            ]) {
                *sum += u32::from(value);
            }
        }
    }

    let n = f64::from(u32::try_from(count).unwrap_or(u32::MAX));
    let avg = |sum: u32| (f64::from(sum) / n * 10.0).round() / 10.0;
    DimensionAverages {
        specificity: avg(sums[0]),
        completeness: avg(sums[1]),
        structure: avg(sums[2]),
        actionability: avg(sums[3]),
        output_control: avg(sums[4]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AiEvaluation, DimensionScores, LabResult};
    use crate::time::fixed_now;

    fn progress_with(scores: &[(u32, u32)]) -> ProgressRecord {
        let mut progress = ProgressRecord::new();
        for (id, score) in scores {
            progress.record(LabId::new(*id), LabResult::new(*score, "prompt", fixed_now()));
        }
        progress
    }

    #[test]
    fn empty_progress_summarises_to_zero() {
        let summary = CourseSummary::compute(LabCatalog::builtin(), &ProgressRecord::new());
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.lab_count, 6);
        assert!(!summary.is_complete);
        assert!(summary.tracks.iter().all(|t| t.average_score.is_none()));
    }

    #[test]
    fn averages_round_half_up() {
        let summary = CourseSummary::compute(LabCatalog::builtin(), &progress_with(&[(3, 78), (4, 51)]));
        // (78 + 51) / 2 = 64.5
        assert_eq!(summary.average_score, 65);
        let text = &summary.tracks[0];
        assert_eq!(text.track, TrackId::Text);
        assert_eq!(text.average_score, Some(65));
        assert_eq!(text.percentage, 100);
        assert_eq!(text.labs.len(), 2);
    }

    #[test]
    fn completion_requires_every_catalog_lab() {
        let all = progress_with(&[(1, 50), (2, 50), (3, 50), (4, 50), (5, 50), (6, 50)]);
        assert!(CourseSummary::compute(LabCatalog::builtin(), &all).is_complete);
    }

    #[test]
    fn dimension_averages_treat_missing_evaluations_as_zero() {
        let mut progress = progress_with(&[(3, 70), (4, 70), (5, 70)]);
        let mut eval = AiEvaluation::fallback();
        eval.scores = DimensionScores::clamped(8, 7, 6, 5, 4);
        progress.attach_evaluation(LabId::new(3), eval);
        progress.attach_evaluation(LabId::new(4), AiEvaluation::fallback());

        let d = CourseSummary::compute(LabCatalog::builtin(), &progress).dimensions;
        // (8 + 5 + 0) / 3 = 4.33
        assert!((d.specificity - 4.3).abs() < f64::EPSILON);
        assert!((d.output_control - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fallback_diagnostic_mentions_average() {
        let summary = CourseSummary::compute(LabCatalog::builtin(), &progress_with(&[(3, 80)]));
        assert!(summary
            .fallback_diagnostic()
            .starts_with("Your overall score of 80/100 shows solid prompting fundamentals."));
    }

    #[test]
    fn diagnostic_prompt_truncates_long_prompts() {
        let mut progress = ProgressRecord::new();
        progress.record(LabId::new(3), LabResult::new(60, "x".repeat(250), fixed_now()));
        let catalog = LabCatalog::builtin();
        let summary = CourseSummary::compute(catalog, &progress);
        let prompt = summary.diagnostic_prompt(catalog, &progress);
        assert!(prompt.contains(&format!("\"{}...\"", "x".repeat(200))));
        assert!(prompt.contains("Lab: Document Summarization (easy)"));
        assert!(prompt.contains("Feedback: N/A"));
    }
}
