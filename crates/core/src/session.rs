//! Lab session state machine.
//!
//! `LabSession` owns the state of the one lab currently open and never performs
//! I/O. Every transition returns the [`Instruction`]s a driver must carry out
//! (start or stop the countdown, persist a result, request AI generation, redraw).
//! Asynchronous results come back through [`LabSession::complete_generation`]
//! tagged with the generation they were requested for.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{AiEvaluation, LabDefinition, LabId, LabResult};
use crate::scoring::{ScoreBreakdown, score_submission};
use crate::time::elapsed_secs;

/// Prompt recorded when the countdown expires before anything was typed.
pub const NO_PROMPT_PLACEHOLDER: &str = "[No prompt submitted]";

pub const EMPTY_PROMPT_WARNING: &str = "Please enter a prompt before submitting.";

const WARNING_THRESHOLD_SECS: u32 = 30;
const DANGER_THRESHOLD_SECS: u32 = 15;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Briefing,
    Active,
    Loading,
    Results,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Briefing => "briefing",
            Phase::Active => "active",
            Phase::Loading => "loading",
            Phase::Results => "results",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerUrgency {
    Normal,
    Warning,
    Danger,
}

impl TimerUrgency {
    #[must_use]
    pub fn from_remaining(remaining_secs: u32) -> Self {
        if remaining_secs <= DANGER_THRESHOLD_SECS {
            TimerUrgency::Danger
        } else if remaining_secs <= WARNING_THRESHOLD_SECS {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Normal
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no lab is loaded")]
    NoLab,

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },
}

//
// ─── INSTRUCTIONS ──────────────────────────────────────────────────────────────
//

/// Side effect requested by a session transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    ShowPhase(Phase),
    StartTimer { generation: u64, seconds: u32 },
    StopTimer,
    UpdateTimer {
        remaining_secs: u32,
        urgency: TimerUrgency,
    },
    HideHint,
    RevealHint(&'static str),
    Warn(&'static str),
    PersistResult { lab_id: LabId, result: LabResult },
    RequestGeneration(GenerationPlan),
    ShowResults(ResultsView),
}

/// Work the driver must perform before the session can show results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub generation: u64,
    pub lab_id: LabId,
    pub user_prompt: String,
    pub kind: GenerationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationKind {
    /// Transform the lab's before image with the learner's prompt.
    Image { input_image: &'static str },
    /// Run the learner's prompt and the expert prompt side by side.
    TextComparison { expert_prompt: &'static str },
}

/// Outcome of one generation request, rendered inline in its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SlotOutput {
    Text(String),
    /// A `data:` URL.
    Image(String),
    Failed(String),
}

impl SlotOutput {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, SlotOutput::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutputs {
    pub user: SlotOutput,
    pub expert: Option<SlotOutput>,
    pub evaluation: Option<AiEvaluation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Comparison {
    Image {
        before: &'static str,
        target: &'static str,
        generated: SlotOutput,
    },
    Text {
        user: SlotOutput,
        expert: SlotOutput,
    },
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub lab_id: LabId,
    pub title: &'static str,
    pub score: ScoreBreakdown,
    pub user_prompt: String,
    pub expert_prompt: &'static str,
    pub takeaways: &'static [&'static str],
    pub comparison: Option<Comparison>,
    pub evaluation: Option<AiEvaluation>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct LabSession {
    lab: Option<LabDefinition>,
    evaluator_configured: bool,
    phase: Phase,
    generation: u64,
    remaining_secs: u32,
    started_at: Option<DateTime<Utc>>,
    timer_running: bool,
    hint_used: bool,
    draft: String,
    submitted_prompt: Option<String>,
    score: Option<ScoreBreakdown>,
    outputs: Option<GenerationOutputs>,
}

impl LabSession {
    #[must_use]
    pub fn new(evaluator_configured: bool) -> Self {
        Self {
            lab: None,
            evaluator_configured,
            phase: Phase::Briefing,
            generation: 0,
            remaining_secs: 0,
            started_at: None,
            timer_running: false,
            hint_used: false,
            draft: String::new(),
            submitted_prompt: None,
            score: None,
            outputs: None,
        }
    }

    /// Takes effect from the next submission.
    pub fn set_evaluator_configured(&mut self, configured: bool) {
        self.evaluator_configured = configured;
    }

    /// Open `lab`, discarding whatever session was in progress.
    ///
    /// Bumps the generation so timer ticks and AI results that belong to the
    /// previous session are ignored when they arrive.
    pub fn load(&mut self, lab: LabDefinition) -> Vec<Instruction> {
        let mut out = Vec::new();
        if self.timer_running {
            out.push(Instruction::StopTimer);
        }

        let generation = self.generation.wrapping_add(1);
        let evaluator_configured = self.evaluator_configured;
        *self = Self::new(evaluator_configured);
        self.generation = generation;
        self.remaining_secs = lab.time_limit_secs();
        self.lab = Some(lab);

        out.push(Instruction::ShowPhase(Phase::Briefing));
        out
    }

    /// Start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoLab` before a lab is loaded and
    /// `SessionError::InvalidTransition` outside the briefing phase.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<Vec<Instruction>, SessionError> {
        let lab = self.lab.as_ref().ok_or(SessionError::NoLab)?;
        if self.phase != Phase::Briefing {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: Phase::Active,
            });
        }

        let seconds = lab.time_limit_secs();
        self.hint_used = false;
        self.remaining_secs = seconds;
        self.started_at = Some(now);
        self.timer_running = true;
        self.phase = Phase::Active;

        Ok(vec![
            Instruction::HideHint,
            Instruction::ShowPhase(Phase::Active),
            Instruction::StartTimer {
                generation: self.generation,
                seconds,
            },
            Instruction::UpdateTimer {
                remaining_secs: seconds,
                urgency: TimerUrgency::from_remaining(seconds),
            },
        ])
    }

    /// Replace the prompt being typed. Ignored outside the active phase.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        if self.phase == Phase::Active {
            self.draft = text.into();
        }
    }

    pub fn use_hint(&mut self) -> Vec<Instruction> {
        if self.phase != Phase::Active || self.hint_used {
            return Vec::new();
        }
        let Some(lab) = self.lab.as_ref() else {
            return Vec::new();
        };
        self.hint_used = true;
        vec![Instruction::RevealHint(lab.hint())]
    }

    /// One countdown tick from the timer started for `generation`.
    ///
    /// Reaching zero stops the timer and forces a submission.
    pub fn tick(&mut self, generation: u64, now: DateTime<Utc>) -> Vec<Instruction> {
        if generation != self.generation || self.phase != Phase::Active || !self.timer_running {
            return Vec::new();
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let mut out = vec![Instruction::UpdateTimer {
            remaining_secs: self.remaining_secs,
            urgency: TimerUrgency::from_remaining(self.remaining_secs),
        }];
        if self.remaining_secs == 0 {
            out.extend(self.auto_submit(now));
        }
        out
    }

    /// Learner-initiated submission.
    ///
    /// A blank prompt produces a warning and leaves the session untouched. Any call
    /// after the session has already submitted is a no-op.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Vec<Instruction> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        let prompt = self.draft.trim();
        if prompt.is_empty() {
            return vec![Instruction::Warn(EMPTY_PROMPT_WARNING)];
        }
        let prompt = prompt.to_string();
        self.finish_submission(prompt, now)
    }

    /// Submission forced by the countdown; blank drafts become the placeholder.
    pub fn auto_submit(&mut self, now: DateTime<Utc>) -> Vec<Instruction> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        let prompt = match self.draft.trim() {
            "" => NO_PROMPT_PLACEHOLDER.to_string(),
            text => text.to_string(),
        };
        self.finish_submission(prompt, now)
    }

    /// Deliver AI outputs requested for `generation`.
    ///
    /// Outputs for an older generation, or arriving outside the loading phase,
    /// are dropped.
    pub fn complete_generation(
        &mut self,
        generation: u64,
        outputs: GenerationOutputs,
    ) -> Vec<Instruction> {
        if generation != self.generation || self.phase != Phase::Loading {
            return Vec::new();
        }
        self.outputs = Some(outputs);
        self.phase = Phase::Results;

        let mut out = vec![Instruction::ShowPhase(Phase::Results)];
        out.extend(self.results_view().map(Instruction::ShowResults));
        out
    }

    fn finish_submission(&mut self, prompt: String, now: DateTime<Utc>) -> Vec<Instruction> {
        let Some(lab) = self.lab.as_ref() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if self.timer_running {
            self.timer_running = false;
            out.push(Instruction::StopTimer);
        }

        let elapsed = self
            .started_at
            .map_or(0, |started| elapsed_secs(started, now));
        let breakdown = score_submission(&prompt, lab, elapsed, self.hint_used);
        let lab_id = lab.id();

        out.push(Instruction::PersistResult {
            lab_id,
            result: LabResult::new(breakdown.total, prompt.clone(), now),
        });

        let plan = self.evaluator_configured.then(|| GenerationPlan {
            generation: self.generation,
            lab_id,
            user_prompt: prompt.clone(),
            kind: match lab.images() {
                Some(images) if lab.is_image_transformation() => GenerationKind::Image {
                    input_image: images.before,
                },
                _ => GenerationKind::TextComparison {
                    expert_prompt: lab.expert_prompt(),
                },
            },
        });

        self.submitted_prompt = Some(prompt);
        self.score = Some(breakdown);

        match plan {
            Some(plan) => {
                self.phase = Phase::Loading;
                out.push(Instruction::ShowPhase(Phase::Loading));
                out.push(Instruction::RequestGeneration(plan));
            }
            None => {
                self.phase = Phase::Results;
                out.push(Instruction::ShowPhase(Phase::Results));
                out.extend(self.results_view().map(Instruction::ShowResults));
            }
        }
        out
    }

    /// The results screen, once a submission has been scored.
    #[must_use]
    pub fn results_view(&self) -> Option<ResultsView> {
        let lab = self.lab.as_ref()?;
        let score = self.score.clone()?;
        let user_prompt = self.submitted_prompt.clone()?;

        let comparison = self.outputs.as_ref().map(|outputs| match lab.images() {
            Some(images) if lab.is_image_transformation() => Comparison::Image {
                before: images.before,
                target: images.after,
                generated: outputs.user.clone(),
            },
            _ => Comparison::Text {
                user: outputs.user.clone(),
                expert: outputs
                    .expert
                    .clone()
                    .unwrap_or_else(|| SlotOutput::Failed("No expert output".to_string())),
            },
        });

        Some(ResultsView {
            lab_id: lab.id(),
            title: lab.title(),
            score,
            user_prompt,
            expert_prompt: lab.expert_prompt(),
            takeaways: lab.takeaways(),
            comparison,
            evaluation: self
                .outputs
                .as_ref()
                .and_then(|outputs| outputs.evaluation.clone()),
        })
    }

    #[must_use]
    pub fn lab(&self) -> Option<&LabDefinition> {
        self.lab.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer_running
    }

    #[must_use]
    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn draft_char_count(&self) -> usize {
        self.draft.chars().count()
    }

    #[must_use]
    pub fn submitted_prompt(&self) -> Option<&str> {
        self.submitted_prompt.as_deref()
    }

    #[must_use]
    pub fn score(&self) -> Option<&ScoreBreakdown> {
        self.score.as_ref()
    }
}

impl Default for LabSession {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{LabType, TrackId};
    use crate::time::fixed_now;

    fn text_lab() -> LabDefinition {
        LabDefinition::builder(LabId::new(3), "Summaries", TrackId::Text, LabType::Text)
            .time_limit_secs(90)
            .keywords(&["white background", "professional"])
            .expert_prompt("expert")
            .hint("think harder")
            .build()
            .unwrap()
    }

    fn image_lab() -> LabDefinition {
        LabDefinition::builder(LabId::new(1), "Van", TrackId::Marketing, LabType::Image)
            .images("before.webp", "after.webp", true)
            .expert_prompt("expert image")
            .build()
            .unwrap()
    }

    fn active(configured: bool, lab: LabDefinition) -> LabSession {
        let mut session = LabSession::new(configured);
        session.load(lab);
        session.begin(fixed_now()).unwrap();
        session
    }

    fn persisted(out: &[Instruction]) -> Vec<&LabResult> {
        out.iter()
            .filter_map(|i| match i {
                Instruction::PersistResult { result, .. } => Some(result),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn begin_requires_a_loaded_lab() {
        let mut session = LabSession::default();
        assert_eq!(session.begin(fixed_now()), Err(SessionError::NoLab));
    }

    #[test]
    fn begin_starts_timer_for_current_generation() {
        let mut session = LabSession::new(false);
        session.load(text_lab());
        let out = session.begin(fixed_now()).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        assert!(out.contains(&Instruction::StartTimer {
            generation: 1,
            seconds: 90
        }));
        assert!(out.contains(&Instruction::HideHint));

        let err = session.begin(fixed_now()).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: Phase::Active,
                to: Phase::Active
            }
        );
    }

    #[test]
    fn manual_submit_without_evaluator_goes_straight_to_results() {
        let mut session = active(false, text_lab());
        session.update_draft("  I want a professional shot with white background ");
        let out = session.submit(fixed_now() + Duration::seconds(10));

        assert_eq!(out.first(), Some(&Instruction::StopTimer));
        let results = persisted(&out);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 78);
        assert_eq!(
            results[0].user_prompt,
            "I want a professional shot with white background"
        );
        assert_eq!(session.phase(), Phase::Results);

        let view = session.results_view().unwrap();
        assert!(view.comparison.is_none());
        assert!(out.contains(&Instruction::ShowResults(view)));
    }

    #[test]
    fn blank_manual_submit_only_warns() {
        let mut session = active(false, text_lab());
        session.update_draft("   ");
        let out = session.submit(fixed_now());
        assert_eq!(out, vec![Instruction::Warn(EMPTY_PROMPT_WARNING)]);
        assert_eq!(session.phase(), Phase::Active);
        assert!(session.is_timer_running());
    }

    #[test]
    fn draft_length_counts_characters() {
        let mut session = active(false, text_lab());
        session.update_draft("résumé ✓");
        assert_eq!(session.draft_char_count(), 8);
    }

    #[test]
    fn second_submission_is_a_no_op() {
        let mut session = active(false, text_lab());
        session.update_draft("professional");
        assert_eq!(persisted(&session.submit(fixed_now())).len(), 1);
        assert!(session.submit(fixed_now()).is_empty());
        assert!(session.auto_submit(fixed_now()).is_empty());
        assert!(session.tick(session.generation(), fixed_now()).is_empty());
    }

    #[test]
    fn countdown_expiry_auto_submits_placeholder() {
        let mut session = active(false, text_lab());
        let generation = session.generation();
        let mut out = Vec::new();
        for second in 1..=90 {
            out = session.tick(generation, fixed_now() + Duration::seconds(second));
        }
        assert_eq!(session.remaining_secs(), 0);
        assert!(!session.is_timer_running());
        let results = persisted(&out);
        assert_eq!(results[0].user_prompt, NO_PROMPT_PLACEHOLDER);
        assert_eq!(results[0].score, 50);
        assert_eq!(session.phase(), Phase::Results);
    }

    #[test]
    fn expiry_submits_the_typed_draft() {
        let mut session = active(false, text_lab());
        session.update_draft("professional");
        session.remaining_secs = 1;
        let out = session.tick(session.generation(), fixed_now() + Duration::seconds(90));
        assert_eq!(persisted(&out)[0].user_prompt, "professional");
    }

    #[test]
    fn urgency_follows_thresholds() {
        assert_eq!(TimerUrgency::from_remaining(31), TimerUrgency::Normal);
        assert_eq!(TimerUrgency::from_remaining(30), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_remaining(16), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_remaining(15), TimerUrgency::Danger);
    }

    #[test]
    fn ticks_from_an_old_generation_are_ignored() {
        let mut session = active(false, text_lab());
        let stale = session.generation();
        session.load(text_lab());
        session.begin(fixed_now()).unwrap();
        assert!(session.tick(stale, fixed_now()).is_empty());
        assert_eq!(session.remaining_secs(), 90);
    }

    #[test]
    fn reload_stops_running_timer_and_resets() {
        let mut session = active(false, text_lab());
        session.update_draft("draft");
        session.use_hint();
        let out = session.load(image_lab());
        assert_eq!(
            out,
            vec![
                Instruction::StopTimer,
                Instruction::ShowPhase(Phase::Briefing)
            ]
        );
        assert_eq!(session.phase(), Phase::Briefing);
        assert!(!session.hint_used());
        assert_eq!(session.draft(), "");
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn hint_reveals_once_and_only_while_active() {
        let mut session = LabSession::new(false);
        session.load(text_lab());
        assert!(session.use_hint().is_empty());

        session.begin(fixed_now()).unwrap();
        assert_eq!(session.use_hint(), vec![Instruction::RevealHint("think harder")]);
        assert!(session.use_hint().is_empty());
        assert!(session.hint_used());
    }

    #[test]
    fn configured_evaluator_requests_text_comparison() {
        let mut session = active(true, text_lab());
        session.update_draft("summarize it");
        let out = session.submit(fixed_now());
        assert_eq!(session.phase(), Phase::Loading);

        let plan = out
            .iter()
            .find_map(|i| match i {
                Instruction::RequestGeneration(plan) => Some(plan.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(plan.generation, session.generation());
        assert_eq!(
            plan.kind,
            GenerationKind::TextComparison {
                expert_prompt: "expert"
            }
        );

        let out = session.complete_generation(
            plan.generation,
            GenerationOutputs {
                user: SlotOutput::Text("mine".into()),
                expert: Some(SlotOutput::Failed("quota".into())),
                evaluation: Some(AiEvaluation::fallback()),
            },
        );
        assert_eq!(session.phase(), Phase::Results);
        let view = session.results_view().unwrap();
        assert_eq!(
            view.comparison,
            Some(Comparison::Text {
                user: SlotOutput::Text("mine".into()),
                expert: SlotOutput::Failed("quota".into()),
            })
        );
        assert!(out.contains(&Instruction::ShowResults(view)));
    }

    #[test]
    fn image_lab_requests_transformation_of_before_image() {
        let mut session = active(true, image_lab());
        session.update_draft("make it shine");
        let out = session.submit(fixed_now());
        assert!(out.iter().any(|i| matches!(
            i,
            Instruction::RequestGeneration(GenerationPlan {
                kind: GenerationKind::Image {
                    input_image: "before.webp"
                },
                ..
            })
        )));

        session.complete_generation(
            session.generation(),
            GenerationOutputs {
                user: SlotOutput::Image("data:image/png;base64,AA==".into()),
                expert: None,
                evaluation: None,
            },
        );
        assert!(matches!(
            session.results_view().unwrap().comparison,
            Some(Comparison::Image {
                target: "after.webp",
                ..
            })
        ));
    }

    #[test]
    fn stale_generation_results_are_discarded() {
        let mut session = active(true, text_lab());
        session.update_draft("first");
        session.submit(fixed_now());
        let stale = session.generation();

        session.load(image_lab());
        let out = session.complete_generation(
            stale,
            GenerationOutputs {
                user: SlotOutput::Text("late".into()),
                expert: None,
                evaluation: None,
            },
        );
        assert!(out.is_empty());
        assert_eq!(session.phase(), Phase::Briefing);
        assert!(session.results_view().is_none());
    }
}
