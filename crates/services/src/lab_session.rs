use std::sync::Arc;

use tracing::{debug, info, warn};

use lab_core::LabCatalog;
use lab_core::model::{AiEvaluation, LabId};
use lab_core::session::{GenerationKind, GenerationOutputs, GenerationPlan, SlotOutput};
use lab_core::{Instruction, LabSession, Phase};
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::ai::{GenerativeAiClient, TextRequest, evaluate_prompt};
use crate::documents::{DocumentLoader, LabDocument};
use crate::error::{AiClientError, LabSessionError};
use crate::timer::Tick;

/// Instructions left for the presentation layer after storage side effects ran.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepOutcome {
    pub instructions: Vec<Instruction>,
    /// Generation work the caller must run and feed back with
    /// [`LabSessionService::finish_generation`].
    pub pending: Option<GenerationPlan>,
}

/// Drives a [`LabSession`] against storage and the generative AI client.
#[derive(Clone)]
pub struct LabSessionService {
    clock: Clock,
    catalog: &'static LabCatalog,
    progress: Arc<dyn ProgressRepository>,
    ai: Arc<dyn GenerativeAiClient>,
    documents: DocumentLoader,
}

impl LabSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: &'static LabCatalog,
        progress: Arc<dyn ProgressRepository>,
        ai: Arc<dyn GenerativeAiClient>,
        documents: DocumentLoader,
    ) -> Self {
        Self {
            clock,
            catalog,
            progress,
            ai,
            documents,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'static LabCatalog {
        self.catalog
    }

    #[must_use]
    pub fn new_session(&self) -> LabSession {
        LabSession::new(self.ai.is_configured())
    }

    /// Load `lab_id` into `session`, abandoning whatever was in progress.
    ///
    /// # Errors
    ///
    /// Returns `LabSessionError::UnknownLab` if the catalog has no such lab.
    pub fn open(
        &self,
        session: &mut LabSession,
        lab_id: LabId,
    ) -> Result<StepOutcome, LabSessionError> {
        let lab = self
            .catalog
            .get_lab(lab_id)
            .ok_or(LabSessionError::UnknownLab(lab_id))?;
        session.set_evaluator_configured(self.ai.is_configured());
        let instructions = session.load(lab.clone());
        debug!(lab_id = %lab_id, generation = session.generation(), "lab opened");
        Ok(StepOutcome {
            instructions,
            pending: None,
        })
    }

    /// Start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `LabSessionError::Session` if no lab is loaded or the session
    /// already left the briefing phase.
    pub fn begin(&self, session: &mut LabSession) -> Result<StepOutcome, LabSessionError> {
        let instructions = session.begin(self.clock.now())?;
        debug!(generation = session.generation(), "lab started");
        Ok(StepOutcome {
            instructions,
            pending: None,
        })
    }

    #[must_use]
    pub fn use_hint(&self, session: &mut LabSession) -> StepOutcome {
        StepOutcome {
            instructions: session.use_hint(),
            pending: None,
        }
    }

    /// Apply one countdown tick; the final tick auto-submits.
    pub async fn tick(&self, session: &mut LabSession, tick: Tick) -> StepOutcome {
        let instructions = session.tick(tick.generation, self.clock.now());
        self.process(instructions).await
    }

    pub async fn submit(&self, session: &mut LabSession) -> StepOutcome {
        let instructions = session.submit(self.clock.now());
        self.process(instructions).await
    }

    pub async fn auto_submit(&self, session: &mut LabSession) -> StepOutcome {
        let instructions = session.auto_submit(self.clock.now());
        self.process(instructions).await
    }

    /// Run every AI request a submission needs.
    ///
    /// Slots fail independently; a failed slot carries its error text. Nothing
    /// is written here: outputs only reach storage through
    /// [`Self::finish_generation`].
    pub async fn run_generation(&self, plan: &GenerationPlan) -> GenerationOutputs {
        let Some(lab) = self.catalog.get_lab(plan.lab_id) else {
            return GenerationOutputs {
                user: SlotOutput::Failed(format!("Error: unknown lab {}", plan.lab_id)),
                expert: None,
                evaluation: None,
            };
        };

        let (user, expert, evaluation) = match plan.kind {
            GenerationKind::Image { input_image } => {
                let (user, evaluation) = tokio::join!(
                    self.generate_image_slot(&plan.user_prompt, input_image),
                    evaluate_prompt(self.ai.as_ref(), lab, &plan.user_prompt),
                );
                (user, None, evaluation)
            }
            GenerationKind::TextComparison { expert_prompt } => {
                let context = self.documents.context_for(lab).await;
                let (user, expert, evaluation) = tokio::join!(
                    self.generate_text_slot(&plan.user_prompt, context.as_deref()),
                    self.generate_text_slot(expert_prompt, context.as_deref()),
                    evaluate_prompt(self.ai.as_ref(), lab, &plan.user_prompt),
                );
                (user, Some(expert), evaluation)
            }
        };

        GenerationOutputs {
            user,
            expert,
            evaluation: Some(evaluation),
        }
    }

    /// Hand finished outputs back to the session.
    ///
    /// Outputs for a generation the session has moved past are dropped
    /// without touching storage. Accepted outputs attach their evaluation to
    /// the stored result.
    pub async fn finish_generation(
        &self,
        session: &mut LabSession,
        generation: u64,
        outputs: GenerationOutputs,
    ) -> StepOutcome {
        if generation != session.generation() || session.phase() != Phase::Loading {
            debug!(
                generation,
                current = session.generation(),
                phase = %session.phase(),
                "discarding stale generation"
            );
            return StepOutcome::default();
        }

        let evaluation = outputs.evaluation.clone();
        let instructions = session.complete_generation(generation, outputs);
        if let (Some(lab), Some(evaluation)) = (session.lab(), evaluation) {
            self.store_evaluation(lab.id(), evaluation).await;
        }
        self.process(instructions).await
    }

    /// Submit, then run any generation and deliver it, in one call.
    pub async fn submit_and_wait(&self, session: &mut LabSession) -> StepOutcome {
        let mut outcome = self.submit(session).await;
        if let Some(plan) = outcome.pending.take() {
            let outputs = self.run_generation(&plan).await;
            let finished = self.finish_generation(session, plan.generation, outputs).await;
            outcome.instructions.extend(finished.instructions);
        }
        outcome
    }

    /// The reference document of `lab_id`, read for display.
    pub async fn lab_document(&self, lab_id: LabId) -> Option<LabDocument> {
        let document = self.catalog.get_lab(lab_id)?.document()?;
        self.documents.load(document).await
    }

    #[must_use]
    pub fn next_lab_id(&self, lab_id: LabId) -> Option<LabId> {
        self.catalog.get_next_lab_id(lab_id)
    }

    #[must_use]
    pub fn previous_lab_id(&self, lab_id: LabId) -> Option<LabId> {
        self.catalog.get_previous_lab_id(lab_id)
    }

    /// Carry out storage instructions and pull out generation requests.
    ///
    /// A failed write is logged; the session continues either way.
    async fn process(&self, instructions: Vec<Instruction>) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        for instruction in instructions {
            match instruction {
                Instruction::PersistResult { lab_id, result } => {
                    let score = result.score;
                    match self.progress.record_result(lab_id, result).await {
                        Ok(record) => info!(
                            lab_id = %lab_id,
                            score,
                            total = record.total_score(),
                            "lab result saved"
                        ),
                        Err(err) => {
                            warn!(lab_id = %lab_id, error = %err, "failed to save lab result");
                        }
                    }
                }
                Instruction::RequestGeneration(plan) => outcome.pending = Some(plan),
                other => outcome.instructions.push(other),
            }
        }
        outcome
    }

    async fn generate_text_slot(&self, prompt: &str, context: Option<&str>) -> SlotOutput {
        let request = TextRequest::new(prompt).with_context(context);
        match self.ai.generate_text(request).await {
            Ok(text) => SlotOutput::Text(text),
            Err(err) => failed_slot(&err),
        }
    }

    async fn generate_image_slot(&self, prompt: &str, input_image: &str) -> SlotOutput {
        let input = match self.documents.load_image(input_image).await {
            Ok(input) => input,
            Err(err) => {
                warn!(path = input_image, error = %err, "failed to read input image");
                return SlotOutput::Failed(format!("Error: {err}"));
            }
        };
        match self.ai.generate_image(prompt, &input).await {
            Ok(image) => SlotOutput::Image(image.data_url()),
            Err(err) => failed_slot(&err),
        }
    }

    async fn store_evaluation(&self, lab_id: LabId, evaluation: AiEvaluation) {
        match self.progress.attach_evaluation(lab_id, evaluation).await {
            Ok(true) => {}
            Ok(false) => warn!(lab_id = %lab_id, "no stored result to attach evaluation to"),
            Err(err) => warn!(lab_id = %lab_id, error = %err, "failed to save evaluation"),
        }
    }
}

fn failed_slot(err: &AiClientError) -> SlotOutput {
    warn!(error = %err, "generation slot failed");
    SlotOutput::Failed(format!("Error: {err}"))
}
