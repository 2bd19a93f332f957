use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lab_core::model::LabId;
use lab_core::session::{Comparison, GenerationKind, SlotOutput};
use lab_core::time::fixed_now;
use lab_core::{Instruction, LabCatalog, Phase};
use services::ai::{GeneratedImage, GenerativeAiClient, InlineImage, TextRequest};
use services::{AiClientError, Clock, DocumentLoader, LabSessionService};
use storage::repository::{InMemoryRepository, ProgressRepository};

const EVALUATION_REPLY: &str = "```json\n{\"specificity\": 8, \"completeness\": 7, \"structure\": 6, \"actionability\": 9, \"outputControl\": 5, \"strengths\": [\"Clear audience\", \"Names the format\"], \"improvements\": [\"Cap the length\", \"Ask for risks\"], \"briefFeedback\": \"Strong prompt.\"}\n```";

const EARLIER_EVALUATION_REPLY: &str = "{\"specificity\": 2, \"completeness\": 2, \"structure\": 2, \"actionability\": 2, \"outputControl\": 2, \"strengths\": [], \"improvements\": [], \"briefFeedback\": \"Earlier attempt.\"}";

/// Marks a prompt whose evaluation reply differs from the usual one.
const EARLIER_MARKER: &str = "EARLIER-ATTEMPT";

#[derive(Default)]
struct FakeAi {
    configured: bool,
    fail_prompt: Option<&'static str>,
    requests: Mutex<Vec<String>>,
}

impl FakeAi {
    fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeAiClient for FakeAi {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate_text(&self, request: TextRequest<'_>) -> Result<String, AiClientError> {
        let full = request.full_prompt();
        self.requests.lock().unwrap().push(full.clone());
        if self.fail_prompt.is_some_and(|fail| request.prompt == fail) {
            return Err(AiClientError::RequestFailed {
                status: None,
                message: "quota exceeded".into(),
            });
        }
        if full.starts_with("You are evaluating") {
            if full.contains(EARLIER_MARKER) {
                return Ok(EARLIER_EVALUATION_REPLY.to_string());
            }
            return Ok(EVALUATION_REPLY.to_string());
        }
        Ok(format!("output for: {}", request.prompt))
    }

    async fn generate_image(
        &self,
        _prompt: &str,
        input: &InlineImage,
    ) -> Result<GeneratedImage, AiClientError> {
        Ok(GeneratedImage {
            mime_type: "image/png".into(),
            data_base64: input.to_base64(),
        })
    }

    async fn test_connection(&self) -> Result<(), AiClientError> {
        Ok(())
    }
}

fn service(
    repo: &InMemoryRepository,
    ai: Arc<FakeAi>,
    assets: &std::path::Path,
) -> LabSessionService {
    LabSessionService::new(
        Clock::fixed(fixed_now()),
        LabCatalog::builtin(),
        Arc::new(repo.clone()),
        ai,
        DocumentLoader::new(assets),
    )
}

fn shown_results(instructions: &[Instruction]) -> Option<&lab_core::session::ResultsView> {
    instructions.iter().find_map(|instruction| match instruction {
        Instruction::ShowResults(view) => Some(view),
        _ => None,
    })
}

#[tokio::test]
async fn unconfigured_submission_goes_straight_to_results() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::default()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(3)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Summarize the key terms, pricing and cancellation clauses.");

    let outcome = labs.submit(&mut session).await;
    assert!(outcome.pending.is_none());
    assert_eq!(session.phase(), Phase::Results);
    assert!(outcome.instructions.contains(&Instruction::StopTimer));

    let view = shown_results(&outcome.instructions).unwrap();
    assert!(view.comparison.is_none());
    assert!(view.evaluation.is_none());

    let stored = repo.load().await.unwrap();
    let result = stored.result(LabId::new(3)).unwrap();
    assert_eq!(result.score, view.score.total);
    assert_eq!(
        result.user_prompt,
        "Summarize the key terms, pricing and cancellation clauses."
    );
}

#[tokio::test]
async fn text_lab_runs_both_prompts_with_document_context() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(
        dir.path().join("docs/hvac-service-agreement.txt"),
        "Annual fee: $1,200",
    )
    .unwrap();

    let repo = InMemoryRepository::new();
    let ai = Arc::new(FakeAi::configured());
    let labs = service(&repo, Arc::clone(&ai), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(3)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Summarize this contract");

    let mut outcome = labs.submit(&mut session).await;
    assert_eq!(session.phase(), Phase::Loading);
    let plan = outcome.pending.take().unwrap();
    assert!(matches!(plan.kind, GenerationKind::TextComparison { .. }));

    let outputs = labs.run_generation(&plan).await;
    assert_eq!(
        outputs.user,
        SlotOutput::Text("output for: Summarize this contract".into())
    );
    let finished = labs
        .finish_generation(&mut session, plan.generation, outputs)
        .await;
    assert_eq!(session.phase(), Phase::Results);

    let view = shown_results(&finished.instructions).unwrap();
    assert!(matches!(
        view.comparison,
        Some(Comparison::Text {
            expert: SlotOutput::Text(_),
            ..
        })
    ));
    assert_eq!(view.evaluation.as_ref().unwrap().total(), 35);

    let framed = ai
        .requests()
        .into_iter()
        .filter(|request| request.starts_with("Here is the document/data to analyze:\n\nAnnual fee: $1,200"))
        .count();
    assert_eq!(framed, 2);

    let stored = repo.load().await.unwrap();
    let evaluation = stored
        .result(LabId::new(3))
        .and_then(|r| r.ai_evaluation.clone())
        .unwrap();
    assert_eq!(evaluation.brief_feedback, "Strong prompt.");
    assert!(!evaluation.fallback);
}

#[tokio::test]
async fn failed_slot_does_not_block_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let expert = LabCatalog::builtin()
        .get_lab(LabId::new(4))
        .unwrap()
        .expert_prompt();
    let ai = Arc::new(FakeAi {
        configured: true,
        fail_prompt: Some(expert),
        ..FakeAi::default()
    });
    let labs = service(&repo, ai, dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(4)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Write a polite reply");

    let outcome = labs.submit_and_wait(&mut session).await;
    let view = shown_results(&outcome.instructions).unwrap();
    match &view.comparison {
        Some(Comparison::Text { user, expert }) => {
            assert!(matches!(user, SlotOutput::Text(_)));
            assert_eq!(expert, &SlotOutput::Failed("Error: quota exceeded".into()));
        }
        other => panic!("unexpected comparison: {other:?}"),
    }
    assert_eq!(session.phase(), Phase::Results);
}

#[tokio::test]
async fn image_lab_reports_missing_input_inline() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::configured()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(1)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Put the van on a white background");

    let outcome = labs.submit_and_wait(&mut session).await;
    let view = shown_results(&outcome.instructions).unwrap();
    match &view.comparison {
        Some(Comparison::Image { generated, .. }) => assert!(generated.is_failed()),
        other => panic!("unexpected comparison: {other:?}"),
    }
    assert!(view.evaluation.is_some());
}

#[tokio::test]
async fn image_lab_returns_a_data_url() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    std::fs::write(dir.path().join("images/before-van.webp"), [0u8, 0, 0]).unwrap();

    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::configured()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(1)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Studio lighting, white background");

    let outcome = labs.submit_and_wait(&mut session).await;
    let view = shown_results(&outcome.instructions).unwrap();
    match &view.comparison {
        Some(Comparison::Image { generated, .. }) => {
            assert_eq!(generated, &SlotOutput::Image("data:image/png;base64,AAAA".into()));
        }
        other => panic!("unexpected comparison: {other:?}"),
    }
}

#[tokio::test]
async fn stale_generation_is_discarded_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::configured()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(3)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Summarize");
    let plan = labs.submit(&mut session).await.pending.unwrap();

    labs.open(&mut session, LabId::new(4)).unwrap();
    let outputs = labs.run_generation(&plan).await;
    let finished = labs
        .finish_generation(&mut session, plan.generation, outputs)
        .await;

    assert!(finished.instructions.is_empty());
    assert_eq!(session.phase(), Phase::Briefing);
    assert_eq!(session.lab().unwrap().id(), LabId::new(4));
}

#[tokio::test]
async fn stale_evaluation_does_not_overwrite_a_newer_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::configured()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(3)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft(format!("{EARLIER_MARKER} summarize the contract"));
    let earlier = labs.submit(&mut session).await.pending.unwrap();

    labs.open(&mut session, LabId::new(3)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("second summarize");
    labs.submit_and_wait(&mut session).await;
    assert_eq!(session.phase(), Phase::Results);

    let outputs = labs.run_generation(&earlier).await;
    assert_eq!(
        outputs.evaluation.as_ref().unwrap().brief_feedback,
        "Earlier attempt."
    );
    let finished = labs
        .finish_generation(&mut session, earlier.generation, outputs)
        .await;
    assert!(finished.instructions.is_empty());

    let stored = repo.load().await.unwrap();
    let result = stored.result(LabId::new(3)).unwrap();
    assert_eq!(result.user_prompt, "second summarize");
    assert_eq!(
        result.ai_evaluation.as_ref().unwrap().brief_feedback,
        "Strong prompt."
    );
}

#[tokio::test]
async fn generation_alone_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::configured()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(4)).unwrap();
    labs.begin(&mut session).unwrap();
    session.update_draft("Reply to the customer");
    let plan = labs.submit(&mut session).await.pending.unwrap();

    labs.run_generation(&plan).await;
    let stored = repo.load().await.unwrap();
    assert!(stored.result(LabId::new(4)).unwrap().ai_evaluation.is_none());
}

#[tokio::test]
async fn lab_document_is_loaded_for_display() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(
        dir.path().join("docs/regional-sales-data.csv"),
        "Region,Q1\nNorth,1200\nSouth,900\n",
    )
    .unwrap();
    let labs = service(
        &InMemoryRepository::new(),
        Arc::new(FakeAi::default()),
        dir.path(),
    );

    let document = labs.lab_document(LabId::new(6)).await.unwrap();
    let table = document.table.unwrap();
    assert_eq!(table.headers, vec!["Region", "Q1"]);
    assert_eq!(table.rows.len(), 2);

    assert!(labs.lab_document(LabId::new(3)).await.is_none());
    assert!(labs.lab_document(LabId::new(1)).await.is_none());
}

#[tokio::test]
async fn blank_submit_warns_and_second_submit_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let repo = InMemoryRepository::new();
    let labs = service(&repo, Arc::new(FakeAi::default()), dir.path());

    let mut session = labs.new_session();
    labs.open(&mut session, LabId::new(5)).unwrap();
    labs.begin(&mut session).unwrap();

    session.update_draft("   ");
    let outcome = labs.submit(&mut session).await;
    assert_eq!(
        outcome.instructions,
        vec![Instruction::Warn(lab_core::session::EMPTY_PROMPT_WARNING)]
    );
    assert!(repo.load().await.unwrap().is_empty());

    session.update_draft("Write a proposal");
    labs.submit(&mut session).await;
    let again = labs.auto_submit(&mut session).await;
    assert!(again.instructions.is_empty());
    assert_eq!(repo.load().await.unwrap().completed_count(), 1);
}

#[tokio::test]
async fn next_lab_crosses_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let labs = service(
        &InMemoryRepository::new(),
        Arc::new(FakeAi::default()),
        dir.path(),
    );
    assert_eq!(labs.next_lab_id(LabId::new(4)), Some(LabId::new(5)));
    assert_eq!(labs.next_lab_id(LabId::new(2)), None);
    assert_eq!(labs.previous_lab_id(LabId::new(5)), Some(LabId::new(4)));
}
