//! Interactive lab loop: stdin lines and countdown ticks feed one session.

use lab_core::model::LabId;
use lab_core::{Instruction, LabSession, Phase};
use services::{Countdown, LabDocument, LabSessionService, StepOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render;

enum Input {
    Line(String),
    Eof,
}

/// What the learner asked for after seeing the results.
enum AfterResults {
    Open(LabId),
    Quit,
}

pub async fn run(
    labs: &LabSessionService,
    first: LabId,
    ai_configured: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut countdown = Countdown::new();
    let mut session = labs.new_session();
    let mut lab_id = first;

    loop {
        let outcome = labs.open(&mut session, lab_id)?;
        let screen = Screen {
            labs,
            document: labs.lab_document(lab_id).await,
            ai_configured,
        };
        screen.show(&session, &mut countdown, outcome.instructions);

        let finished = drive(&screen, &mut session, &mut countdown, &mut lines).await?;
        if !finished {
            return Ok(());
        }

        let next = labs.next_lab_id(lab_id);
        render::after_results(next.and_then(|id| labs.catalog().get_lab(id)));
        match after_results(&mut lines, lab_id, next).await? {
            AfterResults::Open(id) => lab_id = id,
            AfterResults::Quit => return Ok(()),
        }
    }
}

/// Run one lab until results are shown. Returns `false` if the learner quit.
async fn drive<R>(
    screen: &Screen<'_>,
    session: &mut LabSession,
    countdown: &mut Countdown,
    lines: &mut tokio::io::Lines<R>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let labs = screen.labs;
    while session.phase() != Phase::Results {
        let mut outcome = tokio::select! {
            line = lines.next_line() => {
                let input = line?.map_or(Input::Eof, Input::Line);
                match handle_input(labs, session, input).await? {
                    Some(outcome) => outcome,
                    None => {
                        countdown.stop();
                        return Ok(false);
                    }
                }
            }
            Some(tick) = countdown.next_tick() => labs.tick(session, tick).await,
        };

        let pending = outcome.pending.take();
        screen.show(session, countdown, outcome.instructions);

        if let Some(plan) = pending {
            let Some(outputs) = await_generation(labs.run_generation(&plan), lines).await? else {
                return Ok(false);
            };
            let finished = labs
                .finish_generation(session, plan.generation, outputs)
                .await;
            screen.show(session, countdown, finished.instructions);
        }
    }
    Ok(true)
}

/// Wait for generation while still reading stdin. `None` means quit.
async fn await_generation<F, R>(
    generation: F,
    lines: &mut tokio::io::Lines<R>,
) -> Result<Option<F::Output>, Box<dyn std::error::Error>>
where
    F: std::future::Future,
    R: tokio::io::AsyncBufRead + Unpin,
{
    tokio::pin!(generation);
    loop {
        tokio::select! {
            outputs = &mut generation => return Ok(Some(outputs)),
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == ":quit" => return Ok(None),
                Some(_) => render::warning("Still generating. Type :quit to leave."),
                None => return Ok(Some((&mut generation).await)),
            },
        }
    }
}

/// `None` means quit.
async fn handle_input(
    labs: &LabSessionService,
    session: &mut LabSession,
    input: Input,
) -> Result<Option<StepOutcome>, Box<dyn std::error::Error>> {
    let line = match input {
        Input::Eof => {
            // Closed stdin submits whatever was typed.
            if session.phase() == Phase::Active {
                return Ok(Some(labs.auto_submit(session).await));
            }
            return Ok(None);
        }
        Input::Line(line) => line,
    };

    let command = line.trim();
    if command == ":quit" {
        return Ok(None);
    }

    let outcome = match session.phase() {
        Phase::Briefing => labs.begin(session)?,
        Phase::Active => match command {
            ":hint" => labs.use_hint(session),
            ":submit" => labs.submit(session).await,
            ":clear" => {
                session.update_draft(String::new());
                render::draft_status(0);
                StepOutcome::default()
            }
            _ => {
                let draft = if session.draft().is_empty() {
                    line
                } else {
                    format!("{}\n{line}", session.draft())
                };
                session.update_draft(draft);
                render::draft_status(session.draft_char_count());
                StepOutcome::default()
            }
        },
        Phase::Loading | Phase::Results => StepOutcome::default(),
    };
    Ok(Some(outcome))
}

/// Per-lab rendering context.
struct Screen<'a> {
    labs: &'a LabSessionService,
    document: Option<LabDocument>,
    ai_configured: bool,
}

impl Screen<'_> {
    fn show(&self, session: &LabSession, countdown: &mut Countdown, instructions: Vec<Instruction>) {
        for instruction in instructions {
            if countdown.apply(&instruction) {
                continue;
            }
            match instruction {
                Instruction::ShowPhase(phase) => {
                    debug!(%phase, "phase");
                    match (phase, session.lab()) {
                        (Phase::Briefing, Some(lab)) => render::briefing(
                            lab,
                            self.labs.catalog(),
                            self.document.as_ref(),
                            self.ai_configured,
                        ),
                        (Phase::Active, _) => render::active_help(),
                        (Phase::Loading, Some(lab)) => render::loading(lab),
                        _ => {}
                    }
                }
                Instruction::UpdateTimer {
                    remaining_secs,
                    urgency,
                } => render::timer(remaining_secs, urgency),
                Instruction::RevealHint(text) => render::hint(text),
                Instruction::Warn(text) => render::warning(text),
                Instruction::ShowResults(view) => render::results(&view),
                _ => {}
            }
        }
    }
}

async fn after_results<R>(
    lines: &mut tokio::io::Lines<R>,
    current: LabId,
    next: Option<LabId>,
) -> Result<AfterResults, Box<dyn std::error::Error>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        match (line.trim(), next) {
            (":next", Some(id)) => return Ok(AfterResults::Open(id)),
            (":retry", _) => return Ok(AfterResults::Open(current)),
            (":quit", _) => return Ok(AfterResults::Quit),
            _ => render::warning("Type :next, :retry or :quit."),
        }
    }
    Ok(AfterResults::Quit)
}
