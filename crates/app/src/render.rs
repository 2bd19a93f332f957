//! Plain-text rendering of sessions, results and the course overview.

use lab_core::model::{AiEvaluation, AppSettings, LabDefinition, ProgressRecord};
use lab_core::session::{Comparison, ResultsView, SlotOutput, TimerUrgency};
use lab_core::time::format_countdown;
use lab_core::{CourseSummary, LabCatalog};
use services::{CsvTable, Diagnostic, LabDocument};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Countdown lines are printed every this many seconds, then every second at the end.
const TIMER_PRINT_EVERY: u32 = 15;
const TIMER_PRINT_FINAL: u32 = 10;

pub fn briefing(
    lab: &LabDefinition,
    catalog: &LabCatalog,
    document: Option<&LabDocument>,
    ai_configured: bool,
) {
    let track = catalog.track(lab.track()).map_or("", |t| t.name());
    println!("{RULE}");
    println!("Lab {}: {}", lab.id(), lab.title());
    println!(
        "{track} · {} · {}",
        lab.difficulty().as_str(),
        format_countdown(lab.time_limit_secs())
    );
    println!();
    println!("SCENARIO\n{}\n", lab.scenario());
    println!("YOUR MISSION\n{}\n", lab.mission());
    if let Some(why) = lab.why_it_matters() {
        println!("WHY IT MATTERS\n{why}\n");
    }
    if let Some(images) = lab.images() {
        println!("Before: {}\nTarget: {}\n", images.before, images.after);
    }
    match (lab.document(), document) {
        (_, Some(loaded)) => println!("{}", document_block(loaded)),
        (Some(declared), None) => println!("Document: {} (not available)\n", declared.path),
        (None, None) => {}
    }
    if let Some(sample) = lab.sample_input() {
        println!("INPUT\n{sample}\n");
    }
    if !ai_configured {
        println!("(No Gemini API key configured: results will show your score only.)\n");
    }
    println!("Press Enter to start the timer, or type :quit.");
}

pub fn active_help() {
    println!("Timer started. Type your prompt; each line is appended.");
    println!("Commands: :hint  :clear  :submit  :quit");
}

pub fn timer(remaining_secs: u32, urgency: TimerUrgency) {
    if remaining_secs % TIMER_PRINT_EVERY != 0 && remaining_secs > TIMER_PRINT_FINAL {
        return;
    }
    let marker = match urgency {
        TimerUrgency::Normal => "",
        TimerUrgency::Warning => " (hurry)",
        TimerUrgency::Danger => " (!)",
    };
    println!("[{}]{marker}", format_countdown(remaining_secs));
}

pub fn loading(lab: &LabDefinition) {
    let title = if lab.is_image_transformation() {
        "Generating Your Image"
    } else {
        "Generating AI Outputs"
    };
    println!("{title}...");
}

fn document_block(document: &LabDocument) -> String {
    let name = document
        .path
        .file_name()
        .map_or_else(|| document.path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let body = document
        .table
        .as_ref()
        .map_or_else(|| document.text.trim_end().to_string(), format_table);
    format!("DOCUMENT ({name})\n{body}\n")
}

/// Header and rows in left-aligned, space-padded columns.
fn format_table(table: &CsvTable) -> String {
    let columns = std::iter::once(&table.headers)
        .chain(&table.rows)
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in std::iter::once(&table.headers).chain(&table.rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |row: &Vec<String>| {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    let mut out = vec![line(&table.headers)];
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(table.rows.iter().map(line));
    out.join("\n")
}

pub fn hint(text: &str) {
    println!("Hint: {text}");
}

pub fn warning(text: &str) {
    println!("! {text}");
}

pub fn draft_status(chars: usize) {
    println!("({chars} characters)");
}

pub fn results(view: &ResultsView) {
    let score = &view.score;
    println!("{RULE}");
    println!("{}: {}/100", view.title, score.total);
    println!("  base           {:>3}", score.base);
    println!(
        "  keywords       {:>3}  {}",
        score.keyword_score,
        score.matched_keywords.join(", ")
    );
    println!(
        "  time bonus     {:>3}  ({}s elapsed)",
        score.time_bonus, score.elapsed_secs
    );
    if score.hint_penalty > 0 {
        println!("  hint penalty  -{:>3}", score.hint_penalty);
    }
    println!();
    println!("YOUR PROMPT\n{}\n", view.user_prompt);
    println!("EXPERT PROMPT\n{}\n", view.expert_prompt);

    match &view.comparison {
        Some(Comparison::Text { user, expert }) => {
            println!("YOUR OUTPUT");
            slot(user);
            println!("EXPERT OUTPUT");
            slot(expert);
        }
        Some(Comparison::Image {
            before,
            target,
            generated,
        }) => {
            println!("Before: {before}\nTarget: {target}");
            println!("GENERATED");
            slot(generated);
        }
        None => {}
    }

    if let Some(evaluation) = &view.evaluation {
        evaluation_block(evaluation);
    }

    println!("KEY TAKEAWAYS");
    for takeaway in view.takeaways {
        println!("  - {takeaway}");
    }
}

fn slot(output: &SlotOutput) {
    match output {
        SlotOutput::Text(text) => println!("{text}\n"),
        SlotOutput::Image(url) => println!("[image, {} bytes as data URL]\n", url.len()),
        SlotOutput::Failed(message) => println!("{message}\n"),
    }
}

fn evaluation_block(evaluation: &AiEvaluation) {
    let s = evaluation.scores;
    println!("AI EVALUATION ({}/50)", s.total());
    println!("  Specificity     {:>2}/10", s.specificity);
    println!("  Completeness    {:>2}/10", s.completeness);
    println!("  Structure       {:>2}/10", s.structure);
    println!("  Actionability   {:>2}/10", s.actionability);
    println!("  Output control  {:>2}/10", s.output_control);
    println!("Strengths:");
    for item in &evaluation.strengths {
        println!("  + {item}");
    }
    println!("To improve:");
    for item in &evaluation.improvements {
        println!("  > {item}");
    }
    println!("{}\n", evaluation.brief_feedback);
}

pub fn after_results(next: Option<&LabDefinition>) {
    match next {
        Some(lab) => println!("\nNext: Lab {} {}. Type :next, :retry or :quit.", lab.id(), lab.title()),
        None => println!("\nCongratulations! You've completed all labs! Type :retry or :quit."),
    }
}

pub fn course(catalog: &LabCatalog, progress: &ProgressRecord, summary: &CourseSummary) {
    println!(
        "Prompt Lab: {}/{} labs completed, average score {}",
        summary.completed, summary.lab_count, summary.average_score
    );
    for track in catalog.tracks() {
        let line = summary.tracks.iter().find(|t| t.track == track.id());
        let (completed, total, percentage) =
            line.map_or((0, 0, 0), |t| (t.completed, t.total, t.percentage));
        println!();
        println!(
            "{} [{}] {completed}/{total} ({percentage}%) · {} min",
            track.name(),
            track.difficulty().as_str(),
            catalog.track_total_minutes(track.id()),
        );
        println!("  {}", track.description());
        for lab in catalog.get_track_labs(track.id()) {
            let status = progress
                .result(lab.id())
                .map_or_else(|| "    ".to_string(), |r| format!("{:>3} ", r.score));
            println!("  {status}Lab {}: {}", lab.id(), lab.title());
        }
    }
}

pub fn summary(summary: &CourseSummary, diagnostic: &Diagnostic) {
    println!("{RULE}");
    if summary.is_complete {
        println!("Course complete!");
    }
    println!(
        "Average score {}/100 over {}/{} labs",
        summary.average_score, summary.completed, summary.lab_count
    );
    for track in &summary.tracks {
        let average = track
            .average_score
            .map_or_else(|| "-".to_string(), |avg| avg.to_string());
        println!(
            "  {:<20} {}/{} ({}%)  avg {average}",
            track.name, track.completed, track.total, track.percentage
        );
        for line in &track.labs {
            println!("      {:>3}  {}", line.score, line.title);
        }
    }

    let d = &summary.dimensions;
    println!();
    println!("Prompting skills (0-10)");
    println!("  Specificity     {:.1}", d.specificity);
    println!("  Completeness    {:.1}", d.completeness);
    println!("  Structure       {:.1}", d.structure);
    println!("  Actionability   {:.1}", d.actionability);
    println!("  Output control  {:.1}", d.output_control);
    println!();
    println!("{}", diagnostic.text);
}

pub fn settings(settings: &AppSettings) {
    let key = settings.api_key().map_or_else(|| "(not set)".to_string(), mask_key);
    println!("API key      {key}");
    println!("Text model   {}", settings.effective_text_model());
    println!("Image model  {}", settings.effective_image_model());
    println!("Base URL     {}", settings.effective_base_url());
}

fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
