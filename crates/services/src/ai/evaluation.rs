//! AI grading of a submitted prompt on five dimensions.

use serde::Deserialize;
use tracing::warn;

use lab_core::model::{AiEvaluation, DimensionScores, LabDefinition, MAX_DIMENSION_SCORE};

use super::{GenerativeAiClient, TextRequest};
use crate::error::AiClientError;

const EVALUATION_MAX_TOKENS: u32 = 500;
const EVALUATION_TEMPERATURE: f32 = 0.3;

#[must_use]
pub fn build_evaluation_prompt(lab: &LabDefinition, user_prompt: &str) -> String {
    format!(
        r#"You are evaluating a student's AI prompt for a training exercise. Be fair but rigorous.

TASK GIVEN TO STUDENT:
{mission}

CONTEXT/SCENARIO:
{scenario}

STUDENT'S PROMPT:
"""
{user_prompt}
"""

EXPERT REFERENCE PROMPT (for comparison, student doesn't need to match exactly):
"""
{expert}
"""

Rate the student's prompt on these 5 criteria (0-10 each):

1. SPECIFICITY: How specific and detailed is the request?
   - 0-3: Vague, generic, could apply to anything
   - 4-6: Some specific details but missing key elements
   - 7-10: Highly specific, detailed, tailored to the task

2. COMPLETENESS: Does it address all aspects of the task?
   - 0-3: Major gaps, misses the point
   - 4-6: Covers basics but misses important elements
   - 7-10: Comprehensive, addresses all requirements

3. STRUCTURE: Is the prompt well-organized and clear?
   - 0-3: Rambling, confusing, hard to follow
   - 4-6: Understandable but could be clearer
   - 7-10: Logical flow, well-organized, easy to follow

4. ACTIONABILITY: Would an AI know exactly what to produce?
   - 0-3: Ambiguous, unclear expected output
   - 4-6: Mostly clear but some ambiguity
   - 7-10: Crystal clear, AI knows exactly what to do

5. OUTPUT_CONTROL: Does it specify format, length, style, or constraints?
   - 0-3: No constraints specified
   - 4-6: Some constraints but incomplete
   - 7-10: Well-defined format, length, and style requirements

Also provide:
- Two specific strengths of this prompt
- Two specific suggestions for improvement
- One sentence overall assessment

Respond ONLY with valid JSON (no markdown, no code blocks, just raw JSON):
{{
  "specificity": <number 0-10>,
  "completeness": <number 0-10>,
  "structure": <number 0-10>,
  "actionability": <number 0-10>,
  "outputControl": <number 0-10>,
  "strengths": ["<specific strength>", "<specific strength>"],
  "improvements": ["<specific actionable suggestion>", "<specific actionable suggestion>"],
  "briefFeedback": "<One sentence assessment>"
}}"#,
        mission = lab.mission(),
        scenario = lab.scenario(),
        expert = lab.expert_prompt(),
    )
}

/// Remove a surrounding Markdown code fence (```json or ```), if any.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a grader reply. Missing fields take neutral defaults.
///
/// # Errors
///
/// Returns `AiClientError::InvalidResponse` if the reply is not a JSON object.
pub fn parse_evaluation(raw: &str) -> Result<AiEvaluation, AiClientError> {
    let reply: GraderReply = serde_json::from_str(strip_code_fence(raw))
        .map_err(|err| AiClientError::InvalidResponse(err.to_string()))?;

    Ok(AiEvaluation {
        scores: DimensionScores::clamped(
            dimension(reply.specificity),
            dimension(reply.completeness),
            dimension(reply.structure),
            dimension(reply.actionability),
            dimension(reply.output_control),
        ),
        strengths: reply
            .strengths
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| vec!["Good effort".into(), "Completed the task".into()]),
        improvements: reply
            .improvements
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| vec!["Add more detail".into(), "Specify output format".into()]),
        brief_feedback: reply
            .brief_feedback
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "Keep practicing!".into()),
        fallback: false,
    })
}

/// Ask the model to grade `user_prompt`; any failure yields the fallback evaluation.
pub async fn evaluate_prompt(
    client: &dyn GenerativeAiClient,
    lab: &LabDefinition,
    user_prompt: &str,
) -> AiEvaluation {
    let prompt = build_evaluation_prompt(lab, user_prompt);
    let request =
        TextRequest::new(&prompt).with_sampling(EVALUATION_MAX_TOKENS, EVALUATION_TEMPERATURE);

    match client.generate_text(request).await {
        Ok(reply) => parse_evaluation(&reply).unwrap_or_else(|err| {
            warn!(lab_id = %lab.id(), error = %err, "unparseable AI evaluation");
            AiEvaluation::fallback()
        }),
        Err(err) => {
            warn!(lab_id = %lab.id(), error = %err, "AI evaluation failed");
            AiEvaluation::fallback()
        }
    }
}

fn dimension(value: Option<f64>) -> u8 {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() {
        return 0;
    }
    // Clamped to 0..=10 before the cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = value.clamp(0.0, f64::from(MAX_DIMENSION_SCORE)).round() as u8;
    score
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraderReply {
    specificity: Option<f64>,
    completeness: Option<f64>,
    structure: Option<f64>,
    actionability: Option<f64>,
    output_control: Option<f64>,
    strengths: Option<Vec<String>>,
    improvements: Option<Vec<String>>,
    brief_feedback: Option<String>,
}
