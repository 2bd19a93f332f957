use serde::{Deserialize, Serialize};

/// Highest score on any single AI grading dimension.
pub const MAX_DIMENSION_SCORE: u8 = 10;

/// AI-judged quality of a prompt on five 0–10 dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub specificity: u8,
    pub completeness: u8,
    pub structure: u8,
    pub actionability: u8,
    pub output_control: u8,
}

impl DimensionScores {
    /// Builds scores, clamping each dimension to `0..=10`.
    #[must_use]
    pub fn clamped(
        specificity: u8,
        completeness: u8,
        structure: u8,
        actionability: u8,
        output_control: u8,
    ) -> Self {
        Self {
            specificity: specificity.min(MAX_DIMENSION_SCORE),
            completeness: completeness.min(MAX_DIMENSION_SCORE),
            structure: structure.min(MAX_DIMENSION_SCORE),
            actionability: actionability.min(MAX_DIMENSION_SCORE),
            output_control: output_control.min(MAX_DIMENSION_SCORE),
        }
    }

    #[must_use]
    pub fn uniform(value: u8) -> Self {
        Self::clamped(value, value, value, value, value)
    }

    /// Sum of all dimensions, at most 50.
    #[must_use]
    pub fn total(&self) -> u32 {
        u32::from(self.specificity)
            + u32::from(self.completeness)
            + u32::from(self.structure)
            + u32::from(self.actionability)
            + u32::from(self.output_control)
    }
}

/// Feedback returned by the AI grader for one submission.
///
/// `fallback` marks placeholder feedback produced when the grader was unreachable
/// or replied with something unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEvaluation {
    pub scores: DimensionScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub brief_feedback: String,
    #[serde(default)]
    pub fallback: bool,
}

impl AiEvaluation {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            scores: DimensionScores::uniform(5),
            strengths: vec![
                "Prompt submitted successfully".to_string(),
                "Attempted the challenge".to_string(),
            ],
            improvements: vec![
                "AI evaluation unavailable".to_string(),
                "Try adding more specific details".to_string(),
            ],
            brief_feedback: "Score estimated - AI evaluation was unavailable.".to_string(),
            fallback: true,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.scores.total()
    }
}
