use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LabId, TrackId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LabError {
    #[error("lab {0} has an empty title")]
    EmptyTitle(LabId),

    #[error("lab {0} must have a time limit greater than zero")]
    ZeroTimeLimit(LabId),

    #[error("lab {id} keyword {keyword:?} must be lowercase and non-empty")]
    InvalidKeyword { id: LabId, keyword: &'static str },

    #[error("lab {0} requires an input image but has no before image")]
    MissingInputImage(LabId),
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// What kind of output a lab asks the learner to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabType {
    Text,
    Image,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Contract,
    Email,
    Spreadsheet,
}

/// A document shipped with a lab, relative to the assets directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef {
    pub path: &'static str,
    pub kind: DocumentKind,
}

/// Before/after reference images for image labs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePair {
    pub before: &'static str,
    pub after: &'static str,
}

//
// ─── LAB DEFINITION ────────────────────────────────────────────────────────────
//

/// Immutable description of one timed exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabDefinition {
    pub(crate) id: LabId,
    pub(crate) title: &'static str,
    pub(crate) track: TrackId,
    pub(crate) difficulty: Difficulty,
    pub(crate) lab_type: LabType,
    pub(crate) time_limit_secs: u32,
    pub(crate) scenario: &'static str,
    pub(crate) mission: &'static str,
    pub(crate) why_it_matters: Option<&'static str>,
    pub(crate) images: Option<ImagePair>,
    pub(crate) requires_image_input: bool,
    pub(crate) document: Option<DocumentRef>,
    pub(crate) sample_input: Option<&'static str>,
    pub(crate) expert_prompt: &'static str,
    pub(crate) keywords: &'static [&'static str],
    pub(crate) hint: &'static str,
    pub(crate) takeaways: &'static [&'static str],
}

impl LabDefinition {
    /// Starts a builder with the identity fields; everything else defaults to empty.
    #[must_use]
    pub fn builder(
        id: LabId,
        title: &'static str,
        track: TrackId,
        lab_type: LabType,
    ) -> LabDefinitionBuilder {
        LabDefinitionBuilder {
            lab: LabDefinition {
                id,
                title,
                track,
                difficulty: Difficulty::Easy,
                lab_type,
                time_limit_secs: 90,
                scenario: "",
                mission: "",
                why_it_matters: None,
                images: None,
                requires_image_input: false,
                document: None,
                sample_input: None,
                expert_prompt: "",
                keywords: &[],
                hint: "",
                takeaways: &[],
            },
        }
    }

    /// Check the definition invariants.
    ///
    /// # Errors
    ///
    /// Returns `LabError` when the title is empty, the time limit is zero, a keyword
    /// is not lowercase, or an image-input lab has no before image.
    pub fn validate(&self) -> Result<(), LabError> {
        if self.title.trim().is_empty() {
            return Err(LabError::EmptyTitle(self.id));
        }
        if self.time_limit_secs == 0 {
            return Err(LabError::ZeroTimeLimit(self.id));
        }
        if let Some(keyword) = self
            .keywords
            .iter()
            .find(|kw| kw.trim().is_empty() || kw.to_lowercase() != **kw)
        {
            return Err(LabError::InvalidKeyword {
                id: self.id,
                keyword,
            });
        }
        if self.requires_image_input && self.images.is_none() {
            return Err(LabError::MissingInputImage(self.id));
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> LabId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title
    }

    #[must_use]
    pub fn track(&self) -> TrackId {
        self.track
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn lab_type(&self) -> LabType {
        self.lab_type
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn scenario(&self) -> &'static str {
        self.scenario
    }

    #[must_use]
    pub fn mission(&self) -> &'static str {
        self.mission
    }

    #[must_use]
    pub fn why_it_matters(&self) -> Option<&'static str> {
        self.why_it_matters
    }

    #[must_use]
    pub fn images(&self) -> Option<ImagePair> {
        self.images
    }

    /// True when generation should transform the lab's before image.
    #[must_use]
    pub fn is_image_transformation(&self) -> bool {
        self.lab_type == LabType::Image && self.requires_image_input
    }

    #[must_use]
    pub fn document(&self) -> Option<DocumentRef> {
        self.document
    }

    #[must_use]
    pub fn sample_input(&self) -> Option<&'static str> {
        self.sample_input
    }

    #[must_use]
    pub fn expert_prompt(&self) -> &'static str {
        self.expert_prompt
    }

    #[must_use]
    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    #[must_use]
    pub fn hint(&self) -> &'static str {
        self.hint
    }

    #[must_use]
    pub fn takeaways(&self) -> &'static [&'static str] {
        self.takeaways
    }
}

/// Fluent construction for labs defined outside the built-in catalog.
#[derive(Debug, Clone)]
pub struct LabDefinitionBuilder {
    lab: LabDefinition,
}

impl LabDefinitionBuilder {
    #[must_use]
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.lab.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn time_limit_secs(mut self, secs: u32) -> Self {
        self.lab.time_limit_secs = secs;
        self
    }

    #[must_use]
    pub fn scenario(mut self, scenario: &'static str) -> Self {
        self.lab.scenario = scenario;
        self
    }

    #[must_use]
    pub fn mission(mut self, mission: &'static str) -> Self {
        self.lab.mission = mission;
        self
    }

    #[must_use]
    pub fn images(mut self, before: &'static str, after: &'static str, requires_input: bool) -> Self {
        self.lab.images = Some(ImagePair { before, after });
        self.lab.requires_image_input = requires_input;
        self
    }

    #[must_use]
    pub fn document(mut self, path: &'static str, kind: DocumentKind) -> Self {
        self.lab.document = Some(DocumentRef { path, kind });
        self
    }

    #[must_use]
    pub fn sample_input(mut self, sample: &'static str) -> Self {
        self.lab.sample_input = Some(sample);
        self
    }

    #[must_use]
    pub fn expert_prompt(mut self, prompt: &'static str) -> Self {
        self.lab.expert_prompt = prompt;
        self
    }

    #[must_use]
    pub fn keywords(mut self, keywords: &'static [&'static str]) -> Self {
        self.lab.keywords = keywords;
        self
    }

    #[must_use]
    pub fn hint(mut self, hint: &'static str) -> Self {
        self.lab.hint = hint;
        self
    }

    #[must_use]
    pub fn takeaways(mut self, takeaways: &'static [&'static str]) -> Self {
        self.lab.takeaways = takeaways;
        self
    }

    /// Validate and finish the definition.
    ///
    /// # Errors
    ///
    /// Returns `LabError` if [`LabDefinition::validate`] fails.
    pub fn build(self) -> Result<LabDefinition, LabError> {
        self.lab.validate()?;
        Ok(self.lab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_zero_time_limit() {
        let err = LabDefinition::builder(LabId::new(9), "Zero", TrackId::Text, LabType::Text)
            .time_limit_secs(0)
            .build()
            .unwrap_err();
        assert_eq!(err, LabError::ZeroTimeLimit(LabId::new(9)));
    }

    #[test]
    fn builder_rejects_uppercase_keywords() {
        let err = LabDefinition::builder(LabId::new(9), "Kw", TrackId::Text, LabType::Text)
            .keywords(&["Summary"])
            .build()
            .unwrap_err();
        assert!(matches!(err, LabError::InvalidKeyword { keyword: "Summary", .. }));
    }

    #[test]
    fn empty_keyword_list_is_allowed() {
        let lab = LabDefinition::builder(LabId::new(9), "Free", TrackId::Text, LabType::Text)
            .build()
            .unwrap();
        assert!(lab.keywords().is_empty());
    }

    #[test]
    fn image_input_requires_before_image() {
        let mut builder =
            LabDefinition::builder(LabId::new(1), "Img", TrackId::Marketing, LabType::Image);
        builder.lab.requires_image_input = true;
        assert_eq!(
            builder.build().unwrap_err(),
            LabError::MissingInputImage(LabId::new(1))
        );

        let lab = LabDefinition::builder(LabId::new(1), "Img", TrackId::Marketing, LabType::Image)
            .images("before.webp", "after.webp", true)
            .build()
            .unwrap();
        assert!(lab.is_image_transformation());
    }
}
