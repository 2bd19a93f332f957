use crate::model::ids::{LabId, TrackId};
use crate::model::lab::Difficulty;

/// A themed group of labs taken in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    id: TrackId,
    name: &'static str,
    description: &'static str,
    difficulty: Difficulty,
    labs: Vec<LabId>,
}

impl Track {
    #[must_use]
    pub fn new(
        id: TrackId,
        name: &'static str,
        description: &'static str,
        difficulty: Difficulty,
        labs: Vec<LabId>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            difficulty,
            labs,
        }
    }

    #[must_use]
    pub fn id(&self) -> TrackId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Lab ids in the order they are taken.
    #[must_use]
    pub fn labs(&self) -> &[LabId] {
        &self.labs
    }

    #[must_use]
    pub fn position_of(&self, lab_id: LabId) -> Option<usize> {
        self.labs.iter().position(|id| *id == lab_id)
    }
}
