use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a lab.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabId(u32);

impl LabId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabId({})", self.0)
    }
}

impl fmt::Display for LabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing identifiers from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for LabId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(LabId::new)
            .map_err(|_| ParseIdError {
                kind: "LabId",
                raw: s.to_string(),
            })
    }
}

//
// ─── TRACKS ────────────────────────────────────────────────────────────────────
//

/// Course tracks, declared in the order learners work through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackId {
    Text,
    Finance,
    Marketing,
}

impl TrackId {
    /// Fixed course order: text → finance → marketing.
    pub const ORDER: [TrackId; 3] = [TrackId::Text, TrackId::Finance, TrackId::Marketing];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrackId::Text => "text",
            TrackId::Finance => "finance",
            TrackId::Marketing => "marketing",
        }
    }

    /// Position of this track in [`TrackId::ORDER`].
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            TrackId::Text => 0,
            TrackId::Finance => 1,
            TrackId::Marketing => 2,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<TrackId> {
        Self::ORDER.get(self.position() + 1).copied()
    }

    #[must_use]
    pub fn previous(self) -> Option<TrackId> {
        self.position()
            .checked_sub(1)
            .and_then(|idx| Self::ORDER.get(idx).copied())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(TrackId::Text),
            "finance" => Ok(TrackId::Finance),
            "marketing" => Ok(TrackId::Marketing),
            _ => Err(ParseIdError {
                kind: "TrackId",
                raw: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_id_parses_and_displays() {
        let id: LabId = " 4 ".parse().unwrap();
        assert_eq!(id, LabId::new(4));
        assert_eq!(id.to_string(), "4");
        assert!("four".parse::<LabId>().is_err());
    }

    #[test]
    fn track_order_walks_forward_and_back() {
        assert_eq!(TrackId::Text.next(), Some(TrackId::Finance));
        assert_eq!(TrackId::Finance.next(), Some(TrackId::Marketing));
        assert_eq!(TrackId::Marketing.next(), None);
        assert_eq!(TrackId::Text.previous(), None);
        assert_eq!(TrackId::Marketing.previous(), Some(TrackId::Finance));
    }

    #[test]
    fn track_id_serializes_lowercase() {
        let json = serde_json::to_string(&TrackId::Marketing).unwrap();
        assert_eq!(json, "\"marketing\"");
        assert_eq!("Finance".parse::<TrackId>().unwrap(), TrackId::Finance);
    }
}
