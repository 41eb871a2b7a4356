use serde::{Deserialize, Serialize};

/// Scores at or above this value are labelled [`Label::Cancerous`].
pub const CANCEROUS_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Cancerous")]
    Cancerous,
    #[serde(rename = "Non-Cancerous")]
    NonCancerous,
}

impl Label {
    pub fn from_score(score: f32) -> Self {
        if score >= CANCEROUS_THRESHOLD {
            Self::Cancerous
        } else {
            Self::NonCancerous
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancerous => "Cancerous",
            Self::NonCancerous => "Non-Cancerous",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Error,
}
