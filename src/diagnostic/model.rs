//! Diagnostic result and status models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Selling competencies the diagnostic scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competency {
    Welcome,
    Discovery,
    Argumentation,
    Closing,
    Loyalty,
}

impl Competency {
    pub const ALL: [Competency; 5] = [
        Self::Welcome,
        Self::Discovery,
        Self::Argumentation,
        Self::Closing,
        Self::Loyalty,
    ];

    /// Key used for step themes and score maps.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Discovery => "discovery",
            Self::Argumentation => "argumentation",
            Self::Closing => "closing",
            Self::Loyalty => "loyalty",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Customer welcome",
            Self::Discovery => "Needs discovery",
            Self::Argumentation => "Product argumentation",
            Self::Closing => "Closing the sale",
            Self::Loyalty => "Customer loyalty",
        }
    }
}

impl std::fmt::Display for Competency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Whether the signed-in seller has a diagnostic on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStatus {
    /// Not resolved yet, or not applicable to the role.
    #[default]
    Unknown,
    None,
    Completed,
}

impl DiagnosticStatus {
    /// Map the backend's status string. Anything but `completed` means none.
    pub fn from_wire(status: &str) -> Self {
        if status.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::None
        }
    }
}

/// Scored outcome of a diagnostic submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Competency key → score on a 1–5 scale.
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    /// Selling-style label assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DiagnosticResult {
    pub fn score(&self, competency: Competency) -> Option<f64> {
        self.scores.get(competency.key()).copied()
    }

    /// Lowest-scoring known competency, if any were scored.
    pub fn weakest(&self) -> Option<Competency> {
        self.scores
            .iter()
            .filter_map(|(k, v)| Competency::from_key(k).map(|c| (c, *v)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }
}

/// Where the result held by the session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    /// Synthesized locally from the answers.
    Preview,
    /// Returned by the submission call.
    Provisional,
    /// Confirmed by a fresh status fetch.
    Authoritative,
}

impl std::fmt::Display for ResultOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preview => write!(f, "preview"),
            Self::Provisional => write!(f, "provisional"),
            Self::Authoritative => write!(f, "authoritative"),
        }
    }
}

/// A result together with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldDiagnostic {
    pub result: DiagnosticResult,
    pub origin: ResultOrigin,
}
