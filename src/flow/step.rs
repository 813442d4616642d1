//! Step definitions shared by the diagnostic questionnaire and the
//! onboarding tutorial.

use serde::{Deserialize, Serialize};

/// How a step collects (or doesn't collect) an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Pick one of `options`.
    Choice,
    /// Any non-blank text.
    FreeText,
    /// Display only; always permits advance.
    Informational,
}

impl StepKind {
    /// Whether the step needs an answer before the flow may move past it.
    pub fn requires_answer(&self) -> bool {
        !matches!(self, Self::Informational)
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Choice => write!(f, "choice"),
            Self::FreeText => write!(f, "free_text"),
            Self::Informational => write!(f, "informational"),
        }
    }
}

/// One unit of a flow: a question or a tutorial panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub kind: StepKind,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl Step {
    fn new(id: impl Into<String>, kind: StepKind, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            prompt: prompt.into(),
            options: Vec::new(),
            theme: None,
            title: None,
            icon: None,
            image: None,
            tip: None,
        }
    }

    /// A multiple-choice question. Options are kept in the given order.
    pub fn choice<I, S>(id: impl Into<String>, prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut step = Self::new(id, StepKind::Choice, prompt);
        step.options = options.into_iter().map(Into::into).collect();
        step
    }

    /// An open question.
    pub fn free_text(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(id, StepKind::FreeText, prompt)
    }

    /// A display-only panel.
    pub fn panel(id: impl Into<String>, title: impl Into<String>, prompt: impl Into<String>) -> Self {
        let mut step = Self::new(id, StepKind::Informational, prompt);
        step.title = Some(title.into());
        step
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }

    /// Whether `answer` satisfies this step.
    ///
    /// Blank answers never do. Choice answers must match an option exactly.
    pub fn accepts(&self, answer: &str) -> bool {
        match self.kind {
            StepKind::Informational => true,
            StepKind::FreeText => !answer.trim().is_empty(),
            StepKind::Choice => {
                !answer.trim().is_empty() && self.options.iter().any(|o| o == answer)
            }
        }
    }

    /// Zero-based rank of a choice answer among the options.
    pub fn option_rank(&self, answer: &str) -> Option<usize> {
        self.options.iter().position(|o| o == answer)
    }
}
