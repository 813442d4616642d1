//! Flow state — which step is shown and which gates are closed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::responses::ResponseMap;

/// Which indices `go_to` may jump to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    /// Visited, completed, or explicitly marked indices only.
    #[default]
    Visited,
    /// Any in-range index.
    Free,
}

/// Observable state of one flow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub current_index: usize,
    pub is_transitioning: bool,
    pub is_submitting: bool,
    /// Set once the final step's completion has been accepted.
    pub is_finished: bool,
    /// Indices the user has moved past with `advance`.
    pub completed_indices: BTreeSet<usize>,
    /// Indices that have been displayed at least once.
    pub visited: BTreeSet<usize>,
    /// Indices unlocked by a progress control.
    pub reachable: BTreeSet<usize>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_transitioning: false,
            is_submitting: false,
            is_finished: false,
            completed_indices: BTreeSet::new(),
            visited: BTreeSet::from([0]),
            reachable: BTreeSet::new(),
        }
    }
}

impl FlowState {
    /// Whether a transition or submission currently owns the flow.
    pub fn is_busy(&self) -> bool {
        self.is_transitioning || self.is_submitting
    }

    /// Whether `index` may be jumped to under `policy`.
    pub fn can_reach(&self, index: usize, policy: Reachability) -> bool {
        match policy {
            Reachability::Free => true,
            Reachability::Visited => {
                self.visited.contains(&index)
                    || self.completed_indices.contains(&index)
                    || self.reachable.contains(&index)
            }
        }
    }
}

/// Why an input was ignored. Preconditions fail closed; nothing is thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ignored {
    /// A transition or submission is in progress.
    Busy,
    /// The current step needs a non-blank answer first.
    AnswerMissing,
    /// Already on the first step.
    AtStart,
    OutOfRange,
    Unreachable,
    /// Target is the current step.
    Unchanged,
    UnknownStep,
    /// Informational steps take no answer.
    NotAnswerable,
    /// Answer is not one of the step's options.
    InvalidChoice,
    /// The flow was reset while this input was pending.
    Superseded,
    /// The flow has finished or been torn down.
    Closed,
}

impl std::fmt::Display for Ignored {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Busy => "busy",
            Self::AnswerMissing => "answer_missing",
            Self::AtStart => "at_start",
            Self::OutOfRange => "out_of_range",
            Self::Unreachable => "unreachable",
            Self::Unchanged => "unchanged",
            Self::UnknownStep => "unknown_step",
            Self::NotAnswerable => "not_answerable",
            Self::InvalidChoice => "invalid_choice",
            Self::Superseded => "superseded",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// The last step was confirmed; the owner must now complete the flow.
    Finished(ResponseMap),
    Ignored(Ignored),
}

impl Navigation {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_first_step_visited() {
        let state = FlowState::default();
        assert_eq!(state.current_index, 0);
        assert!(!state.is_busy());
        assert!(state.visited.contains(&0));
        assert!(state.completed_indices.is_empty());
    }

    #[test]
    fn busy_when_either_gate_closed() {
        let transitioning = FlowState {
            is_transitioning: true,
            ..Default::default()
        };
        let submitting = FlowState {
            is_submitting: true,
            ..Default::default()
        };
        assert!(transitioning.is_busy());
        assert!(submitting.is_busy());
    }

    #[test]
    fn visited_policy_respects_marks() {
        let mut state = FlowState::default();
        assert!(state.can_reach(0, Reachability::Visited));
        assert!(!state.can_reach(3, Reachability::Visited));
        assert!(state.can_reach(3, Reachability::Free));

        state.reachable.insert(3);
        assert!(state.can_reach(3, Reachability::Visited));
    }

    #[test]
    fn display_matches_serde() {
        for reason in [Ignored::Busy, Ignored::AnswerMissing, Ignored::InvalidChoice, Ignored::Closed] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(format!("\"{reason}\""), json, "mismatch for {reason:?}");
        }
    }
}
