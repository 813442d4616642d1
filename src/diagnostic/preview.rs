//! Local result preview, computed from the answers without a network call.
//!
//! Only choice answers are scored: an option's rank is spread over a 1–5
//! scale and averaged per competency theme. Free-text answers are left to the
//! backend.

use std::collections::BTreeMap;

use crate::flow::{ResponseMap, Step, StepKind};

use super::model::{Competency, DiagnosticResult};

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 5.0;

/// Synthesize a provisional-looking result from the collected answers.
pub fn preview_result(steps: &[Step], responses: &ResponseMap) -> DiagnosticResult {
    let mut totals: BTreeMap<Competency, (f64, u32)> = BTreeMap::new();

    for step in steps.iter().filter(|s| s.kind == StepKind::Choice) {
        let Some(competency) = step.theme.as_deref().and_then(Competency::from_key) else {
            continue;
        };
        let Some(rank) = responses.get(&step.id).and_then(|a| step.option_rank(a)) else {
            continue;
        };
        let entry = totals.entry(competency).or_insert((0.0, 0));
        entry.0 += rank_score(rank, step.options.len());
        entry.1 += 1;
    }

    let scores = totals
        .into_iter()
        .map(|(c, (sum, n))| (c.key().to_string(), round_tenth(sum / f64::from(n))))
        .collect();

    let mut result = DiagnosticResult {
        scores,
        ..DiagnosticResult::default()
    };
    result.recommendation = match result.weakest() {
        Some(c) => format!(
            "Focus your next coaching sessions on {}.",
            c.label().to_lowercase()
        ),
        None => "Answer the questionnaire to get a recommendation.".to_string(),
    };
    result
}

fn rank_score(rank: usize, options: usize) -> f64 {
    if options <= 1 {
        return MAX_SCORE;
    }
    MIN_SCORE + (MAX_SCORE - MIN_SCORE) * rank as f64 / (options - 1) as f64
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
