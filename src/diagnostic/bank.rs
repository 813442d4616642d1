//! The fixed diagnostic question bank.
//!
//! Three questions per competency. Every step's theme is its competency key,
//! and choice options are listed from the weakest practice to the strongest,
//! which is what local preview scoring relies on.

use crate::flow::Step;

use super::model::Competency;

/// Number of questions in the bank.
pub const QUESTION_COUNT: usize = 15;

/// Build the diagnostic sequence in presentation order.
pub fn diagnostic_questions() -> Vec<Step> {
    vec![
        // Welcome
        Step::choice(
            "welcome_first_seconds",
            "A customer walks in while you are restocking a shelf. What do you do?",
            [
                "Finish restocking, they will ask if they need something",
                "Say hello from where I am and keep working",
                "Stop, make eye contact and greet them within a few seconds",
                "Greet them warmly, then give them space while staying available",
            ],
        )
        .with_theme(Competency::Welcome.key()),
        Step::choice(
            "welcome_busy_store",
            "The store is busy and a new customer is waiting. How do you handle it?",
            [
                "Serve customers strictly one at a time",
                "Signal that I have seen them when I get a moment",
                "Acknowledge them right away and tell them I will be with them shortly",
            ],
        )
        .with_theme(Competency::Welcome.key()),
        Step::free_text(
            "welcome_opening_line",
            "Write the opening line you typically use with a new customer.",
        )
        .with_theme(Competency::Welcome.key()),
        // Discovery
        Step::choice(
            "discovery_questions",
            "How do you find out what a customer really needs?",
            [
                "I show the best-selling products",
                "I ask whether they are looking for something specific",
                "I ask a few open questions about their use and context",
                "I ask open questions, rephrase their answer and confirm before proposing",
            ],
        )
        .with_theme(Competency::Discovery.key()),
        Step::choice(
            "discovery_listening",
            "While the customer explains their need, you mostly...",
            [
                "Think about which product to suggest",
                "Listen and take mental notes",
                "Listen, then summarise what I heard to check I understood",
            ],
        )
        .with_theme(Competency::Discovery.key()),
        Step::free_text(
            "discovery_hidden_need",
            "Describe a time you uncovered a need the customer had not mentioned.",
        )
        .with_theme(Competency::Discovery.key()),
        // Argumentation
        Step::choice(
            "argumentation_benefits",
            "When presenting a product, you focus on...",
            [
                "Its price",
                "Its technical characteristics",
                "Its features and what they do",
                "The benefits that match what the customer told me",
            ],
        )
        .with_theme(Competency::Argumentation.key()),
        Step::choice(
            "argumentation_objection",
            "A customer says \"It's too expensive\". Your reaction?",
            [
                "Offer a discount straight away",
                "Show a cheaper alternative",
                "Ask what they are comparing it to, then restate the value for them",
            ],
        )
        .with_theme(Competency::Argumentation.key()),
        Step::free_text(
            "argumentation_pitch",
            "Pitch your favourite product to a hesitant customer in two sentences.",
        )
        .with_theme(Competency::Argumentation.key()),
        // Closing
        Step::choice(
            "closing_signals",
            "How do you know a customer is ready to buy?",
            [
                "They tell me",
                "They stop asking questions",
                "I watch for buying signals and check with a closing question",
            ],
        )
        .with_theme(Competency::Closing.key()),
        Step::choice(
            "closing_add_on",
            "The customer has chosen a product. What happens next?",
            [
                "I take them to the till",
                "I ask whether they need anything else",
                "I suggest one relevant complementary item",
                "I suggest a complementary item tied to their need and explain why",
            ],
        )
        .with_theme(Competency::Closing.key()),
        Step::free_text(
            "closing_hesitation",
            "What do you say to a customer who hesitates at the last moment?",
        )
        .with_theme(Competency::Closing.key()),
        // Loyalty
        Step::choice(
            "loyalty_goodbye",
            "How do you end an interaction after a sale?",
            [
                "I hand over the receipt",
                "I thank them",
                "I thank them and mention after-sales support",
                "I thank them, check they are satisfied and invite them back",
            ],
        )
        .with_theme(Competency::Loyalty.key()),
        Step::choice(
            "loyalty_program",
            "How often do you present the loyalty programme?",
            [
                "Rarely",
                "When the customer asks",
                "To most customers",
                "To every customer, with the benefit that fits them",
            ],
        )
        .with_theme(Competency::Loyalty.key()),
        Step::free_text(
            "loyalty_returning_customer",
            "What do you do to make a returning customer feel recognised?",
        )
        .with_theme(Competency::Loyalty.key()),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::flow::StepKind;

    #[test]
    fn bank_has_three_questions_per_competency() {
        let steps = diagnostic_questions();
        assert_eq!(steps.len(), QUESTION_COUNT);

        let mut per_theme: HashMap<&str, usize> = HashMap::new();
        for step in &steps {
            let theme = step.theme.as_deref().unwrap();
            assert!(Competency::from_key(theme).is_some(), "unknown theme {theme}");
            *per_theme.entry(theme).or_default() += 1;
        }
        assert!(per_theme.values().all(|&n| n == 3));
        assert_eq!(per_theme.len(), Competency::ALL.len());
    }

    #[test]
    fn ids_are_unique_and_every_question_needs_an_answer() {
        let steps = diagnostic_questions();
        let ids: HashSet<_> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), steps.len());
        assert!(steps.iter().all(|s| s.kind.requires_answer()));
        assert!(
            steps
                .iter()
                .filter(|s| s.kind == StepKind::Choice)
                .all(|s| s.options.len() >= 3)
        );
    }
}
