//! Prompt construction for the fine-tuned healthcare model.
//!
//! The model was trained on prompts shaped as
//! `<SYSTEM_PROMPT> dialogue: <q> Response: <a> ... question: <new question>`.
//! The literal markers and single spaces must stay exactly as produced here;
//! the model does not fail on other shapes, its answers just get worse.

use crate::models::ConversationTurn;

/// Persona and behaviour instruction placed at the start of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a highly compassionate, clear, and accurate Medical Expert and AI Healthcare Assistant. Your primary goal is to provide comprehensive, easy-to-understand, and actionable health information based on your training. Structure your detailed answers using clear headings, bullet points, and numbered lists where appropriate for maximum clarity and readability. If the question is clearly outside the domain of medicine or healthcare, you MUST politely state your limitation and advise the user to consult an expert in that specific field. You must use the entire conversation history for context.";

/// Reply for a first-turn greeting. Returned without running the model.
pub const GREETING_RESPONSE: &str = "Hello! 👋 I'm your Healthcare Assistant, here to help you with medical questions and health information.

I can assist you with:
• Understanding symptoms and conditions
• General health advice and wellness tips
• Medication information
• Preventive care guidance
• And much more!

Please note that while I strive to provide accurate and helpful information, I'm not a substitute for professional medical advice. For serious concerns or emergencies, please consult a healthcare professional.

How can I help you today?";

/// Messages treated as a plain greeting after normalization.
pub const GREETINGS: [&str; 4] = ["hi", "hello", "hey", "greetings"];

const TRAILING_PUNCTUATION: [char; 4] = ['!', '.', ',', '?'];

/// What the gateway should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedRequest {
    /// Answer with this text directly.
    Greeting(&'static str),
    /// Send this prompt to the model.
    Prompt(String),
}

/// Lowercase, trim, then drop trailing `!`, `.`, `,` and `?`.
pub fn normalize_message(message: &str) -> String {
    message
        .to_lowercase()
        .trim()
        .trim_end_matches(TRAILING_PUNCTUATION)
        .to_string()
}

pub fn is_greeting(message: &str) -> bool {
    let normalized = normalize_message(message);
    GREETINGS.contains(&normalized.as_str())
}

/// `dialogue: <user> Response: <model>` per turn, space separated, with a
/// trailing space. Empty for an empty history.
pub fn build_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut serialized = history
        .iter()
        .map(|turn| format!("dialogue: {} Response: {}", turn.user, turn.model))
        .collect::<Vec<_>>()
        .join(" ");
    serialized.push(' ');
    serialized
}

pub fn build_prompt(history: &[ConversationTurn], new_message: &str) -> String {
    format!(
        "{} {}question: {}",
        SYSTEM_PROMPT,
        build_history(history),
        new_message
    )
}

/// Greeting short-circuit applies only to the first turn of a conversation.
pub fn format_request(history: &[ConversationTurn], new_message: &str) -> FormattedRequest {
    if history.is_empty() && is_greeting(new_message) {
        return FormattedRequest::Greeting(GREETING_RESPONSE);
    }

    FormattedRequest::Prompt(build_prompt(history, new_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_greetings_short_circuit() {
        for message in ["hi", "Hello!", "HEY", "greetings?"] {
            assert_eq!(
                format_request(&[], message),
                FormattedRequest::Greeting(GREETING_RESPONSE),
                "{message:?} should be treated as a greeting"
            );
        }
    }

    #[test]
    fn normalization_trims_and_strips_trailing_punctuation() {
        assert_eq!(normalize_message("  Hello!!  "), "hello");
        assert_eq!(normalize_message("hey?!.,"), "hey");
        assert_eq!(normalize_message("Hi there!"), "hi there");
    }

    #[test]
    fn greeting_with_extra_words_is_not_a_greeting() {
        assert!(!is_greeting("hi there"));
        assert!(!is_greeting("hello doctor"));
        assert!(!is_greeting("!hi"));
    }

    #[test]
    fn greeting_with_history_goes_to_the_model() {
        let history = vec![ConversationTurn::new("What is flu?", "Influenza is a viral infection.")];

        match format_request(&history, "hello") {
            FormattedRequest::Prompt(prompt) => {
                assert!(prompt.ends_with("Response: Influenza is a viral infection. question: hello"));
            }
            other => panic!("expected a prompt, got {other:?}"),
        }
    }

    #[test]
    fn empty_history_prompt_has_no_dialogue_segment() {
        let message = "what are the symptoms of diabetes?";
        let FormattedRequest::Prompt(prompt) = format_request(&[], message) else {
            panic!("expected a prompt");
        };

        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("question: what are the symptoms of diabetes?"));
        assert!(!prompt.contains("dialogue:"));
        assert_eq!(prompt, format!("{SYSTEM_PROMPT} question: {message}"));
    }

    #[test]
    fn history_is_serialized_before_the_question() {
        let history = vec![ConversationTurn::new(
            "What is diabetes?",
            "Diabetes is a chronic condition...",
        )];

        let prompt = build_prompt(&history, "How is it treated?");

        assert!(prompt.contains(
            "dialogue: What is diabetes? Response: Diabetes is a chronic condition... question: How is it treated?"
        ));
    }

    #[test]
    fn history_turns_keep_their_order() {
        let history = vec![
            ConversationTurn::new("q1", "a1"),
            ConversationTurn::new("q2", "a2"),
        ];

        assert_eq!(
            build_history(&history),
            "dialogue: q1 Response: a1 dialogue: q2 Response: a2 "
        );
        assert_eq!(build_history(&[]), "");
    }

    #[test]
    fn formatting_is_deterministic() {
        let history = vec![ConversationTurn::new("What is asthma?", "A chronic lung condition.")];

        assert_eq!(
            format_request(&history, "Is it curable?"),
            format_request(&history, "Is it curable?")
        );
        assert_eq!(format_request(&[], "hi"), format_request(&[], "hi"));
    }

    #[test]
    fn message_is_inserted_verbatim() {
        let FormattedRequest::Prompt(prompt) = format_request(&[], "  Why?  ") else {
            panic!("expected a prompt");
        };
        assert!(prompt.ends_with("question:   Why?  "));
    }
}
