//! Built-in card catalog and defaults.

use std::time::Duration;

use super::schema::{Catalog, ContextEntry, ThemeEntry};

/// Default open discussion length (7 minutes).
pub const DISCUSSION: Duration = Duration::from_secs(420);

/// Smallest supported table.
pub const MIN_PLAYERS: usize = 3;

/// Largest supported table.
pub const MAX_PLAYERS: usize = 6;

const THEMES: [(&str, &str, &str); 6] = [
    ("angry", "Angry", "/images/angry.jpg"),
    ("fear", "Scared", "/images/fear.jpg"),
    ("jealous", "Jealous", "/images/jealous.jpg"),
    ("sad", "Sad", "/images/sad.jpg"),
    ("shy", "Shy", "/images/shy.jpg"),
    ("worried", "Worried", "/images/worried.jpg"),
];

const CONTEXTS: [(&str, &str, &str); 11] = [
    (
        "wrong-answer",
        "Gave the teacher a wrong answer",
        "/images/situation_1.jpg",
    ),
    (
        "dropped-ice-cream",
        "Dropped an ice cream",
        "/images/situation_2.jpg",
    ),
    (
        "pushed-over",
        "A friend pushed me over",
        "/images/situation_3.jpg",
    ),
    (
        "group-work",
        "A friend didn't help with group work",
        "/images/situation_4.jpg",
    ),
    (
        "left-out",
        "Friends wouldn't let me play",
        "/images/situation_5.jpg",
    ),
    (
        "showing-off",
        "A friend showed off a new toy",
        "/images/situation_6.jpg",
    ),
    (
        "no-trip",
        "Mom wouldn't take me on a trip",
        "/images/situation_7.jpg",
    ),
    (
        "no-outing",
        "Mom wouldn't take me out",
        "/images/situation_8.jpg",
    ),
    (
        "forgot-homework",
        "Forgot to hand in my homework",
        "/images/situation_9.jpg",
    ),
    (
        "failed-test",
        "Failed a test I studied hard for",
        "/images/situation_10.jpg",
    ),
    (
        "wrong-outfit",
        "Wore the wrong outfit on the wrong day",
        "/images/situation_11.jpg",
    ),
];

const PROMPTS: [&str; 9] = [
    "Have you felt this emotion recently?",
    "If something imaginary happened to you, would you feel this emotion?",
    "How would you show it if you felt this emotion?",
    "Would you talk to someone about it if you felt this emotion?",
    "Make the face that goes with your emotion.",
    "What would you say to someone who feels this emotion?",
    "Give three words for your emotion.",
    "Is there anything you would like to tell yourself?",
    "Sing one line of a song that fits this emotion.",
];

const REVIEW_PROMPT: &str = "If I were in this situation and felt this emotion, I would...";

/// Returns the catalog used when no configuration file overrides it.
#[must_use]
pub fn builtin_catalog() -> Catalog {
    Catalog {
        themes: THEMES
            .iter()
            .map(|(id, label, image)| ThemeEntry::new(id, label, image))
            .collect(),
        contexts: CONTEXTS
            .iter()
            .map(|(id, label, image)| ContextEntry::new(id, label, image))
            .collect(),
        prompts: PROMPTS.iter().map(ToString::to_string).collect(),
        review_prompt: Some(REVIEW_PROMPT.to_string()),
    }
}
