//! Coarse per-message language guessing.
//!
//! A stopword-overlap heuristic over a small built-in inventory. This is
//! explicitly approximate: the guess carries a reliability flag and makes
//! no accuracy promise. Single-word messages and messages sharing words
//! across languages routinely come back unreliable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Languages the heuristic can distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English.
    English,
    /// Hungarian.
    Hungarian,
    /// German.
    German,
    /// Spanish.
    Spanish,
    /// No stopword matched any inventory.
    Unknown,
}

/// A best-guess language tag for one message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageGuess {
    /// The guessed language.
    pub language: Language,
    /// `true` when the guess cleared the hit-count and margin thresholds.
    pub reliable: bool,
}

const ENGLISH: &[&str] = &[
    "the", "and", "you", "that", "was", "for", "are", "with", "this", "have", "not", "but",
    "what", "all", "your", "can", "will", "how", "when", "there",
];

const HUNGARIAN: &[&str] = &[
    "és", "hogy", "nem", "egy", "van", "azt", "meg", "csak", "akkor", "már", "mert", "igen",
    "lesz", "mit", "jól", "most", "vagy", "szia", "nagyon", "még",
];

const GERMAN: &[&str] = &[
    "und", "der", "die", "das", "ich", "nicht", "ist", "aber", "auch", "mit", "wie", "für",
    "wir", "noch", "dann", "schon", "was", "doch", "sie", "ein",
];

const SPANISH: &[&str] = &[
    "que", "los", "por", "con", "una", "para", "está", "pero", "como", "más", "este", "bien",
    "muy", "hay", "todo", "gracias", "hola", "qué", "sí", "del",
];

const INVENTORIES: [(Language, &[&str]); 4] = [
    (Language::English, ENGLISH),
    (Language::Hungarian, HUNGARIAN),
    (Language::German, GERMAN),
    (Language::Spanish, SPANISH),
];

/// Minimum stopword hits before a guess counts as reliable.
const MIN_HITS: usize = 2;
/// Required lead over the runner-up language.
const MIN_MARGIN: usize = 2;

/// Guesses the language of one message from its lowercased tokens.
///
/// # Example
///
/// ```
/// use chatstats::language::{Language, guess_language};
///
/// let tokens = ["what", "are", "you", "doing"].map(String::from);
/// let guess = guess_language(&tokens);
/// assert_eq!(guess.language, Language::English);
/// assert!(guess.reliable);
/// ```
pub fn guess_language(tokens: &[String]) -> LanguageGuess {
    let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();

    let mut hits: Vec<(Language, usize)> = INVENTORIES
        .iter()
        .map(|(lang, words)| {
            let count = words.iter().filter(|w| token_set.contains(**w)).count();
            (*lang, count)
        })
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));

    let (best_lang, best) = hits[0];
    let runner_up = hits[1].1;

    if best == 0 {
        return LanguageGuess {
            language: Language::Unknown,
            reliable: false,
        };
    }

    LanguageGuess {
        language: best_lang,
        reliable: best >= MIN_HITS && best - runner_up >= MIN_MARGIN,
    }
}
