//! Stop-word filtering and suffix-stripping lemmatization.
//!
//! Both sides of a lemma-overlap comparison go through `lemma_set`, so the
//! reduction only needs to be consistent, not linguistically exact: "coughing",
//! "coughs" and "cough" all reduce to `cough`; "sneeze" and "sneezing" both
//! reduce to `sneez`.
//!
//! Body-part words that general English stop lists contain ("back", "side",
//! "front", "top", "bottom") are deliberately absent from `STOP_WORDS`; they
//! are what distinguishes "back pain" from "side pain".

use std::collections::BTreeSet;

use crate::normalize::tokens;

/// General English function words.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "almost", "along", "already", "also",
    "although", "always", "am", "among", "an", "and", "another", "any", "anyone", "anything",
    "are", "around", "as", "at", "be", "became", "because", "become", "becomes", "before",
    "being", "below", "between", "both", "but", "by", "can", "cannot", "could", "did", "do",
    "does", "doing", "done", "down", "during", "each", "either", "else", "enough", "even",
    "ever", "every", "few", "for", "from", "further", "had", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "however", "if", "in", "into", "is", "it", "its",
    "itself", "just", "least", "less", "lot", "many", "may", "me", "might", "mine", "more",
    "most", "mostly", "much", "must", "myself", "neither", "never", "no", "nor", "not",
    "nothing", "now", "of", "off", "often", "on", "once", "one", "only", "or", "other", "others",
    "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "quite", "rather",
    "really", "same", "she", "should", "since", "so", "some", "someone", "something",
    "sometime", "sometimes", "still", "such", "than", "that", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "though", "through", "thus",
    "to", "together", "too", "toward", "under", "until", "up", "upon", "us", "very", "via",
    "was", "we", "well", "were", "what", "whatever", "when", "where", "whether", "which",
    "while", "who", "whole", "whom", "whose", "why", "will", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Conversational filler that carries no symptom content.
const EXTRA_NON_CONTENT: &[&str] = &[
    "feeling", "symptoms", "problem", "problems", "with", "my", "i", "have", "has", "having",
    "been", "feel", "feels", "feelings", "got", "get", "a", "the",
];

/// Irregular forms that suffix stripping cannot reach.
const IRREGULAR: &[(&str, &str)] = &[
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("children", "child"),
    ("lice", "louse"),
    ("bled", "bleed"),
    ("felt", "feel"),
    ("swollen", "swell"),
    ("threw", "throw"),
    ("thrown", "throw"),
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token) || EXTRA_NON_CONTENT.contains(&token)
}

/// Reduce one lowercase token to its lemma.
pub fn lemmatize(token: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(form, _)| *form == token) {
        return finish(lemma);
    }
    if token.chars().any(|c| c.is_ascii_digit()) || token.len() <= 3 {
        return token.to_string();
    }

    let singular = strip_plural(token);
    let base = strip_verbal(&singular);
    finish(&base)
}

/// The set of content lemmas in `text`.
///
/// Stop words and single letters are dropped; digits are kept.
pub fn lemma_set(text: &str) -> BTreeSet<String> {
    tokens(text)
        .filter(|t| !is_stop_word(t))
        .filter(|t| t.len() > 1 || t.chars().all(|c| c.is_ascii_digit()))
        .map(|t| lemmatize(&t))
        .collect()
}

fn strip_plural(token: &str) -> String {
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if token.ends_with("sses") {
        return token[..token.len() - 2].to_string();
    }
    if token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

fn strip_verbal(token: &str) -> String {
    let stem = if token.ends_with("eed") {
        None
    } else if let Some(stem) = token.strip_suffix("ing") {
        Some(stem)
    } else {
        token.strip_suffix("ed")
    };

    match stem {
        Some(stem) if stem.len() >= 3 && stem.chars().any(is_vowel) => undouble(stem),
        _ => token.to_string(),
    }
}

/// "runn" → "run", but "swell" keeps its double consonant.
fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let doubled = n >= 2 && bytes[n - 1] == bytes[n - 2] && bytes[n - 1].is_ascii_alphabetic();
    if doubled && !is_vowel(bytes[n - 1] as char) && !b"lsz".contains(&bytes[n - 1]) {
        stem[..n - 1].to_string()
    } else {
        stem.to_string()
    }
}

fn finish(word: &str) -> String {
    match word.strip_suffix('e') {
        Some(stem) if word.len() > 3 => stem.to_string(),
        _ => word.to_string(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
