//! Text normalization shared by the extractors and the classical model.

/// Lowercase, replace every character outside `[a-z0-9\s]` with a space,
/// collapse whitespace runs, and trim.
///
/// ```
/// use healix_nlp::normalize::clean_text;
/// assert_eq!(clean_text("  Sore-Throat!!  and\tFEVER "), "sore throat and fever");
/// ```
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = String> {
    clean_text(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}
