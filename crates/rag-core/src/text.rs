//! Text tokenization shared by indexing and querying.

/// Lower-case `text` and split it on every non-alphanumeric character.
///
/// No stemming or stop-word removal is applied.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
