//! Canonicalization of spoken-phrase text.

use regex::Regex;

/// Normalize free-form transcript text so equivalent utterances compare
/// equal: lowercase, strip everything outside `[a-z0-9 ]`, trim.
///
/// Total and idempotent. Must be applied identically to the phrase chosen at
/// registration and to the transcript submitted at verification.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    Regex::new(r"[^a-z0-9 ]+").map_or_else(
        |_| lowered.trim().to_string(),
        |re| re.replace_all(&lowered, "").trim().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("My Secret, Mango!"), "my secret mango");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  open sesame  "), "open sesame");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Phrase 42!"), "phrase 42");
    }

    #[test]
    fn idempotent() {
        let once = normalize("My Secret, Mango!");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn total_on_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!…"), "");
    }
}
