//! Location hint extraction from free text

/// Prepositions that usually introduce a place
const LOCATION_PREPOSITIONS: &[&str] = &["near", "at", "in", "on", "beside", "opposite"];

/// Words taken after the preposition
const HINT_WORDS: usize = 3;

/// Up to three words following the first location preposition.
///
/// Words are split on whitespace and returned as written; a preposition that
/// ends the text yields nothing and the scan continues.
pub fn extract_location(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .iter()
        .enumerate()
        .find(|(i, word)| {
            i + 1 < words.len()
                && LOCATION_PREPOSITIONS
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(word))
        })
        .map(|(i, _)| {
            let end = (i + 1 + HINT_WORDS).min(words.len());
            words[i + 1..end].join(" ")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_following_words() {
        assert_eq!(
            extract_location("Garbage pile near Central Market gate 4").as_deref(),
            Some("Central Market gate")
        );
        assert_eq!(
            extract_location("Pipe burst At school").as_deref(),
            Some("school")
        );
    }

    #[test]
    fn test_first_preposition_wins() {
        assert_eq!(
            extract_location("leak in kitchen near park").as_deref(),
            Some("kitchen near park")
        );
    }

    #[test]
    fn test_trailing_preposition_skipped() {
        assert_eq!(extract_location("lights are not on"), None);
        assert_eq!(extract_location(""), None);
        assert_eq!(extract_location("no place mentioned"), None);
    }
}
