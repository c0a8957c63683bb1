//! Word-level edit-distance matching.
//!
//! Used as the last rung of the symbol, name and tag ladders: a keyword that
//! is one typo away from any whitespace-delimited word of the text counts as a
//! weak match.

/// Default edit distance accepted by [`fuzzy_match`].
pub const DEFAULT_MAX_DISTANCE: usize = 1;

/// Levenshtein distance between two strings, counted in chars.
///
/// Full dynamic-programming matrix with unit cost for insert, delete and
/// substitute.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a.len()][b.len()]
}

/// Check whether `keyword` fuzzily matches any word of `text`.
///
/// Single-character keywords fall back to plain substring containment.
/// Callers pass both sides already lowercased.
pub fn fuzzy_match(text: &str, keyword: &str, max_distance: usize) -> bool {
    if keyword.chars().count() <= 1 {
        return text.contains(keyword);
    }

    text.split_whitespace()
        .any(|word| levenshtein(word, keyword) <= max_distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "ab"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("aapl", "appl"), 1);
        assert_eq!(levenshtein("aapl", "xppl"), 2);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_fuzzy_match_single_typo() {
        assert!(fuzzy_match("aapl", "appl", DEFAULT_MAX_DISTANCE));
        assert!(!fuzzy_match("aapl", "xppl", DEFAULT_MAX_DISTANCE));
    }

    #[test]
    fn test_fuzzy_match_checks_each_word() {
        assert!(fuzzy_match("apple inc", "aple", 1));
        assert!(fuzzy_match("the vanguard group", "grup", 1));
        assert!(!fuzzy_match("apple inc", "microsoft", 1));
    }

    #[test]
    fn test_single_char_keyword_uses_containment() {
        assert!(fuzzy_match("tesla", "s", 1));
        // Edit distance would accept this, containment does not
        assert!(!fuzzy_match("tesla", "x", 1));
    }

    #[test]
    fn test_empty_text_never_matches_multi_char_keyword() {
        assert!(!fuzzy_match("", "ab", 1));
        assert!(!fuzzy_match("   ", "ab", 1));
    }
}
