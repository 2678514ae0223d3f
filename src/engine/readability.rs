//! Readability scoring.
//!
//! The built-in scorer computes Flesch reading ease:
//! `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`.

/// Produces a reading-ease score (roughly 0-100, higher is easier).
pub trait ReadabilityScorer: Send + Sync {
    /// `None` when the text cannot be scored.
    fn reading_ease(&self, text: &str) -> Option<f64>;
}

/// Flesch reading ease with a vowel-group syllable heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleschScorer;

impl ReadabilityScorer for FleschScorer {
    fn reading_ease(&self, text: &str) -> Option<f64> {
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return None;
        }

        let word_count = words.len() as f64;
        let sentence_count = count_sentences(text).max(1) as f64;
        let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();

        Some(
            206.835
                - 1.015 * (word_count / sentence_count)
                - 84.6 * (syllable_count as f64 / word_count),
        )
    }
}

/// Runs of `.`, `!` or `?` each end one sentence.
fn count_sentences(text: &str) -> usize {
    let mut count = 0;
    let mut in_terminator = false;
    for c in text.chars() {
        let is_terminator = matches!(c, '.' | '!' | '?');
        if is_terminator && !in_terminator {
            count += 1;
        }
        in_terminator = is_terminator;
    }
    count
}

/// Vowel groups, minus a silent trailing `e`, at least one per word.
fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    if word.chars().all(|c| c.is_ascii_digit()) {
        return 1;
    }

    let mut count = 0;
    let mut previous_vowel = false;
    for c in word.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}
