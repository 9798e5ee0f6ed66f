//! Property tests for the chunker: word preservation and budgets.

use proptest::prelude::*;

use noema_ingest::{chunking, ChunkingConfig};

fn words() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,8}", 1..25)
}

proptest! {
    #[test]
    fn chunks_respect_the_char_budget(
        words in words(),
        max_chars in 10usize..40,
        overlap_chars in 0usize..8,
    ) {
        let content = words.join(" ");
        let config = ChunkingConfig { max_chars, overlap_chars };
        for span in chunking::split(&content, &config) {
            prop_assert!(span.text.chars().count() <= max_chars);
            prop_assert!(!span.text.is_empty());
        }
    }

    #[test]
    fn every_word_survives_chunking(
        words in words(),
        max_chars in 10usize..40,
        overlap_chars in 0usize..8,
    ) {
        let content = words.join(" ");
        let config = ChunkingConfig { max_chars, overlap_chars };
        let joined = chunking::split(&content, &config)
            .iter()
            .map(|s| s.text.clone())
            .collect::<Vec<_>>()
            .join(" ");
        for word in &words {
            prop_assert!(joined.contains(word.as_str()), "lost {word:?}");
        }
    }

    #[test]
    fn no_chunk_begins_or_ends_mid_word(
        words in words(),
        max_chars in 10usize..40,
        overlap_chars in 0usize..8,
    ) {
        let content = words.join(" ");
        let config = ChunkingConfig { max_chars, overlap_chars };
        for span in chunking::split(&content, &config) {
            for token in span.text.split_whitespace() {
                prop_assert!(
                    words.iter().any(|w| w == token),
                    "fragment {token:?} is not a source word"
                );
            }
        }
    }
}
