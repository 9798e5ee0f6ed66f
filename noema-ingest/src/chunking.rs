//! Content chunking: char-budget windows with overlap, snapped to
//! whitespace boundaries so words are never split.

use serde::{Deserialize, Serialize};

/// Chunking knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub max_chars: usize,
    /// Characters of overlap between consecutive chunks.
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1200,
            overlap_chars: 200,
        }
    }
}

/// One chunk with its char-offset span in the source content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split content into overlapping chunks. Offsets are char positions.
/// Whitespace-only content yields no chunks.
pub fn split(content: &str, config: &ChunkingConfig) -> Vec<ChunkSpan> {
    let chars: Vec<char> = content.chars().collect();
    let max_chars = config.max_chars.max(1);
    let mut spans = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            // Snap back to the last whitespace inside the window.
            if let Some(ws) = (start + 1..end).rev().find(|&i| chars[i].is_whitespace()) {
                end = ws;
            }
        }

        let text: String = chars[start..end].iter().collect::<String>().trim().to_string();
        if !text.is_empty() {
            spans.push(ChunkSpan { start, end, text });
        }

        if end >= chars.len() {
            break;
        }
        // Restart inside the overlap, snapped forward so the next chunk
        // never begins mid-word.
        let mut next = end.saturating_sub(config.overlap_chars).max(start + 1);
        while next < chars.len()
            && next > 0
            && !chars[next - 1].is_whitespace()
            && !chars[next].is_whitespace()
        {
            next += 1;
        }
        start = next;
    }
    spans
}
