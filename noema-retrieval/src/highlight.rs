//! Highlight extraction: short content windows around query-token matches.

/// Maximum snippets per result.
const MAX_SNIPPETS: usize = 3;

/// Characters of context on each side of a match.
const CONTEXT_CHARS: usize = 40;

/// Extract up to three snippets of content around query-token matches.
/// Matching is case-insensitive; windows snap to char boundaries.
pub fn snippets(query_text: &str, content: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut covered: Vec<(usize, usize)> = Vec::new();

    for token in query_text.split_whitespace() {
        if found.len() >= MAX_SNIPPETS {
            break;
        }
        let token: Vec<char> = token.chars().flat_map(char::to_lowercase).collect();
        if token.is_empty() {
            continue;
        }
        let Some((pos, match_end)) = find_case_insensitive(content, &token) else {
            continue;
        };

        let start = floor_char_boundary(content, pos.saturating_sub(CONTEXT_CHARS));
        let end = ceil_char_boundary(content, (match_end + CONTEXT_CHARS).min(content.len()));
        if covered.iter().any(|&(s, e)| pos >= s && pos < e) {
            continue;
        }
        covered.push((start, end));

        let mut snippet = content[start..end].trim().to_string();
        if start > 0 {
            snippet = format!("...{snippet}");
        }
        if end < content.len() {
            snippet = format!("{snippet}...");
        }
        found.push(snippet);
    }
    found
}

/// First occurrence of `token` (already case-folded) in `content`,
/// compared char-wise after folding, as byte offsets into `content`.
/// Folds that change byte length cannot shift the reported window.
fn find_case_insensitive(content: &str, token: &[char]) -> Option<(usize, usize)> {
    for (start, _) in content.char_indices() {
        let mut remaining = token.iter();
        let mut needed = remaining.next();
        for (offset, c) in content[start..].char_indices() {
            let mut mismatch = false;
            for folded in c.to_lowercase() {
                match needed {
                    Some(&want) if want == folded => needed = remaining.next(),
                    _ => {
                        mismatch = true;
                        break;
                    }
                }
            }
            if mismatch {
                break;
            }
            if needed.is_none() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
    }
    None
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_window_around_the_match() {
        let content = "this is a very long preamble of filler text before the api key \
                       reset instructions and plenty more text afterwards";
        let snippets = snippets("reset", content);
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].contains("reset"));
        assert!(snippets[0].starts_with("..."));
        assert!(snippets[0].ends_with("..."));
    }

    #[test]
    fn no_match_means_no_snippets() {
        assert!(snippets("quantum", "nothing related at all").is_empty());
    }

    #[test]
    fn overlapping_tokens_share_one_window() {
        let content = "reset your key here";
        let snippets = snippets("reset key", content);
        assert_eq!(snippets.len(), 1);
    }

    #[test]
    fn length_changing_case_folds_keep_the_window_aligned() {
        // 'İ' gains a byte when lowercased; offsets must index the
        // original content, not a folded copy of it.
        let content = format!("{} reset the key", "İ".repeat(45));
        let result = snippets("reset", &content);
        assert_eq!(result.len(), 1);
        assert!(result[0].contains("reset"));
    }

    #[test]
    fn multibyte_content_does_not_split_chars() {
        let content = "préambule très long avant la réinitialisation de la clé après";
        let result = snippets("réinitialisation", content);
        assert_eq!(result.len(), 1);
        assert!(result[0].contains("réinitialisation"));
    }
}
