//! Text chunking with configurable size and overlap.
//!
//! Passages are measured in characters. A cut is placed at the last
//! paragraph break that fits the window, falling back to a line break, a
//! sentence end and finally any whitespace. Cuts always land on whitespace,
//! so words are never split; a word longer than the window is emitted whole.
//!
//! The next passage starts on a word boundary at least `overlap` characters
//! before the end of the previous one.

use crate::types::{Chunk, Document};

/// Split text into trimmed, non-empty, overlapping passages.
pub fn split(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let size = chunk_size.max(1);
    let overlap = chunk_overlap.min(size - 1);

    let mut passages = Vec::new();
    let mut start = skip_whitespace(&chars, 0);

    while start < n {
        if n - start <= size {
            push_passage(&mut passages, &chars[start..]);
            break;
        }

        let cut = find_cut(&chars, start, size, overlap);
        push_passage(&mut passages, &chars[start..cut]);

        let after_cut = skip_whitespace(&chars, cut);
        if after_cut >= n {
            break;
        }
        start = next_start(&chars, start, cut, overlap).unwrap_or(after_cut);
    }

    tracing::debug!(
        "Split {} chars into {} passages (size: {}, overlap: {})",
        n,
        passages.len(),
        size,
        overlap
    );

    passages
}

/// Chunk a document, tagging each passage with its file name.
pub fn chunk_document(doc: &Document, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    split(&doc.text, chunk_size, chunk_overlap)
        .into_iter()
        .map(|content| Chunk {
            content,
            source: doc.filename.clone(),
        })
        .collect()
}

type CutRule = fn(&[char], usize) -> bool;

const CUT_RULES: [CutRule; 4] = [is_paragraph_break, is_line_break, is_sentence_end, is_space];

/// Exclusive end of the passage starting at `start`. Requires `start + size < chars.len()`.
fn find_cut(chars: &[char], start: usize, size: usize, overlap: usize) -> usize {
    let last = start + size;

    // A cut only counts if the next passage can start inside it, `overlap` back
    let keeps_overlap = |p: usize| {
        trimmed_end(chars, start, p) > start + overlap
            && (overlap == 0 || next_start(chars, start, p, overlap).is_some())
    };

    for rule in CUT_RULES {
        let found = (start + 1..=last)
            .rev()
            .find(|&p| rule(chars, p) && keeps_overlap(p));
        if let Some(p) = found {
            return p;
        }
    }

    // Words too long to leave room for the overlap
    if let Some(p) = (start + 1..=last).rev().find(|&p| is_space(chars, p)) {
        return p;
    }

    (last..chars.len())
        .find(|&p| is_space(chars, p))
        .unwrap_or(chars.len())
}

/// Latest word start that keeps `overlap` characters shared with the passage `start..cut`.
fn next_start(chars: &[char], start: usize, cut: usize, overlap: usize) -> Option<usize> {
    if overlap == 0 {
        return None;
    }
    let target = trimmed_end(chars, start, cut).checked_sub(overlap)?;
    (start + 1..=target).rev().find(|&p| is_word_start(chars, p))
}

fn push_passage(passages: &mut Vec<String>, chars: &[char]) {
    let passage: String = chars.iter().collect();
    let trimmed = passage.trim();
    if !trimmed.is_empty() {
        passages.push(trimmed.to_string());
    }
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn trimmed_end(chars: &[char], start: usize, mut end: usize) -> usize {
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    end
}

fn is_space(chars: &[char], p: usize) -> bool {
    chars[p].is_whitespace()
}

fn is_line_break(chars: &[char], p: usize) -> bool {
    chars[p] == '\n'
}

fn is_paragraph_break(chars: &[char], p: usize) -> bool {
    chars[p] == '\n' && chars.get(p + 1) == Some(&'\n')
}

fn is_sentence_end(chars: &[char], p: usize) -> bool {
    p > 0 && chars[p].is_whitespace() && matches!(chars[p - 1], '.' | '!' | '?')
}

fn is_word_start(chars: &[char], p: usize) -> bool {
    p > 0 && !chars[p].is_whitespace() && chars[p - 1].is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn brand_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence {} describes how the brand voice stays warm.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_split_empty() {
        assert!(split("", 100, 10).is_empty());
        assert!(split(" \n\n\t ", 100, 10).is_empty());
    }

    #[test]
    fn test_short_text_is_one_passage() {
        assert_eq!(split("  Be kind. Be brief.  ", 100, 10), vec!["Be kind. Be brief."]);
    }

    #[test]
    fn test_passages_respect_size_and_are_trimmed() {
        let text = brand_text(40);
        let passages = split(&text, 120, 30);

        assert!(passages.len() > 1);
        for passage in &passages {
            assert!(!passage.is_empty());
            assert!(passage.chars().count() <= 120, "too long: {}", passage);
            assert_eq!(passage.trim(), passage);
        }
    }

    #[test]
    fn test_consecutive_passages_overlap() {
        let text = brand_text(40);
        let overlap = 30;
        let passages = split(&text, 120, overlap);

        for pair in passages.windows(2) {
            let head: String = pair[1].chars().take(overlap).collect();
            assert!(
                pair[0].contains(&head),
                "{:?} does not share its head with {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    fn assert_overlaps(passages: &[String], overlap: usize) {
        for pair in passages.windows(2) {
            let head: String = pair[1].chars().take(overlap).collect();
            assert!(pair[0].contains(&head), "{:?} / {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_early_sentence_end_does_not_drop_overlap() {
        let text = "Extraordinarily fun. and then we keep talking without stopping for quite a while here";
        let passages = split(text, 40, 10);

        assert_eq!(passages[0], "Extraordinarily fun. and then we keep");
        assert!(passages[1].starts_with("then we keep"));
        assert_overlaps(&passages, 10);
    }

    #[test]
    fn test_long_first_sentence_keeps_default_overlap() {
        let filler = vec!["calm brand voice stays warm and kind"; 60].join(" ");
        let text = format!("{} ok. {}", "w".repeat(147), filler);
        let passages = split(&text, 800, 150);

        assert!(passages.len() > 2);
        assert!(passages.iter().all(|p| p.chars().count() <= 800));
        assert_overlaps(&passages, 150);
    }

    #[test]
    fn test_multibyte_words_keep_overlap() {
        let passages = split("voice.tone Über Übertone é", 17, 1);
        assert_eq!(passages, vec!["voice.tone Über", "Über Übertone é"]);
    }

    #[test]
    fn test_words_are_never_split() {
        let text = brand_text(25);
        let words: HashSet<&str> = text.split_whitespace().collect();

        for passage in split(&text, 90, 20) {
            for word in passage.split_whitespace() {
                assert!(words.contains(word), "split word: {}", word);
            }
        }
    }

    #[test]
    fn test_covers_start_and_end() {
        let text = brand_text(30);
        let passages = split(&text, 150, 40);

        assert!(passages[0].starts_with("Sentence 0 "));
        assert!(passages
            .last()
            .unwrap()
            .ends_with("Sentence 29 describes how the brand voice stays warm."));
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = "Alpha beta gamma.\n\nDelta epsilon zeta eta.";
        let passages = split(text, 30, 0);

        assert_eq!(passages, vec!["Alpha beta gamma.", "Delta epsilon zeta eta."]);
    }

    #[test]
    fn test_prefers_sentence_end_over_space() {
        let text = "One two three. Four five six seven eight nine";
        let passages = split(text, 30, 0);

        assert_eq!(passages[0], "One two three.");
    }

    #[test]
    fn test_oversized_word_passes_whole() {
        let long_word = "x".repeat(50);
        let text = format!("tiny {} end", long_word);
        let passages = split(&text, 20, 5);

        assert_eq!(passages, vec!["tiny".to_string(), long_word, "end".to_string()]);
    }

    #[test]
    fn test_deterministic() {
        let text = brand_text(20);
        assert_eq!(split(&text, 100, 25), split(&text, 100, 25));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Marca é calorosa e divertida. ".repeat(20);
        let passages = split(&text, 60, 15);

        assert!(passages.len() > 1);
        assert!(passages.iter().all(|p| p.chars().count() <= 60));
    }

    #[test]
    fn test_chunk_document_tags_source() {
        let doc = Document::new("voice.md", brand_text(10));
        let chunks = chunk_document(&doc, 100, 20);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.source == "voice.md"));
    }
}
