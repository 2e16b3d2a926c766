//! Separator-aware text chunker.
//!
//! Splits extracted document text into [`Fragment`]s that respect a
//! configurable `chunk_size` limit, measured in characters. The text is
//! first split on the configured separator; splits are then packed greedily
//! into fragments, re-joined with the separator, and consecutive fragments
//! retain a suffix/prefix overlap of at most `chunk_overlap` characters.
//!
//! A separator-free run longer than `chunk_size` is hard-split at
//! `chunk_size` character boundaries, so separator-free text of length `L`
//! yields exactly `ceil(L / chunk_size)` fragments.

use sha2::{Digest, Sha256};

use crate::config::ChunkingConfig;
use crate::models::Fragment;

/// Split text into fragments per the chunking configuration.
/// Returns fragments with contiguous indices starting at 0; empty text
/// yields no fragments.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<Fragment> {
    if text.is_empty() {
        return Vec::new();
    }

    let sep = config.separator.as_str();
    let sep_chars = sep.chars().count();
    let max_chars = config.chunk_size;
    let overlap_chars = config.chunk_overlap;

    // Split on the separator, hard-splitting any oversize piece so no
    // single split can exceed the fragment size limit.
    let mut splits: Vec<&str> = Vec::new();
    for piece in text.split(sep) {
        if piece.chars().count() > max_chars {
            hard_split(piece, max_chars, &mut splits);
        } else {
            splits.push(piece);
        }
    }

    // Greedy merge with overlap carry-over. `window` holds the splits of
    // the fragment under construction; `total` is its joined char length.
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    let mut total = 0usize;

    for split in splits {
        let len = split.chars().count();
        let added = if window.is_empty() {
            len
        } else {
            len + sep_chars
        };

        if total + added > max_chars && !window.is_empty() {
            let index = fragments.len();
            fragments.push(make_fragment(index, &window.join(sep)));

            // Shrink the window to the overlap budget before continuing.
            while total > overlap_chars
                || (total + len + sep_chars > max_chars && total > 0)
            {
                let first_len = window[0].chars().count();
                total -= first_len + if window.len() > 1 { sep_chars } else { 0 };
                window.remove(0);
            }
        }

        total += if window.is_empty() {
            len
        } else {
            len + sep_chars
        };
        window.push(split);
    }

    if !window.is_empty() {
        let index = fragments.len();
        fragments.push(make_fragment(index, &window.join(sep)));
    }

    fragments
}

/// Split a separator-free piece at `max_chars` character boundaries
/// (UTF-8 safe).
fn hard_split<'a>(piece: &'a str, max_chars: usize, out: &mut Vec<&'a str>) {
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in piece.char_indices() {
        if count == max_chars {
            out.push(&piece[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < piece.len() {
        out.push(&piece[start..]);
    }
}

fn make_fragment(index: usize, text: &str) -> Fragment {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Fragment {
        index,
        text: text.to_string(),
        hash: hex::encode(hasher.finalize()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            separator: "\n".to_string(),
            chunk_size,
            chunk_overlap,
        }
    }

    /// 120 unique lines of 9 chars joined by '\n'.
    fn lines_1200() -> (Vec<String>, String) {
        let lines: Vec<String> = (0..120).map(|i| format!("line{:05}", i)).collect();
        let text = lines.join("\n");
        (lines, text)
    }

    #[test]
    fn short_text_single_fragment() {
        let frags = chunk_text("hello world", &config(500, 20));
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].index, 0);
        assert_eq!(frags[0].text, "hello world");
    }

    #[test]
    fn empty_text_no_fragments() {
        assert!(chunk_text("", &config(500, 20)).is_empty());
    }

    #[test]
    fn separator_free_text_ceil_division() {
        // No separator anywhere: hard split, no overlap carried.
        let text = "a".repeat(1200);
        let frags = chunk_text(&text, &config(500, 20));
        assert_eq!(frags.len(), 3); // ceil(1200 / 500)
        assert_eq!(frags[0].text.chars().count(), 500);
        assert_eq!(frags[1].text.chars().count(), 500);
        assert_eq!(frags[2].text.chars().count(), 200);
    }

    #[test]
    fn separator_free_exact_multiple() {
        let text = "b".repeat(1000);
        let frags = chunk_text(&text, &config(500, 20));
        assert_eq!(frags.len(), 2);
    }

    #[test]
    fn fragment_size_never_exceeds_limit() {
        let (_, text) = lines_1200();
        for (size, overlap) in [(500, 20), (100, 10), (37, 5)] {
            let frags = chunk_text(&text, &config(size, overlap));
            for f in &frags {
                assert!(
                    f.text.chars().count() <= size,
                    "fragment {} exceeds {} chars",
                    f.index,
                    size
                );
            }
        }
    }

    #[test]
    fn twelve_hundred_chars_three_fragments_with_overlap() {
        // The reference scenario: 1200 extracted characters with
        // chunk_size=500 / overlap=20 yield 3 fragments, consecutive
        // fragments overlapping by up to 20 characters.
        let (_, body) = lines_1200();
        let text = format!("{}\n", body); // trailing newline, as extraction produces
        assert_eq!(text.chars().count(), 1200);
        let frags = chunk_text(&text, &config(500, 20));
        assert_eq!(frags.len(), 3);

        for pair in frags.windows(2) {
            let prev = &pair[0].text;
            let next = &pair[1].text;
            // The retained tail is whole splits totaling at most the
            // configured overlap; here two 9-char lines + separator = 19.
            let overlap: String = prev.chars().skip(prev.chars().count() - 19).collect();
            assert!(next.starts_with(&overlap), "missing overlap: {:?}", overlap);
            assert!(overlap.chars().count() <= 20);
        }
    }

    #[test]
    fn overlap_reconstructs_original_text() {
        // Every chunk_size window contains a separator, so dropping each
        // fragment's carried-over lines and re-joining restores the text.
        let (lines, text) = lines_1200();
        let frags = chunk_text(&text, &config(500, 20));

        let mut restored: Vec<&str> = Vec::new();
        for f in &frags {
            let frag_lines: Vec<&str> = f.text.split('\n').collect();
            // Carried-over lines at the head of a fragment are exactly the
            // tail of what has already been restored (lines are unique).
            let new_start = frag_lines
                .iter()
                .position(|l| !restored.contains(l))
                .unwrap_or(frag_lines.len());
            for l in &frag_lines[new_start..] {
                restored.push(l);
            }
        }
        let expected: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        assert_eq!(restored, expected);
    }

    #[test]
    fn indices_contiguous_from_zero() {
        let (_, text) = lines_1200();
        let frags = chunk_text(&text, &config(100, 10));
        for (i, f) in frags.iter().enumerate() {
            assert_eq!(f.index, i);
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let (_, text) = lines_1200();
        let a = chunk_text(&text, &config(500, 20));
        let b = chunk_text(&text, &config(500, 20));
        assert_eq!(a, b);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(600); // 2 bytes per char
        let frags = chunk_text(&text, &config(500, 20));
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].text.chars().count(), 500);
        assert_eq!(frags[1].text.chars().count(), 100);
    }
}
