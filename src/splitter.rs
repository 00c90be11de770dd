//! Boundary-aware document splitting.
//!
//! `RecursiveHtmlSplitter` partitions fetched text into chunks of a target
//! size, preferring block-level HTML boundaries, then blank lines, then word
//! boundaries, before falling back to fixed-width character windows.
//! Separators stay attached to the preceding piece, so recombining chunks in
//! order re-covers the source contiguously (modulo the configured overlap,
//! which is seeded from the tail of the previous chunk).

/// A contiguous span of source text plus provenance metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Origin identifier, typically the source URL
    pub source: String,
    /// Position of this chunk within its source
    pub ordinal: usize,
    /// The chunk text
    pub text: String,
}

/// Boundary preference order, strongest first. The empty string means
/// "split anywhere".
const SEPARATORS: &[&str] = &[
    "</p>", "</div>", "</li>", "</h1>", "</h2>", "</h3>", "<br", "\n\n", "\n", ". ", " ", "",
];

/// Recursive splitter tuned for HTML structure.
#[derive(Debug, Clone)]
pub struct RecursiveHtmlSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveHtmlSplitter {
    /// Creates a splitter with a target chunk size and overlap, both in
    /// characters. Overlap must be smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        assert!(chunk_overlap < chunk_size, "overlap must be smaller than chunk size");
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Splits text into chunk strings of at most roughly `chunk_size`.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, SEPARATORS)
    }

    /// Splits text into [`Chunk`]s carrying provenance metadata.
    pub fn split(&self, source: &str, text: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk {
                source: source.to_string(),
                ordinal,
                text,
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (sep_idx, sep) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_empty() && text.contains(**s))
            .map(|(i, s)| (i, *s))
            .unwrap_or((separators.len() - 1, ""));
        let remaining = &separators[sep_idx + 1..];

        let pieces: Vec<String> = if sep.is_empty() {
            char_windows(text, self.chunk_size)
        } else {
            text.split_inclusive(sep).map(str::to_string).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for piece in pieces {
            if piece.chars().count() <= self.chunk_size {
                pending.push(piece);
            } else {
                if !pending.is_empty() {
                    self.merge_into(&mut chunks, std::mem::take(&mut pending));
                }
                if remaining.is_empty() {
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_recursive(&piece, remaining));
                }
            }
        }
        if !pending.is_empty() {
            self.merge_into(&mut chunks, pending);
        }
        chunks
    }

    /// Greedily packs small pieces into chunks, seeding each new chunk with
    /// the overlap tail of the previous one. All sizes count chars, not bytes.
    fn merge_into(&self, chunks: &mut Vec<String>, pieces: Vec<String>) {
        let mut current = String::new();
        let mut current_chars = 0;
        for piece in pieces {
            let piece_chars = piece.chars().count();
            if current_chars > 0 && current_chars + piece_chars > self.chunk_size {
                let overlap = suffix_chars(&current, self.chunk_overlap);
                current_chars = overlap.chars().count();
                chunks.push(std::mem::take(&mut current));
                current = overlap;
            }
            current.push_str(&piece);
            current_chars += piece_chars;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }
}

/// Fixed-width character windows, each at most `width` chars.
fn char_windows(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|window| window.iter().collect())
        .collect()
}

/// The last `n` characters of `s`, on char boundaries.
fn suffix_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    if count <= n {
        return s.to_string();
    }
    s.chars().skip(count - n).collect()
}
