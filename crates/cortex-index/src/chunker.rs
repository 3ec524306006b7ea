//! Overlapping line-window chunking.

use serde::{Deserialize, Serialize};

/// One embedded slice of a source file.
///
/// Line numbers are 1-based and inclusive. `embedding` is `None` for
/// chunks whose embedding request failed; such chunks are never persisted
/// by the pipeline but the field still deserializes leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Path relative to the project root, with `/` separators.
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Lazy iterator over the line windows of one file.
///
/// Windows are `size` lines long and start every `size - overlap` lines.
/// Whitespace-only windows are skipped. Re-creating the iterator with
/// [`chunk_lines`] restarts from the top.
#[derive(Debug, Clone)]
pub struct ChunkWindows<'a> {
    lines: Vec<&'a str>,
    file: &'a str,
    size: usize,
    step: usize,
    /// First offset at which no new window starts.
    limit: usize,
    offset: usize,
}

/// Split `content` into overlapping line windows for `file`.
///
/// `overlap` is expected to be strictly smaller than `size`; config
/// validation guarantees this for callers going through
/// [`cortex_core::Config`]. A degenerate pair still advances at least
/// one line per window, so iteration always terminates.
#[must_use]
pub fn chunk_lines<'a>(
    content: &'a str,
    file: &'a str,
    size: usize,
    overlap: usize,
) -> ChunkWindows<'a> {
    let lines: Vec<&str> = content.lines().collect();
    let limit = lines.len().saturating_sub(overlap).max(1);
    ChunkWindows {
        lines,
        file,
        size,
        step: size.saturating_sub(overlap).max(1),
        limit,
        offset: 0,
    }
}

impl Iterator for ChunkWindows<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        while self.offset < self.limit {
            let start = self.offset;
            let end = (start + self.size).min(self.lines.len());
            self.offset += self.step;

            let text = self.lines[start..end].join("\n").trim().to_owned();
            if text.is_empty() {
                continue;
            }
            return Some(Chunk {
                text,
                file: self.file.to_owned(),
                start_line: start + 1,
                end_line: end,
                embedding: None,
            });
        }
        None
    }
}
