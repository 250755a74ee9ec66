//! Header-based section chunker.

use rag_core::{ChunkData, ChunkStrategy, Chunker, Result};

/// Splits a document into sections at structural headers.
///
/// A line starts a new section when it is a markdown heading of level two
/// or deeper (`## `, `### `, ...) or, when enabled, an ALL-CAPS line of more
/// than three characters. The header line stays at the top of its chunk.
/// Text before the first header becomes a chunk with no header.
pub struct SectionChunker {
    /// Treat ALL-CAPS lines as headers.
    caps_headers: bool,
}

impl SectionChunker {
    /// Create a chunker that recognises markdown and ALL-CAPS headers.
    pub fn new() -> Self {
        Self { caps_headers: true }
    }

    /// Create a chunker that only recognises markdown headings.
    pub fn markdown_only() -> Self {
        Self {
            caps_headers: false,
        }
    }

    /// Return the header title if `line` is a header.
    fn header_of<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim();

        if trimmed.starts_with("##") {
            let title = trimmed.trim_start_matches('#');
            if title.starts_with(char::is_whitespace) {
                return Some(title.trim());
            }
        }

        if self.caps_headers && is_caps_header(trimmed) {
            return Some(trimmed);
        }

        None
    }

    fn push_section(chunks: &mut Vec<ChunkData>, lines: &[&str], header: Option<&str>) {
        let content = lines.join("\n");
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        chunks.push(ChunkData {
            content: content.to_string(),
            header: header.map(String::from),
            strategy: ChunkStrategy::Section,
        });
    }
}

/// ALL-CAPS heading: longer than three characters, at least one letter,
/// and no lowercase letters.
fn is_caps_header(line: &str) -> bool {
    line.chars().count() > 3
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase)
}

impl Default for SectionChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for SectionChunker {
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut header: Option<&str> = None;

        for line in content.lines() {
            if let Some(title) = self.header_of(line) {
                Self::push_section(&mut chunks, &current, header);
                current.clear();
                header = Some(title);
            }
            current.push(line);
        }
        Self::push_section(&mut chunks, &current, header);

        tracing::debug!("Section chunker produced {} chunks", chunks.len());

        Ok(chunks)
    }

    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Section
    }
}
