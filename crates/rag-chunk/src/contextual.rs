//! Contextual augmentation.
//!
//! Before indexing, each chunk is prefixed with a short paragraph generated
//! by the judging model that situates the chunk within its source document.
//! The augmented text is what both the dense and the sparse index see.
//!
//! Two strategies pick what the model is shown:
//! - **Full context**: the whole source document, when it fits within
//!   `max_document_chars`.
//! - **Windowed**: a few "starter" chunks from the start of the document plus
//!   a few "nearby" chunks immediately before the target.
//!
//! Any failure of the model call leaves the chunk unchanged.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use rag_core::{AugmentConfig, Judge, JudgeError};

/// What the judging model is shown alongside the target chunk.
#[derive(Debug, Clone, Copy)]
pub enum SourceContext<'a> {
    /// The entire source document.
    Full(&'a str),

    /// All chunks of the document and the position of the target chunk.
    Windowed { chunks: &'a [String], index: usize },
}

/// Prepends model-generated situating context to chunks.
pub struct ContextualAugmenter {
    judge: Arc<dyn Judge>,
    config: AugmentConfig,
}

impl ContextualAugmenter {
    /// Create an augmenter backed by `judge`.
    pub fn new(judge: Arc<dyn Judge>, config: AugmentConfig) -> Self {
        Self { judge, config }
    }

    /// Return `"{context}\n\n{chunk}"`, or `chunk` unchanged if the model call fails.
    pub async fn augment(&self, chunk: &str, source: SourceContext<'_>) -> String {
        match self.situate(chunk, source).await {
            Ok(context) => format!("{}\n\n{}", context, chunk),
            Err(e) => {
                warn!("Contextual augmentation failed, indexing chunk as-is: {}", e);
                chunk.to_string()
            }
        }
    }

    /// Ask the judging model for the situating paragraph of `chunk`.
    pub async fn situate(
        &self,
        chunk: &str,
        source: SourceContext<'_>,
    ) -> std::result::Result<String, JudgeError> {
        let context_text = match source {
            SourceContext::Full(document) => document.to_string(),
            SourceContext::Windowed { chunks, index } => self.window(chunks, index),
        };
        let prompt = build_prompt(chunk, &context_text);

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let reply = tokio::time::timeout(
            timeout,
            self.judge.complete(&prompt, self.config.max_tokens),
        )
        .await
        .map_err(|_| JudgeError::Timeout {
            timeout_ms: self.config.timeout_ms,
        })??;

        let context = reply.trim();
        if context.is_empty() {
            return Err(JudgeError::EmptyResponse);
        }
        Ok(context.to_string())
    }

    /// Choose the strategy for a document of this size.
    pub fn source_for<'a>(
        &self,
        document: &'a str,
        chunks: &'a [String],
        index: usize,
    ) -> SourceContext<'a> {
        if document.chars().count() <= self.config.max_document_chars {
            SourceContext::Full(document)
        } else {
            SourceContext::Windowed { chunks, index }
        }
    }

    /// Augment every chunk of `document`, in order.
    pub async fn augment_all(&self, document: &str, chunks: &[String]) -> Vec<String> {
        let mut augmented = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let source = self.source_for(document, chunks, index);
            augmented.push(self.augment(chunk, source).await);
        }
        debug!(
            "Augmented {} chunks using {}",
            augmented.len(),
            self.judge.model()
        );
        augmented
    }

    /// Starter chunks followed by the chunks just before `index`, target excluded.
    fn window(&self, chunks: &[String], index: usize) -> String {
        let index = index.min(chunks.len());
        let mut picked: Vec<usize> = (0..self.config.starter_chunks.min(chunks.len()))
            .filter(|&i| i != index)
            .collect();

        for i in index.saturating_sub(self.config.nearby_chunks)..index {
            if !picked.contains(&i) {
                picked.push(i);
            }
        }

        picked
            .into_iter()
            .map(|i| chunks[i].as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn build_prompt(chunk: &str, context: &str) -> String {
    format!(
        r#"Here is a chunk from a larger document:

<chunk>
{chunk}
</chunk>

Here is context from the larger document:

<document>
{context}
</document>

Please write a short, succinct context (2-3 sentences) to situate this chunk within the overall document. This context will help with retrieval later.

Focus on:
- What section/topic this chunk covers
- How it relates to other sections
- Key concepts or entities mentioned

Context:"#
    )
}
