//! LLM re-ranking of fused candidates.
//!
//! Candidates are shown to the judging model as `<document id="doc_N">`
//! blocks and the model answers with a JSON array of ids, most relevant
//! first. Any failure (call error, timeout, unparseable reply, unknown id)
//! is reported as a [`JudgeError`] so the caller can fall back to plain
//! search.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use rag_core::{Judge, JudgeError, RankedResult, RerankConfig};

/// Re-orders candidates by asking a judging model for its preferred order.
pub struct LlmReranker {
    judge: Arc<dyn Judge>,
    config: RerankConfig,
}

impl LlmReranker {
    /// Create a re-ranker backed by `judge`.
    pub fn new(judge: Arc<dyn Judge>, config: RerankConfig) -> Self {
        Self { judge, config }
    }

    /// Number of fused candidates to fetch for a request of `top_k`.
    pub fn candidate_count(&self, top_k: usize) -> usize {
        top_k.saturating_mul(self.config.candidate_multiplier)
    }

    /// Re-order `candidates` and keep the first `top_k`.
    ///
    /// The judge is not called when there is nothing to order.
    pub async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<RankedResult>,
        top_k: usize,
    ) -> std::result::Result<Vec<RankedResult>, JudgeError> {
        if candidates.is_empty() || top_k == 0 {
            candidates.truncate(top_k);
            return Ok(candidates);
        }

        let order = self.judge_order(query, &candidates).await?;
        debug!("Judge ranked {} of {} candidates", order.len(), candidates.len());

        let mut results = apply_order(candidates, &order);
        results.truncate(top_k);
        Ok(results)
    }

    /// Ask the judge for an ordering of candidate positions (0-based).
    pub async fn judge_order(
        &self,
        query: &str,
        candidates: &[RankedResult],
    ) -> std::result::Result<Vec<usize>, JudgeError> {
        let prompt = build_prompt(query, candidates, self.config.max_content_chars);

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let reply = tokio::time::timeout(
            timeout,
            self.judge.complete(&prompt, self.config.max_tokens),
        )
        .await
        .map_err(|_| JudgeError::Timeout {
            timeout_ms: self.config.timeout_ms,
        })??;

        parse_ranking(&reply, candidates.len())
    }
}

/// Build the re-ranking prompt.
///
/// Each candidate's section comes from the `section` or `header` metadata
/// key, and its content from the `content` key (falling back to the chunk
/// text), cut to `max_content_chars` characters.
pub fn build_prompt(query: &str, candidates: &[RankedResult], max_content_chars: usize) -> String {
    let documents = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let n = i + 1;
            let chunk = &candidate.chunk;
            let section = chunk
                .metadata_str("section")
                .or_else(|| chunk.metadata_str("header"))
                .map(String::from)
                .unwrap_or_else(|| format!("Document {}", n));
            let content: String = chunk
                .metadata_str("content")
                .unwrap_or(&chunk.content)
                .chars()
                .take(max_content_chars)
                .collect();

            format!(
                "<document id=\"doc_{n}\">\n  <section>{section}</section>\n  <content>{content}</content>\n</document>"
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a document relevance expert. Analyze the user's query and the retrieved documents, then return the document IDs in order of decreasing relevance.

User Query: "{query}"

Retrieved Documents:
{documents}

Task: Return a JSON list of document IDs in order of decreasing relevance (most relevant first).
Return ONLY a valid JSON array with no additional text.

Example format: ["doc_2", "doc_1", "doc_3"]

Your response (JSON array only):"#
    )
}

/// Parse a reply into 0-based candidate positions.
///
/// Accepts a bare JSON array of `"doc_N"` strings, or the outermost
/// `[...]` span inside surrounding prose. Repeated ids are ignored after
/// their first occurrence; an id outside `doc_1..=doc_{count}` rejects the
/// whole reply.
pub fn parse_ranking(reply: &str, count: usize) -> std::result::Result<Vec<usize>, JudgeError> {
    let reply = reply.trim();
    let ids: Vec<String> = match serde_json::from_str(reply) {
        Ok(ids) => ids,
        Err(_) => {
            let span = match (reply.find('['), reply.rfind(']')) {
                (Some(start), Some(end)) if start < end => &reply[start..=end],
                _ => return Err(JudgeError::Malformed("no JSON array in reply".to_string())),
            };
            serde_json::from_str(span).map_err(|e| JudgeError::Malformed(e.to_string()))?
        }
    };

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(ids.len());
    for id in ids {
        let position = id
            .strip_prefix("doc_")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=count).contains(n))
            .ok_or_else(|| JudgeError::UnknownIdentifier(id.clone()))?;

        if seen.insert(position) {
            order.push(position - 1);
        }
    }

    Ok(order)
}

/// Judge-ordered candidates first, then the rest in their original order.
fn apply_order(candidates: Vec<RankedResult>, order: &[usize]) -> Vec<RankedResult> {
    let mut slots: Vec<Option<RankedResult>> = candidates.into_iter().map(Some).collect();
    let mut results = Vec::with_capacity(slots.len());

    for &i in order {
        if let Some(result) = slots.get_mut(i).and_then(Option::take) {
            results.push(result);
        }
    }
    results.extend(slots.into_iter().flatten());

    results
}
