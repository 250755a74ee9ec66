//! Keyword-family embedder.

use async_trait::async_trait;

use rag_core::{Embedder, RagError, Result};

/// Embeds text as relative keyword-family density.
///
/// Each dimension counts occurrences (substring matches, case-insensitive)
/// of its family's keywords per 1000 characters; the vector is then divided
/// by its sum so it reads as a distribution over families. Text matching no
/// family embeds as the zero vector.
pub struct TopicEmbedder {
    families: Vec<Vec<String>>,
}

impl TopicEmbedder {
    /// Medical, software and business keyword families.
    pub fn new() -> Self {
        Self {
            families: vec![
                vec!["medical", "health", "patient", "research"],
                vec!["software", "engineer", "bug", "incident"],
                vec!["revenue", "profit", "business", "market"],
            ]
            .into_iter()
            .map(|family| family.into_iter().map(String::from).collect())
            .collect(),
        }
    }

    /// Create an embedder with custom keyword families.
    pub fn with_families(families: Vec<Vec<String>>) -> Result<Self> {
        if families.is_empty() || families.iter().any(|f| f.is_empty()) {
            return Err(RagError::embedding("every keyword family needs at least one keyword"));
        }
        let families = families
            .into_iter()
            .map(|family| family.into_iter().map(|k| k.to_lowercase()).collect())
            .collect();
        Ok(Self { families })
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let length = lower.chars().count().max(1) as f32;

        let scores: Vec<f32> = self
            .families
            .iter()
            .map(|family| {
                let hits: usize = family.iter().map(|k| lower.matches(k.as_str()).count()).sum();
                hits as f32 / length * 1000.0
            })
            .collect();

        let total: f32 = scores.iter().sum();
        if total == 0.0 {
            return scores;
        }
        scores.into_iter().map(|s| s / total).collect()
    }
}

impl Default for TopicEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for TopicEmbedder {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.families.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_topic_distribution() {
        let embedder = TopicEmbedder::new();
        assert_eq!(embedder.dimension(), 3);

        let e = embedder
            .embed_query("The Software Engineering team responded to the incident.")
            .await
            .unwrap();
        assert_eq!(e, vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_mixed_topics_sum_to_one() {
        let embedder = TopicEmbedder::new();
        let e = embedder
            .embed_query("Software revenue and market share")
            .await
            .unwrap();
        let total: f32 = e.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(e[2] > e[1]);
        assert_eq!(e[0], 0.0);
    }

    #[tokio::test]
    async fn test_no_keywords_is_zero_vector() {
        let embedder = TopicEmbedder::new();
        let e = embedder
            .embed_query("Quarterly financial results improved 12%.")
            .await
            .unwrap();
        assert_eq!(e, vec![0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_custom_families() {
        let embedder = TopicEmbedder::with_families(vec![
            vec!["Cat".to_string()],
            vec!["dog".to_string()],
        ])
        .unwrap();
        let e = embedder.embed_query("cat CAT dog").await.unwrap();
        assert!((e[0] - 2.0 / 3.0).abs() < 1e-5);
        assert!((e[1] - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_family_rejected() {
        assert!(TopicEmbedder::with_families(vec![vec![]]).is_err());
        assert!(TopicEmbedder::with_families(vec![]).is_err());
    }
}
