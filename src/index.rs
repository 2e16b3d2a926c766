//! In-memory knowledge index.
//!
//! Holds `(vector, fragment)` pairs for exactly one document and answers
//! k-nearest-neighbor queries by cosine similarity. The index is rebuilt
//! wholesale on every upload; there are no update or delete operations.

use anyhow::Result;

use crate::embedding::{embed_query, Embedder};
use crate::models::Fragment;

/// Nearest-neighbor structure over fragment embeddings.
#[derive(Debug, Default)]
pub struct KnowledgeIndex {
    entries: Vec<(Vec<f32>, Fragment)>,
}

impl KnowledgeIndex {
    /// Embed all fragments in one batch and build the index.
    ///
    /// Fragment order is preserved, which together with the stable ranking
    /// in [`query`](Self::query) makes retrieval deterministic for a fixed
    /// embedding provider.
    pub async fn build(fragments: Vec<Fragment>, embedder: &dyn Embedder) -> Result<Self> {
        if fragments.is_empty() {
            return Ok(Self::default());
        }
        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        anyhow::ensure!(
            vectors.len() == fragments.len(),
            "embedding count {} does not match fragment count {}",
            vectors.len(),
            fragments.len()
        );
        let entries = vectors.into_iter().zip(fragments).collect();
        Ok(Self { entries })
    }

    /// Return the `k` fragments nearest to the embedding of `text`.
    ///
    /// Ranked by cosine similarity descending with fragment-index ascending
    /// as tie-break. Returns at most `k` fragments, all from the fragment
    /// set the index was built from.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<Fragment>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = embed_query(embedder, text).await?;

        let mut scored: Vec<(f32, &Fragment)> = self
            .entries
            .iter()
            .map(|(vec, frag)| (cosine_similarity(&query_vec, vec), frag))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.index.cmp(&b.1.index))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, frag)| frag.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All indexed fragments in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.entries.iter().map(|(_, frag)| frag)
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` for empty vectors or vectors of
/// different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
