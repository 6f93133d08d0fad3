use std::{sync::Arc, time::Duration};

use jib_config::EmbeddingProviderConfig;

use crate::{EmbeddingError, EmbeddingProvider, catalog::EmbeddingMatrix, rank::RankMap};

#[derive(Debug, Clone)]
pub struct SemanticRetriever {
	embeddings: Arc<EmbeddingMatrix>,
}
impl SemanticRetriever {
	pub fn new(embeddings: Arc<EmbeddingMatrix>) -> Self {
		Self { embeddings }
	}

	/// Embeds `query` and ranks every document by dot product.
	pub async fn rank(
		&self,
		provider: &dyn EmbeddingProvider,
		cfg: &EmbeddingProviderConfig,
		query: &str,
	) -> Result<RankMap, EmbeddingError> {
		if self.embeddings.rows() == 0 {
			return Ok(RankMap::default());
		}

		let timeout = Duration::from_millis(cfg.timeout_ms);
		let vector = tokio::time::timeout(timeout, provider.embed(cfg, query))
			.await
			.map_err(|_| EmbeddingError::Timeout { timeout_ms: cfg.timeout_ms })??;

		self.rank_vector(&vector)
	}

	/// Strict ranks: equal similarities still receive distinct ranks.
	pub fn rank_vector(&self, vector: &[f32]) -> Result<RankMap, EmbeddingError> {
		if vector.len() != self.embeddings.dim() {
			return Err(EmbeddingError::DimensionMismatch {
				expected: self.embeddings.dim(),
				actual: vector.len(),
			});
		}

		Ok(RankMap::strict(&self.embeddings.dot_all(vector)))
	}
}
