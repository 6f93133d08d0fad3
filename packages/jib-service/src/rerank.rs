use std::{collections::HashSet, time::Duration};

use jib_config::ProviderConfig;
use jib_providers::rerank::RerankDocument;

use crate::{
	RerankError, RerankProvider,
	catalog::{Catalog, DocId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerankRequest {
	pub query: String,
	pub documents: Vec<RerankDocument>,
	pub top_n: usize,
}

/// Provider answer as indices into [`RerankRequest::documents`], best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RerankResponse {
	pub order: Vec<usize>,
}

/// Reorders `candidates` with the rerank provider and keeps at most `n`.
///
/// Never fails. A provider error, a timeout, or an answer without any usable index falls
/// back to the first `n` candidates in fusion order.
pub async fn rerank_candidates(
	provider: &dyn RerankProvider,
	cfg: &ProviderConfig,
	catalog: &Catalog,
	query: &str,
	candidates: &[DocId],
	n: usize,
) -> Vec<DocId> {
	let top_n = n.min(candidates.len());

	if top_n == 0 {
		return Vec::new();
	}

	let request = RerankRequest {
		query: query.to_string(),
		documents: candidates.iter().map(|id| rerank_document(catalog, *id)).collect(),
		top_n,
	};

	let reranked = call(provider, cfg, &request)
		.await
		.and_then(|res| apply_order(candidates, &res.order, top_n));

	match reranked {
		Ok(ids) => ids,
		Err(err) => {
			tracing::warn!(
				error = %err,
				candidates = candidates.len(),
				top_n,
				"Rerank failed; keeping fusion order."
			);

			fallback(candidates, top_n)
		},
	}
}

/// The first `n` candidates, order preserved.
pub fn fallback(candidates: &[DocId], n: usize) -> Vec<DocId> {
	candidates.iter().take(n).copied().collect()
}

async fn call(
	provider: &dyn RerankProvider,
	cfg: &ProviderConfig,
	request: &RerankRequest,
) -> Result<RerankResponse, RerankError> {
	let timeout = Duration::from_millis(cfg.timeout_ms);

	tokio::time::timeout(timeout, provider.rerank(cfg, request))
		.await
		.map_err(|_| RerankError::Timeout { timeout_ms: cfg.timeout_ms })?
}

fn rerank_document(catalog: &Catalog, id: DocId) -> RerankDocument {
	match catalog.document(id) {
		Some(doc) => RerankDocument { title: doc.title.clone(), content: doc.content.clone() },
		None => RerankDocument { title: String::new(), content: String::new() },
	}
}

fn apply_order(
	candidates: &[DocId],
	order: &[usize],
	top_n: usize,
) -> Result<Vec<DocId>, RerankError> {
	let mut seen = HashSet::with_capacity(top_n);
	let mut ids = Vec::with_capacity(top_n);

	for &index in order {
		if ids.len() == top_n {
			break;
		}
		if index < candidates.len() && seen.insert(index) {
			ids.push(candidates[index]);
		}
	}

	if ids.is_empty() {
		return Err(RerankError::EmptyResponse);
	}

	// Complete a short answer in fusion order.
	for (index, id) in candidates.iter().enumerate() {
		if ids.len() == top_n {
			break;
		}
		if !seen.contains(&index) {
			ids.push(*id);
		}
	}

	Ok(ids)
}
