use std::{cmp::Ordering, time::Duration};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// One candidate as sent to the reranker. Only `Content` is scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerankDocument {
	#[serde(rename = "Title")]
	pub title: String,
	#[serde(rename = "Content")]
	pub content: String,
}

/// Calls a Cohere-compatible `/rerank` endpoint.
///
/// Returns indices into `documents`, most relevant first.
pub async fn rerank(
	cfg: &jib_config::ProviderConfig,
	query: &str,
	documents: &[RerankDocument],
	top_n: usize,
) -> Result<Vec<usize>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"query": query,
		"documents": documents,
		"rank_fields": ["Content"],
		"top_n": top_n,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_rerank_response(json)
}

fn parse_rerank_response(json: Value) -> Result<Vec<usize>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		})?;

	let mut ranked: Vec<(usize, Option<f64>)> = Vec::with_capacity(results.len());
	for item in results {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result missing index.".to_string() }
		})? as usize;
		let score =
			item.get("relevance_score").or_else(|| item.get("score")).and_then(|v| v.as_f64());
		ranked.push((index, score));
	}

	// Results normally arrive sorted; re-sort only when every entry carries a score.
	if ranked.iter().all(|(_, score)| score.is_some()) {
		ranked.sort_by(|(_, left), (_, right)| {
			let left = left.unwrap_or(0.0);
			let right = right.unwrap_or(0.0);

			right.partial_cmp(&left).unwrap_or(Ordering::Equal)
		});
	}

	Ok(ranked.into_iter().map(|(index, _)| index).collect())
}
