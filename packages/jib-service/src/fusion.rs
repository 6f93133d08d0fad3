use std::collections::BTreeSet;

use serde::Serialize;

use crate::{catalog::DocId, mask::Mask, rank::RankMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
	pub k: f64,
	/// Weight on the semantic term.
	pub alpha: f64,
	/// Apply mask position `i` to the `i`-th id of the ascending id union.
	pub positional_mask: bool,
}
impl From<&jib_config::Fusion> for FusionParams {
	fn from(cfg: &jib_config::Fusion) -> Self {
		Self { k: cfg.k, alpha: cfg.alpha, positional_mask: cfg.legacy_positional_mask }
	}
}
impl Default for FusionParams {
	fn default() -> Self {
		Self { k: 60.0, alpha: 0.5, positional_mask: false }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusedScore {
	pub doc_id: DocId,
	pub score: f64,
}

/// Weighted reciprocal rank fusion of two rank maps under `mask`.
///
/// An id missing from one map takes rank `max(|lexical|, |semantic|) + 1` there.
/// The result is sorted by score descending, ties by ascending id.
pub fn fuse(
	lexical: &RankMap,
	semantic: &RankMap,
	mask: &Mask,
	params: &FusionParams,
) -> Vec<FusedScore> {
	let ids: BTreeSet<DocId> = lexical.ids().chain(semantic.ids()).collect();
	let missing = lexical.len().max(semantic.len()) + 1;

	if params.positional_mask {
		debug_assert!(ids.len() <= mask.len(), "Mask is shorter than the ranked id set.");
	} else {
		debug_assert!(
			ids.last().is_none_or(|max| *max < mask.len()),
			"Mask is shorter than the largest ranked id."
		);
	}

	let mut fused: Vec<FusedScore> = ids
		.into_iter()
		.enumerate()
		.filter(|(position, id)| {
			if params.positional_mask { mask.allows(*position) } else { mask.allows(*id) }
		})
		.map(|(_, id)| {
			let rank_lex = lexical.get(id).unwrap_or(missing);
			let rank_sem = semantic.get(id).unwrap_or(missing);

			FusedScore { doc_id: id, score: rrf_score(rank_lex, rank_sem, params) }
		})
		.collect();

	fused.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));

	fused
}

pub fn rrf_score(rank_lex: usize, rank_sem: usize, params: &FusionParams) -> f64 {
	let lexical = (1.0 - params.alpha) / (params.k + rank_lex as f64);
	let semantic = params.alpha / (params.k + rank_sem as f64);

	lexical + semantic
}

/// The first `k` fused ids.
pub fn top_k(fused: &[FusedScore], k: usize) -> Vec<DocId> {
	fused.iter().take(k).map(|scored| scored.doc_id).collect()
}

/// Clamps the candidate pool and result count to the eligible document count.
pub fn effective_limits(candidate_k: usize, top_n: usize, eligible: usize) -> (usize, usize) {
	(candidate_k.min(eligible), top_n.min(eligible))
}
