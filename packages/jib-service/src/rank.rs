use std::collections::BTreeMap;

use crate::catalog::DocId;

/// Document id to 1-based rank.
///
/// Retrievers always produce a total map over the catalog. Maps built with
/// [`RankMap::from_pairs`] may be partial; fusion treats the absent ids as ranked last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankMap {
	ranks: BTreeMap<DocId, usize>,
}
impl RankMap {
	/// Ranks by descending score; an exact tie with the previous score reuses its rank.
	///
	/// Ranks are not compressed afterwards, so `[0.9, 0.5, 0.5, 0.1]` ranks as `[1, 2, 2, 4]`.
	pub fn shared_ties(scores: &[f64]) -> Self {
		let order = descending_order(scores, |a, b| b.total_cmp(a));
		let mut ranks = BTreeMap::new();
		let mut previous: Option<(f64, usize)> = None;

		for (position, id) in order.into_iter().enumerate() {
			let score = scores[id];
			let rank = match previous {
				Some((prev_score, prev_rank)) if prev_score == score => prev_rank,
				_ => position + 1,
			};

			previous = Some((score, rank));

			ranks.insert(id, rank);
		}

		Self { ranks }
	}

	/// Ranks by descending score with one rank per position, ties kept in id order.
	pub fn strict(scores: &[f32]) -> Self {
		let order = descending_order(scores, |a, b| b.total_cmp(a));
		let ranks =
			order.into_iter().enumerate().map(|(position, id)| (id, position + 1)).collect();

		Self { ranks }
	}

	pub fn from_pairs<I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (DocId, usize)>,
	{
		Self { ranks: pairs.into_iter().collect() }
	}

	pub fn get(&self, id: DocId) -> Option<usize> {
		self.ranks.get(&id).copied()
	}

	pub fn contains(&self, id: DocId) -> bool {
		self.ranks.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.ranks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ranks.is_empty()
	}

	/// Ranked ids in ascending id order.
	pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
		self.ranks.keys().copied()
	}
}

fn descending_order<T, F>(scores: &[T], cmp: F) -> Vec<DocId>
where
	F: Fn(&T, &T) -> std::cmp::Ordering,
{
	let mut order: Vec<DocId> = (0..scores.len()).collect();

	order.sort_by(|a, b| cmp(&scores[*a], &scores[*b]));

	order
}
