use crate::catalog::DocId;

/// Per-document eligibility, indexed by document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
	bits: Vec<bool>,
}
impl Mask {
	/// Every document eligible.
	pub fn all(len: usize) -> Self {
		Self { bits: vec![true; len] }
	}

	pub fn from_fn<F>(len: usize, f: F) -> Self
	where
		F: FnMut(DocId) -> bool,
	{
		Self { bits: (0..len).map(f).collect() }
	}

	/// Only `members` eligible. Ids outside `0..len` are ignored.
	pub fn from_members(len: usize, members: &[DocId]) -> Self {
		let mut bits = vec![false; len];

		for &id in members {
			if let Some(bit) = bits.get_mut(id) {
				*bit = true;
			}
		}

		Self { bits }
	}

	pub fn and(&self, other: &Self) -> Self {
		debug_assert_eq!(self.len(), other.len(), "Masks must cover the same catalog.");

		Self { bits: self.bits.iter().zip(&other.bits).map(|(a, b)| *a && *b).collect() }
	}

	/// Out-of-range ids are not allowed.
	pub fn allows(&self, id: DocId) -> bool {
		self.bits.get(id).copied().unwrap_or(false)
	}

	pub fn count(&self) -> usize {
		self.bits.iter().filter(|bit| **bit).count()
	}

	pub fn len(&self) -> usize {
		self.bits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bits.is_empty()
	}

	pub fn is_all_true(&self) -> bool {
		self.bits.iter().all(|bit| *bit)
	}
}

/// The mask fusion runs under, after the over-constraint fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMask {
	pub mask: Mask,
	/// The geo mask was discarded because geo ∧ category allowed nothing.
	pub geo_dropped: bool,
}

/// Combines the geo and category masks, dropping geo when the conjunction is empty.
pub fn combine(geo: &Mask, category: &Mask) -> ResolvedMask {
	let combined = geo.and(category);

	if combined.count() == 0 && !combined.is_empty() {
		tracing::warn!(
			category_eligible = category.count(),
			"Geo and category masks exclude every document; falling back to the category mask."
		);

		return ResolvedMask { mask: category.clone(), geo_dropped: true };
	}

	ResolvedMask { mask: combined, geo_dropped: false }
}
