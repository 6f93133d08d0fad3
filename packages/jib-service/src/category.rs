use crate::{catalog::CategoryTaxonomy, mask::Mask};

/// Membership mask for `category`, and whether the tag narrowed anything.
///
/// Unknown, absent, and empty categories all yield an all-true mask.
pub fn category_mask(
	taxonomy: &CategoryTaxonomy,
	len: usize,
	category: Option<&str>,
) -> (Mask, bool) {
	match category.and_then(|tag| taxonomy.members(tag)) {
		Some(members) if !members.is_empty() => (Mask::from_members(len, members), true),
		_ => (Mask::all(len), false),
	}
}
