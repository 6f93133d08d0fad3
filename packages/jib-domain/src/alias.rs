use std::borrow::Cow;

use regex::{NoExpand, Regex, RegexBuilder};

struct AliasRule {
	pattern: Regex,
	canonical: String,
}

/// Ordered query rewrites from common abbreviations to canonical catalog names.
#[derive(Default)]
pub struct QueryAliases {
	rules: Vec<AliasRule>,
}
impl QueryAliases {
	pub fn new<'a, I>(aliases: I) -> Result<Self, regex::Error>
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut rules = Vec::new();

		for (pattern, canonical) in aliases {
			let needle = pattern.trim();

			if needle.is_empty() {
				continue;
			}

			let pattern =
				RegexBuilder::new(&regex::escape(needle)).case_insensitive(true).build()?;

			rules.push(AliasRule { pattern, canonical: canonical.to_string() });
		}

		Ok(Self { rules })
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rewrites every occurrence of the first alias found in `query`.
	///
	/// Later aliases are not consulted once one has matched.
	pub fn rewrite<'q>(&self, query: &'q str) -> Cow<'q, str> {
		let Some(rule) = self.rules.iter().find(|rule| rule.pattern.is_match(query)) else {
			return Cow::Borrowed(query);
		};

		rule.pattern.replace_all(query, NoExpand(rule.canonical.as_str()))
	}
}
