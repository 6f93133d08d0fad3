use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

/// NFKC-normalizes, lowercases, and trims a single token.
pub fn normalize_token(raw: &str) -> String {
	let folded: String = raw.nfkc().flat_map(char::to_lowercase).collect();

	folded.trim().to_string()
}

/// Scripts that are written without spaces between words and need dictionary segmentation.
pub fn is_unspaced_script(ch: char) -> bool {
	matches!(
		ch.script(),
		Script::Thai
			| Script::Lao
			| Script::Khmer
			| Script::Myanmar
			| Script::Han
			| Script::Hiragana
			| Script::Katakana
	)
}

/// Word segmenter for queries.
///
/// Spaced scripts are split on Unicode word boundaries. Runs of unspaced scripts are
/// segmented by longest match against a vocabulary, one grapheme at a time; graphemes
/// that start no known word are collected into a single token until the next match.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
	vocabulary: HashSet<String>,
	max_word_graphemes: usize,
}
impl Segmenter {
	pub fn new<I, S>(vocabulary: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut words = HashSet::new();
		let mut max_word_graphemes = 0;

		for word in vocabulary {
			let word = normalize_token(word.as_ref());

			if word.is_empty() {
				continue;
			}

			max_word_graphemes = max_word_graphemes.max(word.graphemes(true).count());

			words.insert(word);
		}

		Self { vocabulary: words, max_word_graphemes }
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let normalized = normalize_token(text);
		let mut tokens = Vec::new();
		let mut run = String::new();

		for segment in normalized.split_word_bounds() {
			let Some(first) = segment.chars().next() else { continue };

			if is_unspaced_script(first) {
				run.push_str(segment);

				continue;
			}
			if !run.is_empty() {
				self.segment_run(&run, &mut tokens);
				run.clear();
			}
			if segment.chars().any(char::is_alphanumeric) {
				tokens.push(segment.to_string());
			}
		}

		if !run.is_empty() {
			self.segment_run(&run, &mut tokens);
		}

		tokens
	}

	fn segment_run(&self, run: &str, out: &mut Vec<String>) {
		let graphemes: Vec<&str> = run.graphemes(true).collect();
		let mut unknown = String::new();
		let mut start = 0;

		while start < graphemes.len() {
			let max_len = self.max_word_graphemes.min(graphemes.len() - start);
			let matched = (1..=max_len)
				.rev()
				.find(|len| self.vocabulary.contains(&graphemes[start..start + len].concat()));

			match matched {
				Some(len) => {
					if !unknown.is_empty() {
						out.push(std::mem::take(&mut unknown));
					}

					out.push(graphemes[start..start + len].concat());

					start += len;
				},
				None => {
					unknown.push_str(graphemes[start]);

					start += 1;
				},
			}
		}

		if !unknown.is_empty() {
			out.push(unknown);
		}
	}
}
