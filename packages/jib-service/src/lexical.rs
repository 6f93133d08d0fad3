use std::collections::HashMap;

use jib_domain::text::{self, Segmenter};

use crate::{
	catalog::{DocId, Document},
	rank::RankMap,
};

/// Floor for negative IDFs, as a fraction of the mean IDF.
const IDF_EPSILON: f64 = 0.25;

/// BM25 Okapi over the catalog's pre-tokenized documents.
#[derive(Debug)]
pub struct LexicalRetriever {
	postings: HashMap<String, Vec<(DocId, u32)>>,
	idf: HashMap<String, f64>,
	doc_lens: Vec<f64>,
	avgdl: f64,
	k1: f64,
	b: f64,
	segmenter: Segmenter,
}
impl LexicalRetriever {
	pub fn new(documents: &[Document], cfg: &jib_config::Lexical) -> Self {
		let mut postings: HashMap<String, Vec<(DocId, u32)>> = HashMap::new();
		let mut doc_lens = Vec::with_capacity(documents.len());

		for doc in documents {
			let mut freqs: HashMap<String, u32> = HashMap::new();
			let mut len = 0_usize;

			for token in doc.tokens.iter().map(|token| text::normalize_token(token)) {
				if token.is_empty() {
					continue;
				}

				len += 1;
				*freqs.entry(token).or_default() += 1;
			}

			doc_lens.push(len as f64);

			for (token, tf) in freqs {
				postings.entry(token).or_default().push((doc.id, tf));
			}
		}

		let corpus_size = documents.len() as f64;
		let avgdl = if documents.is_empty() {
			0.0
		} else {
			doc_lens.iter().sum::<f64>() / corpus_size
		};
		let idf = okapi_idf(&postings, corpus_size);
		let segmenter = Segmenter::new(postings.keys());

		Self { postings, idf, doc_lens, avgdl, k1: cfg.k1, b: cfg.b, segmenter }
	}

	pub fn tokenize(&self, query: &str) -> Vec<String> {
		self.segmenter.tokenize(query)
	}

	/// Raw BM25 score per document, indexed by id.
	pub fn scores(&self, query: &str) -> Vec<f64> {
		let mut scores = vec![0.0; self.doc_lens.len()];

		// Repeated query terms contribute once per occurrence.
		for term in self.tokenize(query) {
			let (Some(idf), Some(postings)) = (self.idf.get(&term), self.postings.get(&term))
			else {
				continue;
			};

			for &(id, tf) in postings {
				let tf = f64::from(tf);
				let norm = 1.0 - self.b + self.b * self.doc_lens[id] / self.avgdl;

				scores[id] += idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm);
			}
		}

		scores
	}

	/// Ranks every document; a query without tokens ranks every document first.
	pub fn rank(&self, query: &str) -> RankMap {
		RankMap::shared_ties(&self.scores(query))
	}
}

fn okapi_idf(
	postings: &HashMap<String, Vec<(DocId, u32)>>,
	corpus_size: f64,
) -> HashMap<String, f64> {
	let mut idf = HashMap::with_capacity(postings.len());
	let mut idf_sum = 0.0;
	let mut negative = Vec::new();

	for (term, docs) in postings {
		let df = docs.len() as f64;
		let value = (corpus_size - df + 0.5).ln() - (df + 0.5).ln();

		idf_sum += value;

		if value < 0.0 {
			negative.push(term.clone());
		}

		idf.insert(term.clone(), value);
	}

	if !idf.is_empty() {
		let floor = IDF_EPSILON * idf_sum / idf.len() as f64;

		for term in negative {
			idf.insert(term, floor);
		}
	}

	idf
}
