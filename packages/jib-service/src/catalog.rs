use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use jib_domain::geo::GeoPoint;

use crate::{Error, Result};

/// Position of a document in its catalog.
pub type DocId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: DocId,
	/// Pre-tokenized text used for lexical scoring.
	pub tokens: Vec<String>,
	#[serde(default)]
	pub coordinate: Option<GeoPoint>,
	pub title: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub url: Option<String>,
	/// Curated display position used by browse.
	#[serde(default)]
	pub placement: Option<u32>,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}

/// Row-major `rows × dim` matrix of document embeddings.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMatrix {
	dim: usize,
	data: Vec<f32>,
}
impl EmbeddingMatrix {
	pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
		let Some(dim) = rows.first().map(Vec::len) else { return Ok(Self::default()) };

		if dim == 0 {
			return Err(Error::InvalidCatalog {
				message: "Embedding rows must not be empty.".to_string(),
			});
		}

		let mut data = Vec::with_capacity(dim * rows.len());

		for (index, row) in rows.into_iter().enumerate() {
			if row.len() != dim {
				return Err(Error::InvalidCatalog {
					message: format!(
						"Embedding row {index} has dimension {}, expected {dim}.",
						row.len()
					),
				});
			}

			data.extend(row);
		}

		Ok(Self { dim, data })
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn rows(&self) -> usize {
		if self.dim == 0 { 0 } else { self.data.len() / self.dim }
	}

	pub fn row(&self, index: usize) -> Option<&[f32]> {
		let start = index.checked_mul(self.dim)?;

		self.data.get(start..start + self.dim)
	}

	/// Dot product of `query` against every row. `query` must have `dim` entries.
	pub fn dot_all(&self, query: &[f32]) -> Vec<f32> {
		debug_assert_eq!(query.len(), self.dim);

		self.data
			.chunks_exact(self.dim.max(1))
			.map(|row| row.iter().zip(query).map(|(a, b)| a * b).sum())
			.collect()
	}
}

/// Category name to member documents.
#[derive(Debug, Clone, Default)]
pub struct CategoryTaxonomy {
	categories: HashMap<String, Vec<DocId>>,
}
impl CategoryTaxonomy {
	pub fn new<I>(categories: I) -> Self
	where
		I: IntoIterator<Item = (String, Vec<DocId>)>,
	{
		let categories = categories
			.into_iter()
			.map(|(name, mut members)| {
				members.sort_unstable();
				members.dedup();

				(name, members)
			})
			.collect();

		Self { categories }
	}

	/// Exact key lookup; no trimming or case folding.
	pub fn members(&self, category: &str) -> Option<&[DocId]> {
		self.categories.get(category).map(Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.categories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}

	fn max_member(&self) -> Option<DocId> {
		self.categories.values().filter_map(|members| members.last().copied()).max()
	}
}

/// The immutable catalog shared by every request.
#[derive(Debug)]
pub struct Catalog {
	documents: Vec<Document>,
	embeddings: Arc<EmbeddingMatrix>,
	taxonomy: CategoryTaxonomy,
}
impl Catalog {
	pub fn new(
		documents: Vec<Document>,
		embeddings: EmbeddingMatrix,
		taxonomy: CategoryTaxonomy,
	) -> Result<Self> {
		if let Some((position, doc)) =
			documents.iter().enumerate().find(|(position, doc)| doc.id != *position)
		{
			return Err(Error::InvalidCatalog {
				message: format!("Document at position {position} has id {}.", doc.id),
			});
		}
		if embeddings.rows() != documents.len() {
			return Err(Error::InvalidCatalog {
				message: format!(
					"Embedding matrix has {} rows for {} documents.",
					embeddings.rows(),
					documents.len()
				),
			});
		}
		if let Some(max) = taxonomy.max_member().filter(|max| *max >= documents.len()) {
			return Err(Error::InvalidCatalog {
				message: format!("Category member {max} is outside the catalog."),
			});
		}

		Ok(Self { documents, embeddings: Arc::new(embeddings), taxonomy })
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	pub fn documents(&self) -> &[Document] {
		&self.documents
	}

	pub fn document(&self, id: DocId) -> Option<&Document> {
		self.documents.get(id)
	}

	pub fn embeddings(&self) -> &Arc<EmbeddingMatrix> {
		&self.embeddings
	}

	pub fn taxonomy(&self) -> &CategoryTaxonomy {
		&self.taxonomy
	}
}

/// Serialized catalog as produced by the external loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
	pub documents: Vec<Document>,
	pub embeddings: Vec<Vec<f32>>,
	#[serde(default)]
	pub categories: BTreeMap<String, Vec<DocId>>,
}
impl TryFrom<CatalogSnapshot> for Catalog {
	type Error = Error;

	fn try_from(snapshot: CatalogSnapshot) -> Result<Self> {
		let embeddings = EmbeddingMatrix::from_rows(snapshot.embeddings)?;
		let taxonomy = CategoryTaxonomy::new(snapshot.categories);

		Self::new(snapshot.documents, embeddings, taxonomy)
	}
}
