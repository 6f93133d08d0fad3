pub mod catalog;
pub mod category;
pub mod fusion;
pub mod geo;
pub mod lexical;
pub mod mask;
pub mod rank;
pub mod rerank;
pub mod search;
pub mod semantic;

mod error;

pub use catalog::{Catalog, CatalogSnapshot, CategoryTaxonomy, DocId, Document, EmbeddingMatrix};
pub use error::{EmbeddingError, Error, GeocodeError, RerankError, Result};
pub use geo::{GeoResolution, GeocodeCache};
pub use jib_providers::rerank::RerankDocument;
pub use rerank::{RerankRequest, RerankResponse};
pub use search::{
	BrowseResponse, FilterSummary, SearchItem, SearchMode, SearchRequest, SearchResponse,
};

use std::{future::Future, pin::Pin, sync::Arc};

use jib_config::{Config, EmbeddingProviderConfig, GeocodeProviderConfig, ProviderConfig};
use jib_domain::{alias::QueryAliases, geo::GeoPoint};
use jib_providers::{embedding, geocode};

use crate::{lexical::LexicalRetriever, semantic::SemanticRetriever};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		request: &'a RerankRequest,
	) -> BoxFuture<'a, Result<RerankResponse, RerankError>>;
}

pub trait GeocodeProvider
where
	Self: Send + Sync,
{
	/// `Ok(None)` when the provider found no match.
	fn geocode<'a>(
		&'a self,
		cfg: &'a GeocodeProviderConfig,
		address: &'a str,
	) -> BoxFuture<'a, Result<Option<GeoPoint>, GeocodeError>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
	pub geocode: Arc<dyn GeocodeProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		rerank: Arc<dyn RerankProvider>,
		geocode: Arc<dyn GeocodeProvider>,
	) -> Self {
		Self { embedding, rerank, geocode }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), rerank: provider.clone(), geocode: provider }
	}
}

/// Everything a request needs, built once at startup and shared by reference.
pub struct JibService {
	pub cfg: Config,
	pub catalog: Arc<Catalog>,
	pub providers: Providers,
	lexical: Arc<LexicalRetriever>,
	semantic: SemanticRetriever,
	geocoder: GeocodeCache,
	aliases: QueryAliases,
}
impl JibService {
	pub fn new(cfg: Config, catalog: Catalog) -> Result<Self> {
		Self::with_providers(cfg, catalog, Providers::default())
	}

	pub fn with_providers(cfg: Config, catalog: Catalog, providers: Providers) -> Result<Self> {
		let expected = cfg.providers.embedding.dimensions as usize;
		let actual = catalog.embeddings().dim();

		if !catalog.is_empty() && actual != expected {
			return Err(Error::InvalidCatalog {
				message: format!(
					"Catalog embeddings have dimension {actual}, but providers.embedding.dimensions is {expected}."
				),
			});
		}

		let aliases = QueryAliases::new(
			cfg.search
				.aliases
				.iter()
				.map(|alias| (alias.pattern.as_str(), alias.canonical.as_str())),
		)
		.map_err(|err| Error::InvalidConfig { message: format!("Invalid query alias: {err}") })?;
		let lexical = Arc::new(LexicalRetriever::new(catalog.documents(), &cfg.lexical));
		let semantic = SemanticRetriever::new(Arc::clone(catalog.embeddings()));
		let geocoder = GeocodeCache::new(cfg.geo.cache_capacity);

		tracing::info!(
			documents = catalog.len(),
			categories = catalog.taxonomy().len(),
			aliases = aliases.len(),
			"Catalog loaded."
		);

		Ok(Self {
			cfg,
			catalog: Arc::new(catalog),
			providers,
			lexical,
			semantic,
			geocoder,
			aliases,
		})
	}

	pub fn geocoder(&self) -> &GeocodeCache {
		&self.geocoder
	}

	pub fn lexical(&self) -> &LexicalRetriever {
		&self.lexical
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>> {
		Box::pin(async move {
			embedding::embed(cfg, text)
				.await
				.map_err(|err| EmbeddingError::Provider { message: err.to_string() })
		})
	}
}
impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		request: &'a RerankRequest,
	) -> BoxFuture<'a, Result<RerankResponse, RerankError>> {
		Box::pin(async move {
			let order = jib_providers::rerank::rerank(
				cfg,
				&request.query,
				&request.documents,
				request.top_n,
			)
			.await
			.map_err(|err| RerankError::Provider { message: err.to_string() })?;

			Ok(RerankResponse { order })
		})
	}
}
impl GeocodeProvider for DefaultProviders {
	fn geocode<'a>(
		&'a self,
		cfg: &'a GeocodeProviderConfig,
		address: &'a str,
	) -> BoxFuture<'a, Result<Option<GeoPoint>, GeocodeError>> {
		Box::pin(async move {
			geocode::geocode(cfg, address)
				.await
				.map_err(|err| GeocodeError::Provider { message: err.to_string() })
		})
	}
}
