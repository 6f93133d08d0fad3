mod acceptance {
	mod browse;
	mod degradation;
	mod geocode;
	mod retrieval;

	use std::sync::Arc;

	use jib_service::{
		EmbeddingProvider, GeocodeProvider, JibService, Providers, RerankProvider,
		SearchMode, SearchRequest,
	};
	use jib_testkit::{CountingGeocoder, SIAM, SIAM_AREA, ScriptedRerank, StaticEmbedding};

	pub fn request(query: &str, mode: SearchMode) -> SearchRequest {
		SearchRequest {
			query: query.to_string(),
			area: None,
			radius_km: None,
			category: None,
			mode,
		}
	}

	pub fn providers_with(
		embedding: Option<Arc<dyn EmbeddingProvider>>,
		rerank: Option<Arc<dyn RerankProvider>>,
		geocode: Option<Arc<dyn GeocodeProvider>>,
	) -> Providers {
		Providers::new(
			embedding.unwrap_or_else(|| {
				Arc::new(StaticEmbedding::new(jib_testkit::sample_query_vector()))
			}),
			rerank.unwrap_or_else(|| Arc::new(ScriptedRerank::identity())),
			geocode.unwrap_or_else(|| Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]))),
		)
	}

	pub fn service(providers: Providers) -> JibService {
		jib_testkit::sample_service(providers).expect("Failed to build sample service.")
	}

	pub fn doc_ids(items: &[jib_service::SearchItem]) -> Vec<usize> {
		items.iter().map(|item| item.doc_id).collect()
	}
}
