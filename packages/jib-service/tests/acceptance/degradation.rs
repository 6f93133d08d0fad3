use std::{sync::Arc, time::Duration};

use jib_service::{EmbeddingError, Error, JibService, SearchMode};
use jib_testkit::{
	BOTOX_QUERY, FailingEmbedding, FailingRerank, SIAM_AREA, ScriptedRerank, StaticEmbedding,
};

use super::{doc_ids, providers_with, request, service};

#[tokio::test]
async fn over_constrained_filters_drop_geo_and_keep_the_category() {
	let service = service(providers_with(None, None, None));
	let mut req = request(BOTOX_QUERY, SearchMode::Context);

	// Document 3 is the only dental clinic and lies outside 100 m.
	req.area = Some(SIAM_AREA.to_string());
	req.radius_km = Some(0.1);
	req.category = Some("Dental".to_string());

	let res = service.search(req).await.expect("Search failed.");

	assert!(res.filters.geo_dropped);
	assert_eq!(res.filters.eligible, 1);
	assert_eq!(doc_ids(&res.results), vec![3]);
}

#[tokio::test]
async fn an_all_false_geo_mask_never_empties_the_results() {
	let service = service(providers_with(None, None, None));
	let mut req = request(BOTOX_QUERY, SearchMode::Lookup);

	req.area = Some(SIAM_AREA.to_string());
	req.radius_km = Some(0.01);

	let res = service.search(req).await.expect("Search failed.");

	assert!(res.filters.geo_dropped);
	assert!(!res.results.is_empty());
}

#[tokio::test]
async fn unknown_and_empty_categories_do_not_filter() {
	let service = service(providers_with(None, None, None));

	for category in ["aesthetics", "Discontinued", "Nope"] {
		let mut req = request(BOTOX_QUERY, SearchMode::Context);

		req.category = Some(category.to_string());

		let res = service.search(req).await.expect("Search failed.");

		assert!(!res.filters.category_matched, "category {category:?}");
		assert_eq!(res.filters.eligible, 5, "category {category:?}");
	}
}

#[tokio::test]
async fn rerank_failure_keeps_fusion_order() {
	let baseline = service(providers_with(None, None, None));
	let failing = Arc::new(FailingRerank::default());
	let degraded = service(providers_with(None, Some(failing.clone()), None));
	let expected = baseline
		.search(request(BOTOX_QUERY, SearchMode::Context))
		.await
		.expect("Search failed.");
	let res = degraded
		.search(request(BOTOX_QUERY, SearchMode::Context))
		.await
		.expect("Rerank failure must not fail the search.");

	assert_eq!(doc_ids(&res.results), doc_ids(&expected.results));
	assert_eq!(doc_ids(&res.results), vec![0, 1, 2, 3, 4]);
	assert_eq!(failing.calls(), 2);
}

#[tokio::test]
async fn rerank_order_is_applied_to_both_paths() {
	let rerank = Arc::new(ScriptedRerank::new(vec![3, 2]));
	let service = service(providers_with(None, Some(rerank.clone()), None));
	let res = service
		.search(request(BOTOX_QUERY, SearchMode::Lookup))
		.await
		.expect("Search failed.");
	let requests = rerank.requests();

	assert_eq!(doc_ids(&res.results), vec![3, 2]);
	assert_eq!(doc_ids(&res.safety_net), vec![3, 2]);
	assert_eq!(requests.len(), 2);
	assert!(requests.iter().all(|req| req.top_n == 2 && req.documents.len() == 5));
	assert_eq!(requests[0].documents[0].title, "Siam Aesthetic Clinic");
}

#[tokio::test]
async fn embedding_failure_is_fatal() {
	let service = service(providers_with(Some(Arc::new(FailingEmbedding)), None, None));
	let err = service
		.search(request(BOTOX_QUERY, SearchMode::Context))
		.await
		.expect_err("Expected embedding failure.");

	assert!(matches!(err, Error::Embedding(EmbeddingError::Provider { .. })));
}

#[tokio::test]
async fn embedding_dimension_mismatch_is_fatal() {
	let embedding = Arc::new(StaticEmbedding::new(vec![1.0, 0.0, 0.0]));
	let service = service(providers_with(Some(embedding), None, None));
	let err = service
		.search(request(BOTOX_QUERY, SearchMode::Lookup))
		.await
		.expect_err("Expected dimension mismatch.");

	assert!(matches!(
		err,
		Error::Embedding(EmbeddingError::DimensionMismatch { expected: 2, actual: 3 })
	));
}

#[tokio::test]
async fn slow_embedding_times_out() {
	let mut cfg = jib_testkit::test_config().expect("Failed to load test config.");

	cfg.providers.embedding.timeout_ms = 50;

	let embedding = Arc::new(StaticEmbedding::delayed(
		jib_testkit::sample_query_vector(),
		Duration::from_secs(5),
	));
	let catalog = jib_testkit::sample_catalog().expect("Failed to build sample catalog.");
	let service =
		JibService::with_providers(cfg, catalog, providers_with(Some(embedding), None, None))
			.expect("Failed to build service.");
	let err = service
		.search(request(BOTOX_QUERY, SearchMode::Context))
		.await
		.expect_err("Expected embedding timeout.");

	assert!(matches!(err, Error::Embedding(EmbeddingError::Timeout { timeout_ms: 50 })));
}

#[tokio::test]
async fn blank_queries_are_rejected() {
	let service = service(providers_with(None, None, None));
	let err = service
		.search(request("   ", SearchMode::Context))
		.await
		.expect_err("Expected invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[test]
fn catalog_dimension_must_match_the_embedding_config() {
	let mut cfg = jib_testkit::test_config().expect("Failed to load test config.");

	cfg.providers.embedding.dimensions = 8;

	let catalog = jib_testkit::sample_catalog().expect("Failed to build sample catalog.");
	let result = JibService::with_providers(cfg, catalog, providers_with(None, None, None));

	assert!(matches!(result, Err(Error::InvalidCatalog { .. })));
}
