use std::sync::Arc;

use jib_service::{GeoResolution, SearchMode};
use jib_testkit::{AESTHETICS, BOTOX_QUERY, CountingGeocoder, SIAM, SIAM_AREA, StaticEmbedding};

use super::{doc_ids, providers_with, request, service};

#[tokio::test]
async fn geo_and_category_filters_keep_the_best_fused_documents_on_top() {
	let service = service(providers_with(None, None, None));
	let mut req = request(BOTOX_QUERY, SearchMode::Context);

	req.area = Some(SIAM_AREA.to_string());
	req.radius_km = Some(5.0);
	req.category = Some(AESTHETICS.to_string());

	let res = service.search(req).await.expect("Search failed.");

	assert_eq!(&doc_ids(&res.results)[..2], &[0, 1]);
	assert_eq!(doc_ids(&res.results), vec![0, 1, 2, 3]);
	assert_eq!(res.filters.geo, GeoResolution::Resolved { point: SIAM });
	assert_eq!(res.filters.eligible, 4);
	assert!(res.filters.category_matched);
	assert!(!res.filters.geo_dropped);
	// The safety net ignores both filters.
	assert_eq!(doc_ids(&res.safety_net), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn context_items_carry_full_metadata() {
	let service = service(providers_with(None, None, None));
	let res = service
		.search(request(BOTOX_QUERY, SearchMode::Context))
		.await
		.expect("Search failed.");
	let first = &res.results[0];

	assert_eq!(first.title, "Siam Aesthetic Clinic");
	assert_eq!(first.url.as_deref(), Some("https://clinics.example/0"));
	assert!(first.content.is_some());
	assert!(first.coordinate.is_some());
	assert_eq!(
		first.metadata.as_ref().and_then(|metadata| metadata.get("district")),
		Some(&serde_json::json!("siam"))
	);
}

#[tokio::test]
async fn lookup_mode_rewrites_aliases_and_returns_minimal_items() {
	let embedding = Arc::new(StaticEmbedding::new(jib_testkit::sample_query_vector()));
	let service = service(providers_with(Some(embedding.clone()), None, None));
	let res = service
		.search(request("BKK Botox near me", SearchMode::Lookup))
		.await
		.expect("Search failed.");

	assert_eq!(res.query, "botox near me");
	assert_eq!(embedding.texts(), vec!["botox near me".to_string()]);
	assert_eq!(doc_ids(&res.results), vec![0, 1]);
	assert_eq!(res.safety_net.len(), 2);
	assert!(res.results.iter().all(|item| item.content.is_none() && item.metadata.is_none()));
}

#[tokio::test]
async fn context_mode_does_not_rewrite_aliases() {
	let service = service(providers_with(None, None, None));
	let res = service
		.search(request("bkk botox", SearchMode::Context))
		.await
		.expect("Search failed.");

	assert_eq!(res.query, "bkk botox");
}

#[tokio::test]
async fn unknown_area_skips_geocoding_even_at_zero_radius() {
	let geocoder = Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]));
	let service = service(providers_with(None, None, Some(geocoder.clone())));
	let mut req = request(BOTOX_QUERY, SearchMode::Context);

	req.area = Some("<UNKNOWN>".to_string());
	req.radius_km = Some(0.0);

	let res = service.search(req).await.expect("Search failed.");

	assert_eq!(res.filters.geo, GeoResolution::Skipped);
	assert_eq!(res.filters.eligible, 5);
	assert_eq!(res.results.len(), 5);
	assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn lexical_ranks_cover_every_document() {
	let service = service(providers_with(None, None, None));

	for query in [BOTOX_QUERY, "no such treatment", "!!!"] {
		let ranks = service.lexical().rank(query);

		assert_eq!(ranks.len(), service.catalog.len(), "query {query:?}");
		assert!((0..service.catalog.len()).all(|id| ranks.get(id).is_some()));
	}
}

#[tokio::test]
async fn sample_lexical_ranks_match_the_fixture() {
	let service = service(providers_with(None, None, None));
	let ranks = service.lexical().rank(BOTOX_QUERY);
	let ranks: Vec<usize> =
		(0..5).map(|id| ranks.get(id).expect("Missing lexical rank.")).collect();

	assert_eq!(ranks, vec![1, 3, 2, 5, 4]);
}
