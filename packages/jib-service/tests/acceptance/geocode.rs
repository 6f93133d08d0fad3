use std::{sync::Arc, time::Duration};

use jib_service::{GeoResolution, GeocodeCache, JibService, SearchMode};
use jib_testkit::{BOTOX_QUERY, CountingGeocoder, SIAM, SIAM_AREA};

use super::{providers_with, request, service};

fn area_request(area: &str) -> jib_service::SearchRequest {
	let mut req = request(BOTOX_QUERY, SearchMode::Context);

	req.area = Some(area.to_string());

	req
}

#[tokio::test]
async fn concurrent_misses_share_one_provider_call() {
	let cfg = jib_testkit::test_config().expect("Failed to load test config.");
	let geocoder =
		CountingGeocoder::new([(SIAM_AREA, SIAM)]).with_delay(Duration::from_millis(50));
	let cache = GeocodeCache::new(16);
	let (a, b, c) = tokio::join!(
		cache.resolve(&geocoder, &cfg.providers.geocode, SIAM_AREA),
		cache.resolve(&geocoder, &cfg.providers.geocode, SIAM_AREA),
		cache.resolve(&geocoder, &cfg.providers.geocode, SIAM_AREA),
	);

	assert_eq!((a, b, c), (Some(SIAM), Some(SIAM), Some(SIAM)));
	assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn concurrent_searches_geocode_an_area_once() {
	let geocoder =
		Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]).with_delay(Duration::from_millis(50)));
	let service = service(providers_with(None, None, Some(geocoder.clone())));
	let (first, second) = tokio::join!(
		service.search(area_request(SIAM_AREA)),
		service.search(area_request(SIAM_AREA))
	);

	assert!(first.is_ok() && second.is_ok());
	assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn not_found_results_are_cached() {
	let geocoder = Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]));
	let service = service(providers_with(None, None, Some(geocoder.clone())));

	for _ in 0..3 {
		let res = service.search(area_request("Atlantis")).await.expect("Search failed.");

		assert_eq!(res.filters.geo, GeoResolution::Unresolved);
		assert_eq!(res.filters.eligible, 5);
	}

	assert_eq!(geocoder.calls(), 1);
	assert_eq!(service.geocoder().get("Atlantis").await, Some(None));
}

#[tokio::test]
async fn provider_errors_fail_open_and_are_cached() {
	let geocoder = Arc::new(CountingGeocoder::failing());
	let service = service(providers_with(None, None, Some(geocoder.clone())));

	for _ in 0..2 {
		let res = service.search(area_request(SIAM_AREA)).await.expect("Search failed.");

		assert_eq!(res.filters.geo, GeoResolution::Unresolved);
		assert_eq!(res.results.len(), 5);
	}

	assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn slow_geocoding_times_out_and_fails_open() {
	let mut cfg = jib_testkit::test_config().expect("Failed to load test config.");

	cfg.providers.geocode.timeout_ms = 50;

	let geocoder =
		Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]).with_delay(Duration::from_secs(5)));
	let catalog = jib_testkit::sample_catalog().expect("Failed to build sample catalog.");
	let service =
		JibService::with_providers(cfg, catalog, providers_with(None, None, Some(geocoder)))
			.expect("Failed to build service.");
	let res = service.search(area_request(SIAM_AREA)).await.expect("Search failed.");

	assert_eq!(res.filters.geo, GeoResolution::Unresolved);
	assert_eq!(res.filters.eligible, 5);
}

#[tokio::test]
async fn blank_areas_are_skipped() {
	let geocoder = Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)]));
	let service = service(providers_with(None, None, Some(geocoder.clone())));
	let res = service.search(area_request("  ")).await.expect("Search failed.");

	assert_eq!(res.filters.geo, GeoResolution::Skipped);
	assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn cache_stays_within_capacity() {
	let cfg = jib_testkit::test_config().expect("Failed to load test config.");
	let geocoder = CountingGeocoder::new([(SIAM_AREA, SIAM)]);
	let cache = GeocodeCache::new(2);

	for address in ["a", "b", "c", "d", SIAM_AREA] {
		cache.resolve(&geocoder, &cfg.providers.geocode, address).await;
	}

	cache.run_pending_tasks().await;

	assert!(cache.entry_count() <= 2, "entry count {}", cache.entry_count());
	assert_eq!(geocoder.calls(), 5);
}
