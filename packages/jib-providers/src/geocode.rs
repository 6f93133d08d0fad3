use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use jib_domain::geo::GeoPoint;

use crate::{Error, Result};

/// Resolves a free-form address with a Google-Geocoding-compatible endpoint.
///
/// `Ok(None)` means the provider answered but found nothing.
pub async fn geocode(
	cfg: &jib_config::GeocodeProviderConfig,
	address: &str,
) -> Result<Option<GeoPoint>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.get(url)
		.query(&[("address", address), ("key", cfg.api_key.as_str())])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_geocode_response(json)
}

fn parse_geocode_response(json: Value) -> Result<Option<GeoPoint>> {
	let status = json.get("status").and_then(|v| v.as_str()).unwrap_or_default();

	match status {
		"OK" => {},
		"ZERO_RESULTS" => return Ok(None),
		other => {
			return Err(Error::InvalidResponse {
				message: format!("Geocode request failed with status {other:?}."),
			});
		},
	}

	let Some(location) = json
		.get("results")
		.and_then(|v| v.as_array())
		.and_then(|results| results.first())
		.and_then(|first| first.pointer("/geometry/location"))
	else {
		return Ok(None);
	};
	let lat = location.get("lat").and_then(|v| v.as_f64());
	let lng = location.get("lng").and_then(|v| v.as_f64());

	match (lat, lng) {
		(Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng))),
		_ => Err(Error::InvalidResponse {
			message: "Geocode location must carry numeric lat and lng.".to_string(),
		}),
	}
}
