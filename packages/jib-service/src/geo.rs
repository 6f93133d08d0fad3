use std::time::Duration;

use moka::{future::Cache, policy::EvictionPolicy};
use serde::Serialize;

use jib_config::GeocodeProviderConfig;
use jib_domain::geo::{self as domain_geo, GeoPoint};

use crate::{GeocodeError, GeocodeProvider, catalog::Document, mask::Mask};

/// How the request area was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeoResolution {
	/// No area, a blank area, or the unknown sentinel. No lookup was made.
	Skipped,
	/// The provider failed, timed out, or found nothing.
	Unresolved,
	Resolved { point: GeoPoint },
}
impl GeoResolution {
	pub fn point(&self) -> Option<GeoPoint> {
		match self {
			Self::Resolved { point } => Some(*point),
			Self::Skipped | Self::Unresolved => None,
		}
	}
}

/// Bounded LRU cache of geocode results keyed by the raw address.
///
/// Negative results are cached too. Concurrent misses for one address share a single
/// provider call.
#[derive(Clone)]
pub struct GeocodeCache {
	cache: Cache<String, Option<GeoPoint>>,
}
impl GeocodeCache {
	pub fn new(capacity: u64) -> Self {
		let cache = Cache::builder()
			.max_capacity(capacity)
			.eviction_policy(EvictionPolicy::lru())
			.build();

		Self { cache }
	}

	pub async fn resolve(
		&self,
		provider: &dyn GeocodeProvider,
		cfg: &GeocodeProviderConfig,
		address: &str,
	) -> Option<GeoPoint> {
		self.cache
			.get_with(address.to_string(), async {
				tracing::info!(address, "Geocode cache miss.");

				match lookup(provider, cfg, address).await {
					Ok(point) => point,
					Err(err) => {
						tracing::warn!(error = %err, address, "Geocode lookup failed.");

						None
					},
				}
			})
			.await
	}

	pub async fn get(&self, address: &str) -> Option<Option<GeoPoint>> {
		self.cache.get(address).await
	}

	/// Approximate; pending maintenance may lag behind inserts.
	pub fn entry_count(&self) -> u64 {
		self.cache.entry_count()
	}

	pub async fn run_pending_tasks(&self) {
		self.cache.run_pending_tasks().await;
	}
}

async fn lookup(
	provider: &dyn GeocodeProvider,
	cfg: &GeocodeProviderConfig,
	address: &str,
) -> Result<Option<GeoPoint>, GeocodeError> {
	let timeout = Duration::from_millis(cfg.timeout_ms);

	tokio::time::timeout(timeout, provider.geocode(cfg, address))
		.await
		.map_err(|_| GeocodeError::Timeout { timeout_ms: cfg.timeout_ms })?
}

/// Resolves the request area, skipping blank areas and the unknown sentinel.
pub async fn resolve_area(
	cache: &GeocodeCache,
	provider: &dyn GeocodeProvider,
	cfg: &GeocodeProviderConfig,
	unknown_area: &str,
	area: Option<&str>,
) -> GeoResolution {
	let Some(area) = area.filter(|area| !area.trim().is_empty() && area.trim() != unknown_area)
	else {
		return GeoResolution::Skipped;
	};

	match cache.resolve(provider, cfg, area).await {
		Some(point) => GeoResolution::Resolved { point },
		None => {
			tracing::warn!(area, "Area could not be geocoded; geo filter disabled.");

			GeoResolution::Unresolved
		},
	}
}

/// Documents within `radius_km` of `center`. Missing or malformed coordinates are included.
pub fn geo_mask(documents: &[Document], center: GeoPoint, radius_km: f64) -> Mask {
	Mask::from_fn(documents.len(), |id| match documents[id].coordinate {
		Some(point) if point.is_valid() => domain_geo::haversine_km(center, point) <= radius_km,
		_ => true,
	})
}

/// The requested radius when it is finite and non-negative, otherwise `default_km`.
pub fn effective_radius(requested: Option<f64>, default_km: f64) -> f64 {
	requested.filter(|km| km.is_finite() && *km >= 0.0).unwrap_or(default_km)
}
