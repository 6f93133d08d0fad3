use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}
impl GeoPoint {
	pub fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}

	/// Finite and inside the WGS84 degree ranges.
	pub fn is_valid(&self) -> bool {
		self.lat.is_finite()
			&& self.lng.is_finite()
			&& (-90.0..=90.0).contains(&self.lat)
			&& (-180.0..=180.0).contains(&self.lng)
	}
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
	let lat_a = a.lat.to_radians();
	let lat_b = b.lat.to_radians();
	let d_lat = (b.lat - a.lat).to_radians();
	let d_lng = (b.lng - a.lng).to_radians();
	let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
