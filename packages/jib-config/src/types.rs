use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub lexical: Lexical,
	#[serde(default)]
	pub fusion: Fusion,
	#[serde(default)]
	pub geo: Geo,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: ProviderConfig,
	pub geocode: GeocodeProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Geocoding endpoints authenticate with a `key` query parameter instead of a bearer header.
#[derive(Debug, Deserialize)]
pub struct GeocodeProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_geocode_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Lexical {
	/// Term-frequency saturation.
	pub k1: f64,
	/// Document-length normalization.
	pub b: f64,
}
impl Default for Lexical {
	fn default() -> Self {
		Self { k1: 1.5, b: 0.75 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Fusion {
	pub k: f64,
	/// Weight on the semantic term; the lexical term receives `1 - alpha`.
	pub alpha: f64,
	/// Apply mask positions to the ascending-ordered id union instead of to document ids.
	pub legacy_positional_mask: bool,
}
impl Default for Fusion {
	fn default() -> Self {
		Self { k: 60.0, alpha: 0.5, legacy_positional_mask: false }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Geo {
	pub unknown_area: String,
	pub cache_capacity: u64,
}
impl Default for Geo {
	fn default() -> Self {
		Self { unknown_area: "<UNKNOWN>".to_string(), cache_capacity: 1_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub context: SearchProfile,
	pub lookup: SearchProfile,
	pub browse: SearchBrowse,
	pub aliases: Vec<QueryAlias>,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			context: SearchProfile {
				candidate_k: 150,
				top_n: 10,
				safety_net_k: 20,
				safety_net_n: 10,
				default_radius_km: 15.0,
			},
			lookup: SearchProfile {
				candidate_k: 15,
				top_n: 5,
				safety_net_k: 150,
				safety_net_n: 2,
				default_radius_km: 10.0,
			},
			browse: SearchBrowse::default(),
			aliases: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProfile {
	/// Fused candidates handed to the reranker on the filtered path.
	pub candidate_k: u32,
	/// Results kept after reranking on the filtered path.
	pub top_n: u32,
	pub safety_net_k: u32,
	pub safety_net_n: u32,
	pub default_radius_km: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchBrowse {
	pub candidate_k: u32,
}
impl Default for SearchBrowse {
	fn default() -> Self {
		Self { candidate_k: 100 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryAlias {
	pub pattern: String,
	pub canonical: String,
}

fn default_geocode_timeout_ms() -> u64 {
	10_000
}
