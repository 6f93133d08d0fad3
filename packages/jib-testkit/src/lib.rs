mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;

use jib_config::{Config, EmbeddingProviderConfig, GeocodeProviderConfig, ProviderConfig};
use jib_domain::geo::GeoPoint;
use jib_service::{
	BoxFuture, Catalog, CategoryTaxonomy, Document, EmbeddingError, EmbeddingMatrix,
	EmbeddingProvider, GeocodeError, GeocodeProvider, JibService, Providers, RerankError,
	RerankProvider, RerankRequest, RerankResponse,
};

/// Area the sample geocoder resolves to [`SIAM`].
pub const SIAM_AREA: &str = "Siam Paragon";
pub const SIAM: GeoPoint = GeoPoint { lat: 13.7462, lng: 100.5347 };
/// Sample category holding documents 0 through 3.
pub const AESTHETICS: &str = "Aesthetics";
/// Matches the sample catalog with term frequencies 4, 2, 3, 0, 1.
pub const BOTOX_QUERY: &str = "botox";

const TEST_CONFIG_TOML: &str = r#"
[service]
log_level = "debug"

[providers.embedding]
provider_id = "mock"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/embeddings"
model       = "mock-embedding"
dimensions  = 2
timeout_ms  = 1000

[providers.rerank]
provider_id = "mock"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/rerank"
model       = "mock-rerank"
timeout_ms  = 1000

[providers.geocode]
provider_id = "mock"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/geocode/json"
timeout_ms  = 1000

[search.context]
candidate_k       = 150
top_n             = 10
safety_net_k      = 20
safety_net_n      = 10
default_radius_km = 5.0

[search.lookup]
candidate_k       = 15
top_n             = 2
safety_net_k      = 150
safety_net_n      = 2
default_radius_km = 5.0

[[search.aliases]]
pattern   = "bkk botox"
canonical = "botox"
"#;

/// A validated config pointing at unreachable endpoints; pair it with mock providers.
pub fn test_config() -> Result<Config> {
	let cfg: Config = toml::from_str(TEST_CONFIG_TOML)?;

	jib_config::validate(&cfg)?;

	Ok(cfg)
}

/// Five clinics around Siam with two-dimensional embeddings.
///
/// For [`BOTOX_QUERY`] the lexical ranks are `[1, 3, 2, 5, 4]`, and the embedding from
/// [`sample_query_vector`] yields semantic ranks `[2, 1, 3, 4, 5]`. Document 4 lies about
/// 50 km north of [`SIAM`]; the others are within 5 km.
pub fn sample_catalog() -> Result<Catalog> {
	let fixtures: [(&str, &[&str], GeoPoint, Option<u32>, [f32; 2]); 5] = [
		(
			"Siam Aesthetic Clinic",
			&["botox", "botox", "botox", "botox", "siam"],
			GeoPoint::new(13.7450, 100.5400),
			Some(3),
			[0.9, 0.1],
		),
		(
			"Bangkok Anti Aging Center",
			&["botox", "botox", "anti", "aging", "center"],
			GeoPoint::new(13.7563, 100.5018),
			Some(1),
			[1.0, 0.0],
		),
		(
			"Ratchaprasong Skin",
			&["botox", "botox", "botox", "skin", "ratchaprasong"],
			GeoPoint::new(13.7400, 100.5480),
			None,
			[0.8, 0.2],
		),
		(
			"Lumphini Dental",
			&["dental", "cleaning", "whitening", "lumphini", "smile"],
			GeoPoint::new(13.7300, 100.5600),
			Some(2),
			[0.7, 0.3],
		),
		(
			"Pathum Thani Beauty",
			&["botox", "pathum", "thani", "beauty", "laser"],
			GeoPoint::new(14.1962, 100.5347),
			None,
			[0.6, 0.4],
		),
	];
	let mut documents = Vec::with_capacity(fixtures.len());
	let mut rows = Vec::with_capacity(fixtures.len());

	for (id, (title, tokens, coordinate, placement, row)) in fixtures.into_iter().enumerate() {
		let mut metadata = Map::new();

		metadata.insert("district".to_string(), serde_json::json!(tokens[tokens.len() - 1]));

		documents.push(Document {
			id,
			tokens: tokens.iter().map(|token| token.to_string()).collect(),
			coordinate: Some(coordinate),
			title: title.to_string(),
			content: format!("{title} offers {}.", tokens.join(" ")),
			url: Some(format!("https://clinics.example/{id}")),
			placement,
			metadata,
		});
		rows.push(row.to_vec());
	}

	let taxonomy = CategoryTaxonomy::new([
		(AESTHETICS.to_string(), vec![0, 1, 2, 3]),
		("Dental".to_string(), vec![3]),
		("Discontinued".to_string(), Vec::new()),
	]);

	Ok(Catalog::new(documents, EmbeddingMatrix::from_rows(rows)?, taxonomy)?)
}

pub fn sample_query_vector() -> Vec<f32> {
	vec![1.0, 0.0]
}

/// A service over [`sample_catalog`] and [`test_config`] with the given providers.
pub fn sample_service(providers: Providers) -> Result<JibService> {
	Ok(JibService::with_providers(test_config()?, sample_catalog()?, providers)?)
}

/// Static embeddings, order-preserving reranks, and a geocoder that knows [`SIAM_AREA`].
pub fn sample_providers() -> Providers {
	Providers::new(
		Arc::new(StaticEmbedding::new(sample_query_vector())),
		Arc::new(ScriptedRerank::identity()),
		Arc::new(CountingGeocoder::new([(SIAM_AREA, SIAM)])),
	)
}

/// Returns the same vector for every text and records what it was asked to embed.
pub struct StaticEmbedding {
	vector: Vec<f32>,
	delay: Option<Duration>,
	texts: Mutex<Vec<String>>,
}
impl StaticEmbedding {
	pub fn new(vector: Vec<f32>) -> Self {
		Self { vector, delay: None, texts: Mutex::new(Vec::new()) }
	}

	/// Answers only after `delay`.
	pub fn delayed(vector: Vec<f32>, delay: Duration) -> Self {
		Self { vector, delay: Some(delay), texts: Mutex::new(Vec::new()) }
	}

	pub fn texts(&self) -> Vec<String> {
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl EmbeddingProvider for StaticEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, jib_service::Result<Vec<f32>, EmbeddingError>> {
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		Box::pin(async move {
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			Ok(self.vector.clone())
		})
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, jib_service::Result<Vec<f32>, EmbeddingError>> {
		Box::pin(async {
			Err(EmbeddingError::Provider { message: "embedding backend unavailable".to_string() })
		})
	}
}

/// Replies with a fixed index order, or with `0..top_n` when built with [`Self::identity`].
pub struct ScriptedRerank {
	order: Option<Vec<usize>>,
	requests: Mutex<Vec<RerankRequest>>,
}
impl ScriptedRerank {
	pub fn new(order: Vec<usize>) -> Self {
		Self { order: Some(order), requests: Mutex::new(Vec::new()) }
	}

	pub fn identity() -> Self {
		Self { order: None, requests: Mutex::new(Vec::new()) }
	}

	pub fn requests(&self) -> Vec<RerankRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl RerankProvider for ScriptedRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		request: &'a RerankRequest,
	) -> BoxFuture<'a, jib_service::Result<RerankResponse, RerankError>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let order = match &self.order {
			Some(order) => order.clone(),
			None => (0..request.top_n).collect(),
		};

		Box::pin(async move { Ok(RerankResponse { order }) })
	}
}

/// Always fails, counting attempts.
#[derive(Default)]
pub struct FailingRerank {
	calls: AtomicUsize,
}
impl FailingRerank {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl RerankProvider for FailingRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_request: &'a RerankRequest,
	) -> BoxFuture<'a, jib_service::Result<RerankResponse, RerankError>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Err(RerankError::Provider { message: "rerank backend unavailable".to_string() })
		})
	}
}

/// Resolves known addresses after an optional delay and counts provider calls.
pub struct CountingGeocoder {
	locations: HashMap<String, GeoPoint>,
	delay: Duration,
	fail: bool,
	calls: AtomicUsize,
}
impl CountingGeocoder {
	pub fn new<'a, I>(locations: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, GeoPoint)>,
	{
		Self {
			locations: locations
				.into_iter()
				.map(|(address, point)| (address.to_string(), point))
				.collect(),
			delay: Duration::ZERO,
			fail: false,
			calls: AtomicUsize::new(0),
		}
	}

	/// Every lookup errors.
	pub fn failing() -> Self {
		Self {
			locations: HashMap::new(),
			delay: Duration::ZERO,
			fail: true,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GeocodeProvider for CountingGeocoder {
	fn geocode<'a>(
		&'a self,
		_cfg: &'a GeocodeProviderConfig,
		address: &'a str,
	) -> BoxFuture<'a, jib_service::Result<Option<GeoPoint>, GeocodeError>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			if !self.delay.is_zero() {
				tokio::time::sleep(self.delay).await;
			}
			if self.fail {
				return Err(GeocodeError::Provider {
					message: "geocode backend unavailable".to_string(),
				});
			}

			Ok(self.locations.get(address).copied())
		})
	}
}
