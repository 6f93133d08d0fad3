use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use jib_config::SearchProfile;
use jib_domain::geo::GeoPoint;

use crate::{
	Error, JibService, Result,
	catalog::{DocId, Document},
	category,
	fusion::{self, FusionParams},
	geo::{self, GeoResolution},
	mask::{self, Mask},
	rank::RankMap,
	rerank,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
	/// Larger pool and full metadata, for answering informational queries.
	Context,
	/// Small pool and minimal items, for resolving a canonical record to act on.
	Lookup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub area: Option<String>,
	#[serde(default)]
	pub radius_km: Option<f64>,
	#[serde(default)]
	pub category: Option<String>,
	pub mode: SearchMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
	pub doc_id: DocId,
	pub title: String,
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub coordinate: Option<GeoPoint>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Map<String, Value>>,
}
impl SearchItem {
	pub fn full(doc: &Document) -> Self {
		Self {
			doc_id: doc.id,
			title: doc.title.clone(),
			url: doc.url.clone(),
			content: Some(doc.content.clone()),
			coordinate: doc.coordinate,
			metadata: Some(doc.metadata.clone()),
		}
	}

	pub fn minimal(doc: &Document) -> Self {
		Self {
			doc_id: doc.id,
			title: doc.title.clone(),
			url: doc.url.clone(),
			content: None,
			coordinate: None,
			metadata: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
	pub geo: GeoResolution,
	pub radius_km: f64,
	pub category_matched: bool,
	/// Documents allowed by the mask the filtered path ran under.
	pub eligible: usize,
	pub geo_dropped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	pub trace_id: Uuid,
	pub mode: SearchMode,
	/// The query after alias rewriting.
	pub query: String,
	pub results: Vec<SearchItem>,
	/// Unfiltered results computed beside the filtered ones.
	pub safety_net: Vec<SearchItem>,
	pub filters: FilterSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowseResponse {
	pub trace_id: Uuid,
	pub items: Vec<SearchItem>,
}

impl JibService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let trace_id = Uuid::new_v4();
		let raw_query = req.query.trim();

		if raw_query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let profile = self.profile(req.mode);
		let query = match req.mode {
			SearchMode::Lookup => self.aliases.rewrite(raw_query).into_owned(),
			SearchMode::Context => raw_query.to_string(),
		};

		if query != raw_query {
			tracing::info!(
				%trace_id,
				original = raw_query,
				rewritten = %query,
				"Query alias applied."
			);
		}

		let (lexical, semantic, resolution) = tokio::join!(
			self.rank_lexical(&query),
			self.semantic.rank(
				self.providers.embedding.as_ref(),
				&self.cfg.providers.embedding,
				&query
			),
			geo::resolve_area(
				&self.geocoder,
				self.providers.geocode.as_ref(),
				&self.cfg.providers.geocode,
				&self.cfg.geo.unknown_area,
				req.area.as_deref(),
			),
		);
		let lexical = lexical?;
		let semantic = semantic.inspect_err(|err| {
			tracing::error!(%trace_id, error = %err, "Query embedding failed.");
		})?;
		let docs = self.catalog.documents();
		let n = docs.len();
		let radius_km = geo::effective_radius(req.radius_km, profile.default_radius_km);
		let geo_mask = match resolution.point() {
			Some(center) => geo::geo_mask(docs, center, radius_km),
			None => Mask::all(n),
		};
		let (category_mask, category_matched) =
			category::category_mask(self.catalog.taxonomy(), n, req.category.as_deref());
		let resolved = mask::combine(&geo_mask, &category_mask);

		debug_assert_eq!(resolved.mask.len(), n, "Mask length must match the catalog.");

		let params = FusionParams::from(&self.cfg.fusion);
		let filtered = fusion::fuse(&lexical, &semantic, &resolved.mask, &params);
		let unfiltered = fusion::fuse(&lexical, &semantic, &Mask::all(n), &params);
		let eligible = resolved.mask.count();
		let (pool_k, top_n) = fusion::effective_limits(
			profile.candidate_k as usize,
			profile.top_n as usize,
			eligible,
		);
		let (net_k, net_n) = fusion::effective_limits(
			profile.safety_net_k as usize,
			profile.safety_net_n as usize,
			n,
		);
		let candidates = fusion::top_k(&filtered, pool_k);
		let net_candidates = fusion::top_k(&unfiltered, net_k);
		let rerank_provider = self.providers.rerank.as_ref();
		let rerank_cfg = &self.cfg.providers.rerank;
		let (results, safety_net) = tokio::join!(
			rerank::rerank_candidates(
				rerank_provider,
				rerank_cfg,
				&self.catalog,
				&query,
				&candidates,
				top_n,
			),
			rerank::rerank_candidates(
				rerank_provider,
				rerank_cfg,
				&self.catalog,
				&query,
				&net_candidates,
				net_n,
			),
		);

		tracing::info!(
			%trace_id,
			mode = ?req.mode,
			eligible,
			geo_dropped = resolved.geo_dropped,
			category_matched,
			results = results.len(),
			safety_net = safety_net.len(),
			"Search completed."
		);

		Ok(SearchResponse {
			trace_id,
			mode: req.mode,
			results: self.items(&results, req.mode),
			safety_net: self.items(&safety_net, req.mode),
			query,
			filters: FilterSummary {
				geo: resolution,
				radius_km,
				category_matched,
				eligible,
				geo_dropped: resolved.geo_dropped,
			},
		})
	}

	/// Unfiltered fusion ordered by catalog placement. No rerank.
	pub async fn browse(&self, query: &str) -> Result<BrowseResponse> {
		let trace_id = Uuid::new_v4();
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let (lexical, semantic) = tokio::join!(
			self.rank_lexical(query),
			self.semantic.rank(
				self.providers.embedding.as_ref(),
				&self.cfg.providers.embedding,
				query
			),
		);
		let lexical = lexical?;
		let semantic = semantic?;
		let n = self.catalog.len();
		let fused =
			fusion::fuse(&lexical, &semantic, &Mask::all(n), &FusionParams::from(&self.cfg.fusion));
		let mut ids = fusion::top_k(&fused, self.cfg.search.browse.candidate_k as usize);

		ids.sort_by_key(|id| {
			let placement = self.catalog.document(*id).and_then(|doc| doc.placement);

			(placement.is_none(), placement)
		});

		tracing::info!(%trace_id, items = ids.len(), "Browse completed.");

		Ok(BrowseResponse { trace_id, items: self.items(&ids, SearchMode::Lookup) })
	}

	fn profile(&self, mode: SearchMode) -> &SearchProfile {
		match mode {
			SearchMode::Context => &self.cfg.search.context,
			SearchMode::Lookup => &self.cfg.search.lookup,
		}
	}

	async fn rank_lexical(&self, query: &str) -> Result<RankMap> {
		let lexical = Arc::clone(&self.lexical);
		let query = query.to_string();

		tokio::task::spawn_blocking(move || lexical.rank(&query))
			.await
			.map_err(|err| Error::Task { message: err.to_string() })
	}

	fn items(&self, ids: &[DocId], mode: SearchMode) -> Vec<SearchItem> {
		ids.iter()
			.filter_map(|id| self.catalog.document(*id))
			.map(|doc| match mode {
				SearchMode::Context => SearchItem::full(doc),
				SearchMode::Lookup => SearchItem::minimal(doc),
			})
			.collect()
	}
}
