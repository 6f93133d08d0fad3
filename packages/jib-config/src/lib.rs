mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Fusion, Geo, GeocodeProviderConfig, Lexical, ProviderConfig,
	Providers, QueryAlias, Search, SearchBrowse, SearchProfile, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, key, timeout_ms) in [
		("embedding", &cfg.providers.embedding.api_key, cfg.providers.embedding.timeout_ms),
		("rerank", &cfg.providers.rerank.api_key, cfg.providers.rerank.timeout_ms),
		("geocode", &cfg.providers.geocode.api_key, cfg.providers.geocode.timeout_ms),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if !cfg.lexical.k1.is_finite() || cfg.lexical.k1 < 0.0 {
		return Err(Error::Validation {
			message: "lexical.k1 must be a finite number, zero or greater.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.lexical.b) {
		return Err(Error::Validation {
			message: "lexical.b must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.fusion.k.is_finite() || cfg.fusion.k <= 0.0 {
		return Err(Error::Validation {
			message: "fusion.k must be a finite number greater than zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.fusion.alpha) {
		return Err(Error::Validation {
			message: "fusion.alpha must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.geo.cache_capacity == 0 {
		return Err(Error::Validation {
			message: "geo.cache_capacity must be greater than zero.".to_string(),
		});
	}

	for (label, profile) in
		[("search.context", &cfg.search.context), ("search.lookup", &cfg.search.lookup)]
	{
		validate_profile(label, profile)?;
	}

	if cfg.search.browse.candidate_k == 0 {
		return Err(Error::Validation {
			message: "search.browse.candidate_k must be greater than zero.".to_string(),
		});
	}

	for alias in &cfg.search.aliases {
		if alias.pattern.is_empty() || alias.canonical.trim().is_empty() {
			return Err(Error::Validation {
				message: "search.aliases entries must have a non-empty pattern and canonical."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_profile(label: &str, profile: &SearchProfile) -> Result<()> {
	if profile.candidate_k == 0 || profile.safety_net_k == 0 {
		return Err(Error::Validation {
			message: format!("{label}.candidate_k and {label}.safety_net_k must be greater than zero."),
		});
	}
	if profile.top_n == 0 || profile.safety_net_n == 0 {
		return Err(Error::Validation {
			message: format!("{label}.top_n and {label}.safety_net_n must be greater than zero."),
		});
	}
	if profile.top_n > profile.candidate_k {
		return Err(Error::Validation {
			message: format!("{label}.top_n must not exceed {label}.candidate_k."),
		});
	}
	if profile.safety_net_n > profile.safety_net_k {
		return Err(Error::Validation {
			message: format!("{label}.safety_net_n must not exceed {label}.safety_net_k."),
		});
	}
	if !profile.default_radius_km.is_finite() || profile.default_radius_km < 0.0 {
		return Err(Error::Validation {
			message: format!("{label}.default_radius_km must be a finite number, zero or greater."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for alias in &mut cfg.search.aliases {
		alias.pattern = alias.pattern.trim().to_lowercase();
		alias.canonical = alias.canonical.trim().to_string();
	}

	cfg.search.aliases.retain(|alias| !alias.pattern.is_empty());
}
