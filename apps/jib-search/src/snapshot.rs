use std::{fs, path::Path};

use color_eyre::eyre::WrapErr;

use jib_service::{Catalog, CatalogSnapshot};

/// Reads a JSON catalog snapshot and validates it into a [`Catalog`].
pub fn load(path: &Path) -> color_eyre::Result<Catalog> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read catalog snapshot at {path:?}."))?;
	let snapshot: CatalogSnapshot = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse catalog snapshot at {path:?}."))?;
	let catalog = Catalog::try_from(snapshot)?;

	tracing::info!(path = %path.display(), documents = catalog.len(), "Catalog snapshot loaded.");

	Ok(catalog)
}
