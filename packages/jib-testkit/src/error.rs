pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Toml(#[from] toml::de::Error),

	#[error(transparent)]
	Config(#[from] jib_config::Error),

	#[error(transparent)]
	Service(#[from] jib_service::Error),
}
