pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Embedding(#[from] EmbeddingError),
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid config: {message}")]
	InvalidConfig { message: String },
	#[error("Invalid catalog: {message}")]
	InvalidCatalog { message: String },
	#[error("Task failed: {message}")]
	Task { message: String },
}

/// Query embedding failures. Every variant aborts the request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingError {
	#[error("Embedding provider error: {message}")]
	Provider { message: String },
	#[error("Embedding provider timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
	#[error("Embedding dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
}

/// Geocode failures. Logged and treated as an unresolved area.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocodeError {
	#[error("Geocode provider error: {message}")]
	Provider { message: String },
	#[error("Geocode provider timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
}

/// Rerank failures. Logged and replaced by fusion order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RerankError {
	#[error("Rerank provider error: {message}")]
	Provider { message: String },
	#[error("Rerank provider timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
	#[error("Rerank provider returned no usable candidate index.")]
	EmptyResponse,
}
