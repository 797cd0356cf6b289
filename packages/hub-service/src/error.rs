use hub_domain::{Rejection, dashboard::MoveError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid request: {0}")]
	Rejected(#[from] Rejection),
	#[error("Unauthenticated: {message}")]
	Unauthenticated { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<hub_storage::Error> for Error {
	fn from(err: hub_storage::Error) -> Self {
		match err {
			hub_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
impl From<MoveError> for Error {
	fn from(err: MoveError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Storage { message: format!("Failed to decode stored row: {err}") }
	}
}
