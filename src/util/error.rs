//! The crate-wide error type and the taxonomy the HTTP edge classifies on.
use err_derive::Error;
use http::StatusCode;

/// The four kinds of failure the core distinguishes. Every [`Error`] maps to
/// exactly one of these, regardless of how many layers of context wrap it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	BadRequest,
	NotFound,
	Internal,
	Cancelled,
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(display = "Bad request: {}", _0)]
	BadRequest(String),

	#[error(display = "Not found: {}", _0)]
	NotFound(String),

	#[error(display = "Internal error: {}", _0)]
	Message(String),

	#[error(display = "Operation cancelled")]
	Cancelled,

	#[error(display = "IO error: {}", _0)]
	Io(#[error(source)] std::io::Error),

	#[error(display = "JSON error: {}", _0)]
	Json(#[error(source)] serde_json::Error),

	#[error(display = "TOML error: {}", _0)]
	Toml(#[error(source)] toml::de::Error),

	#[error(display = "RPC error: {}", _0)]
	Rpc(#[error(source)] tonic::Status),

	#[error(display = "Transport error: {}", _0)]
	Transport(#[error(source)] tonic::transport::Error),
}

impl Error {
	pub fn bad_request<M: Into<String>>(msg: M) -> Self {
		Error::BadRequest(msg.into())
	}

	pub fn not_found<M: Into<String>>(msg: M) -> Self {
		Error::NotFound(msg.into())
	}

	pub fn internal<M: Into<String>>(msg: M) -> Self {
		Error::Message(msg.into())
	}

	/// Classify this error into the taxonomy the edge layer maps to HTTP status.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::BadRequest(_) => ErrorKind::BadRequest,
			Error::NotFound(_) => ErrorKind::NotFound,
			Error::Cancelled => ErrorKind::Cancelled,
			Error::Message(_) | Error::Io(_) | Error::Json(_) | Error::Toml(_) => {
				ErrorKind::Internal
			}
			Error::Rpc(status) => match status.code() {
				tonic::Code::NotFound => ErrorKind::NotFound,
				tonic::Code::InvalidArgument => ErrorKind::BadRequest,
				tonic::Code::Cancelled => ErrorKind::Cancelled,
				_ => ErrorKind::Internal,
			},
			Error::Transport(_) => ErrorKind::Internal,
		}
	}

	pub fn http_status_code(&self) -> StatusCode {
		match self.kind() {
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
			ErrorKind::Internal | ErrorKind::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait mirroring the reference codebase's `OkOrBadRequest`: turns an
/// `Option` into a `bad_request` error with a caller-supplied message.
pub trait OkOrBadRequest<T> {
	fn ok_or_bad_request<M: Into<String>>(self, msg: M) -> Result<T>;
}

impl<T> OkOrBadRequest<T> for Option<T> {
	fn ok_or_bad_request<M: Into<String>>(self, msg: M) -> Result<T> {
		self.ok_or_else(|| Error::bad_request(msg))
	}
}

/// Extension trait mirroring the reference codebase's `OkOrMessage`.
pub trait OkOrNotFound<T> {
	fn ok_or_not_found<M: Into<String>>(self, msg: M) -> Result<T>;
}

impl<T> OkOrNotFound<T> for Option<T> {
	fn ok_or_not_found<M: Into<String>>(self, msg: M) -> Result<T> {
		self.ok_or_else(|| Error::not_found(msg))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_classification() {
		assert_eq!(Error::bad_request("x").kind(), ErrorKind::BadRequest);
		assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
		assert_eq!(Error::internal("x").kind(), ErrorKind::Internal);
		assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
	}

	#[test]
	fn http_status_mapping() {
		assert_eq!(Error::not_found("x").http_status_code(), StatusCode::NOT_FOUND);
		assert_eq!(Error::bad_request("x").http_status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(Error::internal("x").http_status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(Error::Cancelled.http_status_code(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
