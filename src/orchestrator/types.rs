//! Request/response shapes that cross the HTTP boundary into the pipelines.
use bytes::Bytes;

use objectstore_util::error::Error;

pub struct UploadRequest {
	pub bucket: String,
	pub key: String,
	pub content_type: String,
	pub content_length: i64,
}

pub struct DownloadRequest {
	pub bucket: String,
	pub key: String,
}

/// A boxed stream of body chunks, the shape hyper's incoming request body
/// is adapted to before it reaches the pipeline.
pub type BodyStream = std::pin::Pin<Box<dyn futures::Stream<Item = Result<Bytes, Error>> + Send>>;
