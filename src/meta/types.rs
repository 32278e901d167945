//! The data model: `File` identity, `FileVersion` lifecycle, and `Part`
//! placement records.
use serde::{Deserialize, Serialize};

use objectstore_util::error::Error;

/// The two-level name of an object. Both fields are non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct File {
	pub bucket: String,
	pub key: String,
}

impl File {
	pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
		File { bucket: bucket.into(), key: key.into() }
	}

	/// The canonical map key: `bucket + "/" + key`. Keys may themselves
	/// contain `/`; only the first separator is significant.
	pub fn canonical(&self) -> String {
		format!("{}/{}", self.bucket, self.key)
	}

	/// Inverse of [`File::canonical`]: splits on the first `/` only.
	pub fn from_canonical(s: &str) -> Result<Self, Error> {
		let mut parts = s.splitn(2, '/');
		let bucket = parts.next().filter(|s| !s.is_empty());
		let key = parts.next().filter(|s| !s.is_empty());
		match (bucket, key) {
			(Some(bucket), Some(key)) => Ok(File::new(bucket, key)),
			_ => Err(Error::bad_request(format!("invalid file format: {s}"))),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Loading,
	Ready,
	Error,
}

/// Returns whether `prev -> next` is a legal status transition: only
/// `Loading` may change; `Ready`/`Error` are frozen, even to themselves.
pub fn can_change_status(prev: Status, _next: Status) -> bool {
	prev == Status::Loading
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
	pub index: usize,
	pub servers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
	pub version: usize,
	pub content_type: String,
	pub status: Status,
	pub parts: Vec<Part>,
}

/// Identifies a specific version to mutate, without carrying the rest of
/// the `FileVersion` payload around. Mirrors the reference API's habit of
/// passing back a whole `FileVersion` and only reading its `version` field.
#[derive(Debug, Clone, Copy)]
pub struct VersionRef {
	pub version: usize,
}
