//! The in-memory, mutex-protected versioned metadata directory.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use objectstore_util::cancel::{self, CancellationToken};
use objectstore_util::error::{Error, OkOrNotFound};

use crate::types::{can_change_status, File, FileVersion, Part, Status, VersionRef};

struct State {
	files: HashMap<String, Vec<FileVersion>>,
	closed: bool,
}

/// A single-process, versioned directory of `(bucket, key) -> [FileVersion]`.
/// Guarded by one `RwLock` for the whole map: `get_version`/`list_versions`
/// take a shared lock, every mutating call takes an exclusive lock. Critical
/// sections never perform RPC or block on further I/O.
pub struct Meta {
	state: RwLock<State>,
	path: PathBuf,
}

impl Meta {
	/// Opens the backing document. Missing or empty content starts an empty
	/// store; non-empty content must decode as the persisted document shape.
	pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref().to_path_buf();

		let bytes = match tokio::fs::read(&path).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
			Err(e) => return Err(e.into()),
		};

		let files = if bytes.is_empty() {
			HashMap::new()
		} else {
			serde_json::from_slice(&bytes)?
		};

		Ok(Self { state: RwLock::new(State { files, closed: false }), path })
	}

	pub async fn new_version(
		&self,
		token: &CancellationToken,
		file: &File,
		content_type: impl Into<String>,
	) -> Result<FileVersion, Error> {
		cancel::check(token)?;

		let mut state = self.state.write().await;
		let versions = state.files.entry(file.canonical()).or_default();

		let fv = FileVersion {
			version: versions.len(),
			content_type: content_type.into(),
			status: Status::Loading,
			parts: Vec::new(),
		};
		versions.push(fv.clone());

		debug!(bucket = %file.bucket, key = %file.key, version = fv.version, "new version created");

		Ok(fv)
	}

	pub async fn update_status(
		&self,
		token: &CancellationToken,
		file: &File,
		version_ref: VersionRef,
		status: Status,
	) -> Result<(), Error> {
		cancel::check(token)?;

		let mut state = self.state.write().await;
		let versions = state
			.files
			.get_mut(&file.canonical())
			.ok_or_not_found("file not found")?;

		let fv = versions
			.iter_mut()
			.find(|v| v.version == version_ref.version)
			.ok_or_not_found("file version not found")?;

		if !can_change_status(fv.status, status) {
			return Err(Error::bad_request("can't update final status"));
		}
		fv.status = status;
		Ok(())
	}

	pub async fn new_part(
		&self,
		token: &CancellationToken,
		file: &File,
		version_ref: VersionRef,
		part: Part,
	) -> Result<(), Error> {
		cancel::check(token)?;

		let mut state = self.state.write().await;
		let versions = state
			.files
			.get_mut(&file.canonical())
			.ok_or_not_found("file not found")?;

		let fv = versions
			.get_mut(version_ref.version)
			.ok_or_not_found("file version not found")?;

		if part.index != fv.parts.len() {
			return Err(Error::bad_request("invalid part index"));
		}
		fv.parts.push(part);
		Ok(())
	}

	/// Returns a copy of the highest-`version` entry with status `Ready`.
	pub async fn get_version(
		&self,
		token: &CancellationToken,
		file: &File,
	) -> Result<FileVersion, Error> {
		cancel::check(token)?;

		let state = self.state.read().await;
		let versions = state
			.files
			.get(&file.canonical())
			.ok_or_not_found("file not found")?;

		versions
			.iter()
			.rev()
			.find(|v| v.status == Status::Ready)
			.cloned()
			.ok_or_not_found("file version not found")
	}

	/// Returns a defensive copy of the full version history, all statuses,
	/// in creation order. Diagnostic/testing extension over the critical path.
	pub async fn list_versions(
		&self,
		token: &CancellationToken,
		file: &File,
	) -> Result<Vec<FileVersion>, Error> {
		cancel::check(token)?;

		let state = self.state.read().await;
		state
			.files
			.get(&file.canonical())
			.cloned()
			.ok_or_not_found("file not found")
	}

	/// Idempotent: the second call is a no-op. Serializes the whole map and
	/// truncate-rewrites the backing document.
	pub async fn close(&self) -> Result<(), Error> {
		let mut state = self.state.write().await;
		if state.closed {
			return Ok(());
		}
		state.closed = true;

		let bytes = serde_json::to_vec(&state.files)?;
		tokio::fs::write(&self.path, bytes).await?;
		Ok(())
	}
}
