//! Upload pipeline: reserve a version, fan the body out across planned
//! parts sequentially, record each part once its server acknowledges it,
//! then close out the version's status.
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use objectstore_distributor::Plan;
use objectstore_meta::{File, Part, Status, VersionRef};
use objectstore_proto::part_server_client::PartServerClient;
use objectstore_proto::UploadChunk;
use objectstore_util::cancel::{self, CancellationToken};
use objectstore_util::error::Error;

use crate::body_reader::BodyReader;
use crate::types::{BodyStream, UploadRequest};
use crate::Orchestrator;

const UPLOAD_CHUNK_SIZE: usize = 8 * 1024;
const UPLOAD_CHANNEL_DEPTH: usize = 4;

impl Orchestrator {
	/// Runs the full upload pipeline for one object. The version is always
	/// marked `Ready` or `Error` on the way out, even if the body or a part
	/// server fails partway through; an error updating that final status is
	/// reported alongside the primary failure rather than swallowed.
	pub async fn upload(
		&self,
		token: &CancellationToken,
		req: UploadRequest,
		body: BodyStream,
	) -> Result<(), Error> {
		if req.content_length <= 0 {
			return Err(Error::bad_request("content length must be positive"));
		}

		let file = File::new(req.bucket.clone(), req.key.clone());
		let fv = self.meta.new_version(token, &file, req.content_type.clone()).await?;
		let version_ref = VersionRef { version: fv.version };

		let outcome = self.upload_parts(token, &req, &file, version_ref, body).await;

		let final_status = if outcome.is_ok() { Status::Ready } else { Status::Error };
		let status_outcome = self.meta.update_status(token, &file, version_ref, final_status).await;

		match (outcome, status_outcome) {
			(Ok(()), Ok(())) => {
				debug!(bucket = %req.bucket, key = %req.key, version = fv.version, "file uploaded");
				Ok(())
			}
			(Ok(()), Err(status_err)) => Err(status_err),
			(Err(e), Ok(())) => Err(e),
			(Err(e), Err(status_err)) => {
				Err(Error::internal(format!("{e} (also failed to finalize status: {status_err})")))
			}
		}
	}

	async fn upload_parts(
		&self,
		token: &CancellationToken,
		req: &UploadRequest,
		file: &File,
		version_ref: VersionRef,
		body: BodyStream,
	) -> Result<(), Error> {
		let plan: Plan = self.planner.plan(req.content_length);
		if plan.servers.is_empty() {
			return Err(Error::bad_request("empty upload"));
		}

		// The plan only fixes a nominal part_size and count; whatever that
		// doesn't evenly divide is absorbed by the first part rather than
		// the last.
		let total_parts = plan.servers.len() as i64;
		let diff = req.content_length - plan.part_size * total_parts;
		let first_part_size = plan.part_size + diff;

		let mut reader = BodyReader::new(body);

		for (index, &server) in plan.servers.iter().enumerate() {
			cancel::check(token)?;

			let size = if index == 0 { first_part_size } else { plan.part_size };

			upload_part(&self.registry, &mut reader, file, fv_version(version_ref), index, server, size)
				.await?;

			self.meta
				.new_part(token, file, version_ref, Part { index, servers: vec![server] })
				.await?;

			debug!(part = index, size, server, "part uploaded");
		}

		Ok(())
	}
}

fn fv_version(v: VersionRef) -> usize {
	v.version
}

#[allow(clippy::too_many_arguments)]
async fn upload_part(
	registry: &objectstore_distributor::Registry,
	body: &mut BodyReader,
	file: &File,
	version: usize,
	part: usize,
	server: usize,
	size: i64,
) -> Result<(), Error> {
	let mut client: PartServerClient<_> = registry.client(server)?;

	let (tx, rx) = mpsc::channel::<UploadChunk>(UPLOAD_CHANNEL_DEPTH);
	let call = tokio::spawn(async move { client.upload(ReceiverStream::new(rx)).await });

	let mut sent: i64 = 0;
	let mut first = true;
	while sent < size {
		let want = usize::try_from(std::cmp::min(UPLOAD_CHUNK_SIZE as i64, size - sent))
			.map_err(|_| Error::internal("part size overflowed usize"))?;
		let chunk = body.next_chunk(want).await?;
		if chunk.is_empty() {
			return Err(Error::bad_request("request body ended before part was fully read"));
		}

		let msg = UploadChunk {
			chunk: chunk.to_vec(),
			bucket: if first { file.bucket.clone() } else { String::new() },
			key: if first { file.key.clone() } else { String::new() },
			version: if first { version as i32 } else { 0 },
			part: if first { part as i32 } else { 0 },
			size: if first { size as i32 } else { 0 },
		};
		first = false;
		sent += chunk.len() as i64;

		tx.send(msg).await.map_err(|_| Error::internal("part server closed the upload stream"))?;
	}
	drop(tx);

	call.await.map_err(|_| Error::internal("upload task panicked"))??;
	Ok(())
}
