//! The `PartServer` gRPC service: stores and serves opaque byte parts on
//! local disk. Knows nothing about buckets, versions or placement beyond
//! the identifying fields it's given on each call.
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tonic::{Request, Response, Status, Streaming};

use objectstore_proto::part_server_server::PartServer;
use objectstore_proto::{DownloadChunk, DownloadRequest, UploadChunk, UploadResponse};

const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

pub struct PartServerImpl {
	base_dir: PathBuf,
}

impl PartServerImpl {
	pub fn new(base_dir: PathBuf) -> Self {
		Self { base_dir }
	}

	fn part_path(&self, bucket: &str, key: &str, version: i32, part: i32) -> PathBuf {
		self.base_dir.join(bucket).join(key).join(version.to_string()).join(format!("{part}.bin"))
	}
}

#[tonic::async_trait]
impl PartServer for PartServerImpl {
	async fn upload(
		&self,
		request: Request<Streaming<UploadChunk>>,
	) -> Result<Response<UploadResponse>, Status> {
		let mut stream = request.into_inner();
		let mut file: Option<File> = None;

		while let Some(msg) = stream.message().await? {
			if file.is_none() {
				if msg.bucket.is_empty() || msg.key.is_empty() {
					return Err(Status::invalid_argument("first chunk must carry bucket and key"));
				}
				let path = self.part_path(&msg.bucket, &msg.key, msg.version, msg.part);
				debug!(path = %path.display(), "receiving part");
				file = Some(create_part_file(&path).await?);
			}

			if let Some(f) = file.as_mut() {
				f.write_all(&msg.chunk)
					.await
					.map_err(|e| Status::internal(format!("failed to write chunk: {e}")))?;
			}
		}

		Ok(Response::new(UploadResponse {}))
	}

	type DownloadStream =
		std::pin::Pin<Box<dyn futures::Stream<Item = Result<DownloadChunk, Status>> + Send + 'static>>;

	async fn download(
		&self,
		request: Request<DownloadRequest>,
	) -> Result<Response<Self::DownloadStream>, Status> {
		let req = request.into_inner();
		if req.bucket.is_empty() || req.key.is_empty() {
			return Err(Status::invalid_argument("bucket and key are required"));
		}

		let path = self.part_path(&req.bucket, &req.key, req.version, req.part);
		let mut file = File::open(&path)
			.await
			.map_err(|_| Status::not_found(format!("no such part: {}", path.display())))?;

		let stream = async_stream::stream! {
			let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
			loop {
				match file.read(&mut buf).await {
					Ok(0) => break,
					Ok(n) => yield Ok(DownloadChunk { chunk: buf[..n].to_vec() }),
					Err(e) => {
						yield Err(Status::internal(format!("failed to read chunk: {e}")));
						break;
					}
				}
			}
		};

		Ok(Response::new(Box::pin(stream)))
	}
}

async fn create_part_file(path: &Path) -> Result<File, Status> {
	if let Some(dir) = path.parent() {
		tokio::fs::create_dir_all(dir)
			.await
			.map_err(|e| Status::internal(format!("failed to create directory: {e}")))?;
	}
	File::create(path).await.map_err(|e| Status::internal(format!("failed to create file: {e}")))
}
