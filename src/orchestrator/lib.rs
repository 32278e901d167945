//! Ties the metadata store, part client registry and placement planner
//! together into the two pipelines the gateway drives: upload and download.
#[macro_use]
extern crate tracing;

use std::sync::Arc;

use objectstore_distributor::{Planner, Registry};
use objectstore_meta::Meta;

pub mod body_reader;
pub mod download;
pub mod types;
pub mod upload;

pub use download::DownloadStream;
pub use types::{BodyStream, DownloadRequest, UploadRequest};

pub struct Orchestrator {
	meta: Arc<Meta>,
	registry: Arc<Registry>,
	planner: Arc<Planner>,
}

impl Orchestrator {
	pub fn new(meta: Arc<Meta>, registry: Arc<Registry>, planner: Arc<Planner>) -> Self {
		Self { meta, registry, planner }
	}

	pub fn meta(&self) -> &Meta {
		&self.meta
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use futures::{stream, Stream, StreamExt};
	use objectstore_proto::part_server_server::{PartServer, PartServerServer};
	use objectstore_proto::{
		DownloadChunk, DownloadRequest as RpcDownloadRequest, UploadChunk, UploadResponse,
	};
	use objectstore_util::error::Error;
	use objectstore_util::CancellationToken;
	use std::collections::HashMap;
	use std::net::SocketAddr;
	use std::sync::Mutex;
	use tokio::net::TcpListener;
	use tokio_stream::wrappers::TcpListenerStream;
	use tonic::transport::Server;
	use tonic::{Request, Response, Status, Streaming};

	#[derive(Default)]
	struct FakePartServer {
		data: Mutex<HashMap<(String, String, i32, i32), Vec<u8>>>,
	}

	#[tonic::async_trait]
	impl PartServer for FakePartServer {
		async fn upload(
			&self,
			request: Request<Streaming<UploadChunk>>,
		) -> Result<Response<UploadResponse>, Status> {
			let mut stream = request.into_inner();
			let mut key: Option<(String, String, i32, i32)> = None;
			let mut buf = Vec::new();
			let mut first = true;
			while let Some(msg) = stream.message().await? {
				if first {
					key = Some((msg.bucket.clone(), msg.key.clone(), msg.version, msg.part));
					first = false;
				}
				buf.extend_from_slice(&msg.chunk);
			}
			if let Some(key) = key {
				self.data.lock().unwrap().insert(key, buf);
			}
			Ok(Response::new(UploadResponse {}))
		}

		type DownloadStream =
			std::pin::Pin<Box<dyn Stream<Item = Result<DownloadChunk, Status>> + Send + 'static>>;

		async fn download(
			&self,
			request: Request<RpcDownloadRequest>,
		) -> Result<Response<Self::DownloadStream>, Status> {
			let req = request.into_inner();
			let key = (req.bucket, req.key, req.version, req.part);
			let data = self
				.data
				.lock()
				.unwrap()
				.get(&key)
				.cloned()
				.ok_or_else(|| Status::not_found("no such part"))?;

			let chunks: Vec<Result<DownloadChunk, Status>> =
				data.chunks(4).map(|c| Ok(DownloadChunk { chunk: c.to_vec() })).collect();
			Ok(Response::new(Box::pin(stream::iter(chunks))))
		}
	}

	async fn spawn_fake_server() -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr: SocketAddr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			Server::builder()
				.add_service(PartServerServer::new(FakePartServer::default()))
				.serve_with_incoming(TcpListenerStream::new(listener))
				.await
				.unwrap();
		});
		format!("http://{addr}")
	}

	#[tokio::test]
	async fn upload_then_download_round_trips() {
		let endpoint = spawn_fake_server().await;
		let registry = Arc::new(Registry::new(&[endpoint], &[1]).unwrap());
		let planner = Arc::new(Planner::new(1, 1, vec![1]).unwrap());

		let dir = tempfile::tempdir().unwrap();
		let meta = Arc::new(Meta::open(dir.path().join("meta.json")).await.unwrap());

		let orch = Orchestrator::new(meta, registry, planner);
		let token = CancellationToken::new();

		let body: types::BodyStream =
			Box::pin(stream::iter(vec![Ok::<Bytes, Error>(Bytes::from("hello world"))]));

		orch.upload(
			&token,
			UploadRequest {
				bucket: "b".into(),
				key: "k".into(),
				content_type: "text/plain".into(),
				content_length: 11,
			},
			body,
		)
		.await
		.unwrap();

		let (content_type, mut stream) = orch
			.download(&token, DownloadRequest { bucket: "b".into(), key: "k".into() })
			.await
			.unwrap();
		assert_eq!(content_type, "text/plain");

		let mut collected = Vec::new();
		while let Some(chunk) = stream.next().await {
			collected.extend_from_slice(&chunk.unwrap());
		}
		assert_eq!(collected, b"hello world");
	}

	#[tokio::test]
	async fn upload_of_nonpositive_length_is_rejected() {
		let endpoint = spawn_fake_server().await;
		let registry = Arc::new(Registry::new(&[endpoint], &[1]).unwrap());
		let planner = Arc::new(Planner::new(1, 1, vec![1]).unwrap());
		let dir = tempfile::tempdir().unwrap();
		let meta = Arc::new(Meta::open(dir.path().join("meta.json")).await.unwrap());
		let orch = Orchestrator::new(meta, registry, planner);
		let token = CancellationToken::new();

		let body: types::BodyStream = Box::pin(stream::iter(Vec::<Result<Bytes, Error>>::new()));
		let err = orch
			.upload(
				&token,
				UploadRequest {
					bucket: "b".into(),
					key: "k".into(),
					content_type: "text/plain".into(),
					content_length: 0,
				},
				body,
			)
			.await
			.err()
			.unwrap();
		assert_eq!(err.kind(), objectstore_util::ErrorKind::BadRequest);
	}

	#[tokio::test]
	async fn download_of_missing_file_is_not_found() {
		let endpoint = spawn_fake_server().await;
		let registry = Arc::new(Registry::new(&[endpoint], &[1]).unwrap());
		let planner = Arc::new(Planner::new(1, 1, vec![1]).unwrap());
		let dir = tempfile::tempdir().unwrap();
		let meta = Arc::new(Meta::open(dir.path().join("meta.json")).await.unwrap());
		let orch = Orchestrator::new(meta, registry, planner);
		let token = CancellationToken::new();

		let err = orch
			.download(&token, DownloadRequest { bucket: "b".into(), key: "missing".into() })
			.await
			.err()
			.unwrap();
		assert_eq!(err.kind(), objectstore_util::ErrorKind::NotFound);
	}
}
