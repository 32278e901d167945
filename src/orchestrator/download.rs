//! Download pipeline: resolve the current ready version, then fan the
//! parts in as a single byte stream, opening each part's RPC lazily and
//! moving to the next part as soon as the current one reports EOF.
use async_stream::try_stream;
use bytes::Bytes;
use futures::Stream;
use rand::seq::SliceRandom;

use objectstore_meta::File;
use objectstore_proto::part_server_client::PartServerClient;
use objectstore_proto::DownloadRequest as RpcDownloadRequest;
use objectstore_util::cancel::{self, CancellationToken};
use objectstore_util::error::Error;
use tonic::transport::Channel;

use crate::types::DownloadRequest;
use crate::Orchestrator;

pub type DownloadStream = std::pin::Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

impl Orchestrator {
	/// Returns the object's content type and a lazily-driven byte stream of
	/// its parts, in order. Nothing is read from any part server until the
	/// stream is polled.
	pub async fn download(
		&self,
		token: &CancellationToken,
		req: DownloadRequest,
	) -> Result<(String, DownloadStream), Error> {
		let file = File::new(req.bucket, req.key);
		let fv = self.meta.get_version(token, &file).await?;
		if fv.parts.is_empty() {
			return Err(Error::not_found("file has no parts"));
		}

		let mut clients = Vec::with_capacity(fv.parts.len());
		for part in &fv.parts {
			if part.servers.is_empty() {
				return Err(Error::internal("failed to locate part server"));
			}
			let server = *part
				.servers
				.choose(&mut rand::thread_rng())
				.expect("non-empty servers list");
			clients.push(self.registry.client(server)?);
		}

		let stream = part_stream(clients, file, fv.version, token.clone());
		Ok((fv.content_type, stream))
	}
}

fn part_stream(
	clients: Vec<PartServerClient<Channel>>,
	file: File,
	version: usize,
	token: CancellationToken,
) -> DownloadStream {
	let stream = try_stream! {
		for (part, mut client) in clients.into_iter().enumerate() {
			cancel::check(&token)?;

			let rpc_req = RpcDownloadRequest {
				bucket: file.bucket.clone(),
				key: file.key.clone(),
				version: version as i32,
				part: part as i32,
			};
			let mut inbound = client.download(rpc_req).await?.into_inner();

			while let Some(chunk) = inbound.message().await? {
				cancel::check(&token)?;
				yield Bytes::from(chunk.chunk);
			}
			debug!(part, "part downloaded");
		}
	};
	Box::pin(stream)
}
