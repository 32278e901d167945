//! The two S3-style object routes plus a liveness probe, served over plain
//! `hyper`. No framework router: the path space is small enough that a
//! direct match reads better than a macro-driven dispatch table.
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use hyper::{Body, Method, Request, Response};

use tokio::sync::Semaphore;

use objectstore_orchestrator::{BodyStream, DownloadRequest, Orchestrator, UploadRequest};
use objectstore_util::cancel::CancellationToken;
use objectstore_util::error::{Error, OkOrBadRequest};

pub struct Handler {
	pub orchestrator: Arc<Orchestrator>,
	pub chunk_size: usize,
	pub max_body_size: u64,
	pub in_flight: Semaphore,
}

impl Handler {
	pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
		let _permit = match self.in_flight.acquire().await {
			Ok(permit) => permit,
			Err(_) => return make_response(Err(Error::internal("server is shutting down"))),
		};
		let token = CancellationToken::new();
		let result = self.dispatch(req, &token).await;
		make_response(result)
	}

	async fn dispatch(
		&self,
		req: Request<Body>,
		token: &CancellationToken,
	) -> Result<Response<Body>, Error> {
		let path = req.uri().path().to_string();

		if path == "/healthz" {
			return Ok(Response::new(Body::from("ok")));
		}

		let (bucket, key) = parse_object_path(&path)?;

		match *req.method() {
			Method::PUT => self.handle_upload(req, token, bucket, key).await,
			Method::GET => self.handle_download(token, bucket, key).await,
			_ => Err(Error::bad_request("unsupported method")),
		}
	}

	async fn handle_upload(
		&self,
		req: Request<Body>,
		token: &CancellationToken,
		bucket: String,
		key: String,
	) -> Result<Response<Body>, Error> {
		let content_length = req
			.headers()
			.get(hyper::header::CONTENT_LENGTH)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.parse::<i64>().ok())
			.ok_or_bad_request("missing or invalid content-length")?;

		if content_length as u64 > self.max_body_size {
			return Err(Error::bad_request("request body exceeds the configured maximum"));
		}

		let content_type = req
			.headers()
			.get(hyper::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.unwrap_or("text/plain")
			.to_string();

		let body: BodyStream = body_stream(req.into_body());

		self.orchestrator
			.upload(token, UploadRequest { bucket, key, content_type, content_length }, body)
			.await?;

		Ok(Response::new(Body::empty()))
	}

	async fn handle_download(
		&self,
		token: &CancellationToken,
		bucket: String,
		key: String,
	) -> Result<Response<Body>, Error> {
		let (content_type, stream) = self.orchestrator.download(token, DownloadRequest { bucket, key }).await?;

		let body = Body::wrap_stream(chunked(stream, self.chunk_size));

		Response::builder()
			.header(hyper::header::CONTENT_TYPE, content_type)
			.body(body)
			.map_err(|e| Error::internal(e.to_string()))
	}
}

fn body_stream(body: Body) -> BodyStream {
	Box::pin(body.map(|chunk| chunk.map_err(|e| Error::internal(e.to_string()))))
}

/// Re-buffers the download stream into fixed `chunk_size` frames so the
/// client observes delivery in uniform, flush-sized increments regardless
/// of how the part servers happened to frame their responses.
fn chunked(
	mut inner: objectstore_orchestrator::DownloadStream,
	chunk_size: usize,
) -> impl futures::Stream<Item = Result<Bytes, Error>> {
	async_stream::try_stream! {
		let mut buf = Vec::with_capacity(chunk_size);
		while let Some(piece) = inner.next().await {
			let piece = piece?;
			buf.extend_from_slice(&piece);
			while buf.len() >= chunk_size {
				let rest = buf.split_off(chunk_size);
				yield Bytes::from(std::mem::replace(&mut buf, rest));
			}
		}
		if !buf.is_empty() {
			yield Bytes::from(buf);
		}
	}
}

fn parse_object_path(path: &str) -> Result<(String, String), Error> {
	let trimmed = path.trim_start_matches('/');
	let mut parts = trimmed.splitn(2, '/');
	let bucket = parts.next().filter(|s| !s.is_empty());
	let key = parts.next().filter(|s| !s.is_empty());
	match (bucket, key) {
		(Some(bucket), Some(key)) => Ok((bucket.to_string(), key.to_string())),
		_ => Err(Error::bad_request("path must be /{bucket}/{key}")),
	}
}

fn make_response(result: Result<Response<Body>, Error>) -> Response<Body> {
	match result {
		Ok(resp) => resp,
		Err(e) => {
			match e.kind() {
				objectstore_util::ErrorKind::Internal | objectstore_util::ErrorKind::Cancelled => {
					error!("request failed: {}", e);
				}
				objectstore_util::ErrorKind::BadRequest | objectstore_util::ErrorKind::NotFound => {}
			}
			let mut resp = Response::new(Body::from(format!("{e}\n")));
			*resp.status_mut() = e.http_status_code();
			resp
		}
	}
}
