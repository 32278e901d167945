//! Buffers an incoming chunk stream so the upload pipeline can carve it into
//! exact part sizes regardless of how the transport happened to frame it.
use bytes::Bytes;
use futures::StreamExt;

use objectstore_util::error::Error;

use crate::types::BodyStream;

pub struct BodyReader {
	inner: BodyStream,
	buf: Bytes,
}

impl BodyReader {
	pub fn new(inner: BodyStream) -> Self {
		Self { inner, buf: Bytes::new() }
	}

	/// Returns up to `max` bytes pulled from the stream. An empty result
	/// means the stream is exhausted; anything shorter than `max` otherwise
	/// is just how the transport happened to frame it, not EOF.
	pub async fn next_chunk(&mut self, max: usize) -> Result<Bytes, Error> {
		if max == 0 {
			return Ok(Bytes::new());
		}
		if self.buf.is_empty() {
			match self.inner.next().await {
				Some(Ok(bytes)) => self.buf = bytes,
				Some(Err(e)) => return Err(e),
				None => return Ok(Bytes::new()),
			}
		}
		let n = self.buf.len().min(max);
		Ok(self.buf.split_to(n))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::stream;

	fn reader_of(chunks: Vec<&'static str>) -> BodyReader {
		let items: Vec<Result<Bytes, Error>> =
			chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
		BodyReader::new(Box::pin(stream::iter(items)))
	}

	#[tokio::test]
	async fn splits_a_single_chunk_across_reads() {
		let mut r = reader_of(vec!["hello world"]);
		assert_eq!(r.next_chunk(5).await.unwrap(), Bytes::from("hello"));
		assert_eq!(r.next_chunk(6).await.unwrap(), Bytes::from(" world"));
		assert_eq!(r.next_chunk(5).await.unwrap(), Bytes::new());
	}

	#[tokio::test]
	async fn coalesces_reads_smaller_than_incoming_frames() {
		let mut r = reader_of(vec!["ab", "cd", "ef"]);
		assert_eq!(r.next_chunk(1).await.unwrap(), Bytes::from("a"));
		assert_eq!(r.next_chunk(4).await.unwrap(), Bytes::from("b"));
		assert_eq!(r.next_chunk(4).await.unwrap(), Bytes::from("cd"));
		assert_eq!(r.next_chunk(4).await.unwrap(), Bytes::from("ef"));
		assert_eq!(r.next_chunk(4).await.unwrap(), Bytes::new());
	}
}
