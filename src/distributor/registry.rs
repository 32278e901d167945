//! Holds a stable, index-addressable pool of part-server RPC clients.
use tonic::transport::{Channel, Endpoint};

use objectstore_proto::part_server_client::PartServerClient;
use objectstore_util::error::{Error, OkOrNotFound};

/// A fixed pool of gRPC clients, one per configured part-server endpoint.
/// Indices are stable for the lifetime of the registry and match the
/// indices recorded in a `Part`'s `servers` list.
#[derive(Debug)]
pub struct Registry {
	clients: Vec<PartServerClient<Channel>>,
}

impl Registry {
	/// Builds one lazily-connecting channel per endpoint. A part server that
	/// is briefly unreachable at startup does not block construction; the
	/// first real RPC against it will surface the connection error.
	pub fn new(endpoints: &[String], weights: &[u32]) -> Result<Self, Error> {
		if endpoints.is_empty() {
			return Err(Error::bad_request("no endpoints provided"));
		}
		if endpoints.len() != weights.len() {
			return Err(Error::bad_request("invalid weights: length mismatch with endpoints"));
		}

		let clients = endpoints
			.iter()
			.map(|addr| {
				let uri = if addr.contains("://") {
					addr.clone()
				} else {
					format!("http://{addr}")
				};
				let endpoint = Endpoint::from_shared(uri)?;
				Ok(PartServerClient::new(endpoint.connect_lazy()))
			})
			.collect::<Result<Vec<_>, Error>>()?;

		info!("registered {} part server(s)", clients.len());
		Ok(Self { clients })
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	/// Looks up a client by its stable index. Fails `not_found` if out of range.
	pub fn client(&self, index: usize) -> Result<PartServerClient<Channel>, Error> {
		self.clients.get(index).cloned().ok_or_not_found(format!("part server {index} not found"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_empty_endpoints() {
		let err = Registry::new(&[], &[]).unwrap_err();
		assert_eq!(err.kind(), objectstore_util::ErrorKind::BadRequest);
	}

	#[test]
	fn rejects_mismatched_weights() {
		let endpoints = vec!["localhost:5555".to_string(), "localhost:5556".to_string()];
		let weights = vec![1u32];
		let err = Registry::new(&endpoints, &weights).unwrap_err();
		assert_eq!(err.kind(), objectstore_util::ErrorKind::BadRequest);
	}

	#[tokio::test]
	async fn builds_one_client_per_endpoint() {
		let endpoints = vec!["localhost:5555".to_string(), "localhost:5556".to_string()];
		let weights = vec![1u32, 2u32];
		let registry = Registry::new(&endpoints, &weights).unwrap();
		assert_eq!(registry.len(), 2);
		assert!(registry.client(0).is_ok());
		assert!(registry.client(1).is_ok());
	}

	#[tokio::test]
	async fn out_of_range_index_is_not_found() {
		let endpoints = vec!["localhost:5555".to_string()];
		let weights = vec![1u32];
		let registry = Registry::new(&endpoints, &weights).unwrap();
		let err = registry.client(5).unwrap_err();
		assert_eq!(err.kind(), objectstore_util::ErrorKind::NotFound);
	}
}
