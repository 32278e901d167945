//! Cancellation token plumbing threaded through every metadata call and RPC.
pub use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// The first thing every cancellable operation does: check the token before
/// doing any other work.
pub fn check(token: &CancellationToken) -> Result<(), Error> {
	if token.is_cancelled() {
		Err(Error::Cancelled)
	} else {
		Ok(())
	}
}
