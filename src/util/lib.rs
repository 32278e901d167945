//! Shared plumbing for the object store's gateway and part-server binaries:
//! the crate-wide error taxonomy, config-file loading, logging setup and
//! signal-driven shutdown.
#[macro_use]
extern crate tracing;

pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use cancel::CancellationToken;
pub use error::{Error, ErrorKind, Result};
