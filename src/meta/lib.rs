//! The versioned object metadata store: file identity, version lifecycle,
//! and the mutex-protected directory that holds them.
#[macro_use]
extern crate tracing;

pub mod store;
pub mod types;

pub use store::Meta;
pub use types::{can_change_status, File, FileVersion, Part, Status, VersionRef};
