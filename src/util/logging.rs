//! Process-wide `tracing` subscriber setup. Called exactly once, at the very
//! start of each binary's `main`.
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
