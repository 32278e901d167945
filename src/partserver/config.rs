use std::path::PathBuf;

use serde::Deserialize;

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	9000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,

	/// Root directory parts are written under:
	/// `{dir}/{bucket}/{key}/{version}/{part}.bin`.
	pub dir: PathBuf,
}
