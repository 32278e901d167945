//! Generic TOML configuration file loading, shared by the gateway and
//! part-server binaries. Each binary defines its own `Config` struct and
//! hands it to [`read_config`].
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Read and parse a TOML configuration file.
pub fn read_config<T: DeserializeOwned>(config_file: impl AsRef<Path>) -> Result<T, Error> {
	let mut file = std::fs::OpenOptions::new().read(true).open(config_file.as_ref())?;

	let mut config = String::new();
	file.read_to_string(&mut config)?;

	Ok(toml::from_str(&config)?)
}
