use std::path::PathBuf;

use serde::Deserialize;

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	3900
}

fn default_max_connections() -> usize {
	1000
}

fn default_max_body_size() -> u64 {
	1024 * 1024 * 1024
}

fn default_chunk_size() -> usize {
	8 * 1024
}

fn default_min_part_size() -> i64 {
	8 * 1024
}

fn default_max_parts() -> usize {
	6
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,

	pub meta_path: PathBuf,

	/// Part-server addresses and their matching placement weights. Must be
	/// the same length.
	pub part_server_endpoints: Vec<String>,
	pub part_server_weights: Vec<u32>,

	#[serde(default = "default_max_connections")]
	pub max_connections: usize,
	#[serde(default = "default_max_body_size")]
	pub max_body_size: u64,
	#[serde(default = "default_chunk_size")]
	pub chunk_size: usize,
	#[serde(default = "default_min_part_size")]
	pub min_part_size: i64,
	#[serde(default = "default_max_parts")]
	pub max_parts: usize,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn required_fields_with_defaults_filled_in() {
		let config: Config = toml::from_str(
			r#"
			meta_path = "/var/lib/objectstore/meta.json"
			part_server_endpoints = ["10.0.0.1:9000", "10.0.0.2:9000"]
			part_server_weights = [1, 1]
			"#,
		)
		.unwrap();
		assert_eq!(config.host, "0.0.0.0");
		assert_eq!(config.port, 3900);
		assert_eq!(config.chunk_size, 8192);
		assert_eq!(config.part_server_endpoints.len(), 2);
	}

	#[test]
	fn overrides_take_precedence_over_defaults() {
		let config: Config = toml::from_str(
			r#"
			host = "127.0.0.1"
			port = 8080
			meta_path = "meta.json"
			part_server_endpoints = ["a:1"]
			part_server_weights = [1]
			chunk_size = 4096
			"#,
		)
		.unwrap();
		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.port, 8080);
		assert_eq!(config.chunk_size, 4096);
	}
}
