use std::path::PathBuf;

use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "objectstore-gateway")]
pub enum Command {
	/// Run the HTTP gateway
	#[structopt(name = "server")]
	Server(ServerOpt),
}

#[derive(StructOpt, Debug)]
pub struct ServerOpt {
	/// Configuration file
	#[structopt(short = "c", long = "config", default_value = "./gateway.toml")]
	pub config_file: PathBuf,
}
