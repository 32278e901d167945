use std::path::PathBuf;

use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "objectstore-partserver")]
pub enum Command {
	/// Run the part server
	#[structopt(name = "server")]
	Server(ServerOpt),
}

#[derive(StructOpt, Debug)]
pub struct ServerOpt {
	/// Configuration file
	#[structopt(short = "c", long = "config", default_value = "./partserver.toml")]
	pub config_file: PathBuf,
}
