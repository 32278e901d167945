#[macro_use]
extern crate tracing;

mod cli;
mod config;
mod service;

use std::net::SocketAddr;

use structopt::StructOpt;
use tonic::transport::Server;

use objectstore_proto::part_server_server::PartServerServer;
use objectstore_util::config::read_config;
use objectstore_util::error::Error;
use objectstore_util::shutdown::{wait_from, watch_shutdown_signal};

use cli::{Command, ServerOpt};
use config::Config;
use service::PartServerImpl;

#[tokio::main]
async fn main() {
	objectstore_util::logging::init_tracing();

	let result = match Command::from_args() {
		Command::Server(opt) => run_server(opt).await,
	};

	if let Err(e) = result {
		error!("fatal error: {}", e);
		std::process::exit(1);
	}
}

async fn run_server(opt: ServerOpt) -> Result<(), Error> {
	info!("Loading configuration...");
	let config: Config = read_config(&opt.config_file)?;

	tokio::fs::create_dir_all(&config.dir).await?;

	let addr: SocketAddr = format!("{}:{}", config.host, config.port)
		.parse()
		.map_err(|e| Error::bad_request(format!("invalid bind address: {e}")))?;

	info!("Serving parts out of {:?} on {}...", config.dir, addr);
	let watch_cancel = watch_shutdown_signal();

	Server::builder()
		.add_service(PartServerServer::new(PartServerImpl::new(config.dir)))
		.serve_with_shutdown(addr, wait_from(watch_cancel))
		.await
		.map_err(Error::from)?;

	info!("Shutdown complete.");
	Ok(())
}
