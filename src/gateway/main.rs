#[macro_use]
extern crate tracing;

mod cli;
mod config;
mod http;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use structopt::StructOpt;

use objectstore_distributor::{Planner, Registry};
use objectstore_meta::Meta;
use objectstore_orchestrator::Orchestrator;
use objectstore_util::config::read_config;
use objectstore_util::error::Error;
use objectstore_util::shutdown::{wait_from, watch_shutdown_signal};

use cli::{Command, ServerOpt};
use config::Config;
use http::Handler;

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

	info!("Opening metadata store at {:?}...", config.meta_path);
	let meta = Arc::new(Meta::open(&config.meta_path).await?);

	info!("Connecting to {} part server(s)...", config.part_server_endpoints.len());
	let registry = Arc::new(Registry::new(&config.part_server_endpoints, &config.part_server_weights)?);
	let planner = Arc::new(Planner::new(config.max_parts, config.min_part_size, config.part_server_weights.clone())?);

	let orchestrator = Arc::new(Orchestrator::new(meta.clone(), registry, planner));
	let handler = Arc::new(Handler {
		orchestrator,
		chunk_size: config.chunk_size,
		max_body_size: config.max_body_size,
		in_flight: tokio::sync::Semaphore::new(config.max_connections),
	});

	let addr: SocketAddr = format!("{}:{}", config.host, config.port)
		.parse()
		.map_err(|e| Error::bad_request(format!("invalid bind address: {e}")))?;

	let make_svc = make_service_fn(move |_conn| {
		let handler = handler.clone();
		async move {
			Ok::<_, Infallible>(service_fn(move |req| {
				let handler = handler.clone();
				async move { Ok::<_, Infallible>(handler.handle(req).await) }
			}))
		}
	});

	info!("Listening on {}...", addr);
	let watch_cancel = watch_shutdown_signal();
	let server = Server::bind(&addr)
		.serve(make_svc)
		.with_graceful_shutdown(wait_from(watch_cancel));

	if let Err(e) = server.await {
		error!("HTTP server error: {}", e);
	}

	info!("Closing metadata store...");
	meta.close().await?;

	info!("Shutdown complete.");
	Ok(())
}
