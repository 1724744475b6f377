//! GTP Master Binary
//!
//! Accepts slave connections, multiplexes GTP commands across them, and
//! drives the whole thing from stdin/stdout.

mod cli;
mod driver;

use clap::Parser;
use gtp_coordination::{Coordinator, Engine};
use gtp_core::Config;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    gtp_core::logging::init(args.verbose);
    gtp_core::logging::install_ctrlc_handler();

    let config = Config::parse(&args.options)?;
    log::info!("starting with {config:?}");

    let engine = Engine::new(config.max_slaves);
    let coordinator = Coordinator::new(engine.clone(), &config);

    let slave_task = tokio::spawn(gtp_slavenet::serve_slaves(
        config.slave_port,
        config.max_slaves,
        engine.clone(),
    ));

    if let Some(proxy_port) = config.proxy_port {
        tokio::spawn(gtp_slavenet::serve_log_proxy(proxy_port));
    }

    let move_budget = Duration::from_secs(args.move_seconds);
    tokio::select! {
        result = driver::run(coordinator, move_budget) => result,
        result = slave_task => result.map_err(anyhow::Error::from).and_then(|inner| inner),
    }
}
