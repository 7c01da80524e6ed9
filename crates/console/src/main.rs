//! Campus configuration console.
//!
//! Inspects the on-disk configuration cache the admin console renders from,
//! and runs a scripted session against a simulated backend.

mod cli;
mod commands;
mod config;
mod demo;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use config::EngineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = match cli.config.or_else(EngineConfig::default_path) {
		Some(path) => EngineConfig::load(&path)?,
		None => EngineConfig::default(),
	};

	match cli.command {
		Command::List => commands::list(&commands::open_registry(&config)?),
		Command::Show { name } => commands::show(&commands::open_registry(&config)?, &name),
		Command::Clear { name } => commands::clear(&commands::open_registry(&config)?, &name),
		Command::Demo { poll_ticks } => demo::run(&config, poll_ticks).await.context("demo session failed"),
	}
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("campus=debug,info")
			} else {
				EnvFilter::new("campus=info,warn")
			}
		})
	};

	// CAMPUS_LOG_DIR keeps stdout clean for scripted runs
	if let Some(log_dir) = std::env::var("CAMPUS_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("campus.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "campus tracing initialized");
			return;
		}
	}

	tracing_subscriber::registry()
		.with(filter())
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}
