use std::path::PathBuf;

use campus_primitives::ConfigName;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "campus")]
#[command(about = "Inspect and exercise the school console configuration cache")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file (defaults to the platform config dir)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// List stored configuration names and their origin
	List,
	/// Print the stored value for a name, backfilled with defaults
	Show {
		/// Configuration name, e.g. theme or aboutSection:mission
		name: ConfigName,
	},
	/// Remove the stored value for a name
	Clear {
		/// Configuration name, e.g. theme or aboutSection:mission
		name: ConfigName,
	},
	/// Run an in-process session against a simulated backend
	Demo {
		/// Chart polling ticks to wait for before exiting
		#[arg(long, default_value_t = 0)]
		poll_ticks: u32,
	},
}
