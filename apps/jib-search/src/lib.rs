pub mod snapshot;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use jib_service::{JibService, SearchMode, SearchRequest};

#[derive(Debug, Parser)]
#[command(
	version = jib_cli::VERSION,
	rename_all = "kebab",
	styles = jib_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Catalog snapshot JSON produced by the catalog loader.
	#[arg(long, short = 's', value_name = "FILE")]
	pub catalog: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Filtered search plus the unfiltered safety net.
	Search(SearchArgs),
	/// Unfiltered results in catalog placement order.
	Browse(BrowseArgs),
}

#[derive(Debug, clap::Args)]
pub struct SearchArgs {
	pub query: String,
	#[arg(long, value_enum, default_value_t = Mode::Context)]
	pub mode: Mode,
	#[arg(long, value_name = "ADDRESS")]
	pub area: Option<String>,
	#[arg(long, value_name = "KM")]
	pub radius_km: Option<f64>,
	#[arg(long, value_name = "NAME")]
	pub category: Option<String>,
}
impl SearchArgs {
	pub fn into_request(self) -> SearchRequest {
		SearchRequest {
			query: self.query,
			area: self.area,
			radius_km: self.radius_km,
			category: self.category,
			mode: self.mode.into(),
		}
	}
}

#[derive(Debug, clap::Args)]
pub struct BrowseArgs {
	pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
	Context,
	Lookup,
}
impl From<Mode> for SearchMode {
	fn from(mode: Mode) -> Self {
		match mode {
			Mode::Context => Self::Context,
			Mode::Lookup => Self::Lookup,
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = jib_config::load(&args.config)?;
	init_tracing(&config)?;
	let catalog = snapshot::load(&args.catalog)?;
	let service = JibService::new(config, catalog)?;
	let output = execute(&service, args.command).await?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

/// Runs one command against `service` and returns the JSON response.
pub async fn execute(service: &JibService, command: Command) -> color_eyre::Result<Value> {
	let output = match command {
		Command::Search(search) => {
			let res = service.search(search.into_request()).await?;

			serde_json::to_value(res)?
		},
		Command::Browse(browse) => serde_json::to_value(service.browse(&browse.query).await?)?,
	};

	Ok(output)
}

fn init_tracing(config: &jib_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
