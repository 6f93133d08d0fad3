use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = jib_search::Args::parse();
	jib_search::run(args).await
}
