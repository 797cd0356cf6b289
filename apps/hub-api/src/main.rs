use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = hub_api::Args::parse();

	hub_api::run(args).await
}
