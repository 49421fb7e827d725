use clap::Parser;

use notebooklm_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	notebooklm_mcp::run(args).await
}
