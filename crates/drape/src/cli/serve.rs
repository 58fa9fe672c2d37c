//! The `drape serve` command.

use clap::Args;
use drape_core::Config;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Vision: {} | LLM: {} ({})",
        config.vision.endpoint,
        config.llm.provider,
        config.llm.model
    );
    drape_core::serve(&config).await?;
    Ok(())
}
