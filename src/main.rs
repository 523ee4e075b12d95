use agent_quartet::{cli, workflow::launch};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env中的API KEY在任何配置读取之前加载
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(args.verbose)
        .init();

    let config = args.into_config()?;
    let input = args.pipeline_input(&config);

    launch(&config, &input).await?;
    Ok(())
}
