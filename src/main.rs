use anyhow::Result;
use clap::Parser;
use fedeval::cli::{run, Args};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse(), &mut std::io::stdout().lock())
}
