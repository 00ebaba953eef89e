use anyhow::Result;
use clap::Parser;
use shape_text_data::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shape_text_data=info".parse()?),
        )
        .init();

    Cli::parse().run()
}
