use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // .env may provide CORPUS_PREP_* defaults
    let cli = cli::Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (the library logs through `log`)
    tracing_log::LogTracer::init()?;

    cli.run().await
}
