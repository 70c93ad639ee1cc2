use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobsmulti::aggregator::{Aggregator, SearchOptions};
use jobsmulti::config::{Command, Config, ProvidersFile, SearchArgs};
use jobsmulti::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries search output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobsmulti=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    tracing::info!("Loading providers from {}", config.providers.display());
    let file = ProvidersFile::load(&config.providers)?;
    let aggregator = Aggregator::from_file(&file, Duration::from_secs(config.timeout_secs))?;
    tracing::info!(
        "Configured providers: {}",
        aggregator.provider_ids().collect::<Vec<_>>().join(", ")
    );

    match config.resolved_command() {
        Command::Serve { listen_addr } => serve(aggregator, &listen_addr).await,
        Command::Search(args) => search(aggregator, args).await,
        Command::Providers => {
            let summaries = aggregator.describe_providers()?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            Ok(())
        }
    }
}

async fn serve(aggregator: Aggregator, listen_addr: &str) -> anyhow::Result<()> {
    let app = routes::router(Arc::new(aggregator));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("Listening on {listen_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting gracefully");
        })
        .await?;

    Ok(())
}

async fn search(mut aggregator: Aggregator, args: SearchArgs) -> anyhow::Result<()> {
    if let Some(keyword) = &args.keyword {
        aggregator.set_keyword(keyword);
    }
    if let Some(location) = &args.location {
        aggregator.set_location(location)?;
    }
    aggregator.set_page(args.page, args.per_page)?;

    let options = SearchOptions {
        max_age: args.max_age,
        max_results: args.max_results,
        order_by: Some(args.order_by),
        order: args.order.parse()?,
    };

    let results = match &args.provider {
        Some(provider) => {
            aggregator
                .search_one(provider, aggregator.criteria(), &options)
                .await?
        }
        None => aggregator.all_jobs(&options).await?,
    };

    for error in results.errors() {
        tracing::warn!("{error}");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
