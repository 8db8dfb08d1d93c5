use anyhow::Context;
use clap::{Parser, Subcommand};
use news_aggregator::api::{create_router, AppState};
use news_aggregator::{NewsConfig, NewsFilters, NewsService, ServerConfig};
use serde_json::json;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-aggregator", about = "Aggregates financial news feeds per market")]
struct Cli {
    /// JSON file overriding the built-in sources and lookup tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<String>,
    },
    /// Run one query and print the result
    Query {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn load_news_config(path: Option<&PathBuf>) -> anyhow::Result<NewsConfig> {
    match path {
        Some(path) => NewsConfig::from_file(path)
            .with_context(|| format!("loading news config from {}", path.display())),
        None => Ok(NewsConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => {
            let mut server_config = ServerConfig::load()?;
            if host.is_some() || port.is_some() {
                let addr = server_config.server_addr;
                server_config = ServerConfig::from_parts(
                    &host.unwrap_or_else(|| addr.ip().to_string()),
                    &port.unwrap_or_else(|| addr.port().to_string()),
                    server_config.news_config,
                )?;
            }

            let config_path = cli.config.or(server_config.news_config.clone());
            let news_config = load_news_config(config_path.as_ref())?;
            let service = NewsService::with_http(news_config)?;

            let app = create_router(AppState { service });
            let listener = TcpListener::bind(server_config.server_addr).await?;

            info!("Listening on {}", server_config.server_addr);
            axum::serve(listener, app).await?;
        }
        Command::Query {
            country,
            sector,
            company,
            limit,
        } => {
            let news_config = load_news_config(cli.config.as_ref())?;
            let service = NewsService::with_http(news_config)?;

            let filters = NewsFilters {
                country,
                sector,
                company,
                limit,
            };
            let news = service.query(&filters).await;

            let failures = service.aggregator().diagnostics().len();
            if failures > 0 {
                info!("{} sources failed during this query", failures);
            }

            let body = json!({ "success": true, "count": news.len(), "data": news });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
