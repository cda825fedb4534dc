mod commands;
mod output;
mod services;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::ScrapeOptions;

#[derive(Debug, Parser)]
#[command(name = "trendscope")]
#[command(about = "Collect social-media posts for a topic and analyze their sentiment")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect posts for a query and save them to the raw file
    Scrape {
        query: String,

        /// Maximum microblog posts to keep (forum posts are added on top)
        #[arg(long, default_value_t = 300)]
        max_results: usize,

        /// Search the query once instead of expanding it into keywords
        #[arg(long)]
        no_keywords: bool,
    },
    /// Enrich a saved raw file and write the processed records and report
    Analyze {
        query: String,

        /// Raw file to read instead of the default for the query
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Scrape then analyze in one pass
    Run {
        query: String,

        #[arg(long, default_value_t = 300)]
        max_results: usize,

        #[arg(long)]
        no_keywords: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("trendscope: pass a subcommand (scrape, analyze, run); see --help");
        return Ok(());
    };

    let config = trendscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Scrape {
            query,
            max_results,
            no_keywords,
        } => {
            let options = ScrapeOptions {
                max_results,
                use_keywords: !no_keywords,
            };
            commands::run_scrape(&config, &query, &options).await?;
        }
        Commands::Analyze { query, input } => {
            commands::run_analyze(&config, &query, input.as_deref()).await?;
        }
        Commands::Run {
            query,
            max_results,
            no_keywords,
        } => {
            let options = ScrapeOptions {
                max_results,
                use_keywords: !no_keywords,
            };
            commands::run_all(&config, &query, &options).await?;
        }
    }

    Ok(())
}
