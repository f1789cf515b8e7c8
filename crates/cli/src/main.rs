mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use t411_core::{
    handle_db_cleanup, load_config, validate_config, CategoryRef, FriendlySearchQuery,
    SanitizedConfig, SqliteTaxonomyStore, T411Proxy, T411RestClient, TAXONOMY_SCHEMA_VERSION,
};

#[derive(Parser)]
#[command(name = "t411")]
#[command(version)]
#[command(about = "Search T411 with a local cache of its categories and terms")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, short, global = true, env = "T411_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// T411 account name (overrides the configuration)
    #[arg(long, global = true)]
    username: Option<String>,

    /// T411 account password (overrides the configuration)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download categories and terms from T411 into the local cache
    Sync,

    /// List cached root categories and their sub-categories
    Categories,

    /// List the term types and terms usable with a category
    Terms {
        /// Category name
        #[arg(long, conflicts_with = "category_id", required_unless_present = "category_id")]
        category: Option<String>,

        /// Category id
        #[arg(long)]
        category_id: Option<i64>,
    },

    /// Search torrents
    Search {
        /// Free-text expression
        expression: String,

        /// Category name
        #[arg(long)]
        category: Option<String>,

        /// Term name, repeatable (needs --category)
        #[arg(long = "term")]
        terms: Vec<String>,

        /// Number of results (default from configuration)
        #[arg(long)]
        max_results: Option<u32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop every cached category, term type and term
    Cleanup,

    /// Print the effective configuration (password redacted)
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr, stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Some(username) = cli.username {
        config.api.username = username;
    }
    if let Some(password) = cli.password {
        config.api.password = password;
    }

    validate_config(&config).context("Configuration validation failed")?;

    if let Command::Config = cli.command {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
        return Ok(());
    }

    let store = Arc::new(
        SqliteTaxonomyStore::new(&config.database.path, TAXONOMY_SCHEMA_VERSION)
            .context("Failed to open taxonomy cache")?,
    );
    info!("Taxonomy cache: {:?}", config.database.path);

    if let Command::Cleanup = cli.command {
        let stats = handle_db_cleanup(store.as_ref()).context("Failed to purge taxonomy cache")?;
        println!(
            "Removed {} categories and {} term types",
            stats.categories, stats.term_types
        );
        return Ok(());
    }

    if !config.api.has_credentials() {
        warn!("No T411 credentials configured; authentication will be rejected");
    }

    let client = T411RestClient::new(&config.api).context("Failed to create T411 client")?;
    let proxy = T411Proxy::new(Arc::new(client), store);

    match cli.command {
        Command::Sync => {
            let summary = proxy.synchronize_taxonomy().await?;
            println!(
                "{} categories ({} root), {} term types, {} links",
                summary.categories,
                summary.root_categories,
                summary.term_types,
                summary.associations
            );
        }
        Command::Categories => {
            let tree = proxy.category_tree().await?;
            if tree.is_empty() {
                warn!("Taxonomy cache is empty, run `t411 sync` first");
            }
            output::print_categories(&tree);
        }
        Command::Terms {
            category,
            category_id,
        } => {
            let category = match (category_id, category) {
                (Some(id), _) => CategoryRef::Id(id),
                (None, Some(name)) => CategoryRef::Name(name),
                (None, None) => anyhow::bail!("--category or --category-id is required"),
            };
            let (category, term_types) = proxy.term_types_for_category(&category).await?;
            output::print_terms(&category, &term_types);
        }
        Command::Search {
            expression,
            category,
            terms,
            max_results,
            json,
        } => {
            if !proxy.has_cached_taxonomy().await? {
                info!("Taxonomy cache is empty, synchronizing first");
                proxy.synchronize_taxonomy().await?;
            }

            let query = FriendlySearchQuery {
                expression: Some(expression),
                category_name: category,
                term_names: terms,
                max_results: Some(max_results.unwrap_or(config.search.max_results)),
            };
            let entries = proxy.search(&query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_entries(&entries);
            }
        }
        Command::Cleanup | Command::Config => {}
    }

    Ok(())
}
