use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reapcache::cache::config::{REAP_INTERVAL_ENV, TTL_ENV};
use reapcache::{CacheConfig, ReapingCache, Repl, ReplOutcome};

const PROMPT: &str = "reapcache > ";

#[derive(Parser)]
#[command(name = "reapcache")]
#[command(about = "Interactive TTL cache with background reaping", long_about = None)]
struct Cli {
    /// Time-to-live for every entry, in seconds
    #[arg(long, env = TTL_ENV)]
    ttl_secs: Option<String>,

    /// Reaping interval in seconds (defaults to the TTL)
    #[arg(long, env = REAP_INTERVAL_ENV)]
    reap_interval_secs: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Flags and their env fallbacks go through the same parsing as
    /// [`CacheConfig::from_env`], so errors name the variable.
    fn cache_config(&self) -> reapcache::Result<CacheConfig> {
        CacheConfig::from_lookup(|name| match name {
            TTL_ENV => self.ttl_secs.clone(),
            REAP_INTERVAL_ENV => self.reap_interval_secs.clone(),
            _ => None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.cache_config()?;
    info!(
        "Starting reapcache (ttl: {:?}, reap interval: {:?})",
        config.ttl, config.reap_interval
    );

    let cache = Arc::new(ReapingCache::with_config(config));
    let repl = Repl::new(cache.clone());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Welcome to reapcache! Type 'help' for available commands\n")
        .await?;

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = repl.execute(&line);
        let output = outcome.output();
        if !output.is_empty() {
            stdout.write_all(output.as_bytes()).await?;
            if !output.ends_with('\n') {
                stdout.write_all(b"\n").await?;
            }
        }

        if matches!(outcome, ReplOutcome::Exit(_)) {
            break;
        }
    }

    cache.shutdown().await;
    Ok(())
}
