//! Coalesce CLI - Main entry point

mod commands;
mod rpc;

use clap::{Parser, Subcommand};
use coalesce_foundation::ServiceConfig;
use coalesce_service::AppContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Coalesce - compute-once, serve-many digest service
#[derive(Parser, Debug)]
#[command(name = "coalesce")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Maximum concurrently processing items
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Simulated processing delay in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Maximum cached digests
    #[arg(long, global = true)]
    cache_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit texts concurrently and print one JSON result per line
    Process {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Serve newline-delimited JSON-RPC 2.0 on stdin/stdout
    Serve,
    /// Fire identical submissions at once and report queue statistics
    Bench {
        #[arg(short, long, default_value = "hello world")]
        text: String,
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,
    },
}

impl Args {
    /// Defaults, file and environment first; flags win
    fn service_config(&self) -> coalesce_foundation::Result<ServiceConfig> {
        let mut config = ServiceConfig::load(self.config.as_deref())?;
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(delay_ms) = self.delay_ms {
            config = config.with_delay_ms(delay_ms);
        }
        if let Some(size) = self.cache_size {
            config = config.with_cache_max_size(size);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.service_config()?;

    // Initialize logging; stdout belongs to command output
    let log_level = if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let ctx = Arc::new(AppContext::new(config)?);

    match args.command {
        Command::Process { texts } => commands::process(&ctx, &texts).await,
        Command::Serve => rpc::serve(ctx).await,
        Command::Bench { text, count } => commands::bench(&ctx, &text, count).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "coalesce",
            "--concurrency",
            "4",
            "--delay-ms",
            "25",
            "--cache-size",
            "8",
            "bench",
        ]);
        let config = args.service_config().unwrap();

        assert_eq!(config.queue_concurrency, 4);
        assert_eq!(config.processing_delay_ms, 25);
        assert_eq!(config.cache_max_size, 8);
        assert!(matches!(
            args.command,
            Command::Bench { ref text, count: 100 } if text == "hello world"
        ));
    }

    #[test]
    fn test_process_requires_text() {
        assert!(Args::try_parse_from(["coalesce", "process"]).is_err());
        let args = Args::try_parse_from(["coalesce", "process", "a", "b"]).unwrap();
        assert!(matches!(args.command, Command::Process { ref texts } if texts.len() == 2));
    }
}
