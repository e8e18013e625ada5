//! LinkScout main entry point
//!
//! This is the command-line interface for the LinkScout broken-link checker.

use chrono::Utc;
use clap::{Parser, Subcommand};
use linkscout::config::{load_config_with_hash, Config};
use linkscout::crawler::{CheckOptions, CheckType, LinkChecker};
use linkscout::output::{categorize, print_summary, write_markdown_report};
use linkscout::server::{self, ApiResponse, CheckMetadata, CheckResponseData, EffectiveOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// LinkScout: broken-link discovery for website audits
///
/// LinkScout finds the pages of a site (sitemaps, navigation, common paths),
/// checks every link on them and reports the broken ones by category.
#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(version)]
#[command(about = "Find broken links on a page or a whole site", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides [server] bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Check a page, a site or a single URL
    Check {
        /// URL to check
        url: String,

        /// What to check
        #[arg(long = "type", value_enum, default_value_t = CheckType::Page)]
        check_type: CheckType,

        /// Maximum number of pages for a site check
        #[arg(long)]
        max_pages: Option<usize>,

        /// Per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Retries after a network-level failure
        #[arg(long)]
        max_retries: Option<u32>,

        /// Skip links matching this regex (repeatable)
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Print the JSON result instead of a summary
        #[arg(long)]
        json: bool,

        /// Also write a markdown report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Validate the configuration and print the effective settings
    ValidateConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_ref())?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            server::serve(&config, &bind).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            url,
            check_type,
            max_pages,
            timeout_ms,
            max_retries,
            exclude,
            json,
            report,
        } => {
            let mut options = CheckOptions::from(&config.checker);
            if let Some(max_pages) = max_pages {
                options.max_pages = max_pages;
            }
            if let Some(timeout_ms) = timeout_ms {
                options.timeout = Duration::from_millis(timeout_ms);
            }
            if let Some(max_retries) = max_retries {
                options.max_retries = max_retries;
            }
            options.exclude_patterns.extend(exclude);

            handle_check(&config, options, check_type, &url, json, report).await
        }
        Command::ValidateConfig => {
            handle_validate_config(&config, config_hash.as_deref());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscout=info,warn"),
            1 => EnvFilter::new("linkscout=debug,info"),
            2 => EnvFilter::new("linkscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<(Config, Option<String>)> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, Some(hash)))
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the `check` command
async fn handle_check(
    config: &Config,
    options: CheckOptions,
    check_type: CheckType,
    url: &str,
    json: bool,
    report: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let user_agent = config.user_agent.header_value();
    let checker = LinkChecker::new(options, &user_agent)?;
    let result = checker.run(check_type, url).await?;

    if json {
        let data = CheckResponseData {
            categorized: categorize(&result.broken_links),
            metadata: CheckMetadata {
                check_type,
                timestamp: Utc::now(),
                options: EffectiveOptions::new(checker.options(), &user_agent),
            },
            result: result.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&ApiResponse::ok(data))?);
    } else {
        print_summary(url, &result);
    }

    if let Some(path) = report {
        write_markdown_report(url, check_type, &result, &path)?;
        if !json {
            println!("✓ Report written to: {}", path.display());
        }
    }

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Handles the `validate-config` command
fn handle_validate_config(config: &Config, config_hash: Option<&str>) {
    println!("=== LinkScout Configuration ===\n");

    println!("Server:");
    println!("  Bind: {}", config.server.bind);

    println!("\nChecker:");
    println!("  Timeout: {}ms", config.checker.timeout_ms);
    println!("  Max retries: {}", config.checker.max_retries);
    println!("  Retry backoff: {}ms", config.checker.retry_backoff_ms);
    println!("  Max pages: {}", config.checker.max_pages);
    println!("  Link concurrency: {}", config.checker.link_concurrency);
    println!("  Page concurrency: {}", config.checker.page_concurrency);
    println!("  Check images: {}", config.checker.check_images);
    println!(
        "  Exclude patterns ({}):",
        config.checker.exclude_patterns.len()
    );
    for pattern in &config.checker.exclude_patterns {
        println!("    - {}", pattern);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    match config_hash {
        Some(hash) => println!("\n✓ Configuration is valid (hash: {})", hash),
        None => println!("\n✓ Using default configuration"),
    }
}
