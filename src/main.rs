use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use votecount::cli::{Cli, Commands};
use votecount::types::config::Config;
use votecount::TallyResult;

fn main() -> TallyResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::load_or_default(&cli.config)?;

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("votecount={}", log_level)
            .parse()
            .unwrap_or_else(|_| "votecount=info".parse().expect("fallback directive is valid")),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            votecount::cli::commands::init(path)?;
        }
        Commands::Tabulate {
            input,
            method,
            winners,
            json,
        } => {
            votecount::cli::commands::tabulate(&input, method, winners, json, &config)?;
        }
        Commands::Compare {
            input,
            winners,
            json,
        } => {
            votecount::cli::commands::compare(&input, winners, json, &config)?;
        }
        Commands::Inspect { input } => {
            votecount::cli::commands::inspect(&input)?;
        }
        Commands::Version => {
            votecount::cli::commands::version();
        }
    }

    Ok(())
}
