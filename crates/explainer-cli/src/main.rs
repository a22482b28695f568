//! Explainer CLI - Ask a local model about a text and check its evidence.

use clap::Parser;
use explainer_cli::commands;
use explainer_cli::{Cli, Command, Config, Formatter, Resolved};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Log to stderr; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> explainer_cli::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    // Load or create config
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        let cfg = Config::default();
        if let Err(e) = cfg.save(&config_path) {
            tracing::warn!("Could not write default config to {}: {}", config_path.display(), e);
        }
        cfg
    };

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Profile(args) => {
            commands::execute_profile(args, &mut config, &config_path, &formatter)?;
        }
        Command::Explain(args) => {
            commands::execute_explain(args, &resolve_from_env(&config)?, &formatter)?;
        }
        Command::Check => {
            commands::execute_check(&resolve_from_env(&config)?, &formatter)?;
        }
        Command::Chat(args) => {
            let settings = resolve_from_env(&config)?;
            commands::execute_chat(args, &settings, &formatter, config.settings.history_size)?;
        }
    }

    Ok(())
}

fn resolve_from_env(config: &Config) -> explainer_cli::Result<Resolved> {
    config.resolve(|key| std::env::var(key).ok())
}
