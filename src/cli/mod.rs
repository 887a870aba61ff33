//! CLI commands for spotlight.
//!
//! Runs search sessions against captured browser data: search, open,
//! settings.

pub mod search;
pub mod settings;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, Profile};
use crate::logging::{self, LoggerConfig};

#[derive(Parser)]
#[command(name = "spotlight")]
#[command(about = "Fuzzy search across page text, tabs, bookmarks and history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/spotlight/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive, overrides the config file
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Inputs for one search session.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Search query
    pub query: String,

    /// Browser snapshot JSON (tabs, bookmark tree, history)
    #[arg(long, value_name = "PATH")]
    pub sources: PathBuf,

    /// Captured page JSON (url, title, nodes)
    #[arg(long, value_name = "PATH")]
    pub page: Option<PathBuf>,

    /// Matching profile: overlay or popup
    #[arg(long, value_parser = parse_profile)]
    pub profile: Option<Profile>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank items for a query and print the outcome
    Search {
        #[command(flatten)]
        session: SessionArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a query and dispatch the selected result
    Open {
        #[command(flatten)]
        session: SessionArgs,

        /// 1-based rank to activate (default: the first result)
        #[arg(long, value_name = "N")]
        pick: Option<usize>,
    },

    /// Show or change the persisted user settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the settings blob
    Show,

    /// Set the type priority, e.g. `tab,page,bookmark,history`
    Priority {
        #[arg(value_delimiter = ',', required = true)]
        types: Vec<String>,
    },

    /// Set the language (`auto` or a locale such as `ja`)
    Language { tag: String },
}

fn parse_profile(value: &str) -> Result<Profile, String> {
    match value.to_ascii_lowercase().as_str() {
        "overlay" => Ok(Profile::Overlay),
        "popup" => Ok(Profile::Popup),
        other => Err(format!("unknown profile '{}', expected overlay or popup", other)),
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    logging::init(&LoggerConfig::with_level(&level))?;

    match cli.command {
        Commands::Search { session, json } => search::run_search(&session, config, json),
        Commands::Open { session, pick } => search::run_open(&session, config, pick),
        Commands::Settings { action } => settings::run_settings(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::try_parse_from([
            "spotlight",
            "search",
            "github",
            "--sources",
            "browser.json",
            "--profile",
            "popup",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Search { session, json } => {
                assert_eq!(session.query, "github");
                assert_eq!(session.profile, Some(Profile::Popup));
                assert!(session.page.is_none());
                assert!(json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_priority_list() {
        let cli =
            Cli::try_parse_from(["spotlight", "settings", "priority", "tab,page,history"]).unwrap();
        match cli.command {
            Commands::Settings {
                action: SettingsCommands::Priority { types },
            } => assert_eq!(types, vec!["tab", "page", "history"]),
            _ => panic!("expected settings priority"),
        }
    }

    #[test]
    fn test_unknown_profile_rejected() {
        assert!(parse_profile("sidebar").is_err());
        assert_eq!(parse_profile("Overlay"), Ok(Profile::Overlay));
    }
}
