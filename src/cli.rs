//! Command-line interface parsing for smnview
//!
//! Subcommands select the mode of operation; flags given here override the
//! values loaded from the config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

/// smnview - SMN Argentina weather fetcher, cache and dashboard
#[derive(Parser, Debug)]
#[command(name = "smnview")]
#[command(about = "Fetch, cache and browse SMN Argentina weather station data")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,

    /// Cache file location, overriding the config file
    #[arg(long, global = true, value_name = "FILE")]
    pub cache_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch once, print a summary and save on success
    Fetch,

    /// Refresh the cache file on a fixed interval until interrupted
    Watch {
        /// Refresh interval in minutes
        #[arg(short, long, value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Serve the cached data, the dashboard and static files over HTTP
    ///
    /// Examples:
    ///   smnview serve                    # Serve on 127.0.0.1:3000
    ///   smnview serve -a -i 30           # Refresh on read, every 30 minutes
    ///   smnview serve --root ./public    # Static files from ./public
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Directory static files are served from
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Refresh stale data in the background and when it is read
        #[arg(short, long)]
        auto_refresh: bool,

        /// Refresh interval in minutes
        #[arg(short, long, value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Browse the cached data in the terminal
    View,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.cache_file {
            config.cache_file = Some(path.clone());
        }

        match &self.command {
            Commands::Fetch | Commands::View => {}
            Commands::Watch { interval } => {
                if let Some(minutes) = interval {
                    config.refresh_interval_minutes = *minutes;
                }
            }
            Commands::Serve {
                port,
                host,
                root,
                auto_refresh,
                interval,
            } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(root) = root {
                    config.server.root = root.clone();
                }
                if *auto_refresh {
                    config.auto_refresh = true;
                }
                if let Some(minutes) = interval {
                    config.refresh_interval_minutes = *minutes;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_fetch_defaults() {
        let cli = Cli::parse_from(["smnview", "fetch"]);
        assert_eq!(cli.command, Commands::Fetch);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(cli.cache_file.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_serve_flags() {
        let cli = Cli::parse_from([
            "smnview", "serve", "-p", "8080", "--host", "0.0.0.0", "-a", "-i", "30",
        ]);
        assert_eq!(
            cli.command,
            Commands::Serve {
                port: Some(8080),
                host: Some("0.0.0.0".to_string()),
                root: None,
                auto_refresh: true,
                interval: Some(30),
            }
        );
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["smnview", "view", "--cache-file", "/tmp/w.json", "-v"]);
        assert_eq!(cli.cache_file, Some(PathBuf::from("/tmp/w.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["smnview", "watch", "--interval", "0"]).is_err());
        assert!(Cli::try_parse_from(["smnview", "serve", "-i", "0"]).is_err());
        assert!(Cli::try_parse_from(["smnview", "watch", "-i", "abc"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["smnview"]).is_err());
    }

    #[test]
    fn test_apply_overrides_serve() {
        let cli = Cli::parse_from([
            "smnview",
            "serve",
            "--root",
            "site",
            "-a",
            "-i",
            "5",
            "--cache-file",
            "data.json",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert!(config.auto_refresh);
        assert_eq!(config.refresh_interval_minutes, 5);
        assert_eq!(config.server.root, PathBuf::from("site"));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache_file, Some(PathBuf::from("data.json")));
    }

    #[test]
    fn test_apply_overrides_keeps_config_when_flags_absent() {
        let mut config = AppConfig {
            auto_refresh: true,
            refresh_interval_minutes: 60,
            ..AppConfig::default()
        };
        let cli = Cli::parse_from(["smnview", "serve"]);
        cli.apply_overrides(&mut config);

        assert!(config.auto_refresh);
        assert_eq!(config.refresh_interval_minutes, 60);
    }

    #[test]
    fn test_apply_overrides_watch_interval() {
        let mut config = AppConfig::default();
        Cli::parse_from(["smnview", "watch", "-i", "45"]).apply_overrides(&mut config);
        assert_eq!(config.refresh_interval_minutes, 45);
    }
}
