//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "park-keeper")]
#[command(about = "Parking companion daemon: parking timer, location history and settings")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding persisted data (defaults to the platform data dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Keep all data in memory only
    #[arg(long, conflicts_with = "data_dir")]
    pub in_memory: bool,

    /// Countdown polling interval in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(10..))]
    pub tick_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Resolve where data files live
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("park-keeper")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["park-keeper"]).unwrap();
        assert_eq!(config.port, 20554);
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
        assert!(config.resolved_data_dir().ends_with("park-keeper"));
    }

    #[test]
    fn test_explicit_data_dir() {
        let config =
            Config::try_parse_from(["park-keeper", "--data-dir", "/tmp/pk", "-v"]).unwrap();
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/pk"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_in_memory_conflicts_with_data_dir() {
        assert!(Config::try_parse_from(["park-keeper", "--in-memory", "-d", "/tmp/x"]).is_err());
    }

    #[test]
    fn test_tick_floor() {
        assert!(Config::try_parse_from(["park-keeper", "--tick-ms", "1"]).is_err());
    }
}
