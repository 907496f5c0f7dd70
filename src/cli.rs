//! Command-line argument parsing for InsightGen.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use insightgen::config::{Config, StoreConfig};
use insightgen::db::seed::DEFAULT_ORDER_COUNT;
use insightgen::error::Result;

/// Ask business questions of a sales database in plain language.
#[derive(Parser, Debug)]
#[command(name = "insightgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file or sqlite:// URL
    #[arg(long, global = true, value_name = "PATH", env = "INSIGHTGEN_DB")]
    pub db: Option<String>,

    /// LLM provider: gemini, openai or mock
    #[arg(long, global = true, value_name = "PROVIDER", env = "INSIGHTGEN_PROVIDER")]
    pub provider: Option<String>,

    /// Model identifier sent to the provider
    #[arg(long, global = true, value_name = "MODEL", env = "INSIGHTGEN_MODEL")]
    pub model: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate SQL for a question, run it and summarize the result
    Ask {
        question: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the validated SQL for a question without running it
    GenerateSql { question: String },

    /// Validate and run a SELECT query, printing {data, columns} as JSON
    ExecuteSql { sql: String },

    /// Summarize a JSON array of records
    Insights {
        /// File holding the records, or "-" for stdin
        #[arg(long, value_name = "FILE", default_value = "-")]
        input: String,
    },

    /// Create the sales table and fill it with demo orders
    Seed {
        /// Number of orders to insert
        #[arg(long, default_value_t = DEFAULT_ORDER_COUNT)]
        rows: usize,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(db) = &self.db {
            config.store.path = StoreConfig::from_location(db)?.path;
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_ask() {
        let cli = parse_args(&["insightgen", "ask", "total revenue by category", "--json"]);
        assert_eq!(
            cli.command,
            Command::Ask {
                question: "total revenue by category".to_string(),
                json: true
            }
        );
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = parse_args(&[
            "insightgen",
            "generate-sql",
            "top products",
            "--provider",
            "mock",
            "--db",
            "sqlite:demo.db",
        ]);
        assert_eq!(cli.provider.as_deref(), Some("mock"));
        assert_eq!(cli.db.as_deref(), Some("sqlite:demo.db"));
    }

    #[test]
    fn test_parse_seed_default_rows() {
        let cli = parse_args(&["insightgen", "seed"]);
        assert_eq!(cli.command, Command::Seed { rows: 200 });
    }

    #[test]
    fn test_parse_insights_default_stdin() {
        let cli = parse_args(&["insightgen", "insights"]);
        assert_eq!(
            cli.command,
            Command::Insights {
                input: "-".to_string()
            }
        );
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["insightgen", "--config", "/tmp/config.toml", "seed"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/config.toml"));
    }

    #[test]
    fn test_apply_overrides() {
        let cli = parse_args(&[
            "insightgen",
            "--db",
            "sqlite:///data/sales.db",
            "--provider",
            "openai",
            "--model",
            "gpt-4o",
            "seed",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();

        assert_eq!(config.store.path, PathBuf::from("/data/sales.db"));
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_invalid_db_scheme_is_rejected() {
        let cli = parse_args(&["insightgen", "--db", "postgres://localhost/sales", "seed"]);
        assert!(cli.apply_overrides(&mut Config::default()).is_err());
    }
}
