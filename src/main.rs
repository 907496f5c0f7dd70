//! InsightGen - natural-language questions over a sales database.

mod cli;
mod output;

use anyhow::{bail, Context};
use serde_json::{Map, Value as JsonValue};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

use cli::{Cli, Command};
use insightgen::config::Config;
use insightgen::db::seed::seed_demo_data;
use insightgen::db::{QueryResult, QueryStore, Schema, SqliteStore};
use insightgen::error::InsightError;
use insightgen::llm::{create_client, LlmClient};
use insightgen::logging;
use insightgen::pipeline::{self, Pipeline};
use insightgen::safety::validate_read_only;

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init(cli.log_file.as_deref());

    if let Err(e) = run(cli).await {
        debug!(error = ?e, "Command failed");
        eprintln!("{}", error_line(&e));
        std::process::exit(1);
    }
}

/// The single line printed to stderr for a failed command.
fn error_line(e: &anyhow::Error) -> String {
    match e.downcast_ref::<InsightError>() {
        Some(err) => format!("{}: {}", err.category(), err.message()),
        None => format!("Error: {e:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config)?;

    match cli.command {
        Command::Ask { question, json } => {
            let pipeline = open_pipeline(&config).await?;
            let envelope = pipeline.run(&question).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                println!("{}", output::format_envelope(&envelope));
            }
        }
        Command::GenerateSql { question } => {
            let llm = create_client(&config.llm)?;
            let sql = pipeline::request_sql(llm.as_ref(), &Schema::sales(), &question).await?;
            validate_read_only(&sql, config.safety.strict)?;
            println!("{sql}");
        }
        Command::ExecuteSql { sql } => {
            let pipeline = open_pipeline(&config).await?;
            let outcome = pipeline.execute_sql(&sql).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome.result().to_records())?
            );
        }
        Command::Insights { input } => {
            let records = read_records(&input)?;
            let result = QueryResult::from_records(&records)?;
            let llm = create_client(&config.llm)?;
            println!("{}", pipeline::generate_insights(llm.as_ref(), &result).await?);
        }
        Command::Seed { rows } => {
            let store = SqliteStore::open_writable(&config.store).await?;
            let inserted = seed_demo_data(&store, &Schema::sales(), rows).await?;
            store.close().await?;
            println!(
                "Inserted {inserted} orders into {}",
                config.store.path.display()
            );
        }
    }

    Ok(())
}

async fn open_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let llm: Arc<dyn LlmClient> = Arc::from(create_client(&config.llm)?);
    let store: Arc<dyn QueryStore> = Arc::new(SqliteStore::open(&config.store).await?);
    Ok(Pipeline::new(llm, store).with_safety(config.safety.clone()))
}

/// Reads a JSON array of records, or an object whose `data` field holds one.
fn read_records(input: &str) -> anyhow::Result<Vec<Map<String, JsonValue>>> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read records from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };

    let value: JsonValue = serde_json::from_str(&text).context("Records are not valid JSON")?;
    let array = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut object) => match object.remove("data") {
            Some(JsonValue::Array(items)) => items,
            _ => bail!("Expected a JSON array of records or an object with a \"data\" array"),
        },
        _ => bail!("Expected a JSON array of records"),
    };

    array
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(record) => Ok(record),
            other => bail!("Record {i} is not an object: {other}"),
        })
        .collect()
}
