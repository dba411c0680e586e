//! Mediaforge CLI - Command-line interface for the generation queue
//!
//! Talks JSON-RPC to the daemon for submit/status; `seed` writes brief
//! units straight into the record store so a queue can be exercised
//! without the authoring UI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9533";
const DEFAULT_DB_PATH: &str = "~/.mediaforge/records.db";

#[derive(Parser)]
#[command(name = "mediaforge")]
#[command(about = "Mediaforge generation queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "MEDIAFORGE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit jobs to the generation queue
    Submit {
        /// Job identifiers to enqueue
        #[arg(required = true)]
        job_ids: Vec<String>,
    },

    /// Show the current queue snapshot
    Status,

    /// Seed brief units for a job (test/authoring surface)
    Seed {
        /// Job identifier
        job_id: String,

        /// One description per unit, in order
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// Record store database path
        #[arg(long, env = "MEDIAFORGE_DB_PATH", default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct ItemRow {
    job_id: String,
    state: String,
    unit_count: usize,
    retry_count: u32,
    enqueued_at: i64,
    #[tabled(display_with = "display_next_attempt")]
    #[serde(default)]
    next_attempt_at: Option<i64>,
}

fn display_next_attempt(value: &Option<i64>) -> String {
    match value {
        Some(at) => at.to_string(),
        None => "-".to_string(),
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { job_ids } => {
            let params = json!({ "job_ids": job_ids });
            let result = call_rpc(&cli.rpc_url, "media.submit.v1", params).await?;

            let admitted = result["admitted"].as_u64().unwrap_or(0);
            let queue_len = result["queue_len"].as_u64().unwrap_or(0);

            println!(
                "{}",
                format!("✓ {} job(s) admitted, queue length {}", admitted, queue_len)
                    .green()
                    .bold()
            );
            if admitted == 0 {
                println!(
                    "{}",
                    "  (duplicates and jobs without units are skipped)".yellow()
                );
            }
        }

        Commands::Status => {
            println!("{}", "Generation Queue".cyan().bold());
            println!();

            let result = call_rpc(&cli.rpc_url, "media.status.v1", json!({})).await?;
            let items: Vec<ItemRow> = serde_json::from_value(result["items"].clone())
                .context("Unexpected status payload")?;

            if items.is_empty() {
                println!("  {}", "Queue is empty".yellow());
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }

        Commands::Seed {
            job_id,
            descriptions,
            db_path,
        } => {
            use mediaforge_core::port::SystemClock;
            use mediaforge_infra_sqlite::{create_pool, run_migrations, SqliteRecordStore};
            use std::sync::Arc;

            let db_path = shellexpand::tilde(&db_path).into_owned();
            let pool = create_pool(&db_path)
                .await
                .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
            run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

            let store = SqliteRecordStore::new(pool, Arc::new(SystemClock));
            store
                .insert_units(&job_id, &descriptions)
                .await
                .context("Failed to seed units")?;

            println!(
                "{}",
                format!("✓ Seeded {} unit(s) for job {}", descriptions.len(), job_id)
                    .green()
                    .bold()
            );
        }
    }

    Ok(())
}
