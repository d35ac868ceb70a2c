//! Interactive catalog assistant on stdin/stdout
//!
//! Uses the same configuration as the server; one process is one
//! conversation.

use std::io::Write;

use agent_core::Session;
use agent_server::{ServerConfig, init_tracing, state::AppState};
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 4] = ["exit", "quit", "bye", "goodbye"];

fn prompt() -> std::io::Result<()> {
    print!("You: ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("warn");

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config).await?;
    let mut session = Session::new();

    println!("Catalog assistant ({} engine). Type 'exit' to leave.", state.agent.engine_name());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();

        if EXIT_WORDS.contains(&query.to_lowercase().as_str()) {
            break;
        }

        if !query.is_empty() {
            match state.agent.handle(&mut session, query).await {
                Ok(outcome) => {
                    if !outcome.tool_calls.is_empty() {
                        println!("  [tools: {}]", outcome.tool_calls.join(", "));
                    }
                    println!("Agent: {}", outcome.reply);
                }
                Err(e) => {
                    tracing::error!("Agent error: {}", e);
                    println!("Agent: {}", e.user_message());
                }
            }
        }

        prompt()?;
    }

    println!("Goodbye!");
    Ok(())
}
