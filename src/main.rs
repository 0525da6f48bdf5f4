//! polyglot-lexicon
//!
//! Usage:
//!   polyglot-lexicon          # Interactive session, one lookup per line (:quit to exit)
//!   polyglot-lexicon serve    # HTTP server on $PORT (default 8080)
//!
//! Optional environment variables: see `Config::from_env`.

use anyhow::{bail, Context, Result};
use polyglot_lexicon::config::Config;
use polyglot_lexicon::pipeline::Pipeline;
use polyglot_lexicon::{presenter, server};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

const QUIT_COMMAND: &str = ":quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging on stderr so lookups on stdout stay readable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyglot_lexicon=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let mode = std::env::args().nth(1);
    match mode.as_deref() {
        Some("serve") => {
            let port = config.port;
            let pipeline = Pipeline::from_config(&config)?;
            server::serve(Arc::new(pipeline), port).await
        }
        None => {
            let config = if config.has_api_key() {
                config
            } else {
                let key = prompt_line("OpenAI API key (leave blank to skip synonym generation): ")?;
                config.with_api_key(key)
            };
            let pipeline = Pipeline::from_config(&config)?;
            run_interactive(&pipeline).await
        }
        Some(other) => bail!("Unknown command {:?}. Usage: polyglot-lexicon [serve]", other),
    }
}

fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok((read > 0).then_some(line))
}

async fn run_interactive(pipeline: &Pipeline) -> Result<()> {
    info!("Interactive session started");
    println!("Enter a word or phrase in English, French or Thai ({} to exit).", QUIT_COMMAND);

    loop {
        let Some(line) = prompt_line("> ")? else {
            break;
        };
        let input = line.trim();
        if input == QUIT_COMMAND {
            break;
        }

        match pipeline.process(input).await {
            Ok(report) => println!("{}", presenter::render_text(&report)),
            Err(e) => println!("{}", e),
        }
    }

    info!("Interactive session ended");
    Ok(())
}
