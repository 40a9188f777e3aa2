//! Marquee CLI: rebuild, maintain and query a search-key index directory.
//!
//! Every command prints a JSON document to stdout; logs go to stderr.

mod commands;
mod session;

use anyhow::Context;
use commands::build_cli;
use session::Session;
use std::path::PathBuf;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(".marquee"));
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    let session = Session::open(&data_dir, config_path.as_deref())
        .with_context(|| format!("Failed to open index at {}", data_dir.display()))?;

    let outcome = session.dispatch(&matches).await?;
    println!("{}", serde_json::to_string_pretty(&outcome.body)?);

    if !outcome.ok {
        std::process::exit(1);
    }
    Ok(())
}
