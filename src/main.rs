//! Headless pipe flow runner (default binary).
//!
//! Plays one seeded session with a greedy auto-placer, logs every event to
//! stderr (filter with `RUST_LOG`), and prints the final snapshot as JSON.

use anyhow::Result;

use pipe_flow::core::GameSession;
use pipe_flow::runner::{load_config, parse_run_args, run};

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_run_args(&args)?;
    let config = load_config(args.config.as_deref())?;

    let mut session = GameSession::new(config, args.seed)?;
    run(&mut session, args.ticks)?;

    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}
