use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use withdrawal::cli::{Cli, Command, render_report, render_states};
use withdrawal::core::{calculate, validate};

/// Honours `RUST_LOG`, falling back to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port, tables } => {
            let tables = tables.load().context("failed to load tax tables")?;
            withdrawal::api::run_http_server(port, tables)
                .await
                .context("server error")?;
        }
        Command::Calculate(args) => {
            let tables = args.tables.load().context("failed to load tax tables")?;
            let input = match validate(&args.raw_input()) {
                Ok(input) => input,
                Err(errors) => {
                    for message in errors.messages() {
                        eprintln!("{message}");
                    }
                    std::process::exit(1);
                }
            };
            let result = calculate(&input, &tables);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_report(&result));
            }
        }
        Command::States => print!("{}", render_states()),
    }
    Ok(())
}
