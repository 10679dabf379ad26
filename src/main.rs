//! Binary entrypoint that launches the research-assistant terminal client.

use std::process::ExitCode;

use clap::Parser;
use research_assistant::cli::Args;
use research_assistant::start_research_assistant;

/// Parse arguments and run an interactive session.
fn main() -> ExitCode {
    let args = Args::parse();
    start_research_assistant::run(&args)
}
