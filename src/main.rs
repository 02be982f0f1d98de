use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod telemetry;

/// Package-registry document reconciliation
///
/// Applies one write request to a stored package document, the way the
/// registry's document store does, and prints the result as JSON:
///
///   {"doc": <document to persist or error marker>, "message": "<json>"}
///
/// EXAMPLES:
///
///   # Create a package from scratch
///   regdoc update --body new.json --user alice
///
///   # Publish 1.2.0 into an existing document
///   regdoc update --doc pkg.json --body 1.2.0.json --version 1.2.0 --user alice
///
///   # Point the "next" tag at 2.0.0-rc.1 (body is the JSON string "2.0.0-rc.1")
///   regdoc update --doc pkg.json --body tag.json --version next --user alice
///
///   # Soft-delete
///   regdoc unpublish --doc pkg.json --user alice
///
/// Exit status is 1 when the update is rejected; the error marker and the
/// reason are still printed.
#[derive(Parser)]
#[command(name = "regdoc")]
#[command(version, about)]
#[command(after_help = "See 'regdoc <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a create, tag, publish or full-document update
    Update(commands::UpdateArgs),

    /// Mark a package as unpublished
    Unpublish(commands::UnpublishArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init();

    let response = match &cli.command {
        Commands::Update(args) => commands::update(args)?,
        Commands::Unpublish(args) => commands::unpublish(args)?,
    };

    let printed = serde_json::to_value(&response)?;
    println!("{}", serde_json::to_string_pretty(&printed)?);
    Ok(if regdoc::response::is_error_document(&printed["doc"]) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
