/// # spec-publish CLI Interface (Module)
///
/// Command parsing and orchestration for the two phases of a run. All core
/// logic (tree model, rendering, materialization) lives in the
/// [`spec-publish-core`] crate; this module wires configuration and the
/// concrete Gemini and Notion clients into it.
///
/// ## How To Use
/// - For command-line users: `spec-publish generate` then `spec-publish upload`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// Both subcommands check their preconditions (configuration, environment,
/// tree file) before any remote call is made.
///
/// [`spec-publish-core`]: ../../spec_publish_core/
use crate::gemini::GeminiClient;
use crate::load_config::{gemini_settings_from_env, load_config, notion_settings_from_env};
use crate::notion::NotionClient;
use anyhow::Result;
use clap::{Parser, Subcommand};
use spec_publish_core::materialize::MaterializeReport;
use spec_publish_core::pipeline::{generate, publish};
use std::path::PathBuf;

/// CLI for spec-publish: generate an API specification tree and publish it
/// as a Notion page hierarchy.
#[derive(Parser)]
#[clap(
    name = "spec-publish",
    version,
    about = "Generate a structured API specification from schema files and publish it to Notion"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read schema files, generate the specification tree and write it to the tree file
    Generate {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Read the tree file and create one Notion page per node under the parent page
    Upload {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate { config } => {
            let config = load_config(config.as_deref())?;
            let settings = gemini_settings_from_env()?;
            let generate_config = config.generate_config();
            generate_config.trace_loaded();
            tracing::info!(command = "generate", "Starting generation");

            let generator = GeminiClient::new(settings, config.render.locale)?;
            println!(
                "Generating specification from {}/*.{} ...",
                generate_config.source_dir.display(),
                generate_config.extension
            );
            match generate(&generate_config, &generator).await {
                Ok(report) => {
                    tracing::info!(command = "generate", documents = report.documents, "Generation complete");
                    println!("Read {} source documents", report.documents);
                    println!("Wrote {}", report.tree_path.display());
                    println!();
                    print!("{}", report.tree.outline());
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "generate", error = %e, "Generation failed");
                    Err(e.into())
                }
            }
        }
        Commands::Upload { config } => {
            let config = load_config(config.as_deref())?;
            let settings = notion_settings_from_env()?;
            let publish_config = config.publish_config(settings.parent_page.clone())?;
            publish_config.trace_loaded();
            tracing::info!(command = "upload", "Starting upload");

            let client = NotionClient::new(settings)?;
            match publish(&publish_config, &client).await {
                Ok(report) => {
                    tracing::info!(command = "upload", pages = report.pages_created, "Upload complete");
                    print_upload_summary(&report);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "upload", error = %e, "Upload failed");
                    Err(e.into())
                }
            }
        }
    }
}

fn print_upload_summary(report: &MaterializeReport) {
    println!("Root page: {}", report.root.address);
    println!(
        "Pages created: {} ({} create calls, {} append calls)",
        report.pages_created, report.create_calls, report.append_calls
    );
    if !report.failures.is_empty() {
        println!(
            "Failed subtrees: {} ({} pages skipped)",
            report.failures.len(),
            report.skipped_pages()
        );
        for failure in &report.failures {
            println!("  {}: {}", failure.path.join(" / "), failure.error);
        }
    }
    if !report.warnings.is_empty() {
        println!("Incomplete pages: {}", report.warnings.len());
        for warning in &report.warnings {
            println!(
                "  {}: {} blocks not appended ({})",
                warning.path.join(" / "),
                warning.lost_blocks,
                warning.error
            );
        }
    }
}
