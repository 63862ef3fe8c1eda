//! The two phases of a run, each usable on its own:
//!
//! - [`generate`]: read source documents → ask a [`TreeGenerator`] for a
//!   tree → write the tree file.
//! - [`publish`]: read the tree file → materialize it under the configured
//!   parent page via a [`PageClient`].
//!
//! The tree file is the only thing the phases share, so a failed upload can
//! be re-run without generating again. Re-running an upload creates a fresh
//! copy of every page; nothing is deduplicated.

use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{GenerateConfig, PublishConfig};
use crate::contract::{PageClient, TreeGenerator};
use crate::error::{PublishError, SourceError};
use crate::materialize::{MaterializeReport, Materializer};
use crate::source::read_source_documents;
use crate::tree::{load_tree, save_tree, SpecNode};

#[derive(Debug)]
pub struct GenerateReport {
    pub documents: usize,
    pub tree_path: PathBuf,
    pub tree: SpecNode,
}

/// Runs the generate phase. Nothing is written unless generation yields a
/// well-formed tree.
pub async fn generate<G>(config: &GenerateConfig, generator: &G) -> Result<GenerateReport, SourceError>
where
    G: TreeGenerator + ?Sized,
{
    info!("[GENERATE] Starting specification generation");
    let documents = read_source_documents(&config.source_dir, &config.extension)?;

    info!(documents = documents.len(), "[GENERATE] Requesting specification tree");
    let tree = generator.generate(&documents).await.map_err(|e| {
        error!(error = %e, "[GENERATE][ERROR] Generation failed");
        e
    })?;

    save_tree(&config.tree_path, &tree)?;
    info!(
        path = %config.tree_path.display(),
        nodes = tree.subtree_size(),
        "[GENERATE] Specification tree written"
    );

    Ok(GenerateReport {
        documents: documents.len(),
        tree_path: config.tree_path.clone(),
        tree,
    })
}

/// Runs the upload phase against `client`.
pub async fn publish<C>(config: &PublishConfig, client: &C) -> Result<MaterializeReport, PublishError>
where
    C: PageClient + ?Sized,
{
    info!("[UPLOAD] Starting page tree upload");
    let tree = load_tree(&config.tree_path)?;

    let materializer = Materializer::new(client, config.renderer(), config.limits);
    let report = materializer.run(&tree, &config.parent_page).await?;

    if report.is_complete() {
        info!(address = %report.root.address, "[UPLOAD] Upload complete");
    } else {
        error!(
            failures = report.failures.len(),
            skipped_pages = report.skipped_pages(),
            warnings = report.warnings.len(),
            "[UPLOAD] Upload finished with errors"
        );
    }
    Ok(report)
}
