use std::path::PathBuf;
use tracing::{debug, info};

use crate::block::PageLimits;
use crate::contract::PageId;
use crate::render::{Locale, Renderer};

/// Inputs of the generate phase.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub source_dir: PathBuf,
    pub extension: String,
    pub tree_path: PathBuf,
}

/// Inputs of the upload phase.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub tree_path: PathBuf,
    pub parent_page: PageId,
    pub limits: PageLimits,
    pub locale: Locale,
    pub example_language: String,
}

impl GenerateConfig {
    pub fn trace_loaded(&self) {
        info!(
            source_dir = %self.source_dir.display(),
            extension = %self.extension,
            tree_path = %self.tree_path.display(),
            "Loaded generate config"
        );
        debug!(?self, "Generate config loaded (full debug)");
    }
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            tree_path = %self.tree_path.display(),
            parent_page = %self.parent_page,
            max_blocks_per_call = self.limits.max_blocks_per_call(),
            max_block_text = self.limits.max_block_text(),
            "Loaded upload config"
        );
        debug!(?self, "Upload config loaded (full debug)");
    }

    /// Renderer whose block text limit matches the configured page limits.
    pub fn renderer(&self) -> Renderer {
        Renderer::new(
            self.locale,
            self.limits.max_block_text(),
            self.example_language.clone(),
        )
    }
}
