/// `load_config` module: reads the optional YAML settings file and the
/// environment secrets, and maps both onto the core phase configurations.
///
/// # Responsibilities
/// - Parse the settings file (every key optional) into typed sections
/// - Read credentials and the target page from the environment, failing with
///   a [`PreconditionError`] naming the missing variable
/// - Validate limits before any remote call is made
///
/// Secrets never appear in the settings file and are held as
/// [`SecretString`] so they stay out of logs and debug output.
use anyhow::Result;
use secrecy::SecretString;
use serde::Deserialize;
use spec_publish_core::block::{LimitsSection, PageLimits};
use spec_publish_core::config::{GenerateConfig, PublishConfig};
use spec_publish_core::contract::PageId;
use spec_publish_core::error::PreconditionError;
use spec_publish_core::render::Locale;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const NOTION_PARENT_PAGE_ID: &str = "NOTION_PARENT_PAGE_ID";
pub const NOTION_API_BASE: &str = "NOTION_API_BASE";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const GEMINI_API_BASE: &str = "GEMINI_API_BASE";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub source: SourceSection,
    pub tree_path: PathBuf,
    pub render: RenderSection,
    pub limits: LimitsSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub dir: PathBuf,
    pub extension: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub locale: Locale,
    pub example_language: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            source: SourceSection::default(),
            tree_path: PathBuf::from("specs/api_spec_structured.json"),
            render: RenderSection::default(),
            limits: LimitsSection::default(),
        }
    }
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("server/graphql"),
            extension: "graphql".to_string(),
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            example_language: "graphql".to_string(),
        }
    }
}

impl CliConfig {
    pub fn generate_config(&self) -> GenerateConfig {
        GenerateConfig {
            source_dir: self.source.dir.clone(),
            extension: self.source.extension.clone(),
            tree_path: self.tree_path.clone(),
        }
    }

    pub fn publish_config(&self, parent_page: PageId) -> Result<PublishConfig, PreconditionError> {
        let limits = PageLimits::try_from(self.limits.clone())?;
        Ok(PublishConfig {
            tree_path: self.tree_path.clone(),
            parent_page,
            limits,
            locale: self.render.locale,
            example_language: self.render.example_language.clone(),
        })
    }
}

/// Loads the settings file at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path_ref) = path else {
        info!("No config file given, using defaults");
        return Ok(CliConfig::default());
    };
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserializes to YAML null rather than an empty mapping.
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Credentials and target for the upload phase.
#[derive(Debug)]
pub struct NotionSettings {
    pub token: SecretString,
    pub parent_page: PageId,
    pub api_base: Option<String>,
}

/// Credentials and model for the generate phase.
#[derive(Debug)]
pub struct GeminiSettings {
    pub api_key: SecretString,
    pub model: Option<String>,
    pub api_base: Option<String>,
}

pub fn notion_settings_from_env() -> Result<NotionSettings, PreconditionError> {
    let token = required_env(NOTION_TOKEN)?;
    let parent_page = required_env(NOTION_PARENT_PAGE_ID)?;
    info!(parent_page = %parent_page, "Notion settings loaded from environment");
    Ok(NotionSettings {
        token: SecretString::from(token),
        parent_page: PageId::new(parent_page),
        api_base: optional_env(NOTION_API_BASE),
    })
}

pub fn gemini_settings_from_env() -> Result<GeminiSettings, PreconditionError> {
    let api_key = required_env(GEMINI_API_KEY)?;
    let model = optional_env(GEMINI_MODEL);
    info!(model = ?model, "Gemini settings loaded from environment");
    Ok(GeminiSettings {
        api_key: SecretString::from(api_key),
        model,
        api_base: optional_env(GEMINI_API_BASE),
    })
}

fn required_env(key: &'static str) -> Result<String, PreconditionError> {
    match optional_env(key) {
        Some(value) => Ok(value),
        None => {
            error!(variable = key, "Required environment variable missing");
            Err(PreconditionError::MissingEnv(key))
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
