use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use spec_publish::load_config::{
    gemini_settings_from_env, load_config, notion_settings_from_env, GEMINI_API_KEY, GEMINI_MODEL,
    NOTION_PARENT_PAGE_ID, NOTION_TOKEN,
};
use spec_publish_core::contract::PageId;
use spec_publish_core::error::PreconditionError;
use spec_publish_core::render::Locale;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
fn no_config_file_yields_defaults() {
    let config = load_config(None).expect("defaults load");

    assert_eq!(config.source.dir, PathBuf::from("server/graphql"));
    assert_eq!(config.source.extension, "graphql");
    assert_eq!(config.tree_path, PathBuf::from("specs/api_spec_structured.json"));
    assert_eq!(config.render.locale, Locale::Ja);

    let publish = config.publish_config(PageId::new("parent")).unwrap();
    assert_eq!(publish.limits.max_blocks_per_call(), 100);
    assert_eq!(publish.limits.max_block_text(), 2000);
}

#[test]
fn partial_config_overrides_only_given_keys() {
    let file = config_file(
        r#"
source:
  dir: schema
tree_path: out/tree.json
render:
  locale: en
limits:
  max_blocks_per_call: 50
"#,
    );
    let config = load_config(Some(file.path())).expect("config loads");

    let generate = config.generate_config();
    assert_eq!(generate.source_dir, PathBuf::from("schema"));
    assert_eq!(generate.extension, "graphql");
    assert_eq!(generate.tree_path, PathBuf::from("out/tree.json"));

    let publish = config.publish_config(PageId::new("parent")).unwrap();
    assert_eq!(publish.locale, Locale::En);
    assert_eq!(publish.example_language, "graphql");
    assert_eq!(publish.limits.max_blocks_per_call(), 50);
    assert_eq!(publish.limits.max_block_text(), 2000);
    assert_eq!(publish.parent_page, PageId::new("parent"));
}

#[test]
fn empty_config_file_yields_defaults() {
    let file = config_file("");
    let config = load_config(Some(file.path())).expect("empty file loads");
    assert_eq!(config.source.extension, "graphql");
}

#[test]
fn zero_limits_are_rejected() {
    let file = config_file("limits:\n  max_block_text: 0\n");
    let config = load_config(Some(file.path())).expect("config parses");

    let err = config.publish_config(PageId::new("parent")).unwrap_err();
    assert!(matches!(err, PreconditionError::Invalid(_)), "{err:?}");
}

#[test]
fn missing_or_malformed_config_file_is_an_error() {
    assert!(load_config(Some(Path::new("does/not/exist.yaml"))).is_err());

    let file = config_file("render:\n  locale: klingon\n");
    assert!(load_config(Some(file.path())).is_err());
}

#[test]
#[serial]
fn notion_settings_require_token_and_parent() {
    env::remove_var(NOTION_TOKEN);
    env::set_var(NOTION_PARENT_PAGE_ID, "parent-123");
    let err = notion_settings_from_env().unwrap_err();
    assert!(matches!(err, PreconditionError::MissingEnv(NOTION_TOKEN)));

    env::set_var(NOTION_TOKEN, "secret_token");
    env::set_var(NOTION_PARENT_PAGE_ID, "   ");
    let err = notion_settings_from_env().unwrap_err();
    assert!(matches!(err, PreconditionError::MissingEnv(NOTION_PARENT_PAGE_ID)));

    env::set_var(NOTION_PARENT_PAGE_ID, "parent-123");
    let settings = notion_settings_from_env().expect("settings load");
    assert_eq!(settings.parent_page, PageId::new("parent-123"));
    assert!(!format!("{settings:?}").contains("secret_token"));

    env::remove_var(NOTION_TOKEN);
    env::remove_var(NOTION_PARENT_PAGE_ID);
}

#[test]
#[serial]
fn gemini_settings_require_api_key() {
    env::remove_var(GEMINI_API_KEY);
    let err = gemini_settings_from_env().unwrap_err();
    assert!(matches!(err, PreconditionError::MissingEnv(GEMINI_API_KEY)));

    env::set_var(GEMINI_API_KEY, "key");
    env::set_var(GEMINI_MODEL, "gemini-1.5-pro");
    let settings = gemini_settings_from_env().expect("settings load");
    assert_eq!(settings.model.as_deref(), Some("gemini-1.5-pro"));

    env::remove_var(GEMINI_API_KEY);
    env::remove_var(GEMINI_MODEL);
}
