//! Application configuration for Pressroom.
//!
//! User config lives at `~/.pressroom/pressroom.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PressroomError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pressroom.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pressroom";

// ---------------------------------------------------------------------------
// Config structs (matching pressroom.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site identity.
    #[serde(default)]
    pub site: SiteConfig,

    /// Where content is read from and written to.
    #[serde(default)]
    pub content: ContentConfig,

    /// Rendering knobs.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Title shown on the list page and in every `<title>`.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// Public base URL, used for canonical links. Optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Short description for the list page.
    #[serde(default)]
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            base_url: None,
            description: String::new(),
        }
    }
}

impl SiteConfig {
    /// Absolute URL for a site-relative path, if a base URL is configured.
    pub fn canonical_url(&self, path: &str) -> Option<String> {
        let base = Url::parse(self.base_url.as_deref()?).ok()?;
        base.join(path.trim_start_matches('/')).ok().map(String::from)
    }
}

fn default_site_title() -> String {
    "Pressroom".into()
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding the article documents.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Directory the static site is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_content_dir() -> String {
    "content".into()
}
fn default_output_dir() -> String {
    "public".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Number of heading levels shown in the outline, counted from the
    /// shallowest heading. `0` shows every level.
    #[serde(default = "default_toc_depth")]
    pub toc_depth: u8,

    /// Reading speed used for the reading-time estimate.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            toc_depth: default_toc_depth(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

fn default_toc_depth() -> u8 {
    3
}
fn default_words_per_minute() -> u32 {
    200
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pressroom/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PressroomError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pressroom/pressroom.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PressroomError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PressroomError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, replacing whatever is there.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| PressroomError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PressroomError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| PressroomError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Reject values that would make rendering meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if let Some(base) = &config.site.base_url {
        Url::parse(base)
            .map_err(|e| PressroomError::config(format!("invalid site.base_url '{base}': {e}")))?;
    }
    if config.render.words_per_minute == 0 {
        return Err(PressroomError::config(
            "render.words_per_minute must be greater than zero",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("content_dir"));
        assert!(toml_str.contains("words_per_minute"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.render.toc_depth, 3);
        assert_eq!(parsed.content.output_dir, "public");
        assert_eq!(parsed.site.title, "Pressroom");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
title = "Frontend Notes"
base_url = "https://notes.example.com/blog/"

[render]
toc_depth = 2
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.title, "Frontend Notes");
        assert_eq!(config.render.toc_depth, 2);
        assert_eq!(config.render.words_per_minute, 200);
        assert_eq!(config.content.content_dir, "content");
        validate_config(&config).expect("valid");
    }

    #[test]
    fn canonical_url_joins_base() {
        let site = SiteConfig {
            base_url: Some("https://notes.example.com/blog/".into()),
            ..SiteConfig::default()
        };
        assert_eq!(
            site.canonical_url("/responsive-navbar/").as_deref(),
            Some("https://notes.example.com/blog/responsive-navbar/")
        );
        assert_eq!(SiteConfig::default().canonical_url("/x/"), None);
    }

    #[test]
    fn init_config_at_replaces_broken_file() {
        let dir = std::env::temp_dir().join(format!("pressroom_config_{}", Uuid::now_v7()));
        let path = dir.join("nested").join("pressroom.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[site\nbroken = ").unwrap();
        assert!(load_config_from(&path).is_err());

        init_config_at(&path).expect("init");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.site.title, "Pressroom");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.site.base_url = Some("not a url".into());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("base_url"));

        let mut config = AppConfig::default();
        config.render.words_per_minute = 0;
        assert!(validate_config(&config).is_err());
    }
}
