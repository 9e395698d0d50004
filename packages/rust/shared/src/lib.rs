//! Shared types, error model, and configuration for Pressroom.
//!
//! This crate is the foundation depended on by all other Pressroom crates.
//! It provides:
//! - [`PressroomError`]: the unified error type
//! - Domain types ([`Article`], [`HeadingBlock`], [`TocEntry`], [`SiteManifest`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, RenderConfig, SiteConfig, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from, validate_config,
};
pub use error::{PressroomError, Result};
pub use types::{
    Article, ArticleMeta, ArticleSummary, BodyBlock, CURRENT_SCHEMA_VERSION, ContentBlock,
    HeadingBlock, PageRecord, SiteManifest, Toc, TocEntry,
};
