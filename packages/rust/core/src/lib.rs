//! Content pipeline for Pressroom.
//!
//! `ContentStore -> ArticleRenderer -> build_toc -> output`: this crate holds
//! the read-only article store, the renderer, the outline builder, and the
//! static site writer that ties them together.

pub mod render;
pub mod site;
pub mod store;
pub mod toc;

pub use render::{
    ArticleRenderer, RenderOptions, RenderedArticle, RenderedHeading, RenderedSection,
    render_index, render_not_found, render_page,
};
pub use site::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_site, validate_site};
pub use store::{ContentStore, Neighbors};
pub use toc::build_toc;
