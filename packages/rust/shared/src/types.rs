//! Core domain types for Pressroom articles.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current schema version for the site manifest format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// Descriptive metadata from an article's header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMeta {
    /// Display title.
    pub title: String,
    /// One or two sentence teaser shown on the list page.
    #[serde(default)]
    pub summary: String,
    /// Author display name.
    pub author: String,
    /// Publication date.
    pub published: NaiveDate,
    /// Path or URL of the hero image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    /// Free-form topic tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A heading inside an article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingBlock {
    /// Heading rank (1-6). `None` when the source carried no detectable level.
    pub level: Option<u8>,
    /// Display text with inline markup stripped.
    pub text: String,
    /// Anchor identifier, unique within the article.
    pub anchor: String,
}

/// A run of Markdown between two headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBlock {
    /// Raw Markdown source of the block.
    pub markdown: String,
}

/// One block of article content, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading(HeadingBlock),
    Body(BodyBlock),
}

/// A stored article. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique, URL-safe identifier.
    pub slug: String,
    /// Header metadata.
    pub meta: ArticleMeta,
    /// Ordered content blocks.
    pub blocks: Vec<ContentBlock>,
    /// File the article was loaded from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl Article {
    /// Iterate over the heading blocks in document order.
    pub fn headings(&self) -> impl Iterator<Item = &HeadingBlock> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::Heading(h) => Some(h),
            ContentBlock::Body(_) => None,
        })
    }

    /// Summary record for list pages.
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            slug: self.slug.clone(),
            title: self.meta.title.clone(),
            summary: self.meta.summary.clone(),
            author: self.meta.author.clone(),
            published: self.meta.published,
            hero_image: self.meta.hero_image.clone(),
            tags: self.meta.tags.clone(),
        }
    }
}

/// The list-page view of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub author: String,
    pub published: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// A single entry in an article outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display text.
    pub text: String,
    /// Anchor of the heading this entry links to.
    pub anchor: String,
    /// Effective heading level.
    pub level: u8,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

/// Root structure for an article outline (`toc.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    /// Top-level entries.
    pub entries: Vec<TocEntry>,
}

impl Toc {
    /// Total number of entries at all depths.
    pub fn len(&self) -> usize {
        fn count(entries: &[TocEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in document order, paired with their nesting depth (0 = root).
    pub fn flatten(&self) -> Vec<(usize, &TocEntry)> {
        fn walk<'a>(entries: &'a [TocEntry], depth: usize, out: &mut Vec<(usize, &'a TocEntry)>) {
            for entry in entries {
                out.push((depth, entry));
                walk(&entry.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.entries, 0, &mut out);
        out
    }
}

// ---------------------------------------------------------------------------
// SiteManifest
// ---------------------------------------------------------------------------

/// One generated page, recorded in `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Article slug, or `None` for site-level pages (index, 404).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Path relative to the output root.
    pub path: String,
    /// SHA-256 of the written bytes.
    pub sha256: String,
    pub size_bytes: usize,
}

/// The `manifest.json` written at the root of a built site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Site title at build time.
    pub site_title: String,
    /// Tool version that produced the site.
    pub generator_version: String,
    /// Number of articles rendered.
    pub article_count: usize,
    /// Every file written, in write order.
    pub pages: Vec<PageRecord>,
}
