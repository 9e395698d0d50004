//! Read-only article store.
//!
//! [`ContentStore`] owns every loaded [`Article`] and hands out shared
//! references. It is built once (from a directory or a list of articles)
//! and never mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use pressroom_shared::{Article, ArticleSummary, PressroomError, Result};

/// File extensions treated as article documents.
const ARTICLE_EXTENSIONS: &[&str] = &["md", "markdown"];

/// The articles adjacent to one article in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// The next more recent article.
    pub newer: Option<ArticleSummary>,
    /// The next older article.
    pub older: Option<ArticleSummary>,
}

/// Articles keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    articles: BTreeMap<String, Article>,
}

impl ContentStore {
    /// Build a store from already-parsed articles.
    ///
    /// Fails with a validation error if a slug is not URL-safe, two articles
    /// share a slug, or an article repeats a heading anchor.
    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for article in articles {
            validate_article(&article)?;
            if let Some(existing) = map.get(&article.slug) {
                return Err(duplicate_slug(&article.slug, existing, &article));
            }
            map.insert(article.slug.clone(), article);
        }
        Ok(Self { articles: map })
    }

    /// Load every article document directly inside `dir`.
    ///
    /// Subdirectories and files with other extensions are ignored. Files are
    /// parsed in name order so errors are reported deterministically.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| PressroomError::io(dir, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PressroomError::io(dir, e))?;
            let path = entry.path();
            if path.is_file() && is_article_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut articles = Vec::with_capacity(paths.len());
        for path in &paths {
            let source =
                std::fs::read_to_string(path).map_err(|e| PressroomError::io(path, e))?;
            let article = pressroom_markdown::parse_article(&source, path)?;
            debug!(slug = %article.slug, path = %path.display(), "loaded article");
            articles.push(article);
        }

        let store = Self::from_articles(articles)?;
        info!(articles = store.len(), "content store loaded");
        Ok(store)
    }

    /// Look up an article by slug.
    pub fn get(&self, slug: &str) -> Result<&Article> {
        self.articles
            .get(slug)
            .ok_or_else(|| PressroomError::not_found(slug))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.articles.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// All article summaries, most recently published first.
    ///
    /// Articles published on the same day are ordered by slug.
    pub fn list(&self) -> Vec<ArticleSummary> {
        let mut summaries: Vec<ArticleSummary> =
            self.articles.values().map(Article::summary).collect();
        summaries.sort_by(|a, b| {
            b.published
                .cmp(&a.published)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        summaries
    }

    /// Articles carrying `tag` (case-insensitive), in list order.
    pub fn by_tag(&self, tag: &str) -> Vec<ArticleSummary> {
        let wanted = tag.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t.to_lowercase() == wanted))
            .collect()
    }

    /// The articles on either side of `slug` in list order.
    pub fn neighbors(&self, slug: &str) -> Result<Neighbors> {
        if !self.contains(slug) {
            return Err(PressroomError::not_found(slug));
        }

        let list = self.list();
        let Some(pos) = list.iter().position(|s| s.slug == slug) else {
            return Err(PressroomError::not_found(slug));
        };

        Ok(Neighbors {
            newer: pos.checked_sub(1).map(|i| list[i].clone()),
            older: list.get(pos + 1).cloned(),
        })
    }

    /// Iterate over articles in slug order.
    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.values()
    }
}

fn is_article_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ARTICLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Slugs become output directory names and anchors become fragment
/// targets, so both are checked before an article enters the store.
fn validate_article(article: &Article) -> Result<()> {
    if article.slug.is_empty() {
        return Err(PressroomError::validation(format!(
            "article '{}' has an empty slug",
            article.meta.title
        )));
    }
    if !pressroom_markdown::is_valid_slug(&article.slug) {
        return Err(PressroomError::validation(format!(
            "invalid slug '{}' for article '{}'",
            article.slug, article.meta.title
        )));
    }

    let mut seen = HashSet::new();
    for heading in article.headings() {
        if !seen.insert(heading.anchor.as_str()) {
            return Err(PressroomError::validation(format!(
                "duplicate heading anchor '#{}' in {}",
                heading.anchor, article.slug
            )));
        }
    }
    Ok(())
}

fn duplicate_slug(slug: &str, first: &Article, second: &Article) -> PressroomError {
    let origin = |a: &Article| {
        a.source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| a.meta.title.clone())
    };
    PressroomError::validation(format!(
        "duplicate slug '{slug}' ({} and {})",
        origin(first),
        origin(second)
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
