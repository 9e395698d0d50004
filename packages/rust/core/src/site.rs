//! Static site writer.
//!
//! Renders every article in a [`ContentStore`] and writes the result to an
//! output directory, along with the list page, a not-found page, per-article
//! outlines and a checksummed manifest.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use pressroom_shared::{
    CURRENT_SCHEMA_VERSION, PageRecord, PressroomError, Result, SiteConfig, SiteManifest,
};

use crate::render::{ArticleRenderer, render_index, render_not_found, render_page};
use crate::store::{ContentStore, Neighbors};

/// Manifest file name at the output root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Progress reporting callback for site builds.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each article page is written.
    fn article_written(&self, slug: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn article_written(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Inputs for a site build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory the site is written to. Created if missing.
    pub output_root: PathBuf,
    /// Site identity for page chrome.
    pub site: SiteConfig,
    /// Tool version recorded in the manifest.
    pub generator_version: String,
}

/// Output from a successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub output_root: PathBuf,
    pub article_count: usize,
    pub manifest: SiteManifest,
    pub elapsed: Duration,
}

/// Render and write the whole site.
///
/// Layout:
/// ```text
/// <output_root>/
/// ├── index.html
/// ├── 404.html
/// ├── manifest.json
/// └── <slug>/
///     ├── index.html
///     └── toc.json
/// ```
#[instrument(skip_all, fields(out = %config.output_root.display(), articles = store.len()))]
pub fn build_site(
    store: &ContentStore,
    renderer: &ArticleRenderer,
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    let root = &config.output_root;
    std::fs::create_dir_all(root).map_err(|e| PressroomError::io(root, e))?;

    info!(path = %root.display(), "building site");

    let mut pages = Vec::new();

    progress.phase("Rendering articles");
    let summaries = store.list();
    let total = summaries.len();
    for (i, summary) in summaries.iter().enumerate() {
        let article = store.get(&summary.slug)?;
        let neighbors = Neighbors {
            newer: i.checked_sub(1).map(|n| summaries[n].clone()),
            older: summaries.get(i + 1).cloned(),
        };
        let rendered = renderer.render(article);

        let page = render_page(&rendered, &config.site, &neighbors);
        let page_path = format!("{}/index.html", summary.slug);
        pages.push(write_page(root, &page_path, Some(summary.slug.as_str()), page.as_bytes())?);

        let toc_json = to_json(&rendered.toc)?;
        let toc_path = format!("{}/toc.json", summary.slug);
        pages.push(write_page(root, &toc_path, Some(summary.slug.as_str()), toc_json.as_bytes())?);

        progress.article_written(&summary.slug, i + 1, total);
    }

    progress.phase("Writing index");
    let index = render_index(&summaries, &config.site);
    pages.push(write_page(root, "index.html", None, index.as_bytes())?);
    let not_found = render_not_found(None, &config.site);
    pages.push(write_page(root, "404.html", None, not_found.as_bytes())?);

    let manifest = SiteManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        site_title: config.site.title.clone(),
        generator_version: config.generator_version.clone(),
        article_count: total,
        pages,
    };
    let manifest_json = to_json(&manifest)?;
    write_atomic(&root.join(MANIFEST_FILE), manifest_json.as_bytes())?;

    let result = BuildResult {
        output_root: root.clone(),
        article_count: total,
        manifest,
        elapsed: start.elapsed(),
    };

    info!(
        articles = total,
        files = result.manifest.pages.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "site build complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Verify that a built site matches its manifest.
pub fn validate_site(root: &Path) -> Result<SiteManifest> {
    let manifest_path = root.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(PressroomError::validation(format!("missing {MANIFEST_FILE}")));
    }

    let content = std::fs::read_to_string(&manifest_path)
        .map_err(|e| PressroomError::io(&manifest_path, e))?;
    let manifest: SiteManifest = serde_json::from_str(&content)
        .map_err(|e| PressroomError::validation(format!("invalid {MANIFEST_FILE}: {e}")))?;

    if manifest.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(PressroomError::validation(format!(
            "unsupported schema_version: {} (expected {})",
            manifest.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    for page in &manifest.pages {
        let path = root.join(&page.path);
        let bytes = std::fs::read(&path).map_err(|e| PressroomError::io(&path, e))?;
        if sha256_hex(&bytes) != page.sha256 {
            return Err(PressroomError::validation(format!(
                "{} does not match its manifest checksum",
                page.path
            )));
        }
    }

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_page(root: &Path, rel_path: &str, slug: Option<&str>, bytes: &[u8]) -> Result<PageRecord> {
    let target = root.join(rel_path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PressroomError::io(parent, e))?;
    }
    write_atomic(&target, bytes)?;
    debug!(path = rel_path, bytes = bytes.len(), "wrote page");

    Ok(PageRecord {
        slug: slug.map(String::from),
        path: rel_path.to_string(),
        sha256: sha256_hex(bytes),
        size_bytes: bytes.len(),
    })
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| PressroomError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| PressroomError::io(target, e))?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| PressroomError::Serialization(e.to_string()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use uuid::Uuid;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("pressroom_site_{}", Uuid::now_v7()))
    }

    fn store() -> ContentStore {
        let docs = [
            (
                "responsive-navbar.md",
                "---\ntitle: Responsive Navbar\nauthor: Sam\ndate: 2024-03-18\n---\n## Markup\n\nText.\n\n### Toggle\n\nMore.\n",
            ),
            (
                "sticky-header.md",
                "---\ntitle: Sticky Header\nauthor: Sam\ndate: 2024-01-05\n---\nJust prose.\n",
            ),
        ];
        let articles = docs
            .iter()
            .map(|(name, src)| pressroom_markdown::parse_article(src, Path::new(name)).unwrap());
        ContentStore::from_articles(articles).unwrap()
    }

    fn config(root: PathBuf) -> BuildConfig {
        BuildConfig {
            output_root: root,
            site: SiteConfig::default(),
            generator_version: "0.1.0".into(),
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        written: RefCell<Vec<(String, usize, usize)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn article_written(&self, slug: &str, current: usize, total: usize) {
            self.written.borrow_mut().push((slug.to_string(), current, total));
        }
        fn done(&self, _result: &BuildResult) {}
    }

    #[test]
    fn build_writes_expected_layout() {
        let root = temp_root();
        let result = build_site(
            &store(),
            &ArticleRenderer::default(),
            &config(root.clone()),
            &SilentProgress,
        )
        .expect("build");

        assert_eq!(result.article_count, 2);
        for rel in [
            "index.html",
            "404.html",
            "manifest.json",
            "responsive-navbar/index.html",
            "responsive-navbar/toc.json",
            "sticky-header/index.html",
        ] {
            assert!(root.join(rel).exists(), "missing {rel}");
        }

        let toc: pressroom_shared::Toc = serde_json::from_str(
            &std::fs::read_to_string(root.join("responsive-navbar/toc.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(toc.len(), 2);

        let index = std::fs::read_to_string(root.join("index.html")).unwrap();
        assert!(index.find("responsive-navbar/").unwrap() < index.find("sticky-header/").unwrap());

        let navbar = std::fs::read_to_string(root.join("responsive-navbar/index.html")).unwrap();
        assert!(navbar.contains("href=\"../sticky-header/\""));
        let sticky = std::fs::read_to_string(root.join("sticky-header/index.html")).unwrap();
        assert!(sticky.contains("href=\"../responsive-navbar/\""));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn build_is_byte_identical_across_runs() {
        let (a, b) = (temp_root(), temp_root());
        let first = build_site(&store(), &ArticleRenderer::default(), &config(a.clone()), &SilentProgress).unwrap();
        let second = build_site(&store(), &ArticleRenderer::default(), &config(b.clone()), &SilentProgress).unwrap();
        assert_eq!(first.manifest.pages, second.manifest.pages);

        let _ = std::fs::remove_dir_all(&a);
        let _ = std::fs::remove_dir_all(&b);
    }

    #[test]
    fn built_site_validates_and_detects_tampering() {
        let root = temp_root();
        build_site(&store(), &ArticleRenderer::default(), &config(root.clone()), &SilentProgress).unwrap();

        let manifest = validate_site(&root).expect("valid site");
        assert_eq!(manifest.article_count, 2);
        assert!(!root.join(".index.html.tmp").exists());

        std::fs::write(root.join("sticky-header/index.html"), "tampered").unwrap();
        let err = validate_site(&root).unwrap_err();
        assert!(err.to_string().contains("sticky-header/index.html"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn validate_requires_manifest() {
        let root = temp_root();
        std::fs::create_dir_all(&root).unwrap();
        let err = validate_site(&root).unwrap_err();
        assert!(err.to_string().contains("missing manifest.json"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn progress_reports_each_article() {
        let root = temp_root();
        let progress = RecordingProgress::default();
        build_site(&store(), &ArticleRenderer::default(), &config(root.clone()), &progress).unwrap();
        let _ = std::fs::remove_dir_all(&root);
        let written = progress.written.into_inner();
        assert_eq!(
            written,
            vec![
                ("responsive-navbar".to_string(), 1, 2),
                ("sticky-header".to_string(), 2, 2),
            ]
        );
    }

    #[test]
    fn empty_store_builds_index_only() {
        let root = temp_root();
        let result = build_site(
            &ContentStore::default(),
            &ArticleRenderer::default(),
            &config(root.clone()),
            &SilentProgress,
        )
        .unwrap();
        assert_eq!(result.article_count, 0);
        let index = std::fs::read_to_string(root.join("index.html")).unwrap();
        assert!(index.contains("No articles yet."));

        let _ = std::fs::remove_dir_all(&root);
    }
}
