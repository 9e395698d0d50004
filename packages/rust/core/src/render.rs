//! Article renderer.
//!
//! Turns a stored [`Article`] into display-ready sections (anchored heading +
//! body HTML), an outline, and reading statistics, and lays those out as
//! complete HTML pages. Rendering is a pure function of its inputs: the same
//! article and options always produce the same bytes.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, instrument};

use pressroom_shared::{Article, ArticleMeta, ArticleSummary, ContentBlock, RenderConfig, SiteConfig, Toc, TocEntry};

use crate::store::Neighbors;
use crate::toc::{build_toc, effective_level, shallowest_level};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options controlling article rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Outline depth; `None` keeps every level.
    pub toc_depth: Option<u8>,
    /// Reading speed for the reading-time estimate. Must be non-zero.
    pub words_per_minute: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            toc_depth: Some(config.toc_depth).filter(|d| *d > 0),
            words_per_minute: config.words_per_minute.max(1),
        }
    }
}

/// A heading annotated with its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedHeading {
    pub level: Option<u8>,
    pub text: String,
    pub anchor: String,
}

/// One display section: an optional heading and the body that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    /// `None` only for text that precedes the first heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<RenderedHeading>,
    /// Body HTML, possibly empty.
    pub html: String,
}

/// The display-ready form of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedArticle {
    pub slug: String,
    pub meta: ArticleMeta,
    pub sections: Vec<RenderedSection>,
    pub toc: Toc,
    pub word_count: usize,
    pub reading_minutes: u32,
}

impl RenderedArticle {
    /// Headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &RenderedHeading> {
        self.sections.iter().filter_map(|s| s.heading.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders articles. Holds only options, never article state.
#[derive(Debug, Clone, Default)]
pub struct ArticleRenderer {
    options: RenderOptions,
}

impl ArticleRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render an article into sections, outline and statistics.
    #[instrument(skip_all, fields(slug = %article.slug))]
    pub fn render(&self, article: &Article) -> RenderedArticle {
        let mut sections: Vec<RenderedSection> = Vec::new();
        let mut current: Option<RenderedSection> = None;
        let mut word_count = 0;

        for block in &article.blocks {
            match block {
                ContentBlock::Heading(heading) => {
                    sections.extend(current.take());
                    word_count += heading.text.split_whitespace().count();
                    current = Some(RenderedSection {
                        heading: Some(RenderedHeading {
                            level: heading.level,
                            text: heading.text.clone(),
                            anchor: heading.anchor.clone(),
                        }),
                        html: String::new(),
                    });
                }
                ContentBlock::Body(body) => {
                    word_count += pressroom_markdown::count_words(&body.markdown);
                    let section = current.get_or_insert_with(|| RenderedSection {
                        heading: None,
                        html: String::new(),
                    });
                    section
                        .html
                        .push_str(&pressroom_markdown::render_html(&body.markdown));
                }
            }
        }
        sections.extend(current);

        let headings: Vec<RenderedHeading> =
            sections.iter().filter_map(|s| s.heading.clone()).collect();
        let toc = build_toc(&headings, self.options.toc_depth);
        let reading_minutes = reading_minutes(word_count, self.options.words_per_minute);

        debug!(
            sections = sections.len(),
            toc_entries = toc.len(),
            word_count,
            "article rendered"
        );

        RenderedArticle {
            slug: article.slug.clone(),
            meta: article.meta.clone(),
            sections,
            toc,
            word_count,
            reading_minutes,
        }
    }
}

/// Minutes to read `words` at `per_minute`, rounded up, at least one.
fn reading_minutes(words: usize, per_minute: u32) -> u32 {
    let per_minute = per_minute.max(1) as usize;
    words.div_ceil(per_minute).max(1) as u32
}

// ---------------------------------------------------------------------------
// HTML pages
// ---------------------------------------------------------------------------

/// Lay out a rendered article as a complete HTML document.
///
/// Links are relative so the page works from `<root>/<slug>/index.html`
/// under any base path.
pub fn render_page(article: &RenderedArticle, site: &SiteConfig, neighbors: &Neighbors) -> String {
    let mut out = String::new();
    let title = format!("{} | {}", article.meta.title, site.title);
    let canonical = site.canonical_url(&format!("{}/", article.slug));
    push_head(&mut out, &title, &article.meta.summary, canonical.as_deref());

    let _ = writeln!(
        out,
        "<header class=\"site-header\"><a href=\"../\">{}</a></header>",
        escape_html(&site.title)
    );
    out.push_str("<main>\n<article>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape_html(&article.meta.title));
    let _ = writeln!(
        out,
        "<p class=\"byline\">By {} &middot; <time datetime=\"{}\">{}</time> &middot; {} min read</p>",
        escape_html(&article.meta.author),
        article.meta.published.format("%Y-%m-%d"),
        article.meta.published.format("%B %-d, %Y"),
        article.reading_minutes
    );
    if let Some(hero) = &article.meta.hero_image {
        let _ = writeln!(
            out,
            "<img class=\"hero\" src=\"{}\" alt=\"{}\">",
            escape_html(hero),
            escape_html(&article.meta.title)
        );
    }

    if !article.toc.is_empty() {
        out.push_str("<nav class=\"toc\" aria-label=\"Table of contents\">\n");
        push_toc_list(&mut out, &article.toc.entries);
        out.push_str("</nav>\n");
    }

    let headings: Vec<RenderedHeading> = article.headings().cloned().collect();
    let shallowest = shallowest_level(&headings);
    for section in &article.sections {
        out.push_str("<section>\n");
        if let Some(heading) = &section.heading {
            let level = effective_level(heading, shallowest).clamp(1, 6);
            let anchor = escape_html(&heading.anchor);
            let _ = writeln!(
                out,
                "<h{level} id=\"{anchor}\"><a href=\"#{anchor}\">{}</a></h{level}>",
                escape_html(&heading.text)
            );
        }
        out.push_str(&section.html);
        out.push_str("</section>\n");
    }
    out.push_str("</article>\n");

    if neighbors.newer.is_some() || neighbors.older.is_some() {
        out.push_str("<nav class=\"pager\">\n");
        if let Some(newer) = &neighbors.newer {
            let _ = writeln!(
                out,
                "<a rel=\"prev\" href=\"../{}/\">&larr; {}</a>",
                escape_html(&newer.slug),
                escape_html(&newer.title)
            );
        }
        if let Some(older) = &neighbors.older {
            let _ = writeln!(
                out,
                "<a rel=\"next\" href=\"../{}/\">{} &rarr;</a>",
                escape_html(&older.slug),
                escape_html(&older.title)
            );
        }
        out.push_str("</nav>\n");
    }

    out.push_str("</main>\n");
    push_tail(&mut out);
    out
}

/// Lay out the list page, in the order given (newest first from the store).
pub fn render_index(articles: &[ArticleSummary], site: &SiteConfig) -> String {
    let mut out = String::new();
    let canonical = site.canonical_url("");
    push_head(&mut out, &site.title, &site.description, canonical.as_deref());

    out.push_str("<main>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape_html(&site.title));
    if !site.description.is_empty() {
        let _ = writeln!(out, "<p class=\"lead\">{}</p>", escape_html(&site.description));
    }

    if articles.is_empty() {
        out.push_str("<p class=\"empty\">No articles yet.</p>\n");
    } else {
        out.push_str("<ul class=\"articles\">\n");
        for article in articles {
            out.push_str("<li>\n");
            let _ = writeln!(
                out,
                "<a href=\"{}/\"><h2>{}</h2></a>",
                escape_html(&article.slug),
                escape_html(&article.title)
            );
            let _ = writeln!(
                out,
                "<p class=\"byline\">{} &middot; <time datetime=\"{}\">{}</time></p>",
                escape_html(&article.author),
                article.published.format("%Y-%m-%d"),
                article.published.format("%B %-d, %Y")
            );
            if !article.summary.is_empty() {
                let _ = writeln!(out, "<p>{}</p>", escape_html(&article.summary));
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</main>\n");
    push_tail(&mut out);
    out
}

/// The page shown when a slug has no article.
pub fn render_not_found(slug: Option<&str>, site: &SiteConfig) -> String {
    let mut out = String::new();
    push_head(&mut out, &format!("Page not found | {}", site.title), "", None);
    out.push_str("<main>\n<h1>Page not found</h1>\n");
    match slug {
        Some(slug) => {
            let _ = writeln!(
                out,
                "<p>There is no article called <code>{}</code>.</p>",
                escape_html(slug)
            );
        }
        None => out.push_str("<p>The page you asked for does not exist.</p>\n"),
    }
    let home = site.canonical_url("").unwrap_or_else(|| "./".to_string());
    let _ = writeln!(
        out,
        "<p><a href=\"{}\">Back to all articles</a></p>",
        escape_html(&home)
    );
    out.push_str("</main>\n");
    push_tail(&mut out);
    out
}

fn push_head(out: &mut String, title: &str, description: &str, canonical: Option<&str>) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    if !description.is_empty() {
        let _ = writeln!(
            out,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        );
    }
    if let Some(url) = canonical {
        let _ = writeln!(out, "<link rel=\"canonical\" href=\"{}\">", escape_html(url));
    }
    out.push_str("</head>\n<body>\n");
}

fn push_tail(out: &mut String) {
    out.push_str("</body>\n</html>\n");
}

fn push_toc_list(out: &mut String, entries: &[TocEntry]) {
    out.push_str("<ul>\n");
    for entry in entries {
        let _ = write!(
            out,
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&entry.anchor),
            escape_html(&entry.text)
        );
        if !entry.children.is_empty() {
            out.push('\n');
            push_toc_list(out, &entry.children);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

/// Escape text for HTML element content and double-quoted attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
