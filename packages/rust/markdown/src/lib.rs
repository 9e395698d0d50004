//! Article document parsing and Markdown rendering.
//!
//! Turns an article document (YAML metadata header + Markdown body) into an
//! [`Article`] made of heading and body blocks, and renders Markdown to HTML
//! with `pulldown-cmark`. Anchors are assigned here, once, at load time, so
//! every later render of the article sees the same identifiers.

mod anchors;
mod cleanup;
mod frontmatter;

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use tracing::{debug, instrument};

use pressroom_shared::{Article, BodyBlock, ContentBlock, HeadingBlock, PressroomError, Result};

pub use anchors::{is_valid_slug, slugify};

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a complete article document.
///
/// `path` is used for error messages and, when the header carries no `slug`,
/// its file stem becomes the slug.
#[instrument(skip(source), fields(path = %path.display()))]
pub fn parse_article(source: &str, path: &Path) -> Result<Article> {
    let (yaml, body) = frontmatter::split(source).map_err(|m| PressroomError::parse(path, m))?;
    let front = frontmatter::parse(yaml).map_err(|m| PressroomError::parse(path, m))?;

    let (explicit_slug, meta) = front.into_meta();
    if meta.title.is_empty() {
        return Err(PressroomError::parse(path, "title must not be empty"));
    }
    let slug = resolve_slug(explicit_slug, path)?;

    let body = cleanup::run_pipeline(body);
    let blocks = split_blocks(&body)
        .map_err(|m| PressroomError::validation(format!("{}: {m}", path.display())))?;

    debug!(
        slug = %slug,
        blocks = blocks.len(),
        published = %meta.published,
        "article parsed"
    );

    Ok(Article {
        slug,
        meta,
        blocks,
        source_path: Some(path.to_path_buf()),
    })
}

/// Split a Markdown body into heading and body blocks with anchors assigned.
///
/// Fails with a validation error when two headings carry the same explicit
/// `{#id}`.
pub fn parse_blocks(body: &str) -> Result<Vec<ContentBlock>> {
    let body = cleanup::run_pipeline(body);
    split_blocks(&body).map_err(PressroomError::validation)
}

fn resolve_slug(explicit: Option<String>, path: &Path) -> Result<String> {
    if let Some(slug) = explicit {
        let slug = slug.trim().to_string();
        if !is_valid_slug(&slug) {
            return Err(PressroomError::parse(
                path,
                format!("slug '{slug}' must be lowercase words separated by single dashes"),
            ));
        }
        return Ok(slug);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let slug = slugify(&stem);
    if slug.is_empty() {
        return Err(PressroomError::parse(
            path,
            "cannot derive a slug from the file name; set `slug` in the header",
        ));
    }
    Ok(slug)
}

/// A top-level heading found while scanning the body.
struct RawHeading {
    level: u8,
    explicit_id: Option<String>,
    text: String,
    range: Range<usize>,
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Scan top-level headings; headings nested in quotes or lists stay body text.
fn scan_headings(body: &str) -> Vec<RawHeading> {
    let mut headings = Vec::new();
    let mut current: Option<RawHeading> = None;
    let mut depth = 0usize;

    for (event, range) in Parser::new_ext(body, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    if let Tag::Heading { level, id, .. } = tag {
                        current = Some(RawHeading {
                            level: level as u8,
                            explicit_id: id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                            text: String::new(),
                            range,
                        });
                    }
                }
                depth += 1;
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && matches!(end, TagEnd::Heading(_)) {
                    if let Some(heading) = current.take() {
                        headings.push(heading);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push(' ');
                }
            }
            _ => {}
        }
    }

    for heading in &mut headings {
        heading.text = heading.text.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    headings
}

fn split_blocks(body: &str) -> std::result::Result<Vec<ContentBlock>, String> {
    let headings = scan_headings(body);

    let mut allocator = anchors::AnchorAllocator::default();
    allocator
        .reserve_explicit(headings.iter().filter_map(|h| h.explicit_id.as_deref()))
        .map_err(|id| format!("duplicate heading anchor '#{id}'"))?;

    let mut blocks = Vec::with_capacity(headings.len() * 2 + 1);
    let mut cursor = 0;

    for heading in headings {
        push_body(&mut blocks, &body[cursor..heading.range.start]);

        let anchor = match heading.explicit_id {
            Some(id) => id,
            None => allocator.derive(&heading.text),
        };
        blocks.push(ContentBlock::Heading(HeadingBlock {
            level: Some(heading.level),
            text: heading.text,
            anchor,
        }));
        cursor = heading.range.end;
    }
    push_body(&mut blocks, &body[cursor..]);

    Ok(blocks)
}

fn push_body(blocks: &mut Vec<ContentBlock>, slice: &str) {
    let markdown = slice.trim_start_matches('\n').trim_end();
    if !markdown.is_empty() {
        blocks.push(ContentBlock::Body(BodyBlock {
            markdown: markdown.to_string(),
        }));
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// Render a Markdown fragment to HTML.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Count words in Markdown prose (excluding fenced code samples).
pub fn count_words(md: &str) -> usize {
    static CODE_BLOCK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?ms)^\s*(```|~~~).*?^\s*(```|~~~)").expect("valid regex"));

    let without_code = CODE_BLOCK_RE.replace_all(md, "");
    without_code
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const NAVBAR: &str = r#"---
title: Build a Responsive Navbar
summary: A navbar that turns into a drawer on small screens.
author: Sam Rivera
date: 2024-03-18
hero: /images/navbar.png
tags: [css, layout]
---
Navigation is the first thing readers touch.

## Markup

Start with a semantic `nav` element.

```html
<nav class="navbar">
  <a href="/">Home</a>
</nav>

## Not a heading, this is inside the sample
```

### The toggle button

A button opens the drawer.

### Drawer panel {#drawer}

Slide it in from the side.

## Styling

Use a media query.
"#;

    fn headings(blocks: &[ContentBlock]) -> Vec<(Option<u8>, String, String)> {
        blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Heading(h) => Some((h.level, h.text.clone(), h.anchor.clone())),
                ContentBlock::Body(_) => None,
            })
            .collect()
    }

    #[test]
    fn parse_article_reads_header_and_blocks() {
        let article = parse_article(NAVBAR, Path::new("content/responsive-navbar.md")).unwrap();

        assert_eq!(article.slug, "responsive-navbar");
        assert_eq!(article.meta.title, "Build a Responsive Navbar");
        assert_eq!(article.meta.author, "Sam Rivera");
        assert_eq!(article.meta.published, NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
        assert_eq!(article.meta.hero_image.as_deref(), Some("/images/navbar.png"));

        assert_eq!(
            headings(&article.blocks),
            vec![
                (Some(2), "Markup".to_string(), "markup".to_string()),
                (Some(3), "The toggle button".to_string(), "the-toggle-button".to_string()),
                (Some(3), "Drawer panel".to_string(), "drawer".to_string()),
                (Some(2), "Styling".to_string(), "styling".to_string()),
            ]
        );
    }

    #[test]
    fn headings_inside_code_stay_in_body() {
        let article = parse_article(NAVBAR, Path::new("responsive-navbar.md")).unwrap();
        let code_block = article
            .blocks
            .iter()
            .find_map(|b| match b {
                ContentBlock::Body(body) if body.markdown.contains("```html") => Some(body),
                _ => None,
            })
            .expect("code sample body block");
        assert!(code_block.markdown.contains("## Not a heading"));
    }

    #[test]
    fn nested_fence_sample_keeps_blank_lines() {
        let blocks =
            parse_blocks("~~~markdown\n```js\nconst a = 1;\n\n\n\nconst b = 2;\n```\n~~~\n").unwrap();
        match blocks.as_slice() {
            [ContentBlock::Body(body)] => {
                assert!(body.markdown.contains("const a = 1;\n\n\n\nconst b = 2;"))
            }
            other => panic!("expected one body block, got {other:?}"),
        }
    }

    #[test]
    fn intro_before_first_heading_is_a_body_block() {
        let article = parse_article(NAVBAR, Path::new("responsive-navbar.md")).unwrap();
        match &article.blocks[0] {
            ContentBlock::Body(body) => {
                assert_eq!(body.markdown, "Navigation is the first thing readers touch.")
            }
            other => panic!("expected body block, got {other:?}"),
        }
    }

    #[test]
    fn explicit_slug_wins_over_file_name() {
        let doc = "---\ntitle: A\nauthor: B\ndate: 2024-01-01\nslug: custom-slug\n---\nText\n";
        let article = parse_article(doc, Path::new("Some File.md")).unwrap();
        assert_eq!(article.slug, "custom-slug");

        let doc = "---\ntitle: A\nauthor: B\ndate: 2024-01-01\n---\nText\n";
        let article = parse_article(doc, Path::new("Some_File.md")).unwrap();
        assert_eq!(article.slug, "some-file");
    }

    #[test]
    fn invalid_explicit_slug_is_a_parse_error() {
        let doc = "---\ntitle: A\nauthor: B\ndate: 2024-01-01\nslug: Not Valid\n---\n";
        let err = parse_article(doc, Path::new("a.md")).unwrap_err();
        assert!(matches!(err, PressroomError::Parse { .. }));
        assert!(err.to_string().contains("Not Valid"));
    }

    #[test]
    fn invalid_date_is_a_parse_error() {
        let doc = "---\ntitle: A\nauthor: B\ndate: 2024-13-01\n---\nText\n";
        let err = parse_article(doc, Path::new("a.md")).unwrap_err();
        assert!(matches!(err, PressroomError::Parse { .. }));
    }

    #[test]
    fn duplicate_derived_anchors_get_suffixes() {
        let blocks = parse_blocks("## Example\n\none\n\n## Example\n\ntwo\n\n## Example\n").unwrap();
        let anchors: Vec<_> = headings(&blocks).into_iter().map(|h| h.2).collect();
        assert_eq!(anchors, vec!["example", "example-1", "example-2"]);
    }

    #[test]
    fn duplicate_explicit_anchors_are_rejected() {
        let err = parse_blocks("## One {#same}\n\n## Two {#same}\n").unwrap_err();
        assert!(matches!(err, PressroomError::Validation { .. }));
        assert!(err.to_string().contains("#same"));
    }

    #[test]
    fn setext_and_inline_code_headings() {
        let blocks = parse_blocks("Overview\n========\n\n## Using `flex-wrap`\n").unwrap();
        assert_eq!(
            headings(&blocks),
            vec![
                (Some(1), "Overview".to_string(), "overview".to_string()),
                (Some(2), "Using flex-wrap".to_string(), "using-flex-wrap".to_string()),
            ]
        );
    }

    #[test]
    fn quoted_headings_are_not_split() {
        let blocks = parse_blocks("> ## Tip\n> Use rem units.\n\n## Real\n").unwrap();
        assert_eq!(headings(&blocks).len(), 1);
        match &blocks[0] {
            ContentBlock::Body(body) => assert!(body.markdown.contains("> ## Tip")),
            other => panic!("expected body block, got {other:?}"),
        }
    }

    #[test]
    fn render_html_keeps_code_language() {
        let html = render_html("```css\n.nav { display: flex; }\n```\n");
        assert!(html.contains("<code class=\"language-css\">"));
        assert!(html.contains(".nav { display: flex; }"));
    }

    #[test]
    fn word_count_excludes_code_blocks() {
        let md = "One two three.\n\n```js\nlots of code words that should not be counted\n```\n";
        assert_eq!(count_words(md), 3);
    }
}
