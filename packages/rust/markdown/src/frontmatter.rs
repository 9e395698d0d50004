//! YAML metadata header at the top of an article document.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use pressroom_shared::ArticleMeta;

/// Header fields as written by authors.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FrontMatter {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub author: String,
    #[serde(alias = "date")]
    pub published: NaiveDate,
    #[serde(default, alias = "hero")]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Split off the slug and keep the descriptive part.
    pub(crate) fn into_meta(self) -> (Option<String>, ArticleMeta) {
        let meta = ArticleMeta {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            author: self.author.trim().to_string(),
            published: self.published,
            hero_image: self.hero_image.filter(|h| !h.trim().is_empty()),
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };
        (self.slug, meta)
    }
}

/// Split a document into its header YAML and body.
///
/// The header must open on the first line with `---` and close with a line
/// holding only `---`.
pub(crate) fn split(source: &str) -> Result<(&str, &str), String> {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^---[ \t]*\r?$").expect("valid regex"));

    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return Err("document does not start with a '---' metadata header".into());
    };

    let Some(close) = FENCE_RE.find(rest) else {
        return Err("metadata header is not terminated by '---'".into());
    };

    let yaml = &rest[..close.start()];
    let body = rest[close.end()..]
        .strip_prefix("\r\n")
        .or_else(|| rest[close.end()..].strip_prefix('\n'))
        .unwrap_or(&rest[close.end()..]);

    Ok((yaml, body))
}

/// Parse the header YAML.
pub(crate) fn parse(yaml: &str) -> Result<FrontMatter, String> {
    if yaml.trim().is_empty() {
        return Err("metadata header is empty".into());
    }
    serde_yaml::from_str(yaml).map_err(|e| format!("invalid metadata header: {e}"))
}
