//! Pre-parse normalization for article bodies.
//!
//! Each pass is a function `&str -> String` applied in sequence, so that
//! authoring noise (CRLF files, runs of blank lines, class-style fence
//! languages) never reaches the block splitter or the HTML output.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on a raw Markdown body.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = normalize_line_endings(&result);
    result = fix_code_block_languages(&result);
    result = clean_blank_lines(&result);
    result = ensure_trailing_newline(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR line endings to LF.
fn normalize_line_endings(md: &str) -> String {
    md.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Fix code block language hints
// ---------------------------------------------------------------------------

/// Strip class-like prefixes from fence info strings.
///
/// Handles patterns like `language-js`, `lang-python`, `highlight-rust`.
fn fix_code_block_languages(md: &str) -> String {
    static LANG_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^(\s*(?:```|~~~))(?:language-|lang-|highlight-)(\w+)")
            .expect("valid regex")
    });

    LANG_PREFIX_RE.replace_all(md, "$1$2").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Clean up excessive blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of blank lines outside code fences into a single blank line.
///
/// Fenced code samples are copied verbatim; blank lines there are content.
/// A fence only closes on a run of the same character at least as long as
/// the one that opened it, so a ```` ``` ```` sample inside `~~~` stays intact.
fn clean_blank_lines(md: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut open_fence: Option<(char, usize)> = None;
    let mut previous_blank = false;

    for line in md.lines() {
        if let Some((fence_char, fence_len)) = open_fence {
            if let Some((c, len, rest)) = fence_marker(line) {
                if c == fence_char && len >= fence_len && rest.trim().is_empty() {
                    open_fence = None;
                }
            }
            out.push(line);
            continue;
        }

        if let Some((c, len, _)) = fence_marker(line) {
            open_fence = Some((c, len));
            previous_blank = false;
            out.push(line);
            continue;
        }

        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push(if blank { "" } else { line });
    }

    out.join("\n")
}

/// Split a fence line into its character, run length and trailing info.
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    let c = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|x| *x == c).count();
    (len >= 3).then(|| (c, len, &trimmed[len..]))
}

// ---------------------------------------------------------------------------
// Pass 4: Ensure trailing newline
// ---------------------------------------------------------------------------

/// Ensure the body ends with exactly one newline (or is empty).
fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    if trimmed.trim().is_empty() {
        return String::new();
    }
    format!("{trimmed}\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
