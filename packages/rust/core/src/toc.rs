//! TOC (Table of Contents) builder.
//!
//! Turns the rendered heading sequence of one article into a nested
//! [`Toc`] outline that maps to `toc.json`.

use tracing::{debug, instrument};

use pressroom_shared::{Toc, TocEntry};

use crate::render::RenderedHeading;

/// Level given to headings when none in the article has a detected level.
const DEFAULT_LEVEL: u8 = 1;

/// Build an outline from headings in document order.
///
/// An entry nests under the closest preceding entry with a strictly
/// shallower level; everything else becomes a sibling or a root. Headings
/// without a level are placed at the article's shallowest level.
///
/// `max_depth` limits how many levels below the shallowest are kept;
/// `None` or `Some(0)` keeps them all.
#[instrument(skip_all, fields(headings = headings.len()))]
pub fn build_toc(headings: &[RenderedHeading], max_depth: Option<u8>) -> Toc {
    let shallowest = shallowest_level(headings);
    let deepest_kept = max_depth
        .filter(|d| *d > 0)
        .map(|d| shallowest.saturating_add(d - 1));

    let mut roots: Vec<TocEntry> = Vec::new();
    let mut open: Vec<TocEntry> = Vec::new();

    for heading in headings {
        let level = effective_level(heading, shallowest);
        if deepest_kept.is_some_and(|limit| level > limit) {
            continue;
        }

        while open.last().is_some_and(|top| top.level >= level) {
            if let Some(done) = open.pop() {
                attach(&mut open, &mut roots, done);
            }
        }

        open.push(TocEntry {
            text: heading.text.clone(),
            anchor: heading.anchor.clone(),
            level,
            children: Vec::new(),
        });
    }

    while let Some(done) = open.pop() {
        attach(&mut open, &mut roots, done);
    }

    let toc = Toc { entries: roots };
    debug!(entries = toc.len(), roots = toc.entries.len(), "TOC built");
    toc
}

/// The shallowest detected level among `headings`, or 1 if none has a level.
pub fn shallowest_level(headings: &[RenderedHeading]) -> u8 {
    headings
        .iter()
        .filter_map(|h| h.level)
        .min()
        .unwrap_or(DEFAULT_LEVEL)
}

/// A heading's level, defaulting to `shallowest` when undetected.
pub fn effective_level(heading: &RenderedHeading, shallowest: u8) -> u8 {
    heading.level.unwrap_or(shallowest)
}

fn attach(open: &mut [TocEntry], roots: &mut Vec<TocEntry>, entry: TocEntry) {
    match open.last_mut() {
        Some(parent) => parent.children.push(entry),
        None => roots.push(entry),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
