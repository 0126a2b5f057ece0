//! Outline tree construction
//!
//! Tokens arrive in reading order with their raw marker level. The builder
//! keeps one open frame per nesting step below the root and decides for each
//! token whether it opens a frame under the previous entry, closes frames, or
//! stays a sibling:
//!
//! - a higher raw level than the previous token descends exactly one step,
//!   however large the jump (`⓿` → `❸` nests once)
//! - a lower raw level ascends by the difference, stopping at the root
//! - an equal raw level stays at the current depth

use crate::types::*;
use log::trace;

/// Incremental outline tree builder
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    roots: Vec<BookmarkNode>,
    /// Children being collected for the last entry of the frame below
    open: Vec<Vec<BookmarkNode>>,
    previous_level: Option<u8>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved depth of the last pushed entry
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Append one entry and return the depth it was placed at
    pub fn push(&mut self, level: u8, title: impl Into<String>, target_page: usize) -> usize {
        match self.previous_level {
            Some(previous) if level > previous => {
                self.open.push(Vec::new());
            }
            Some(previous) if level < previous => {
                let rise = usize::from(previous - level);
                self.close_frames(self.depth().saturating_sub(rise));
            }
            _ => {}
        }

        let node = BookmarkNode::new(title, target_page);
        trace!(
            "outline entry '{}' (level {}) -> depth {}, page {}",
            node.title,
            level,
            self.depth(),
            target_page
        );
        self.current_frame().push(node);
        self.previous_level = Some(level);
        self.depth()
    }

    /// Close all open frames and return the root entries
    pub fn finish(mut self) -> Vec<BookmarkNode> {
        self.close_frames(0);
        self.roots
    }

    fn current_frame(&mut self) -> &mut Vec<BookmarkNode> {
        self.open.last_mut().unwrap_or(&mut self.roots)
    }

    /// Pop frames until `depth` remain, handing each to its parent entry.
    /// Asking for a depth at or above the current one leaves the stack alone.
    fn close_frames(&mut self, depth: usize) {
        while self.open.len() > depth {
            let Some(children) = self.open.pop() else {
                break;
            };
            if let Some(parent) = self.current_frame().last_mut() {
                parent.children.extend(children);
            }
        }
    }
}

/// Build the outline tree for a document
///
/// `pages` must be in document order; a page index that does not increase is
/// rejected. Pages without tokens contribute nothing.
pub fn build_outline(pages: &[PageLabel]) -> Result<Vec<BookmarkNode>> {
    let mut builder = OutlineBuilder::new();
    let mut previous_page: Option<usize> = None;

    for page in pages {
        if let Some(previous) = previous_page {
            if page.page_index <= previous {
                return Err(OutlineError::PageOrder {
                    previous,
                    found: page.page_index,
                });
            }
        }
        previous_page = Some(page.page_index);

        for token in &page.tokens {
            builder.push(token.level(), token.text(), page.page_index);
        }
    }

    Ok(builder.finish())
}
