use crate::constants::MAX_LEVEL;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Level {0} is out of range (0-15)")]
    InvalidLevel(u8),
    #[error("Bookmark title is empty")]
    EmptyTitle,
    #[error("Page {found} listed after page {previous}; pages must be in ascending order")]
    PageOrder { previous: usize, found: usize },
    #[error("Bookmark '{title}' targets page {page} but the document has {page_count} pages")]
    PageOutOfRange {
        title: String,
        page: usize,
        page_count: usize,
    },
    #[error("Malformed outline: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, OutlineError>;

/// One outline entry parsed from a page label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelToken {
    level: u8,
    text: String,
}

impl LabelToken {
    /// Create a token, rejecting levels without a marker and blank titles
    pub fn new(level: u8, text: impl Into<String>) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(OutlineError::InvalidLevel(level));
        }
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(OutlineError::EmptyTitle);
        }
        Ok(Self { level, text })
    }

    /// Raw level as written in the label (0 when unmarked)
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Tokens of one page, tagged with the page's position in the output document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLabel {
    /// Zero-based page index
    pub page_index: usize,
    pub tokens: Vec<LabelToken>,
}

impl PageLabel {
    pub fn new(page_index: usize, tokens: Vec<LabelToken>) -> Self {
        Self { page_index, tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A node of the generated outline tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookmarkNode {
    pub title: String,
    /// Zero-based index of the page this entry jumps to
    pub target_page: usize,
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    pub fn new(title: impl Into<String>, target_page: usize) -> Self {
        Self {
            title: title.into(),
            target_page,
            children: Vec::new(),
        }
    }

    /// Number of entries below this node, at any depth
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Depth-first walk yielding `(depth, node)` pairs, starting at depth 0
    pub fn walk(&self) -> Vec<(usize, &BookmarkNode)> {
        let mut out = Vec::new();
        self.walk_into(0, &mut out);
        out
    }

    fn walk_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a BookmarkNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.walk_into(depth + 1, out);
        }
    }
}
