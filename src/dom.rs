//! Applying label normalization to parsed HTML.
//!
//! Only direct text children of navigation elements are touched. Child
//! elements (icons, nested spans) are never descended into; a nested span
//! that is itself a navigation element gets its own pass.

use std::sync::Arc;

use ego_tree::NodeId;
use scraper::{Html, Node, Selector};

use crate::normalize::Normalizer;

/// Navigation elements in Material-style generated markup.
pub const DEFAULT_SELECTORS: &[&str] = &[
    ".md-tabs__link",    // top navigation tabs
    ".md-nav__link",     // sidebar and TOC links
    ".md-path__link",    // breadcrumbs
    ".md-header__topic", // header topic text
    ".md-ellipsis",      // truncated labels
];

#[derive(thiserror::Error, Debug)]
pub enum DomError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("no navigation selectors configured")]
    NoSelectors,
}

/// The set of CSS selectors identifying navigation elements.
#[derive(Debug, Clone)]
pub struct NavSelectors {
    selector: Selector,
}

impl NavSelectors {
    /// Parse a list of selectors, reporting the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, DomError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Err(DomError::NoSelectors);
        }

        for pattern in &patterns {
            parse_selector(pattern)?;
        }
        let selector = parse_selector(&patterns.join(", "))?;

        Ok(Self { selector })
    }

    /// The default navigation selectors.
    pub fn standard() -> Result<Self, DomError> {
        Self::new(DEFAULT_SELECTORS.iter().copied())
    }
}

fn parse_selector(pattern: &str) -> Result<Selector, DomError> {
    Selector::parse(pattern).map_err(|e| DomError::Selector {
        selector: pattern.to_string(),
        message: e.to_string(),
    })
}

/// A page whose navigation text changed.
#[derive(Debug, Clone)]
pub struct PageFix {
    /// The serialized page.
    pub html: String,
    /// Number of text nodes rewritten.
    pub rewritten: usize,
}

/// Applies a [`Normalizer`] to the navigation elements of HTML documents.
#[derive(Debug, Clone)]
pub struct NavFixer {
    normalizer: Arc<Normalizer>,
    selectors: NavSelectors,
}

impl NavFixer {
    pub fn new(normalizer: Arc<Normalizer>, selectors: NavSelectors) -> Self {
        Self {
            normalizer,
            selectors,
        }
    }

    /// The replacement for a text node, or `None` if it should stay as is.
    ///
    /// Surrounding whitespace is kept so the markup layout does not shift.
    pub fn fix_text(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let fixed = self.normalizer.normalize(trimmed);
        if fixed == trimmed {
            return None;
        }

        let start = text.len() - text.trim_start().len();
        let end = start + trimmed.len();
        Some(format!("{}{}{}", &text[..start], fixed, &text[end..]))
    }

    /// Fix the direct text children of one element.
    ///
    /// Returns the number of text nodes written. Nodes whose text is already
    /// correct are left alone.
    pub fn apply_to_element(&self, html: &mut Html, element: NodeId) -> usize {
        let Some(node) = html.tree.get(element) else {
            return 0;
        };

        let rewrites: Vec<(NodeId, String)> = node
            .children()
            .filter_map(|child| {
                let text = child.value().as_text()?;
                self.fix_text(text).map(|fixed| (child.id(), fixed))
            })
            .collect();

        let mut written = 0;
        for (id, fixed) in rewrites {
            if let Some(mut child) = html.tree.get_mut(id)
                && let Node::Text(text) = child.value()
            {
                text.text = fixed.as_str().into();
                written += 1;
            }
        }

        written
    }

    /// Fix every navigation element in a document.
    pub fn apply_to_document(&self, html: &mut Html) -> usize {
        let elements: Vec<NodeId> = html
            .select(&self.selectors.selector)
            .map(|element| element.id())
            .collect();

        elements
            .into_iter()
            .map(|element| self.apply_to_element(html, element))
            .sum()
    }

    /// Parse, fix and serialize a page. Returns `None` when nothing changed.
    pub fn fix_page(&self, source: &str) -> Option<PageFix> {
        let mut html = Html::parse_document(source);
        let rewritten = self.apply_to_document(&mut html);

        (rewritten > 0).then(|| PageFix {
            html: html.html(),
            rewritten,
        })
    }
}
