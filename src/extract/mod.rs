//! Content extraction: rendered HTML to a structured text record
//!
//! Extraction is deterministic and never fails. Empty or malformed HTML yields
//! an all-empty [`StructuredContent`].

mod document;
mod strategies;

pub use document::{collapse_whitespace, PageDocument};
pub use strategies::{
    business_info, contact_sections, default_strategies, headings, looks_like_business_info,
    mentions_contact, paragraphs, social_links, ContentField, Strategy, StrategyFn,
    CONTACT_KEYWORDS,
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Extracted page content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContent {
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    pub contact_sections: Vec<String>,
    pub business_info: Vec<String>,
    pub social_links: Vec<String>,
    pub all_text: String,
}

impl StructuredContent {
    /// True for the canonical empty record carried by failed crawls
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn field_mut(&mut self, field: ContentField) -> &mut Vec<String> {
        match field {
            ContentField::Headings => &mut self.headings,
            ContentField::Paragraphs => &mut self.paragraphs,
            ContentField::ContactSections => &mut self.contact_sections,
            ContentField::BusinessInfo => &mut self.business_info,
            ContentField::SocialLinks => &mut self.social_links,
        }
    }
}

/// An ordered set of extraction strategies
#[derive(Debug, Clone)]
pub struct Extractor {
    strategies: Vec<Strategy>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }
}

impl Extractor {
    /// An extractor with no list strategies; only `all_text` is filled
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy; its output goes after earlier strategies for the same field
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Runs every strategy over the cleaned document
    pub fn extract(&self, html: &str) -> StructuredContent {
        self.run(html, PageDocument::parse)
    }

    /// Like [`Extractor::extract`], resolving relative links against `page_url`
    pub fn extract_page(&self, html: &str, page_url: &str) -> StructuredContent {
        self.run(html, |html| PageDocument::parse_with_base(html, page_url))
    }

    fn run(&self, html: &str, parse: impl FnOnce(&str) -> PageDocument) -> StructuredContent {
        if html.trim().is_empty() {
            return StructuredContent::default();
        }

        let doc = parse(html);
        let mut content = StructuredContent {
            all_text: doc.all_text(),
            ..StructuredContent::default()
        };

        for strategy in &self.strategies {
            let found = (strategy.run)(&doc);
            tracing::trace!("strategy {} found {} item(s)", strategy.name, found.len());
            content.field_mut(strategy.field).extend(found);
        }

        content
    }
}

static DEFAULT_EXTRACTOR: Lazy<Extractor> = Lazy::new(Extractor::default);

/// Extracts structured content with the built-in strategies
///
/// # Example
///
/// ```
/// use dorkscan::extract;
///
/// let content = extract("<html><body><h1>Acme Agency</h1><p>Email us: hi@acme.io</p></body></html>");
/// assert_eq!(content.headings, vec!["Acme Agency"]);
/// assert_eq!(content.business_info, vec!["Email us: hi@acme.io"]);
/// ```
pub fn extract(html: &str) -> StructuredContent {
    DEFAULT_EXTRACTOR.extract(html)
}
