//! Cleaned view over a parsed HTML document
//!
//! Script, style, navigation chrome and ad containers are skipped rather than
//! removed from the tree: every query goes through [`PageDocument`], which
//! ignores elements inside those subtrees and leaves them out of text.

use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements whose whole subtree is ignored
const REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "iframe", "svg",
];

/// Class/id tokens that mark an ad container
const AD_TOKENS: &[&str] = &[
    "ad",
    "ads",
    "advert",
    "advertisement",
    "advertising",
    "sponsored",
    "adsbygoogle",
];

/// Tags that do not break words when text is flattened
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "cite", "code", "em", "i", "kbd", "label", "mark", "q", "s",
    "small", "span", "strong", "sub", "sup", "time", "u",
];

fn is_ad_token(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    AD_TOKENS.contains(&token.as_str())
        || token.starts_with("ad-")
        || token.starts_with("ads-")
        || token.starts_with("advert")
}

/// True for elements skipped together with their subtree
pub(crate) fn is_removed(element: &Element) -> bool {
    if REMOVED_TAGS.contains(&element.name()) {
        return true;
    }
    element.classes().any(is_ad_token) || element.id().map(is_ad_token).unwrap_or(false)
}

/// Collapses runs of whitespace (including newlines) into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        if is_removed(child.value()) {
            continue;
        }
        let breaks_words = !INLINE_TAGS.contains(&child.value().name());
        if breaks_words {
            out.push(' ');
        }
        push_visible_text(child, out);
        if breaks_words {
            out.push(' ');
        }
    }
}

/// A parsed page with ad/script/navigation subtrees masked out
pub struct PageDocument {
    html: Html,
    base: Option<Url>,
}

impl PageDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            base: None,
        }
    }

    /// Parses a page fetched from `page_url`, so relative links can be resolved
    pub fn parse_with_base(html: &str, page_url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            base: Url::parse(page_url).ok(),
        }
    }

    /// Absolute form of an `href`
    ///
    /// Relative and protocol-relative links need a base; without one only
    /// absolute links resolve.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match &self.base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
    }

    /// Elements matching `selector` that are not inside a masked subtree
    pub fn select_visible<'a, 'b>(
        &'a self,
        selector: &'b Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'b
    where
        'a: 'b,
    {
        self.html
            .select(selector)
            .filter(|element| !Self::is_masked(*element))
    }

    fn is_masked(element: ElementRef<'_>) -> bool {
        if is_removed(element.value()) {
            return true;
        }
        element
            .ancestors()
            .filter_map(|node| node.value().as_element())
            .any(is_removed)
    }

    /// Visible, whitespace-collapsed text of one element
    pub fn text_of(&self, element: ElementRef<'_>) -> String {
        let mut raw = String::new();
        push_visible_text(element, &mut raw);
        collapse_whitespace(&raw)
    }

    /// Visible, whitespace-collapsed text of the whole page body
    pub fn all_text(&self) -> String {
        let body = Selector::parse("body")
            .ok()
            .and_then(|selector| self.html.select(&selector).next());
        match body {
            Some(body) => self.text_of(body),
            None => self.text_of(self.html.root_element()),
        }
    }
}
