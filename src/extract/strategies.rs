//! Named extraction strategies
//!
//! Each strategy is a plain function from a cleaned document to a list of
//! strings, tagged with the [`ContentField`] it fills. New heuristics are added
//! by pushing another [`Strategy`] onto an `Extractor`.

use super::document::PageDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

/// Field of `StructuredContent` a strategy appends to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    Headings,
    Paragraphs,
    ContactSections,
    BusinessInfo,
    SocialLinks,
}

/// Signature of an extraction strategy
pub type StrategyFn = fn(&PageDocument) -> Vec<String>;

/// A named extraction heuristic
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub field: ContentField,
    pub run: StrategyFn,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish()
    }
}

/// Keywords marking a block as contact information
pub const CONTACT_KEYWORDS: &[&str] = &[
    "contact",
    "phone",
    "email",
    "address",
    "call",
    "reach",
    "get in touch",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

static HEADINGS: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| selector("p"));
static BLOCKS: Lazy<Selector> =
    Lazy::new(|| selector("div, section, article, aside, address, p, li, td, dd"));
static TEXT_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| selector("p, span, div, li, td, dd, address"));
static ANCHORS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}")
        .expect("phone pattern compiles")
});
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern compiles")
});
static STREET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{1,6}\s+(?:[A-Za-z0-9.'-]+\s+){0,5}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|way|court|ct|place|pl|suite|ste)\b\.?",
    )
    .expect("address pattern compiles")
});
static SOCIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:[a-z0-9-]+\.)*(facebook|twitter|x|instagram|linkedin|youtube|tiktok)\.com(?:[/?#]|$)",
    )
    .expect("social pattern compiles")
});

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn push_unique(out: &mut Vec<String>, value: String) {
    if !out.contains(&value) {
        out.push(value);
    }
}

/// Heading elements with more than 2 characters of text
pub fn headings(doc: &PageDocument) -> Vec<String> {
    doc.select_visible(&HEADINGS)
        .map(|el| doc.text_of(el))
        .filter(|text| char_len(text) > 2)
        .collect()
}

/// Paragraph elements with more than 10 characters of text
pub fn paragraphs(doc: &PageDocument) -> Vec<String> {
    doc.select_visible(&PARAGRAPHS)
        .map(|el| doc.text_of(el))
        .filter(|text| char_len(text) > 10)
        .collect()
}

/// Returns true when lowercase `text` mentions a contact keyword
pub fn mentions_contact(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CONTACT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Block elements mentioning a contact keyword, 5 < length < 500
///
/// The upper bound keeps whole-page wrappers from being classified as a
/// contact block just because they contain one.
pub fn contact_sections(doc: &PageDocument) -> Vec<String> {
    let mut out = Vec::new();
    for el in doc.select_visible(&BLOCKS) {
        let text = doc.text_of(el);
        let len = char_len(&text);
        if len > 5 && len < 500 && mentions_contact(&text) {
            push_unique(&mut out, text);
        }
    }
    out
}

/// Returns true when the text looks like a phone number, email or street address
pub fn looks_like_business_info(text: &str) -> bool {
    PHONE.is_match(text) || EMAIL.is_match(text) || STREET_ADDRESS.is_match(text)
}

/// Short text blocks (10 < length < 200) holding phone/email/address data
pub fn business_info(doc: &PageDocument) -> Vec<String> {
    let mut out = Vec::new();
    for el in doc.select_visible(&TEXT_ELEMENTS) {
        let text = doc.text_of(el);
        let len = char_len(&text);
        if len > 10 && len < 200 && looks_like_business_info(&text) {
            push_unique(&mut out, text);
        }
    }
    out
}

/// Anchors pointing at a known social network, as `"{label}: {href}"`
pub fn social_links(doc: &PageDocument) -> Vec<String> {
    let mut out = Vec::new();
    for el in doc.select_visible(&ANCHORS) {
        let Some(href) = el.value().attr("href").and_then(|href| doc.resolve(href)) else {
            continue;
        };
        let href = href.to_string();
        let Some(caps) = SOCIAL.captures(&href) else {
            continue;
        };

        let text = doc.text_of(el);
        let label = if !text.is_empty() {
            text
        } else if let Some(aria) = el.value().attr("aria-label").or(el.value().attr("title")) {
            aria.trim().to_string()
        } else {
            caps[1].to_lowercase()
        };

        push_unique(&mut out, format!("{}: {}", label, href));
    }
    out
}

/// The built-in strategy set, one per `StructuredContent` list
pub fn default_strategies() -> Vec<Strategy> {
    vec![
        Strategy {
            name: "headings",
            field: ContentField::Headings,
            run: headings,
        },
        Strategy {
            name: "paragraphs",
            field: ContentField::Paragraphs,
            run: paragraphs,
        },
        Strategy {
            name: "contact-sections",
            field: ContentField::ContactSections,
            run: contact_sections,
        },
        Strategy {
            name: "business-info",
            field: ContentField::BusinessInfo,
            run: business_info,
        },
        Strategy {
            name: "social-links",
            field: ContentField::SocialLinks,
            run: social_links,
        },
    ]
}
