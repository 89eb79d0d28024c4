use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::models::Listing;
use crate::scrapers::types::MarkupRules;

/// Why a single card or link produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Neither a title nor a URL was found
    Empty,
    /// The link sits fewer levels deep than the card walk needs
    Shallow,
    /// The generic pass's listing `href` does not resolve against the page URL
    BadUrl(String),
}

pub type ItemOutcome = std::result::Result<Listing, Skip>;

/// Compiled selectors and patterns for one extraction pass
pub struct CardParser<'r> {
    rules: &'r MarkupRules,
    card: Selector,
    listing_link: Selector,
    image: Selector,
    headings: Vec<Selector>,
    price: Regex,
}

impl<'r> CardParser<'r> {
    pub fn new(rules: &'r MarkupRules) -> Result<Self> {
        let headings = rules
            .heading_tags
            .iter()
            .map(|tag| compile(tag))
            .collect::<Result<Vec<_>>>()?;

        let price = Regex::new(&rules.price_pattern).map_err(|e| {
            ScrapeError::Extraction(format!("bad price pattern {}: {e}", rules.price_pattern))
        })?;

        Ok(Self {
            rules,
            card: compile(&rules.card_selector())?,
            listing_link: compile(&rules.listing_link_selector())?,
            image: compile("img")?,
            headings,
            price,
        })
    }

    /// Cards in document order. A card nested inside another card (the
    /// marker also prefixes the card's own sub-elements) is not a card.
    pub fn cards<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.select(&self.card)
            .filter(|el| {
                !el.ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|parent| self.is_card(parent))
            })
            .collect()
    }

    fn is_card(&self, el: ElementRef) -> bool {
        el.value()
            .attr("class")
            .is_some_and(|class| class.contains(&self.rules.card_class_marker))
    }

    /// Pull one record out of a favorite card
    pub fn parse_card(&self, card: ElementRef, base: &Url) -> ItemOutcome {
        let field = |prefix: &str| {
            first_with_class_prefix(card, prefix)
                .map(text_of)
                .unwrap_or_default()
        };

        let title = field(&self.rules.title_class_prefix);
        let rating = field(&self.rules.rating_class_prefix);
        let price = field(&self.rules.price_class_prefix);

        let url = card
            .select(&self.listing_link)
            .next()
            .map(|link| resolve_or_blank(base, link.value().attr("href").unwrap_or("")))
            .unwrap_or_default();
        let image_url = self.first_image(card, base);

        Listing::from_parts(title, price, rating, url, image_url).ok_or(Skip::Empty)
    }

    /// Every anchor on the page that points at a space detail page
    pub fn listing_links<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.select(&self.listing_link).collect()
    }

    /// Rebuild a record around a bare listing link by treating a fixed
    /// ancestor as the card. `url` is the link's resolved target.
    pub fn parse_link(&self, link: ElementRef, url: String, base: &Url) -> ItemOutcome {
        let container = ancestor(link, self.rules.ancestor_depth).ok_or(Skip::Shallow)?;

        let title = self
            .headings
            .iter()
            .flat_map(|heading| container.select(heading))
            .map(text_of)
            .find(|text| text.chars().count() > self.rules.min_title_chars)
            .unwrap_or_default();

        // One line per text node, so a match stops at element boundaries
        let lines = container.text().collect::<Vec<_>>().join("\n");
        let price = self
            .price
            .find(&lines)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let image_url = self.first_image(container, base);

        Listing::from_parts(title, price, String::new(), url, image_url).ok_or(Skip::Empty)
    }

    fn first_image(&self, root: ElementRef, base: &Url) -> String {
        root.select(&self.image)
            .next()
            .map(|img| resolve_or_blank(base, img.value().attr("src").unwrap_or("")))
            .unwrap_or_default()
    }
}

/// Secondary fields degrade to blank instead of dropping the record
fn resolve_or_blank(base: &Url, raw: &str) -> String {
    resolve(base, raw).unwrap_or_else(|skip| {
        debug!("leaving field blank: {skip:?}");
        String::new()
    })
}

pub fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Extraction(format!("bad selector {css}: {e}")))
}

/// Visible-ish text: all text nodes with whitespace runs collapsed
pub fn text_of(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First descendant (document order) whose class attribute starts with `prefix`
pub fn first_with_class_prefix<'a>(root: ElementRef<'a>, prefix: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| class.starts_with(prefix))
        })
}

/// The element `levels` steps up from `el`, or `None` past the root element
pub fn ancestor(el: ElementRef, levels: usize) -> Option<ElementRef> {
    if levels == 0 {
        return Some(el);
    }
    el.ancestors().filter_map(ElementRef::wrap).nth(levels - 1)
}

/// Resolve an attribute value against the page URL. Blank stays blank.
pub fn resolve(base: &Url, raw: &str) -> std::result::Result<String, Skip> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    base.join(raw)
        .map(String::from)
        .map_err(|_| Skip::BadUrl(raw.to_string()))
}
