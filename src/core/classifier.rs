use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};

use crate::core::extract::{compile_selector, element_text, PriceExtractor, TitleExtractor};
use crate::core::signals::{resolve, Rule, SignalSet, StockSignal};
use crate::models::ProductSnapshot;
use crate::utils::error::AppError;

pub const ADD_TO_CART_PHRASE: &str = "add to cart";
pub const NOTIFY_ME_PHRASE: &str = "notify me when in stock";
pub const IN_STOCK_PHRASE: &str = "in stock!";
pub const OUT_OF_STOCK_TRACKING_MARKER: &str = "'dimension25':'out of stock'";

// The store renders its purchase button inside a custom <component> tag.
const ADD_TO_CART_SELECTOR: &str = "component";
const IN_STOCK_BADGE_SELECTOR: &str = "strong";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub available: bool,
    pub title: String,
    pub price: String,
    pub signals: SignalSet,
    pub decided_by: Option<Rule>,
}

impl Classification {
    pub fn into_snapshot(self, url: impl Into<String>) -> ProductSnapshot {
        ProductSnapshot::new(self.title, self.price, url, self.available)
    }
}

pub struct ProductPageClassifier {
    add_to_cart: Selector,
    in_stock_badge: Selector,
    title: TitleExtractor,
    price: PriceExtractor,
}

impl ProductPageClassifier {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            add_to_cart: compile_selector(ADD_TO_CART_SELECTOR)?,
            in_stock_badge: compile_selector(IN_STOCK_BADGE_SELECTOR)?,
            title: TitleExtractor::new()?,
            price: PriceExtractor::new()?,
        })
    }

    pub fn classify(&self, html: &str) -> Classification {
        let document = Html::parse_document(html);

        let signals = self.detect_signals(&document, html);
        let availability = resolve(&signals);

        for signal in signals.iter() {
            tracing::debug!("Detected signal: {:?}", signal);
        }
        match availability.decided_by {
            Some(rule) => tracing::debug!(
                "Availability {} decided by rule {}",
                availability.available,
                rule
            ),
            None => tracing::debug!("No availability rule matched, defaulting to unavailable"),
        }

        Classification {
            available: availability.available,
            title: self.title.extract(&document),
            price: self.price.extract(&document),
            signals,
            decided_by: availability.decided_by,
        }
    }

    pub fn detect_signals(&self, document: &Html, source: &str) -> SignalSet {
        let mut signals = SignalSet::new();

        if self.has_element_containing(document, &self.add_to_cart, ADD_TO_CART_PHRASE) {
            signals.insert(StockSignal::AddToCart);
        }

        // Any string in the document counts, comments and script text included.
        if has_string_containing(document, NOTIFY_ME_PHRASE) {
            signals.insert(StockSignal::NotifyMe);
        }

        if source.contains(OUT_OF_STOCK_TRACKING_MARKER) {
            signals.insert(StockSignal::OutOfStockTracking);
        }

        if self.has_badge_containing(document, &self.in_stock_badge, IN_STOCK_PHRASE) {
            signals.insert(StockSignal::InStockBadge);
        }

        signals
    }

    fn has_element_containing(&self, document: &Html, selector: &Selector, phrase: &str) -> bool {
        document
            .select(selector)
            .any(|element| element_text(&element).to_lowercase().contains(phrase))
    }

    /// Like `has_element_containing`, but the element must wrap a single
    /// string; mixed content such as `<strong>Ships <em>in stock!</em></strong>`
    /// does not count.
    fn has_badge_containing(&self, document: &Html, selector: &Selector, phrase: &str) -> bool {
        document.select(selector).any(|element| {
            single_string(element).is_some_and(|text| text.to_lowercase().contains(phrase))
        })
    }
}

fn has_string_containing(document: &Html, phrase: &str) -> bool {
    document.tree.values().any(|node| match node {
        Node::Text(text) => text.to_lowercase().contains(phrase),
        Node::Comment(comment) => comment.to_lowercase().contains(phrase),
        _ => false,
    })
}

/// The only string inside `element`, following single-child elements down.
/// `None` when the element is empty or has more than one child.
fn single_string(element: ElementRef<'_>) -> Option<&str> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    match only.value() {
        Node::Text(text) => Some(&**text),
        Node::Comment(comment) => Some(&**comment),
        Node::Element(_) => ElementRef::wrap(only).and_then(single_string),
        _ => None,
    }
}

/// One-shot classification of a product page.
pub fn classify(html: &str) -> Result<Classification, AppError> {
    Ok(ProductPageClassifier::new()?.classify(html))
}
