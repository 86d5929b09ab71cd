use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::{PRICE_NOT_FOUND, UNKNOWN_TITLE};
use crate::utils::error::AppError;

const TITLE_SELECTORS: [&str; 3] = ["h1.product__name", r#"h1[itemprop="name"]"#, "h1"];

const PRICE_SELECTORS: [&str; 4] = [
    "span.product__price",
    r#"span[itemprop="price"]"#,
    r#"meta[itemprop="price"]"#,
    r#"[class*="price"]"#,
];

// Dollar sign, digits with optional thousands separators, optional cents.
const CURRENCY_PATTERN: &str = r"\$[\d,]+\.?\d*";

pub fn compile_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::parse(format!("Invalid CSS selector '{}': {:?}", selector, e)))
}

fn compile_all(selectors: &[&str]) -> Result<Vec<Selector>, AppError> {
    selectors.iter().map(|s| compile_selector(s)).collect()
}

/// Concatenated text of an element and its descendants, trimmed.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First element matched by the earliest selector in `selectors` that
/// matches anything.
fn first_match<'a>(document: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| document.select(selector).next())
}

pub struct TitleExtractor {
    selectors: Vec<Selector>,
}

impl TitleExtractor {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            selectors: compile_all(&TITLE_SELECTORS)?,
        })
    }

    pub fn extract(&self, document: &Html) -> String {
        first_match(document, &self.selectors)
            .map(|element| element_text(&element))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }
}

pub struct PriceExtractor {
    selectors: Vec<Selector>,
    currency_regex: Regex,
}

impl PriceExtractor {
    pub fn new() -> Result<Self, AppError> {
        let currency_regex = Regex::new(CURRENCY_PATTERN)
            .map_err(|e| AppError::parse(format!("Invalid price pattern: {}", e)))?;

        Ok(Self {
            selectors: compile_all(&PRICE_SELECTORS)?,
            currency_regex,
        })
    }

    pub fn extract(&self, document: &Html) -> String {
        let Some(element) = first_match(document, &self.selectors) else {
            return PRICE_NOT_FOUND.to_string();
        };

        if element.value().name() == "meta" {
            let content = element.value().attr("content").unwrap_or("N/A");
            return format!("${}", content);
        }

        self.price_from_text(&element_text(&element))
    }

    /// First currency amount in `text`, or the text itself when it holds none.
    pub fn price_from_text(&self, text: &str) -> String {
        self.find_currency(text)
            .map(str::to_string)
            .unwrap_or_else(|| text.trim().to_string())
    }

    pub fn find_currency<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.currency_regex.find(text).map(|m| m.as_str())
    }
}
