//! Page structure report used by the probe tool when the store changes its
//! markup and the classifier's selectors need revisiting.

use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::extract::{compile_selector, element_text};
use crate::utils::error::AppError;

const PREVIEW_CHARS: usize = 100;

struct Probe {
    category: &'static str,
    selectors: &'static [&'static str],
}

const PROBES: [Probe; 4] = [
    Probe {
        category: "Product Title",
        selectors: &["h1", "h2", ".product-title", ".product-name"],
    },
    Probe {
        category: "Price",
        selectors: &[".price", ".product-price", r#"[itemprop="price"]"#],
    },
    Probe {
        category: "Add to Cart Button",
        selectors: &["button", ".add-to-cart", "#add-to-cart"],
    },
    Probe {
        category: "Availability",
        selectors: &[".availability", ".stock-status", ".in-stock"],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct FoundElement {
    pub selector: String,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text_preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryFinding {
    pub category: String,
    pub found: Option<FoundElement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureReport {
    pub findings: Vec<CategoryFinding>,
    pub out_of_stock_text: bool,
}

pub fn analyze_structure(html: &str) -> Result<StructureReport, AppError> {
    let document = Html::parse_document(html);
    let mut findings = Vec::with_capacity(PROBES.len());

    for probe in &PROBES {
        let mut found = None;
        for selector_str in probe.selectors {
            let selector = compile_selector(selector_str)?;
            if let Some(element) = document.select(&selector).next() {
                let attributes = element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();

                found = Some(FoundElement {
                    selector: selector_str.to_string(),
                    tag: element.value().name().to_string(),
                    attributes,
                    text_preview: element_text(&element).chars().take(PREVIEW_CHARS).collect(),
                });
                break;
            }
        }

        findings.push(CategoryFinding {
            category: probe.category.to_string(),
            found,
        });
    }

    let out_of_stock_text = document
        .root_element()
        .text()
        .any(|t| t.to_lowercase().contains("out of stock"));

    Ok(StructureReport {
        findings,
        out_of_stock_text,
    })
}

impl fmt::Display for StructureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "\n{}:", finding.category)?;
            match &finding.found {
                Some(el) => {
                    if el.attributes.is_empty() {
                        writeln!(f, "  Found: {} - no attributes", el.tag)?;
                    } else {
                        writeln!(f, "  Found: {} - {:?}", el.tag, el.attributes)?;
                    }
                    if !el.text_preview.is_empty() {
                        writeln!(f, "  Text: {}...", el.text_preview)?;
                    }
                }
                None => writeln!(f, "  Not found with common patterns")?,
            }
        }

        writeln!(f, "\nOut of Stock:")?;
        if self.out_of_stock_text {
            writeln!(f, "  Found 'out of stock' text in page")
        } else {
            writeln!(f, "  Not found with common patterns")
        }
    }
}
