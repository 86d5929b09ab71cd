//! Availability signals and the ordered rules that turn them into a verdict.
//!
//! Rules are evaluated in [`Rule::ORDER`]; every rule that matches overwrites
//! the verdict, so the last matching rule decides. An explicit "In Stock!"
//! badge therefore beats an out-of-stock marker, which in turn beats a bare
//! "Add to Cart" control.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSignal {
    /// A purchase control labelled "Add to Cart".
    AddToCart,
    /// "Notify me when in stock" text somewhere on the page.
    NotifyMe,
    /// The analytics payload reports the item as out of stock.
    OutOfStockTracking,
    /// A bold "In Stock!" label.
    InStockBadge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet(BTreeSet<StockSignal>);

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signal: StockSignal) {
        self.0.insert(signal);
    }

    pub fn contains(&self, signal: StockSignal) -> bool {
        self.0.contains(&signal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StockSignal> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<StockSignal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = StockSignal>>(iter: I) -> Self {
        SignalSet(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    AddToCart,
    OutOfStock,
    InStockBadge,
}

impl Rule {
    pub const ORDER: [Rule; 3] = [Rule::AddToCart, Rule::OutOfStock, Rule::InStockBadge];

    pub fn matches(self, signals: &SignalSet) -> bool {
        match self {
            Rule::AddToCart => {
                signals.contains(StockSignal::AddToCart) && !signals.contains(StockSignal::NotifyMe)
            }
            Rule::OutOfStock => {
                signals.contains(StockSignal::NotifyMe)
                    || signals.contains(StockSignal::OutOfStockTracking)
            }
            Rule::InStockBadge => signals.contains(StockSignal::InStockBadge),
        }
    }

    /// Availability this rule sets when it matches.
    pub fn verdict(self) -> bool {
        match self {
            Rule::AddToCart | Rule::InStockBadge => true,
            Rule::OutOfStock => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::AddToCart => "add-to-cart",
            Rule::OutOfStock => "out-of-stock",
            Rule::InStockBadge => "in-stock-badge",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    /// Last rule that matched; `None` means the default (unavailable) stood.
    pub decided_by: Option<Rule>,
}

pub fn resolve(signals: &SignalSet) -> Availability {
    Rule::ORDER.iter().fold(
        Availability {
            available: false,
            decided_by: None,
        },
        |current, rule| {
            if rule.matches(signals) {
                Availability {
                    available: rule.verdict(),
                    decided_by: Some(*rule),
                }
            } else {
                current
            }
        },
    )
}
