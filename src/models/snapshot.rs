use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Product";
pub const PRICE_NOT_FOUND: &str = "Price not found";

/// Raw page as returned by a single successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub body: String,
    pub status: u16,
    pub url: String,
    pub final_url: String, // After redirects
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// What one check learned about the product page.
///
/// Snapshots are not compared across runs; deciding whether a notification
/// was already sent is left to whoever schedules the checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    title: String,
    price: String,
    url: String,
    available: bool,
}

impl ProductSnapshot {
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        url: impl Into<String>,
        available: bool,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            url: url.into(),
            available,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn available(&self) -> bool {
        self.available
    }
}
