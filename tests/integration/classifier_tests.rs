use super::*;
use rstest::rstest;

use restock_watcher::core::classifier::classify;
use restock_watcher::core::extract::PriceExtractor;
use restock_watcher::core::signals::Rule;
use restock_watcher::models::{PRICE_NOT_FOUND, UNKNOWN_TITLE};

const ADD_TO_CART: &str = r#"<component data-type="cart-button">Add to Cart</component>"#;
const NOTIFY_ME: &str =
    r#"<div class="notify"><a href="/notify">Notify me when in stock</a></div>"#;
const TRACKING: &str = r#"<script>window.dataLayer = [{'dimension25':'out of stock'}];</script>"#;
const IN_STOCK: &str = r#"<div class="stock"><strong>In Stock!</strong></div>"#;

fn fixture(parts: &[&str]) -> String {
    format!(
        r#"<html><body>
        <h1 itemprop="name">Yamaha TAG3 C</h1>
        <meta itemprop="price" content="1299.99">
        {}
        </body></html>"#,
        parts.join("\n")
    )
}

#[rstest]
#[case::badge_alone(&[IN_STOCK])]
#[case::badge_and_notify(&[NOTIFY_ME, IN_STOCK])]
#[case::badge_and_tracking(&[TRACKING, IN_STOCK])]
#[case::badge_and_everything(&[ADD_TO_CART, NOTIFY_ME, TRACKING, IN_STOCK])]
fn test_in_stock_badge_always_wins(#[case] parts: &[&str]) {
    let result = classify(&fixture(parts)).unwrap();
    assert!(result.available);
    assert_eq!(result.decided_by, Some(Rule::InStockBadge));
}

#[rstest]
#[case::notify_alone(&[NOTIFY_ME])]
#[case::notify_over_cart(&[ADD_TO_CART, NOTIFY_ME])]
#[case::tracking_over_cart(&[ADD_TO_CART, TRACKING])]
#[case::notify_and_tracking(&[ADD_TO_CART, NOTIFY_ME, TRACKING])]
#[case::notify_in_comment(&[ADD_TO_CART, "<!-- Notify me when in stock -->"])]
fn test_out_of_stock_overrides_add_to_cart(#[case] parts: &[&str]) {
    let result = classify(&fixture(parts)).unwrap();
    assert!(!result.available);
    assert_eq!(result.decided_by, Some(Rule::OutOfStock));
}

#[test]
fn test_add_to_cart_alone_is_available() {
    let result = classify(&fixture(&[ADD_TO_CART])).unwrap();
    assert!(result.available);
    assert_eq!(result.decided_by, Some(Rule::AddToCart));
    assert_eq!(result.title, "Yamaha TAG3 C");
    assert_eq!(result.price, "$1299.99");
}

#[test]
fn test_no_signals_falls_back_to_sentinels() {
    let result = classify(BARE_PAGE).unwrap();
    assert!(!result.available);
    assert_eq!(result.decided_by, None);
    assert!(result.signals.is_empty());
    assert_eq!(result.title, UNKNOWN_TITLE);
    assert_eq!(result.price, PRICE_NOT_FOUND);
}

#[test]
fn test_fixture_pages_classify_as_expected() {
    assert!(classify(AVAILABLE_PAGE).unwrap().available);
    assert!(!classify(SOLD_OUT_PAGE).unwrap().available);
}

#[test]
fn test_first_currency_amount_wins() {
    let extractor = PriceExtractor::new().unwrap();
    assert_eq!(extractor.price_from_text("Now: $1,299.00 (was $1,499.00)"), "$1,299.00");
}
