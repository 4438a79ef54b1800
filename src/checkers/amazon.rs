use scraper::{Html, Selector};

use super::{stripped_text, StoreChecker};
use crate::models::AvailabilityResult;

/// Out-of-stock wording shown in the availability box, in the site's
/// unaccented spelling.
const UNAVAILABLE_PHRASES: [&str; 3] = [
    "atualmente indisponivel",
    "currently unavailable",
    "temporariamente esgotado",
];

/// Amazon pages are classified by the availability container first, then by
/// the presence of an add-to-cart or buy-now control. The price is split
/// across whole and fraction nodes and reassembled here.
pub struct AmazonChecker;

impl StoreChecker for AmazonChecker {
    fn store_name(&self) -> &'static str {
        "amazon"
    }

    fn evaluate(&self, document: &str) -> AvailabilityResult {
        let doc = Html::parse_document(document);

        let page_text = stripped_text(&doc.root_element()).to_lowercase();
        for phrase in UNAVAILABLE_PHRASES {
            if !page_text.contains(phrase) {
                continue;
            }
            // Only trust the phrase when the availability box itself says so.
            if let Ok(selector) = Selector::parse("div#availability") {
                if let Some(availability) = doc.select(&selector).next() {
                    if stripped_text(&availability).to_lowercase().contains(phrase) {
                        return AvailabilityResult::unavailable();
                    }
                }
            }
        }

        let has_buy_control = ["input#add-to-cart-button", "input#buy-now-button"]
            .iter()
            .any(|css| {
                Selector::parse(css)
                    .map(|sel| doc.select(&sel).next().is_some())
                    .unwrap_or(false)
            });

        if !has_buy_control {
            return AvailabilityResult::unavailable();
        }

        AvailabilityResult::available(Self::extract_price(&doc))
    }
}

impl AmazonChecker {
    fn extract_price(doc: &Html) -> Option<String> {
        let whole_selector = Selector::parse("span.a-price-whole").ok()?;
        let whole = doc.select(&whole_selector).next()?;

        let mut price = format!("R$ {}", stripped_text(&whole));

        if let Ok(fraction_selector) = Selector::parse("span.a-price-fraction") {
            if let Some(fraction) = doc.select(&fraction_selector).next() {
                price.push_str(&stripped_text(&fraction));
            }
        }

        Some(price)
    }
}
