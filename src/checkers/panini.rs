use scraper::{Html, Selector};

use super::{stripped_text, StoreChecker};
use crate::models::AvailabilityResult;

/// Sold-out pages at Panini carry a link to the "productalert" signup form,
/// so its presence anywhere in the raw body means unavailable. This is a
/// substring scan, not a structural check, and is kept that way on purpose.
pub struct PaniniChecker;

impl StoreChecker for PaniniChecker {
    fn store_name(&self) -> &'static str {
        "panini"
    }

    fn evaluate(&self, document: &str) -> AvailabilityResult {
        if document.contains("productalert") {
            return AvailabilityResult::unavailable();
        }

        let doc = Html::parse_document(document);

        let Ok(price_selector) = Selector::parse("span.price") else {
            return AvailabilityResult::available(None);
        };

        let price = doc
            .select(&price_selector)
            .next()
            .map(|el| stripped_text(&el))
            .filter(|p| !p.is_empty());

        AvailabilityResult::available(price)
    }
}
