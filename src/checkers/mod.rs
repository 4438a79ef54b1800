// Per-store availability heuristics
pub mod amazon;
pub mod panini;

pub use amazon::AmazonChecker;
pub use panini::PaniniChecker;

use crate::models::{AvailabilityResult, StoreKind};

/// Classifies a fetched product page. Implementations must never fail:
/// anything unexpected degrades to unavailable with no price.
pub trait StoreChecker: Send + Sync {
    fn store_name(&self) -> &'static str;
    fn evaluate(&self, document: &str) -> AvailabilityResult;
}

/// Selects the heuristic for a store. The set of stores is closed, so this
/// is resolved once per product at poll time without any allocation.
pub fn checker_for(store: StoreKind) -> &'static dyn StoreChecker {
    match store {
        StoreKind::Panini => &PaniniChecker,
        StoreKind::Amazon => &AmazonChecker,
    }
}

/// BeautifulSoup-style `get_text(strip=True)`: concatenates the trimmed,
/// non-empty text fragments of an element.
pub(crate) fn stripped_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
