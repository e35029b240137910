//! Per-page scrapers and the selector helpers they share.

pub mod eggs;
pub mod events;
pub mod research;

use scraper::{ElementRef, Selector};

/// Concatenated, trimmed text content of an element.
pub(crate) fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first descendant matching the selector.
pub(crate) fn select_text(scope: &ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(|el| text_of(&el))
}

/// Attribute of the first descendant matching the selector.
pub(crate) fn select_attr(scope: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Whether any descendant matches the selector.
pub(crate) fn has_match(scope: &ElementRef, selector: &Selector) -> bool {
    scope.select(selector).next().is_some()
}

/// Resolves a possibly relative URL against the site base.
pub(crate) fn absolutize(base_url: &str, url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else if url.starts_with("//") {
        format!("https:{url}")
    } else {
        format!("{base_url}{url}")
    }
}
