//! Event listing scraper
//!
//! Events come from two sources: the listing page supplies every display
//! field, and the events feed supplies authoritative start/end timestamps
//! keyed by eventID. A multi-phase event can appear in both the current
//! and upcoming groups; such duplicates are merged after the scan.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, warn};

use crate::fetch::Fetcher;
use crate::models::{Event, EventDateIndex, EventDates, FeedEntry};
use crate::normalize::{canonicalize_timestamp, detect_timezone, rewrite_asset_url};
use crate::scrapers::{absolutize, select_attr, select_text};
use crate::traits::PageScraper;

const FEED_PATH: &str = "/feeds/events.json";

/// The two display groups, scanned in this fixed order.
const DISPLAY_GROUPS: [&str; 2] = ["current", "upcoming"];

pub struct EventScraper;

#[async_trait]
impl PageScraper for EventScraper {
    fn name(&self) -> &'static str {
        "events"
    }

    fn page_path(&self) -> &'static str {
        "/events/"
    }

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Value> {
        // A broken feed degrades to an empty index; the page scrape still
        // runs and emits events with null dates.
        let dates = match fetcher.fetch_feed(FEED_PATH).await {
            Ok(feed) => build_date_index(&feed),
            Err(e) => {
                warn!("Failed to load events feed, dates will be null: {e:#}");
                EventDateIndex::new()
            }
        };

        let html = fetcher.fetch_page(self.page_path()).await?;

        let events = {
            let document = Html::parse_document(&html);
            let scraped = extract_events(&document, &dates, fetcher.base_url());
            merge_duplicate_events(scraped)
        };

        info!("Extracted {} events", events.len());
        Ok(serde_json::to_value(events)?)
    }
}

pub fn build_date_index(feed: &[FeedEntry]) -> EventDateIndex {
    feed.iter()
        .map(|entry| {
            (
                entry.event_id.clone(),
                EventDates {
                    start: entry.start.clone(),
                    end: entry.end.clone(),
                },
            )
        })
        .collect()
}

pub fn extract_events(document: &Html, dates: &EventDateIndex, base_url: &str) -> Vec<Event> {
    let heading_selector = Selector::parse(".event-item-wrapper > p").unwrap();
    let name_selector = Selector::parse(".event-text > h2").unwrap();
    let description_selector = Selector::parse(".event-text > p").unwrap();
    let image_selector = Selector::parse(".event-img-wrapper img").unwrap();
    let wrapper_selector = Selector::parse(".event-item-wrapper").unwrap();

    let mut events = Vec::new();

    for group in DISPLAY_GROUPS {
        let link_selector =
            Selector::parse(&format!("div.events-list.{group}-events a.event-item-link")).unwrap();

        for link in document.select(&link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let link_url = absolutize(base_url, href);

            let Some((_, trailing)) = link_url.split_once("/events/") else {
                warn!("Event link without an /events/ path segment: {link_url}");
                continue;
            };
            let event_id = trailing.trim_end_matches('/').to_string();

            let heading = select_text(&link, &heading_selector).unwrap_or_default();
            let name = select_text(&link, &name_selector).unwrap_or_default();

            let timezone = select_text(&link, &description_selector)
                .as_deref()
                .and_then(detect_timezone);

            let image = select_attr(&link, &image_selector, "src")
                .map(|src| rewrite_asset_url(&absolutize(base_url, &src)))
                .unwrap_or_default();

            let event_type = link
                .select(&wrapper_selector)
                .next()
                .and_then(|wrapper| wrapper.value().attr("class"))
                .unwrap_or_default()
                .replace("event-item-wrapper ", "")
                .replace("Ã©", "e");

            let entry = dates.get(&event_id);
            if entry.is_none() {
                warn!("Event '{event_id}' not present in events feed. Date values will be null.");
            }
            let start = entry
                .and_then(|d| d.start.clone())
                .filter(|s| !s.is_empty())
                .map(|s| canonicalize_timestamp(&s));
            let end = entry
                .and_then(|d| d.end.clone())
                .filter(|s| !s.is_empty())
                .map(|s| canonicalize_timestamp(&s));

            events.push(Event {
                event_id,
                name,
                event_type,
                heading,
                link: link_url,
                image,
                start,
                end,
                timezone,
                extra_data: None,
            });
        }
    }

    events
}

/// Collapses events sharing an eventID into one record at the first
/// occurrence's position.
///
/// The merged start is the first non-null start in scan order; the merged
/// end is the first non-null end among the *other* occurrences (among all
/// of them when no occurrence has a start). Every other field comes from
/// the first occurrence.
pub fn merge_duplicate_events(events: Vec<Event>) -> Vec<Event> {
    let mut groups: HashMap<String, Vec<Event>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for event in events {
        let occurrences = groups.entry(event.event_id.clone()).or_default();
        if occurrences.is_empty() {
            order.push(event.event_id.clone());
        }
        occurrences.push(event);
    }

    order
        .into_iter()
        .map(|event_id| {
            let occurrences = groups.remove(&event_id).unwrap_or_default();
            merge_group(occurrences)
        })
        .collect()
}

fn merge_group(mut occurrences: Vec<Event>) -> Event {
    if occurrences.len() == 1 {
        return occurrences.remove(0);
    }

    let start_index = occurrences.iter().position(|e| e.start.is_some());
    let start = start_index.and_then(|i| occurrences[i].start.clone());
    let end = occurrences
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != start_index)
        .find_map(|(_, e)| e.end.clone());

    let mut merged = occurrences.remove(0);
    merged.start = start;
    merged.end = end;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timezone;

    const EVENTS_PAGE: &str = r#"
        <div class="events-list current-events">
            <a class="event-item-link" href="/events/community-day-june/">
                <div class="event-item-wrapper community-day">
                    <p>Current</p>
                    <div class="event-item">
                        <div class="event-img-wrapper">
                            <img src="https://leekduck.com/cdn-cgi/image/w=400/assets/events/cday.jpg">
                        </div>
                        <div class="event-text-container">
                            <div class="event-text">
                                <h2>Community Day</h2>
                                <p>June 1, at 2:00 p.m. Local Time</p>
                            </div>
                        </div>
                    </div>
                </div>
            </a>
        </div>
        <div class="events-list upcoming-events">
            <a class="event-item-link" href="/events/pokU+00C3U+00A9mon-spotlight/">
                <div class="event-item-wrapper pokU+00C3U+00A9mon-spotlight-hour">
                    <p>Upcoming</p>
                    <div class="event-item">
                        <div class="event-img-wrapper">
                            <img src="/assets/events/spotlight.jpg">
                        </div>
                        <div class="event-text-container">
                            <div class="event-text">
                                <h2>Spotlight Hour</h2>
                                <p>June 3, at 6:00 p.m. PDT</p>
                            </div>
                        </div>
                    </div>
                </div>
            </a>
        </div>
    "#;

    fn fixture_page() -> String {
        // The mojibake bytes are kept out of the source literal.
        EVENTS_PAGE.replace("U+00C3U+00A9", "\u{c3}\u{a9}")
    }

    fn dated(event_id: &str, start: Option<&str>, end: Option<&str>) -> Event {
        Event {
            event_id: event_id.to_string(),
            name: String::new(),
            event_type: String::new(),
            heading: String::new(),
            link: String::new(),
            image: String::new(),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            timezone: None,
            extra_data: None,
        }
    }

    #[test]
    fn scrapes_both_display_groups_in_order() {
        let document = Html::parse_document(&fixture_page());
        let mut dates = EventDateIndex::new();
        dates.insert(
            "community-day-june".to_string(),
            EventDates {
                start: Some("2024-06-01T14:00:00".to_string()),
                end: Some("2024-06-01T17:00:00".to_string()),
            },
        );

        let events = extract_events(&document, &dates, "https://leekduck.com");
        assert_eq!(events.len(), 2);

        let community_day = &events[0];
        assert_eq!(community_day.event_id, "community-day-june");
        assert_eq!(community_day.name, "Community Day");
        assert_eq!(community_day.event_type, "community-day");
        assert_eq!(community_day.heading, "Current");
        assert_eq!(
            community_day.link,
            "https://leekduck.com/events/community-day-june/"
        );
        assert_eq!(
            community_day.image,
            "https://cdn.leekduck.com/assets/events/cday.jpg"
        );
        assert_eq!(community_day.start.as_deref(), Some("2024-06-01T14:00:00"));
        assert_eq!(community_day.end.as_deref(), Some("2024-06-01T17:00:00"));
        assert_eq!(community_day.timezone, Some(Timezone::LocalTime));
        assert_eq!(community_day.extra_data, None);
    }

    #[test]
    fn missing_feed_entry_yields_null_dates() {
        let document = Html::parse_document(&fixture_page());
        let events = extract_events(&document, &EventDateIndex::new(), "https://leekduck.com");

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.start.is_none() && e.end.is_none()));
    }

    #[test]
    fn event_type_slug_corrects_mojibake() {
        let document = Html::parse_document(&fixture_page());
        let events = extract_events(&document, &EventDateIndex::new(), "https://leekduck.com");

        let spotlight = &events[1];
        assert_eq!(spotlight.event_type, "pokemon-spotlight-hour");
        assert_eq!(spotlight.timezone, Some(Timezone::Pdt));
        assert_eq!(
            spotlight.image,
            "https://leekduck.com/assets/events/spotlight.jpg"
        );
    }

    #[test]
    fn verbose_feed_dates_are_canonicalized() {
        let document = Html::parse_document(&fixture_page());
        let mut dates = EventDateIndex::new();
        dates.insert(
            "community-day-june".to_string(),
            EventDates {
                start: Some("2024-06-01T14:00:00.000-07:00".to_string()),
                end: None,
            },
        );

        let events = extract_events(&document, &dates, "https://leekduck.com");
        assert_eq!(
            events[0].start.as_deref(),
            Some("2024-06-01T21:00:00.000Z")
        );
    }

    #[test]
    fn duplicate_merge_takes_first_start_and_second_end() {
        let events = vec![
            dated("x", Some("2024-01-01"), None),
            dated("y", None, None),
            dated("x", None, Some("2024-01-02")),
        ];

        let merged = merge_duplicate_events(events);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].event_id, "x");
        assert_eq!(merged[0].start.as_deref(), Some("2024-01-01"));
        assert_eq!(merged[0].end.as_deref(), Some("2024-01-02"));
        assert_eq!(merged[1].event_id, "y");
    }

    #[test]
    fn duplicate_merge_inverts_roles_when_first_start_is_null() {
        let events = vec![
            dated("x", None, Some("2024-01-05")),
            dated("x", Some("2024-01-03"), Some("2024-01-06")),
        ];

        let merged = merge_duplicate_events(events);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start.as_deref(), Some("2024-01-03"));
        assert_eq!(merged[0].end.as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn duplicate_merge_ignores_the_start_suppliers_own_end() {
        let events = vec![
            dated("x", Some("2024-01-01"), Some("2024-01-02")),
            dated("x", Some("2024-01-03"), None),
        ];

        let merged = merge_duplicate_events(events);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start.as_deref(), Some("2024-01-01"));
        assert_eq!(merged[0].end, None);
    }

    #[test]
    fn three_occurrences_follow_the_generalized_rule() {
        let events = vec![
            dated("x", None, None),
            dated("x", Some("2024-02-01"), Some("2024-02-02")),
            dated("x", Some("2024-02-03"), Some("2024-02-04")),
        ];

        let merged = merge_duplicate_events(events);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start.as_deref(), Some("2024-02-01"));
        assert_eq!(merged[0].end.as_deref(), Some("2024-02-04"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let document = Html::parse_document(&fixture_page());
        let first = extract_events(&document, &EventDateIndex::new(), "https://leekduck.com");
        let second = extract_events(&document, &EventDateIndex::new(), "https://leekduck.com");
        assert_eq!(first, second);
    }
}
