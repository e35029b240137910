//! Egg pool scraper
//!
//! The egg page is a flat sequence of category headings and card grids;
//! extraction folds over the content's direct children, carrying the
//! category in scope so each card is tagged with the heading above it.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::info;

use crate::fetch::Fetcher;
use crate::models::{CombatPower, PokemonReward};
use crate::normalize::{parse_combat_power_range, rarity_tier};
use crate::scrapers::{absolutize, has_match, select_attr, select_text, text_of};
use crate::traits::PageScraper;

pub struct EggScraper;

#[async_trait]
impl PageScraper for EggScraper {
    fn name(&self) -> &'static str {
        "eggs"
    }

    fn page_path(&self) -> &'static str {
        "/eggs/"
    }

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Value> {
        let html = fetcher.fetch_page(self.page_path()).await?;

        // Parse and extract in one scope so the document never crosses an
        // await point.
        let eggs = {
            let document = Html::parse_document(&html);
            extract_eggs(&document, fetcher.base_url())
        };

        info!("Extracted {} egg pool entries", eggs.len());
        Ok(serde_json::to_value(eggs)?)
    }
}

/// Category in scope while walking the page content. Headings update it,
/// the cards below them read it.
#[derive(Debug, Clone, Default)]
struct CurrentCategory {
    label: String,
    adventure_sync: bool,
    gift_exchange: bool,
}

impl CurrentCategory {
    fn from_heading(heading: &str) -> Self {
        let heading = heading.trim();
        Self {
            adventure_sync: heading.contains("(Adventure Sync Rewards)"),
            gift_exchange: heading.contains("(From Route Gift)"),
            label: heading.split(" Eggs").next().unwrap_or(heading).to_string(),
        }
    }
}

pub fn extract_eggs(document: &Html, base_url: &str) -> Vec<PokemonReward> {
    let content_selector = Selector::parse(".page-content").unwrap();
    let card_selector = Selector::parse(".pokemon-card").unwrap();

    let Some(content) = document.select(&content_selector).next() else {
        return Vec::new();
    };

    let mut eggs = Vec::new();
    let mut category = CurrentCategory::default();

    for child in content.children().filter_map(ElementRef::wrap) {
        if child.value().name() == "h2" {
            category = CurrentCategory::from_heading(&text_of(&child));
        } else if child.value().classes().any(|class| class == "egg-grid") {
            for card in child.select(&card_selector) {
                eggs.push(parse_card(&card, &category, base_url));
            }
        }
    }

    eggs
}

fn parse_card(card: &ElementRef, category: &CurrentCategory, base_url: &str) -> PokemonReward {
    let name_selector = Selector::parse(".name").unwrap();
    let image_selector = Selector::parse(".icon img").unwrap();
    let shiny_selector = Selector::parse(".shiny-icon").unwrap();
    let regional_selector = Selector::parse(".regional-icon").unwrap();
    let cp_selector = Selector::parse(".cp-range").unwrap();
    let rarity_selector = Selector::parse(".rarity").unwrap();
    let mini_egg_selector = Selector::parse("svg.mini-egg").unwrap();

    let combat_power = select_text(card, &cp_selector)
        .map(|text| {
            // The range text carries a "CP " label span.
            let value = text.trim().trim_start_matches("CP").trim();
            parse_combat_power_range(value)
        })
        .unwrap_or(CombatPower::UNKNOWN);

    let rarity = card
        .select(&rarity_selector)
        .next()
        .map(|div| div.select(&mini_egg_selector).count() as u32)
        .unwrap_or(0);

    PokemonReward {
        name: select_text(card, &name_selector).unwrap_or_default(),
        egg_type: category.label.clone(),
        is_adventure_sync: category.adventure_sync,
        image: select_attr(card, &image_selector, "src")
            .map(|src| absolutize(base_url, &src))
            .unwrap_or_default(),
        can_be_shiny: has_match(card, &shiny_selector),
        combat_power,
        is_regional: has_match(card, &regional_selector),
        is_gift_exchange: category.gift_exchange,
        rarity,
        rarity_tier: rarity_tier(rarity).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EGG_PAGE: &str = r#"
        <div class="page-content">
            <h2>2 km Eggs</h2>
            <div class="egg-grid">
                <div class="pokemon-card">
                    <span class="name">Pichu</span>
                    <div class="icon"><img src="/assets/pokemon/pichu.png"></div>
                    <svg class="shiny-icon"></svg>
                    <div class="cp-range"><span class="label">CP </span>332 - 368</div>
                    <div class="rarity"><svg class="mini-egg"></svg></div>
                </div>
                <div class="pokemon-card">
                    <span class="name">Larvitar</span>
                    <div class="icon"><img src="https://cdn.leekduck.com/assets/pokemon/larvitar.png"></div>
                    <div class="cp-range"><span class="label">CP </span>520</div>
                    <div class="rarity">
                        <svg class="mini-egg"></svg>
                        <svg class="mini-egg"></svg>
                        <svg class="mini-egg"></svg>
                    </div>
                </div>
            </div>
            <h2>5 km Eggs (Adventure Sync Rewards)</h2>
            <div class="egg-grid">
                <div class="pokemon-card">
                    <span class="name">Riolu</span>
                    <div class="icon"><img src="/assets/pokemon/riolu.png"></div>
                    <svg class="regional-icon"></svg>
                </div>
            </div>
            <h2>7 km Eggs (From Route Gift)</h2>
            <div class="egg-grid">
                <div class="pokemon-card">
                    <span class="name">Hisuian Growlithe</span>
                    <div class="icon"><img src="/assets/pokemon/growlithe-h.png"></div>
                </div>
            </div>
        </div>
    "#;

    fn extract_fixture() -> Vec<PokemonReward> {
        let document = Html::parse_document(EGG_PAGE);
        extract_eggs(&document, "https://leekduck.com")
    }

    #[test]
    fn cards_are_tagged_with_the_category_in_scope() {
        let eggs = extract_fixture();
        assert_eq!(eggs.len(), 4);

        assert_eq!(eggs[0].egg_type, "2 km");
        assert!(!eggs[0].is_adventure_sync);
        assert!(!eggs[0].is_gift_exchange);

        assert_eq!(eggs[2].egg_type, "5 km");
        assert!(eggs[2].is_adventure_sync);
        assert!(!eggs[2].is_gift_exchange);

        assert_eq!(eggs[3].egg_type, "7 km");
        assert!(!eggs[3].is_adventure_sync);
        assert!(eggs[3].is_gift_exchange);
    }

    #[test]
    fn card_fields_parse() {
        let eggs = extract_fixture();
        let pichu = &eggs[0];

        assert_eq!(pichu.name, "Pichu");
        assert_eq!(pichu.image, "https://leekduck.com/assets/pokemon/pichu.png");
        assert!(pichu.can_be_shiny);
        assert!(!pichu.is_regional);
        assert_eq!(pichu.combat_power, CombatPower { min: 332, max: 368 });
        assert_eq!(pichu.rarity, 1);
        assert_eq!(pichu.rarity_tier, "Common");
    }

    #[test]
    fn single_cp_token_sets_both_bounds() {
        let eggs = extract_fixture();
        let larvitar = &eggs[1];

        assert_eq!(larvitar.combat_power, CombatPower { min: 520, max: 520 });
        assert_eq!(larvitar.rarity, 3);
        assert_eq!(larvitar.rarity_tier, "Rare");
    }

    #[test]
    fn missing_card_extras_default() {
        let eggs = extract_fixture();
        let riolu = &eggs[2];

        assert!(!riolu.can_be_shiny);
        assert!(riolu.is_regional);
        assert_eq!(riolu.combat_power, CombatPower::UNKNOWN);
        assert_eq!(riolu.rarity, 0);
        assert_eq!(riolu.rarity_tier, "Unknown");
    }

    #[test]
    fn extraction_is_idempotent() {
        let document = Html::parse_document(EGG_PAGE);
        let first = extract_eggs(&document, "https://leekduck.com");
        let second = extract_eggs(&document, "https://leekduck.com");
        assert_eq!(first, second);
    }
}
