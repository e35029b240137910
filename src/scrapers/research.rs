//! Field research scraper
//!
//! The research page carries two layers of data: free-text intro
//! paragraphs with season-level metadata, and the task catalogue grouped
//! by category section. Tasks duplicated across the page merge on their
//! (text, type) key.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Value, json};
use tracing::info;

use crate::fetch::Fetcher;
use crate::models::{
    CombatPower, EncounterReward, ItemReward, ResearchPage, ResearchTask, RewardItem,
    SeasonalInfo, TaskCategory,
};
use crate::normalize::{parse_quantity, parse_trailing_int, try_parse_quantity};
use crate::scrapers::{absolutize, has_match, select_attr, select_text, text_of};
use crate::traits::PageScraper;

/// Category heading to short code, in page order.
const TASK_CATEGORIES: [(&str, TaskCategory); 10] = [
    ("Event Tasks", TaskCategory::Event),
    ("Catching Tasks", TaskCategory::Catch),
    ("Throwing Tasks", TaskCategory::Throw),
    ("Battling Tasks", TaskCategory::Battle),
    ("Exploring Tasks", TaskCategory::Explore),
    ("Training Tasks", TaskCategory::Training),
    ("Team GO Rocket Tasks", TaskCategory::Rocket),
    ("Buddy & Friendship Tasks", TaskCategory::Buddy),
    ("AR Scanning Tasks", TaskCategory::Ar),
    ("Sponsored Tasks", TaskCategory::Sponsored),
];

const BREAKTHROUGH_MARKER: &str = "encounter with one of the following Pokémon: ";

pub struct ResearchScraper;

#[async_trait]
impl PageScraper for ResearchScraper {
    fn name(&self) -> &'static str {
        "research"
    }

    fn page_path(&self) -> &'static str {
        "/research/"
    }

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Value> {
        let html = fetcher.fetch_page(self.page_path()).await?;

        let page = {
            let document = Html::parse_document(&html);
            ResearchPage {
                seasonal_info: extract_seasonal_info(&document),
                tasks: extract_tasks(&document, fetcher.base_url()),
            }
        };

        info!("Extracted {} research tasks", page.tasks.len());
        Ok(serde_json::to_value(page)?)
    }

    fn empty_value(&self) -> Value {
        json!({
            "seasonalInfo": {
                "breakthroughPokemon": [],
                "spindaPatterns": [],
                "season": null
            },
            "tasks": []
        })
    }
}

/// Scans the intro paragraphs for season-level metadata. Each of the three
/// extractions locks in its first successful match; a paragraph that never
/// matches leaves the field at its default.
pub fn extract_seasonal_info(document: &Html) -> SeasonalInfo {
    let paragraph_selector = Selector::parse(".page-content > p").unwrap();

    let mut info = SeasonalInfo::default();

    for paragraph in document.select(&paragraph_selector) {
        let text = text_of(&paragraph);

        if info.breakthrough_pokemon.is_empty()
            && text.contains("Research Breakthrough")
            && text.contains("encounter")
        {
            if let Some(names) = breakthrough_names(&text) {
                info.breakthrough_pokemon = names;
            }
        }

        if info.spinda_patterns.is_empty() && text.to_lowercase().contains("spinda") {
            if let Some(patterns) = spinda_patterns(&text) {
                info.spinda_patterns = patterns;
            }
        }

        if info.season.is_none() && (text.contains("Season,") || text.contains("season,")) {
            if let Some(season) = season_name(&text) {
                info.season = Some(season);
            }
        }
    }

    info
}

/// Names listed after the breakthrough marker, up to the sentence period.
fn breakthrough_names(text: &str) -> Option<Vec<String>> {
    let rest = text.split_once(BREAKTHROUGH_MARKER)?.1;
    let list = rest.split('.').next().unwrap_or(rest);

    let names: Vec<String> = list
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() { None } else { Some(names) }
}

/// Pattern numbers from a "pattern(s) N [and M]" phrase.
fn spinda_patterns(text: &str) -> Option<Vec<u32>> {
    let lower = text.to_lowercase();
    let after = &lower[lower.find("pattern")? + "pattern".len()..];
    let after = after.strip_prefix('s').unwrap_or(after);
    if !after.starts_with(char::is_whitespace) {
        return None;
    }

    let (first, rest) = leading_number(after.trim_start())?;
    let mut patterns = vec![first];

    if let Some(after_and) = rest.trim_start().strip_prefix("and") {
        if let Some((second, _)) = leading_number(after_and.trim_start()) {
            patterns.push(second);
        }
    }

    Some(patterns)
}

/// Season name from a "Season, X." phrase, text up to the period.
fn season_name(text: &str) -> Option<String> {
    let at = text.find("Season,").or_else(|| text.find("season,"))?;
    let rest = text[at + "Season,".len()..].trim_start();
    let name = rest.split('.').next()?.trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Splits a leading digit run off the text.
fn leading_number(text: &str) -> Option<(u32, &str)> {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let value = text[..end].parse().ok()?;
    Some((value, &text[end..]))
}

pub fn extract_tasks(document: &Html, base_url: &str) -> Vec<ResearchTask> {
    let category_selector = Selector::parse(".task-category").unwrap();
    let heading_selector = Selector::parse("h2").unwrap();
    let item_selector = Selector::parse(".task-list > .task-item").unwrap();
    let text_selector = Selector::parse(".task-text").unwrap();
    let reward_selector = Selector::parse(".reward-list > .reward").unwrap();

    let mut tasks: Vec<ResearchTask> = Vec::new();

    for section in document.select(&category_selector) {
        let task_type = select_text(&section, &heading_selector)
            .as_deref()
            .and_then(category_code);

        for item in section.select(&item_selector) {
            let Some(text) = select_text(&item, &text_selector) else {
                continue;
            };

            let rewards: Vec<RewardItem> = item
                .select(&reward_selector)
                .filter_map(|reward| parse_reward(&reward, base_url))
                .collect();

            // A task whose rewards all failed to parse is dropped.
            if rewards.is_empty() {
                continue;
            }

            append_task(&mut tasks, text, task_type, rewards);
        }
    }

    tasks
}

fn category_code(heading: &str) -> Option<TaskCategory> {
    TASK_CATEGORIES
        .iter()
        .find(|(name, _)| *name == heading.trim())
        .map(|&(_, code)| code)
}

/// Appends a task, merging into an existing entry when the (text, type)
/// key already exists; the merged task keeps its first-seen position.
fn append_task(
    tasks: &mut Vec<ResearchTask>,
    text: String,
    task_type: Option<TaskCategory>,
    rewards: Vec<RewardItem>,
) {
    if let Some(existing) = tasks
        .iter_mut()
        .find(|task| task.text == text && task.task_type == task_type)
    {
        existing.rewards.extend(rewards);
    } else {
        tasks.push(ResearchTask {
            text,
            task_type,
            rewards,
        });
    }
}

/// Branches on the reward-type attribute; unrecognized types are skipped.
fn parse_reward(reward: &ElementRef, base_url: &str) -> Option<RewardItem> {
    match reward.value().attr("data-reward-type").unwrap_or("unknown") {
        "encounter" => Some(RewardItem::Encounter(parse_encounter(reward, base_url))),
        "item" => Some(RewardItem::Item(parse_item(reward, base_url))),
        _ => None,
    }
}

fn parse_encounter(reward: &ElementRef, base_url: &str) -> EncounterReward {
    let label_selector = Selector::parse(".reward-label > span").unwrap();
    let image_selector = Selector::parse(".reward-bubble > .reward-image").unwrap();
    let shiny_selector = Selector::parse(".reward-bubble > .shiny-icon").unwrap();
    let min_cp_selector = Selector::parse(".cp-values > .min-cp").unwrap();
    let max_cp_selector = Selector::parse(".cp-values > .max-cp").unwrap();

    // The CP bounds trail a label element inside each value node.
    let min = select_text(reward, &min_cp_selector)
        .map(|text| parse_trailing_int(&text))
        .unwrap_or(-1);
    let max = select_text(reward, &max_cp_selector)
        .map(|text| parse_trailing_int(&text))
        .unwrap_or(-1);

    EncounterReward {
        name: select_text(reward, &label_selector).unwrap_or_default(),
        image: select_attr(reward, &image_selector, "src")
            .map(|src| absolutize(base_url, &src))
            .unwrap_or_default(),
        can_be_shiny: has_match(reward, &shiny_selector),
        combat_power: CombatPower { min, max },
    }
}

fn parse_item(reward: &ElementRef, base_url: &str) -> ItemReward {
    let label_selector = Selector::parse(".reward-label > span").unwrap();
    let multiplier_selector = Selector::parse(".reward-bubble > .multiplier").unwrap();
    let image_selector = Selector::parse(".reward-bubble > .reward-image").unwrap();

    let (name, quantity) = match select_text(reward, &label_selector) {
        Some(label) => {
            let mut quantity = parse_quantity(&label);
            // A dedicated multiplier badge outranks the inline label.
            if let Some(multiplier) = select_text(reward, &multiplier_selector)
                && let Some(parsed) = try_parse_quantity(&multiplier)
            {
                quantity = parsed;
            }
            (label, quantity)
        }
        None => (String::new(), 1),
    };

    ItemReward {
        name,
        image: select_attr(reward, &image_selector, "src")
            .map(|src| absolutize(base_url, &src))
            .unwrap_or_default(),
        quantity,
    }
}
