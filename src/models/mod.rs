//! Data models for the scraped page artifacts
//!
//! Field names and nesting are the wire contract for downstream consumers,
//! so every struct pins its serialized form with serde renames.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Inclusive combat power range. `{-1, -1}` means the source listed no CP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatPower {
    pub min: i32,
    pub max: i32,
}

impl CombatPower {
    pub const UNKNOWN: CombatPower = CombatPower { min: -1, max: -1 };
}

/// A hatchable Pokémon scraped from the egg pool page.
///
/// Identity is positional: the same Pokémon appearing under two egg
/// categories is two legitimate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonReward {
    pub name: String,
    pub egg_type: String,
    pub is_adventure_sync: bool,
    pub image: String,
    pub can_be_shiny: bool,
    pub combat_power: CombatPower,
    pub is_regional: bool,
    pub is_gift_exchange: bool,
    /// Number of mini-egg rarity icons on the card, 0 if absent.
    pub rarity: u32,
    pub rarity_tier: String,
}

/// Timezone tag parsed from an event's descriptive paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timezone {
    #[serde(rename = "Local Time")]
    LocalTime,
    #[serde(rename = "PST")]
    Pst,
    #[serde(rename = "PDT")]
    Pdt,
    #[serde(rename = "EST")]
    Est,
    #[serde(rename = "EDT")]
    Edt,
    #[serde(rename = "UTC")]
    Utc,
}

/// A timed event from the events listing page, dated via the events feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub name: String,
    pub event_type: String,
    pub heading: String,
    pub link: String,
    pub image: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<Timezone>,
    /// Reserved for detail-page enrichment; always null at this stage.
    pub extra_data: Option<serde_json::Value>,
}

/// One entry of the events JSON feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedEntry {
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Authoritative start/end timestamps for one eventID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDates {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Feed-derived lookup keyed by eventID.
pub type EventDateIndex = HashMap<String, EventDates>;

/// Short codes for the research task category headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Event,
    Catch,
    Throw,
    Battle,
    Explore,
    Training,
    Rocket,
    Buddy,
    Ar,
    Sponsored,
}

/// A field research task with its possible rewards.
///
/// `(text, type)` is the identity key: duplicate occurrences in the source
/// collapse into one task whose rewards concatenate in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTask {
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub task_type: Option<TaskCategory>,
    pub rewards: Vec<RewardItem>,
}

/// One possible reward of a research task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RewardItem {
    #[serde(rename = "encounter")]
    Encounter(EncounterReward),
    #[serde(rename = "item")]
    Item(ItemReward),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterReward {
    pub name: String,
    pub image: String,
    pub can_be_shiny: bool,
    pub combat_power: CombatPower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReward {
    pub name: String,
    pub image: String,
    pub quantity: u32,
}

/// Season-level metadata scraped from the research page's intro paragraphs.
///
/// Every field is best-effort: a pattern that never matches leaves its
/// default in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalInfo {
    pub breakthrough_pokemon: Vec<String>,
    pub spinda_patterns: Vec<u32>,
    pub season: Option<String>,
}

/// The research page artifact: seasonal metadata plus the task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPage {
    pub seasonal_info: SeasonalInfo,
    pub tasks: Vec<ResearchTask>,
}
