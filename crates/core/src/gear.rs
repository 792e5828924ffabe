//! Equipment bucketing, template personalization and best-pick helpers.
//!
//! The engine never owns the user's gear; it receives a snapshot for the
//! turn, partitions it into [`GearBuckets`], and substitutes the reserved
//! placeholders (`[CAMERA]`, `[LENS]`, `[LIGHTING]`) in knowledge-base text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CAMERA_PLACEHOLDER: &str = "[CAMERA]";
pub const LENS_PLACEHOLDER: &str = "[LENS]";
pub const LIGHTING_PLACEHOLDER: &str = "[LIGHTING]";

/// A prime within this many millimetres of a requested focal length counts
/// as a match.
pub const FOCAL_MATCH_TOLERANCE_MM: u32 = 15;

/// `85mm`, `24-70mm`, `70 - 200 mm`.
static FOCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,4})(?:\s*-\s*(\d{1,4}))?\s*mm").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Equipment categories. Anything not in the closed set deserializes to
/// [`GearCategory::Unknown`] and is dropped by [`bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearCategory {
    CameraBody,
    Lens,
    Lighting,
    Backdrop,
    Accessory,
    #[serde(other)]
    Unknown,
}

/// One piece of equipment owned by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub category: GearCategory,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, serde_json::Value>>,
}

impl GearItem {
    pub fn new(category: GearCategory, brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            category,
            brand: brand.into(),
            model: model.into(),
            specifications: None,
        }
    }

    /// Attach a specification entry (builder style).
    pub fn with_spec(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.specifications
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// `"brand model"`, as shown to the user.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    /// Lower-cased brand, model and string/number spec values, used for
    /// keyword scoring.
    fn search_text(&self) -> String {
        let mut text = format!("{} {}", self.brand, self.model);
        if let Some(specs) = &self.specifications {
            for value in specs.values() {
                match value {
                    serde_json::Value::String(s) => {
                        text.push(' ');
                        text.push_str(s);
                    }
                    serde_json::Value::Number(n) => {
                        text.push(' ');
                        text.push_str(&n.to_string());
                    }
                    _ => {}
                }
            }
        }
        text.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Gear partitioned by category, preserving input order within each bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GearBuckets {
    pub cameras: Vec<GearItem>,
    pub lenses: Vec<GearItem>,
    pub lighting: Vec<GearItem>,
    pub backdrops: Vec<GearItem>,
    pub accessories: Vec<GearItem>,
}

/// Partition `items` into buckets in a single pass.
pub fn bucket(items: &[GearItem]) -> GearBuckets {
    let mut buckets = GearBuckets::default();
    for item in items {
        let target = match item.category {
            GearCategory::CameraBody => &mut buckets.cameras,
            GearCategory::Lens => &mut buckets.lenses,
            GearCategory::Lighting => &mut buckets.lighting,
            GearCategory::Backdrop => &mut buckets.backdrops,
            GearCategory::Accessory => &mut buckets.accessories,
            GearCategory::Unknown => continue,
        };
        target.push(item.clone());
    }
    buckets
}

impl GearBuckets {
    pub fn has_lighting(&self) -> bool {
        !self.lighting.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
            && self.lenses.is_empty()
            && self.lighting.is_empty()
            && self.backdrops.is_empty()
            && self.accessories.is_empty()
    }

    /// Brand/model-only copy suitable for the persisted session context.
    pub fn snapshot(&self) -> GearSnapshot {
        fn refs(items: &[GearItem]) -> Vec<GearRef> {
            items
                .iter()
                .map(|item| GearRef {
                    brand: item.brand.clone(),
                    model: item.model.clone(),
                })
                .collect()
        }

        GearSnapshot {
            cameras: refs(&self.cameras),
            lenses: refs(&self.lenses),
            lighting: refs(&self.lighting),
            backdrops: refs(&self.backdrops),
            accessories: refs(&self.accessories),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot (persisted form)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearRef {
    pub brand: String,
    pub model: String,
}

/// Serialized gear carried in the conversation context between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearSnapshot {
    #[serde(default)]
    pub cameras: Vec<GearRef>,
    #[serde(default)]
    pub lenses: Vec<GearRef>,
    #[serde(default)]
    pub lighting: Vec<GearRef>,
    #[serde(default)]
    pub backdrops: Vec<GearRef>,
    #[serde(default)]
    pub accessories: Vec<GearRef>,
}

impl GearSnapshot {
    /// Rebuild buckets (without specifications) from the persisted form.
    pub fn to_buckets(&self) -> GearBuckets {
        fn items(category: GearCategory, refs: &[GearRef]) -> Vec<GearItem> {
            refs.iter()
                .map(|r| GearItem::new(category, r.brand.clone(), r.model.clone()))
                .collect()
        }

        GearBuckets {
            cameras: items(GearCategory::CameraBody, &self.cameras),
            lenses: items(GearCategory::Lens, &self.lenses),
            lighting: items(GearCategory::Lighting, &self.lighting),
            backdrops: items(GearCategory::Backdrop, &self.backdrops),
            accessories: items(GearCategory::Accessory, &self.accessories),
        }
    }
}

// ---------------------------------------------------------------------------
// Personalization
// ---------------------------------------------------------------------------

/// Substitute the gear placeholders in `template` with the user's items.
///
/// A placeholder whose bucket is empty is left in place so the generic
/// wording survives.
pub fn personalize(template: &str, buckets: &GearBuckets) -> String {
    let mut content = template.to_string();

    if let Some(camera) = buckets.cameras.first() {
        content = content.replace(CAMERA_PLACEHOLDER, &camera.display_name());
    }
    if !buckets.lenses.is_empty() {
        content = content.replace(LENS_PLACEHOLDER, &join_names(&buckets.lenses));
    }
    if !buckets.lighting.is_empty() {
        content = content.replace(LIGHTING_PLACEHOLDER, &join_names(&buckets.lighting));
    }

    content
}

fn join_names(items: &[GearItem]) -> String {
    items
        .iter()
        .map(GearItem::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Scenario-aware best picks
// ---------------------------------------------------------------------------

const LOW_LIGHT_CAMERAS: &[&str] = &[
    "a7s", "a7 iii", "a7iii", "a7 iv", "a7iv", "r6", "z6", "d750", "full frame", "full-frame",
    "low light", "low-light", "dual iso",
];

const HIGH_RESOLUTION_CAMERAS: &[&str] = &[
    "a7r", "r5", "5ds", "d850", "z7", "z8", "gfx", "45mp", "50mp", "61mp", "high resolution",
    "medium format",
];

const FAST_BURST_CAMERAS: &[&str] = &[
    "a9", "a1", "r3", "r7", "1d x", "1dx", "d6", "d500", "z9", "x-h2s", "om-1", "stacked",
    "burst",
];

const PORTRAIT_LENSES: &[&str] = &[
    "85mm", "105mm", "135mm", "70-200", "56mm", "f/1.4", "f1.4", "f/1.8", "f1.8", "portrait",
];

const TELEPHOTO_LENSES: &[&str] = &[
    "70-200", "100-400", "100-500", "150-600", "200-600", "300mm", "400mm", "telephoto",
];

const WIDE_ANGLE_LENSES: &[&str] = &[
    "14mm", "16-35", "14-24", "15-35", "12-24", "20mm", "24mm", "fisheye", "wide", "f/1.4",
    "f/1.8", "f/2.8",
];

const STANDARD_ZOOM_LENSES: &[&str] = &["24-70", "24-105", "24-120", "28-75", "35mm", "standard"];

/// Keyword profile used to rank cameras for a scenario.
pub fn camera_keywords(scenario: &str) -> &'static [&'static str] {
    match scenario {
        "sports_action" => FAST_BURST_CAMERAS,
        "astrophotography" | "boudoir" | "group_event" | "natural_light_portrait" => {
            LOW_LIGHT_CAMERAS
        }
        "dark_moody_fashion"
        | "high_key_glamour"
        | "corporate_headshot"
        | "beach_golden_hour"
        | "drone_aerial"
        | "infrared_landscape" => HIGH_RESOLUTION_CAMERAS,
        _ => &[],
    }
}

/// Keyword profile used to rank lenses for a scenario.
pub fn lens_keywords(scenario: &str) -> &'static [&'static str] {
    match scenario {
        "sports_action" => TELEPHOTO_LENSES,
        "astrophotography" | "underwater" | "drone_aerial" | "infrared_landscape" => {
            WIDE_ANGLE_LENSES
        }
        "group_event" => STANDARD_ZOOM_LENSES,
        "dark_moody_fashion"
        | "high_key_glamour"
        | "boudoir"
        | "corporate_headshot"
        | "beach_golden_hour"
        | "natural_light_portrait" => PORTRAIT_LENSES,
        _ => &[],
    }
}

/// Number of profile keywords found in the item's text.
pub fn score_item(item: &GearItem, keywords: &[&str]) -> usize {
    let text = item.search_text();
    keywords.iter().filter(|kw| contains_token(&text, kw)).count()
}

/// Whether `keyword` occurs in `text` as a model token: it must not continue
/// an alphanumeric run on the left, and a trailing digit must not run into
/// further digits ("d6" never matches "d600", "r3" never matches "a7r3").
fn contains_token(text: &str, keyword: &str) -> bool {
    let ends_with_digit = keyword.chars().next_back().is_some_and(|c| c.is_ascii_digit());
    text.match_indices(keyword).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + keyword.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric)
            && !(ends_with_digit && after.is_some_and(|c| c.is_ascii_digit()))
    })
}

/// Highest-scoring item; ties (including an all-zero field) go to the
/// earliest item.
pub fn best_pick<'a>(items: &'a [GearItem], keywords: &[&str]) -> Option<&'a GearItem> {
    let mut best: Option<(&GearItem, usize)> = None;
    for item in items {
        let score = score_item(item, keywords);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((item, score)),
        }
    }
    best.map(|(item, _)| item)
}

pub fn best_camera<'a>(buckets: &'a GearBuckets, scenario: &str) -> Option<&'a GearItem> {
    best_pick(&buckets.cameras, camera_keywords(scenario))
}

pub fn best_lens<'a>(buckets: &'a GearBuckets, scenario: &str) -> Option<&'a GearItem> {
    best_pick(&buckets.lenses, lens_keywords(scenario))
}

// ---------------------------------------------------------------------------
// Focal length matching
// ---------------------------------------------------------------------------

/// First focal length (or range) mentioned in free text, in millimetres.
///
/// Returns `(min, max)`; primes have `min == max`.
pub fn parse_focal_range(text: &str) -> Option<(u32, u32)> {
    let caps = FOCAL_RE.captures(text)?;
    let low: u32 = caps.get(1)?.as_str().parse().ok()?;
    let high: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => low,
    };
    Some((low.min(high), low.max(high)))
}

/// A single focal length from an analysis hint. Ranges collapse to their
/// midpoint.
pub fn parse_focal_length(text: &str) -> Option<u32> {
    parse_focal_range(text).map(|(low, high)| (low + high) / 2)
}

/// Best-effort lens for a target focal length: the first zoom covering it,
/// otherwise the nearest prime within [`FOCAL_MATCH_TOLERANCE_MM`].
pub fn lens_for_focal_length(lenses: &[GearItem], mm: u32) -> Option<&GearItem> {
    let parsed: Vec<(&GearItem, (u32, u32))> = lenses
        .iter()
        .filter_map(|lens| parse_focal_range(&lens.search_text()).map(|range| (lens, range)))
        .collect();

    if let Some((lens, _)) = parsed
        .iter()
        .find(|(_, (low, high))| low != high && (*low..=*high).contains(&mm))
    {
        return Some(lens);
    }

    parsed
        .iter()
        .map(|(lens, (low, high))| {
            let distance = if mm < *low {
                low - mm
            } else if mm > *high {
                mm - high
            } else {
                0
            };
            (*lens, distance)
        })
        .filter(|(_, distance)| *distance <= FOCAL_MATCH_TOLERANCE_MM)
        .min_by_key(|(_, distance)| *distance)
        .map(|(lens, _)| lens)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
