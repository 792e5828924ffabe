use std::path::Path;

use anyhow::Context;
use synthia_core::GearItem;

/// Load the user's gear from a JSON array of items.
pub fn load_gear_profile(path: &Path) -> anyhow::Result<Vec<GearItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading gear profile {}", path.display()))?;
    let gear: Vec<GearItem> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing gear profile {}", path.display()))?;
    tracing::info!(path = %path.display(), items = gear.len(), "Loaded gear profile");
    Ok(gear)
}
