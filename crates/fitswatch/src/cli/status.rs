//! `fitswatch status`: submission status board

use anyhow::{Context, Result};
use fitswatch::{build_status_board, WatchConfig};
use fitswatch_scout::{InventoryStore, YamlInventoryStore};

pub fn run(config: &WatchConfig, json: bool) -> Result<()> {
    let store = YamlInventoryStore::new(&config.inventory_path);
    let inventory = store
        .load()
        .with_context(|| format!("Failed to load inventory from {}", store.location()))?
        .with_context(|| {
            format!(
                "No inventory at {} yet; run `fitswatch run` first",
                store.location()
            )
        })?;

    let board = build_status_board(&inventory, &config.checker, &config.summary_exclude);
    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
    } else {
        print!("{}", board.render_text(&config.checker.invalid_marker));
    }
    Ok(())
}
