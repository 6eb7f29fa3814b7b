//! Scenario summary

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::scenario::Scenario;
use crate::utils::{add_table_row, create_table, format_angle, format_pos};
use tr_item::math::IVec3;

pub fn execute(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;

    println!("\n{}", style("Scenario Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());

    let grid = &scenario.grid;
    println!("Rooms: {}", style(1).green());
    println!(
        "Room 0: {}x{} sectors, floor {}, ceiling {}",
        style(grid.width).green(),
        style(grid.depth).green(),
        grid.floor,
        grid.ceiling
    );
    if !grid.solid.is_empty() {
        println!("Solid cells: {}", style(grid.solid.len()).yellow());
    }
    if let Some(level) = grid.water_level {
        println!("Water: {} cells at {}", style(grid.water.len()).cyan(), level);
    }
    println!("Clips: {}", style(scenario.clips.len()).green());
    println!("Models: {}", style(scenario.models.len() + scenario.sprites.len()).green());

    println!("\n{}", style("Configuration").bold());
    let config = serde_json::to_value(&scenario.config).context("Failed to serialize configuration")?;
    let mut table = create_table(&["Setting", "Value"]);
    if let Some(fields) = config.as_object() {
        for (name, value) in fields {
            add_table_row(&mut table, vec![name.clone(), value.to_string()]);
        }
    }
    table.printstd();

    if !scenario.items.is_empty() {
        println!("\n{}", style("Items").bold());
        let mut table = create_table(&["#", "Type", "Room", "Position", "Angle", "Active"]);
        for (i, item) in scenario.items.iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    item.item_type.to_string(),
                    item.room.to_string(),
                    format_pos(IVec3::from_array(item.pos)),
                    format_angle(item.angle),
                    if item.active { "yes" } else { "no" }.to_string(),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}
