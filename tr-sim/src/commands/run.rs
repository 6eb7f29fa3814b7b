//! Scenario stepping with a per-tick trace and final state report

use anyhow::{Context, Result, bail};
use console::style;
use serde::Serialize;
use std::path::Path;

use super::print_serialized;
use crate::cli::OutputFormat;
use crate::scenario::{Scenario, extension};
use crate::utils::{add_table_row, create_table, format_angle, format_pos};
use tr_item::{DrawItem, ItemFlags, ItemPool, ItemSnapshot};

/// Item states recorded after one tick
#[derive(Debug, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub items: Vec<ItemSnapshot>,
}

/// Per-tick trace and the state of every item after the run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub trace: Vec<TickRecord>,
    pub items: Vec<ItemSnapshot>,
    pub draw: Vec<DrawItem>,
}

pub fn execute(
    path: &Path,
    ticks: u32,
    every: u32,
    format: OutputFormat,
    snapshot: Option<&Path>,
    restore: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let (mut sim, _) = scenario.build()?;

    if let Some(restore) = restore {
        let saved = read_snapshot(restore)?;
        sim.restore(&saved)
            .with_context(|| format!("Failed to restore snapshot: {}", restore.display()))?;
        log::info!("Restored {} items from {}", saved.len(), restore.display());
    }

    let mut trace = Vec::new();
    for step in 1..=ticks {
        sim.tick()
            .with_context(|| format!("Simulation failed at tick {step}"))?;

        if every > 0 && step % every == 0 {
            trace.push(TickRecord {
                tick: sim.ticks(),
                items: item_states(sim.pool()),
            });
        }
    }

    let report = RunReport {
        ticks: sim.ticks(),
        trace,
        items: item_states(sim.pool()),
        draw: sim.draw(),
    };

    if let Some(snapshot) = snapshot {
        write_snapshot(snapshot, &sim.snapshot())?;
    }

    match format {
        OutputFormat::Table => print_table(&report),
        _ => print_serialized(&report, format)?,
    }

    Ok(())
}

fn item_states(pool: &ItemPool) -> Vec<ItemSnapshot> {
    pool.iter().map(|(index, item)| item.snapshot(index)).collect()
}

fn print_table(report: &RunReport) {
    if !report.trace.is_empty() {
        println!("\n{}", style("Tick Trace").bold().underlined());
        let mut table = create_table(&["Tick", "#", "Type", "Position", "Clip", "Frame", "State"]);
        for record in &report.trace {
            for item in record.items.iter().filter(|item| item.flags.contains(ItemFlags::ACTIVE)) {
                add_table_row(
                    &mut table,
                    vec![
                        record.tick.to_string(),
                        item.index.0.to_string(),
                        item.item_type.to_string(),
                        format_pos(item.pos),
                        item.anim_index.to_string(),
                        item.frame_index.to_string(),
                        item.state.to_string(),
                    ],
                );
            }
        }
        table.printstd();
    }

    println!("\n{}", style("Simulation Results").bold().underlined());
    println!("Ticks: {}", style(report.ticks).green());
    println!("Items: {}", style(report.items.len()).green());

    let mut table = create_table(&["#", "Type", "Position", "Yaw", "Clip", "Frame", "State", "Status", "Health", "Active"]);
    for item in &report.items {
        add_table_row(
            &mut table,
            vec![
                item.index.0.to_string(),
                item.item_type.to_string(),
                format_pos(item.pos),
                format_angle(item.angle.y),
                item.anim_index.to_string(),
                item.frame_index.to_string(),
                item.state.to_string(),
                format!("{:?}", item.status),
                item.health.to_string(),
                if item.flags.contains(ItemFlags::ACTIVE) { "yes" } else { "no" }.to_string(),
            ],
        );
    }
    table.printstd();
}

fn read_snapshot(path: &Path) -> Result<Vec<ItemSnapshot>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    Ok(match extension(path).as_deref() {
        Some("yaml" | "yml") => serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Failed to parse YAML snapshot: {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON snapshot: {}", path.display()))?,
        _ => bail!("Unsupported snapshot format: {}", path.display()),
    })
}

fn write_snapshot(path: &Path, snapshots: &[ItemSnapshot]) -> Result<()> {
    let text = match extension(path).as_deref() {
        Some("yaml" | "yml") => serde_yaml_ng::to_string(snapshots).context("Failed to serialize snapshot to YAML")?,
        Some("json") => serde_json::to_string_pretty(snapshots).context("Failed to serialize snapshot to JSON")?,
        _ => bail!("Unsupported snapshot format: {}", path.display()),
    };

    std::fs::write(path, text).with_context(|| format!("Failed to write snapshot to: {}", path.display()))?;
    log::info!("Snapshot of {} items written to {}", snapshots.len(), path.display());
    Ok(())
}
