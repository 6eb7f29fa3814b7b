//! Terrain probe at a point

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use super::print_serialized;
use crate::cli::OutputFormat;
use crate::scenario::Scenario;
use crate::utils::{add_table_row, create_table, format_angle, format_pos};
use tr_item::collision::CollisionInfo;
use tr_item::math::IVec3;
use tr_item::room::WALL;
use tr_item::{CollisionType, RoomId};

pub fn execute(path: &Path, pos: [i32; 3], angle: u16, room: u16, format: OutputFormat) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let (sim, _) = scenario.build()?;

    let pos = IVec3::from_array(pos);
    let cinfo = sim
        .probe(RoomId(room), pos, angle)
        .with_context(|| format!("Failed to probe at {}", format_pos(pos)))?;

    match format {
        OutputFormat::Table => print_table(pos, &cinfo),
        _ => print_serialized(&cinfo, format)?,
    }

    Ok(())
}

fn print_table(pos: IVec3, cinfo: &CollisionInfo) {
    println!("\n{}", style("Collision Probe").bold().underlined());
    println!("Position: {}", style(format_pos(pos)).cyan());
    println!("Heading: {} (quadrant {})", format_angle(cinfo.angle), cinfo.quadrant);

    let kind = format!("{:?}", cinfo.kind);
    if cinfo.kind == CollisionType::None {
        println!("Result: {}", style(kind).green());
    } else {
        println!("Result: {}", style(kind).red());
        println!("Correction: {}", format_pos(cinfo.offset));
    }
    if cinfo.static_hit {
        println!("Blocked by a static obstacle");
    }

    let mut table = create_table(&["Probe", "Floor", "Ceiling", "Slant"]);
    for (name, side) in [("middle", &cinfo.m), ("front", &cinfo.f), ("left", &cinfo.l), ("right", &cinfo.r)] {
        add_table_row(
            &mut table,
            vec![name.to_string(), height(side.floor), height(side.ceiling), format!("{:?}", side.slant)],
        );
    }
    table.printstd();
}

fn height(value: i32) -> String {
    if value == WALL { "wall".to_string() } else { value.to_string() }
}
