//! Scenario files: level tables, a sector grid and a spawn list
//!
//! Scenarios are YAML (`.yaml`, `.yml`) or JSON (`.json`). Clips and models
//! are described the way the level builder takes them, so a scenario stays
//! small enough to write by hand.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tr_item::level::builder::{ClipBuilder, LevelBuilder, clip};
use tr_item::level::{AnimCommand, Bounds, FxCode, Level};
use tr_item::math::IVec3;
use tr_item::room::SECTOR_SIZE;
use tr_item::{ItemFlags, ItemHandle, ItemType, RoomId, SectorGrid, SimConfig, Simulation};

/// A complete scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Overrides of the simulation constants
    #[serde(default)]
    pub config: SimConfig,
    pub grid: GridSpec,
    #[serde(default)]
    pub clips: Vec<ClipSpec>,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    #[serde(default)]
    pub sprites: Vec<SpriteSpec>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

/// Single-room grid of 1024-unit sectors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSpec {
    pub width: u16,
    pub depth: u16,
    #[serde(default)]
    pub floor: i32,
    #[serde(default = "default_ceiling")]
    pub ceiling: i32,
    /// Cells made solid, as `[x, z]` sector coordinates
    #[serde(default)]
    pub solid: Vec<[i32; 2]>,
    /// Cells filled with water, as `[x, z]` sector coordinates
    #[serde(default)]
    pub water: Vec<[i32; 2]>,
    #[serde(default)]
    pub water_level: Option<i32>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            width: 1,
            depth: 1,
            floor: 0,
            ceiling: default_ceiling(),
            solid: Vec::new(),
            water: Vec::new(),
            water_level: None,
        }
    }
}

fn default_ceiling() -> i32 {
    -4096
}

/// One clip; its index is its position in the list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipSpec {
    pub begin: u16,
    pub end: u16,
    #[serde(default)]
    pub state: u8,
    #[serde(default = "default_rate")]
    pub rate: u8,
    /// Horizontal speed in units per frame
    #[serde(default)]
    pub speed: i32,
    /// Speed change per frame, in 16.16
    #[serde(default)]
    pub accel: i32,
    /// Successor as `[clip, frame]`; the clip loops when absent
    #[serde(default)]
    pub next: Option<[u16; 2]>,
    /// Box as `[min_x, max_x, min_y, max_y, min_z, max_z]`
    #[serde(default)]
    pub bounds: Option<[i32; 6]>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

fn default_rate() -> u8 {
    1
}

/// Frame window in which `state` can be reached through `clip`/`frame`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpec {
    pub state: u8,
    pub begin: u16,
    pub end: u16,
    pub clip: u16,
    pub frame: u16,
}

/// Clip command
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSpec {
    Offset { x: i16, y: i16, z: i16 },
    Jump { v_speed: i16, h_speed: i16 },
    Empty,
    Kill,
    Sound { frame: i16, id: i16 },
    Effect { frame: i16, code: i16 },
}

impl From<CommandSpec> for AnimCommand {
    fn from(spec: CommandSpec) -> Self {
        match spec {
            CommandSpec::Offset { x, y, z } => Self::Offset { x, y, z },
            CommandSpec::Jump { v_speed, h_speed } => Self::Jump { v_speed, h_speed },
            CommandSpec::Empty => Self::Empty,
            CommandSpec::Kill => Self::Kill,
            CommandSpec::Sound { frame, id } => Self::Sound { frame, id },
            CommandSpec::Effect { frame, code } => Self::Effect {
                frame,
                fx: FxCode::from_raw(code),
            },
        }
    }
}

/// Skeletal model with `joints` zero-offset joints
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default = "default_joints")]
    pub joints: u16,
    #[serde(default)]
    pub clip: u16,
}

fn default_joints() -> u16 {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteSpec {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub frames: u16,
}

/// Item placed before the first tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSpec {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub pos: [i32; 3],
    /// Binary yaw, 0x10000 per turn
    #[serde(default)]
    pub angle: u16,
    #[serde(default)]
    pub room: u16,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub gravity: bool,
    #[serde(default)]
    pub health: Option<i16>,
}

impl Scenario {
    /// Reads a scenario, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;

        let scenario = match extension(path).as_deref() {
            Some("yaml" | "yml") => serde_yaml_ng::from_str(&text)
                .with_context(|| format!("Failed to parse YAML scenario: {}", path.display()))?,
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON scenario: {}", path.display()))?,
            _ => bail!("Unsupported scenario format: {} (expected .yaml, .yml or .json)", path.display()),
        };

        log::debug!("Loaded scenario {}", path.display());
        Ok(scenario)
    }

    pub fn level(&self) -> Level {
        let mut builder = LevelBuilder::new();
        for spec in &self.clips {
            builder = builder.anim(spec.builder());
        }
        for model in &self.models {
            builder = builder.model(model.item_type, model.joints, model.clip);
        }
        for sprite in &self.sprites {
            builder = builder.sprite(sprite.item_type, sprite.frames);
        }
        builder.build()
    }

    pub fn grid(&self) -> SectorGrid {
        let spec = &self.grid;
        let mut grid = SectorGrid::flat(spec.width, spec.depth, spec.floor, spec.ceiling);

        for &[x, z] in &spec.solid {
            grid.set_solid(x * SECTOR_SIZE, z * SECTOR_SIZE);
        }
        for &[x, z] in &spec.water {
            if let Some(sector) = grid.sector_mut(x * SECTOR_SIZE, z * SECTOR_SIZE) {
                sector.water = true;
            } else {
                log::warn!("Water cell [{x}, {z}] is outside the grid");
            }
        }
        grid.water_level = spec.water_level;

        grid
    }

    /// Builds the simulation and places every item, returning their handles
    /// in spawn-list order.
    pub fn build(&self) -> Result<(Simulation<SectorGrid>, Vec<ItemHandle>)> {
        let mut sim = Simulation::new(self.level(), self.grid(), self.config.clone());
        let mut handles = Vec::with_capacity(self.items.len());

        for (i, spec) in self.items.iter().enumerate() {
            let pos = IVec3::from_array(spec.pos);
            let handle = sim
                .spawn(spec.item_type, RoomId(spec.room), pos, spec.angle)
                .with_context(|| format!("Failed to spawn item {i} ({})", spec.item_type))?;

            let item = sim.pool_mut().get_mut(handle)?;
            if spec.gravity {
                item.flags.insert(ItemFlags::GRAVITY);
            }
            if let Some(health) = spec.health {
                item.health = health;
            }

            if spec.active && !item.is_active() {
                sim.pool_mut().activate(handle.index)?;
            }
            handles.push(handle);
        }

        Ok((sim, handles))
    }
}

impl ClipSpec {
    fn builder(&self) -> ClipBuilder {
        let mut builder = clip(self.begin, self.end)
            .state(self.state)
            .rate(self.rate)
            .speed(self.speed << 16)
            .accel(self.accel);

        if let Some([anim, frame]) = self.next {
            builder = builder.next(anim, frame);
        }
        if let Some([min_x, max_x, min_y, max_y, min_z, max_z]) = self.bounds {
            builder = builder.bounds(Bounds::new(min_x, max_x, min_y, max_y, min_z, max_z));
        }
        for t in &self.transitions {
            builder = builder.transition(t.state, t.begin, t.end, t.clip, t.frame);
        }
        for &command in &self.commands {
            builder = builder.command(command.into());
        }

        builder
    }
}

/// Lower-cased file extension
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const YAML: &str = r"
config:
  gravity: 8
grid:
  width: 4
  depth: 4
  solid: [[1, 2]]
  water: [[0, 0]]
  water_level: 256
clips:
  - begin: 0
    end: 20
    speed: 16
    bounds: [-100, 100, -762, 0, -100, 100]
  - begin: 0
    end: 5
    commands: [kill]
models:
  - type: Lara
  - type: Door1
    clip: 1
sprites:
  - type: Blood
    frames: 4
items:
  - type: Lara
    pos: [1536, 0, 512]
    active: true
  - type: Door1
    pos: [2560, 0, 2560]
    angle: 16384
";

    #[test]
    fn test_yaml_scenario_builds() {
        let scenario: Scenario = serde_yaml_ng::from_str(YAML).unwrap();
        assert_eq!(scenario.config.gravity, 8);
        assert_eq!(scenario.config.actor_height, SimConfig::default().actor_height);

        let (sim, handles) = scenario.build().unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(sim.pool().active().collect::<Vec<_>>(), vec![handles[0].index]);
        assert_eq!(sim.pool().get(handles[1]).unwrap().angle.y, 16384);
        assert_eq!(sim.level().anims.len(), 2);

        let grid = sim.geometry();
        assert!(grid.sector(1024, 2048).unwrap().is_solid());
        assert!(grid.sector(0, 0).unwrap().water);
    }

    #[test]
    fn test_unknown_model_fails_to_build() {
        let scenario = Scenario {
            grid: GridSpec::default(),
            items: vec![ItemSpec {
                item_type: ItemType::Wolf,
                pos: [0; 3],
                angle: 0,
                room: 0,
                active: false,
                gravity: false,
                health: None,
            }],
            ..Scenario::default()
        };

        let err = scenario.build().err().unwrap();
        assert!(err.to_string().contains("Failed to spawn item 0"));
    }

    #[test]
    fn test_extension_picks_format() {
        assert_eq!(extension(Path::new("a/b.YML")).as_deref(), Some("yml"));
        assert_eq!(extension(Path::new("scenario")), None);
    }
}
