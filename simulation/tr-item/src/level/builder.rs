//! Programmatic construction of level tables
//!
//! Tools and tests describe clips and models declaratively and let the
//! builder lay out the flat tables and their cross-indices.
//!
//! ```
//! use tr_item::item::ItemType;
//! use tr_item::level::builder::{LevelBuilder, clip};
//!
//! let level = LevelBuilder::new()
//!     .anim(clip(0, 20).state(2).transition(3, 10, 20, 1, 21))
//!     .anim(clip(21, 40).state(3))
//!     .model(ItemType::Wolf, 1, 0)
//!     .build();
//!
//! assert_eq!(level.anims.len(), 2);
//! assert_eq!(level.anim_ranges.len(), 1);
//! ```

use glam::IVec3;

use super::{Anim, AnimCommand, AnimFrame, AnimRange, AnimState, Bounds, Level, MeshSphere, Model, Node, SoundInfo};
use crate::item::ItemType;

/// Starts a clip covering absolute frames `begin..=end`
pub fn clip(begin: u16, end: u16) -> ClipBuilder {
    ClipBuilder {
        anim: Anim {
            frame_begin: begin,
            frame_end: end,
            frame_rate: 1,
            ..Anim::default()
        },
        next: None,
        transitions: Vec::new(),
        commands: Vec::new(),
        keyframes: Vec::new(),
        bounds: Bounds::default(),
    }
}

/// Declarative description of one clip
#[derive(Debug, Clone)]
pub struct ClipBuilder {
    anim: Anim,
    next: Option<(u16, u16)>,
    transitions: Vec<(u8, Vec<AnimRange>)>,
    commands: Vec<AnimCommand>,
    keyframes: Vec<AnimFrame>,
    bounds: Bounds,
}

impl ClipBuilder {
    pub fn state(mut self, state: u8) -> Self {
        self.anim.state = state;
        self
    }

    pub fn rate(mut self, rate: u8) -> Self {
        self.anim.frame_rate = rate;
        self
    }

    /// Initial horizontal speed in 16.16
    pub fn speed(mut self, speed: i32) -> Self {
        self.anim.speed = speed;
        self
    }

    pub fn accel(mut self, accel: i32) -> Self {
        self.anim.accel = accel;
        self
    }

    /// Clip and frame entered after the last frame; defaults to looping
    pub fn next(mut self, anim: u16, frame: u16) -> Self {
        self.next = Some((anim, frame));
        self
    }

    /// Adds a window `[begin, end]` in which goal `state` jumps to the target
    pub fn transition(mut self, state: u8, begin: u16, end: u16, next_anim: u16, next_frame: u16) -> Self {
        let range = AnimRange {
            frame_begin: begin,
            frame_end: end,
            next_anim,
            next_frame,
        };
        match self.transitions.iter_mut().find(|(s, _)| *s == state) {
            Some((_, ranges)) => ranges.push(range),
            None => self.transitions.push((state, vec![range])),
        }
        self
    }

    pub fn command(mut self, command: AnimCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Box used for generated keyframes
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Appends an explicit keyframe; generated keyframes are skipped once
    /// any is given
    pub fn keyframe(mut self, frame: AnimFrame) -> Self {
        self.keyframes.push(frame);
        self
    }
}

/// Incremental [`Level`] builder
#[derive(Debug, Clone, Default)]
pub struct LevelBuilder {
    level: Level,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clip; its index is the number of clips added before it
    pub fn anim(mut self, clip: ClipBuilder) -> Self {
        let level = &mut self.level;
        let index = level.anims.len() as u16;
        let mut anim = clip.anim;

        let (next_anim, next_frame) = clip.next.unwrap_or((index, anim.frame_begin));
        anim.next_anim = next_anim;
        anim.next_frame = next_frame;

        anim.states_start = level.anim_states.len() as u16;
        anim.states_count = clip.transitions.len() as u16;
        for (state, ranges) in clip.transitions {
            level.anim_states.push(AnimState {
                state,
                ranges_start: level.anim_ranges.len() as u16,
                ranges_count: ranges.len() as u16,
            });
            level.anim_ranges.extend(ranges);
        }

        anim.commands_start = level.anim_commands.len() as u16;
        anim.commands_count = clip.commands.len() as u16;
        for command in &clip.commands {
            command.encode(&mut level.anim_commands);
        }

        anim.frames_start = level.frames.len() as u32;
        if clip.keyframes.is_empty() {
            let count = (anim.len().max(1) - 1) / anim.rate() + 1;
            for _ in 0..count {
                level.frames.push(AnimFrame {
                    bounds: clip.bounds,
                    ..AnimFrame::default()
                });
            }
        } else {
            level.frames.extend(clip.keyframes);
        }

        level.anims.push(anim);
        self
    }

    /// Adds a model with `count` joints, zero-offset links and empty spheres
    pub fn model(self, item_type: ItemType, count: u16, anim_index: u16) -> Self {
        let nodes = vec![Node::default(); usize::from(count.saturating_sub(1))];
        let meshes = vec![MeshSphere::default(); usize::from(count)];
        self.skeleton(item_type, anim_index, nodes, meshes)
    }

    /// Adds a model from explicit links and mesh spheres
    pub fn skeleton(mut self, item_type: ItemType, anim_index: u16, nodes: Vec<Node>, meshes: Vec<MeshSphere>) -> Self {
        let level = &mut self.level;
        let model = Model {
            count: meshes.len() as u16,
            node_index: level.nodes.len() as u32,
            mesh_index: level.meshes.len() as u32,
            anim_index,
            sprite_frames: 0,
        };
        level.nodes.extend(nodes);
        level.meshes.extend(meshes);
        level.models.insert(item_type, model);
        self
    }

    /// Adds a sprite sequence model
    pub fn sprite(mut self, item_type: ItemType, frames: u16) -> Self {
        self.level.models.insert(
            item_type,
            Model {
                sprite_frames: frames,
                ..Model::default()
            },
        );
        self
    }

    /// Maps sound `id` to a new cue
    pub fn sound(mut self, id: usize, info: SoundInfo) -> Self {
        let level = &mut self.level;
        if level.sound_map.len() <= id {
            level.sound_map.resize(id + 1, -1);
        }
        level.sound_map[id] = level.sound_infos.len() as i16;
        level.sound_infos.push(info);
        self
    }

    /// Appends a sample wrapped in a minimal wave header
    pub fn sample(mut self, payload: &[u8]) -> Self {
        let level = &mut self.level;
        level.sound_offsets.push(level.sound_data.len() as u32);

        let mut header = [0u8; 44];
        header[0..4].copy_from_slice(b"RIFF");
        header[8..12].copy_from_slice(b"WAVE");
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        level.sound_data.extend_from_slice(&header);
        level.sound_data.extend_from_slice(payload);
        self
    }

    pub fn build(self) -> Level {
        self.level
    }
}

/// Mesh sphere helper
pub fn sphere(x: i32, y: i32, z: i32, radius: i32) -> MeshSphere {
    MeshSphere {
        center: IVec3::new(x, y, z),
        radius,
    }
}
