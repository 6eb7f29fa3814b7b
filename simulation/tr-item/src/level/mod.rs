//! Read-only level tables consumed by the simulation
//!
//! Loading these tables from disk is outside the crate; callers fill a
//! [`Level`] from their own loader (or a scenario file with the `serde`
//! feature) and share it immutably with every tick.

pub mod anim;
pub mod builder;
pub mod model;
pub mod sound;

use std::collections::BTreeMap;

pub use anim::{Anim, AnimCommand, AnimRange, AnimState, CommandIter, FxCode};
pub use model::{AnimFrame, Bounds, MeshSphere, Model, Node, NodeFlags, pack_rotation, unpack_rotation};
pub use sound::SoundInfo;

use crate::error::{ItemError, Result};
use crate::item::ItemType;

/// Offset of the payload size in an embedded wave header
const WAVE_SIZE_OFFSET: usize = 40;
/// Offset of the payload in an embedded wave header
const WAVE_DATA_OFFSET: usize = 44;

/// Level asset tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Level {
    pub anims: Vec<Anim>,
    pub anim_states: Vec<AnimState>,
    pub anim_ranges: Vec<AnimRange>,
    pub anim_commands: Vec<i16>,
    pub frames: Vec<AnimFrame>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<MeshSphere>,
    pub models: BTreeMap<ItemType, Model>,
    /// Sound id to cue index, -1 for unmapped ids
    pub sound_map: Vec<i16>,
    pub sound_infos: Vec<SoundInfo>,
    /// Byte offset of every sample in `sound_data`
    pub sound_offsets: Vec<u32>,
    pub sound_data: Vec<u8>,
}

impl Level {
    pub fn anim(&self, index: u16) -> Result<&Anim> {
        self.anims
            .get(usize::from(index))
            .ok_or(ItemError::InvalidAnim(index))
    }

    pub fn model(&self, kind: ItemType) -> Result<&Model> {
        self.models.get(&kind).ok_or(ItemError::MissingModel(kind))
    }

    /// Transition entries of a clip
    pub fn states_of(&self, anim: &Anim) -> &[AnimState] {
        slice_at(&self.anim_states, anim.states_start as usize, anim.states_count as usize)
    }

    /// Frame windows of a transition entry
    pub fn ranges_of(&self, state: &AnimState) -> &[AnimRange] {
        slice_at(&self.anim_ranges, state.ranges_start as usize, state.ranges_count as usize)
    }

    /// Commands of a clip, decoded in order
    pub fn commands_of(&self, anim: &Anim) -> CommandIter<'_> {
        let start = (anim.commands_start as usize).min(self.anim_commands.len());
        CommandIter::new(&self.anim_commands[start..], anim.commands_count)
    }

    /// Keyframe `index` of a clip
    pub fn keyframe(&self, anim: &Anim, index: i32) -> Option<&AnimFrame> {
        let index = usize::try_from(index).ok()?;
        self.frames.get(anim.frames_start as usize + index)
    }

    /// Skeleton links of a model
    pub fn nodes_of(&self, model: &Model) -> &[Node] {
        let count = usize::from(model.count.saturating_sub(1));
        slice_at(&self.nodes, model.node_index as usize, count)
    }

    /// Mesh spheres of a model, one per joint
    pub fn meshes_of(&self, model: &Model) -> &[MeshSphere] {
        slice_at(&self.meshes, model.mesh_index as usize, usize::from(model.count))
    }

    /// Cue descriptor mapped to a sound id
    pub fn sound_info(&self, id: i16) -> Option<&SoundInfo> {
        let mapped = *self.sound_map.get(usize::try_from(id).ok()?)?;
        if mapped < 0 {
            return None;
        }
        self.sound_infos.get(mapped as usize)
    }

    /// PCM payload of sample `index`, without its wave header
    pub fn sample(&self, index: usize) -> Option<&[u8]> {
        let offset = *self.sound_offsets.get(index)? as usize;
        let header = self.sound_data.get(offset..offset + WAVE_DATA_OFFSET)?;

        let size_bytes: [u8; 4] = header[WAVE_SIZE_OFFSET..WAVE_DATA_OFFSET].try_into().ok()?;
        let size = u32::from_le_bytes(size_bytes) as usize;

        let start = offset + WAVE_DATA_OFFSET;
        let end = (start + size).min(self.sound_data.len());
        self.sound_data.get(start..end)
    }
}

fn slice_at<T>(table: &[T], start: usize, count: usize) -> &[T] {
    let start = start.min(table.len());
    let end = (start + count).min(table.len());
    &table[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; WAVE_DATA_OFFSET];
        data[WAVE_SIZE_OFFSET..WAVE_DATA_OFFSET].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_sample_strips_header() {
        let mut level = Level::default();
        level.sound_data.extend(wave(&[1, 2, 3]));
        let second = level.sound_data.len() as u32;
        level.sound_data.extend(wave(&[9, 9]));
        level.sound_offsets = vec![0, second];

        assert_eq!(level.sample(0), Some(&[1u8, 2, 3][..]));
        assert_eq!(level.sample(1), Some(&[9u8, 9][..]));
        assert_eq!(level.sample(2), None);
    }

    #[test]
    fn test_sound_map_unmapped() {
        let level = Level {
            sound_map: vec![-1, 0],
            sound_infos: vec![SoundInfo::default()],
            ..Level::default()
        };
        assert!(level.sound_info(0).is_none());
        assert!(level.sound_info(1).is_some());
        assert!(level.sound_info(7).is_none());
        assert!(level.sound_info(-3).is_none());
    }

    #[test]
    fn test_invalid_anim() {
        let level = Level::default();
        assert_eq!(level.anim(4), Err(ItemError::InvalidAnim(4)));
    }

    #[test]
    fn test_tables_clamp_to_bounds() {
        let level = Level {
            anim_states: vec![AnimState::default(); 2],
            ..Level::default()
        };
        let anim = Anim {
            states_start: 1,
            states_count: 5,
            ..Anim::default()
        };
        assert_eq!(level.states_of(&anim).len(), 1);
    }
}
