//! Items: every simulated game object
//!
//! An [`Item`] lives in a slot of the [`ItemPool`](crate::pool::ItemPool)
//! and carries the state shared by all item types plus a per-type extension
//! block ([`ItemKind`]). Behavior is split across submodules:
//!
//! - [`anim`] - clip playback, transitions, commands and movement
//! - [`skeleton`] - keyframe sampling, joints and bounding spheres
//! - [`floor`] - room membership, water and item-provided floors

pub mod anim;
pub mod floor;
pub mod kind;
pub mod skeleton;
pub mod types;

use std::fmt;

use bitflags::bitflags;
use glam::IVec3;

pub use kind::{EnemyExtra, ItemKind, LaraExtra, WeaponState};
pub use skeleton::{FramePair, MAX_SPHERES, Sphere, SphereSet};
pub use types::ItemType;

use crate::error::Result;
use crate::level::Level;
use crate::room::RoomId;

/// Health value of items that cannot be damaged
pub const NOT_ENEMY: i16 = -0x4000;
/// Starting health of the actor
pub const LARA_MAX_HEALTH: i16 = 1000;
/// Activation mask value that starts an item active and reversed
pub const MASK_ALL: u8 = 0x1F;

/// Slot index of an item in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemIndex(pub u16);

impl ItemIndex {
    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Weak reference to an item that detects slot reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemHandle {
    pub index: ItemIndex,
    pub generation: u32,
}

bitflags! {
    /// Boolean item flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemFlags: u16 {
        /// On the active list
        const ACTIVE = 0x0001;
        /// Ballistic movement
        const GRAVITY = 0x0002;
        /// Takes part in contact tests with the actor
        const COLLISION = 0x0004;
        /// Triggered once only
        const ONCE = 0x0008;
        /// Persisted in save games
        const SAVE = 0x0010;
        /// Trigger logic runs inverted
        const REVERSE = 0x0020;
        const SHADOW = 0x0040;
        /// Sprite sequence advances every step
        const ANIMATED = 0x0080;
    }
}

/// Trigger status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemStatus {
    #[default]
    None,
    Active,
    Inactive,
    Invisible,
}

/// Orientation as three binary angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angles {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl Angles {
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        Self { x, y, z }
    }

    pub const fn yaw(y: u16) -> Self {
        Self { x: 0, y, z: 0 }
    }
}

/// Per-item simulation state
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub item_type: ItemType,
    pub pos: IVec3,
    pub angle: Angles,
    pub room: RoomId,
    /// Floor height under the item at the last room update
    pub room_floor: i32,

    pub anim_index: u16,
    /// Absolute frame index within the level frame numbering
    pub frame_index: u16,
    pub state: u8,
    pub goal_state: u8,
    pub next_state: u8,

    pub h_speed: i32,
    pub v_speed: i32,

    pub flags: ItemFlags,
    pub status: ItemStatus,
    /// Trigger activation mask
    pub mask: u8,
    pub health: i16,
    /// General purpose countdown used by effects and traps
    pub timer: i16,
    /// Joints overlapping the actor at the last contact test
    pub hit_mask: u32,
    pub visible_mask: u32,
    pub intensity: u8,

    pub kind: ItemKind,
}

impl Item {
    /// Builds an item in its model's default clip.
    ///
    /// Sprite models have no clip and start at sprite frame zero.
    /// A set `once` flag turns into the invisible status, and a full
    /// activation mask turns into a reversed item that should start on the
    /// active list. The caller is responsible for the list insertion.
    pub fn new(
        level: &Level,
        item_type: ItemType,
        room: RoomId,
        pos: IVec3,
        angle_y: u16,
        flags: ItemFlags,
        mask: u8,
    ) -> Result<Self> {
        let model = level.model(item_type)?;
        let anim_index = model.anim_index;
        let (frame_index, state) = if model.is_sprite() {
            (0, 0)
        } else {
            let anim = level.anim(anim_index)?;
            (anim.frame_begin, anim.state)
        };

        let mut item = Self {
            item_type,
            pos,
            angle: Angles::yaw(angle_y),
            room,
            room_floor: 0,
            anim_index,
            frame_index,
            state,
            goal_state: state,
            next_state: state,
            h_speed: 0,
            v_speed: 0,
            flags: (flags & ItemFlags::ONCE) | ItemFlags::SAVE | ItemFlags::COLLISION,
            status: ItemStatus::None,
            mask,
            health: NOT_ENEMY,
            timer: 0,
            hit_mask: 0,
            visible_mask: u32::MAX,
            intensity: 128,
            kind: ItemKind::for_type(item_type),
        };

        if let Some(extra) = item.kind.lara_mut() {
            extra.move_angle = angle_y;
            item.health = LARA_MAX_HEALTH;
        }

        if item.flags.contains(ItemFlags::ONCE) {
            item.status = ItemStatus::Invisible;
            item.flags.remove(ItemFlags::ONCE);
        }

        if item.mask == MASK_ALL {
            item.mask = 0;
            item.flags.insert(ItemFlags::REVERSE);
        }

        Ok(item)
    }

    /// Whether the item must go straight onto the active list
    pub(crate) fn starts_active(&self) -> bool {
        self.flags.contains(ItemFlags::REVERSE) && self.mask == 0
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(ItemFlags::ACTIVE)
    }

    pub fn is_lara(&self) -> bool {
        matches!(self.kind, ItemKind::Lara(_))
    }

    /// Squared distance to a point, in i64 to avoid overflow
    pub fn distance_sq(&self, point: IVec3) -> i64 {
        let d = (point - self.pos).as_i64vec3();
        d.dot(d)
    }
}
