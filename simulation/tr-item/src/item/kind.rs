//! Per-type extension blocks
//!
//! The set of item behaviors is closed: every [`ItemType`] maps to exactly
//! one [`ItemKind`] variant, which carries whatever extra state that
//! behavior needs inline in the pool slot.

use super::{ItemHandle, ItemType};

/// Weapon handling state of the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponState {
    #[default]
    Free,
    Busy,
    Draw,
    Ready,
    Holster,
}

/// Actor extension block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaraExtra {
    /// Heading used for movement, which may differ from the facing yaw
    pub move_angle: u16,
    /// Pending jump speed overriding the next jump command
    pub v_speed_hack: i32,
    pub weapon_state: WeaponState,
    /// Side the last hit came from: 0 front, 1 left, 2 back, 3 right
    pub hit_quadrant: u16,
    /// Steps left in the hit reaction
    pub hit_timer: i32,
    pub arm_left_target: Option<ItemHandle>,
    pub arm_right_target: Option<ItemHandle>,
}

impl LaraExtra {
    /// Forgets any arm target pointing at `handle`
    pub fn clear_target(&mut self, handle: ItemHandle) {
        if self.arm_left_target == Some(handle) {
            self.arm_left_target = None;
        }
        if self.arm_right_target == Some(handle) {
            self.arm_right_target = None;
        }
    }
}

/// Creature extension block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyExtra {
    /// Item the creature is after
    pub target: Option<ItemHandle>,
}

impl EnemyExtra {
    pub fn clear_target(&mut self, handle: ItemHandle) {
        if self.target == Some(handle) {
            self.target = None;
        }
    }
}

/// Behavior variant of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Plays its clip while active
    #[default]
    Generic,
    /// The controllable actor
    Lara(LaraExtra),
    Enemy(EnemyExtra),
    /// Doors, blocks, switches and traps: animated and solid to the actor
    Object,
    /// Short-lived sprite that counts down and expires
    SpriteEffect,
    /// Air bubble rising to the water surface
    Bubble,
}

impl ItemKind {
    /// Construction dispatch on the type tag
    pub fn for_type(item_type: ItemType) -> Self {
        if item_type.is_lara() {
            Self::Lara(LaraExtra::default())
        } else if item_type.is_enemy() {
            Self::Enemy(EnemyExtra::default())
        } else if item_type.is_object() {
            Self::Object
        } else if item_type.is_sprite_effect() {
            Self::SpriteEffect
        } else if item_type == ItemType::Bubble {
            Self::Bubble
        } else {
            Self::Generic
        }
    }

    pub fn lara(&self) -> Option<&LaraExtra> {
        match self {
            Self::Lara(extra) => Some(extra),
            _ => None,
        }
    }

    pub fn lara_mut(&mut self) -> Option<&mut LaraExtra> {
        match self {
            Self::Lara(extra) => Some(extra),
            _ => None,
        }
    }

    pub fn enemy_mut(&mut self) -> Option<&mut EnemyExtra> {
        match self {
            Self::Enemy(extra) => Some(extra),
            _ => None,
        }
    }

    /// Drops every reference this block holds to `handle`
    pub fn clear_target(&mut self, handle: ItemHandle) {
        match self {
            Self::Lara(extra) => extra.clear_target(handle),
            Self::Enemy(extra) => extra.clear_target(handle),
            _ => {}
        }
    }

    /// Short variant name for reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Lara(_) => "lara",
            Self::Enemy(_) => "enemy",
            Self::Object => "object",
            Self::SpriteEffect => "sprite",
            Self::Bubble => "bubble",
        }
    }
}
