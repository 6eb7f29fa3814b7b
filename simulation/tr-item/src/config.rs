//! Tunable simulation constants

use crate::math::angle;

/// Configuration for item simulation behavior
///
/// Defaults reproduce the stock game constants. Scenario files may override
/// any subset of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Vertical speed gained per step while falling
    pub gravity: i32,
    /// Vertical speed above which gravity adds only one unit per step
    pub terminal_velocity: i32,
    /// Height of the controllable actor
    pub actor_height: i32,
    /// Collision radius of the controllable actor
    pub actor_radius: i32,
    /// Largest floor step the actor can walk up or down
    pub step_height: i32,
    /// Per-axis cutoff for positional sounds
    pub max_sound_distance: i32,
    /// Number of item slots in the pool
    pub pool_capacity: usize,
    /// Upper bound on steps taken by a skip-ahead
    pub skip_step_limit: u32,
    /// Position step used by `move_to`
    pub move_lerp_pos: i32,
    /// Rotation step used by `move_to`
    pub move_lerp_rot: u16,
    /// Seed of the effect random stream
    pub rand_seed: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 6,
            terminal_velocity: 128,
            actor_height: 762,
            actor_radius: 100,
            step_height: 384,
            max_sound_distance: 8 * 1024,
            pool_capacity: 256,
            skip_step_limit: 1024,
            move_lerp_pos: 16,
            move_lerp_rot: angle(2),
            rand_seed: 0x3039,
        }
    }
}

impl SimConfig {
    /// Gravity increment for a body currently falling at `v`
    pub fn gravity_step(&self, v: i32) -> i32 {
        if v < self.terminal_velocity {
            self.gravity
        } else {
            1
        }
    }
}
