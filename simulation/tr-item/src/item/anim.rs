//! Clip playback: frame advance, state transitions, commands and movement
//!
//! One call to [`Item::anim_process`] is one simulation step of the clip:
//!
//! 1. the frame index advances by one
//! 2. the goal state is looked up in the clip's transition table
//! 3. past the last frame, rollover commands run and the clip hands over
//!    to its successor
//! 4. frame-triggered sound and effect commands run
//! 5. the item moves by the clip's speed, and by gravity when airborne

use glam::IVec3;

use super::{Item, ItemFlags, ItemStatus, WeaponState};
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::error::{ItemError, Result};
use crate::level::{Anim, AnimCommand, FxCode, Level};
use crate::math::fixed::{rotate_x, rotate_z};
use crate::math::{ANGLE_45, ANGLE_90, ANGLE_180, FIXED_SHIFT, angle_lerp, atan2, cos, sin, sqrt};

/// Standing clip of the actor, relative to its model's first clip
pub const LARA_ANIM_STAND: u16 = 11;
/// Head joint of the actor
pub const LARA_JOINT_HEAD: usize = 14;
/// Mouth position in the head joint frame
const LARA_BUBBLE_OFFSET: IVec3 = IVec3::new(0, 0, 50);
/// Sound ids carry playback flags in their top bits
const SOUND_ID_MASK: i16 = 0x3FFF;

impl Item {
    /// Advances the clip by one frame.
    ///
    /// With `movement` off the item keeps its position, which is what
    /// skip-ahead uses to fast-forward state.
    pub fn anim_process(&mut self, ctx: &mut TickContext<'_>, movement: bool) -> Result<()> {
        let level = ctx.level;

        self.frame_index = self.frame_index.wrapping_add(1);

        let mut anim = self.anim_change(level)?;

        if self.frame_index > anim.frame_end {
            self.anim_cmd(ctx, false, anim)?;

            self.frame_index = anim.next_frame;
            self.anim_index = anim.next_anim;
            anim = level.anim(self.anim_index)?;
            self.state = anim.state;

            log::trace!(
                "{} rolled over to clip {} frame {}",
                self.item_type,
                self.anim_index,
                self.frame_index
            );
        }

        self.anim_cmd(ctx, true, anim)?;

        if movement {
            self.move_step(level, ctx.config)?;
        }

        Ok(())
    }

    /// Takes the first transition to `goal_state` open at the current frame.
    ///
    /// Returns the clip the item is in afterwards. Nothing is scanned while
    /// the goal matches the current state.
    pub fn anim_change<'a>(&mut self, level: &'a Level) -> Result<&'a Anim> {
        let anim = level.anim(self.anim_index)?;

        if anim.states_count == 0 || self.goal_state == self.state {
            return Ok(anim);
        }

        for entry in level.states_of(anim).iter().filter(|s| s.state == self.goal_state) {
            let Some(range) = level.ranges_of(entry).iter().find(|r| r.contains(self.frame_index)) else {
                continue;
            };

            if !self.is_lara() && self.next_state == entry.state {
                self.next_state = 0;
            }

            let next = level.anim(range.next_anim)?;
            log::debug!(
                "{} state {} -> {} via clip {} frame {}",
                self.item_type,
                self.state,
                next.state,
                range.next_anim,
                range.next_frame
            );

            self.frame_index = range.next_frame;
            self.anim_index = range.next_anim;
            self.state = next.state;
            return Ok(next);
        }

        Ok(anim)
    }

    /// Walks the command list of `anim`.
    ///
    /// With `fx` off only rollover commands run; with `fx` on only sound and
    /// effect commands whose frame equals the current frame run.
    pub fn anim_cmd(&mut self, ctx: &mut TickContext<'_>, fx: bool, anim: &Anim) -> Result<()> {
        let level = ctx.level;

        for command in level.commands_of(anim) {
            if command.is_rollover() == fx {
                continue;
            }

            match command {
                AnimCommand::None => {}
                AnimCommand::Offset { x, y, z } => {
                    let (s, c) = (sin(self.angle.y), cos(self.angle.y));
                    let (x, z) = (i32::from(x), i32::from(z));
                    self.pos.x += rotate_x(x, z, -s, c);
                    self.pos.y += i32::from(y);
                    self.pos.z += rotate_z(x, z, -s, c);
                }
                AnimCommand::Jump { v_speed, h_speed } => {
                    let hack = self.kind.lara_mut().map_or(0, |extra| std::mem::take(&mut extra.v_speed_hack));
                    self.v_speed = if hack != 0 { -hack } else { i32::from(v_speed) };
                    self.h_speed = i32::from(h_speed);
                    self.flags.insert(ItemFlags::GRAVITY);
                }
                AnimCommand::Empty => self.free_hands("empty-hands command"),
                AnimCommand::Kill => {
                    log::debug!("{} killed by its clip", self.item_type);
                    self.status = ItemStatus::Inactive;
                }
                AnimCommand::Sound { frame, id } => {
                    if i32::from(frame) == i32::from(self.frame_index) {
                        ctx.sound_play(id & SOUND_ID_MASK, self.pos);
                    }
                }
                AnimCommand::Effect { frame, fx: code } => {
                    if i32::from(frame) == i32::from(self.frame_index) {
                        self.anim_fx(ctx, code)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn anim_fx(&mut self, ctx: &mut TickContext<'_>, code: FxCode) -> Result<()> {
        match code {
            FxCode::Rotate180 => self.angle.y = self.angle.y.wrapping_add(ANGLE_180),
            FxCode::LaraNormal => {
                if self.is_lara() {
                    let base = ctx.level.model(self.item_type)?.anim_index;
                    self.anim_set(ctx.level, base + LARA_ANIM_STAND, true, 0)?;
                } else {
                    log::warn!("Stand effect on {}, which is not the actor", self.item_type);
                }
            }
            FxCode::LaraBubbles => self.fx_bubbles(ctx, LARA_JOINT_HEAD, LARA_BUBBLE_OFFSET),
            FxCode::LaraHandsFree => self.free_hands("hands-free effect"),
            FxCode::FloorShake | FxCode::Other(_) => {
                log::trace!("{} ignores effect {:?}", self.item_type, code);
            }
        }
        Ok(())
    }

    fn free_hands(&mut self, source: &str) {
        match self.kind.lara_mut() {
            Some(extra) => extra.weapon_state = WeaponState::Free,
            None => log::warn!("Ignoring {source} on {}, which is not the actor", self.item_type),
        }
    }

    /// Integrates one step of clip speed and gravity
    pub fn move_step(&mut self, level: &Level, config: &SimConfig) -> Result<()> {
        let anim = level.anim(self.anim_index)?;
        let rel = i64::from(self.frame_index) - i64::from(anim.frame_begin);
        let (speed, accel) = (i64::from(anim.speed), i64::from(anim.accel));

        if self.flags.contains(ItemFlags::GRAVITY) {
            let mut s = speed + accel * (rel - 1);
            self.h_speed -= (s >> 16) as i32;
            s += accel;
            self.h_speed += (s >> 16) as i32;

            self.v_speed += config.gravity_step(self.v_speed);
            self.pos.y += self.v_speed;
        } else {
            self.h_speed = ((speed + accel * rel) >> 16) as i32;
        }

        let heading = self.kind.lara().map_or(self.angle.y, |extra| extra.move_angle);
        let h = i64::from(self.h_speed);
        self.pos.x += ((i64::from(sin(heading)) * h) >> FIXED_SHIFT) as i32;
        self.pos.z += ((i64::from(cos(heading)) * h) >> FIXED_SHIFT) as i32;

        Ok(())
    }

    /// Switches to clip `anim`, `frame_offset` frames past its start
    pub fn anim_set(&mut self, level: &Level, anim: u16, reset_state: bool, frame_offset: u16) -> Result<()> {
        let clip = level.anim(anim)?;

        self.anim_index = anim;
        self.frame_index = clip.frame_begin.wrapping_add(frame_offset);

        if reset_state {
            self.state = clip.state;
            self.goal_state = clip.state;
        }

        Ok(())
    }

    /// Fast-forwards the clip until `state == before`, optionally one step
    /// further, then settles in place with goal `after`.
    ///
    /// Gives up with [`ItemError::SkipStalled`] after the configured number
    /// of steps; position is restored either way.
    pub fn anim_skip(&mut self, ctx: &mut TickContext<'_>, before: u8, after: u8, advance: bool) -> Result<()> {
        let origin = self.pos;
        let limit = ctx.config.skip_step_limit;
        self.goal_state = before;

        let mut steps = 0;
        while self.state != self.goal_state {
            if steps >= limit {
                self.pos = origin;
                log::warn!("{} never reached state {before}", self.item_type);
                return Err(ItemError::SkipStalled { state: before, steps });
            }
            self.anim_process(ctx, false)?;
            steps += 1;
        }

        if advance {
            self.anim_process(ctx, true)?;
        }

        self.pos = origin;
        self.v_speed = 0;
        self.h_speed = 0;
        self.goal_state = after;

        Ok(())
    }

    /// Whether the item sits `offset` frames before the end of its clip
    pub fn anim_is_end(&self, level: &Level, offset: u16) -> bool {
        level
            .anim(self.anim_index)
            .is_ok_and(|anim| self.frame_index == anim.frame_end.wrapping_sub(offset))
    }

    /// Records a hit on the actor coming along direction `(dir_x, dir_z)`.
    ///
    /// The quadrant names the side the hit came from: 0 front, 1 left,
    /// 2 back, 3 right.
    pub fn anim_hit(&mut self, dir_x: i32, dir_z: i32, timer: i32) -> Result<()> {
        let yaw = self.angle.y;
        let Some(extra) = self.kind.lara_mut() else {
            return Err(ItemError::NotActor(self.item_type));
        };

        let rel = yaw
            .wrapping_sub(atan2(dir_x, dir_z))
            .wrapping_add(ANGLE_180)
            .wrapping_add(ANGLE_45);
        extra.hit_quadrant = rel / ANGLE_90;
        extra.hit_timer = timer;

        Ok(())
    }

    /// Moves toward `point` given in `target`'s local frame.
    ///
    /// Without `lerp` the item snaps there. Otherwise position and each
    /// angle move by at most one configured step. Returns whether the item
    /// has arrived.
    pub fn move_to(&mut self, point: IVec3, target: &Item, lerp: bool, config: &SimConfig) -> bool {
        let p = target.get_relative(point);

        if !lerp {
            self.pos = p;
            self.angle = target.angle;
            return true;
        }

        let d = p - self.pos;
        let dist = sqrt(d.as_i64vec3().length_squared());

        if dist > config.move_lerp_pos {
            let step = d.as_i64vec3() * i64::from(config.move_lerp_pos) / i64::from(dist);
            self.pos += step.as_ivec3();
        } else {
            self.pos = p;
        }

        let step = config.move_lerp_rot;
        self.angle.x = angle_lerp(self.angle.x, target.angle.x, step);
        self.angle.y = angle_lerp(self.angle.y, target.angle.y, step);
        self.angle.z = angle_lerp(self.angle.z, target.angle.z, step);

        self.pos == p && self.angle == target.angle
    }
}
