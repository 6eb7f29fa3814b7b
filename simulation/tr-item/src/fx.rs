//! Effects that spawn items
//!
//! An item raising an effect is borrowed out of the pool while it steps, so
//! effects are queued on the [`TickContext`] as [`FxRequest`]s and spawned by
//! the pool once the step is over.

use glam::IVec3;

use crate::context::TickContext;
use crate::error::Result;
use crate::item::{Item, ItemFlags, ItemType};
use crate::math::ANGLE_90;
use crate::pool::ItemPool;
use crate::room::RoomId;

/// Sound played by a ricochet that asks for one
pub const SOUND_RICOCHET: i16 = 10;
/// Splash sprites spawned per splash
pub const SPLASH_COUNT: usize = 10;

const BUBBLE_ROLL: i32 = 3;
const BUBBLE_RISE_MIN: i32 = 10;
const BUBBLE_RISE_SPREAD: i32 = 6;
const RICOCHET_TIMER: i16 = 4;
const BLOOD_TIMER: i16 = 4;
const SMOKE_TIMER: i16 = 3;

/// Queued effect spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxRequest {
    Bubbles { room: RoomId, pos: IVec3, count: u8 },
    Ricochet { room: RoomId, pos: IVec3, sound: bool },
    Blood { room: RoomId, pos: IVec3, angle_y: u16, speed: i16 },
    Smoke { room: RoomId, pos: IVec3 },
    /// `pos.y` is the water surface
    Splash { room: RoomId, pos: IVec3 },
}

impl Item {
    /// Releases zero to two bubbles at `offset` in the frame of `joint`
    pub fn fx_bubbles(&self, ctx: &mut TickContext<'_>, joint: usize, offset: IVec3) {
        let count = ctx.rng.draw() % BUBBLE_ROLL;
        if count == 0 {
            return;
        }

        match self.joint(ctx.level, joint, offset) {
            Ok(pos) => ctx.fx.push(FxRequest::Bubbles {
                room: self.room,
                pos,
                count: count as u8,
            }),
            Err(err) => log::warn!("No bubbles from {}: {err}", self.item_type),
        }
    }

    pub fn fx_ricochet(&self, ctx: &mut TickContext<'_>, room: RoomId, pos: IVec3, sound: bool) {
        ctx.fx.push(FxRequest::Ricochet { room, pos, sound });
    }

    /// Blood spray moving along `angle_y`
    pub fn fx_blood(&self, ctx: &mut TickContext<'_>, pos: IVec3, angle_y: u16, speed: i16) {
        ctx.fx.push(FxRequest::Blood {
            room: self.room,
            pos,
            angle_y,
            speed,
        });
    }

    pub fn fx_smoke(&self, ctx: &mut TickContext<'_>, pos: IVec3) {
        ctx.fx.push(FxRequest::Smoke { room: self.room, pos });
    }

    /// Splash on the water surface above the item; nothing out of water
    pub fn fx_splash(&self, ctx: &mut TickContext<'_>) {
        let Some(surface) = self.water_level(ctx.geometry) else {
            log::trace!("{} is not in water, no splash", self.item_type);
            return;
        };

        ctx.fx.push(FxRequest::Splash {
            room: self.room,
            pos: IVec3::new(self.pos.x, surface, self.pos.z),
        });
    }
}

impl ItemPool {
    /// Spawns every queued effect, logging the ones that do not fit
    pub fn drain_fx(&mut self, ctx: &mut TickContext<'_>) {
        for request in std::mem::take(&mut ctx.fx) {
            if let Err(err) = self.apply_fx(ctx, request) {
                log::warn!("Dropped effect {request:?}: {err}");
            }
        }
    }

    /// Spawns and activates the items of one effect.
    ///
    /// A splash stops at the first sprite that cannot be spawned.
    pub fn apply_fx(&mut self, ctx: &mut TickContext<'_>, request: FxRequest) -> Result<()> {
        let level = ctx.level;

        match request {
            FxRequest::Bubbles { room, pos, count } => {
                for _ in 0..count {
                    let index = self.spawn_active(level, ItemType::Bubble, room, pos, 0)?;
                    let rise = BUBBLE_RISE_MIN + ctx.rng.range(BUBBLE_RISE_SPREAD);
                    self.item_mut(index)?.v_speed = rise;
                }
            }
            FxRequest::Ricochet { room, pos, sound } => {
                let index = self.spawn_active(level, ItemType::Ricochet, room, pos, 0)?;
                let frames = i32::from(level.model(ItemType::Ricochet)?.sprite_frames);
                let roll = ctx.rng.draw();

                let item = self.item_mut(index)?;
                item.timer = RICOCHET_TIMER;
                if frames > 0 {
                    item.frame_index = (roll % frames) as u16;
                }

                if sound {
                    ctx.sound_play(SOUND_RICOCHET, pos);
                }
            }
            FxRequest::Blood { room, pos, angle_y, speed } => {
                let index = self.spawn_active(level, ItemType::Blood, room, pos, angle_y)?;
                let item = self.item_mut(index)?;
                item.h_speed = i32::from(speed);
                item.timer = BLOOD_TIMER;
                item.flags.insert(ItemFlags::ANIMATED);
            }
            FxRequest::Smoke { room, pos } => {
                let index = self.spawn_active(level, ItemType::Smoke, room, pos, 0)?;
                let item = self.item_mut(index)?;
                item.timer = SMOKE_TIMER;
                item.flags.insert(ItemFlags::ANIMATED);
            }
            FxRequest::Splash { room, pos } => {
                for _ in 0..SPLASH_COUNT {
                    let angle_y = (((ctx.rng.draw() - i32::from(ANGLE_90)) as i16) << 1) as u16;
                    let index = self.spawn_active(level, ItemType::Splash, room, pos, angle_y)?;
                    let speed = ctx.rng.draw() >> 8;

                    let item = self.item_mut(index)?;
                    item.h_speed = speed;
                    item.flags.insert(ItemFlags::ANIMATED);
                }
            }
        }

        Ok(())
    }
}
