//! Per-kind item behavior
//!
//! Every [`ItemKind`] variant maps to one [`Controller`]. The pool looks the
//! controller up on each call, so adding behavior means adding a variant and
//! a match arm in [`controller`].

use glam::IVec3;

use crate::collision::{CollisionInfo, CollisionType, collide_bounds, collide_push};
use crate::context::TickContext;
use crate::error::Result;
use crate::item::{Angles, Item, ItemFlags, ItemKind, ItemStatus, ItemType};
use crate::math::{FIXED_SHIFT, cos, sin};
use crate::room::{RoomGeometry, WALL};

/// What the pool should do with an item after its step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Step {
    Continue,
    /// Leave the active list but keep the slot
    Deactivate,
    /// Free the slot
    Remove,
}

/// Render record of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawItem {
    pub item_type: ItemType,
    pub pos: IVec3,
    pub angle: Angles,
    pub anim_index: u16,
    /// Absolute clip frame, or sprite frame for sprite items
    pub frame: u16,
    pub intensity: u8,
    pub visible_mask: u32,
}

/// Shared interface of all item behaviors
pub trait Controller: Sync {
    /// One simulation step
    fn update(&self, item: &mut Item, cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step>;

    /// Contact with the actor, who has already stepped this tick
    fn collide(&self, _item: &mut Item, _actor: &mut Item, _cinfo: &mut CollisionInfo, _ctx: &mut TickContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Damage dealt at world point `point`
    fn hit(&self, item: &mut Item, damage: i16, _point: IVec3, _ctx: &mut TickContext<'_>) -> Result<()> {
        log::trace!("{} ignores {damage} damage", item.item_type);
        Ok(())
    }

    fn draw(&self, item: &Item) -> Option<DrawItem> {
        (item.status != ItemStatus::Invisible).then(|| DrawItem {
            item_type: item.item_type,
            pos: item.pos,
            angle: item.angle,
            anim_index: item.anim_index,
            frame: item.frame_index,
            intensity: item.intensity,
            visible_mask: item.visible_mask,
        })
    }
}

/// Controller for an item kind
pub fn controller(kind: &ItemKind) -> &'static dyn Controller {
    match kind {
        ItemKind::Generic => &GenericController,
        ItemKind::Lara(_) => &LaraController,
        ItemKind::Enemy(_) => &EnemyController,
        ItemKind::Object => &ObjectController,
        ItemKind::SpriteEffect => &SpriteController,
        ItemKind::Bubble => &BubbleController,
    }
}

/// Re-resolves the room and lands a falling item on the floor under it
fn settle(item: &mut Item, geometry: &dyn RoomGeometry, room_offset: i32) {
    item.update_room(geometry, room_offset);

    if item.flags.contains(ItemFlags::GRAVITY) && item.room_floor != WALL && item.pos.y >= item.room_floor {
        log::trace!("{} landed at {}", item.item_type, item.room_floor);
        item.pos.y = item.room_floor;
        item.v_speed = 0;
        item.flags.remove(ItemFlags::GRAVITY);
    }
}

/// Steps the clip of a skeletal item; the kill command parks it
fn animate(item: &mut Item, ctx: &mut TickContext<'_>) -> Result<Step> {
    if ctx.level.model(item.item_type)?.is_sprite() {
        return Ok(Step::Continue);
    }

    item.anim_process(ctx, true)?;
    settle(item, ctx.geometry, 0);

    Ok(if item.status == ItemStatus::Inactive {
        Step::Deactivate
    } else {
        Step::Continue
    })
}

/// Plays its clip while active
pub struct GenericController;

impl Controller for GenericController {
    fn update(&self, item: &mut Item, _cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        animate(item, ctx)
    }
}

/// The controllable actor.
///
/// Input handling lives outside the crate: whoever drives the actor sets
/// its goal state and move angle between ticks. The controller steps the
/// clip, then resolves the move against the room.
pub struct LaraController;

impl Controller for LaraController {
    fn update(&self, item: &mut Item, cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        let height = ctx.config.actor_height;
        cinfo.pos = item.pos;

        item.anim_process(ctx, true)?;

        let heading = item.kind.lara().map_or(item.angle.y, |extra| extra.move_angle);
        cinfo.set_angle(heading);
        item.collide_room(cinfo, ctx.geometry, height, 0);

        if cinfo.kind != CollisionType::None {
            item.pos += cinfo.offset;
            if cinfo.kind == CollisionType::Ceiling && item.v_speed < 0 {
                item.v_speed = 0;
            }
        }

        settle(item, ctx.geometry, -height / 2);

        if let Some(extra) = item.kind.lara_mut() {
            extra.hit_timer = (extra.hit_timer - 1).max(0);
        }

        Ok(Step::Continue)
    }

    fn hit(&self, item: &mut Item, damage: i16, _point: IVec3, _ctx: &mut TickContext<'_>) -> Result<()> {
        item.health = item.health.saturating_sub(damage);
        log::debug!("Actor took {damage} damage, {} left", item.health);
        Ok(())
    }
}

/// Creatures. Their decisions come from outside; here they only animate,
/// bleed and shove the actor.
pub struct EnemyController;

impl Controller for EnemyController {
    fn update(&self, item: &mut Item, _cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        animate(item, ctx)
    }

    fn collide(&self, item: &mut Item, actor: &mut Item, cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<()> {
        if item.update_hit_mask(ctx.level, actor, cinfo)? == 0 {
            return Ok(());
        }

        if cinfo.enemy_push {
            collide_push(ctx.level, ctx.geometry, item, actor, cinfo, item.health > 0, ctx.config)?;
        }

        Ok(())
    }

    fn hit(&self, item: &mut Item, damage: i16, point: IVec3, ctx: &mut TickContext<'_>) -> Result<()> {
        item.health = item.health.saturating_sub(damage);
        item.fx_blood(ctx, point, item.angle.y, 0);
        log::debug!("{} took {damage} damage, {} left", item.item_type, item.health);
        Ok(())
    }
}

/// Doors, blocks, switches and traps: animated and solid
pub struct ObjectController;

impl Controller for ObjectController {
    fn update(&self, item: &mut Item, _cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        animate(item, ctx)
    }

    fn collide(&self, item: &mut Item, actor: &mut Item, cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<()> {
        if !collide_bounds(ctx.level, item, actor, cinfo)? {
            return Ok(());
        }

        if cinfo.enemy_push {
            collide_push(ctx.level, ctx.geometry, item, actor, cinfo, false, ctx.config)?;
        }

        Ok(())
    }
}

/// Short-lived sprites.
///
/// Animated sprites count steps in `frame_index` and show one sprite frame
/// every `timer` steps until the sequence runs out. Still sprites keep the
/// frame they spawned with and expire when `timer` reaches zero. Both drift
/// along their yaw at `h_speed`.
pub struct SpriteController;

impl SpriteController {
    fn period(item: &Item) -> i32 {
        i32::from(item.timer.max(1))
    }
}

impl Controller for SpriteController {
    fn update(&self, item: &mut Item, _cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        let frames = i32::from(ctx.level.model(item.item_type)?.sprite_frames);

        if item.h_speed != 0 {
            let h = i64::from(item.h_speed);
            item.pos.x += ((i64::from(sin(item.angle.y)) * h) >> FIXED_SHIFT) as i32;
            item.pos.z += ((i64::from(cos(item.angle.y)) * h) >> FIXED_SHIFT) as i32;
        }

        let expired = if item.flags.contains(ItemFlags::ANIMATED) {
            item.frame_index = item.frame_index.saturating_add(1);
            i32::from(item.frame_index) / Self::period(item) >= frames
        } else {
            item.timer -= 1;
            item.timer <= 0
        };

        Ok(if expired { Step::Remove } else { Step::Continue })
    }

    fn draw(&self, item: &Item) -> Option<DrawItem> {
        let frame = if item.flags.contains(ItemFlags::ANIMATED) {
            (i32::from(item.frame_index) / Self::period(item)) as u16
        } else {
            item.frame_index
        };

        Some(DrawItem {
            item_type: item.item_type,
            pos: item.pos,
            angle: item.angle,
            anim_index: 0,
            frame,
            intensity: item.intensity,
            visible_mask: item.visible_mask,
        })
    }
}

/// Rises at `v_speed` until it reaches the water surface
pub struct BubbleController;

impl Controller for BubbleController {
    fn update(&self, item: &mut Item, _cinfo: &mut CollisionInfo, ctx: &mut TickContext<'_>) -> Result<Step> {
        item.pos.y -= item.v_speed;
        item.update_room(ctx.geometry, 0);

        Ok(match item.water_level(ctx.geometry) {
            Some(surface) if item.pos.y > surface => Step::Continue,
            _ => Step::Remove,
        })
    }
}
