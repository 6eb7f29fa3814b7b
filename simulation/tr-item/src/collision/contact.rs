//! Contact between items and the actor: box and sphere overlap, push-out

use crate::collision::{CollisionInfo, CollisionType};
use crate::config::SimConfig;
use crate::error::Result;
use crate::item::{Item, Sphere};
use crate::level::Level;
use crate::math::fixed::{rotate_x, rotate_z};
use crate::math::{atan2, cos, sin};
use crate::room::{RoomGeometry, WALL};

/// Boxes shorter than this never report a directional hit
const HIT_MIN_HEIGHT: i32 = 256;
/// Steps the actor's hit reaction lasts after being shoved
const PUSH_HIT_TIMER: i32 = 5;
/// Room lookup offset after the actor has been moved
const PUSH_ROOM_OFFSET: i32 = -10;

/// Actor offset from the item, in the item's yawed frame
fn local_offset(item: &Item, actor: &Item) -> (i32, i32, i32, i32) {
    let dx = actor.pos.x - item.pos.x;
    let dz = actor.pos.z - item.pos.z;
    let (s, c) = (sin(item.angle.y), cos(item.angle.y));
    (rotate_x(dx, dz, s, c), rotate_z(dx, dz, s, c), dx, dz)
}

/// Whether the actor, inflated by the probe radius, touches the item's box
pub fn collide_bounds(level: &Level, item: &Item, actor: &Item, cinfo: &CollisionInfo) -> Result<bool> {
    let a = item.bounding_box(level, false)?;
    let b = actor.bounding_box(level, false)?;

    let dy = actor.pos.y - item.pos.y;
    if a.max_y - b.min_y <= dy || a.min_y - b.max_y >= dy {
        return Ok(false);
    }

    let (px, pz, _, _) = local_offset(item, actor);
    let r = cinfo.radius;

    Ok(px >= a.min_x - r && px <= a.max_x + r && pz >= a.min_z - r && pz <= a.max_z + r)
}

/// Bit `i` is set when sphere `i` of `a` overlaps any sphere of `b`
pub fn sphere_mask(a: &[Sphere], b: &[Sphere]) -> u32 {
    a.iter()
        .take(32)
        .enumerate()
        .filter(|(_, sa)| b.iter().any(|sb| sa.overlaps(sb)))
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

/// Joints of `item` touching any joint of the actor
pub fn collide_spheres(level: &Level, item: &Item, actor: &Item) -> Result<u32> {
    let a = item.spheres(level)?;
    let b = actor.spheres(level)?;
    Ok(sphere_mask(a.as_slice(), b.as_slice()))
}

/// Pushes the actor out of `item`'s box along the shallowest side.
///
/// The actor is then probed against the room from its new position with
/// relaxed gaps; if that step is blocked it goes back to `cinfo.pos`.
/// With `enemy_hit` set, tall items also register a directional hit on the
/// actor. Returns whether the actor was inside the box.
pub fn collide_push(
    level: &Level,
    geometry: &dyn RoomGeometry,
    item: &Item,
    actor: &mut Item,
    cinfo: &mut CollisionInfo,
    enemy_hit: bool,
    config: &SimConfig,
) -> Result<bool> {
    let (mut px, mut pz, dx, dz) = local_offset(item, actor);

    let bounds = item.bounding_box(level, false)?;
    let r = cinfo.radius;
    let (min_x, max_x) = (bounds.min_x - r, bounds.max_x + r);
    let (min_z, max_z) = (bounds.min_z - r, bounds.max_z + r);

    if px < min_x || px > max_x || pz < min_z || pz > max_z {
        return Ok(false);
    }

    let enemy_hit = enemy_hit && cinfo.enemy_hit && bounds.height() > HIT_MIN_HEIGHT;

    let ax = px - min_x;
    let bx = max_x - px;
    let az = pz - min_z;
    let bz = max_z - pz;

    if ax <= bx && ax <= az && ax <= bz {
        px -= ax;
    } else if bx <= ax && bx <= az && bx <= bz {
        px += bx;
    } else if az <= ax && az <= bx && az <= bz {
        pz -= az;
    } else {
        pz += bz;
    }

    let (s, c) = (-sin(item.angle.y), cos(item.angle.y));
    actor.pos.x = item.pos.x + rotate_x(px, pz, s, c);
    actor.pos.z = item.pos.z + rotate_z(px, pz, s, c);

    log::trace!("{} pushed the actor to {}", item.item_type, actor.pos);

    if enemy_hit {
        let cx = (min_x + max_x) >> 1;
        let cz = (min_z + max_z) >> 1;
        actor.anim_hit(dx - rotate_x(cx, cz, s, c), dz - rotate_z(cx, cz, s, c), PUSH_HIT_TIMER)?;
    }

    let saved = *cinfo;
    cinfo.gap_pos = -WALL;
    cinfo.gap_neg = -config.step_height;
    cinfo.gap_ceiling = 0;
    cinfo.set_angle(atan2(actor.pos.x - cinfo.pos.x, actor.pos.z - cinfo.pos.z));

    actor.collide_room(cinfo, geometry, config.actor_height, 0);

    cinfo.gap_pos = saved.gap_pos;
    cinfo.gap_neg = saved.gap_neg;
    cinfo.gap_ceiling = saved.gap_ceiling;
    cinfo.set_angle(saved.angle);

    if cinfo.kind == CollisionType::None {
        cinfo.pos = actor.pos;
        actor.update_room(geometry, PUSH_ROOM_OFFSET);
    } else {
        log::debug!("Push by {} blocked by {:?}", item.item_type, cinfo.kind);
        actor.pos.x = cinfo.pos.x;
        actor.pos.z = cinfo.pos.z;
    }

    Ok(true)
}

impl Item {
    /// Recomputes which joints touch the actor; zero when the boxes miss
    pub fn update_hit_mask(&mut self, level: &Level, actor: &Item, cinfo: &CollisionInfo) -> Result<u32> {
        self.hit_mask = 0;

        if collide_bounds(level, self, actor, cinfo)? {
            self.hit_mask = collide_spheres(level, self, actor)?;
        }

        Ok(self.hit_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemFlags, ItemType};
    use crate::level::Bounds;
    use crate::level::builder::{LevelBuilder, clip, sphere};
    use crate::math::ANGLE_90;
    use crate::room::{RoomId, SectorGrid};
    use glam::IVec3;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn level() -> Level {
        LevelBuilder::new()
            .anim(clip(0, 1).bounds(Bounds::new(-512, 512, -1024, 0, -512, 512)))
            .anim(clip(0, 1).bounds(Bounds::new(-100, 100, -762, 0, -100, 100)))
            .model(ItemType::Block1, 1, 0)
            .model(ItemType::Wolf, 1, 0)
            .skeleton(ItemType::Lara, 1, vec![], vec![sphere(0, -400, 0, 120)])
            .build()
    }

    fn spawn(level: &Level, item_type: ItemType, x: i32, z: i32) -> Item {
        Item::new(level, item_type, RoomId(0), IVec3::new(x, 0, z), 0, ItemFlags::empty(), 0).unwrap()
    }

    fn cinfo_for(actor: &Item) -> CollisionInfo {
        let mut cinfo = CollisionInfo::new(&SimConfig::default());
        cinfo.pos = actor.pos;
        cinfo
    }

    #[test]
    fn test_bounds_overlap() {
        let level = level();
        let block = spawn(&level, ItemType::Block1, 2048, 2048);
        let cinfo = cinfo_for(&block);

        assert!(collide_bounds(&level, &block, &spawn(&level, ItemType::Lara, 2048 + 600, 2048), &cinfo).unwrap());
        assert!(!collide_bounds(&level, &block, &spawn(&level, ItemType::Lara, 2048 + 620, 2048), &cinfo).unwrap());

        let mut above = spawn(&level, ItemType::Lara, 2048, 2048);
        above.pos.y = -1900;
        assert!(!collide_bounds(&level, &block, &above, &cinfo).unwrap());
    }

    #[test]
    fn test_bounds_follow_item_yaw() {
        let level = LevelBuilder::new()
            .anim(clip(0, 1).bounds(Bounds::new(-100, 100, -200, 0, 0, 1000)))
            .model(ItemType::Block1, 1, 0)
            .model(ItemType::Lara, 1, 0)
            .build();
        let mut block = spawn(&level, ItemType::Block1, 0, 0);
        let actor = spawn(&level, ItemType::Lara, 800, 0);
        let cinfo = cinfo_for(&actor);

        assert!(!collide_bounds(&level, &block, &actor, &cinfo).unwrap());
        block.angle.y = ANGLE_90;
        assert!(collide_bounds(&level, &block, &actor, &cinfo).unwrap());
    }

    #[test]
    fn test_push_out_along_shallowest_side() {
        let level = level();
        let grid = SectorGrid::flat(8, 8, 0, -4096);
        let block = spawn(&level, ItemType::Block1, 2048, 2048);
        let mut lara = spawn(&level, ItemType::Lara, 2048 + 550, 2048);
        let mut cinfo = cinfo_for(&lara);

        let pushed = collide_push(&level, &grid, &block, &mut lara, &mut cinfo, false, &SimConfig::default()).unwrap();
        assert!(pushed);
        assert_eq!(lara.pos, IVec3::new(2048 + 612, 0, 2048));
        assert_eq!(cinfo.pos, lara.pos);
        assert_eq!(cinfo.gap_pos, SimConfig::default().step_height);
    }

    #[test]
    fn test_push_into_wall_reverts() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.set_solid(3072, 2048);
        let block = spawn(&level, ItemType::Block1, 2400, 2048);
        let mut lara = spawn(&level, ItemType::Lara, 2950, 2048);
        let mut cinfo = cinfo_for(&lara);

        collide_push(&level, &grid, &block, &mut lara, &mut cinfo, false, &SimConfig::default()).unwrap();
        assert_eq!(cinfo.kind, CollisionType::Front);
        assert_eq!(lara.pos, IVec3::new(2950, 0, 2048));
    }

    #[test]
    fn test_push_outside_box_does_nothing() {
        let level = level();
        let grid = SectorGrid::flat(8, 8, 0, -4096);
        let block = spawn(&level, ItemType::Block1, 2048, 2048);
        let mut lara = spawn(&level, ItemType::Lara, 2048 + 700, 2048);
        let mut cinfo = cinfo_for(&lara);

        let pushed = collide_push(&level, &grid, &block, &mut lara, &mut cinfo, true, &SimConfig::default()).unwrap();
        assert!(!pushed);
        assert_eq!(lara.pos, IVec3::new(2048 + 700, 0, 2048));
    }

    #[test]
    fn test_tall_item_hits_actor() {
        let level = level();
        let grid = SectorGrid::flat(8, 8, 0, -4096);
        let block = spawn(&level, ItemType::Block1, 2048, 2048);
        let mut lara = spawn(&level, ItemType::Lara, 2048 + 550, 2048);
        let mut cinfo = cinfo_for(&lara);

        collide_push(&level, &grid, &block, &mut lara, &mut cinfo, true, &SimConfig::default()).unwrap();
        let extra = lara.kind.lara().unwrap();
        // the block sits on the actor's left
        assert_eq!(extra.hit_quadrant, 1);
        assert_eq!(extra.hit_timer, PUSH_HIT_TIMER);
    }

    #[test]
    fn test_hit_mask_requires_box_contact() {
        let level = LevelBuilder::new()
            .anim(clip(0, 1).bounds(Bounds::new(-100, 100, -500, 0, -100, 100)))
            .skeleton(ItemType::Wolf, 0, vec![], vec![sphere(0, -300, 0, 150)])
            .skeleton(ItemType::Lara, 0, vec![], vec![sphere(0, -400, 0, 120)])
            .build();
        let mut wolf = spawn(&level, ItemType::Wolf, 1000, 1000);
        let near = spawn(&level, ItemType::Lara, 1200, 1000);
        let far = spawn(&level, ItemType::Lara, 1500, 1000);
        let cinfo = cinfo_for(&near);

        assert_eq!(wolf.update_hit_mask(&level, &near, &cinfo).unwrap(), 0b1);
        assert_eq!(wolf.hit_mask, 0b1);
        assert_eq!(wolf.update_hit_mask(&level, &far, &cinfo).unwrap(), 0);
        assert_eq!(wolf.hit_mask, 0);
    }

    #[test]
    fn test_sphere_mask_bits() {
        let a = [
            Sphere { center: IVec3::ZERO, radius: 10 },
            Sphere { center: IVec3::new(100, 0, 0), radius: 10 },
            Sphere { center: IVec3::new(200, 0, 0), radius: 0 },
        ];
        let b = [Sphere { center: IVec3::new(105, 0, 0), radius: 10 }, Sphere { center: IVec3::new(200, 0, 0), radius: 50 }];
        assert_eq!(sphere_mask(&a, &b), 0b010);
    }

    fn any_sphere() -> impl Strategy<Value = Sphere> {
        (-5000i32..5000, -5000i32..5000, -5000i32..5000, -10i32..2000).prop_map(|(x, y, z, radius)| Sphere {
            center: IVec3::new(x, y, z),
            radius,
        })
    }

    proptest! {
        #[test]
        fn prop_sphere_overlap_is_commutative(a in any_sphere(), b in any_sphere()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            prop_assert_eq!(sphere_mask(&[a], &[b]), sphere_mask(&[b], &[a]));
        }
    }
}
