//! Terrain collision sampling
//!
//! [`Item::collide_room`] probes floor and ceiling around an item and
//! classifies whether the step it just took is blocked. The result and the
//! correction that undoes a blocked step are left in a [`CollisionInfo`].
//!
//! Probes sit at the middle of the item, one radius ahead along the
//! movement quadrant, and at the two forward corners of the footprint.
//! Heights are stored relative to the item: floors relative to its feet,
//! ceilings relative to the top of its head.

pub mod contact;

use glam::IVec3;

pub use contact::{collide_bounds, collide_push, collide_spheres, sphere_mask};

use crate::config::SimConfig;
use crate::item::Item;
use crate::math::{ANGLE_45, ANGLE_90, FIXED_SHIFT, cos, sin};
use crate::room::{FloorSample, RoomGeometry, SECTOR_SHIFT, SECTOR_SIZE, WALL};

/// Clearance probed above the item's head
const CEILING_PROBE: i32 = 160;
/// Floor used for sides that must read as a wall
const SLOPE_WALL: i32 = -0x7FFF;
/// Floor used for sides that must read as a drop
const PIT_FLOOR: i32 = 512;

/// Outcome of a terrain probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionType {
    #[default]
    None,
    Front,
    Left,
    Right,
    Ceiling,
    FrontCeiling,
    FloorCeiling,
}

/// Steepness class of a probed floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlantType {
    #[default]
    None,
    Low,
    High,
}

impl SlantType {
    pub fn of(sample: &FloorSample) -> Self {
        let steepest = sample.slant_x.unsigned_abs().max(sample.slant_z.unsigned_abs());
        match steepest {
            0 => Self::None,
            1..=2 => Self::Low,
            _ => Self::High,
        }
    }
}

/// Probe position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideType {
    Middle,
    Front,
    Left,
    Right,
}

/// Relative heights found at one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionSide {
    pub floor: i32,
    pub ceiling: i32,
    pub slant: SlantType,
}

/// Input and output of a terrain probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionInfo {
    pub m: CollisionSide,
    pub f: CollisionSide,
    pub l: CollisionSide,
    pub r: CollisionSide,

    /// Largest accepted step down
    pub gap_pos: i32,
    /// Largest accepted step up, negative
    pub gap_neg: i32,
    /// Smallest accepted headroom
    pub gap_ceiling: i32,

    /// Position before the step being checked
    pub pos: IVec3,
    /// Correction to apply to the item
    pub offset: IVec3,
    pub radius: i32,
    /// Movement heading
    pub angle: u16,
    /// Heading rounded to a quarter turn, 0..=3
    pub quadrant: u16,
    pub kind: CollisionType,

    /// Floor slope under the middle probe
    pub slant_x: i8,
    pub slant_z: i8,
    pub lava: bool,

    pub slopes_are_walls: bool,
    pub slopes_are_pits: bool,
    pub lava_is_pit: bool,
    /// Solid items push the actor away
    pub enemy_push: bool,
    /// Solid items may report a hit while pushing
    pub enemy_hit: bool,
    /// A static obstacle blocked the last probe
    pub static_hit: bool,
}

impl CollisionInfo {
    /// Probe settings for the actor, with step gaps from `config`
    pub fn new(config: &SimConfig) -> Self {
        Self {
            gap_pos: config.step_height,
            gap_neg: -config.step_height,
            gap_ceiling: 0,
            radius: config.actor_radius,
            enemy_push: true,
            enemy_hit: true,
            ..Self::default()
        }
    }

    pub fn set_angle(&mut self, angle: u16) {
        self.angle = angle;
        self.quadrant = angle.wrapping_add(ANGLE_45) / ANGLE_90;
    }

    /// Stores the heights of one probe, turning steep slopes and lava into
    /// walls or pits as configured. The middle probe is stored as sampled.
    pub fn set_side(&mut self, side: SideType, floor: i32, ceiling: i32, sample: &FloorSample) {
        let slant = SlantType::of(sample);
        let mut floor = floor;

        if side != SideType::Middle {
            if self.slopes_are_walls && slant == SlantType::High && floor < 0 {
                floor = SLOPE_WALL;
            } else if self.slopes_are_pits && slant == SlantType::High && floor > 0 {
                floor = PIT_FLOOR;
            } else if self.lava_is_pit && floor > 0 && sample.lava {
                floor = PIT_FLOOR;
            }
        }

        let target = match side {
            SideType::Middle => &mut self.m,
            SideType::Front => &mut self.f,
            SideType::Left => &mut self.l,
            SideType::Right => &mut self.r,
        };
        *target = CollisionSide { floor, ceiling, slant };
    }

    fn side_blocked(&self, side: &CollisionSide) -> bool {
        side.floor > self.gap_pos || side.floor < self.gap_neg
    }
}

/// Shift that moves coordinate `a` out of its sector toward the sector of
/// `b`, landing one unit past their shared boundary; zero when both share a
/// sector.
pub fn align_offset(a: i32, b: i32) -> i32 {
    let (ca, cb) = (a >> SECTOR_SHIFT, b >> SECTOR_SHIFT);
    if ca == cb {
        return 0;
    }

    let a = a & (SECTOR_SIZE - 1);
    if ca < cb { SECTOR_SIZE + 1 - a } else { -(a + 1) }
}

impl Item {
    /// Probes the terrain around the item and classifies the step from
    /// `cinfo.pos` to the current position.
    pub fn collide_room(&self, cinfo: &mut CollisionInfo, geometry: &dyn RoomGeometry, height: i32, y_offset: i32) {
        cinfo.kind = CollisionType::None;
        cinfo.offset = IVec3::ZERO;
        cinfo.static_hit = false;

        let mut p = self.pos;
        p.y += y_offset;

        let y = p.y - height;
        let cy = y - CEILING_PROBE;
        let mut room = self.room;

        let mut probe = |v: IVec3| {
            room = geometry.get_room(room, v.x, cy, v.z);
            let sample = geometry.get_floor(room, v.x, cy, v.z);
            let floor = if sample.is_void() { WALL } else { sample.height - p.y };
            let ceiling = match geometry.get_ceiling(room, v.x, cy, v.z) {
                WALL => WALL,
                c => c - y,
            };
            (floor, ceiling, sample)
        };

        let (floor, ceiling, sample) = probe(p);
        cinfo.slant_x = sample.slant_x;
        cinfo.slant_z = sample.slant_z;
        cinfo.lava = sample.lava;
        cinfo.set_side(SideType::Middle, floor, ceiling, &sample);

        let r = cinfo.radius;
        let (f, l, rt) = match cinfo.quadrant & 3 {
            0 => (
                IVec3::new((r * sin(cinfo.angle)) >> FIXED_SHIFT, 0, r),
                IVec3::new(-r, 0, r),
                IVec3::new(r, 0, r),
            ),
            1 => (
                IVec3::new(r, 0, (r * cos(cinfo.angle)) >> FIXED_SHIFT),
                IVec3::new(r, 0, r),
                IVec3::new(r, 0, -r),
            ),
            2 => (
                IVec3::new((r * sin(cinfo.angle)) >> FIXED_SHIFT, 0, -r),
                IVec3::new(r, 0, -r),
                IVec3::new(-r, 0, -r),
            ),
            _ => (
                IVec3::new(-r, 0, (r * cos(cinfo.angle)) >> FIXED_SHIFT),
                IVec3::new(-r, 0, -r),
                IVec3::new(-r, 0, r),
            ),
        };
        let (f, l, rt) = (f + p, l + p, rt + p);
        let delta = cinfo.pos - p;

        let (floor, ceiling, sample) = probe(f);
        cinfo.set_side(SideType::Front, floor, ceiling, &sample);
        let (floor, ceiling, sample) = probe(l);
        cinfo.set_side(SideType::Left, floor, ceiling, &sample);
        let (floor, ceiling, sample) = probe(rt);
        cinfo.set_side(SideType::Right, floor, ceiling, &sample);

        geometry.collide_static(self.room, cinfo, p, height);

        cinfo.kind = classify(cinfo, p, f, l, rt, delta);
        log::trace!("{} collision {:?} offset {}", self.item_type, cinfo.kind, cinfo.offset);
    }
}

/// Evaluates the probes in priority order, filling in the correction
fn classify(cinfo: &mut CollisionInfo, p: IVec3, f: IVec3, l: IVec3, r: IVec3, delta: IVec3) -> CollisionType {
    if cinfo.m.floor == WALL || cinfo.m.floor <= cinfo.m.ceiling {
        cinfo.offset = delta;
        return CollisionType::FloorCeiling;
    }

    let mut kind = CollisionType::None;
    if cinfo.m.ceiling >= 0 {
        cinfo.offset.y = cinfo.m.ceiling;
        kind = CollisionType::Ceiling;
    }

    let x_major = cinfo.quadrant & 1 == 1;

    if cinfo.side_blocked(&cinfo.f) || cinfo.f.ceiling > cinfo.gap_ceiling {
        if x_major {
            cinfo.offset.x = align_offset(f.x, p.x);
            cinfo.offset.z = delta.z;
        } else {
            cinfo.offset.x = delta.x;
            cinfo.offset.z = align_offset(f.z, p.z);
        }
        return CollisionType::Front;
    }

    if cinfo.f.ceiling >= cinfo.gap_ceiling {
        cinfo.offset = delta;
        return CollisionType::FrontCeiling;
    }

    if cinfo.side_blocked(&cinfo.l) {
        if x_major {
            cinfo.offset.z = align_offset(l.z, f.z);
        } else {
            cinfo.offset.x = align_offset(l.x, f.x);
        }
        return CollisionType::Left;
    }

    if cinfo.side_blocked(&cinfo.r) {
        if x_major {
            cinfo.offset.z = align_offset(r.z, f.z);
        } else {
            cinfo.offset.x = align_offset(r.x, f.x);
        }
        return CollisionType::Right;
    }

    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemFlags, ItemType};
    use crate::level::Level;
    use crate::level::builder::{LevelBuilder, clip};
    use crate::math::{ANGLE_90, ANGLE_180};
    use crate::room::{RoomId, SectorGrid, StaticBox};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    const HEIGHT: i32 = 762;

    fn level() -> Level {
        LevelBuilder::new().anim(clip(0, 1)).model(ItemType::Lara, 1, 0).build()
    }

    fn lara_at(level: &Level, pos: IVec3) -> Item {
        Item::new(level, ItemType::Lara, RoomId(0), pos, 0, ItemFlags::empty(), 0).unwrap()
    }

    fn cinfo_at(pos: IVec3, angle: u16) -> CollisionInfo {
        let mut cinfo = CollisionInfo::new(&SimConfig::default());
        cinfo.pos = pos;
        cinfo.set_angle(angle);
        cinfo
    }

    #[test_case(0, 0 ; "north")]
    #[test_case(ANGLE_45 - 1, 0 ; "just under diagonal")]
    #[test_case(ANGLE_45, 1 ; "diagonal rounds up")]
    #[test_case(ANGLE_90, 1 ; "east")]
    #[test_case(ANGLE_180, 2 ; "south")]
    #[test_case(0xE000, 0 ; "wraps")]
    fn test_quadrant(angle: u16, expected: u16) {
        let mut cinfo = CollisionInfo::default();
        cinfo.set_angle(angle);
        assert_eq!(cinfo.quadrant, expected);
    }

    #[test_case(100, 100, 0 ; "same cell")]
    #[test_case(1000, 1100, 25 ; "into next cell")]
    #[test_case(1100, 1000, -77 ; "into previous cell")]
    fn test_align_offset(a: i32, b: i32, expected: i32) {
        assert_eq!(align_offset(a, b), expected);
    }

    proptest! {
        #[test]
        fn prop_align_offset_meets_boundary(cell in -64i32..64, lo in 0i32..1024, hi in 0i32..1024) {
            let boundary = (cell + 1) * SECTOR_SIZE;
            let below = cell * SECTOR_SIZE + lo;
            let above = boundary + hi;

            let up = align_offset(below, above);
            let down = align_offset(above, below);

            prop_assert!(up > 0);
            prop_assert!(down < 0);
            prop_assert_eq!(below + up, boundary + 1);
            prop_assert_eq!(above + down, boundary - 1);
        }

        #[test]
        fn prop_same_cell_is_zero(a in -65536i32..65536, d in 0i32..1024) {
            let base = a & !(SECTOR_SIZE - 1);
            prop_assert_eq!(align_offset(base + d, base), 0);
        }
    }

    #[test]
    fn test_open_floor_is_clear() {
        let level = level();
        let grid = SectorGrid::flat(8, 8, 0, -4096);
        let lara = lara_at(&level, IVec3::new(4096, 0, 4096));
        let mut cinfo = cinfo_at(lara.pos, 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.kind, CollisionType::None);
        assert_eq!(cinfo.offset, IVec3::ZERO);
        assert_eq!(cinfo.m.floor, 0);
        assert_eq!(cinfo.m.ceiling, -4096 + HEIGHT);
    }

    #[test]
    fn test_wall_ahead_snaps_to_boundary() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.set_solid(4096, 5120);
        let lara = lara_at(&level, IVec3::new(4600, 0, 5050));
        let mut cinfo = cinfo_at(IVec3::new(4600, 0, 5000), 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.kind, CollisionType::Front);
        // front sample at z 5150 is pulled back to 5119
        assert_eq!(cinfo.offset, IVec3::new(0, 0, -31));
    }

    #[test]
    fn test_step_too_high_blocks() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.sector_mut(4096, 5120).unwrap().floor = -512;
        let lara = lara_at(&level, IVec3::new(4600, 0, 5050));
        let mut cinfo = cinfo_at(lara.pos, 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.kind, CollisionType::Front);
        assert_eq!(cinfo.f.floor, -512);
    }

    #[test]
    fn test_crushed_middle() {
        let level = level();
        let grid = SectorGrid::flat(8, 8, 0, -700);
        let lara = lara_at(&level, IVec3::new(4096, 0, 4096));
        let mut cinfo = cinfo_at(IVec3::new(4096, 0, 4000), 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.m.ceiling, 62);
        assert_eq!(cinfo.kind, CollisionType::FloorCeiling);
        assert_eq!(cinfo.offset, IVec3::new(0, 0, -96));
    }

    #[test]
    fn test_head_hits_ceiling_in_air() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -850);
        grid.sector_mut(4096, 5120).unwrap().ceiling = -2000;
        let lara = lara_at(&level, IVec3::new(4600, -100, 5050));
        let mut cinfo = cinfo_at(lara.pos, 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.m.floor, 100);
        assert_eq!(cinfo.m.ceiling, 12);
        assert_eq!(cinfo.kind, CollisionType::Ceiling);
        assert_eq!(cinfo.offset, IVec3::new(0, 12, 0));
    }

    #[test]
    fn test_left_wall() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.set_solid(3072, 5120);
        let lara = lara_at(&level, IVec3::new(4120, 0, 5050));
        let mut cinfo = cinfo_at(lara.pos, 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.kind, CollisionType::Left);
        // left sample at x 4020 moves into the front sample's cell
        assert_eq!(cinfo.offset.x, 1025 - (4020 & 1023));
    }

    #[test]
    fn test_middle_void() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.set_solid(4096, 4096);
        let lara = lara_at(&level, IVec3::new(4200, 0, 4200));
        let mut cinfo = cinfo_at(IVec3::new(4000, 0, 4200), 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert_eq!(cinfo.kind, CollisionType::FloorCeiling);
        assert_eq!(cinfo.offset, IVec3::new(-200, 0, 0));
    }

    #[test]
    fn test_static_box_blocks_front() {
        let level = level();
        let mut grid = SectorGrid::flat(8, 8, 0, -4096);
        grid.statics.push(StaticBox {
            min: IVec3::new(4000, -500, 4150),
            max: IVec3::new(4200, 0, 4300),
        });
        let lara = lara_at(&level, IVec3::new(4100, 0, 4100));
        let mut cinfo = cinfo_at(lara.pos, 0);

        lara.collide_room(&mut cinfo, &grid, HEIGHT, 0);
        assert!(cinfo.static_hit);
        assert_eq!(cinfo.kind, CollisionType::Front);
    }

    #[test]
    fn test_steep_slope_as_wall() {
        let mut cinfo = CollisionInfo::new(&SimConfig::default());
        cinfo.slopes_are_walls = true;
        let steep = FloorSample {
            slant_x: 4,
            ..FloorSample::flat(0)
        };

        cinfo.set_side(SideType::Front, -100, -800, &steep);
        assert_eq!(cinfo.f.floor, SLOPE_WALL);
        assert_eq!(cinfo.f.slant, SlantType::High);

        cinfo.set_side(SideType::Middle, -100, -800, &steep);
        assert_eq!(cinfo.m.floor, -100);
    }

    #[test]
    fn test_lava_as_pit() {
        let mut cinfo = CollisionInfo::new(&SimConfig::default());
        cinfo.lava_is_pit = true;
        let lava = FloorSample {
            lava: true,
            ..FloorSample::flat(0)
        };
        cinfo.set_side(SideType::Left, 100, -800, &lava);
        assert_eq!(cinfo.l.floor, PIT_FLOOR);
    }

    /// Geometry whose middle column is void or crushed; every other point
    /// reads fixed heights
    struct Pinched {
        middle_void: bool,
        side_floor: i32,
        side_ceiling: i32,
    }

    impl RoomGeometry for Pinched {
        fn get_room(&self, room: RoomId, _x: i32, _y: i32, _z: i32) -> RoomId {
            room
        }

        fn get_floor(&self, _room: RoomId, x: i32, _y: i32, z: i32) -> FloorSample {
            if (x, z) == (0, 0) {
                if self.middle_void { FloorSample::VOID } else { FloorSample::flat(-900) }
            } else {
                FloorSample::flat(self.side_floor)
            }
        }

        fn get_ceiling(&self, _room: RoomId, x: i32, _y: i32, z: i32) -> i32 {
            if (x, z) == (0, 0) { -1000 } else { self.side_ceiling }
        }
    }

    proptest! {
        #[test]
        fn prop_middle_failure_short_circuits(
            middle_void in any::<bool>(),
            side_floor in -2000i32..2000,
            side_ceiling in -3000i32..0,
            angle in any::<u16>(),
        ) {
            let level = level();
            let geometry = Pinched { middle_void, side_floor, side_ceiling };
            let lara = lara_at(&level, IVec3::ZERO);
            let mut cinfo = cinfo_at(IVec3::new(10, 0, -20), angle);

            lara.collide_room(&mut cinfo, &geometry, HEIGHT, 0);
            prop_assert_eq!(cinfo.kind, CollisionType::FloorCeiling);
            prop_assert_eq!(cinfo.offset, IVec3::new(10, 0, -20));
        }
    }
}
