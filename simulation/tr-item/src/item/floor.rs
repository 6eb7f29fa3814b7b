//! Room membership, water queries and floors provided by items
//!
//! Bridges, trap doors, draw bridges and collapsing floors are items that
//! the actor can stand on. Geometry implementations that want them merged
//! into their floor queries wrap themselves in [`ItemFloors`].

use glam::IVec3;

use super::{Item, ItemType};
use crate::collision::CollisionInfo;
use crate::math::{ANGLE_0, ANGLE_90, ANGLE_180, Matrix};
use crate::room::{FloorSample, RoomGeometry, RoomId, SECTOR_SHIFT, SECTOR_SIZE, WALL};

/// Yaw of a quarter turn to the left
const ANGLE_NEG_90: u16 = ANGLE_90.wrapping_neg();

impl Item {
    /// Re-resolves the owning room at `y + offset` and caches the floor
    /// height under the item.
    pub fn update_room(&mut self, geometry: &dyn RoomGeometry, offset: i32) {
        let p = self.pos;
        let room = geometry.get_room(self.room, p.x, p.y + offset, p.z);

        if room != self.room {
            log::debug!("{} moved from room {} to {}", self.item_type, self.room.0, room.0);
            self.room = room;
        }

        self.room_floor = geometry.get_floor(self.room, p.x, p.y, p.z).height;
    }

    /// World position of a point given in the item's local frame
    pub fn get_relative(&self, point: IVec3) -> IVec3 {
        let mut m = Matrix::IDENTITY;
        m.rotate_yxz(self.angle.x, self.angle.y, self.angle.z);
        self.pos + m.rotate_vector(point)
    }

    /// Height of the water surface above the item, if it is in water
    pub fn water_level(&self, geometry: &dyn RoomGeometry) -> Option<i32> {
        geometry.water_level(self.room, self.pos.x, self.pos.y, self.pos.z)
    }

    /// Depth of the water under the item, if it is in water
    pub fn water_depth(&self, geometry: &dyn RoomGeometry) -> Option<i32> {
        geometry.water_depth(self.room, self.pos.x, self.pos.y, self.pos.z)
    }

    /// Merges the surface this item provides at `(x, z)` into the given
    /// floor and ceiling heights. Items that provide no surface do nothing.
    pub fn floor_ceiling(&self, x: i32, y: i32, z: i32, floor: Option<&mut i32>, ceiling: Option<&mut i32>) {
        if let Some(provider) = FloorProvider::of(self) {
            provider.floor_ceiling(x, y, z, floor, ceiling);
        }
    }
}

/// The parts of an item that shape the surface it provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorProvider {
    pub item_type: ItemType,
    pub room: RoomId,
    pub pos: IVec3,
    pub yaw: u16,
    pub state: u8,
}

impl FloorProvider {
    pub fn of(item: &Item) -> Option<Self> {
        item.item_type.provides_floor().then_some(Self {
            item_type: item.item_type,
            room: item.room,
            pos: item.pos,
            yaw: item.angle.y,
            state: item.state,
        })
    }

    /// Cell offset from the point to the item, in sectors
    fn cell_delta(&self, x: i32, z: i32) -> (i32, i32) {
        (
            (self.pos.x >> SECTOR_SHIFT) - (x >> SECTOR_SHIFT),
            (self.pos.z >> SECTOR_SHIFT) - (z >> SECTOR_SHIFT),
        )
    }

    /// Bridge deck height; tilted decks rise by a quarter or half click per
    /// unit across the sector
    pub fn bridge_floor(&self, x: i32, z: i32) -> i32 {
        if self.item_type == ItemType::BridgeFlat {
            return self.pos.y;
        }

        let h = match self.yaw {
            ANGLE_0 => SECTOR_SIZE - x,
            ANGLE_180 => x,
            ANGLE_90 => z,
            _ => SECTOR_SIZE - z,
        } & (SECTOR_SIZE - 1);

        self.pos.y + if self.item_type == ItemType::BridgeTilt1 { h >> 2 } else { h >> 1 }
    }

    /// Closed trap door: its own cell plus the cell it folds over
    pub fn trap_door_floor(&self, x: i32, z: i32) -> i32 {
        let covers = match self.cell_delta(x, z) {
            (0, 0) => true,
            (0, 1) => self.yaw == ANGLE_0,
            (0, -1) => self.yaw == ANGLE_180,
            (1, 0) => self.yaw == ANGLE_90,
            (-1, 0) => self.yaw == ANGLE_NEG_90,
            _ => false,
        };
        if covers { self.pos.y } else { WALL }
    }

    /// Lowered draw bridge: the two cells in front of its hinge
    pub fn draw_bridge_floor(&self, x: i32, z: i32) -> i32 {
        let covers = match self.cell_delta(x, z) {
            (0, -1 | -2) => self.yaw == ANGLE_0,
            (0, 1 | 2) => self.yaw == ANGLE_180,
            (-1 | -2, 0) => self.yaw == ANGLE_90,
            (1 | 2, 0) => self.yaw == ANGLE_NEG_90,
            _ => false,
        };
        if covers { self.pos.y } else { WALL }
    }

    /// Surface height at `(x, z)`, merged into `floor` when the point is
    /// above it and into `ceiling` when below
    pub fn floor_ceiling(&self, x: i32, y: i32, z: i32, floor: Option<&mut i32>, ceiling: Option<&mut i32>) {
        let h = match self.item_type {
            ItemType::TrapFloor if self.state <= 1 => self.pos.y - 512,
            ItemType::Drawbridge if self.state == 1 => self.draw_bridge_floor(x, z),
            t if t.is_bridge() => self.bridge_floor(x, z),
            t if t.is_trap_door() => {
                if self.state != 0 {
                    return;
                }
                let h = self.trap_door_floor(x, z);
                if floor.as_deref().is_some_and(|f| h >= *f) || ceiling.as_deref().is_some_and(|c| h <= *c) {
                    return;
                }
                h
            }
            _ => WALL,
        };

        if h == WALL {
            return;
        }

        if let Some(floor) = floor
            && y <= h
        {
            *floor = h;
        }

        if let Some(ceiling) = ceiling
            && y > h
        {
            *ceiling = h + 256;
        }
    }
}

/// Geometry decorator merging item-provided surfaces into floor and ceiling
/// queries of the wrapped geometry
pub struct ItemFloors<'a> {
    geometry: &'a dyn RoomGeometry,
    providers: Vec<FloorProvider>,
}

impl<'a> ItemFloors<'a> {
    pub fn new(geometry: &'a dyn RoomGeometry, providers: Vec<FloorProvider>) -> Self {
        Self { geometry, providers }
    }

    pub fn providers(&self) -> &[FloorProvider] {
        &self.providers
    }

    fn in_room(&self, room: RoomId) -> impl Iterator<Item = &FloorProvider> {
        self.providers.iter().filter(move |p| p.room == room)
    }
}

impl RoomGeometry for ItemFloors<'_> {
    fn get_room(&self, room: RoomId, x: i32, y: i32, z: i32) -> RoomId {
        self.geometry.get_room(room, x, y, z)
    }

    fn get_floor(&self, room: RoomId, x: i32, y: i32, z: i32) -> FloorSample {
        let sample = self.geometry.get_floor(room, x, y, z);
        let mut height = sample.height;

        for provider in self.in_room(room) {
            provider.floor_ceiling(x, y, z, Some(&mut height), None);
        }

        if height == sample.height {
            sample
        } else {
            FloorSample::flat(height)
        }
    }

    fn get_ceiling(&self, room: RoomId, x: i32, y: i32, z: i32) -> i32 {
        let mut height = self.geometry.get_ceiling(room, x, y, z);
        for provider in self.in_room(room) {
            provider.floor_ceiling(x, y, z, None, Some(&mut height));
        }
        height
    }

    fn collide_static(&self, room: RoomId, cinfo: &mut CollisionInfo, p: IVec3, height: i32) {
        self.geometry.collide_static(room, cinfo, p, height);
    }

    fn water_level(&self, room: RoomId, x: i32, y: i32, z: i32) -> Option<i32> {
        self.geometry.water_level(room, x, y, z)
    }

    fn water_depth(&self, room: RoomId, x: i32, y: i32, z: i32) -> Option<i32> {
        self.geometry.water_depth(room, x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFlags;
    use crate::level::Level;
    use crate::level::builder::{LevelBuilder, clip};
    use crate::room::SectorGrid;
    use test_case::test_case;

    fn level() -> Level {
        let mut builder = LevelBuilder::new().anim(clip(0, 10));
        for t in [
            ItemType::Lara,
            ItemType::BridgeFlat,
            ItemType::BridgeTilt1,
            ItemType::BridgeTilt2,
            ItemType::TrapDoor1,
            ItemType::Drawbridge,
            ItemType::TrapFloor,
        ] {
            builder = builder.model(t, 1, 0);
        }
        builder.build()
    }

    fn provider(item_type: ItemType, pos: IVec3, yaw: u16, state: u8) -> FloorProvider {
        FloorProvider {
            item_type,
            room: RoomId(0),
            pos,
            yaw,
            state,
        }
    }

    #[test_case(ItemType::BridgeFlat, ANGLE_0, 100, 0 ; "flat")]
    #[test_case(ItemType::BridgeTilt1, ANGLE_0, 24, 250 ; "tilt one facing z")]
    #[test_case(ItemType::BridgeTilt2, ANGLE_0, 24, 500 ; "tilt two facing z")]
    #[test_case(ItemType::BridgeTilt1, ANGLE_180, 24, 6 ; "tilt one reversed")]
    #[test_case(ItemType::BridgeTilt1, ANGLE_90, 24, 128 ; "tilt one along z")]
    fn test_bridge_floor(item_type: ItemType, yaw: u16, x: i32, expected_rise: i32) {
        let bridge = provider(item_type, IVec3::new(512, -1024, 512), yaw, 0);
        assert_eq!(bridge.bridge_floor(x, 512), -1024 + expected_rise);
    }

    #[test_case(0, 0, ANGLE_0, true ; "own cell")]
    #[test_case(0, -1024, ANGLE_0, true ; "folded cell")]
    #[test_case(0, -1024, ANGLE_90, false ; "folded the other way")]
    #[test_case(1024, 0, ANGLE_NEG_90, true ; "folded left")]
    #[test_case(2048, 0, ANGLE_NEG_90, false ; "too far")]
    fn test_trap_door_cells(dx: i32, dz: i32, yaw: u16, covered: bool) {
        let door = provider(ItemType::TrapDoor1, IVec3::new(2560, 0, 2560), yaw, 0);
        let h = door.trap_door_floor(2560 + dx, 2560 + dz);
        assert_eq!(h == 0, covered);
    }

    #[test]
    fn test_draw_bridge_cells() {
        let bridge = provider(ItemType::Drawbridge, IVec3::new(1536, 0, 1536), ANGLE_90, 1);
        assert_eq!(bridge.draw_bridge_floor(2600, 1536), 0);
        assert_eq!(bridge.draw_bridge_floor(3600, 1536), 0);
        assert_eq!(bridge.draw_bridge_floor(1536, 2600), WALL);

        let raised = FloorProvider { state: 0, ..bridge };
        let mut floor = 1024;
        raised.floor_ceiling(2600, -100, 1536, Some(&mut floor), None);
        assert_eq!(floor, 1024);
    }

    #[test]
    fn test_merge_floor_and_ceiling() {
        let bridge = provider(ItemType::BridgeFlat, IVec3::new(512, -512, 512), 0, 0);

        let (mut floor, mut ceiling) = (0, -2048);
        bridge.floor_ceiling(512, -800, 512, Some(&mut floor), Some(&mut ceiling));
        assert_eq!((floor, ceiling), (-512, -2048));

        let (mut floor, mut ceiling) = (0, -2048);
        bridge.floor_ceiling(512, -100, 512, Some(&mut floor), Some(&mut ceiling));
        assert_eq!((floor, ceiling), (0, -256));
    }

    #[test]
    fn test_open_trap_door_provides_nothing() {
        let door = provider(ItemType::TrapDoor1, IVec3::new(512, -512, 512), 0, 1);
        let mut floor = 0;
        door.floor_ceiling(512, -800, 512, Some(&mut floor), None);
        assert_eq!(floor, 0);
    }

    #[test]
    fn test_trap_floor_surface() {
        let trap = provider(ItemType::TrapFloor, IVec3::new(512, 0, 512), 0, 0);
        let mut floor = 1024;
        trap.floor_ceiling(100, -900, 100, Some(&mut floor), None);
        assert_eq!(floor, -512);
    }

    #[test]
    fn test_item_floors_decorator() {
        let level = level();
        let grid = SectorGrid::flat(4, 4, 0, -4096);
        let bridge = Item::new(
            &level,
            ItemType::BridgeFlat,
            RoomId(0),
            IVec3::new(1536, -1024, 1536),
            0,
            ItemFlags::empty(),
            0,
        )
        .unwrap();
        let lara = Item::new(&level, ItemType::Lara, RoomId(0), IVec3::ZERO, 0, ItemFlags::empty(), 0).unwrap();

        let providers: Vec<_> = [&bridge, &lara].into_iter().filter_map(FloorProvider::of).collect();
        assert_eq!(providers.len(), 1);

        let floors = ItemFloors::new(&grid, providers);
        assert_eq!(floors.get_floor(RoomId(0), 1600, -1500, 1600).height, -1024);
        assert_eq!(floors.get_floor(RoomId(0), 1600, -500, 1600).height, 0);
        assert_eq!(floors.get_ceiling(RoomId(0), 1600, -500, 1600), -768);
    }

    #[test]
    fn test_update_room_caches_floor() {
        let level = level();
        let grid = SectorGrid::flat(4, 4, 256, -4096);
        let mut lara =
            Item::new(&level, ItemType::Lara, RoomId(0), IVec3::new(100, 0, 100), 0, ItemFlags::empty(), 0).unwrap();

        lara.update_room(&grid, -10);
        assert_eq!(lara.room_floor, 256);
    }

    #[test]
    fn test_get_relative_rotates() {
        let level = level();
        let mut lara =
            Item::new(&level, ItemType::Lara, RoomId(0), IVec3::new(100, 0, 100), 0, ItemFlags::empty(), 0).unwrap();
        lara.angle.y = ANGLE_180;
        assert_eq!(lara.get_relative(IVec3::new(10, 5, 20)), IVec3::new(90, 5, 80));
    }

    #[test]
    fn test_water_queries() {
        let level = level();
        let mut grid = SectorGrid::flat(2, 2, 1024, -2048);
        grid.water_level = Some(0);
        grid.sectors[0].water = true;
        let lara =
            Item::new(&level, ItemType::Lara, RoomId(0), IVec3::new(100, 500, 100), 0, ItemFlags::empty(), 0).unwrap();

        assert_eq!(lara.water_level(&grid), Some(0));
        assert_eq!(lara.water_depth(&grid), Some(1024));
    }
}
