//! Spatial partition interface
//!
//! The simulation never inspects level geometry directly. Room membership,
//! floor and ceiling heights, static obstacles and water all come through
//! [`RoomGeometry`]. [`SectorGrid`] is a small reference implementation: one
//! room split into 1024-unit sectors with optional slants, water and static
//! boxes, enough to drive tests and the command-line tool.

use glam::IVec3;

use crate::collision::CollisionInfo;

/// Height reported where there is no floor or ceiling
pub const WALL: i32 = -127 * 256;
/// Size of one floor sector
pub const SECTOR_SIZE: i32 = 1024;
pub const SECTOR_SHIFT: u32 = 10;

/// Room identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomId(pub u16);

/// Result of a floor query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorSample {
    /// Floor height, or [`WALL`] for void
    pub height: i32,
    /// Slope along x in quarter clicks per sector
    pub slant_x: i8,
    /// Slope along z in quarter clicks per sector
    pub slant_z: i8,
    /// Floor is lava
    pub lava: bool,
}

impl FloorSample {
    pub const VOID: Self = Self {
        height: WALL,
        slant_x: 0,
        slant_z: 0,
        lava: false,
    };

    pub fn flat(height: i32) -> Self {
        Self {
            height,
            ..Self::VOID
        }
    }

    pub fn is_void(&self) -> bool {
        self.height == WALL
    }
}

/// Level geometry consumed by the simulation
pub trait RoomGeometry {
    /// Room containing the point, starting the search from `room`
    fn get_room(&self, room: RoomId, x: i32, y: i32, z: i32) -> RoomId;

    /// Floor height at the point
    fn get_floor(&self, room: RoomId, x: i32, y: i32, z: i32) -> FloorSample;

    /// Ceiling height at the point, or [`WALL`] for void
    fn get_ceiling(&self, room: RoomId, x: i32, y: i32, z: i32) -> i32;

    /// Merges static obstacles around `p` into the collision probes
    fn collide_static(&self, _room: RoomId, _cinfo: &mut CollisionInfo, _p: IVec3, _height: i32) {}

    /// Water surface height at the point, if it is under water
    fn water_level(&self, _room: RoomId, _x: i32, _y: i32, _z: i32) -> Option<i32> {
        None
    }

    /// Distance from the water surface to the floor, if under water
    fn water_depth(&self, room: RoomId, x: i32, y: i32, z: i32) -> Option<i32> {
        let level = self.water_level(room, x, y, z)?;
        let floor = self.get_floor(room, x, y, z);
        (!floor.is_void()).then(|| floor.height - level)
    }
}

/// One floor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Sector {
    /// Floor height, [`WALL`] for solid cells
    pub floor: i32,
    pub ceiling: i32,
    pub slant_x: i8,
    pub slant_z: i8,
    pub lava: bool,
    /// Cell is filled with water up to the grid's water level
    pub water: bool,
}

impl Default for Sector {
    fn default() -> Self {
        Self {
            floor: 0,
            ceiling: -4 * 256 * 4,
            slant_x: 0,
            slant_z: 0,
            lava: false,
            water: false,
        }
    }
}

impl Sector {
    pub fn solid() -> Self {
        Self {
            floor: WALL,
            ceiling: WALL,
            ..Self::default()
        }
    }

    pub fn is_solid(&self) -> bool {
        self.floor == WALL
    }
}

/// Static obstacle, world space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticBox {
    pub min: IVec3,
    pub max: IVec3,
}

/// Single-room sector grid.
///
/// Cells are addressed `(x >> 10) - origin_x` and `(z >> 10) - origin_z`;
/// points outside the grid read as solid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorGrid {
    pub room: RoomId,
    /// Sector coordinates of cell (0, 0)
    pub origin_x: i32,
    pub origin_z: i32,
    pub width: u16,
    pub depth: u16,
    /// Row-major, `width` cells per row of constant z
    pub sectors: Vec<Sector>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub water_level: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub statics: Vec<StaticBox>,
}

impl SectorGrid {
    /// Flat open grid with every floor at `floor` and ceiling at `ceiling`
    pub fn flat(width: u16, depth: u16, floor: i32, ceiling: i32) -> Self {
        let sector = Sector {
            floor,
            ceiling,
            ..Sector::default()
        };
        Self {
            room: RoomId(0),
            origin_x: 0,
            origin_z: 0,
            width,
            depth,
            sectors: vec![sector; usize::from(width) * usize::from(depth)],
            water_level: None,
            statics: Vec::new(),
        }
    }

    fn cell_index(&self, x: i32, z: i32) -> Option<usize> {
        let cx = (x >> SECTOR_SHIFT) - self.origin_x;
        let cz = (z >> SECTOR_SHIFT) - self.origin_z;
        if cx < 0 || cz < 0 || cx >= i32::from(self.width) || cz >= i32::from(self.depth) {
            return None;
        }
        Some(cz as usize * usize::from(self.width) + cx as usize)
    }

    pub fn sector(&self, x: i32, z: i32) -> Option<&Sector> {
        self.sectors.get(self.cell_index(x, z)?)
    }

    pub fn sector_mut(&mut self, x: i32, z: i32) -> Option<&mut Sector> {
        let index = self.cell_index(x, z)?;
        self.sectors.get_mut(index)
    }

    /// Sets the cell containing `(x, z)` to solid
    pub fn set_solid(&mut self, x: i32, z: i32) {
        if let Some(sector) = self.sector_mut(x, z) {
            *sector = Sector::solid();
        }
    }
}

impl RoomGeometry for SectorGrid {
    fn get_room(&self, room: RoomId, _x: i32, _y: i32, _z: i32) -> RoomId {
        room
    }

    fn get_floor(&self, _room: RoomId, x: i32, _y: i32, z: i32) -> FloorSample {
        let Some(sector) = self.sector(x, z).filter(|s| !s.is_solid()) else {
            return FloorSample::VOID;
        };

        let dx = x & (SECTOR_SIZE - 1);
        let dz = z & (SECTOR_SIZE - 1);
        let (sx, sz) = (i32::from(sector.slant_x), i32::from(sector.slant_z));

        let mut height = sector.floor;
        height += if sx > 0 { (sx * (SECTOR_SIZE - dx)) >> 2 } else { -((sx * dx) >> 2) };
        height += if sz > 0 { (sz * (SECTOR_SIZE - dz)) >> 2 } else { -((sz * dz) >> 2) };

        FloorSample {
            height,
            slant_x: sector.slant_x,
            slant_z: sector.slant_z,
            lava: sector.lava,
        }
    }

    fn get_ceiling(&self, _room: RoomId, x: i32, _y: i32, z: i32) -> i32 {
        self.sector(x, z)
            .filter(|s| !s.is_solid())
            .map_or(WALL, |s| s.ceiling)
    }

    fn collide_static(&self, _room: RoomId, cinfo: &mut CollisionInfo, p: IVec3, height: i32) {
        let r = cinfo.radius;
        let hit = self.statics.iter().any(|b| {
            p.x + r > b.min.x
                && p.x - r < b.max.x
                && p.z + r > b.min.z
                && p.z - r < b.max.z
                && p.y > b.min.y
                && p.y - height < b.max.y
        });

        if hit {
            cinfo.static_hit = true;
            cinfo.f.floor = -WALL;
        }
    }

    fn water_level(&self, _room: RoomId, x: i32, _y: i32, z: i32) -> Option<i32> {
        let level = self.water_level?;
        self.sector(x, z).filter(|s| s.water).map(|_| level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_flat_grid() {
        let grid = SectorGrid::flat(4, 4, 0, -2048);
        let room = grid.room;

        assert_eq!(grid.get_floor(room, 1500, 0, 1500), FloorSample::flat(0));
        assert_eq!(grid.get_ceiling(room, 1500, 0, 1500), -2048);
        assert!(grid.get_floor(room, 5000, 0, 100).is_void());
        assert!(grid.get_floor(room, -1, 0, 100).is_void());
        assert_eq!(grid.get_ceiling(room, 100, 0, -1), WALL);
    }

    #[test]
    fn test_solid_cell() {
        let mut grid = SectorGrid::flat(4, 4, 0, -2048);
        grid.set_solid(2048, 0);
        assert!(grid.get_floor(grid.room, 2100, 0, 10).is_void());
        assert!(!grid.get_floor(grid.room, 1000, 0, 10).is_void());
    }

    #[test_case(4, 0, 1024 ; "positive slant at cell start")]
    #[test_case(4, 512, 512 ; "positive slant at cell middle")]
    #[test_case(-4, 0, 0 ; "negative slant at cell start")]
    #[test_case(-4, 512, 512 ; "negative slant at cell middle")]
    fn test_slanted_floor(slant: i8, dx: i32, expected: i32) {
        let mut grid = SectorGrid::flat(2, 2, 0, -2048);
        grid.sectors[0].slant_x = slant;
        assert_eq!(grid.get_floor(grid.room, dx, 0, 0).height, expected);
    }

    #[test]
    fn test_water_depth() {
        let mut grid = SectorGrid::flat(2, 2, 1024, -2048);
        grid.water_level = Some(256);
        grid.sectors[0].water = true;

        assert_eq!(grid.water_level(grid.room, 10, 0, 10), Some(256));
        assert_eq!(grid.water_depth(grid.room, 10, 0, 10), Some(768));
        assert_eq!(grid.water_level(grid.room, 1500, 0, 10), None);
    }
}
