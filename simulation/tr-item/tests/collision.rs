//! Actor movement against walls and solid items

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tr_item::collision::collide_spheres;
use tr_item::level::builder::{LevelBuilder, clip, sphere};
use tr_item::level::{Bounds, Level, Node};
use tr_item::math::IVec3;
use tr_item::room::SECTOR_SIZE;
use tr_item::{CollisionType, ItemFlags, ItemType, RoomId, SectorGrid, SimConfig, Simulation};

const WALL_Z: i32 = 3 * SECTOR_SIZE;

fn walking_level(speed: i32) -> Level {
    LevelBuilder::new()
        .anim(clip(0, 30).speed(speed << 16).bounds(Bounds::new(-100, 100, -762, 0, -100, 100)))
        .anim(clip(0, 0).bounds(Bounds::new(-512, 512, -1024, 0, -512, 512)))
        .model(ItemType::Lara, 1, 0)
        .model(ItemType::Block1, 1, 1)
        .build()
}

/// Open 8x8 room with a solid row of cells starting at `WALL_Z`
fn walled_grid() -> SectorGrid {
    let mut grid = SectorGrid::flat(8, 8, 0, -4096);
    for x in 0..8 {
        grid.set_solid(x * SECTOR_SIZE + 1, WALL_Z + 1);
    }
    grid
}

proptest! {
    #[test]
    fn prop_wall_is_never_crossed(x in 1200i32..6800, z in 2100i32..2900, speed in 20i32..150, ticks in 1u32..12) {
        let config = SimConfig::default();
        let radius = config.actor_radius;
        let mut sim = Simulation::new(walking_level(speed), walled_grid(), config);
        let lara = sim.spawn(ItemType::Lara, RoomId(0), IVec3::new(x, 0, z), 0).unwrap();
        sim.pool_mut().activate(lara.index).unwrap();

        for _ in 0..ticks {
            sim.tick().unwrap();
            let pos = sim.pool().get(lara).unwrap().pos;
            prop_assert!(pos.z + radius < WALL_Z, "actor at {} overlaps the wall", pos);
            prop_assert_eq!(pos.x, x);
        }
    }

    #[test]
    fn prop_solid_cell_reports_floor_ceiling(dx in 0i32..1024, dz in 0i32..1024, angle in any::<u16>()) {
        let sim = Simulation::new(walking_level(0), walled_grid(), SimConfig::default());
        let pos = IVec3::new(2 * SECTOR_SIZE + dx, 0, WALL_Z + dz);

        let cinfo = sim.probe(RoomId(0), pos, angle).unwrap();
        prop_assert_eq!(cinfo.kind, CollisionType::FloorCeiling);
        prop_assert_eq!(cinfo.offset, IVec3::ZERO);
    }

    #[test]
    fn prop_joint_contact_is_mutual(
        dx in -1500i32..1500,
        dz in -1500i32..1500,
        yaw_a in any::<u16>(),
        yaw_b in any::<u16>(),
    ) {
        let node = Node { pos: IVec3::new(0, -300, 0), ..Node::default() };
        let level = LevelBuilder::new()
            .anim(clip(0, 0).bounds(Bounds::new(-400, 400, -800, 0, -400, 400)))
            .skeleton(ItemType::Lara, 0, vec![node], vec![sphere(0, -100, 0, 150), sphere(0, 0, 200, 250)])
            .skeleton(ItemType::Wolf, 0, vec![node], vec![sphere(0, -100, 0, 200), sphere(150, 0, 0, 120)])
            .build();

        let mut sim = Simulation::new(level, SectorGrid::flat(8, 8, 0, -4096), SimConfig::default());
        let a = sim.spawn(ItemType::Lara, RoomId(0), IVec3::new(4096, 0, 4096), yaw_a).unwrap();
        let b = sim.spawn(ItemType::Wolf, RoomId(0), IVec3::new(4096 + dx, 0, 4096 + dz), yaw_b).unwrap();

        let (a, b) = (sim.pool().get(a).unwrap(), sim.pool().get(b).unwrap());
        let ab = collide_spheres(sim.level(), a, b).unwrap();
        let ba = collide_spheres(sim.level(), b, a).unwrap();
        prop_assert_eq!(ab == 0, ba == 0);
    }
}

#[test]
fn test_block_holds_the_actor_back() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = SimConfig::default();
    let mut sim = Simulation::new(walking_level(60), SectorGrid::flat(8, 8, 0, -4096), config.clone());
    let lara = sim.spawn(ItemType::Lara, RoomId(0), IVec3::new(2560, 0, 2700), 0).unwrap();
    let block = sim.spawn(ItemType::Block1, RoomId(0), IVec3::new(2560, 0, 3584), 0).unwrap();
    sim.pool_mut().activate(lara.index).unwrap();

    let face = 3584 - 512 - config.actor_radius;
    for _ in 0..20 {
        sim.tick().unwrap();
        assert!(sim.pool().get(lara).unwrap().pos.z <= face);
    }

    assert_eq!(sim.pool().get(lara).unwrap().pos, IVec3::new(2560, 0, face));
    assert_eq!(sim.pool().get(block).unwrap().pos, IVec3::new(2560, 0, 3584));
}

#[test]
fn test_items_without_collision_are_ignored() {
    let mut sim = Simulation::new(walking_level(60), SectorGrid::flat(8, 8, 0, -4096), SimConfig::default());
    let lara = sim.spawn(ItemType::Lara, RoomId(0), IVec3::new(2560, 0, 2700), 0).unwrap();
    let block = sim.spawn(ItemType::Block1, RoomId(0), IVec3::new(2560, 0, 3584), 0).unwrap();
    sim.pool_mut().get_mut(block).unwrap().flags.remove(ItemFlags::COLLISION);
    sim.pool_mut().activate(lara.index).unwrap();

    sim.run(10).unwrap();
    assert_eq!(sim.pool().get(lara).unwrap().pos.z, 2700 + 600);
}
