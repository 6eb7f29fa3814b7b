//! Save-game state of items
//!
//! A snapshot keeps what a save game needs to put an item back where it
//! was: placement, clip/frame/state, speeds, the persistent flags and the
//! per-kind extension block.
//! Everything else (hit masks, timers of cosmetic effects, collision probes)
//! is rebuilt by the next step.

use glam::IVec3;

use crate::error::{ItemError, Result};
use crate::item::{Angles, Item, ItemFlags, ItemIndex, ItemKind, ItemStatus, ItemType};
use crate::level::Level;
use crate::pool::ItemPool;
use crate::room::RoomId;

/// Flags carried through a save
pub const SAVED_FLAGS: ItemFlags = ItemFlags::ACTIVE
    .union(ItemFlags::GRAVITY)
    .union(ItemFlags::COLLISION)
    .union(ItemFlags::ONCE)
    .union(ItemFlags::SAVE)
    .union(ItemFlags::REVERSE)
    .union(ItemFlags::SHADOW)
    .union(ItemFlags::ANIMATED);

/// Persistent state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSnapshot {
    pub index: ItemIndex,
    pub item_type: ItemType,
    pub room: RoomId,
    pub pos: IVec3,
    pub angle: Angles,
    pub anim_index: u16,
    pub frame_index: u16,
    pub state: u8,
    pub goal_state: u8,
    pub next_state: u8,
    pub h_speed: i32,
    pub v_speed: i32,
    pub flags: ItemFlags,
    pub status: ItemStatus,
    pub mask: u8,
    pub health: i16,
    pub timer: i16,
    /// Extension block, e.g. the actor's move angle and weapon state
    pub kind: ItemKind,
}

impl Item {
    pub fn snapshot(&self, index: ItemIndex) -> ItemSnapshot {
        ItemSnapshot {
            index,
            item_type: self.item_type,
            room: self.room,
            pos: self.pos,
            angle: self.angle,
            anim_index: self.anim_index,
            frame_index: self.frame_index,
            state: self.state,
            goal_state: self.goal_state,
            next_state: self.next_state,
            h_speed: self.h_speed,
            v_speed: self.v_speed,
            flags: self.flags & SAVED_FLAGS,
            status: self.status,
            mask: self.mask,
            health: self.health,
            timer: self.timer,
            kind: self.kind,
        }
    }

    /// Writes saved state back, leaving list membership to the caller.
    ///
    /// The clip must exist in `level`; nothing changes otherwise.
    pub fn restore(&mut self, level: &Level, snapshot: &ItemSnapshot) -> Result<()> {
        level.anim(snapshot.anim_index)?;

        self.room = snapshot.room;
        self.pos = snapshot.pos;
        self.angle = snapshot.angle;
        self.anim_index = snapshot.anim_index;
        self.frame_index = snapshot.frame_index;
        self.state = snapshot.state;
        self.goal_state = snapshot.goal_state;
        self.next_state = snapshot.next_state;
        self.h_speed = snapshot.h_speed;
        self.v_speed = snapshot.v_speed;
        self.flags = (self.flags & ItemFlags::ACTIVE) | (snapshot.flags & SAVED_FLAGS & !ItemFlags::ACTIVE);
        self.status = snapshot.status;
        self.mask = snapshot.mask;
        self.health = snapshot.health;
        self.timer = snapshot.timer;
        self.kind = snapshot.kind;
        self.hit_mask = 0;

        Ok(())
    }
}

impl ItemPool {
    /// Snapshots of every item flagged for saving, in slot order
    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.iter()
            .filter(|(_, item)| item.flags.contains(ItemFlags::SAVE))
            .map(|(index, item)| item.snapshot(index))
            .collect()
    }

    /// Restores snapshots into the live items they were taken from.
    ///
    /// Each snapshot must name a spawned item of the same type. Items are
    /// moved on or off the active list to match the saved flag.
    pub fn restore(&mut self, level: &Level, snapshots: &[ItemSnapshot]) -> Result<()> {
        for snapshot in snapshots {
            let item = self.item_mut(snapshot.index)?;
            if item.item_type != snapshot.item_type {
                return Err(ItemError::InvalidIndex(snapshot.index));
            }
            item.restore(level, snapshot)?;

            let was_active = item.is_active();
            let active = snapshot.flags.contains(ItemFlags::ACTIVE);
            match (was_active, active) {
                (false, true) => self.activate(snapshot.index)?,
                (true, false) => self.deactivate(snapshot.index)?,
                _ => {}
            }
        }

        log::debug!("Restored {} items", snapshots.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::builder::{LevelBuilder, clip};
    use pretty_assertions::assert_eq;

    fn level() -> Level {
        LevelBuilder::new()
            .anim(clip(0, 10).state(1))
            .anim(clip(11, 20).state(2))
            .model(ItemType::Wolf, 1, 0)
            .model(ItemType::Door1, 1, 0)
            .build()
    }

    #[test]
    fn test_restore_puts_item_back() {
        let level = level();
        let mut pool = ItemPool::new(4);
        let wolf = pool.spawn(&level, ItemType::Wolf, RoomId(0), IVec3::new(10, 20, 30), 0x1000).unwrap();
        pool.activate(wolf.index).unwrap();
        let saved = pool.snapshot();

        let item = pool.get_mut(wolf).unwrap();
        item.pos = IVec3::new(999, 0, 999);
        item.anim_set(&level, 1, true, 3).unwrap();
        item.health = 5;
        item.hit_mask = 0xF;
        pool.deactivate(wolf.index).unwrap();

        pool.restore(&level, &saved).unwrap();

        let item = pool.get(wolf).unwrap();
        assert_eq!(item.pos, IVec3::new(10, 20, 30));
        assert_eq!(item.anim_index, 0);
        assert_eq!(item.state, 1);
        assert_eq!(item.hit_mask, 0);
        assert_eq!(item.snapshot(wolf.index), saved[0]);
        assert_eq!(pool.active().collect::<Vec<_>>(), vec![wolf.index]);
    }

    #[test]
    fn test_unsaved_items_are_skipped() {
        let level = level();
        let mut pool = ItemPool::new(4);
        let door = pool.spawn(&level, ItemType::Door1, RoomId(0), IVec3::ZERO, 0).unwrap();
        pool.spawn(&level, ItemType::Wolf, RoomId(0), IVec3::ZERO, 0).unwrap();
        pool.get_mut(door).unwrap().flags.remove(ItemFlags::SAVE);

        let saved = pool.snapshot();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].item_type, ItemType::Wolf);
    }

    #[test]
    fn test_restore_rejects_other_type() {
        let level = level();
        let mut pool = ItemPool::new(4);
        let wolf = pool.spawn(&level, ItemType::Wolf, RoomId(0), IVec3::ZERO, 0).unwrap();
        let mut saved = pool.get(wolf).unwrap().snapshot(wolf.index);
        saved.item_type = ItemType::Door1;

        assert_eq!(pool.restore(&level, &[saved]), Err(ItemError::InvalidIndex(wolf.index)));
    }

    #[test]
    fn test_restore_rejects_unknown_clip() {
        let level = level();
        let mut pool = ItemPool::new(4);
        let wolf = pool.spawn(&level, ItemType::Wolf, RoomId(0), IVec3::new(1, 2, 3), 0).unwrap();
        let mut saved = pool.get(wolf).unwrap().snapshot(wolf.index);
        saved.anim_index = 40;
        saved.pos = IVec3::ZERO;

        assert_eq!(pool.restore(&level, &[saved]), Err(ItemError::InvalidAnim(40)));
        assert_eq!(pool.get(wolf).unwrap().pos, IVec3::new(1, 2, 3));
    }
}
