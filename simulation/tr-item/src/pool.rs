//! Fixed-capacity item storage
//!
//! Every item lives in a slot of an [`ItemPool`]. Free slots form a singly
//! linked free list and active items a singly linked active list, both
//! threaded through the slots themselves:
//!
//! - [`ItemPool::spawn`] pops the head of the free list
//! - [`ItemPool::activate`] pushes onto the head of the active list, so the
//!   most recently activated item steps first
//! - [`ItemPool::remove`] unlinks the item and pushes its slot back onto the
//!   free list, bumping the slot generation so outstanding
//!   [`ItemHandle`]s go stale

use glam::IVec3;

use crate::collision::CollisionInfo;
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::controller::{DrawItem, Step, controller};
use crate::error::{ItemError, Result};
use crate::item::floor::FloorProvider;
use crate::item::{Item, ItemFlags, ItemHandle, ItemIndex, ItemStatus, ItemType};
use crate::level::Level;
use crate::room::{RoomId, SECTOR_SIZE};

/// Largest pool the 16-bit slot index can address
pub const MAX_CAPACITY: usize = u16::MAX as usize;
/// Items farther than this from the actor on any axis skip contact tests
const CONTACT_RANGE: i32 = 4 * SECTOR_SIZE;

#[derive(Debug, Clone, Default)]
struct Slot {
    item: Option<Item>,
    generation: u32,
    next_free: Option<ItemIndex>,
    next_active: Option<ItemIndex>,
}

/// Pool of item slots with free and active lists
#[derive(Debug, Clone)]
pub struct ItemPool {
    slots: Vec<Slot>,
    first_free: Option<ItemIndex>,
    first_active: Option<ItemIndex>,
    lara: Option<ItemHandle>,
    /// Probe state of the actor, carried between steps
    cinfo: CollisionInfo,
}

impl ItemPool {
    /// Empty pool with `capacity` slots and default actor probes
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, &SimConfig::default())
    }

    /// Empty pool sized and configured from `config`
    pub fn with_config(config: &SimConfig) -> Self {
        Self::build(config.pool_capacity, config)
    }

    fn build(capacity: usize, config: &SimConfig) -> Self {
        let mut pool = Self {
            slots: vec![Slot::default(); capacity.min(MAX_CAPACITY)],
            first_free: None,
            first_active: None,
            lara: None,
            cinfo: CollisionInfo::new(config),
        };
        pool.link_free();
        pool
    }

    /// Drops every item and relinks all slots as free.
    ///
    /// Generations survive so handles from before the reset stay stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.item.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.next_active = None;
        }
        self.first_active = None;
        self.lara = None;
        self.link_free();
        log::debug!("Item pool cleared, {} slots free", self.slots.len());
    }

    fn link_free(&mut self) {
        let count = self.slots.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.next_free = (i + 1 < count).then(|| ItemIndex((i + 1) as u16));
        }
        self.first_free = (count > 0).then_some(ItemIndex(0));
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of spawned items
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots on the free list, in pop order
    pub fn free(&self) -> FreeIter<'_> {
        FreeIter {
            pool: self,
            next: self.first_free,
        }
    }

    /// Active items, most recently activated first
    pub fn active(&self) -> ActiveIter<'_> {
        ActiveIter {
            pool: self,
            next: self.first_active,
        }
    }

    /// Spawned items in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ItemIndex, &Item)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Some((ItemIndex(i as u16), slot.item.as_ref()?)))
    }

    /// Spawns an item with no flags and a zero activation mask
    pub fn spawn(&mut self, level: &Level, item_type: ItemType, room: RoomId, pos: IVec3, angle_y: u16) -> Result<ItemHandle> {
        self.spawn_with(level, item_type, room, pos, angle_y, ItemFlags::empty(), 0)
    }

    /// Spawns an item into the head of the free list.
    ///
    /// The item is built before any list is touched, so an exhausted pool
    /// or a missing model leaves the pool unchanged. Items whose flags ask
    /// for it go straight onto the active list.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_with(
        &mut self,
        level: &Level,
        item_type: ItemType,
        room: RoomId,
        pos: IVec3,
        angle_y: u16,
        flags: ItemFlags,
        mask: u8,
    ) -> Result<ItemHandle> {
        let Some(index) = self.first_free else {
            log::warn!("Cannot spawn {item_type}: pool of {} slots is full", self.slots.len());
            return Err(ItemError::PoolExhausted {
                capacity: self.slots.len(),
            });
        };

        let item = Item::new(level, item_type, room, pos, angle_y, flags, mask)?;
        let starts_active = item.starts_active();
        let is_lara = item.is_lara();

        let slot = self.slot_mut(index)?;
        let next_free = slot.next_free.take();
        slot.item = Some(item);
        let handle = ItemHandle {
            index,
            generation: slot.generation,
        };
        self.first_free = next_free;

        if is_lara {
            self.lara = Some(handle);
        }
        if starts_active {
            self.activate(index)?;
        }

        log::debug!("Spawned {item_type} at {pos} into slot {index}");
        Ok(handle)
    }

    /// Spawns an item and puts it on the active list
    pub fn spawn_active(&mut self, level: &Level, item_type: ItemType, room: RoomId, pos: IVec3, angle_y: u16) -> Result<ItemIndex> {
        let index = self.spawn(level, item_type, room, pos, angle_y)?.index;
        if !self.item(index)?.is_active() {
            self.activate(index)?;
        }
        Ok(index)
    }

    /// Pushes a spawned item onto the head of the active list
    pub fn activate(&mut self, index: ItemIndex) -> Result<()> {
        let head = self.first_active;
        let slot = self.slot_mut(index)?;
        let Some(item) = slot.item.as_mut() else {
            return Err(ItemError::InvalidIndex(index));
        };

        if item.is_active() {
            return Err(ItemError::AlreadyActive(index));
        }

        item.flags.insert(ItemFlags::ACTIVE);
        slot.next_active = head;
        self.first_active = Some(index);

        log::trace!("Activated {index}");
        Ok(())
    }

    /// Unlinks an item from the active list; inactive items are left alone
    pub fn deactivate(&mut self, index: ItemIndex) -> Result<()> {
        self.item(index)?;

        let mut prev: Option<ItemIndex> = None;
        let mut curr = self.first_active;

        while let Some(at) = curr {
            let next = self.slot(at)?.next_active;
            if at == index {
                match prev {
                    Some(p) => self.slot_mut(p)?.next_active = next,
                    None => self.first_active = next,
                }
                break;
            }
            prev = curr;
            curr = next;
        }

        let slot = self.slot_mut(index)?;
        slot.next_active = None;
        if let Some(item) = slot.item.as_mut() {
            item.flags.remove(ItemFlags::ACTIVE);
        }

        Ok(())
    }

    /// Deactivates an item, drops every other item's references to it and
    /// returns its slot to the free list.
    pub fn remove(&mut self, index: ItemIndex) -> Result<Item> {
        let handle = self.handle(index)?;
        self.deactivate(index)?;

        if self.lara == Some(handle) {
            self.lara = None;
        }
        for item in self.slots.iter_mut().filter_map(|slot| slot.item.as_mut()) {
            item.kind.clear_target(handle);
        }

        let head = self.first_free;
        let slot = self.slot_mut(index)?;
        let item = slot.item.take().ok_or(ItemError::InvalidIndex(index))?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = head;
        self.first_free = Some(index);

        log::debug!("Removed {} from slot {index}", item.item_type);
        Ok(item)
    }

    /// Current handle of a spawned item
    pub fn handle(&self, index: ItemIndex) -> Result<ItemHandle> {
        let slot = self.slot(index)?;
        if slot.item.is_none() {
            return Err(ItemError::InvalidIndex(index));
        }
        Ok(ItemHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Slot of a live handle
    pub fn resolve(&self, handle: ItemHandle) -> Result<ItemIndex> {
        match self.slots.get(handle.index.get()) {
            Some(slot) if slot.item.is_some() && slot.generation == handle.generation => Ok(handle.index),
            _ => Err(ItemError::StaleHandle),
        }
    }

    pub fn get(&self, handle: ItemHandle) -> Result<&Item> {
        let index = self.resolve(handle)?;
        self.item(index)
    }

    pub fn get_mut(&mut self, handle: ItemHandle) -> Result<&mut Item> {
        let index = self.resolve(handle)?;
        self.item_mut(index)
    }

    pub fn item(&self, index: ItemIndex) -> Result<&Item> {
        self.slot(index)?.item.as_ref().ok_or(ItemError::InvalidIndex(index))
    }

    pub fn item_mut(&mut self, index: ItemIndex) -> Result<&mut Item> {
        self.slot_mut(index)?.item.as_mut().ok_or(ItemError::InvalidIndex(index))
    }

    /// Two distinct items borrowed mutably at once
    pub fn pair_mut(&mut self, a: ItemIndex, b: ItemIndex) -> Result<(&mut Item, &mut Item)> {
        if a == b || a.get() >= self.slots.len() || b.get() >= self.slots.len() {
            return Err(ItemError::InvalidIndex(b));
        }

        let (first, second) = if a < b {
            let (lo, hi) = self.slots.split_at_mut(b.get());
            (&mut lo[a.get()], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(a.get());
            (&mut hi[0], &mut lo[b.get()])
        };

        match (first.item.as_mut(), second.item.as_mut()) {
            (Some(x), Some(y)) => Ok((x, y)),
            (None, _) => Err(ItemError::InvalidIndex(a)),
            (_, None) => Err(ItemError::InvalidIndex(b)),
        }
    }

    /// Handle of the controllable actor, if one is spawned
    pub fn lara(&self) -> Option<ItemHandle> {
        self.lara
    }

    /// Probe state of the actor
    pub fn collision_info(&self) -> &CollisionInfo {
        &self.cinfo
    }

    pub fn collision_info_mut(&mut self) -> &mut CollisionInfo {
        &mut self.cinfo
    }

    /// Surfaces provided by spawned items, for [`ItemFloors`](crate::item::floor::ItemFloors)
    pub fn floor_providers(&self) -> Vec<FloorProvider> {
        self.iter().filter_map(|(_, item)| FloorProvider::of(item)).collect()
    }

    /// Steps every active item once.
    ///
    /// The active list is captured up front as handles: items activated
    /// during the tick first step on the next one, and items removed or
    /// deactivated by an earlier item are skipped, even when their slot has
    /// been refilled since. Effects raised by an item spawn right after its
    /// step, and the actor runs its contact tests after its own step.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let order: Vec<ItemHandle> = self.active().filter_map(|index| self.handle(index).ok()).collect();
        self.step_all(&order, ctx)
    }

    fn step_all(&mut self, order: &[ItemHandle], ctx: &mut TickContext<'_>) -> Result<()> {
        for &handle in order {
            let Ok(index) = self.resolve(handle) else {
                continue;
            };
            if !self.item(index).is_ok_and(Item::is_active) {
                continue;
            }

            self.update(index, ctx)?;
            self.drain_fx(ctx);

            if self.lara == Some(handle) && self.resolve(handle).is_ok() {
                self.collide_actor(ctx)?;
                self.drain_fx(ctx);
            }
        }

        Ok(())
    }

    /// Runs one item's controller and applies the lifecycle it asks for
    pub fn update(&mut self, index: ItemIndex, ctx: &mut TickContext<'_>) -> Result<()> {
        let Some(slot) = self.slots.get_mut(index.get()) else {
            return Err(ItemError::InvalidIndex(index));
        };
        let Some(item) = slot.item.as_mut() else {
            return Err(ItemError::InvalidIndex(index));
        };

        let step = controller(&item.kind).update(item, &mut self.cinfo, ctx)?;

        match step {
            Step::Continue => {}
            Step::Deactivate => {
                log::debug!("{} went inactive", item.item_type);
                self.deactivate(index)?;
            }
            Step::Remove => {
                self.remove(index)?;
            }
        }

        Ok(())
    }

    /// Tests every solid item near the actor for contact
    pub fn collide_actor(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let Some(lara) = self.lara.map(|h| h.index) else {
            return Ok(());
        };
        let origin = self.item(lara)?.pos;

        let candidates: Vec<ItemIndex> = self
            .iter()
            .filter(|(index, item)| {
                let d = (item.pos - origin).abs();
                *index != lara
                    && item.flags.contains(ItemFlags::COLLISION)
                    && item.status != ItemStatus::Invisible
                    && d.max_element() < CONTACT_RANGE
            })
            .map(|(index, _)| index)
            .collect();

        let mut cinfo = self.cinfo;
        for index in candidates {
            let (item, actor) = self.pair_mut(index, lara)?;
            controller(&item.kind).collide(item, actor, &mut cinfo, ctx)?;
        }
        self.cinfo = cinfo;

        Ok(())
    }

    /// Deals damage to an item through its controller
    pub fn hit(&mut self, index: ItemIndex, damage: i16, point: IVec3, ctx: &mut TickContext<'_>) -> Result<()> {
        let item = self.item_mut(index)?;
        controller(&item.kind).hit(item, damage, point, ctx)?;
        self.drain_fx(ctx);
        Ok(())
    }

    /// Render records of every visible item, in slot order
    pub fn draw(&self) -> Vec<DrawItem> {
        self.iter()
            .filter_map(|(_, item)| controller(&item.kind).draw(item))
            .collect()
    }

    fn slot(&self, index: ItemIndex) -> Result<&Slot> {
        self.slots.get(index.get()).ok_or(ItemError::InvalidIndex(index))
    }

    fn slot_mut(&mut self, index: ItemIndex) -> Result<&mut Slot> {
        self.slots.get_mut(index.get()).ok_or(ItemError::InvalidIndex(index))
    }
}

/// Iterator over the active list
pub struct ActiveIter<'a> {
    pool: &'a ItemPool,
    next: Option<ItemIndex>,
}

impl Iterator for ActiveIter<'_> {
    type Item = ItemIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = self.pool.slots.get(index.get()).and_then(|s| s.next_active);
        Some(index)
    }
}

/// Iterator over the free list
pub struct FreeIter<'a> {
    pool: &'a ItemPool,
    next: Option<ItemIndex>,
}

impl Iterator for FreeIter<'_> {
    type Item = ItemIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = self.pool.slots.get(index.get()).and_then(|s| s.next_free);
        Some(index)
    }
}
