//! Owner of a running simulation
//!
//! [`Simulation`] ties the level tables, the geometry, an audio backend,
//! the random stream and the item pool together and builds the
//! [`TickContext`] for each step.

use glam::IVec3;

use crate::audio::{AudioSink, MusicState, NullAudio, Voice};
use crate::collision::CollisionInfo;
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::controller::DrawItem;
use crate::error::Result;
use crate::item::floor::ItemFloors;
use crate::item::{Item, ItemFlags, ItemHandle, ItemIndex, ItemType};
use crate::level::Level;
use crate::pool::ItemPool;
use crate::random::RandomDraw;
use crate::room::{RoomGeometry, RoomId};
use crate::snapshot::ItemSnapshot;

/// A level being simulated
#[derive(Debug)]
pub struct Simulation<G, A = NullAudio> {
    level: Level,
    geometry: G,
    audio: A,
    rng: RandomDraw,
    config: SimConfig,
    pool: ItemPool,
    music: MusicState,
    ticks: u64,
}

impl<G: RoomGeometry> Simulation<G> {
    /// Silent simulation
    pub fn new(level: Level, geometry: G, config: SimConfig) -> Self {
        Self::with_audio(level, geometry, NullAudio, config)
    }
}

impl<G: RoomGeometry, A: AudioSink> Simulation<G, A> {
    pub fn with_audio(level: Level, geometry: G, audio: A, config: SimConfig) -> Self {
        Self {
            rng: RandomDraw::new(config.rand_seed),
            pool: ItemPool::with_config(&config),
            level,
            geometry,
            audio,
            config,
            music: MusicState::default(),
            ticks: 0,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn pool(&self) -> &ItemPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ItemPool {
        &mut self.pool
    }

    /// Steps taken so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rng(&self) -> &RandomDraw {
        &self.rng
    }

    pub fn spawn(&mut self, item_type: ItemType, room: RoomId, pos: IVec3, angle_y: u16) -> Result<ItemHandle> {
        self.pool.spawn(&self.level, item_type, room, pos, angle_y)
    }

    pub fn spawn_with(
        &mut self,
        item_type: ItemType,
        room: RoomId,
        pos: IVec3,
        angle_y: u16,
        flags: ItemFlags,
        mask: u8,
    ) -> Result<ItemHandle> {
        self.pool.spawn_with(&self.level, item_type, room, pos, angle_y, flags, mask)
    }

    /// Runs `f` with the pool and a context over item-aware geometry.
    ///
    /// Sounds are heard from the actor when one is spawned.
    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut ItemPool, &mut TickContext<'_>) -> R) -> R {
        let floors = ItemFloors::new(&self.geometry, self.pool.floor_providers());
        let mut ctx = TickContext::new(&self.level, &floors, &mut self.audio, &mut self.rng, &self.config);

        if let Some(actor) = self.pool.lara().and_then(|h| self.pool.get(h).ok()) {
            ctx.listener.pos = actor.pos;
        }

        f(&mut self.pool, &mut ctx)
    }

    /// Advances every active item by one step
    pub fn tick(&mut self) -> Result<()> {
        self.with_context(|pool, ctx| pool.tick(ctx))?;
        self.ticks += 1;
        Ok(())
    }

    pub fn run(&mut self, ticks: u32) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Fast-forwards one item through a state change; see [`Item::anim_skip`]
    pub fn anim_skip(&mut self, index: ItemIndex, before: u8, after: u8, advance: bool) -> Result<()> {
        self.with_context(|pool, ctx| pool.item_mut(index)?.anim_skip(ctx, before, after, advance))
    }

    pub fn hit(&mut self, index: ItemIndex, damage: i16, point: IVec3) -> Result<()> {
        self.with_context(|pool, ctx| pool.hit(index, damage, point, ctx))
    }

    /// Classifies an actor standing at `pos` and heading along `angle`,
    /// as if it had just arrived from the same point.
    pub fn probe(&self, room: RoomId, pos: IVec3, angle: u16) -> Result<CollisionInfo> {
        let actor = Item::new(&self.level, ItemType::Lara, room, pos, angle, ItemFlags::empty(), 0)?;
        let floors = ItemFloors::new(&self.geometry, self.pool.floor_providers());

        let mut cinfo = CollisionInfo::new(&self.config);
        cinfo.pos = pos;
        cinfo.set_angle(angle);
        actor.collide_room(&mut cinfo, &floors, self.config.actor_height, 0);

        Ok(cinfo)
    }

    pub fn sound_play(&mut self, id: i16, pos: IVec3) -> Option<Voice> {
        self.with_context(|_, ctx| ctx.sound_play(id, pos))
    }

    pub fn music_play(&mut self, track: i32) {
        self.music.play(&mut self.audio, track);
    }

    pub fn music_stop(&mut self) {
        self.music.stop(&mut self.audio);
    }

    pub fn draw(&self) -> Vec<DrawItem> {
        self.pool.draw()
    }

    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.pool.snapshot()
    }

    pub fn restore(&mut self, snapshots: &[ItemSnapshot]) -> Result<()> {
        self.pool.restore(&self.level, snapshots)
    }
}
