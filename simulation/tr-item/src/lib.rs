//! Deterministic per-item simulation for a fixed-timestep 3D action game.
//!
//! Every game object is an [`Item`] in a fixed-capacity [`ItemPool`]. Each
//! tick the pool walks its active list and lets each item's controller step
//! it: skeletal clip playback with state transitions and command lists,
//! speed and gravity integration, terrain probes against a
//! [`RoomGeometry`], and contact with the controllable actor.
//!
//! All state-affecting math is integer or 14-bit fixed point, so two runs
//! from the same inputs and seed are bit-identical.
//!
//! # Examples
//!
//! ```
//! use tr_item::level::builder::{LevelBuilder, clip};
//! use tr_item::math::IVec3;
//! use tr_item::{ItemType, RoomId, SectorGrid, SimConfig, Simulation};
//!
//! let level = LevelBuilder::new()
//!     .anim(clip(0, 10).speed(16 << 16))
//!     .model(ItemType::Lara, 1, 0)
//!     .build();
//!
//! let mut sim = Simulation::new(level, SectorGrid::flat(4, 4, 0, -2048), SimConfig::default());
//! let lara = sim.spawn(ItemType::Lara, RoomId(0), IVec3::new(1536, 0, 1536), 0)?;
//! sim.pool_mut().activate(lara.index)?;
//! sim.run(4)?;
//!
//! assert_eq!(sim.pool().get(lara)?.pos.z, 1536 + 64);
//! # Ok::<(), tr_item::ItemError>(())
//! ```

#![forbid(unsafe_code)]

pub mod audio;
pub mod collision;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod fx;
pub mod item;
pub mod level;
pub mod math;
pub mod pool;
pub mod random;
pub mod room;
pub mod sim;
pub mod snapshot;

pub use audio::{AudioSink, NullAudio, RecordingAudio};
pub use collision::{CollisionInfo, CollisionType};
pub use config::SimConfig;
pub use context::TickContext;
pub use controller::{Controller, DrawItem, Step};
pub use error::{ItemError, Result};
pub use item::{Item, ItemFlags, ItemHandle, ItemIndex, ItemKind, ItemStatus, ItemType};
pub use level::Level;
pub use pool::ItemPool;
pub use room::{RoomGeometry, RoomId, SectorGrid};
pub use sim::Simulation;
pub use snapshot::ItemSnapshot;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
