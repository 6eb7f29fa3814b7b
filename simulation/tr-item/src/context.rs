//! Collaborators shared by every item during one tick

use glam::IVec3;

use crate::audio::{AudioSink, Listener, Voice, sound_play};
use crate::config::SimConfig;
use crate::fx::FxRequest;
use crate::level::Level;
use crate::random::RandomDraw;
use crate::room::RoomGeometry;

/// Borrowed view of the world an item steps in.
///
/// Level tables and geometry are read-only. Audio, the random stream and
/// the effect queue are the only outputs besides item state.
pub struct TickContext<'a> {
    pub level: &'a Level,
    pub geometry: &'a dyn RoomGeometry,
    pub audio: &'a mut dyn AudioSink,
    pub rng: &'a mut RandomDraw,
    pub config: &'a SimConfig,
    pub listener: Listener,
    /// Spawn requests raised by effects, drained by the pool after each item
    pub fx: Vec<FxRequest>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        level: &'a Level,
        geometry: &'a dyn RoomGeometry,
        audio: &'a mut dyn AudioSink,
        rng: &'a mut RandomDraw,
        config: &'a SimConfig,
    ) -> Self {
        Self {
            level,
            geometry,
            audio,
            rng,
            config,
            listener: Listener {
                pos: IVec3::ZERO,
                max_distance: config.max_sound_distance,
            },
            fx: Vec::new(),
        }
    }

    /// Plays a positional sound heard from the current listener
    pub fn sound_play(&mut self, id: i16, pos: IVec3) -> Option<Voice> {
        sound_play(self.level, &mut *self.audio, self.rng, &self.listener, id, pos)
    }
}
