//! Positional sound cues and music tracks
//!
//! Mixing and playback belong to an [`AudioSink`]. This module decides
//! whether a cue is heard at all and with which sample, volume and pitch.

use glam::IVec3;

use crate::level::Level;
use crate::math::sqrt;
use crate::random::RandomDraw;

/// Largest volume before scaling to the mixer range
const VOLUME_MAX: i32 = 0x7FFF;
/// Mixer volume shift
const VOLUME_SHIFT: u32 = 9;
/// Neutral pitch
pub const PITCH_DEFAULT: i32 = 128;
/// Track number that restarts music selection
const TRACK_RESET: i32 = 13;

/// A sample chosen for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    /// Sample index in the level's sample table
    pub sample: usize,
    /// Mixer volume, 1..=64
    pub volume: i32,
    /// Playback pitch, 128 being the recorded rate
    pub pitch: i32,
    pub mode: u8,
}

/// Audio backend
pub trait AudioSink {
    fn play_sample(&mut self, voice: &Voice, data: &[u8]);
    fn stop_sample(&mut self, sample: usize);
    fn play_music(&mut self, track: i32);
    fn stop_music(&mut self);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sample(&mut self, _voice: &Voice, _data: &[u8]) {}
    fn stop_sample(&mut self, _sample: usize) {}
    fn play_music(&mut self, _track: i32) {}
    fn stop_music(&mut self) {}
}

/// Recorded audio request
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AudioEvent {
    Play { sample: usize, volume: i32, pitch: i32, bytes: usize },
    Stop { sample: usize },
    Music { track: i32 },
    MusicStop,
}

/// Sink that records requests, for tests and tools
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub events: Vec<AudioEvent>,
}

impl AudioSink for RecordingAudio {
    fn play_sample(&mut self, voice: &Voice, data: &[u8]) {
        self.events.push(AudioEvent::Play {
            sample: voice.sample,
            volume: voice.volume,
            pitch: voice.pitch,
            bytes: data.len(),
        });
    }

    fn stop_sample(&mut self, sample: usize) {
        self.events.push(AudioEvent::Stop { sample });
    }

    fn play_music(&mut self, track: i32) {
        self.events.push(AudioEvent::Music { track });
    }

    fn stop_music(&mut self) {
        self.events.push(AudioEvent::MusicStop);
    }
}

/// Point sounds are heard from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub pos: IVec3,
    /// Per-axis distance at which sounds are culled
    pub max_distance: i32,
}

/// Plays sound `id` emitted at `pos`.
///
/// Returns the voice handed to the sink, or `None` when the id is unmapped,
/// the chance roll fails, the emitter is out of range on any axis or the
/// attenuated volume drops to zero.
pub fn sound_play(
    level: &Level,
    sink: &mut dyn AudioSink,
    rng: &mut RandomDraw,
    listener: &Listener,
    id: i16,
    pos: IVec3,
) -> Option<Voice> {
    let info = level.sound_info(id)?;

    if info.chance != 0 && i32::from(info.chance) < rng.draw() {
        return None;
    }

    let d = pos - listener.pos;
    let max = listener.max_distance;
    if d.x.abs() >= max || d.y.abs() >= max || d.z.abs() >= max {
        return None;
    }

    let dist = sqrt(d.as_i64vec3().length_squared());
    let mut volume = i32::from(info.volume) - (dist << 2);

    if info.gain {
        volume -= rng.draw() >> 2;
    }

    volume = volume.min(VOLUME_MAX) >> VOLUME_SHIFT;
    if volume <= 0 {
        return None;
    }
    volume += 1;

    let mut pitch = PITCH_DEFAULT;
    if info.pitch {
        pitch += ((rng.draw() * 13) >> 14) - 13;
    }

    let mut sample = usize::from(info.index);
    if info.count > 1 {
        sample += ((rng.draw() * i32::from(info.count)) >> 15) as usize;
    }

    let data = level.sample(sample)?;
    let voice = Voice {
        sample,
        volume,
        pitch,
        mode: info.mode,
    };

    log::trace!("Sound {id} -> sample {sample} vol {volume} pitch {pitch}");
    sink.play_sample(&voice, data);
    Some(voice)
}

/// Stops every sample variant of sound `id`
pub fn sound_stop(level: &Level, sink: &mut dyn AudioSink, id: i16) {
    let Some(info) = level.sound_info(id) else {
        return;
    };

    for i in 0..usize::from(info.count) {
        sink.stop_sample(usize::from(info.index) + i);
    }
}

/// Current music selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MusicState {
    pub current_track: i32,
}

impl MusicState {
    /// Starts `track` unless it is already playing
    pub fn play(&mut self, sink: &mut dyn AudioSink, track: i32) {
        if track == TRACK_RESET {
            self.current_track = 0;
        }

        if track == self.current_track {
            return;
        }

        self.current_track = track;
        log::debug!("Music track {track}");
        sink.play_music(track);
    }

    pub fn stop(&mut self, sink: &mut dyn AudioSink) {
        sink.stop_music();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::SoundInfo;
    use crate::level::builder::LevelBuilder;
    use pretty_assertions::assert_eq;

    fn level(info: SoundInfo) -> Level {
        LevelBuilder::new()
            .sound(5, info)
            .sample(&[0; 16])
            .sample(&[0; 32])
            .build()
    }

    fn listener() -> Listener {
        Listener {
            pos: IVec3::ZERO,
            max_distance: 8 * 1024,
        }
    }

    fn loud() -> SoundInfo {
        SoundInfo {
            volume: 0x7FFF,
            count: 1,
            ..SoundInfo::default()
        }
    }

    #[test]
    fn test_full_volume_at_listener() {
        let level = level(loud());
        let mut sink = RecordingAudio::default();
        let voice = sound_play(&level, &mut sink, &mut RandomDraw::default(), &listener(), 5, IVec3::ZERO).unwrap();

        assert_eq!(voice.volume, 64);
        assert_eq!(voice.pitch, PITCH_DEFAULT);
        assert_eq!(
            sink.events,
            vec![AudioEvent::Play {
                sample: 0,
                volume: 64,
                pitch: 128,
                bytes: 16
            }]
        );
    }

    #[test]
    fn test_distance_attenuation() {
        let level = level(loud());
        let mut sink = NullAudio;
        // (0x7FFF - 4 * 1000) >> 9 = 56, plus one
        let voice = sound_play(&level, &mut sink, &mut RandomDraw::default(), &listener(), 5, IVec3::new(0, 0, 1000));
        assert_eq!(voice.map(|v| v.volume), Some(57));
    }

    #[test]
    fn test_out_of_range_axis() {
        let level = level(loud());
        let voice = sound_play(
            &level,
            &mut NullAudio,
            &mut RandomDraw::default(),
            &listener(),
            5,
            IVec3::new(8 * 1024, 0, 0),
        );
        assert_eq!(voice, None);
    }

    #[test]
    fn test_unmapped_and_silent() {
        let level = level(SoundInfo::default());
        let mut rng = RandomDraw::default();
        assert_eq!(sound_play(&level, &mut NullAudio, &mut rng, &listener(), 1, IVec3::ZERO), None);
        assert_eq!(sound_play(&level, &mut NullAudio, &mut rng, &listener(), 5, IVec3::ZERO), None);
    }

    #[test]
    fn test_variant_selection_stays_in_range() {
        let level = level(SoundInfo {
            count: 2,
            pitch: true,
            ..loud()
        });
        let mut rng = RandomDraw::new(7);
        for _ in 0..50 {
            let voice = sound_play(&level, &mut NullAudio, &mut rng, &listener(), 5, IVec3::ZERO).unwrap();
            assert!(voice.sample < 2);
            assert!((PITCH_DEFAULT - 13..=PITCH_DEFAULT + 13).contains(&voice.pitch));
        }
    }

    #[test]
    fn test_sound_stop_all_variants() {
        let level = level(SoundInfo { count: 2, ..loud() });
        let mut sink = RecordingAudio::default();
        sound_stop(&level, &mut sink, 5);
        assert_eq!(
            sink.events,
            vec![AudioEvent::Stop { sample: 0 }, AudioEvent::Stop { sample: 1 }]
        );
    }

    #[test]
    fn test_music_repeat_suppressed() {
        let mut music = MusicState::default();
        let mut sink = RecordingAudio::default();

        music.play(&mut sink, 5);
        music.play(&mut sink, 5);
        music.play(&mut sink, 13);
        music.play(&mut sink, 13);
        music.stop(&mut sink);

        assert_eq!(
            sink.events,
            vec![
                AudioEvent::Music { track: 5 },
                AudioEvent::Music { track: 13 },
                AudioEvent::Music { track: 13 },
                AudioEvent::MusicStop,
            ]
        );
    }
}
