//! Sound cue descriptors

/// Playback parameters of one sound cue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundInfo {
    /// First sample of the cue in the sample offset table
    pub index: u16,
    /// Base volume, 0..=0x7FFF
    pub volume: u16,
    /// Play probability against a 15-bit draw, zero meaning always
    pub chance: u16,
    /// Mixer playback mode
    pub mode: u8,
    /// Number of alternative samples
    pub count: u8,
    /// Randomize pitch on each play
    pub pitch: bool,
    /// Randomize volume on each play
    pub gain: bool,
}

impl SoundInfo {
    /// Builds a descriptor from the packed on-disk flags word.
    ///
    /// Bits 0..2 hold the mode, 2..6 the sample count, bit 12 the pitch flag
    /// and bit 13 the gain flag.
    pub fn from_packed(index: u16, volume: u16, chance: u16, flags: u16) -> Self {
        Self {
            index,
            volume,
            chance,
            mode: (flags & 0x3) as u8,
            count: ((flags >> 2) & 0xF) as u8,
            pitch: flags & (1 << 12) != 0,
            gain: flags & (1 << 13) != 0,
        }
    }
}
