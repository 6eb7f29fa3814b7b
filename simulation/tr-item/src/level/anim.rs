//! Animation clip tables and the command stream decoder

/// One animation clip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anim {
    /// First absolute frame of the clip
    pub frame_begin: u16,
    /// Last absolute frame of the clip (inclusive)
    pub frame_end: u16,
    /// Frames between stored keyframes
    pub frame_rate: u8,
    /// Logical state the clip belongs to
    pub state: u8,
    /// Horizontal speed at the first frame (16.16)
    pub speed: i32,
    /// Horizontal speed change per frame (16.16)
    pub accel: i32,
    /// Clip played after the last frame
    pub next_anim: u16,
    /// Absolute frame entered in `next_anim`
    pub next_frame: u16,
    /// First entry of this clip's state table
    pub states_start: u16,
    pub states_count: u16,
    /// First command of this clip's command list
    pub commands_start: u16,
    pub commands_count: u16,
    /// Index of keyframe 0 in the level keyframe table
    pub frames_start: u32,
}

impl Anim {
    /// Frame rate with zero treated as one
    pub fn rate(&self) -> i32 {
        i32::from(self.frame_rate.max(1))
    }

    /// Number of frames in the clip
    pub fn len(&self) -> i32 {
        i32::from(self.frame_end) - i32::from(self.frame_begin) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.frame_end < self.frame_begin
    }

    /// Whether `frame` lies within the clip
    pub fn contains(&self, frame: u16) -> bool {
        (self.frame_begin..=self.frame_end).contains(&frame)
    }
}

/// Transition table entry: a goal state reachable from a clip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimState {
    pub state: u8,
    pub ranges_start: u16,
    pub ranges_count: u16,
}

/// Frame window during which a transition may fire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimRange {
    pub frame_begin: u16,
    pub frame_end: u16,
    pub next_anim: u16,
    pub next_frame: u16,
}

impl AnimRange {
    pub fn contains(&self, frame: u16) -> bool {
        (self.frame_begin..=self.frame_end).contains(&frame)
    }
}

/// Raw command tags in the command stream
pub mod cmd {
    pub const NONE: i16 = 0;
    pub const OFFSET: i16 = 1;
    pub const JUMP: i16 = 2;
    pub const EMPTY: i16 = 3;
    pub const KILL: i16 = 4;
    pub const SOUND: i16 = 5;
    pub const EFFECT: i16 = 6;
}

/// Effect codes carried by effect commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxCode {
    /// Turn the item around
    Rotate180,
    /// Camera shake, handled outside the simulation
    FloorShake,
    /// Return the actor to its standing clip
    LaraNormal,
    /// Spawn breath bubbles at the actor's head
    LaraBubbles,
    /// Free the actor's hands
    LaraHandsFree,
    /// Any code without simulation behavior
    Other(i16),
}

impl FxCode {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            0 => Self::Rotate180,
            1 => Self::FloorShake,
            2 => Self::LaraNormal,
            3 => Self::LaraBubbles,
            12 => Self::LaraHandsFree,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> i16 {
        match self {
            Self::Rotate180 => 0,
            Self::FloorShake => 1,
            Self::LaraNormal => 2,
            Self::LaraBubbles => 3,
            Self::LaraHandsFree => 12,
            Self::Other(raw) => raw,
        }
    }
}

/// Decoded animation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimCommand {
    /// No operation
    None,
    /// Local position offset applied at clip end
    Offset { x: i16, y: i16, z: i16 },
    /// Launch into the air at clip end
    Jump { v_speed: i16, h_speed: i16 },
    /// Actor's hands become free at clip end
    Empty,
    /// Item becomes inactive at clip end
    Kill,
    /// Sound cue on a specific frame
    Sound { frame: i16, id: i16 },
    /// Effect on a specific frame
    Effect { frame: i16, fx: FxCode },
}

impl AnimCommand {
    /// Commands executed when the clip rolls over
    pub fn is_rollover(&self) -> bool {
        matches!(
            self,
            Self::Offset { .. } | Self::Jump { .. } | Self::Empty | Self::Kill
        )
    }

    /// Appends the command to a raw command stream
    pub fn encode(&self, out: &mut Vec<i16>) {
        match *self {
            Self::None => out.push(cmd::NONE),
            Self::Offset { x, y, z } => out.extend([cmd::OFFSET, x, y, z]),
            Self::Jump { v_speed, h_speed } => out.extend([cmd::JUMP, v_speed, h_speed]),
            Self::Empty => out.push(cmd::EMPTY),
            Self::Kill => out.push(cmd::KILL),
            Self::Sound { frame, id } => out.extend([cmd::SOUND, frame, id]),
            Self::Effect { frame, fx } => out.extend([cmd::EFFECT, frame, fx.raw()]),
        }
    }
}

/// Iterator over the commands of one clip.
///
/// The stream is a flat `i16` table where each tag is followed by its
/// arguments. A truncated stream ends iteration early; unknown tags are
/// decoded as [`AnimCommand::None`] without arguments.
#[derive(Debug, Clone)]
pub struct CommandIter<'a> {
    stream: &'a [i16],
    remaining: u16,
}

impl<'a> CommandIter<'a> {
    pub fn new(stream: &'a [i16], count: u16) -> Self {
        Self {
            stream,
            remaining: count,
        }
    }

    fn take<const N: usize>(&mut self) -> Option<[i16; N]> {
        let (head, tail) = self.stream.split_first_chunk::<N>()?;
        self.stream = tail;
        Some(*head)
    }
}

impl Iterator for CommandIter<'_> {
    type Item = AnimCommand;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let [tag] = self.take::<1>()?;
        let command = match tag {
            cmd::OFFSET => {
                let [x, y, z] = self.take::<3>()?;
                AnimCommand::Offset { x, y, z }
            }
            cmd::JUMP => {
                let [v_speed, h_speed] = self.take::<2>()?;
                AnimCommand::Jump { v_speed, h_speed }
            }
            cmd::EMPTY => AnimCommand::Empty,
            cmd::KILL => AnimCommand::Kill,
            cmd::SOUND => {
                let [frame, id] = self.take::<2>()?;
                AnimCommand::Sound { frame, id }
            }
            cmd::EFFECT => {
                let [frame, fx] = self.take::<2>()?;
                AnimCommand::Effect {
                    frame,
                    fx: FxCode::from_raw(fx),
                }
            }
            cmd::NONE => AnimCommand::None,
            other => {
                log::trace!("Unknown animation command tag {other}");
                AnimCommand::None
            }
        };

        Some(command)
    }
}
