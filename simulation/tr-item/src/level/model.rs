//! Skeletal models and keyframes

use bitflags::bitflags;
use glam::IVec3;

bitflags! {
    /// Skeleton node stack operations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NodeFlags: u32 {
        /// Restore the parent transform before this node
        const POP = 0x1;
        /// Save the current transform after restoring
        const PUSH = 0x2;
    }
}

/// Skeleton node: link from the previous joint to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub flags: NodeFlags,
    /// Offset from the parent joint
    pub pos: IVec3,
}

/// Bounding sphere of one mesh in the mesh's local frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshSphere {
    pub center: IVec3,
    pub radius: i32,
}

/// Axis-aligned box in item-local space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl Bounds {
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32, min_z: i32, max_z: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub(crate) fn components(&self) -> [i32; 6] {
        [
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z,
        ]
    }

    pub(crate) fn from_components(c: [i32; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

/// Stored keyframe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimFrame {
    pub bounds: Bounds,
    /// Root offset from the item origin
    pub pos: IVec3,
    /// Packed joint rotations, root first, then one per skeleton node
    pub angles: Vec<u32>,
}

impl AnimFrame {
    /// Decoded rotation of joint `joint`; missing entries read as zero
    pub fn rotation(&self, joint: usize) -> [u16; 3] {
        self.angles.get(joint).copied().map_or([0; 3], unpack_rotation)
    }
}

/// Packs three angles at 10-bit precision
pub fn pack_rotation(rotation: [u16; 3]) -> u32 {
    let [x, y, z] = rotation.map(|a| u32::from(a >> 6));
    (x << 20) | (y << 10) | z
}

/// Splits a packed joint rotation into `(x, y, z)` angles.
///
/// Each axis uses 10 bits: x in bits 20..30, y in 10..20, z in 0..10.
pub fn unpack_rotation(packed: u32) -> [u16; 3] {
    let axis = |shift: u32| (((packed >> shift) & 0x3FF) as u16) << 6;
    [axis(20), axis(10), axis(0)]
}

/// Skeletal model of one item type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    /// Number of joints (meshes); zero for sprite-only models
    pub count: u16,
    /// First link in the level node table (`count - 1` links)
    pub node_index: u32,
    /// First mesh sphere in the level mesh table
    pub mesh_index: u32,
    /// Default clip
    pub anim_index: u16,
    /// Frames in the sprite sequence, for sprite models
    pub sprite_frames: u16,
}

impl Model {
    pub fn is_sprite(&self) -> bool {
        self.count == 0
    }
}
