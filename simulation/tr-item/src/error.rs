use thiserror::Error;

use crate::item::{ItemIndex, ItemType};

/// Error types for item simulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Every pool slot is in use
    #[error("Item pool exhausted: all {capacity} slots are in use")]
    PoolExhausted { capacity: usize },

    /// Activation requested for an item that is already on the active list
    #[error("Item {0} is already active")]
    AlreadyActive(ItemIndex),

    /// A handle refers to a slot that has since been freed or reused
    #[error("Stale item handle")]
    StaleHandle,

    /// Index does not name a spawned item
    #[error("Invalid item index: {0}")]
    InvalidIndex(ItemIndex),

    /// Joint query past the end of the skeleton
    #[error("Joint {joint} out of range for a skeleton with {count} joints")]
    JointOutOfRange { joint: usize, count: usize },

    /// Actor-only operation requested on another item type
    #[error("Operation requires the controllable actor, got {0:?}")]
    NotActor(ItemType),

    /// Raw type tag with no item type
    #[error("Unknown item type tag: {0}")]
    UnknownItemType(u16),

    /// Item type has no model in the level tables
    #[error("No model loaded for {0:?}")]
    MissingModel(ItemType),

    /// Clip index outside the level's clip table
    #[error("Invalid animation index: {0}")]
    InvalidAnim(u16),

    /// Skeleton nesting deeper than the transform stack
    #[error("Matrix stack overflow")]
    MatrixStackOverflow,

    /// Skeleton node popped more transforms than were pushed
    #[error("Matrix stack underflow")]
    MatrixStackUnderflow,

    /// Skip-ahead never reached the requested state
    #[error("Skip-ahead did not reach state {state} within {steps} steps")]
    SkipStalled { state: u8, steps: u32 },
}

/// Result type using `ItemError`
pub type Result<T> = std::result::Result<T, ItemError>;
