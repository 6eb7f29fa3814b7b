//! Integer math used by the simulation
//!
//! Everything here is deterministic: no floating point is involved in any
//! value that feeds back into item state.

pub mod fixed;
pub mod matrix;

pub use fixed::{
    ANGLE_0, ANGLE_45, ANGLE_90, ANGLE_180, FIXED_ONE, FIXED_SHIFT, angle, angle_lerp, atan2, cos,
    fixed_inv_u, sin, sqrt,
};
pub use glam::IVec3;
pub use matrix::{MAX_MATRICES, Matrix, MatrixStack};
