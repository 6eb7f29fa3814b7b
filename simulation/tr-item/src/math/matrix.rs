//! Fixed-point affine transforms for skeleton walks
//!
//! A [`Matrix`] is a 3x3 rotation in [`FIXED_ONE`] units plus a translation
//! column stored pre-shifted by [`FIXED_SHIFT`]. Operations post-multiply,
//! so each call transforms into the child's local frame.

use glam::IVec3;

use super::fixed::{FIXED_ONE, FIXED_SHIFT, cos, sin};
use crate::error::{ItemError, Result};

/// Depth of the transform stack used by skeleton walks
pub const MAX_MATRICES: usize = 16;

/// Row-major 3x4 fixed-point transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix {
    /// Rows of `[r0, r1, r2, w]`
    pub rows: [[i32; 4]; 3],
}

impl Matrix {
    /// Identity transform at the origin
    pub const IDENTITY: Self = Self {
        rows: [
            [FIXED_ONE, 0, 0, 0],
            [0, FIXED_ONE, 0, 0],
            [0, 0, FIXED_ONE, 0],
        ],
    };

    /// Translation component in world units
    pub fn position(&self) -> IVec3 {
        IVec3::new(
            self.rows[0][3] >> FIXED_SHIFT,
            self.rows[1][3] >> FIXED_SHIFT,
            self.rows[2][3] >> FIXED_SHIFT,
        )
    }

    /// Rotates a local vector without translating it
    pub fn rotate_vector(&self, v: IVec3) -> IVec3 {
        let dot = |r: &[i32; 4]| {
            ((r[0] as i64 * v.x as i64 + r[1] as i64 * v.y as i64 + r[2] as i64 * v.z as i64)
                >> FIXED_SHIFT) as i32
        };
        IVec3::new(dot(&self.rows[0]), dot(&self.rows[1]), dot(&self.rows[2]))
    }

    /// Sets the translation column to an absolute position
    pub fn set_position(&mut self, p: IVec3) {
        self.rows[0][3] = p.x << FIXED_SHIFT;
        self.rows[1][3] = p.y << FIXED_SHIFT;
        self.rows[2][3] = p.z << FIXED_SHIFT;
    }

    /// Moves the origin by a vector expressed in the local frame
    pub fn translate(&mut self, v: IVec3) {
        for r in &mut self.rows {
            let d = r[0] as i64 * v.x as i64 + r[1] as i64 * v.y as i64 + r[2] as i64 * v.z as i64;
            r[3] = (r[3] as i64 + d) as i32;
        }
    }

    pub fn rotate_x(&mut self, angle: u16) {
        if angle == 0 {
            return;
        }
        let (s, c) = (sin(angle), cos(angle));
        for r in &mut self.rows {
            let (e1, e2) = (r[1], r[2]);
            r[1] = (e1 * c + e2 * s) >> FIXED_SHIFT;
            r[2] = (e2 * c - e1 * s) >> FIXED_SHIFT;
        }
    }

    pub fn rotate_y(&mut self, angle: u16) {
        if angle == 0 {
            return;
        }
        let (s, c) = (sin(angle), cos(angle));
        for r in &mut self.rows {
            let (e0, e2) = (r[0], r[2]);
            r[0] = (e0 * c - e2 * s) >> FIXED_SHIFT;
            r[2] = (e0 * s + e2 * c) >> FIXED_SHIFT;
        }
    }

    pub fn rotate_z(&mut self, angle: u16) {
        if angle == 0 {
            return;
        }
        let (s, c) = (sin(angle), cos(angle));
        for r in &mut self.rows {
            let (e0, e1) = (r[0], r[1]);
            r[0] = (e0 * c + e1 * s) >> FIXED_SHIFT;
            r[1] = (e1 * c - e0 * s) >> FIXED_SHIFT;
        }
    }

    /// Applies yaw, then pitch, then roll
    pub fn rotate_yxz(&mut self, x: u16, y: u16, z: u16) {
        self.rotate_y(y);
        self.rotate_x(x);
        self.rotate_z(z);
    }

    /// Applies one skeleton frame: local translation followed by rotation
    pub fn apply_frame(&mut self, offset: IVec3, rotation: [u16; 3]) {
        self.translate(offset);
        self.rotate_yxz(rotation[0], rotation[1], rotation[2]);
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Fixed-depth transform stack.
///
/// `push` duplicates the top so the caller can modify a child transform and
/// `pop` back to the parent. Depth errors are reported instead of wrapping.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    frames: [Matrix; MAX_MATRICES],
    top: usize,
}

impl MatrixStack {
    /// Creates a stack holding one identity transform
    pub fn new() -> Self {
        Self {
            frames: [Matrix::IDENTITY; MAX_MATRICES],
            top: 0,
        }
    }

    /// Number of pushed transforms above the base
    pub fn depth(&self) -> usize {
        self.top
    }

    pub fn current(&self) -> &Matrix {
        &self.frames[self.top]
    }

    pub fn current_mut(&mut self) -> &mut Matrix {
        &mut self.frames[self.top]
    }

    /// Saves a copy of the current transform
    pub fn push(&mut self) -> Result<()> {
        if self.top + 1 >= MAX_MATRICES {
            return Err(ItemError::MatrixStackOverflow);
        }
        self.frames[self.top + 1] = self.frames[self.top];
        self.top += 1;
        Ok(())
    }

    /// Restores the previously saved transform
    pub fn pop(&mut self) -> Result<()> {
        if self.top == 0 {
            return Err(ItemError::MatrixStackUnderflow);
        }
        self.top -= 1;
        Ok(())
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::{ANGLE_90, ANGLE_180};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_translate_identity() {
        let mut m = Matrix::IDENTITY;
        m.translate(IVec3::new(10, -20, 30));
        assert_eq!(m.position(), IVec3::new(10, -20, 30));
    }

    #[test]
    fn test_yaw_maps_forward_onto_heading() {
        // Yaw 90 turns local +z into world +x
        let mut m = Matrix::IDENTITY;
        m.rotate_y(ANGLE_90);
        m.translate(IVec3::new(0, 0, 100));
        assert_eq!(m.position(), IVec3::new(100, 0, 0));
    }

    #[test]
    fn test_rotate_vector_half_turn() {
        let mut m = Matrix::IDENTITY;
        m.rotate_y(ANGLE_180);
        assert_eq!(m.rotate_vector(IVec3::new(5, 7, 9)), IVec3::new(-5, 7, -9));
    }

    #[test]
    fn test_stack_push_pop_restores_parent() {
        let mut stack = MatrixStack::new();
        stack.current_mut().translate(IVec3::new(1, 2, 3));
        stack.push().unwrap();
        stack.current_mut().translate(IVec3::new(100, 0, 0));
        assert_eq!(stack.current().position(), IVec3::new(101, 2, 3));
        stack.pop().unwrap();
        assert_eq!(stack.current().position(), IVec3::new(1, 2, 3));
    }

    #[test]
    fn test_stack_depth_errors() {
        let mut stack = MatrixStack::new();
        assert_eq!(stack.pop(), Err(ItemError::MatrixStackUnderflow));
        for _ in 0..MAX_MATRICES - 1 {
            stack.push().unwrap();
        }
        assert_eq!(stack.push(), Err(ItemError::MatrixStackOverflow));
        assert_eq!(stack.depth(), MAX_MATRICES - 1);
    }
}
