//! Keyframe sampling and skeleton walks

use glam::IVec3;

use super::Item;
use crate::error::{ItemError, Result};
use crate::level::{AnimFrame, Bounds, Level, NodeFlags};
use crate::math::{MatrixStack, fixed_inv_u};

/// Most joints a sphere set holds
pub const MAX_SPHERES: usize = 32;

static EMPTY_FRAME: AnimFrame = AnimFrame {
    bounds: Bounds::new(0, 0, 0, 0, 0, 0),
    pos: IVec3::ZERO,
    angles: Vec::new(),
};

/// The two keyframes around the current frame
#[derive(Debug, Clone, Copy)]
pub struct FramePair<'a> {
    pub a: &'a AnimFrame,
    pub b: &'a AnimFrame,
    /// Frames past keyframe `a`
    pub delta: i32,
    /// Frames between `a` and `b`
    pub rate: i32,
}

impl<'a> FramePair<'a> {
    /// Keyframe closest to the current frame, ties going to `a`
    pub fn nearest(&self) -> &'a AnimFrame {
        if self.delta <= self.rate >> 1 { self.a } else { self.b }
    }

    /// Box interpolated between the two keyframes
    pub fn lerp_bounds(&self) -> Bounds {
        if self.delta == 0 {
            return self.a.bounds;
        }

        let d = i64::from(fixed_inv_u(self.rate)) * i64::from(self.delta);
        let a = self.a.bounds.components();
        let b = self.b.bounds.components();

        let mut out = [0; 6];
        for i in 0..6 {
            let (ca, cb) = (i64::from(a[i]), i64::from(b[i]));
            out[i] = (ca + (((cb - ca) * d) >> 16)) as i32;
        }
        Bounds::from_components(out)
    }
}

/// World-space bounding sphere of one joint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sphere {
    pub center: IVec3,
    pub radius: i32,
}

impl Sphere {
    /// Strict overlap test; spheres with no radius never overlap
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.radius <= 0 || other.radius <= 0 {
            return false;
        }
        let d = (other.center - self.center).as_i64vec3();
        let r = i64::from(self.radius) + i64::from(other.radius);
        d.dot(d) < r * r
    }
}

/// Fixed-capacity set of joint spheres, in joint order
#[derive(Debug, Clone, Copy)]
pub struct SphereSet {
    spheres: [Sphere; MAX_SPHERES],
    count: usize,
}

impl SphereSet {
    pub fn new() -> Self {
        Self {
            spheres: [Sphere::default(); MAX_SPHERES],
            count: 0,
        }
    }

    /// Appends a sphere; returns false once the set is full
    pub fn push(&mut self, sphere: Sphere) -> bool {
        let Some(slot) = self.spheres.get_mut(self.count) else {
            return false;
        };
        *slot = sphere;
        self.count += 1;
        true
    }

    pub fn as_slice(&self) -> &[Sphere] {
        &self.spheres[..self.count]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for SphereSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Item {
    /// Keyframe pair and fraction for the current frame.
    ///
    /// Keyframe `a` is `(frame - begin) / rate`; `b` is the next one,
    /// clamped to the last stored keyframe of the clip.
    pub fn frames<'a>(&self, level: &'a Level) -> Result<FramePair<'a>> {
        let anim = level.anim(self.anim_index)?;
        let rate = anim.rate();

        let rel = (i32::from(self.frame_index) - i32::from(anim.frame_begin)).max(0);
        let last = (i32::from(anim.frame_end) - i32::from(anim.frame_begin)).max(0) / rate;

        let index_a = rel / rate;
        let delta = rel - index_a * rate;
        let index_a = index_a.min(last);
        let index_b = (index_a + 1).min(last);

        let a = level.keyframe(anim, index_a).unwrap_or(&EMPTY_FRAME);
        let b = level.keyframe(anim, index_b).unwrap_or(&EMPTY_FRAME);

        Ok(FramePair { a, b, delta, rate })
    }

    /// Nearest keyframe to the current frame
    pub fn frame<'a>(&self, level: &'a Level) -> Result<&'a AnimFrame> {
        Ok(self.frames(level)?.nearest())
    }

    /// Local bounding box of the current pose.
    ///
    /// Sprite items have an empty box.
    pub fn bounding_box(&self, level: &Level, lerp: bool) -> Result<Bounds> {
        if level.model(self.item_type)?.is_sprite() {
            return Ok(Bounds::default());
        }

        let pair = self.frames(level)?;
        Ok(if lerp { pair.lerp_bounds() } else { pair.nearest().bounds })
    }

    /// World position of `offset` in the frame of joint `joint`
    pub fn joint(&self, level: &Level, joint: usize, offset: IVec3) -> Result<IVec3> {
        let model = level.model(self.item_type)?;
        let count = usize::from(model.count);
        if joint >= count {
            return Err(ItemError::JointOutOfRange { joint, count });
        }

        let frame = self.frame(level)?;
        let mut stack = MatrixStack::new();
        let m = stack.current_mut();
        m.rotate_yxz(self.angle.x, self.angle.y, self.angle.z);
        m.apply_frame(frame.pos, frame.rotation(0));

        for (i, node) in level.nodes_of(model).iter().take(joint).enumerate() {
            if node.flags.contains(NodeFlags::POP) {
                stack.pop()?;
            }
            if node.flags.contains(NodeFlags::PUSH) {
                stack.push()?;
            }
            stack.current_mut().apply_frame(node.pos, frame.rotation(i + 1));
        }

        stack.current_mut().translate(offset);
        Ok(self.pos + stack.current().position())
    }

    /// World-space bounding sphere of every joint
    pub fn spheres(&self, level: &Level) -> Result<SphereSet> {
        let mut set = SphereSet::new();
        let model = level.model(self.item_type)?;
        if model.is_sprite() {
            return Ok(set);
        }

        let frame = self.frame(level)?;
        let meshes = level.meshes_of(model);
        let nodes = level.nodes_of(model);

        let mut stack = MatrixStack::new();
        let m = stack.current_mut();
        m.rotate_yxz(self.angle.x, self.angle.y, self.angle.z);
        m.apply_frame(frame.pos, frame.rotation(0));

        for (joint, mesh) in meshes.iter().enumerate() {
            if joint > 0 {
                let Some(node) = nodes.get(joint - 1) else {
                    break;
                };
                if node.flags.contains(NodeFlags::POP) {
                    stack.pop()?;
                }
                if node.flags.contains(NodeFlags::PUSH) {
                    stack.push()?;
                }
                stack.current_mut().apply_frame(node.pos, frame.rotation(joint));
            }

            stack.push()?;
            stack.current_mut().translate(mesh.center);
            let center = self.pos + stack.current().position();
            stack.pop()?;

            if !set.push(Sphere {
                center,
                radius: mesh.radius,
            }) {
                log::trace!("{} has more than {MAX_SPHERES} joints", self.item_type);
                break;
            }
        }

        Ok(set)
    }
}
