//! Anchor records that describe a curve.
//!
//! Anchors are plain values owned by whoever edits them; evaluators copy them
//! into their lookup tables at construction time.

use serde::{Deserialize, Serialize};

use super::{Point3, Quat, Vec3};

/// Bezier anchor with a symmetric control handle.
///
/// The same `control_offset` produces both handles: the outgoing control
/// point sits at `position + control_offset`, the incoming one at
/// `position - control_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierAnchor {
    pub position: Point3,
    #[serde(default)]
    pub control_offset: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

impl BezierAnchor {
    #[must_use]
    pub const fn new(position: Point3, control_offset: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            control_offset,
            scale,
        }
    }

    /// Anchor with no handle and unit scale.
    #[must_use]
    pub const fn at(position: Point3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    #[must_use]
    pub const fn with_control_offset(mut self, offset: Vec3) -> Self {
        self.control_offset = offset;
        self
    }

    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Outgoing control point, used when this anchor starts a segment.
    #[must_use]
    pub const fn left_control_point(&self) -> Point3 {
        self.position.add_vec(self.control_offset)
    }

    /// Incoming control point, used when this anchor ends a segment.
    #[must_use]
    pub const fn right_control_point(&self) -> Point3 {
        self.position.sub_vec(self.control_offset)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite() && self.control_offset.is_finite() && self.scale.is_finite()
    }
}

impl Default for BezierAnchor {
    fn default() -> Self {
        Self::at(Point3::ORIGIN)
    }
}

/// Position, orientation and scale at one point of a curve.
///
/// Every evaluator produces these, and polylines are authored from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformAnchor {
    pub position: Point3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

impl TransformAnchor {
    #[must_use]
    pub const fn new(position: Point3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Anchor at `position` with identity rotation and unit scale.
    #[must_use]
    pub const fn at(position: Point3) -> Self {
        Self::new(position, Quat::IDENTITY, Vec3::ONE)
    }

    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Map a point from this anchor's local frame: scale, then rotate, then translate.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Point3 {
        self.position
            .add_vec(self.rotation.rotate_vec3(local.scale_by(self.scale)))
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for TransformAnchor {
    fn default() -> Self {
        Self::at(Point3::ORIGIN)
    }
}

const fn unit_scale() -> Vec3 {
    Vec3::ONE
}
