use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components set to one; the neutral scale.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// Unit vector along the X axis.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector along the Y axis.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector along the Z axis.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Unit vector in the same direction, or `None` for zero/non-finite input.
    /// Unit-length copy, or `None` for a zero or non-finite quaternion.
    /// Quaternions already unit within [`Tolerance::DEFAULT`] come back unchanged.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if (len - 1.0).abs() <= Tolerance::DEFAULT.eps {
            Some(self)
        } else if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    /// Linear interpolation, `self * (1 - t) + rhs * t`.
    ///
    /// Written in the weighted form so that `t == 0` and `t == 1` reproduce
    /// the endpoints bit for bit.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.z * s + rhs.z * t,
        )
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Component-wise product.
    #[must_use]
    pub const fn scale_by(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[must_use]
    pub const fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    #[must_use]
    pub const fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// A unit vector perpendicular to `self`.
    ///
    /// Falls back to +X when `self` is zero.
    #[must_use]
    pub fn any_orthogonal(self) -> Self {
        let candidate = if self.x.abs() < self.y.abs() {
            Self::new(0.0, -self.z, self.y)
        } else {
            Self::new(-self.z, 0.0, self.x)
        };

        candidate.normalized().unwrap_or(Self::X)
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.mul_scalar(self)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Position vector from the origin.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_vec(self, v: Vec3) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Linear interpolation, `self * (1 - t) + rhs * t`.
    ///
    /// `t` is not clamped; values outside [0, 1] extrapolate along the line.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.z * s + rhs.z * t,
        )
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Self;
    fn sub(self, rhs: Vec3) -> Self::Output {
        self.sub_vec(rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Quat
// ─────────────────────────────────────────────────────────────────────────────

/// Unit quaternion describing an orientation.
///
/// Serialized as `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Dot products above this are treated as the same orientation when slerping.
    const SLERP_LINEAR_THRESHOLD: f64 = 1.0 - 1e-9;

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis`.
    /// Returns `None` when the axis cannot be normalized.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let (s, c) = (angle * 0.5).sin_cos();
        Some(Self::new(axis.x * s, axis.y * s, axis.z * s, c))
    }

    /// Rotation whose columns are the given orthonormal axes, i.e. local X/Y/Z map
    /// onto `x_axis`/`y_axis`/`z_axis`.
    #[must_use]
    pub fn from_rotation_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m00, m10, m20) = (x_axis.x, x_axis.y, x_axis.z);
        let (m01, m11, m21) = (y_axis.x, y_axis.y, y_axis.z);
        let (m02, m12, m22) = (z_axis.x, z_axis.y, z_axis.z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };

        q.normalized().unwrap_or(Self::IDENTITY)
    }

    /// Orientation whose local +Z looks along `forward` and whose local +Y leans
    /// towards `up`.
    ///
    /// A degenerate `forward` yields the identity. When `forward` and `up` are
    /// parallel a deterministic perpendicular up is substituted.
    #[must_use]
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Self {
        let Some(f) = forward.normalized() else {
            return Self::IDENTITY;
        };

        let side = up.cross(f);
        let right = if side.length_squared() > Tolerance::ZERO_LENGTH.eps_squared() {
            side.normalized()
        } else {
            None
        }
        .unwrap_or_else(|| f.any_orthogonal().cross(f).normalized().unwrap_or(Vec3::X));
        let actual_up = f.cross(right);

        Self::from_rotation_axes(right, actual_up, f)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` for a zero or non-finite quaternion.
    /// Quaternions already unit within [`Tolerance::DEFAULT`] come back unchanged.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if (len - 1.0).abs() <= Tolerance::DEFAULT.eps {
            Some(self)
        } else if len.is_finite() && len > 0.0 {
            let inv = 1.0 / len;
            Some(Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Hamilton product: applying the result equals applying `rhs` then `self`.
    #[must_use]
    pub const fn mul_quat(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    #[must_use]
    pub fn rotate_vec3(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v).mul_scalar(2.0);
        v.add(t.mul_scalar(self.w)).add(q.cross(t))
    }

    /// Shortest-path spherical interpolation.
    ///
    /// `t` outside (0, 1) returns the nearer endpoint unchanged.
    #[must_use]
    pub fn slerp(self, rhs: Self, t: f64) -> Self {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return rhs;
        }

        let mut end = rhs;
        let mut cos_theta = self.dot(rhs);
        if cos_theta < 0.0 {
            end = rhs.neg();
            cos_theta = -cos_theta;
        }

        let (s0, s1) = if cos_theta > Self::SLERP_LINEAR_THRESHOLD {
            (1.0 - t, t)
        } else {
            let theta = cos_theta.clamp(-1.0, 1.0).acos();
            let sin_theta = theta.sin();
            (((1.0 - t) * theta).sin() / sin_theta, (t * theta).sin() / sin_theta)
        };

        Self::new(
            self.x * s0 + end.x * s1,
            self.y * s0 + end.y * s1,
            self.z * s0 + end.z * s1,
            self.w * s0 + end.w * s1,
        )
        .normalized()
        .unwrap_or(self)
    }

    /// Orientation equality up to `eps`, treating `q` and `-q` as the same rotation.
    #[must_use]
    pub fn approx_eq(self, rhs: Self, eps: f64) -> bool {
        (1.0 - self.dot(rhs).abs()) <= eps
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 4]> for Quat {
    fn from(arr: [f64; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl From<Quat> for [f64; 4] {
    fn from(q: Quat) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

impl Mul for Quat {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_quat(rhs)
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.rotate_vec3(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    #[must_use]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), Self::expand_point))
    }

    #[must_use]
    pub fn expand_point(self, p: Point3) -> Self {
        Self::new(
            Point3::new(
                self.min.x.min(p.x),
                self.min.y.min(p.y),
                self.min.z.min(p.z),
            ),
            Point3::new(
                self.max.x.max(p.x),
                self.max.y.max(p.y),
                self.max.z.max(p.z),
            ),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Named epsilons, kept in one place to avoid scattering magic numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Zero-length vectors, edges and lookup spans (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn is_zero_length(self, len: f64) -> bool {
        len.abs() <= self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.sub_point(b).length_squared() <= self.eps_squared()
    }

    #[must_use]
    pub fn approx_eq_vec3(self, a: Vec3, b: Vec3) -> bool {
        a.sub(b).length_squared() <= self.eps_squared()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn vec3_scale_and_cross() {
        let s = Vec3::new(2.0, 0.5, -1.0);

        assert_eq!(Vec3::ONE.scale_by(s), s);
        assert_eq!(Vec3::new(1.0, 4.0, 3.0).scale_by(s), Vec3::new(2.0, 2.0, -3.0));
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
        assert_eq!(Vec3::Z.mul_scalar(0.5) + 0.5 * Vec3::Z, Vec3::Z);
    }

    #[test]
    fn lerp_hits_endpoints_exactly() {
        let a = Point3::new(0.1, 0.2, 0.3);
        let b = Point3::new(10.7, -3.3, 1e-3);

        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(
            Point3::ORIGIN.lerp(Point3::new(10.0, 0.0, 0.0), 1.5),
            Point3::new(15.0, 0.0, 0.0)
        );
    }

    #[test]
    fn any_orthogonal_is_perpendicular() {
        for v in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 2.0, -3.0)] {
            let o = v.any_orthogonal();
            assert!(o.dot(v).abs() < 1e-12);
            assert!((o.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn look_rotation_identity_frame() {
        let q = Quat::look_rotation(Vec3::Z, Vec3::Y);
        assert!(q.approx_eq(Quat::IDENTITY, 1e-12));
    }

    #[test]
    fn look_rotation_maps_forward_and_up() {
        let forward = Vec3::new(1.0, 0.0, 0.0);
        let q = Quat::look_rotation(forward, Vec3::Y);
        let tol = Tolerance::new(1e-12);

        assert!(tol.approx_eq_vec3(q * Vec3::Z, forward));
        assert!(tol.approx_eq_vec3(q * Vec3::Y, Vec3::Y));
        assert!(tol.approx_eq_vec3(q * Vec3::X, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn look_rotation_parallel_up_is_finite() {
        let q = Quat::look_rotation(Vec3::Y, Vec3::Y);
        assert!(q.is_finite());
        let forward = q * Vec3::Z;
        assert!(Tolerance::new(1e-12).approx_eq_vec3(forward, Vec3::Y));
    }

    #[test]
    fn look_rotation_zero_forward_is_identity() {
        assert_eq!(Quat::look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn quat_axis_angle_rotates() {
        let q = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2).unwrap();
        let rotated = q * Vec3::Z;
        assert!(Tolerance::new(1e-12).approx_eq_vec3(rotated, Vec3::X));
        assert!(Quat::from_axis_angle(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn slerp_endpoints_and_midpoint() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2).unwrap();

        assert_eq!(a.slerp(b, 0.0), a);
        assert_eq!(a.slerp(b, 1.0), b);

        let mid = a.slerp(b, 0.5);
        let expected = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2 * 0.5).unwrap();
        assert!(mid.approx_eq(expected, 1e-12));
    }

    #[test]
    fn slerp_takes_shortest_path() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2).unwrap().neg();

        let mid = a.slerp(b, 0.5);
        let expected = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2 * 0.5).unwrap();
        assert!(mid.approx_eq(expected, 1e-12));
    }

    #[test]
    fn bbox_from_points() {
        let bbox = BBox::from_points([
            Point3::new(0.0, 4.0, -1.0),
            Point3::new(2.0, 0.0, 5.0),
        ])
        .unwrap();

        assert_eq!(bbox.min, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(bbox.max, Point3::new(2.0, 4.0, 5.0));
        assert!(BBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn quat_approx_eq_ignores_sign() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7).unwrap();

        assert!(q.approx_eq(q.neg(), 1e-12));
        assert!(!q.approx_eq(Quat::IDENTITY, 1e-3));
        assert_eq!(q * Vec3::ZERO, Vec3::ZERO);
    }

    #[test]
    fn quat_normalized_keeps_unit_and_rescales_others() {
        let unit = Quat::from_axis_angle(Vec3::Z, 0.3).unwrap();
        assert_eq!(unit.normalized(), Some(unit));

        let scaled = Quat::new(0.0, 2.0, 0.0, 0.0).normalized().unwrap();
        assert_eq!(scaled, Quat::new(0.0, 1.0, 0.0, 0.0));
        assert!(Quat::new(0.0, 0.0, 0.0, 0.0).normalized().is_none());
        assert!(Quat::new(f64::NAN, 0.0, 0.0, 1.0).normalized().is_none());
    }
}
