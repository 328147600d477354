//! Plane geometry used by the layout engine and the renderers.

use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` and `angle` around `center`. Angles grow clockwise
    /// because screen y points down.
    pub fn from_polar(radius: f64, angle: f64, center: Vec2) -> Self {
        Self::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dist(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    pub fn dist_sq(self, other: Vec2) -> f64 {
        let d = other - self;
        d.x * d.x + d.y * d.y
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    pub fn unit(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON && len.is_finite() {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// The vector rotated a quarter turn.
    pub fn perp(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn lerp(self, to: Vec2, t: f64) -> Self {
        self + (to - self) * t
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Closest point to `p` on the segment `a..b`.
pub fn nearest_point(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        self.center.dist(other.center) < self.radius + other.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Vec2,
    pub to: Vec2,
}

impl Line {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    pub fn direction(&self) -> Vec2 {
        (self.to - self.from).unit()
    }

    pub fn nearest_point(&self, p: Vec2) -> Vec2 {
        nearest_point(self.from, self.to, p)
    }
}

/// Quadratic bezier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub from: Vec2,
    pub control: Vec2,
    pub to: Vec2,
}

impl Quadratic {
    pub fn new(from: Vec2, control: Vec2, to: Vec2) -> Self {
        Self { from, control, to }
    }

    pub fn point_at(&self, t: f64) -> Vec2 {
        let a = self.from.lerp(self.control, t);
        let b = self.control.lerp(self.to, t);
        a.lerp(b, t)
    }
}
