//! Intervals and their tensor products.

use crate::types::{Result, RustySpectralError};

/// A closed interval $[a, b]$ with $a < b$.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    a: f64,
    b: f64,
}

impl Default for Interval {
    fn default() -> Self {
        Interval { a: -1.0, b: 1.0 }
    }
}

impl Interval {
    /// Create a new interval. Fails unless both ends are finite and `a < b`.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if a.is_finite() && b.is_finite() && a < b {
            Ok(Interval { a, b })
        } else {
            Err(RustySpectralError::InvalidInterval(a, b))
        }
    }

    /// The interval $[-1, 1]$.
    pub fn unit() -> Self {
        Self::default()
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn length(&self) -> f64 {
        self.b - self.a
    }

    /// Map a point of the interval to $[-1, 1]$.
    pub fn to_reference(&self, x: f64) -> f64 {
        (2.0 * x - self.a - self.b) / (self.b - self.a)
    }

    /// Map a point of $[-1, 1]$ to the interval.
    pub fn from_reference(&self, s: f64) -> f64 {
        0.5 * (self.b - self.a) * s + 0.5 * (self.a + self.b)
    }

    /// Derivative of the map from the interval to $[-1, 1]$.
    pub fn scale(&self) -> f64 {
        2.0 / (self.b - self.a)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.a && x <= self.b
    }
}

/// The rectangle $[a, b] \times [c, d]$.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rectangle {
    pub x: Interval,
    pub y: Interval,
}

impl Rectangle {
    pub fn new(x: Interval, y: Interval) -> Self {
        Rectangle { x, y }
    }

    pub fn area(&self) -> f64 {
        self.x.length() * self.y.length()
    }
}

/// The box $[a, b] \times [c, d] \times [e, f]$.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Cuboid {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Cuboid {
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Cuboid { x, y, z }
    }

    /// The $(x, y)$ face of the box.
    pub fn xy(&self) -> Rectangle {
        Rectangle::new(self.x, self.y)
    }
}
