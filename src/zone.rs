// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{
    f32::consts::{PI, TAU},
    fmt,
};

/// Largest lateral offset the sensor reports, in millimeters.
pub const MAX_COORDINATE: i16 = 4000;
/// Largest forward distance the sensor reports, in millimeters.
pub const MAX_DISTANCE: i16 = 8000;
/// Smallest forward distance accepted for a zone origin.
pub const MIN_Y: i16 = -500;

/// Distance under which a point is considered to sit on a corner.
const EPSILON: f32 = 1e-6;
/// Tolerance on the subtended angle sum, in radians.
const ANGLE_TOLERANCE: f32 = 0.01;

/// Rectangular detection zone in sensor coordinates, before rotation.
///
/// The width extends from the origin towards negative X and the height
/// towards positive Y when the rotation angle is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Zone {
    /// Origin X in millimeters
    pub x: i16,
    /// Origin Y in millimeters
    pub y: i16,
    /// Extent along the width direction in millimeters
    pub width: i16,
    /// Extent along the height direction in millimeters
    pub height: i16,
}

/// A 2D point in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(i16, i16)> for Point {
    fn from((x, y): (i16, i16)) -> Self {
        Point::new(x as f32, y as f32)
    }
}

/// The four corners of a rotated zone.  Corners are ordered so that
/// p1-p2, p2-p3, p3-p4 and p4-p1 are the edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    /// Zone origin
    pub p1: Point,
    /// Origin moved along the width direction
    pub p2: Point,
    /// Corner opposite the origin
    pub p3: Point,
    /// Origin moved along the height direction
    pub p4: Point,
}

impl Zone {
    /// Creates a zone from its origin and extents.
    pub fn new(x: i16, y: i16, width: i16, height: i16) -> Zone {
        Zone {
            x,
            y,
            width,
            height,
        }
    }

    /// A zone counts as configured when it has any non-zero extent.
    pub fn is_configured(&self) -> bool {
        self.width != 0 || self.height != 0
    }

    /// A zone can only contain targets when both extents are positive and
    /// the origin lies within the sensor coverage.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && (-MAX_COORDINATE..=MAX_COORDINATE).contains(&self.x)
            && (MIN_Y..=MAX_DISTANCE).contains(&self.y)
    }

    /// Zone area in square millimeters.
    pub fn area(&self) -> i32 {
        self.width as i32 * self.height as i32
    }

    /// Computes the rotated corners of the zone.
    ///
    /// The height direction uses `cos(angle - 90)` for X and
    /// `sin(angle + 90)` for Y.  These do not describe a single perpendicular
    /// for arbitrary angles and existing zone layouts depend on it, so the
    /// two terms must stay independent.
    pub fn corners(&self, angle: f32) -> Corners {
        let (sin_angle, cos_angle) = angle.to_radians().sin_cos();
        let cos_angle_90 = (angle - 90.0).to_radians().cos();
        let sin_angle_90 = (angle + 90.0).to_radians().sin();

        let x = self.x as f32;
        let y = self.y as f32;
        let width = self.width as f32;
        let height = self.height as f32;

        let p1 = Point::new(x, y);
        let p2 = Point::new(x - width * cos_angle, y + width * sin_angle);
        let p4 = Point::new(x + height * cos_angle_90, y + height * sin_angle_90);
        let p3 = Point::new(p2.x + (p4.x - p1.x), p2.y + (p4.y - p1.y));

        Corners { p1, p2, p3, p4 }
    }

    /// Tests whether `point` lies inside the zone rotated by `angle` degrees
    /// by summing the angles the point subtends towards each edge.  Inside
    /// points see a full turn.
    pub fn contains(&self, point: Point, angle: f32) -> bool {
        if !self.is_valid() {
            return false;
        }

        let Corners { p1, p2, p3, p4 } = self.corners(angle);

        let d1 = p1.distance(&point);
        let d2 = p2.distance(&point);
        let d3 = p3.distance(&point);
        let d4 = p4.distance(&point);

        let diagonal = (self.width as f32).hypot(self.height as f32);
        if d1 > diagonal && d2 > diagonal && d3 > diagonal && d4 > diagonal {
            return false;
        }

        if d1 < EPSILON || d2 < EPSILON || d3 < EPSILON || d4 < EPSILON {
            return true;
        }

        let sum = subtended(d1, d2, p1.distance(&p2))
            + subtended(d1, d4, p1.distance(&p4))
            + subtended(d2, d3, p2.distance(&p3))
            + subtended(d3, d4, p3.distance(&p4));

        sum >= TAU - ANGLE_TOLERANCE
    }

    /// Describes the zone configuration for display next to its settings.
    pub fn status(&self) -> ZoneStatus {
        if self.x == 0 && self.y == 0 && self.width == 0 && self.height == 0 {
            ZoneStatus::Unconfigured
        } else if self.width <= 0 || self.height <= 0 {
            ZoneStatus::InvalidSize
        } else if self.x.unsigned_abs() > MAX_COORDINATE as u16 {
            ZoneStatus::InvalidX
        } else if self.y < MIN_Y || self.y > MAX_DISTANCE {
            ZoneStatus::InvalidY
        } else if self.x.unsigned_abs() as i32 + self.width as i32 > MAX_COORDINATE as i32 {
            ZoneStatus::BeyondX
        } else if self.y as i32 + self.height as i32 > MAX_DISTANCE as i32 {
            ZoneStatus::BeyondY
        } else {
            ZoneStatus::Size {
                width: self.width,
                height: self.height,
            }
        }
    }
}

/// Angle at the apex of a triangle with sides `a` and `b` meeting at the
/// apex and `c` opposite, from the law of cosines.
fn subtended(a: f32, b: f32, c: f32) -> f32 {
    safe_acos((a * a + b * b - c * c) / (2.0 * a * b))
}

fn safe_acos(value: f32) -> f32 {
    if value > 1.0 {
        0.0
    } else if value < -1.0 {
        PI
    } else {
        value.acos()
    }
}

/// Configuration status of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneStatus {
    /// All fields are zero
    Unconfigured,
    /// Width or height is not positive
    InvalidSize,
    /// Origin X is beyond the sensor coverage
    InvalidX,
    /// Origin Y is beyond the sensor coverage
    InvalidY,
    /// Zone is usable but extends past the lateral coverage
    BeyondX,
    /// Zone is usable but extends past the forward coverage
    BeyondY,
    /// Zone is usable
    Size {
        /// Width in millimeters
        width: i16,
        /// Height in millimeters
        height: i16,
    },
}

impl ZoneStatus {
    /// Whether the zone takes part in classification with this status.
    pub fn is_usable(&self) -> bool {
        matches!(
            self,
            ZoneStatus::BeyondX | ZoneStatus::BeyondY | ZoneStatus::Size { .. }
        )
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZoneStatus::Unconfigured => write!(f, "Configure below"),
            ZoneStatus::InvalidSize => write!(f, "Invalid: Width/Height must be > 0"),
            ZoneStatus::InvalidX => write!(f, "Invalid: X out of bounds"),
            ZoneStatus::InvalidY => write!(f, "Invalid: Y out of bounds"),
            ZoneStatus::BeyondX => write!(f, "Warning: Zone extends beyond X boundary"),
            ZoneStatus::BeyondY => write!(f, "Warning: Zone extends beyond Y boundary"),
            ZoneStatus::Size { width, height } => {
                let area = *width as f32 * *height as f32 / 1_000_000.0;
                write!(f, "Size: {}x{} mm ({:.2} m²)", width, height, area)
            }
        }
    }
}
