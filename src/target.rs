// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    frame::TargetRecord,
    zone::{Point, MAX_COORDINATE, MAX_DISTANCE, MIN_Y},
};
use std::fmt;

/// Radial movement of a target relative to the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementState {
    /// Speed towards the sensor beyond the threshold
    Approaching,
    /// Speed away from the sensor beyond the threshold
    MovingAway,
    /// Speed within the threshold
    #[default]
    Static,
}

impl MovementState {
    /// Classifies a raw speed in cm/s against a threshold in m/s.
    pub fn from_speed(speed: i16, threshold: f32) -> MovementState {
        let speed = speed as f32 / 100.0;
        if speed > threshold {
            MovementState::MovingAway
        } else if speed < -threshold {
            MovementState::Approaching
        } else {
            MovementState::Static
        }
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MovementState::Approaching => write!(f, "Approaching"),
            MovementState::MovingAway => write!(f, "Moving away"),
            MovementState::Static => write!(f, "Static"),
        }
    }
}

/// Lateral position of a target as seen from the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Beyond the threshold on the negative X side
    Left,
    /// Beyond the threshold on the positive X side
    Right,
    /// Within the threshold and in front of the sensor
    Center,
    /// No meaningful direction
    #[default]
    None,
}

impl Direction {
    /// Classifies a position using a lateral threshold in millimeters.
    pub fn from_position(x: i16, y: i16, threshold: i16) -> Direction {
        if x > threshold {
            Direction::Right
        } else if x < -threshold {
            Direction::Left
        } else if y > 0 {
            Direction::Center
        } else {
            Direction::None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
            Direction::Center => write!(f, "Center"),
            Direction::None => write!(f, "None"),
        }
    }
}

/// Bearing of a position from the sensor's forward axis in degrees, positive
/// to the right.  A target level with the sensor has no bearing and reports
/// zero.
pub fn bearing(x: i16, y: i16) -> f32 {
    if y == 0 {
        return 0.0;
    }
    (x as f32).atan2(y as f32).to_degrees()
}

/// A decoded target slot together with its per-frame classification.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Target {
    /// Horizontal offset in millimeters
    pub x: i16,
    /// Forward distance in millimeters
    pub y: i16,
    /// Radial speed in cm/s
    pub speed: i16,
    /// Distance resolution code
    pub resolution: u16,
    /// Slot holds a detection
    pub valid: bool,
    /// Target lies inside an enabled exclusion zone this frame
    pub excluded: bool,
    /// Bearing in degrees
    pub angle: f32,
    /// Radial movement
    pub movement: MovementState,
    /// Lateral direction
    pub direction: Direction,
}

impl From<TargetRecord> for Target {
    fn from(record: TargetRecord) -> Self {
        Target {
            x: record.x,
            y: record.y,
            speed: record.speed,
            resolution: record.resolution,
            valid: record.is_valid(),
            ..Default::default()
        }
    }
}

impl Target {
    /// Position as a geometry point.
    pub fn point(&self) -> Point {
        Point::from((self.x, self.y))
    }

    /// Valid and not vetoed by an exclusion zone.
    pub fn is_counted(&self) -> bool {
        self.valid && !self.excluded
    }

    /// Speed in m/s.
    pub fn speed_ms(&self) -> f32 {
        self.speed as f32 / 100.0
    }

    /// Straight line distance from the sensor in millimeters.
    pub fn distance(&self) -> f32 {
        (self.x as f32).hypot(self.y as f32)
    }

    /// Whether the position lies inside the sensor coverage.
    pub fn within_bounds(&self) -> bool {
        (-MAX_COORDINATE..=MAX_COORDINATE).contains(&self.x)
            && (MIN_Y..=MAX_DISTANCE).contains(&self.y)
    }

    /// Recomputes the derived attributes from the position and speed.
    pub fn update_attributes(&mut self, speed_threshold: f32, direction_threshold: i16) {
        self.angle = bearing(self.x, self.y);
        self.movement = MovementState::from_speed(self.speed, speed_threshold);
        self.direction = Direction::from_position(self.x, self.y, direction_threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing() {
        assert_eq!(bearing(0, 1000), 0.0);
        assert!((bearing(1000, 1000) - 45.0).abs() < 1e-4);
        assert!((bearing(-1000, 1000) + 45.0).abs() < 1e-4);
        assert_eq!(bearing(500, 0), 0.0);
        assert!((bearing(100, -100) - 135.0).abs() < 1e-4);
    }

    #[test]
    fn test_movement() {
        assert_eq!(MovementState::from_speed(10, 0.05), MovementState::MovingAway);
        assert_eq!(MovementState::from_speed(-10, 0.05), MovementState::Approaching);
        assert_eq!(MovementState::from_speed(5, 0.05), MovementState::Static);
        assert_eq!(MovementState::from_speed(0, 0.05), MovementState::Static);
        assert_eq!(MovementState::MovingAway.to_string(), "Moving away");
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::from_position(150, 10, 100), Direction::Right);
        assert_eq!(Direction::from_position(-150, 10, 100), Direction::Left);
        assert_eq!(Direction::from_position(100, 10, 100), Direction::Center);
        assert_eq!(Direction::from_position(50, 0, 100), Direction::None);
        assert_eq!(Direction::from_position(50, 10, 20), Direction::Right);
    }

    #[test]
    fn test_from_record() {
        let record = TargetRecord {
            x: -300,
            y: 4000,
            speed: -25,
            resolution: 360,
        };
        let mut target = Target::from(record);
        assert!(target.valid);
        assert!(target.is_counted());
        assert!(target.within_bounds());
        assert_eq!(target.distance(), 300f32.hypot(4000.0));

        target.update_attributes(0.05, 100);
        assert_eq!(target.movement, MovementState::Approaching);
        assert_eq!(target.direction, Direction::Left);
        assert!(target.angle < 0.0);
        assert_eq!(target.speed_ms(), -0.25);
    }
}
