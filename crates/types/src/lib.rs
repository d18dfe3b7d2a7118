//! Core types module - shared data structures and constants
//!
//! This module defines the value types used throughout the application.
//! They carry no game state of their own, so they are usable from the
//! simulation core, a presentation layer, or a headless runner alike.
//!
//! # Grid Coordinates
//!
//! - `x` grows to the right, `y` grows downwards
//! - `(0, 0)` is the top-left cell
//! - Grid sides are limited to `1..=100` cells
//!
//! # Directions
//!
//! | Direction | Angle | dx | dy |
//! |-----------|-------|----|----|
//! | `Right` | 0° | 1 | 0 |
//! | `Down` | 90° | 0 | 1 |
//! | `Left` | 180° | -1 | 0 |
//! | `Up` | 270° | 0 | -1 |
//!
//! Angles grow clockwise because `y` points down.
//!
//! # Default Tuning
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_GRID_WIDTH` | 9 | Columns |
//! | `DEFAULT_GRID_HEIGHT` | 7 | Rows |
//! | `DEFAULT_BLOCKED_PERCENT` | 10 | Share of cells blocked at start |
//! | `DEFAULT_QUEUE_SIZE` | 5 | Upcoming pieces shown |
//! | `DEFAULT_FLOW_SPEED` | 20 | Progress units per second |
//! | `DEFAULT_START_DELAY_SECS` | 10 | Grace period before water moves |
//! | `DEFAULT_MAX_ACTIVE_BOMBS` | 1 | Concurrent replacements |
//! | `DEFAULT_BOMB_TIMER_MS` | 1500 | Replacement duration |
//! | `DEFAULT_WIN_TARGET` | 12 | Pipes to fill for a win |
//! | `DEFAULT_POINTS_PER_PIPE` | 100 | Score per filled pipe |
//!
//! # Examples
//!
//! ```
//! use pipe_flow_types::{Direction, PipeKind};
//!
//! let dir = Direction::Right;
//! assert_eq!(dir.opposite(), Direction::Left);
//! assert_eq!(dir.rotate90(1), Direction::Down);
//! assert_eq!(Direction::from_angle(-90).unwrap(), Direction::Up);
//! assert_eq!(dir.offset(3, 4), (4, 4));
//!
//! assert_eq!(PipeKind::from_str("cross"), Some(PipeKind::Cross));
//! assert!(!PipeKind::Start.is_placeable());
//! ```

pub mod config;

pub use config::{ConfigError, GameConfig, PipeWeight};

use serde::{Deserialize, Serialize};

/// Smallest allowed grid side
pub const MIN_GRID_SIDE: u8 = 1;

/// Largest allowed grid side
pub const MAX_GRID_SIDE: u8 = 100;

/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: u8 = 9;

/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: u8 = 7;

/// Default share of cells blocked during initialization (percent)
pub const DEFAULT_BLOCKED_PERCENT: f32 = 10.0;

/// Default number of upcoming pieces kept in the queue
pub const DEFAULT_QUEUE_SIZE: usize = 5;

/// Default flow speed in progress units per second (a pipe holds 100 units)
pub const DEFAULT_FLOW_SPEED: f32 = 20.0;

/// Default delay before the start pipe begins to fill
pub const DEFAULT_START_DELAY_SECS: f32 = 10.0;

/// Default number of bombs that may tick at the same time
pub const DEFAULT_MAX_ACTIVE_BOMBS: usize = 1;

/// Default time for a bomb to replace its pipe
pub const DEFAULT_BOMB_TIMER_MS: u64 = 1500;

/// Default number of filled pipes needed to win
pub const DEFAULT_WIN_TARGET: u32 = 12;

/// Default points awarded per filled pipe
pub const DEFAULT_POINTS_PER_PIPE: u32 = 100;

/// Progress a pipe holds when completely filled
pub const FULL_PROGRESS: f32 = 100.0;

/// Progress at which a front's entry is committed to the visited map
pub const HALF_PROGRESS: f32 = 50.0;

/// Fixed timestep interval for the headless runner (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Error produced when converting an angle into a [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DirectionError {
    /// The normalized angle is not a multiple of 90°.
    #[error("angle {0} is not one of 0, 90, 180 or 270 degrees")]
    InvalidAngle(i32),
}

impl DirectionError {
    pub fn code(self) -> &'static str {
        match self {
            DirectionError::InvalidAngle(_) => "invalid_angle",
        }
    }
}

/// The four cardinal directions
///
/// The cycle `Right → Down → Left → Up → Right` is a clockwise quarter turn
/// per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// All directions in clockwise order starting at `Right`
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Position in the clockwise cycle (`Right` = 0)
    pub const fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    pub const fn dx(self) -> i32 {
        match self {
            Direction::Right => 1,
            Direction::Left => -1,
            Direction::Down | Direction::Up => 0,
        }
    }

    pub const fn dy(self) -> i32 {
        match self {
            Direction::Down => 1,
            Direction::Up => -1,
            Direction::Right | Direction::Left => 0,
        }
    }

    /// Angle in degrees, one of 0, 90, 180, 270
    pub const fn angle(self) -> i32 {
        match self {
            Direction::Right => 0,
            Direction::Down => 90,
            Direction::Left => 180,
            Direction::Up => 270,
        }
    }

    /// The direction pointing the other way
    ///
    /// # Examples
    ///
    /// ```
    /// use pipe_flow_types::Direction;
    ///
    /// for dir in Direction::ALL {
    ///     assert_eq!(dir.opposite().opposite(), dir);
    /// }
    /// assert_eq!(Direction::Up.opposite(), Direction::Down);
    /// ```
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    /// Rotate clockwise by `steps` quarter turns (negative turns counter-clockwise)
    ///
    /// # Examples
    ///
    /// ```
    /// use pipe_flow_types::Direction;
    ///
    /// assert_eq!(Direction::Right.rotate90(1), Direction::Down);
    /// assert_eq!(Direction::Right.rotate90(-1), Direction::Up);
    /// assert_eq!(Direction::Left.rotate90(4), Direction::Left);
    /// ```
    pub fn rotate90(self, steps: i32) -> Self {
        let idx = (self.index() as i32 + steps).rem_euclid(4);
        Self::ALL[idx as usize]
    }

    /// Convert an angle in degrees into a direction
    ///
    /// The angle is normalized into `[0, 360)` first, so `-90` and `630`
    /// both map to `Up`.
    pub fn from_angle(angle: i32) -> Result<Self, DirectionError> {
        match angle.rem_euclid(360) {
            0 => Ok(Direction::Right),
            90 => Ok(Direction::Down),
            180 => Ok(Direction::Left),
            270 => Ok(Direction::Up),
            _ => Err(DirectionError::InvalidAngle(angle)),
        }
    }

    /// Apply this direction's delta to a coordinate pair
    pub const fn offset(self, x: i32, y: i32) -> (i32, i32) {
        (x + self.dx(), y + self.dy())
    }

    /// Parse direction from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "right" | "r" => Some(Direction::Right),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "up" | "u" => Some(Direction::Up),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Up => "up",
        }
    }
}

/// The four pipe piece kinds
///
/// - **Straight**: two opposite ports
/// - **Corner**: two adjacent ports
/// - **Cross**: four ports, each usable by a different front
/// - **Start**: a single port, placed once per session by the grid itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeKind {
    Straight,
    Corner,
    Cross,
    Start,
}

impl PipeKind {
    /// Kinds a player may receive from the queue
    pub const PLACEABLE: [PipeKind; 3] = [PipeKind::Straight, PipeKind::Corner, PipeKind::Cross];

    /// Parse pipe kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use pipe_flow_types::PipeKind;
    ///
    /// assert_eq!(PipeKind::from_str("Straight"), Some(PipeKind::Straight));
    /// assert_eq!(PipeKind::from_str("elbow"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "straight" => Some(PipeKind::Straight),
            "corner" => Some(PipeKind::Corner),
            "cross" => Some(PipeKind::Cross),
            "start" => Some(PipeKind::Start),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeKind::Straight => "straight",
            PipeKind::Corner => "corner",
            PipeKind::Cross => "cross",
            PipeKind::Start => "start",
        }
    }

    /// Whether this kind can come out of the piece queue
    pub fn is_placeable(&self) -> bool {
        !matches!(self, PipeKind::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_cycle_is_closed() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.rotate90(4), dir);
            assert_eq!(dir.rotate90(2), dir.opposite());
            assert_eq!(Direction::from_angle(dir.angle()), Ok(dir));
        }
    }

    #[test]
    fn from_angle_normalizes() {
        assert_eq!(Direction::from_angle(360), Ok(Direction::Right));
        assert_eq!(Direction::from_angle(-180), Ok(Direction::Left));
        assert_eq!(Direction::from_angle(450), Ok(Direction::Down));
        assert_eq!(
            Direction::from_angle(45),
            Err(DirectionError::InvalidAngle(45))
        );
        assert_eq!(DirectionError::InvalidAngle(45).code(), "invalid_angle");
    }

    #[test]
    fn offsets_match_deltas() {
        assert_eq!(Direction::Right.offset(0, 0), (1, 0));
        assert_eq!(Direction::Down.offset(0, 0), (0, 1));
        assert_eq!(Direction::Left.offset(0, 0), (-1, 0));
        assert_eq!(Direction::Up.offset(0, 0), (0, -1));
    }

    #[test]
    fn default_tuning_values() {
        assert_eq!(DEFAULT_QUEUE_SIZE, 5);
        assert_eq!(DEFAULT_BOMB_TIMER_MS, 1500);
        assert_eq!(FULL_PROGRESS, 2.0 * HALF_PROGRESS);
        assert!(DEFAULT_GRID_WIDTH <= MAX_GRID_SIDE);
        assert!(DEFAULT_GRID_HEIGHT >= MIN_GRID_SIDE);
    }

    #[test]
    fn kinds_round_trip_through_strings() {
        for kind in [
            PipeKind::Straight,
            PipeKind::Corner,
            PipeKind::Cross,
            PipeKind::Start,
        ] {
            assert_eq!(PipeKind::from_str(kind.as_str()), Some(kind));
        }
        for dir in Direction::ALL {
            assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
        }
    }
}
