//! Grid coordinates
//!
//! A `GridPosition` can only be built through a bounds-checked factory, so
//! any position held by the grid, a pipe, or a flow front is known to lie
//! inside the grid it was created for.

use std::fmt;

use serde::Serialize;

use crate::types::Direction;

/// A cell coordinate, validated against grid bounds at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPosition {
    x: u8,
    y: u8,
}

impl GridPosition {
    /// Create a position inside a `width` x `height` grid
    /// Returns None if (x, y) lies outside `[0, width) x [0, height)`
    pub fn create(x: i32, y: i32, width: u8, height: u8) -> Option<Self> {
        if x < 0 || y < 0 || x >= i32::from(width) || y >= i32::from(height) {
            return None;
        }
        Some(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    /// Create a position without a bounds check
    ///
    /// Only for coordinates already known to be valid, such as when
    /// rebuilding cells of a grid from their own indices.
    pub(crate) const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const fn x(self) -> u8 {
        self.x
    }

    pub const fn y(self) -> u8 {
        self.y
    }

    /// Neighboring position in `direction`, or None if it leaves the grid
    pub fn step(self, direction: Direction, width: u8, height: u8) -> Option<Self> {
        let (x, y) = direction.offset(i32::from(self.x), i32::from(self.y));
        Self::create(x, y, width, height)
    }

    /// Row-major index into a grid of the given width
    #[inline(always)]
    pub const fn index(self, width: u8) -> usize {
        (self.y as usize) * (width as usize) + (self.x as usize)
    }

    /// Whether this position touches the outer edge of the grid
    pub fn is_on_border(self, width: u8, height: u8) -> bool {
        self.x == 0
            || self.y == 0
            || u16::from(self.x) + 1 == u16::from(width)
            || u16::from(self.y) + 1 == u16::from(height)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_checks_bounds() {
        assert!(GridPosition::create(0, 0, 3, 2).is_some());
        assert!(GridPosition::create(2, 1, 3, 2).is_some());
        assert_eq!(GridPosition::create(3, 0, 3, 2), None);
        assert_eq!(GridPosition::create(0, 2, 3, 2), None);
        assert_eq!(GridPosition::create(-1, 0, 3, 2), None);
        assert_eq!(GridPosition::create(0, -1, 3, 2), None);
    }

    #[test]
    fn step_stays_inside() {
        let pos = GridPosition::create(0, 0, 2, 2).unwrap();
        assert_eq!(pos.step(Direction::Left, 2, 2), None);
        assert_eq!(pos.step(Direction::Up, 2, 2), None);
        assert_eq!(
            pos.step(Direction::Right, 2, 2),
            GridPosition::create(1, 0, 2, 2)
        );
        assert_eq!(
            pos.step(Direction::Down, 2, 2),
            GridPosition::create(0, 1, 2, 2)
        );
    }

    #[test]
    fn index_is_row_major() {
        assert_eq!(GridPosition::new_unchecked(0, 0).index(10), 0);
        assert_eq!(GridPosition::new_unchecked(9, 0).index(10), 9);
        assert_eq!(GridPosition::new_unchecked(0, 1).index(10), 10);
        assert_eq!(GridPosition::new_unchecked(3, 4).index(10), 43);
    }

    #[test]
    fn border_detection() {
        assert!(GridPosition::new_unchecked(0, 1).is_on_border(3, 3));
        assert!(GridPosition::new_unchecked(2, 1).is_on_border(3, 3));
        assert!(GridPosition::new_unchecked(1, 2).is_on_border(3, 3));
        assert!(!GridPosition::new_unchecked(1, 1).is_on_border(3, 3));
        assert_eq!(GridPosition::new_unchecked(1, 1).to_string(), "(1, 1)");
    }
}
