//! Pipe shapes - canonical port layouts
//!
//! Every shape is described facing `Right`. A placed pipe rotates the base
//! layout by its facing angle, one clockwise quarter turn per 90°.

use arrayvec::ArrayVec;

use crate::types::{Direction, PipeKind};

/// Port directions of a pipe, at most one per side
pub type PortSet = ArrayVec<Direction, 4>;

/// Unrotated port layout of a piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeShape {
    pub kind: PipeKind,
    pub base_connections: &'static [Direction],
    /// Whether separate fronts may each consume a different port
    ///
    /// Descriptive only. Flow never reuses a committed port on any shape.
    pub reusable: bool,
}

const STRAIGHT: PipeShape = PipeShape {
    kind: PipeKind::Straight,
    base_connections: &[Direction::Left, Direction::Right],
    reusable: false,
};

const CORNER: PipeShape = PipeShape {
    kind: PipeKind::Corner,
    base_connections: &[Direction::Up, Direction::Right],
    reusable: false,
};

const CROSS: PipeShape = PipeShape {
    kind: PipeKind::Cross,
    base_connections: &[
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ],
    reusable: true,
};

const START: PipeShape = PipeShape {
    kind: PipeKind::Start,
    base_connections: &[Direction::Right],
    reusable: false,
};

impl PipeShape {
    /// Get the shape for a piece kind
    pub fn of(kind: PipeKind) -> &'static PipeShape {
        match kind {
            PipeKind::Straight => &STRAIGHT,
            PipeKind::Corner => &CORNER,
            PipeKind::Cross => &CROSS,
            PipeKind::Start => &START,
        }
    }

    /// Port directions after rotating the base layout to `facing`
    pub fn ports_facing(&self, facing: Direction) -> PortSet {
        let steps = (facing.angle() - Direction::Right.angle()).rem_euclid(360) / 90;
        self.base_connections
            .iter()
            .map(|dir| dir.rotate90(steps))
            .collect()
    }
}
