//! A single grid cell
//!
//! A cell is either blocked, empty, or holds exactly one pipe whose position
//! equals the cell's. A blocked cell never holds a pipe.

use crate::error::GridError;
use crate::pipe::Pipe;
use crate::position::GridPosition;

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    position: GridPosition,
    pipe: Option<Pipe>,
    blocked: bool,
}

impl GridCell {
    pub fn new(position: GridPosition) -> Self {
        Self {
            position,
            pipe: None,
            blocked: false,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn pipe(&self) -> Option<&Pipe> {
        self.pipe.as_ref()
    }

    pub fn pipe_mut(&mut self) -> Option<&mut Pipe> {
        self.pipe.as_mut()
    }

    pub fn has_pipe(&self) -> bool {
        self.pipe.is_some()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Neither blocked nor occupied
    pub fn is_empty(&self) -> bool {
        !self.blocked && self.pipe.is_none()
    }

    /// Place a pipe in this cell
    ///
    /// Checks run in order: blocked, occupied, then position mismatch.
    pub fn set_pipe(&mut self, pipe: Pipe) -> Result<(), GridError> {
        if self.blocked {
            return Err(GridError::CellBlocked(self.position));
        }
        if self.pipe.is_some() {
            return Err(GridError::CellOccupied(self.position));
        }
        if pipe.position() != self.position {
            return Err(GridError::PositionMismatch {
                cell: self.position,
                pipe: pipe.position(),
            });
        }
        self.pipe = Some(pipe);
        Ok(())
    }

    pub fn take_pipe(&mut self) -> Option<Pipe> {
        self.pipe.take()
    }

    /// Block the cell, discarding any pipe it held
    pub fn block(&mut self) {
        self.pipe = None;
        self.blocked = true;
    }

    /// Clear the blocked flag only
    pub fn unblock(&mut self) {
        self.blocked = false;
    }
}
