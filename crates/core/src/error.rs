//! Error types for caller-facing decision points
//!
//! Every error exposes a stable snake_case `code()` for presentation layers.
//! Flow simulation never fails: stuck and blocked fronts are reported as
//! [`FlowEvent`](crate::flow::FlowEvent)s instead.

use crate::position::GridPosition;
use crate::types::{ConfigError, Direction};

/// Grid construction, initialization and placement failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} outside 1..=100")]
    InvalidDimensions { width: u8, height: u8 },

    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    PositionOutOfBounds { x: i32, y: i32, width: u8, height: u8 },

    #[error("cell {0} is blocked")]
    CellBlocked(GridPosition),

    #[error("cell {0} already holds a pipe")]
    CellOccupied(GridPosition),

    #[error("pipe at {pipe} cannot be placed in cell {cell}")]
    PositionMismatch {
        cell: GridPosition,
        pipe: GridPosition,
    },

    #[error("grid already has a start pipe")]
    AlreadyInitialized,

    #[error("no empty cell can hold the start pipe")]
    NoEmptyCells,

    #[error("start pipe at {0} has no open neighbor to face")]
    NoValidDirection(GridPosition),
}

impl GridError {
    pub fn code(self) -> &'static str {
        match self {
            GridError::InvalidDimensions { .. } => "invalid_dimensions",
            GridError::PositionOutOfBounds { .. } => "position_out_of_bounds",
            GridError::CellBlocked(_) => "cell_blocked",
            GridError::CellOccupied(_) => "cell_occupied",
            GridError::PositionMismatch { .. } => "position_mismatch",
            GridError::AlreadyInitialized => "already_initialized",
            GridError::NoEmptyCells => "no_empty_cells",
            GridError::NoValidDirection(_) => "no_valid_direction",
        }
    }
}

/// A direction that is not one of the pipe's ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("pipe at {position} has no port facing {direction:?}")]
    InvalidPort {
        position: GridPosition,
        direction: Direction,
    },
}

impl PortError {
    pub fn code(self) -> &'static str {
        match self {
            PortError::InvalidPort { .. } => "invalid_port",
        }
    }
}

/// Piece generator and queue construction failures
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("total pipe weight must be positive, got {0}")]
    NonPositiveTotalWeight(f32),

    #[error("start pipes cannot be generated")]
    StartKindWeighted,
}

impl QueueError {
    pub fn code(self) -> &'static str {
        match self {
            QueueError::NonPositiveTotalWeight(_) => "non_positive_total_weight",
            QueueError::StartKindWeighted => "start_kind_weighted",
        }
    }
}

/// Reasons a bomb cannot be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BombError {
    #[error("{max} bombs are already ticking")]
    MaxBombsReached { max: usize },

    #[error("the start pipe cannot be bombed")]
    CannotBombStartPipe,

    #[error("no pipe at {0}")]
    NoPipe(GridPosition),

    #[error("water already passed through the pipe at {0}")]
    PipeBlocked(GridPosition),

    #[error("pipe at {0} is already being bombed")]
    AlreadyBombing(GridPosition),

    #[error("no replacement piece in the queue")]
    QueueEmpty,
}

impl BombError {
    pub fn code(self) -> &'static str {
        match self {
            BombError::MaxBombsReached { .. } => "max_bombs_reached",
            BombError::CannotBombStartPipe => "cannot_bomb_start_pipe",
            BombError::NoPipe(_) => "no_pipe",
            BombError::PipeBlocked(_) => "pipe_blocked",
            BombError::AlreadyBombing(_) => "already_bombing",
            BombError::QueueEmpty => "queue_empty",
        }
    }
}

/// Errors surfaced by [`GameSession`](crate::game_state::GameSession)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Bomb(#[from] BombError),

    #[error("session already started")]
    AlreadyStarted,

    #[error("session not started")]
    NotStarted,

    #[error("game already ended")]
    GameEnded,

    #[error("no piece in the queue")]
    QueueEmpty,
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Config(err) => err.code(),
            SessionError::Grid(err) => err.code(),
            SessionError::Queue(err) => err.code(),
            SessionError::Bomb(err) => err.code(),
            SessionError::AlreadyStarted => "already_started",
            SessionError::NotStarted => "not_started",
            SessionError::GameEnded => "game_ended",
            SessionError::QueueEmpty => "queue_empty",
        }
    }
}
