use serde::Serialize;

use crate::bomb::ActiveBomb;
use crate::cell::GridCell;
use crate::flow::{DirectionSet, FlowFront};
use crate::pipe::{Pipe, PipeId};
use crate::position::GridPosition;
use crate::queue::QueueItem;
use crate::scoring::{GameOutcome, ScoreController};
use crate::types::{Direction, PipeKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipeSnapshot {
    pub id: PipeId,
    pub kind: PipeKind,
    pub facing: Direction,
    pub open_ports: Vec<Direction>,
    pub used_ports: Vec<Direction>,
    pub bombing: bool,
}

impl From<&Pipe> for PipeSnapshot {
    fn from(value: &Pipe) -> Self {
        Self {
            id: value.id(),
            kind: value.kind(),
            facing: value.facing(),
            open_ports: value.open_ports().to_vec(),
            used_ports: value.used_ports().to_vec(),
            bombing: value.is_bombing(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub position: GridPosition,
    pub blocked: bool,
    pub pipe: Option<PipeSnapshot>,
}

impl From<&GridCell> for CellSnapshot {
    fn from(value: &GridCell) -> Self {
        Self {
            position: value.position(),
            blocked: value.is_blocked(),
            pipe: value.pipe().map(PipeSnapshot::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitedSnapshot {
    pub position: GridPosition,
    pub directions: Vec<Direction>,
}

impl From<(GridPosition, DirectionSet)> for VisitedSnapshot {
    fn from((position, dirs): (GridPosition, DirectionSet)) -> Self {
        Self {
            position,
            directions: dirs.directions().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub score: u32,
    pub pipes_flowed: u32,
    pub win_target: u32,
    pub target_score: u32,
    pub progress_percent: f32,
    pub outcome: Option<GameOutcome>,
}

impl From<&ScoreController> for ScoreSnapshot {
    fn from(value: &ScoreController) -> Self {
        Self {
            score: value.score(),
            pipes_flowed: value.pipes_flowed(),
            win_target: value.win_target(),
            target_score: value.target_score(),
            progress_percent: value.progress_percent(),
            outcome: value.outcome(),
        }
    }
}

/// Read-only export of a whole session for presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    pub started: bool,
    pub running: bool,
    pub start: Option<GridPosition>,
    /// Row-major
    pub cells: Vec<CellSnapshot>,
    /// Head first
    pub queue: Vec<QueueItem>,
    pub fronts: Vec<FlowFront>,
    pub visited: Vec<VisitedSnapshot>,
    pub score: ScoreSnapshot,
    pub bombs: Vec<ActiveBomb>,
}

impl GameSnapshot {
    /// Cell at `(x, y)`, if inside the captured grid
    pub fn cell(&self, x: u8, y: u8) -> Option<&CellSnapshot> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn pipe_count(&self) -> usize {
        self.cells.iter().filter(|c| c.pipe.is_some()).count()
    }
}
