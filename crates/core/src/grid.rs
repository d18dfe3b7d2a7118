//! Grid module - owns every cell and the start pipe
//!
//! Cells live in a flat row-major `Vec` (`y * width + x`), sized once at
//! construction. Coordinates: x grows to the right, y grows downward.
//!
//! Lifecycle: `new` -> `initialize` (block cells, then place the start pipe)
//! -> placements and bombs -> `clear` (keep start) or `reset` (replay).

use arrayvec::ArrayVec;

use crate::cell::GridCell;
use crate::error::GridError;
use crate::pipe::{Pipe, PipeId};
use crate::position::GridPosition;
use crate::rng::SimpleRng;
use crate::types::{Direction, PipeKind, MAX_GRID_SIDE, MIN_GRID_SIDE};

/// Layout parameters consumed by [`Grid::initialize`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Share of cells to block, 0..=100
    pub blocked_percent: f32,
    /// Whether the start pipe may sit on the outer ring
    pub allow_start_on_edge: bool,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            blocked_percent: 0.0,
            allow_start_on_edge: true,
        }
    }
}

/// The playing field
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<GridCell>,
    start: Option<GridPosition>,
    next_id: u32,
}

impl Grid {
    /// Create an empty, uninitialized grid
    pub fn new(width: u8, height: u8) -> Result<Self, GridError> {
        let side_ok = |side: u8| (MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side);
        if !side_ok(width) || !side_ok(height) {
            return Err(GridError::InvalidDimensions { width, height });
        }

        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| GridCell::new(GridPosition::new_unchecked(x, y))))
            .collect();

        Ok(Self {
            width,
            height,
            cells,
            start: None,
            next_id: 0,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Build a position on this grid, None if out of bounds
    pub fn position(&self, x: i32, y: i32) -> Option<GridPosition> {
        GridPosition::create(x, y, self.width, self.height)
    }

    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        self.position(x, y).is_some()
    }

    fn contains(&self, pos: GridPosition) -> bool {
        pos.x() < self.width && pos.y() < self.height
    }

    /// Bounds-checked cell lookup
    pub fn get_cell(&self, x: i32, y: i32) -> Result<&GridCell, GridError> {
        self.try_get_cell(x, y).ok_or(GridError::PositionOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn try_get_cell(&self, x: i32, y: i32) -> Option<&GridCell> {
        self.position(x, y).and_then(|pos| self.cell(pos))
    }

    /// Cell at a position, None when the position belongs to a larger grid
    pub fn cell(&self, pos: GridPosition) -> Option<&GridCell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(pos.index(self.width))
    }

    fn cell_mut(&mut self, pos: GridPosition) -> Result<&mut GridCell, GridError> {
        let (width, height) = (self.width, self.height);
        if !self.contains(pos) {
            return Err(GridError::PositionOutOfBounds {
                x: i32::from(pos.x()),
                y: i32::from(pos.y()),
                width,
                height,
            });
        }
        let idx = pos.index(width);
        self.cells.get_mut(idx).ok_or(GridError::PositionOutOfBounds {
            x: i32::from(pos.x()),
            y: i32::from(pos.y()),
            width,
            height,
        })
    }

    pub fn pipe_at(&self, pos: GridPosition) -> Option<&Pipe> {
        self.cell(pos).and_then(GridCell::pipe)
    }

    pub fn pipe_at_mut(&mut self, pos: GridPosition) -> Option<&mut Pipe> {
        self.cell_mut(pos).ok().and_then(GridCell::pipe_mut)
    }

    /// Construct a pipe with a fresh id; it still has to be placed with [`Grid::set_pipe`]
    pub fn new_pipe(&mut self, pos: GridPosition, kind: PipeKind, facing: Direction) -> Pipe {
        self.next_id = self.next_id.wrapping_add(1);
        Pipe::new(PipeId(self.next_id), pos, kind, facing)
    }

    /// Place a pipe in the cell at its own position
    pub fn set_pipe(&mut self, pipe: Pipe) -> Result<(), GridError> {
        let pos = pipe.position();
        self.cell_mut(pos)?.set_pipe(pipe)
    }

    /// Take the pipe out of a cell; the start pipe stays put
    pub fn remove_pipe(&mut self, pos: GridPosition) -> Option<Pipe> {
        if self.start == Some(pos) {
            tracing::warn!(%pos, "refusing to remove the start pipe");
            return None;
        }
        self.cell_mut(pos).ok().and_then(GridCell::take_pipe)
    }

    /// Block a cell, discarding its pipe; the start cell cannot be blocked
    pub fn block_cell(&mut self, pos: GridPosition) -> Result<(), GridError> {
        if self.start == Some(pos) {
            return Err(GridError::CellOccupied(pos));
        }
        self.cell_mut(pos)?.block();
        Ok(())
    }

    /// Neighboring cell in `direction`, None past the edge
    pub fn neighbor(&self, pos: GridPosition, direction: Direction) -> Option<&GridCell> {
        pos.step(direction, self.width, self.height)
            .and_then(|next| self.cell(next))
    }

    /// Like [`Grid::neighbor`], but blocked cells count as absent
    pub fn valid_neighbor(&self, pos: GridPosition, direction: Direction) -> Option<&GridCell> {
        self.neighbor(pos, direction).filter(|cell| !cell.is_blocked())
    }

    /// Neighbors that structurally mate with an open port of the pipe at `pos`
    pub fn connected_neighbors(&self, pos: GridPosition) -> ArrayVec<(Direction, GridPosition), 4> {
        let Some(pipe) = self.pipe_at(pos) else {
            return ArrayVec::new();
        };

        pipe.open_ports()
            .into_iter()
            .filter_map(|dir| {
                let cell = self.valid_neighbor(pos, dir)?;
                let other = cell.pipe()?;
                other.accepts(dir.opposite()).then_some((dir, cell.position()))
            })
            .collect()
    }

    pub fn is_connected_to_network(&self, pos: GridPosition) -> bool {
        !self.connected_neighbors(pos).is_empty()
    }

    /// Block random cells, then place the start pipe
    ///
    /// Returns the start position. On failure any cells blocked by this call
    /// are unblocked again, leaving the grid as it was.
    pub fn initialize(
        &mut self,
        layout: &GridLayout,
        rng: &mut SimpleRng,
    ) -> Result<GridPosition, GridError> {
        if self.start.is_some() {
            return Err(GridError::AlreadyInitialized);
        }

        let newly_blocked = self.block_random_cells(layout.blocked_percent, rng);
        match self.place_start_pipe(layout.allow_start_on_edge, rng) {
            Ok(pos) => {
                tracing::debug!(
                    start = %pos,
                    blocked = newly_blocked.len(),
                    width = self.width,
                    height = self.height,
                    "grid initialized"
                );
                Ok(pos)
            }
            Err(err) => {
                for pos in newly_blocked {
                    if let Ok(cell) = self.cell_mut(pos) {
                        cell.unblock();
                    }
                }
                Err(err)
            }
        }
    }

    fn block_random_cells(&mut self, percent: f32, rng: &mut SimpleRng) -> Vec<GridPosition> {
        let total = usize::from(self.width) * usize::from(self.height);
        let wanted = (f64::from(percent.clamp(0.0, 100.0)) * total as f64 / 100.0).floor() as usize;

        let mut candidates: Vec<GridPosition> = self.empty_cells().collect();
        rng.shuffle(&mut candidates);
        candidates.truncate(wanted);

        for &pos in &candidates {
            if let Ok(cell) = self.cell_mut(pos) {
                cell.block();
            }
        }
        candidates
    }

    fn place_start_pipe(
        &mut self,
        allow_edge: bool,
        rng: &mut SimpleRng,
    ) -> Result<GridPosition, GridError> {
        let (width, height) = (self.width, self.height);
        let spots: Vec<GridPosition> = self
            .empty_cells()
            .filter(|pos| allow_edge || !pos.is_on_border(width, height))
            .collect();
        let pos = *rng.choose(&spots).ok_or(GridError::NoEmptyCells)?;

        let facings: ArrayVec<Direction, 4> = Direction::ALL
            .into_iter()
            .filter(|&dir| self.valid_neighbor(pos, dir).is_some())
            .collect();
        let facing = *rng
            .choose(&facings)
            .ok_or(GridError::NoValidDirection(pos))?;

        self.place_start(pos, facing)?;
        Ok(pos)
    }

    /// Place the start pipe at a chosen cell, for scripted layouts
    pub fn place_start(&mut self, pos: GridPosition, facing: Direction) -> Result<PipeId, GridError> {
        if self.start.is_some() {
            return Err(GridError::AlreadyInitialized);
        }
        let pipe = self.new_pipe(pos, PipeKind::Start, facing);
        let id = pipe.id();
        self.set_pipe(pipe)?;
        self.start = Some(pos);
        Ok(id)
    }

    /// Remove every pipe except the start pipe, which gets its ports reopened
    pub fn clear(&mut self) {
        let start = self.start;
        for cell in &mut self.cells {
            if Some(cell.position()) == start {
                if let Some(pipe) = cell.pipe_mut() {
                    pipe.reset_ports();
                    pipe.reset_bomb_state();
                }
            } else {
                cell.take_pipe();
            }
        }
    }

    /// Fully uninitialize: no pipes, no blocked cells, no start pipe
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.take_pipe();
            cell.unblock();
        }
        self.start = None;
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cells_where<'a, P>(&'a self, pred: P) -> impl Iterator<Item = &'a GridCell> + 'a
    where
        P: Fn(&GridCell) -> bool + 'a,
    {
        self.cells.iter().filter(move |cell| pred(cell))
    }

    /// Positions of cells that are neither blocked nor occupied, row-major
    pub fn empty_cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.cells_where(GridCell::is_empty).map(GridCell::position)
    }

    pub fn is_initialized(&self) -> bool {
        self.start.is_some()
    }

    pub fn start_position(&self) -> Option<GridPosition> {
        self.start
    }

    pub fn try_start_pipe(&self) -> Option<&Pipe> {
        self.start.and_then(|pos| self.pipe_at(pos))
    }

    /// The start pipe
    ///
    /// # Panics
    ///
    /// Panics if called before [`Grid::initialize`].
    #[track_caller]
    pub fn start_pipe(&self) -> &Pipe {
        match self.try_start_pipe() {
            Some(pipe) => pipe,
            None => panic!("start pipe read before the grid was initialized"),
        }
    }

    /// Whether the pipe at `pos` is the start pipe
    pub fn is_start(&self, pos: GridPosition) -> bool {
        self.start == Some(pos)
    }
}
