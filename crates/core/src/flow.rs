//! Flow simulation - fronts of water advancing through placed pipes
//!
//! Each [`FlowFront`] is one packet of flow inside one pipe. Every call to
//! [`FlowNetwork::update`] processes the current fronts in order and builds the
//! next generation:
//!
//! 1. a front still in its start delay only counts down
//! 2. a front that just arrived consumes its entry port and picks an exit
//! 3. progress advances by `speed * delta`, clamped to 100
//! 4. crossing 50 commits the entry side to the visited map
//! 5. reaching 100 commits and consumes the exit, reports the pipe as flowed,
//!    and spawns a front in the neighbor on the other side of the exit
//!
//! Branch points (only Cross has more than one way out) take the exit with the
//! longest chain of traversable pipes behind it, first-seen winning ties. The
//! search is a memoized DFS keyed by `(position, entry)`; the memo lives for one
//! `update` call so grid edits between ticks are always seen.
//!
//! The network never fails. A front that cannot go on ends with a
//! [`FlowEvent::FlowStuck`] or [`FlowEvent::NoPathAvailable`] in the outbox.

use std::collections::{HashMap, HashSet};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::pipe::PipeId;
use crate::position::GridPosition;
use crate::shape::PortSet;
use crate::types::{Direction, PipeKind, FULL_PROGRESS, HALF_PROGRESS};

bitflags! {
    /// Sides of one pipe that flow has committed to
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DirectionSet: u8 {
        const RIGHT = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const UP    = 1 << 3;
    }
}

impl DirectionSet {
    pub const fn of(direction: Direction) -> Self {
        Self::from_bits_retain(1 << direction.index())
    }

    pub fn has(self, direction: Direction) -> bool {
        self.contains(Self::of(direction))
    }

    /// Members in `Direction::ALL` order
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.has(d))
    }
}

impl From<Direction> for DirectionSet {
    fn from(direction: Direction) -> Self {
        Self::of(direction)
    }
}

/// One packet of flow inside one pipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowFront {
    pub position: GridPosition,
    pub pipe: PipeId,
    /// Side the flow came in through; None for the front leaving the start pipe
    pub entry: Option<Direction>,
    /// Chosen way out, set once the entry has been committed
    pub exit: Option<Direction>,
    /// Fill level, 0..=100
    pub progress: f32,
    /// Seconds left before this front starts moving
    pub delay_remaining: f32,
}

/// Memoized result of the longest-path search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathChoice {
    pub direction: Option<Direction>,
    /// Number of traversable pipes behind `direction`
    pub length: u32,
}

/// Notifications published by the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowEvent {
    /// Flow has passed completely through a pipe
    PipeFlowed {
        pipe: PipeId,
        position: GridPosition,
        kind: PipeKind,
    },
    /// A front entered a pipe it cannot leave
    FlowStuck {
        pipe: PipeId,
        position: GridPosition,
    },
    /// A front left through `direction` into nothing it could enter
    NoPathAvailable {
        pipe: PipeId,
        position: GridPosition,
        direction: Direction,
    },
}

/// The traversal engine
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    fronts: Vec<FlowFront>,
    /// Ports committed by any front; persists until `clear`
    visited: HashMap<GridPosition, DirectionSet>,
    /// Per-tick memo, shared by every front processed in one `update`
    path_cache: HashMap<(GridPosition, Option<Direction>), PathChoice>,
    events: Vec<FlowEvent>,
}

impl FlowNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and spawn the first front at the start pipe
    pub fn initialize(&mut self, grid: &Grid, delay_secs: f32) {
        self.clear();

        let Some(start) = grid.try_start_pipe() else {
            tracing::warn!("flow initialized before the grid has a start pipe");
            return;
        };
        let Some(exit) = start.open_ports().first().copied() else {
            tracing::error!(position = %start.position(), "start pipe has no open port");
            return;
        };

        self.fronts.push(FlowFront {
            position: start.position(),
            pipe: start.id(),
            entry: None,
            exit: Some(exit),
            progress: 0.0,
            delay_remaining: delay_secs.max(0.0),
        });
        tracing::debug!(position = %start.position(), ?exit, delay_secs, "flow armed");
    }

    /// Start an extra front entering the pipe at `position` through `entry`
    ///
    /// Returns false when there is no pipe there or it has no port on that side.
    pub fn inject_front(&mut self, grid: &Grid, position: GridPosition, entry: Direction) -> bool {
        let Some(pipe) = grid.pipe_at(position) else {
            return false;
        };
        if !pipe.accepts(entry) {
            return false;
        }
        self.fronts.push(FlowFront {
            position,
            pipe: pipe.id(),
            entry: Some(entry),
            exit: None,
            progress: 0.0,
            delay_remaining: 0.0,
        });
        true
    }

    /// Advance every front by `delta_secs` at `speed` progress points per second
    pub fn update(&mut self, grid: &mut Grid, delta_secs: f32, speed: f32) {
        self.path_cache.clear();

        let fronts = std::mem::take(&mut self.fronts);
        let mut next = Vec::with_capacity(fronts.len());
        for front in fronts {
            self.step_front(grid, front, delta_secs, speed, &mut next);
        }
        self.fronts = next;
    }

    fn step_front(
        &mut self,
        grid: &mut Grid,
        mut front: FlowFront,
        delta_secs: f32,
        speed: f32,
        next: &mut Vec<FlowFront>,
    ) {
        if front.delay_remaining > 0.0 {
            front.delay_remaining = (front.delay_remaining - delta_secs).max(0.0);
            next.push(front);
            return;
        }

        if let (Some(entry), None) = (front.entry, front.exit) {
            if !self.commit_entry(grid, &front, entry) {
                self.stuck(&front);
                return;
            }
            match self.select_exit(grid, front.position, front.entry) {
                Some(exit) => front.exit = Some(exit),
                None => {
                    self.stuck(&front);
                    return;
                }
            }
        }

        let before = front.progress;
        front.progress = (front.progress + speed * delta_secs).min(FULL_PROGRESS);

        if before < HALF_PROGRESS && front.progress >= HALF_PROGRESS {
            if let Some(entry) = front.entry {
                self.visit(front.position, entry);
            }
        }

        if front.progress < FULL_PROGRESS {
            next.push(front);
            return;
        }

        self.complete(grid, &front, next);
    }

    /// Consume the entry port; false if the pipe changed under the front
    fn commit_entry(&mut self, grid: &mut Grid, front: &FlowFront, entry: Direction) -> bool {
        let Some(pipe) = grid.pipe_at_mut(front.position) else {
            tracing::warn!(position = %front.position, "front lost its pipe");
            return false;
        };
        if pipe.id() != front.pipe || pipe.is_bombing() {
            tracing::warn!(position = %front.position, "front pipe was replaced or is being bombed");
            return false;
        }
        if let Err(err) = pipe.try_mark_port_used(entry) {
            tracing::error!(error = %err, "front entered through a missing port");
            return false;
        }
        true
    }

    fn complete(&mut self, grid: &mut Grid, front: &FlowFront, next: &mut Vec<FlowFront>) {
        let Some(pipe) = grid.pipe_at_mut(front.position) else {
            tracing::warn!(position = %front.position, "completed front has no pipe");
            return;
        };
        if let Some(exit) = front.exit {
            if let Err(err) = pipe.try_mark_port_used(exit) {
                tracing::error!(error = %err, "front left through a missing port");
            }
        }
        let kind = pipe.kind();

        if let Some(exit) = front.exit {
            self.visit(front.position, exit);
        }
        tracing::debug!(position = %front.position, kind = kind.as_str(), "pipe flowed");
        self.events.push(FlowEvent::PipeFlowed {
            pipe: front.pipe,
            position: front.position,
            kind,
        });

        let Some(exit) = front.exit else {
            return;
        };
        match Self::traversable_neighbor(grid, front.position, exit) {
            Some((position, pipe)) => next.push(FlowFront {
                position,
                pipe,
                entry: Some(exit.opposite()),
                exit: None,
                progress: 0.0,
                delay_remaining: 0.0,
            }),
            None => {
                tracing::debug!(position = %front.position, direction = exit.as_str(), "no path");
                self.events.push(FlowEvent::NoPathAvailable {
                    pipe: front.pipe,
                    position: front.position,
                    direction: exit,
                });
            }
        }
    }

    fn stuck(&mut self, front: &FlowFront) {
        tracing::debug!(position = %front.position, "flow stuck");
        self.events.push(FlowEvent::FlowStuck {
            pipe: front.pipe,
            position: front.position,
        });
    }

    fn visit(&mut self, position: GridPosition, direction: Direction) {
        *self.visited.entry(position).or_default() |= DirectionSet::of(direction);
    }

    /// The pipe flow would enter when leaving `position` through `exit`
    ///
    /// Blocked cells, empty cells, bombing pipes and pipes without a port
    /// facing back all stop the flow.
    fn traversable_neighbor(
        grid: &Grid,
        position: GridPosition,
        exit: Direction,
    ) -> Option<(GridPosition, PipeId)> {
        let cell = grid.valid_neighbor(position, exit)?;
        let pipe = cell.pipe()?;
        if pipe.is_bombing() || !pipe.accepts(exit.opposite()) {
            return None;
        }
        Some((cell.position(), pipe.id()))
    }

    /// Open ports other than `entry` that no front has committed to
    fn candidates(&self, grid: &Grid, position: GridPosition, entry: Option<Direction>) -> PortSet {
        let Some(pipe) = grid.pipe_at(position) else {
            return PortSet::new();
        };
        let visited = self.visited.get(&position).copied().unwrap_or_default();
        pipe.open_ports()
            .into_iter()
            .filter(|&dir| Some(dir) != entry && !visited.has(dir))
            .collect()
    }

    fn select_exit(
        &mut self,
        grid: &Grid,
        position: GridPosition,
        entry: Option<Direction>,
    ) -> Option<Direction> {
        let available = self.candidates(grid, position, entry);
        match available.as_slice() {
            [] => None,
            [only] => Some(*only),
            [first, ..] => {
                let mut in_path = HashSet::new();
                let choice = self.longest_path(grid, position, entry, &mut in_path);
                match choice.direction {
                    Some(dir) if available.contains(&dir) => Some(dir),
                    _ => Some(*first),
                }
            }
        }
    }

    fn longest_path(
        &mut self,
        grid: &Grid,
        position: GridPosition,
        entry: Option<Direction>,
        in_path: &mut HashSet<GridPosition>,
    ) -> PathChoice {
        if let Some(hit) = self.path_cache.get(&(position, entry)) {
            return *hit;
        }

        let candidates = self.candidates(grid, position, entry);
        in_path.insert(position);

        let mut best = PathChoice::default();
        for dir in candidates {
            let Some((next, _)) = Self::traversable_neighbor(grid, position, dir) else {
                continue;
            };
            if in_path.contains(&next) {
                continue;
            }
            let length = 1 + self.longest_path(grid, next, Some(dir.opposite()), in_path).length;
            if length > best.length {
                best = PathChoice {
                    direction: Some(dir),
                    length,
                };
            }
        }

        in_path.remove(&position);
        self.path_cache.insert((position, entry), best);
        best
    }

    /// Live fronts, in processing order
    pub fn active_fronts(&self) -> &[FlowFront] {
        &self.fronts
    }

    pub fn has_active_fronts(&self) -> bool {
        !self.fronts.is_empty()
    }

    /// Whether some front is currently inside the pipe at `position`
    pub fn is_occupied(&self, position: GridPosition) -> bool {
        self.fronts.iter().any(|f| f.position == position)
    }

    /// Committed ports per pipe, sorted by position
    pub fn visited_ports_snapshot(&self) -> Vec<(GridPosition, DirectionSet)> {
        let mut out: Vec<_> = self.visited.iter().map(|(&pos, &dirs)| (pos, dirs)).collect();
        out.sort_unstable_by_key(|&(pos, _)| pos);
        out
    }

    pub fn visited_at(&self, position: GridPosition) -> DirectionSet {
        self.visited.get(&position).copied().unwrap_or_default()
    }

    /// Forget memoized paths starting at `position`
    pub fn invalidate_path_cache(&mut self, position: GridPosition) {
        self.path_cache.retain(|&(pos, _), _| pos != position);
    }

    /// Drop fronts, visited ports and memo; pending events are kept
    pub fn clear(&mut self) {
        self.fronts.clear();
        self.visited.clear();
        self.path_cache.clear();
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, FlowEvent> {
        self.events.drain(..)
    }
}
