//! Bombs - timed destruction and replacement of placed pipes
//!
//! A bomb can only go off under a pipe water has not touched yet. When its
//! timer runs out the pipe is removed and the head of the queue takes its
//! place. The replacement shown when the bomb started is only a preview: the
//! piece actually placed is whatever is at the head of the queue on completion.

use serde::Serialize;

use crate::error::BombError;
use crate::grid::Grid;
use crate::pipe::PipeId;
use crate::position::GridPosition;
use crate::queue::{PipeQueue, QueueItem};
use crate::types::{Direction, PipeKind, DEFAULT_BOMB_TIMER_MS, DEFAULT_MAX_ACTIVE_BOMBS};

/// A bomb waiting for its timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveBomb {
    pub position: GridPosition,
    pub pipe: PipeId,
    pub start_ms: u64,
    /// Head of the queue when the bomb was started
    pub replacement: QueueItem,
}

/// Bomb notifications, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BombEvent {
    Started {
        position: GridPosition,
        duration_ms: u64,
    },
    Completed {
        position: GridPosition,
        pipe: PipeId,
        kind: PipeKind,
        facing: Direction,
    },
}

#[derive(Debug, Clone)]
pub struct BombController {
    max_active: usize,
    timer_ms: u64,
    active: Vec<ActiveBomb>,
    events: Vec<BombEvent>,
}

impl Default for BombController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE_BOMBS, DEFAULT_BOMB_TIMER_MS)
    }
}

impl BombController {
    pub fn new(max_active: usize, timer_ms: u64) -> Self {
        Self {
            max_active,
            timer_ms,
            active: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn timer_ms(&self) -> u64 {
        self.timer_ms
    }

    /// Validate a bomb under the pipe at `position` without arming it
    ///
    /// Checks run in order: bomb limit, start pipe, missing pipe, water
    /// already through it, bomb already ticking, empty queue. Returns the
    /// previewed replacement.
    pub fn check_start(
        &self,
        grid: &Grid,
        queue: &PipeQueue,
        position: GridPosition,
    ) -> Result<QueueItem, BombError> {
        if self.active.len() >= self.max_active {
            return Err(BombError::MaxBombsReached {
                max: self.max_active,
            });
        }
        if grid.is_start(position) {
            return Err(BombError::CannotBombStartPipe);
        }
        let pipe = grid.pipe_at(position).ok_or(BombError::NoPipe(position))?;
        if pipe.has_used_port() {
            return Err(BombError::PipeBlocked(position));
        }
        if pipe.is_bombing() {
            return Err(BombError::AlreadyBombing(position));
        }
        queue.peek().ok_or(BombError::QueueEmpty)
    }

    /// Arm a bomb under the pipe at `position`
    pub fn start_bomb(
        &mut self,
        grid: &mut Grid,
        queue: &PipeQueue,
        position: GridPosition,
        now_ms: u64,
    ) -> Result<(), BombError> {
        let replacement = self.check_start(grid, queue, position)?;
        let pipe = grid
            .pipe_at_mut(position)
            .ok_or(BombError::NoPipe(position))?;

        pipe.start_bomb_animation(now_ms);
        self.active.push(ActiveBomb {
            position,
            pipe: pipe.id(),
            start_ms: now_ms,
            replacement,
        });
        tracing::debug!(%position, timer_ms = self.timer_ms, "bomb started");
        self.events.push(BombEvent::Started {
            position,
            duration_ms: self.timer_ms,
        });
        Ok(())
    }

    /// Complete every bomb whose timer has run out; returns how many went off
    pub fn update(&mut self, grid: &mut Grid, queue: &mut PipeQueue, now_ms: u64) -> usize {
        let timer_ms = self.timer_ms;
        let (done, pending): (Vec<ActiveBomb>, Vec<ActiveBomb>) = self
            .active
            .drain(..)
            .partition(|bomb| now_ms.saturating_sub(bomb.start_ms) >= timer_ms);
        self.active = pending;

        let mut completed = 0;
        for bomb in done {
            if self.complete(grid, queue, &bomb) {
                completed += 1;
            }
        }
        completed
    }

    fn complete(&mut self, grid: &mut Grid, queue: &mut PipeQueue, bomb: &ActiveBomb) -> bool {
        match grid.pipe_at_mut(bomb.position) {
            Some(pipe) if pipe.id() == bomb.pipe => pipe.reset_bomb_state(),
            _ => {
                tracing::warn!(position = %bomb.position, "bombed pipe vanished before the timer ran out");
                return false;
            }
        }
        grid.remove_pipe(bomb.position);

        let item = queue.dequeue();
        if item != bomb.replacement {
            tracing::debug!(
                position = %bomb.position,
                previewed = bomb.replacement.kind.as_str(),
                placed = item.kind.as_str(),
                "bomb replacement differs from preview"
            );
        }

        let pipe = grid.new_pipe(bomb.position, item.kind, item.facing);
        let id = pipe.id();
        if let Err(err) = grid.set_pipe(pipe) {
            tracing::error!(error = %err, code = err.code(), "failed to place bomb replacement");
            return false;
        }

        tracing::debug!(position = %bomb.position, kind = item.kind.as_str(), "bomb completed");
        self.events.push(BombEvent::Completed {
            position: bomb.position,
            pipe: id,
            kind: item.kind,
            facing: item.facing,
        });
        true
    }

    /// Disarm every bomb without replacing anything
    pub fn cancel_all(&mut self, grid: &mut Grid) {
        for bomb in self.active.drain(..) {
            if let Some(pipe) = grid.pipe_at_mut(bomb.position) {
                if pipe.id() == bomb.pipe {
                    pipe.reset_bomb_state();
                }
            }
        }
    }

    pub fn active_bombs(&self) -> &[ActiveBomb] {
        &self.active
    }

    /// Timer progress of the bomb at `position`, 0..=1
    pub fn progress_at(&self, grid: &Grid, position: GridPosition, now_ms: u64) -> Option<f32> {
        let bomb = self.active.iter().find(|b| b.position == position)?;
        let pipe = grid.pipe_at(bomb.position)?;
        Some(pipe.bomb_progress(now_ms, self.timer_ms))
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, BombEvent> {
        self.events.drain(..)
    }
}
