//! Placed pipes
//!
//! A pipe owns its rotated ports and a used flag per port. The port set is
//! fixed at construction; only the used flags and the bomb sub-state change
//! afterwards.
//!
//! Two predicates are deliberately kept apart:
//! - [`Pipe::accepts`] is geometric: is there a port on that side at all
//! - [`Pipe::has_open_port`] also requires that no front has used it yet

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::error::PortError;
use crate::position::GridPosition;
use crate::shape::{PipeShape, PortSet};
use crate::types::{Direction, PipeKind};

/// Identity of a constructed pipe, unique within one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipeId(pub u32);

/// One directional connection point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Port {
    pub direction: Direction,
    pub used: bool,
}

/// Timed-destruction sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BombState {
    pub is_bombing: bool,
    pub start_ms: Option<u64>,
}

/// A piece placed on the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    id: PipeId,
    position: GridPosition,
    kind: PipeKind,
    facing: Direction,
    ports: ArrayVec<Port, 4>,
    bomb: BombState,
}

impl Pipe {
    /// Build a pipe with all ports open
    pub fn new(id: PipeId, position: GridPosition, kind: PipeKind, facing: Direction) -> Self {
        let ports = PipeShape::of(kind)
            .ports_facing(facing)
            .into_iter()
            .map(|direction| Port {
                direction,
                used: false,
            })
            .collect();

        Self {
            id,
            position,
            kind,
            facing,
            ports,
            bomb: BombState::default(),
        }
    }

    pub fn id(&self) -> PipeId {
        self.id
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn kind(&self) -> PipeKind {
        self.kind
    }

    pub fn shape(&self) -> &'static PipeShape {
        PipeShape::of(self.kind)
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Whether `direction` is one of this pipe's ports, used or not
    pub fn accepts(&self, direction: Direction) -> bool {
        self.ports.iter().any(|p| p.direction == direction)
    }

    /// Whether `direction` is a port no front has used yet
    pub fn has_open_port(&self, direction: Direction) -> bool {
        self.ports
            .iter()
            .any(|p| p.direction == direction && !p.used)
    }

    pub fn open_ports(&self) -> PortSet {
        self.ports
            .iter()
            .filter(|p| !p.used)
            .map(|p| p.direction)
            .collect()
    }

    pub fn used_ports(&self) -> PortSet {
        self.ports
            .iter()
            .filter(|p| p.used)
            .map(|p| p.direction)
            .collect()
    }

    /// Whether water has passed through any port
    pub fn has_used_port(&self) -> bool {
        self.ports.iter().any(|p| p.used)
    }

    /// Blocked pipes can no longer be replaced: water touched them or a bomb is ticking
    pub fn is_blocked(&self) -> bool {
        self.has_used_port() || self.bomb.is_bombing
    }

    /// Mark a port as used, failing if `direction` is not a port
    pub fn try_mark_port_used(&mut self, direction: Direction) -> Result<(), PortError> {
        match self.ports.iter_mut().find(|p| p.direction == direction) {
            Some(port) => {
                port.used = true;
                Ok(())
            }
            None => Err(PortError::InvalidPort {
                position: self.position,
                direction,
            }),
        }
    }

    /// Mark a port as used; marking an already used port is a no-op
    ///
    /// # Panics
    ///
    /// Panics if `direction` is not one of this pipe's ports. Callers only
    /// ever pass directions taken from the pipe's own port list.
    #[track_caller]
    pub fn mark_port_used(&mut self, direction: Direction) {
        if let Err(err) = self.try_mark_port_used(direction) {
            panic!("{err}");
        }
    }

    /// Reopen every port
    pub(crate) fn reset_ports(&mut self) {
        for port in &mut self.ports {
            port.used = false;
        }
    }

    pub fn bomb_state(&self) -> BombState {
        self.bomb
    }

    pub fn is_bombing(&self) -> bool {
        self.bomb.is_bombing
    }

    pub fn start_bomb_animation(&mut self, now_ms: u64) {
        self.bomb = BombState {
            is_bombing: true,
            start_ms: Some(now_ms),
        };
    }

    /// Fraction of the bomb timer elapsed, clamped to `[0, 1]`
    pub fn bomb_progress(&self, now_ms: u64, duration_ms: u64) -> f32 {
        let Some(start_ms) = self.bomb.start_ms else {
            return 0.0;
        };
        if duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(start_ms) as f64;
        (elapsed / duration_ms as f64).clamp(0.0, 1.0) as f32
    }

    pub fn reset_bomb_state(&mut self) {
        self.bomb = BombState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(kind: PipeKind, facing: Direction) -> Pipe {
        Pipe::new(PipeId(1), GridPosition::new_unchecked(2, 2), kind, facing)
    }

    #[test]
    fn straight_facing_down_is_vertical() {
        let p = pipe(PipeKind::Straight, Direction::Down);
        assert!(p.accepts(Direction::Up));
        assert!(p.accepts(Direction::Down));
        assert!(!p.accepts(Direction::Left));
        assert_eq!(p.open_ports().len(), 2);
        assert!(p.used_ports().is_empty());
    }

    #[test]
    fn used_port_still_accepts_but_is_not_open() {
        let mut p = pipe(PipeKind::Straight, Direction::Right);
        p.mark_port_used(Direction::Left);

        assert!(p.accepts(Direction::Left));
        assert!(!p.has_open_port(Direction::Left));
        assert!(p.has_open_port(Direction::Right));
        assert_eq!(p.used_ports().as_slice(), &[Direction::Left]);
        assert_eq!(p.open_ports().as_slice(), &[Direction::Right]);
        assert_eq!(p.ports().len(), 2);
    }

    #[test]
    fn mark_port_used_is_idempotent() {
        let mut p = pipe(PipeKind::Cross, Direction::Up);
        p.mark_port_used(Direction::Down);
        p.mark_port_used(Direction::Down);
        assert_eq!(p.used_ports().len(), 1);
        assert_eq!(p.open_ports().len(), 3);
    }

    #[test]
    fn try_mark_rejects_missing_port() {
        let mut p = pipe(PipeKind::Corner, Direction::Right);
        let err = p.try_mark_port_used(Direction::Down).unwrap_err();
        assert_eq!(err.code(), "invalid_port");
        assert!(!p.has_used_port());
    }

    #[test]
    #[should_panic(expected = "has no port facing")]
    fn mark_missing_port_panics() {
        let mut p = pipe(PipeKind::Start, Direction::Right);
        p.mark_port_used(Direction::Left);
    }

    #[test]
    fn blocked_by_use_or_bomb() {
        let mut p = pipe(PipeKind::Corner, Direction::Left);
        assert!(!p.is_blocked());

        p.start_bomb_animation(1_000);
        assert!(p.is_blocked());
        assert!(p.is_bombing());

        p.reset_bomb_state();
        assert!(!p.is_blocked());

        p.mark_port_used(Direction::Down);
        assert!(p.is_blocked());
    }

    #[test]
    fn bomb_progress_is_clamped() {
        let mut p = pipe(PipeKind::Straight, Direction::Right);
        assert_eq!(p.bomb_progress(500, 1_000), 0.0);

        p.start_bomb_animation(1_000);
        assert_eq!(p.bomb_progress(500, 1_000), 0.0);
        assert_eq!(p.bomb_progress(1_500, 1_000), 0.5);
        assert_eq!(p.bomb_progress(9_000, 1_000), 1.0);
        assert_eq!(p.bomb_state().start_ms, Some(1_000));

        p.reset_bomb_state();
        assert_eq!(p.bomb_state(), BombState::default());
    }
}
