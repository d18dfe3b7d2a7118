//! Game session - one self-contained game
//!
//! A `GameSession` owns every component of a game and wires their outboxes
//! together: flow events feed the score keeper, completed bombs invalidate the
//! path memo for their cell, and everything ends up in the session outbox in
//! the order it happened. Nothing is shared between sessions.

use serde::Serialize;

use crate::bomb::{BombController, BombEvent};
use crate::error::{BombError, SessionError};
use crate::flow::{FlowEvent, FlowNetwork};
use crate::grid::{Grid, GridLayout};
use crate::pipe::PipeId;
use crate::position::GridPosition;
use crate::queue::{PipeGenerator, PipeQueue, QueueEvent};
use crate::rng::SimpleRng;
use crate::scoring::{GameOutcome, ScoreController, ScoreEvent};
use crate::snapshot::{CellSnapshot, GameSnapshot, ScoreSnapshot, VisitedSnapshot};
use crate::types::GameConfig;

/// Mixed into the seed so layout and piece sequence use different streams
const GENERATOR_SEED_SALT: u32 = 0xA5A5_A5A5;

/// Everything a session publishes, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Flow(FlowEvent),
    Score(ScoreEvent),
    Bomb(BombEvent),
    Queue(QueueEvent),
}

#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seed: u32,
    rng: SimpleRng,
    grid: Grid,
    queue: PipeQueue,
    flow: FlowNetwork,
    score: ScoreController,
    bombs: BombController,
    started: bool,
    stopped: bool,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Validate `config` and build every component; the grid stays uninitialized until [`start`](Self::start)
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, SessionError> {
        config.validate()?;

        let grid = Grid::new(config.grid_width, config.grid_height)?;
        let generator = PipeGenerator::new(&config.pipe_weights, seed ^ GENERATOR_SEED_SALT)?;
        let queue = PipeQueue::new(generator, config.queue_size);
        let score = ScoreController::new(config.points_per_pipe, config.win_target);
        let bombs = BombController::new(config.max_active_bombs, config.bomb_timer_ms);

        Ok(Self {
            config,
            seed,
            rng: SimpleRng::new(seed),
            grid,
            queue,
            flow: FlowNetwork::new(),
            score,
            bombs,
            started: false,
            stopped: false,
            events: Vec::new(),
        })
    }

    /// Lay out the grid and arm the flow
    pub fn start(&mut self) -> Result<GridPosition, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }

        let layout = GridLayout {
            blocked_percent: self.config.blocked_percent,
            allow_start_on_edge: self.config.allow_start_on_edge,
        };
        let start = self.grid.initialize(&layout, &mut self.rng)?;
        self.flow.initialize(&self.grid, self.config.start_delay_secs);
        self.started = true;
        self.stopped = false;

        tracing::info!(seed = self.seed, %start, "session started");
        Ok(start)
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if self.stopped || self.score.game_ended() {
            return Err(SessionError::GameEnded);
        }
        Ok(())
    }

    /// Place the head of the queue at `position`
    ///
    /// The queue only advances when the placement succeeds.
    pub fn place_next(&mut self, position: GridPosition) -> Result<PipeId, SessionError> {
        self.ensure_running()?;
        let item = self.queue.peek().ok_or(SessionError::QueueEmpty)?;

        let pipe = self.grid.new_pipe(position, item.kind, item.facing);
        let id = pipe.id();
        self.grid.set_pipe(pipe)?;

        self.queue.dequeue();
        self.flow.invalidate_path_cache(position);
        self.collect_queue_events();

        tracing::debug!(%position, kind = item.kind.as_str(), facing = item.facing.as_str(), "pipe placed");
        Ok(id)
    }

    /// Arm a bomb under the pipe at `position`
    pub fn start_bomb(&mut self, position: GridPosition, now_ms: u64) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.bombs.check_start(&self.grid, &self.queue, position)?;
        // A front may have just spawned into a pipe without consuming its entry yet
        if self.flow.is_occupied(position) {
            return Err(BombError::PipeBlocked(position).into());
        }
        self.bombs
            .start_bomb(&mut self.grid, &self.queue, position, now_ms)?;
        self.events
            .extend(self.bombs.drain_events().map(GameEvent::Bomb));
        Ok(())
    }

    /// Advance the simulation by `delta_secs`; `now_ms` drives bomb timers
    pub fn tick(&mut self, delta_secs: f32, now_ms: u64) {
        if self.ensure_running().is_err() {
            return;
        }

        self.flow
            .update(&mut self.grid, delta_secs, self.config.flow_speed);
        for event in self.flow.drain_events() {
            self.score.handle(&event);
            self.events.push(GameEvent::Flow(event));
        }
        self.events
            .extend(self.score.drain_events().map(GameEvent::Score));

        self.bombs.update(&mut self.grid, &mut self.queue, now_ms);
        for event in self.bombs.drain_events() {
            if let BombEvent::Completed { position, .. } = event {
                self.flow.invalidate_path_cache(position);
            }
            self.events.push(GameEvent::Bomb(event));
        }
        self.collect_queue_events();
    }

    fn collect_queue_events(&mut self) {
        self.events
            .extend(self.queue.drain_events().map(GameEvent::Queue));
    }

    /// Disarm bombs and freeze the session
    pub fn stop(&mut self) {
        self.bombs.cancel_all(&mut self.grid);
        self.stopped = true;
        tracing::info!(score = self.score.score(), "session stopped");
    }

    /// Tear everything down and start over on a fresh layout
    pub fn restart(&mut self) -> Result<GridPosition, SessionError> {
        self.bombs.cancel_all(&mut self.grid);
        self.bombs.drain_events().for_each(drop);
        self.grid.reset();
        self.flow.clear();
        self.flow.drain_events().for_each(drop);
        self.score.reset();
        self.events.clear();
        self.started = false;
        self.stopped = false;
        self.start()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn queue(&self) -> &PipeQueue {
        &self.queue
    }

    pub fn flow(&self) -> &FlowNetwork {
        &self.flow
    }

    pub fn score(&self) -> &ScoreController {
        &self.score
    }

    pub fn bombs(&self) -> &BombController {
        &self.bombs
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Started, not stopped, and no outcome yet
    pub fn is_running(&self) -> bool {
        self.ensure_running().is_ok()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.score.outcome()
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            started: self.started,
            running: self.is_running(),
            start: self.grid.start_position(),
            cells: self.grid.cells().iter().map(CellSnapshot::from).collect(),
            queue: self.queue.contents().copied().collect(),
            fronts: self.flow.active_fronts().to_vec(),
            visited: self
                .flow
                .visited_ports_snapshot()
                .into_iter()
                .map(VisitedSnapshot::from)
                .collect(),
            score: ScoreSnapshot::from(&self.score),
            bombs: self.bombs.active_bombs().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigError;

    fn config() -> GameConfig {
        GameConfig {
            grid_width: 6,
            grid_height: 5,
            blocked_percent: 0.0,
            start_delay_secs: 0.0,
            ..GameConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = GameConfig {
            win_target: 0,
            ..config()
        };
        let err = GameSession::new(bad, 1).unwrap_err();
        assert_eq!(err, SessionError::Config(ConfigError::ZeroWinTarget));
    }

    #[test]
    fn lifecycle_guards() {
        let mut session = GameSession::new(config(), 7).unwrap();
        let any = GridPosition::create(0, 0, 6, 5).unwrap();
        assert_eq!(session.place_next(any), Err(SessionError::NotStarted));

        session.start().unwrap();
        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
        assert!(session.is_running());

        session.stop();
        assert!(!session.is_running());
        assert_eq!(session.place_next(any), Err(SessionError::GameEnded));
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = GameSession::new(config(), 99).unwrap();
        let mut b = GameSession::new(config(), 99).unwrap();
        assert_eq!(a.start().unwrap(), b.start().unwrap());
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
