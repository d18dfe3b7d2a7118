//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules and simulation of a grid pipe puzzle: the
//! player lays pieces drawn from a queue, and water leaving a fixed start pipe
//! flows through whatever connects to it. It has no dependencies on UI,
//! networking, or I/O, making it:
//!
//! - **Deterministic**: the same seed produces the same layout and piece sequence
//! - **Testable**: every component works standalone on a hand-built grid
//! - **Portable**: a presentation layer only needs snapshots and events
//!
//! # Module Structure
//!
//! - [`grid`]: cells, blocked-cell layout, start pipe placement, connectivity
//! - [`pipe`] / [`shape`]: placed pieces, their rotated ports and bomb state
//! - [`queue`]: weighted piece generation and the lookahead queue
//! - [`flow`]: the traversal engine moving fronts of water through pipes
//! - [`scoring`]: points per filled pipe and the win/lose outcome
//! - [`bomb`]: timed destruction and replacement of untouched pipes
//! - [`game_state`]: a session wiring all of the above together
//!
//! # Game Rules
//!
//! - **Ports**: Straight, Corner, Cross and Start pieces expose 2, 2, 4 and 1
//!   ports, rotated to the piece's facing
//! - **Flow**: a front fills a pipe from 0 to 100, then moves to the neighbor
//!   its exit port faces, if that neighbor has a port facing back
//! - **Branches**: at a Cross the front takes the exit with the longest chain
//!   of pipes behind it
//! - **Win**: fill `win_target` distinct pipes
//! - **Lose**: a front gets stuck or runs into nothing before that
//!
//! # Example
//!
//! ```
//! use pipe_flow_core::{GameEvent, GameSession};
//! use pipe_flow_core::types::GameConfig;
//!
//! let config = GameConfig {
//!     start_delay_secs: 0.0,
//!     ..GameConfig::default()
//! };
//! let mut session = GameSession::new(config, 12345).unwrap();
//! session.start().unwrap();
//!
//! // Nothing placed: the start pipe drains into an empty cell
//! for step in 0..400u64 {
//!     session.tick(0.016, step * 16);
//! }
//! assert!(session.outcome().is_some());
//! assert!(session
//!     .drain_events()
//!     .any(|e| matches!(e, GameEvent::Flow(_))));
//! ```
//!
//! # Timing
//!
//! Callers drive the session with a fixed step (16 ms in the headless runner):
//! `tick(delta_secs, now_ms)` moves flow by `flow_speed * delta_secs` progress
//! points and checks bomb timers against the absolute `now_ms`.

pub mod bomb;
pub mod cell;
pub mod error;
pub mod flow;
pub mod game_state;
pub mod grid;
pub mod pipe;
pub mod position;
pub mod queue;
pub mod rng;
pub mod scoring;
pub mod shape;
pub mod snapshot;

pub use pipe_flow_types as types;

// Re-export commonly used types for convenience
pub use bomb::{ActiveBomb, BombController, BombEvent};
pub use cell::GridCell;
pub use error::{BombError, GridError, PortError, QueueError, SessionError};
pub use flow::{DirectionSet, FlowEvent, FlowFront, FlowNetwork};
pub use game_state::{GameEvent, GameSession};
pub use grid::{Grid, GridLayout};
pub use pipe::{BombState, Pipe, PipeId, Port};
pub use position::GridPosition;
pub use queue::{PipeGenerator, PipeQueue, QueueEvent, QueueItem};
pub use rng::SimpleRng;
pub use scoring::{GameOutcome, LoseReason, ScoreController, ScoreEvent};
pub use shape::{PipeShape, PortSet};
pub use snapshot::GameSnapshot;
