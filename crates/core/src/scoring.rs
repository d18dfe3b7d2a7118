//! Scoring module - turns flow events into score and a win/lose outcome
//!
//! Every distinct non-start pipe that flow passes through is worth a fixed
//! number of points, counted once per pipe id. Reaching the win target ends the
//! game as won; a stuck or dead-ended front before that ends it as lost.
//! Either outcome is reported exactly once.

use std::collections::HashSet;

use serde::Serialize;

use crate::flow::FlowEvent;
use crate::pipe::PipeId;
use crate::types::{PipeKind, DEFAULT_POINTS_PER_PIPE, DEFAULT_WIN_TARGET};

/// Why a game was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoseReason {
    FlowStuck,
    NoPath,
}

impl LoseReason {
    pub fn code(self) -> &'static str {
        match self {
            LoseReason::FlowStuck => "flow_stuck",
            LoseReason::NoPath => "no_path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Won,
    Lost(LoseReason),
}

/// Score notifications, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreEvent {
    ScoreUpdated { score: u32, pipes_flowed: u32 },
    Won,
    Lost(LoseReason),
}

/// Points for `pipes` counted pipes
pub fn calculate_score(pipes: u32, points_per_pipe: u32) -> u32 {
    pipes.saturating_mul(points_per_pipe)
}

/// Share of the win target reached, clamped to 0..=100
pub fn progress_percent(pipes: u32, win_target: u32) -> f32 {
    if win_target == 0 {
        return 100.0;
    }
    (pipes as f32 / win_target as f32 * 100.0).min(100.0)
}

/// Score keeper fed by [`FlowEvent`]s
#[derive(Debug, Clone)]
pub struct ScoreController {
    points_per_pipe: u32,
    win_target: u32,
    score: u32,
    pipes_flowed: u32,
    counted: HashSet<PipeId>,
    outcome: Option<GameOutcome>,
    events: Vec<ScoreEvent>,
}

impl Default for ScoreController {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_PER_PIPE, DEFAULT_WIN_TARGET)
    }
}

impl ScoreController {
    pub fn new(points_per_pipe: u32, win_target: u32) -> Self {
        Self {
            points_per_pipe,
            win_target,
            score: 0,
            pipes_flowed: 0,
            counted: HashSet::new(),
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Route one flow event to the matching handler
    pub fn handle(&mut self, event: &FlowEvent) {
        match *event {
            FlowEvent::PipeFlowed { pipe, kind, .. } => self.on_pipe_flowed(pipe, kind),
            FlowEvent::FlowStuck { .. } => self.on_flow_stuck(),
            FlowEvent::NoPathAvailable { .. } => self.on_no_path_available(),
        }
    }

    pub fn on_pipe_flowed(&mut self, pipe: PipeId, kind: PipeKind) {
        if self.game_ended() || kind == PipeKind::Start {
            return;
        }
        if !self.counted.insert(pipe) {
            return;
        }

        self.pipes_flowed += 1;
        self.score = calculate_score(self.pipes_flowed, self.points_per_pipe);
        self.events.push(ScoreEvent::ScoreUpdated {
            score: self.score,
            pipes_flowed: self.pipes_flowed,
        });

        if self.pipes_flowed >= self.win_target {
            tracing::info!(score = self.score, pipes = self.pipes_flowed, "game won");
            self.outcome = Some(GameOutcome::Won);
            self.events.push(ScoreEvent::Won);
        }
    }

    pub fn on_flow_stuck(&mut self) {
        self.lose(LoseReason::FlowStuck);
    }

    pub fn on_no_path_available(&mut self) {
        self.lose(LoseReason::NoPath);
    }

    fn lose(&mut self, reason: LoseReason) {
        if self.game_ended() || self.pipes_flowed >= self.win_target {
            return;
        }
        tracing::info!(reason = reason.code(), score = self.score, "game lost");
        self.outcome = Some(GameOutcome::Lost(reason));
        self.events.push(ScoreEvent::Lost(reason));
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pipes_flowed(&self) -> u32 {
        self.pipes_flowed
    }

    pub fn win_target(&self) -> u32 {
        self.win_target
    }

    pub fn target_score(&self) -> u32 {
        calculate_score(self.win_target, self.points_per_pipe)
    }

    pub fn progress_percent(&self) -> f32 {
        progress_percent(self.pipes_flowed, self.win_target)
    }

    pub fn game_ended(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Clear score, counted pipes and outcome; pending events are dropped too
    pub fn reset(&mut self) {
        self.score = 0;
        self.pipes_flowed = 0;
        self.counted.clear();
        self.outcome = None;
        self.events.clear();
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ScoreEvent> {
        self.events.drain(..)
    }
}
