//! Session configuration
//!
//! Every value a session needs is a plain field here. Missing fields fall
//! back to the crate defaults when deserializing, so a config file only has
//! to name what it changes:
//!
//! ```
//! use pipe_flow_types::GameConfig;
//!
//! let config: GameConfig = serde_json::from_str(r#"{ "grid_width": 12, "win_target": 20 }"#).unwrap();
//! assert_eq!(config.grid_width, 12);
//! assert_eq!(config.queue_size, pipe_flow_types::DEFAULT_QUEUE_SIZE);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    PipeKind, DEFAULT_BLOCKED_PERCENT, DEFAULT_BOMB_TIMER_MS, DEFAULT_FLOW_SPEED,
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAX_ACTIVE_BOMBS, DEFAULT_POINTS_PER_PIPE,
    DEFAULT_QUEUE_SIZE, DEFAULT_START_DELAY_SECS, DEFAULT_WIN_TARGET, MAX_GRID_SIDE,
    MIN_GRID_SIDE,
};

/// Relative likelihood of a pipe kind coming out of the generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeWeight {
    pub kind: PipeKind,
    pub weight: f32,
}

impl PipeWeight {
    pub const fn new(kind: PipeKind, weight: f32) -> Self {
        Self { kind, weight }
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid dimensions {width}x{height} outside 1..=100")]
    InvalidDimensions { width: u8, height: u8 },

    #[error("blocked percentage {0} outside 0..=100")]
    InvalidBlockedPercent(f32),

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidRate { field: &'static str, value: f32 },

    #[error("weight for {kind:?} must be finite and non-negative, got {weight}")]
    InvalidWeight { kind: PipeKind, weight: f32 },

    #[error("start pipes cannot be generated by the queue")]
    StartKindWeighted,

    #[error("total pipe weight must be positive, got {0}")]
    NonPositiveTotalWeight(f32),

    #[error("win target must be at least one pipe")]
    ZeroWinTarget,
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidDimensions { .. } => "invalid_dimensions",
            ConfigError::InvalidBlockedPercent(_) => "invalid_blocked_percent",
            ConfigError::InvalidRate { .. } => "invalid_rate",
            ConfigError::InvalidWeight { .. } => "invalid_weight",
            ConfigError::StartKindWeighted => "start_kind_weighted",
            ConfigError::NonPositiveTotalWeight(_) => "non_positive_total_weight",
            ConfigError::ZeroWinTarget => "zero_win_target",
        }
    }
}

/// All tunable inputs of a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: u8,
    pub grid_height: u8,
    /// Share of cells blocked during initialization, in percent
    pub blocked_percent: f32,
    /// When false the start pipe never lands on a border cell
    pub allow_start_on_edge: bool,
    /// Generator weights, in draw order
    pub pipe_weights: Vec<PipeWeight>,
    pub queue_size: usize,
    /// Progress units per second; a pipe is full at 100
    pub flow_speed: f32,
    pub start_delay_secs: f32,
    pub max_active_bombs: usize,
    pub bomb_timer_ms: u64,
    pub win_target: u32,
    pub points_per_pipe: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            blocked_percent: DEFAULT_BLOCKED_PERCENT,
            allow_start_on_edge: false,
            pipe_weights: vec![
                PipeWeight::new(PipeKind::Straight, 45.0),
                PipeWeight::new(PipeKind::Corner, 45.0),
                PipeWeight::new(PipeKind::Cross, 10.0),
            ],
            queue_size: DEFAULT_QUEUE_SIZE,
            flow_speed: DEFAULT_FLOW_SPEED,
            start_delay_secs: DEFAULT_START_DELAY_SECS,
            max_active_bombs: DEFAULT_MAX_ACTIVE_BOMBS,
            bomb_timer_ms: DEFAULT_BOMB_TIMER_MS,
            win_target: DEFAULT_WIN_TARGET,
            points_per_pipe: DEFAULT_POINTS_PER_PIPE,
        }
    }
}

impl GameConfig {
    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side_ok = |side: u8| (MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side);
        if !side_ok(self.grid_width) || !side_ok(self.grid_height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        if !(0.0..=100.0).contains(&self.blocked_percent) {
            return Err(ConfigError::InvalidBlockedPercent(self.blocked_percent));
        }

        for (field, value) in [
            ("flow_speed", self.flow_speed),
            ("start_delay_secs", self.start_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRate { field, value });
            }
        }

        let mut total = 0.0;
        for entry in &self.pipe_weights {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    kind: entry.kind,
                    weight: entry.weight,
                });
            }
            if !entry.kind.is_placeable() {
                return Err(ConfigError::StartKindWeighted);
            }
            total += entry.weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::NonPositiveTotalWeight(total));
        }

        if self.win_target == 0 {
            return Err(ConfigError::ZeroWinTarget);
        }

        Ok(())
    }
}
