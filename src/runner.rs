use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::core::{GameEvent, GameSession, GridPosition, Pipe, PipeId};
use crate::types::{GameConfig, TICK_MS};

/// Default number of ticks: five minutes of game time
pub const DEFAULT_TICKS: u32 = 5 * 60 * 1000 / TICK_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub seed: u32,
    pub ticks: u32,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            config: None,
            seed: 1,
            ticks: DEFAULT_TICKS,
        }
    }
}

/// Parse `--config <path>`, `--seed <u32>` and `--ticks <u32>`
pub fn parse_run_args(args: &[String]) -> Result<RunArgs> {
    let mut out = RunArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                out.config = Some(PathBuf::from(v));
            }
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                out.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--ticks" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --ticks"))?;
                out.ticks = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --ticks value: {}", v))?;
            }
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(out)
}

/// Read a JSON config file, or fall back to defaults; missing fields take their defaults
pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow!("config {}: {} ({})", path.display(), e, e.code()))?;
    Ok(config)
}

/// Where the greedy placer wants the head of the queue
///
/// Each front that has chosen an exit is heading for the cell behind it; the
/// first such empty cell is the target. If the head piece has no port facing
/// back at the front, it is dumped on the first empty cell nobody is heading
/// for instead, to cycle the queue.
pub fn next_placement(session: &GameSession) -> Option<GridPosition> {
    let grid = session.grid();
    let head = session.queue().peek()?;

    let targets: Vec<(GridPosition, _)> = session
        .flow()
        .active_fronts()
        .iter()
        .filter_map(|front| {
            let exit = front.exit?;
            let cell = grid.valid_neighbor(front.position, exit)?;
            cell.is_empty().then_some((cell.position(), exit.opposite()))
        })
        .collect();

    let &(target, entry) = targets.first()?;
    let probe = Pipe::new(PipeId(0), target, head.kind, head.facing);
    if probe.accepts(entry) {
        return Some(target);
    }
    grid.empty_cells()
        .find(|pos| targets.iter().all(|&(t, _)| t != *pos))
}

/// Counters from one headless run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub ticks: u32,
    pub placements: u32,
    pub events: u32,
}

/// Drive `session` for at most `ticks` fixed steps, placing pieces greedily
pub fn run(session: &mut GameSession, ticks: u32) -> Result<RunSummary> {
    if !session.started() {
        session.start().context("starting session")?;
    }

    let delta_secs = TICK_MS as f32 / 1000.0;
    let mut summary = RunSummary::default();

    for step in 0..ticks {
        if !session.is_running() {
            break;
        }
        if let Some(pos) = next_placement(session) {
            match session.place_next(pos) {
                Ok(_) => summary.placements += 1,
                Err(err) => tracing::warn!(%pos, code = err.code(), "placement rejected"),
            }
        }

        let now_ms = u64::from(step) * u64::from(TICK_MS);
        session.tick(delta_secs, now_ms);
        summary.ticks += 1;

        for event in session.drain_events() {
            summary.events += 1;
            log_event(&event);
        }
    }

    tracing::info!(
        ticks = summary.ticks,
        placements = summary.placements,
        score = session.score().score(),
        outcome = ?session.outcome(),
        "run finished"
    );
    Ok(summary)
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Queue(_) => tracing::trace!(?event, "event"),
        GameEvent::Score(_) => tracing::info!(?event, "event"),
        _ => tracing::debug!(?event, "event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_defaults_and_overrides() {
        assert_eq!(parse_run_args(&[]).unwrap(), RunArgs::default());

        let parsed = parse_run_args(&args(&["--seed", "42", "--ticks", "10", "--config", "a.json"]))
            .unwrap();
        assert_eq!(parsed.seed, 42);
        assert_eq!(parsed.ticks, 10);
        assert_eq!(parsed.config, Some(PathBuf::from("a.json")));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_run_args(&args(&["--seed"])).is_err());
        assert!(parse_run_args(&args(&["--ticks", "-1"])).is_err());
        assert!(parse_run_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), GameConfig::default());
    }
}
