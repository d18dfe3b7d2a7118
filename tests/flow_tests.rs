//! Flow tests - fronts moving through hand-built layouts

use pipe_flow::core::{
    DirectionSet, FlowEvent, FlowNetwork, Grid, GridPosition, PipeId, ScoreController,
};
use pipe_flow::types::{Direction, PipeKind};

/// One pipe per tick: speed 100 over a 1 second step
const SPEED: f32 = 100.0;
const STEP: f32 = 1.0;

fn at(grid: &Grid, x: i32, y: i32) -> GridPosition {
    grid.position(x, y).unwrap()
}

fn place(grid: &mut Grid, x: i32, y: i32, kind: PipeKind, facing: Direction) -> PipeId {
    let pos = at(grid, x, y);
    let pipe = grid.new_pipe(pos, kind, facing);
    let id = pipe.id();
    grid.set_pipe(pipe).unwrap();
    id
}

fn tick(flow: &mut FlowNetwork, grid: &mut Grid) -> Vec<FlowEvent> {
    flow.update(grid, STEP, SPEED);
    flow.drain_events().collect()
}

fn run_until_idle(flow: &mut FlowNetwork, grid: &mut Grid) -> Vec<FlowEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        if !flow.has_active_fronts() {
            break;
        }
        events.extend(tick(flow, grid));
    }
    assert!(!flow.has_active_fronts(), "flow did not settle");
    events
}

fn flowed_positions(events: &[FlowEvent]) -> Vec<(u8, u8)> {
    events
        .iter()
        .filter_map(|e| match e {
            FlowEvent::PipeFlowed { position, .. } => Some((position.x(), position.y())),
            _ => None,
        })
        .collect()
}

fn sorted(mut dirs: Vec<Direction>) -> Vec<Direction> {
    dirs.sort();
    dirs
}

/// Start -> Straight -> Straight along one row
fn straight_chain() -> Grid {
    let mut grid = Grid::new(3, 1).unwrap();
    grid.place_start(at(&grid, 0, 0), Direction::Right).unwrap();
    place(&mut grid, 1, 0, PipeKind::Straight, Direction::Right);
    place(&mut grid, 2, 0, PipeKind::Straight, Direction::Right);
    grid
}

#[test]
fn test_straight_chain_advances_pipe_by_pipe() {
    let mut grid = straight_chain();
    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);

    assert_eq!(flowed_positions(&tick(&mut flow, &mut grid)), vec![(0, 0)]);
    assert_eq!(flow.active_fronts()[0].entry, Some(Direction::Left));

    assert_eq!(flowed_positions(&tick(&mut flow, &mut grid)), vec![(1, 0)]);

    let last = tick(&mut flow, &mut grid);
    assert_eq!(flowed_positions(&last), vec![(2, 0)]);
    assert!(matches!(
        last.last(),
        Some(FlowEvent::NoPathAvailable { direction: Direction::Right, .. })
    ));
    assert!(!flow.has_active_fronts());

    // Nothing moves past the last pipe
    assert!(tick(&mut flow, &mut grid).is_empty());

    assert_eq!(grid.start_pipe().used_ports().as_slice(), &[Direction::Right]);
    for x in 1..3 {
        let pipe = grid.pipe_at(at(&grid, x, 0)).unwrap();
        assert!(pipe.open_ports().is_empty(), "pipe at x={x} still has open ports");
    }
}

#[test]
fn test_chain_scores_two_pipes() {
    let mut grid = straight_chain();
    let mut flow = FlowNetwork::new();
    let mut score = ScoreController::new(100, 10);
    flow.initialize(&grid, 0.0);

    for event in run_until_idle(&mut flow, &mut grid) {
        score.handle(&event);
    }
    assert_eq!(score.pipes_flowed(), 2);
    assert_eq!(score.score(), 200);
    assert!(score.game_ended());
}

#[test]
fn test_start_delay_holds_the_front() {
    let mut grid = straight_chain();
    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 1.0);

    flow.update(&mut grid, 0.5, SPEED);
    flow.update(&mut grid, 0.5, SPEED);
    assert!(flow.drain_events().next().is_none());
    assert_eq!(flow.active_fronts()[0].progress, 0.0);
    assert_eq!(flow.active_fronts()[0].delay_remaining, 0.0);

    flow.update(&mut grid, 0.5, SPEED);
    assert_eq!(flow.active_fronts()[0].progress, 50.0);
    flow.update(&mut grid, 0.5, SPEED);
    assert_eq!(flowed_positions(&flow.drain_events().collect::<Vec<_>>()), vec![(0, 0)]);
}

/// Layout (5x3):
///
/// ```text
/// .  |  .  .  .
/// S  +  -  -  .
/// .  .  .  .  .
/// ```
fn cross_with_two_branches() -> Grid {
    let mut grid = Grid::new(5, 3).unwrap();
    grid.place_start(at(&grid, 0, 1), Direction::Right).unwrap();
    place(&mut grid, 1, 1, PipeKind::Cross, Direction::Right);
    place(&mut grid, 2, 1, PipeKind::Straight, Direction::Right);
    place(&mut grid, 3, 1, PipeKind::Straight, Direction::Right);
    place(&mut grid, 1, 0, PipeKind::Straight, Direction::Down);
    grid
}

#[test]
fn test_cross_prefers_longest_branch() {
    let mut grid = cross_with_two_branches();
    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);

    let events = run_until_idle(&mut flow, &mut grid);
    assert_eq!(flowed_positions(&events), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);

    let cross = at(&grid, 1, 1);
    assert_eq!(
        sorted(grid.pipe_at(cross).unwrap().used_ports().to_vec()),
        vec![Direction::Right, Direction::Left]
    );
    assert_eq!(flow.visited_at(cross), DirectionSet::LEFT | DirectionSet::RIGHT);
    // The short branch was never entered
    assert!(!grid.pipe_at(at(&grid, 1, 0)).unwrap().has_used_port());
}

#[test]
fn test_second_front_takes_remaining_cross_exit() {
    let mut grid = cross_with_two_branches();
    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    run_until_idle(&mut flow, &mut grid);

    // Feed the vertical straight from above; it drops into the cross from Up
    assert!(flow.inject_front(&grid, at(&grid, 1, 0), Direction::Up));
    let events = run_until_idle(&mut flow, &mut grid);

    assert_eq!(flowed_positions(&events), vec![(1, 0), (1, 1)]);
    assert!(matches!(
        events.last(),
        Some(FlowEvent::NoPathAvailable { direction: Direction::Down, position, .. })
            if (position.x(), position.y()) == (1, 1)
    ));
    let cross = grid.pipe_at(at(&grid, 1, 1)).unwrap();
    assert!(cross.open_ports().is_empty());
    assert_eq!(cross.used_ports().len(), 4);
}

#[test]
fn test_fronts_in_one_update_see_earlier_commits() {
    // Alone, a front entering the cross from below takes the long branch
    let mut grid = cross_with_two_branches();
    let mut flow = FlowNetwork::new();
    let cross = at(&grid, 1, 1);
    assert!(flow.inject_front(&grid, cross, Direction::Down));
    tick(&mut flow, &mut grid);
    assert_eq!(flow.active_fronts()[0].position, at(&grid, 2, 1));

    // Behind a front from the left, the same entry is forced up
    let mut grid = cross_with_two_branches();
    let mut flow = FlowNetwork::new();
    assert!(flow.inject_front(&grid, cross, Direction::Left));
    assert!(flow.inject_front(&grid, cross, Direction::Down));
    let events = tick(&mut flow, &mut grid);

    assert_eq!(flowed_positions(&events), vec![(1, 1), (1, 1)]);
    assert!(events
        .iter()
        .all(|e| matches!(e, FlowEvent::PipeFlowed { .. })));

    // Successors keep the order of the fronts that spawned them
    let successors: Vec<_> = flow
        .active_fronts()
        .iter()
        .map(|f| ((f.position.x(), f.position.y()), f.entry))
        .collect();
    assert_eq!(
        successors,
        vec![((2, 1), Some(Direction::Left)), ((1, 0), Some(Direction::Down))]
    );

    assert_eq!(flow.visited_at(cross), DirectionSet::all());
    assert_eq!(grid.pipe_at(cross).unwrap().used_ports().len(), 4);
}

/// Layout (4x3), a 2x2 block of crosses fed from the left:
///
/// ```text
/// .  .  .  .
/// S  +  +  .
/// .  +  +  .
/// ```
#[test]
fn test_cross_loop_terminates_without_port_reuse() {
    let mut grid = Grid::new(4, 3).unwrap();
    grid.place_start(at(&grid, 0, 1), Direction::Right).unwrap();
    for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
        place(&mut grid, x, y, PipeKind::Cross, Direction::Right);
    }

    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    let events = run_until_idle(&mut flow, &mut grid);

    assert_eq!(
        flowed_positions(&events),
        vec![(0, 1), (1, 1), (2, 1), (2, 2), (1, 2), (1, 1)]
    );
    assert!(events
        .iter()
        .all(|e| !matches!(e, FlowEvent::FlowStuck { .. })));
    assert!(matches!(
        events.last(),
        Some(FlowEvent::NoPathAvailable { direction: Direction::Up, .. })
    ));

    // One port consumed per entry and per exit: 1 + 4 + 2 + 2 + 2
    let used: usize = grid
        .cells()
        .iter()
        .filter_map(|c| c.pipe())
        .map(|p| p.used_ports().len())
        .sum();
    assert_eq!(used, 11);
    assert_eq!(grid.pipe_at(at(&grid, 1, 1)).unwrap().used_ports().len(), 4);
}

#[test]
fn test_bombing_neighbor_stops_flow() {
    let mut grid = Grid::new(2, 1).unwrap();
    grid.place_start(at(&grid, 0, 0), Direction::Right).unwrap();
    place(&mut grid, 1, 0, PipeKind::Straight, Direction::Right);
    grid.pipe_at_mut(at(&grid, 1, 0))
        .unwrap()
        .start_bomb_animation(0);

    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    let events = tick(&mut flow, &mut grid);

    assert!(matches!(
        events.as_slice(),
        [
            FlowEvent::PipeFlowed { kind: PipeKind::Start, .. },
            FlowEvent::NoPathAvailable { direction: Direction::Right, .. },
        ]
    ));
}

#[test]
fn test_non_accepting_neighbor_is_no_path() {
    let mut grid = Grid::new(2, 1).unwrap();
    grid.place_start(at(&grid, 0, 0), Direction::Right).unwrap();
    place(&mut grid, 1, 0, PipeKind::Straight, Direction::Down);

    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    let events = tick(&mut flow, &mut grid);
    assert!(matches!(events.last(), Some(FlowEvent::NoPathAvailable { .. })));
    assert!(!grid.pipe_at(at(&grid, 1, 0)).unwrap().has_used_port());
}

#[test]
fn test_spent_pipe_leaves_front_stuck() {
    let mut grid = straight_chain();
    grid.pipe_at_mut(at(&grid, 1, 0))
        .unwrap()
        .mark_port_used(Direction::Right);

    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    let events = run_until_idle(&mut flow, &mut grid);

    assert_eq!(flowed_positions(&events), vec![(0, 0)]);
    assert!(matches!(
        events.last(),
        Some(FlowEvent::FlowStuck { position, .. }) if position.x() == 1
    ));
}

#[test]
fn test_clear_forgets_fronts_and_visits() {
    let mut grid = straight_chain();
    let mut flow = FlowNetwork::new();
    flow.initialize(&grid, 0.0);
    tick(&mut flow, &mut grid);
    tick(&mut flow, &mut grid);
    assert!(!flow.visited_ports_snapshot().is_empty());

    flow.clear();
    assert!(!flow.has_active_fronts());
    assert!(flow.visited_ports_snapshot().is_empty());
}
