use crate::algorithms::a_star::search;
use crate::algorithms::common::{validate_endpoints, Path, PathfindingAlgorithm, SearchSpace};
use crate::error::Result;
use crate::grid::{Grid, Position};

/// A cell together with the time step at which it is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimedPosition {
    pub pos: Position,
    pub step: u32,
}

/// The grid unrolled over time: every move advances the clock by one step.
///
/// Past the last scheduled step all layers look the same, so the step is
/// capped at `horizon` (last step + 1). This keeps the state space finite and
/// lets an unreachable goal terminate the search.
pub struct SpaceTimeGrid<'a> {
    grid: &'a Grid,
    horizon: u32,
}

impl<'a> SpaceTimeGrid<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        let horizon = grid
            .schedule()
            .and_then(|schedule| schedule.last_step())
            .map_or(0, |last| last.saturating_add(1));
        SpaceTimeGrid { grid, horizon }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }
}

impl SearchSpace for SpaceTimeGrid<'_> {
    type Node = TimedPosition;

    fn origin(&self, start: Position) -> TimedPosition {
        TimedPosition {
            pos: start,
            step: 0,
        }
    }

    fn position(&self, node: TimedPosition) -> Position {
        node.pos
    }

    fn successors(&self, node: TimedPosition, out: &mut Vec<TimedPosition>) {
        let step = node.step.saturating_add(1).min(self.horizon);
        out.extend(
            self.grid
                .neighbors(node.pos, Some(node.step))
                .into_iter()
                .map(|pos| TimedPosition { pos, step }),
        );
    }
}

/// A* over (position, time step) nodes, honouring the grid's obstacle schedule.
///
/// Reaching the goal cell at any step counts as success. The agent always
/// moves; there is no wait-in-place action.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeIndexedAStar;

impl TimeIndexedAStar {
    pub fn new() -> Self {
        TimeIndexedAStar
    }
}

impl PathfindingAlgorithm for TimeIndexedAStar {
    fn find_path(&self, grid: &Grid, start: Position, goal: Position) -> Result<Option<Path>> {
        validate_endpoints(grid, start, goal, Some(0))?;
        Ok(search(&SpaceTimeGrid::new(grid), start, goal))
    }

    fn name(&self) -> &'static str {
        "time_indexed_a_star"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Endpoint, PathfindingError};
    use crate::grid::ObstacleSchedule;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn schedule<const N: usize>(entries: [(u32, Vec<Position>); N]) -> ObstacleSchedule {
        entries.into_iter().collect()
    }

    fn assert_avoids_schedule(grid: &Grid, path: &Path) {
        for (step, cell) in path.cells().iter().enumerate() {
            assert!(
                !grid.is_blocked(*cell, Some(step as u32)),
                "{} is blocked at step {}",
                cell,
                step
            );
        }
    }

    #[test]
    fn horizon_follows_last_scheduled_step() {
        let grid = Grid::new(4, 4).unwrap();
        assert_eq!(SpaceTimeGrid::new(&grid).horizon(), 0);

        let grid = grid.with_schedule(schedule([(3, vec![p(1, 1)]), (9, vec![p(2, 2)])]));
        assert_eq!(SpaceTimeGrid::new(&grid).horizon(), 10);
    }

    #[test]
    fn matches_static_search_without_schedule() {
        let grid = Grid::with_obstacles(8, 8, [p(2, 2), p(5, 5)]).unwrap();
        let path = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(7, 7))
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 14);
    }

    #[test]
    fn avoids_obstacle_scheduled_on_the_only_shortest_route() {
        // A 1-wide corridor: the direct route passes (2, 0) at step 2. With it
        // blocked then, the agent has to step back and forth once to arrive later.
        let grid = Grid::new(5, 1)
            .unwrap()
            .with_schedule(schedule([(2, vec![p(2, 0)])]));
        let path = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(4, 0))
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 6);
        assert_avoids_schedule(&grid, &path);

        // Same corridor, obstacle appears one step too late.
        let grid = Grid::new(5, 1)
            .unwrap()
            .with_schedule(schedule([(3, vec![p(2, 0)])]));
        let path = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(4, 0))
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 4);
    }

    #[test]
    fn moving_obstacle_forces_detour() {
        let grid = Grid::new(3, 3)
            .unwrap()
            .with_schedule(schedule([(1, vec![p(1, 0), p(0, 1)])]));
        let path = TimeIndexedAStar.find_path(&grid, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(path, None);

        let grid = Grid::new(3, 3)
            .unwrap()
            .with_schedule(schedule([(2, vec![p(1, 1), p(2, 0)])]));
        let path = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(2, 2))
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 4);
        assert_avoids_schedule(&grid, &path);
        assert_eq!(path.cells()[2], p(0, 2));
    }

    #[test]
    fn late_obstacle_does_not_matter() {
        let grid = Grid::new(10, 10)
            .unwrap()
            .with_schedule(schedule([(100, vec![p(5, 5)])]));
        let path = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(9, 9))
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 19);
    }

    #[test]
    fn unreachable_goal_terminates() {
        let wall = (0..6).map(|y| p(3, y));
        let grid = Grid::with_obstacles(6, 6, wall)
            .unwrap()
            .with_schedule(schedule([(50, vec![p(0, 1)])]));
        assert_eq!(
            TimeIndexedAStar.find_path(&grid, p(0, 0), p(5, 5)).unwrap(),
            None
        );
    }

    #[test]
    fn goal_blocked_at_step_zero() {
        let grid = Grid::new(5, 5)
            .unwrap()
            .with_schedule(schedule([(0, vec![p(4, 4)])]));
        let err = TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(4, 4))
            .unwrap_err();
        assert_eq!(
            err,
            PathfindingError::BlockedEndpoint {
                endpoint: Endpoint::Goal,
                position: p(4, 4),
            }
        );
    }

    #[test]
    fn start_blocked_only_later_is_fine() {
        let grid = Grid::new(3, 3)
            .unwrap()
            .with_schedule(schedule([(1, vec![p(0, 0)])]));
        assert!(TimeIndexedAStar
            .find_path(&grid, p(0, 0), p(2, 0))
            .unwrap()
            .is_some());
    }
}
