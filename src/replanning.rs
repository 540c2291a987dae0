use crate::algorithms::{Path, PathfindingAlgorithm};
use crate::error::{PathfindingError, Result};
use crate::grid::{Grid, ObstacleSchedule, Position};
use crate::statistics::ReplanStats;
use log::{debug, warn};

/// Supplies a fresh snapshot of obstacles before each planning attempt.
///
/// Any `FnMut() -> impl IntoIterator<Item = Position>` closure is a source.
pub trait ObstacleSource {
    fn next_obstacles(&mut self) -> Vec<Position>;

    /// Schedule matching the snapshot just returned by `next_obstacles`, with
    /// step 0 at the snapshot's moment. `None` keeps the grid's schedule.
    fn next_schedule(&mut self) -> Option<ObstacleSchedule> {
        None
    }
}

impl<F, I> ObstacleSource for F
where
    F: FnMut() -> I,
    I: IntoIterator<Item = Position>,
{
    fn next_obstacles(&mut self) -> Vec<Position> {
        self().into_iter().collect()
    }
}

/// Reruns a search against refreshed obstacles until it succeeds or attempts run out.
pub struct Replanner<A: PathfindingAlgorithm> {
    grid: Grid,
    algorithm: A,
    last_stats: ReplanStats,
}

impl<A: PathfindingAlgorithm> Replanner<A> {
    pub fn new(grid: Grid, algorithm: A) -> Self {
        Replanner {
            grid,
            algorithm,
            last_stats: ReplanStats::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Counts from the most recent `find_path_with_updates` call.
    pub fn last_stats(&self) -> ReplanStats {
        self.last_stats
    }

    /// Pulls obstacles from `source`, installs them as the grid's static set
    /// (plus its schedule, if it offers one) and searches, up to `max_attempts`
    /// times.
    ///
    /// A blocked endpoint or a missing path uses up an attempt and triggers a
    /// retry. Running out of attempts returns `Ok(None)`. An out-of-bounds
    /// endpoint is returned as an error straight away since no obstacle update
    /// can fix it. `start` and `goal` are never changed here.
    pub fn find_path_with_updates<S>(
        &mut self,
        start: Position,
        goal: Position,
        source: &mut S,
        max_attempts: usize,
    ) -> Result<Option<Path>>
    where
        S: ObstacleSource + ?Sized,
    {
        self.last_stats = ReplanStats::default();

        for attempt in 1..=max_attempts {
            self.last_stats.attempts = attempt;
            self.grid.set_obstacles(source.next_obstacles());
            if let Some(schedule) = source.next_schedule() {
                self.grid.set_schedule(schedule);
            }

            match self.algorithm.find_path(&self.grid, start, goal) {
                Ok(Some(path)) => {
                    debug!(
                        "{} found a path of cost {} on attempt {}/{}",
                        self.algorithm.name(),
                        path.cost(),
                        attempt,
                        max_attempts
                    );
                    self.last_stats.succeeded = true;
                    return Ok(Some(path));
                }
                Ok(None) => {
                    debug!(
                        "attempt {}/{}: no path from {} to {}",
                        attempt, max_attempts, start, goal
                    );
                    self.last_stats.not_found_retries += 1;
                }
                Err(err @ PathfindingError::BlockedEndpoint { .. }) => {
                    debug!("attempt {}/{}: {}", attempt, max_attempts, err);
                    self.last_stats.blocked_endpoint_retries += 1;
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            "giving up on {} -> {} after {} attempt(s)",
            start, goal, max_attempts
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{AStar, TimeIndexedAStar};
    use crate::error::Endpoint;
    use crate::grid::ObstacleSchedule;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn wall() -> Vec<Position> {
        (0..5).map(|y| p(2, y)).collect()
    }

    #[test]
    fn succeeds_on_first_open_snapshot() {
        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let mut source = || Vec::<Position>::new();
        let path = replanner
            .find_path_with_updates(p(0, 0), p(4, 4), &mut source, 3)
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(replanner.last_stats().attempts, 1);
        assert!(replanner.last_stats().succeeded);
    }

    #[test]
    fn retries_until_the_wall_opens() {
        let mut snapshots = vec![wall(), wall(), vec![p(2, 0)]].into_iter();
        let mut source = move || snapshots.next().unwrap_or_default();

        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let path = replanner
            .find_path_with_updates(p(0, 0), p(4, 4), &mut source, 5)
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 8);
        assert!(!path.cells().contains(&p(2, 0)));

        let stats = replanner.last_stats();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.not_found_retries, 2);
        assert!(replanner.grid().is_obstacle(p(2, 0)));
    }

    #[test]
    fn blocked_goal_is_retried() {
        let mut snapshots = vec![vec![p(4, 4)], vec![]].into_iter();
        let mut source = move || snapshots.next().unwrap_or_default();

        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let path = replanner
            .find_path_with_updates(p(0, 0), p(4, 4), &mut source, 2)
            .unwrap();
        assert!(path.is_some());
        assert_eq!(replanner.last_stats().blocked_endpoint_retries, 1);
    }

    #[test]
    fn exhaustion_is_not_an_error() {
        let mut pulls = 0;
        let mut source = || {
            pulls += 1;
            wall()
        };
        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let result = replanner.find_path_with_updates(p(0, 0), p(4, 4), &mut source, 4);
        assert_eq!(result, Ok(None));
        assert_eq!(pulls, 4);
        assert_eq!(replanner.last_stats().failures(), 4);
        assert!(!replanner.last_stats().succeeded);
    }

    #[test]
    fn zero_attempts_never_pulls() {
        let mut pulls = 0;
        let mut source = || {
            pulls += 1;
            Vec::<Position>::new()
        };
        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let result = replanner.find_path_with_updates(p(0, 0), p(4, 4), &mut source, 0);
        assert_eq!(result, Ok(None));
        assert_eq!(pulls, 0);
    }

    #[test]
    fn out_of_bounds_is_not_retried() {
        let mut pulls = 0;
        let mut source = || {
            pulls += 1;
            Vec::<Position>::new()
        };
        let mut replanner = Replanner::new(Grid::new(5, 5).unwrap(), AStar);
        let err = replanner
            .find_path_with_updates(p(0, 0), p(5, 5), &mut source, 3)
            .unwrap_err();
        assert_eq!(err.endpoint(), Some(Endpoint::Goal));
        assert_eq!(pulls, 1);
    }

    #[test]
    fn keeps_the_schedule_for_time_indexed_search() {
        let schedule: ObstacleSchedule = [(1, vec![p(1, 0), p(0, 1)])].into_iter().collect();
        let grid = Grid::new(3, 3).unwrap().with_schedule(schedule);
        let mut replanner = Replanner::new(grid, TimeIndexedAStar);
        let mut source = || Vec::<Position>::new();
        let result = replanner.find_path_with_updates(p(0, 0), p(2, 2), &mut source, 2);
        assert_eq!(result, Ok(None));
        assert_eq!(replanner.last_stats().not_found_retries, 2);
    }

    struct ShiftingSchedule {
        pulls: u32,
    }

    impl ObstacleSource for ShiftingSchedule {
        fn next_obstacles(&mut self) -> Vec<Position> {
            self.pulls += 1;
            Vec::new()
        }

        fn next_schedule(&mut self) -> Option<ObstacleSchedule> {
            // The exits from the corner are blocked one step ahead on the first pull only.
            let step = if self.pulls == 1 { 1 } else { 0 };
            Some([(step, vec![p(1, 0), p(0, 1)])].into_iter().collect())
        }
    }

    #[test]
    fn installs_a_fresh_schedule_with_each_snapshot() {
        let mut replanner = Replanner::new(Grid::new(3, 3).unwrap(), TimeIndexedAStar);
        let mut source = ShiftingSchedule { pulls: 0 };
        let path = replanner
            .find_path_with_updates(p(0, 0), p(2, 2), &mut source, 3)
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 4);
        assert_eq!(replanner.last_stats().attempts, 2);
        assert_eq!(replanner.grid().schedule().and_then(|s| s.last_step()), Some(0));
    }
}
