//! Shortest paths on a 4-connected grid with static obstacles and obstacles
//! scheduled at particular time steps.
//!
//! [`find_path`] and [`find_path_time_indexed`] cover the one-shot cases.
//! [`replanning::Replanner`] repeats a search against refreshed obstacle
//! snapshots, and [`simulation`] drives an agent through a moving-obstacle
//! world with it.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod grid;
pub mod replanning;
pub mod simulation;
pub mod statistics;

pub use algorithms::{AStar, Path, PathfindingAlgorithm, TimeIndexedAStar};
pub use error::{Endpoint, PathfindingError, Result};
pub use grid::{Grid, ObstacleSchedule, Position};
pub use replanning::{ObstacleSource, Replanner};

/// Shortest path around static `obstacles` on a `width` x `height` grid.
///
/// Returns `Ok(None)` when the goal cannot be reached.
pub fn find_path<I>(
    width: i32,
    height: i32,
    start: Position,
    goal: Position,
    obstacles: I,
) -> Result<Option<Vec<Position>>>
where
    I: IntoIterator<Item = Position>,
{
    let grid = Grid::with_obstacles(width, height, obstacles)?;
    let path = AStar.find_path(&grid, start, goal)?;
    Ok(path.map(Path::into_cells))
}

/// Shortest path that also avoids cells scheduled in `dynamic_obstacles` at
/// the step the agent would occupy them. Step 0 is the start.
pub fn find_path_time_indexed<I>(
    width: i32,
    height: i32,
    start: Position,
    goal: Position,
    static_obstacles: I,
    dynamic_obstacles: ObstacleSchedule,
) -> Result<Option<Vec<Position>>>
where
    I: IntoIterator<Item = Position>,
{
    let grid =
        Grid::with_obstacles(width, height, static_obstacles)?.with_schedule(dynamic_obstacles);
    let path = TimeIndexedAStar.find_path(&grid, start, goal)?;
    Ok(path.map(Path::into_cells))
}
