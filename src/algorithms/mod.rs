pub mod a_star;
pub mod common;
pub mod time_indexed;

pub use a_star::{search, AStar, GridSpace};
pub use common::{validate_endpoints, Path, PathfindingAlgorithm, SearchSpace};
pub use time_indexed::{SpaceTimeGrid, TimeIndexedAStar, TimedPosition};
