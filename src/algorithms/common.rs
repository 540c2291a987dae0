use crate::error::{Endpoint, PathfindingError, Result};
use crate::grid::{Grid, Position};
use std::fmt;
use std::hash::Hash;

pub trait PathfindingAlgorithm {
    /// Finds a shortest path from `start` to `goal`.
    ///
    /// `Ok(None)` means no path exists under the grid's current obstacles.
    /// Invalid endpoints are reported through `Err`.
    fn find_path(&self, grid: &Grid, start: Position, goal: Position) -> Result<Option<Path>>;

    fn name(&self) -> &'static str;
}

impl<T: PathfindingAlgorithm + ?Sized> PathfindingAlgorithm for Box<T> {
    fn find_path(&self, grid: &Grid, start: Position, goal: Position) -> Result<Option<Path>> {
        (**self).find_path(grid, start, goal)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// The graph an A* search walks over.
///
/// Static and time-indexed search differ only in the node key and in how
/// successors are produced; the engine itself is shared.
pub trait SearchSpace {
    type Node: Copy + Eq + Hash + fmt::Debug;

    fn origin(&self, start: Position) -> Self::Node;

    fn position(&self, node: Self::Node) -> Position;

    /// Appends every node reachable from `node` in one unit-cost step.
    fn successors(&self, node: Self::Node, out: &mut Vec<Self::Node>);
}

/// Checks bounds for both endpoints, then blockage. Start is always reported before goal.
pub fn validate_endpoints(
    grid: &Grid,
    start: Position,
    goal: Position,
    step: Option<u32>,
) -> Result<()> {
    for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Goal, goal)] {
        if !grid.in_bounds(position) {
            return Err(PathfindingError::OutOfBounds { endpoint, position });
        }
    }
    for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Goal, goal)] {
        if grid.is_blocked(position, step) {
            return Err(PathfindingError::BlockedEndpoint { endpoint, position });
        }
    }
    Ok(())
}

/// A complete route: first cell is the start, last is the goal, one unit step between cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Position>,
}

impl Path {
    pub(crate) fn new(cells: Vec<Position>) -> Self {
        debug_assert!(!cells.is_empty());
        debug_assert!(cells.windows(2).all(|w| w[0].is_adjacent(&w[1])));
        Path { cells }
    }

    pub fn single(pos: Position) -> Self {
        Path { cells: vec![pos] }
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Position> {
        self.cells
    }

    /// Number of cells, always `cost() + 1`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of unit moves.
    pub fn cost(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn start(&self) -> Position {
        self.cells[0]
    }

    pub fn goal(&self) -> Position {
        self.cells[self.cells.len() - 1]
    }

    /// The cell after the start, or `None` when already at the goal.
    pub fn next_step(&self) -> Option<Position> {
        self.cells.get(1).copied()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}
