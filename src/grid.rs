use crate::error::{PathfindingError, Result};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::fmt;

/// 4-connected moves, in the order neighbors are reported.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Manhattan distance, the search heuristic.
    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cells blocked only at particular time steps.
///
/// Steps are kept ordered so the last scheduled step is available without
/// walking the whole schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleSchedule {
    steps: BTreeMap<u32, FxHashSet<Position>>,
}

impl ObstacleSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, step: u32, pos: Position) {
        self.steps.entry(step).or_default().insert(pos);
    }

    /// Adds `cells` at `step`. An empty iterator leaves the schedule untouched.
    pub fn extend_step<I>(&mut self, step: u32, cells: I)
    where
        I: IntoIterator<Item = Position>,
    {
        let mut cells = cells.into_iter().peekable();
        if cells.peek().is_some() {
            self.steps.entry(step).or_default().extend(cells);
        }
    }

    pub fn is_blocked_at(&self, pos: Position, step: u32) -> bool {
        self.steps
            .get(&step)
            .map_or(false, |cells| cells.contains(&pos))
    }

    /// The latest step with a registered cell set, if any.
    pub fn last_step(&self) -> Option<u32> {
        self.steps.keys().next_back().copied()
    }

    pub fn cells_at(&self, step: u32) -> Option<&FxHashSet<Position>> {
        self.steps.get(&step)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<I> FromIterator<(u32, I)> for ObstacleSchedule
where
    I: IntoIterator<Item = Position>,
{
    fn from_iter<T: IntoIterator<Item = (u32, I)>>(iter: T) -> Self {
        let mut schedule = ObstacleSchedule::new();
        for (step, cells) in iter {
            schedule.extend_step(step, cells);
        }
        schedule
    }
}

/// Rectangular grid with a static obstacle set and an optional time-indexed schedule.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    obstacles: FxHashSet<Position>,
    schedule: Option<ObstacleSchedule>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(PathfindingError::InvalidDimensions { width, height });
        }
        Ok(Grid {
            width,
            height,
            obstacles: FxHashSet::default(),
            schedule: None,
        })
    }

    /// Builds a grid and installs `obstacles`, dropping any outside the bounds.
    pub fn with_obstacles<I>(width: i32, height: i32, obstacles: I) -> Result<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut grid = Grid::new(width, height)?;
        grid.set_obstacles(obstacles);
        Ok(grid)
    }

    pub fn with_schedule(mut self, schedule: ObstacleSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn obstacles(&self) -> &FxHashSet<Position> {
        &self.obstacles
    }

    pub fn schedule(&self) -> Option<&ObstacleSchedule> {
        self.schedule.as_ref()
    }

    pub fn set_schedule(&mut self, schedule: ObstacleSchedule) {
        self.schedule = Some(schedule);
    }

    pub fn clear_schedule(&mut self) {
        self.schedule = None;
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Out-of-bounds cells are ignored.
    pub fn add_obstacle(&mut self, pos: Position) {
        if self.in_bounds(pos) {
            self.obstacles.insert(pos);
        }
    }

    pub fn remove_obstacle(&mut self, pos: Position) {
        self.obstacles.remove(&pos);
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Replaces the static obstacle set.
    pub fn set_obstacles<I>(&mut self, obstacles: I)
    where
        I: IntoIterator<Item = Position>,
    {
        self.obstacles.clear();
        for pos in obstacles {
            self.add_obstacle(pos);
        }
    }

    /// Static membership only.
    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// True if `pos` is a static obstacle or, when `step` is given, scheduled at that step.
    pub fn is_blocked(&self, pos: Position, step: Option<u32>) -> bool {
        if self.obstacles.contains(&pos) {
            return true;
        }
        match (step, &self.schedule) {
            (Some(step), Some(schedule)) => schedule.is_blocked_at(pos, step),
            _ => false,
        }
    }

    /// Adjacent free cells. With `step`, a cell must be free at arrival time `step + 1`.
    pub fn neighbors(&self, pos: Position, step: Option<u32>) -> Vec<Position> {
        let arrival = step.map(|t| t.saturating_add(1));
        let mut neighbors = Vec::with_capacity(DIRECTIONS.len());

        for (dx, dy) in DIRECTIONS {
            let (Some(x), Some(y)) = (pos.x.checked_add(dx), pos.y.checked_add(dy)) else {
                continue;
            };
            let next_pos = Position { x, y };
            if self.in_bounds(next_pos) && !self.is_blocked(next_pos, arrival) {
                neighbors.push(next_pos);
            }
        }
        neighbors
    }

    /// Text picture of the grid, row 0 first.
    ///
    /// Legend: S=start, G=goal, A=agent, #=obstacle, *=path, .=empty.
    pub fn render(&self, path: &[Position], agent: Option<Position>) -> String {
        let on_path: FxHashSet<Position> = path.iter().copied().collect();
        let start = path.first().copied();
        let goal = path.last().copied();

        let mut out = String::from("   ");
        for x in 0..self.width {
            out.push_str(&format!("{:2}", x % 10));
        }
        out.push('\n');

        for y in 0..self.height {
            out.push_str(&format!("{:2} ", y));
            for x in 0..self.width {
                let pos = Position { x, y };
                let ch = if Some(pos) == agent {
                    'A'
                } else if Some(pos) == start {
                    'S'
                } else if Some(pos) == goal {
                    'G'
                } else if self.obstacles.contains(&pos) {
                    '#'
                } else if on_path.contains(&pos) {
                    '*'
                } else {
                    '.'
                };
                out.push(' ');
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
