use crate::algorithms::{AStar, Path, PathfindingAlgorithm, TimeIndexedAStar};
use crate::config::{Config, SearchMode};
use crate::error::PathfindingError;
use crate::grid::{Grid, ObstacleSchedule, Position};
use crate::replanning::{ObstacleSource, Replanner};
use crate::statistics::SimulationStats;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use std::time::Instant;

#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Pathfinding(#[from] PathfindingError),

    #[error("no path from {start} to {goal} even before obstacles appear")]
    Unreachable { start: Position, goal: Position },
}

/// A reproducible world: fixed walls plus a timeline of obstacle groups.
///
/// Group `i` appears at tick `(i + 1) * obstacle_interval` and stays for
/// `obstacle_persistence` ticks.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub width: i32,
    pub height: i32,
    pub start: Position,
    pub goal: Position,
    pub walls: FxHashSet<Position>,
    pub obstacle_timeline: Vec<FxHashSet<Position>>,
    pub obstacle_interval: usize,
    pub obstacle_persistence: usize,
}

impl Scenario {
    pub fn generate(config: &Config, seed: Option<u64>) -> Result<Self, SimulationError> {
        // Validates the dimensions before any range below can be empty.
        Grid::new(config.width, config.height)?;

        let mut rng = match seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        let (width, height) = (config.width, config.height);
        let half_w = (width / 2).max(1);
        let half_h = (height / 2).max(1);

        // Start in the lower-left quadrant, goal in the upper-right one.
        let start = Position::new(rng.gen_range(0..half_w), rng.gen_range(0..half_h));
        let goal = Position::new(
            rng.gen_range(half_w.min(width - 1)..width),
            rng.gen_range(half_h.min(height - 1)..height),
        );

        let mut walls = FxHashSet::default();
        let mut attempts = 0;
        while walls.len() < config.num_walls && attempts < config.num_walls * 3 {
            let pos = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
            if pos != start && pos != goal {
                walls.insert(pos);
            }
            attempts += 1;
        }

        let interval = config.obstacle_interval.max(1);
        let max_ticks = (width as usize) * (height as usize);
        let mut obstacle_timeline = Vec::with_capacity(max_ticks / interval);

        for _ in 0..max_ticks / interval {
            let mut group = FxHashSet::default();
            let mut attempts = 0;
            while group.len() < config.num_obstacles && attempts < config.num_obstacles * 10 {
                let pos = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
                if pos != start && pos != goal && !walls.contains(&pos) {
                    group.insert(pos);
                }
                attempts += 1;
            }
            obstacle_timeline.push(group);
        }

        info!(
            "generated scenario: start {}, goal {}, {} walls, {} obstacle groups",
            start,
            goal,
            walls.len(),
            obstacle_timeline.len()
        );

        Ok(Scenario {
            width,
            height,
            start,
            goal,
            walls,
            obstacle_timeline,
            obstacle_interval: interval,
            obstacle_persistence: config.obstacle_persistence,
        })
    }

    /// Grid holding only the walls.
    pub fn wall_grid(&self) -> Result<Grid, PathfindingError> {
        Grid::with_obstacles(self.width, self.height, self.walls.iter().copied())
    }

    /// Cells covered by obstacle groups present at `tick`.
    pub fn moving_obstacles_at(&self, tick: usize) -> impl Iterator<Item = Position> + '_ {
        self.obstacle_timeline
            .iter()
            .enumerate()
            .filter(move |(i, _)| {
                let appears = (i + 1) * self.obstacle_interval;
                tick >= appears && tick < appears + self.obstacle_persistence
            })
            .flat_map(|(_, group)| group.iter().copied())
    }

    /// Walls plus the moving obstacles present at `tick`, leaving `occupied` free.
    pub fn obstacles_at(&self, tick: usize, occupied: Position) -> Vec<Position> {
        self.walls
            .iter()
            .copied()
            .chain(self.moving_obstacles_at(tick))
            .filter(|pos| *pos != occupied)
            .collect()
    }

    /// Moving obstacles for ticks `tick ..= tick + lookahead`, keyed by offset
    /// from `tick`. `occupied` is left free at offset 0.
    pub fn forecast(&self, tick: usize, lookahead: u32, occupied: Position) -> ObstacleSchedule {
        let mut schedule = ObstacleSchedule::new();
        for step in 0..=lookahead {
            let cells = self
                .moving_obstacles_at(tick + step as usize)
                .filter(|pos| step > 0 || *pos != occupied);
            schedule.extend_step(step, cells);
        }
        schedule
    }
}

/// Obstacle snapshots for consecutive ticks, one per planning attempt.
///
/// Static planning sees everything present at the snapshot's tick as fixed.
/// Time-indexed planning gets only the walls as fixed, with moving obstacles
/// forecast from that same tick.
struct ScenarioFeed<'a> {
    scenario: &'a Scenario,
    occupied: Position,
    lookahead: Option<u32>,
    next_tick: usize,
    snapshot_tick: usize,
}

impl ObstacleSource for ScenarioFeed<'_> {
    fn next_obstacles(&mut self) -> Vec<Position> {
        self.snapshot_tick = self.next_tick;
        self.next_tick += 1;
        match self.lookahead {
            Some(_) => self.scenario.walls.iter().copied().collect(),
            None => self.scenario.obstacles_at(self.snapshot_tick, self.occupied),
        }
    }

    fn next_schedule(&mut self) -> Option<ObstacleSchedule> {
        self.lookahead
            .map(|lookahead| self.scenario.forecast(self.snapshot_tick, lookahead, self.occupied))
    }
}

/// What one simulation tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { to: Position },
    Waited { ticks: usize },
    Arrived,
    Stuck,
}

/// Walks an agent from start to goal one cell per tick, replanning every tick.
pub struct Simulation {
    scenario: Scenario,
    replanner: Replanner<Box<dyn PathfindingAlgorithm>>,
    config: Config,
    position: Position,
    tick: usize,
    stuck_ticks: usize,
    last_path: Option<Path>,
    stats: SimulationStats,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        let scenario = Scenario::generate(&config, config.seed)?;
        Self::with_scenario(config, scenario)
    }

    pub fn with_scenario(config: Config, scenario: Scenario) -> Result<Self, SimulationError> {
        let grid = scenario.wall_grid()?;

        let optimal_path_length = AStar
            .find_path(&grid, scenario.start, scenario.goal)?
            .map(|path| path.cost())
            .ok_or(SimulationError::Unreachable {
                start: scenario.start,
                goal: scenario.goal,
            })?;

        let algorithm: Box<dyn PathfindingAlgorithm> = match config.mode {
            SearchMode::Static => Box::new(AStar::new()),
            SearchMode::TimeIndexed => Box::new(TimeIndexedAStar::new()),
        };
        let stats = SimulationStats::new(algorithm.name(), optimal_path_length);

        Ok(Simulation {
            position: scenario.start,
            scenario,
            replanner: Replanner::new(grid, algorithm),
            config,
            tick: 0,
            stuck_ticks: 0,
            last_path: None,
            stats,
        })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_ref()
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.scenario.goal || self.stuck_ticks > self.config.max_stuck_ticks
    }

    /// Plans from the current position and moves one cell along the result.
    ///
    /// Each failed planning attempt costs the agent one tick of waiting while
    /// the obstacle snapshot moves on to the next tick. The move made after a
    /// successful attempt lands on the tick after that attempt's snapshot.
    pub fn step(&mut self) -> StepOutcome {
        if self.position == self.scenario.goal {
            self.stats.reached_goal = true;
            return StepOutcome::Arrived;
        }
        if self.stuck_ticks > self.config.max_stuck_ticks {
            return StepOutcome::Stuck;
        }

        let mut feed = ScenarioFeed {
            scenario: &self.scenario,
            occupied: self.position,
            lookahead: match self.config.mode {
                SearchMode::Static => None,
                SearchMode::TimeIndexed => Some(self.config.lookahead),
            },
            next_tick: self.tick,
            snapshot_tick: self.tick,
        };

        let started = Instant::now();
        let result = self.replanner.find_path_with_updates(
            self.position,
            self.scenario.goal,
            &mut feed,
            self.config.max_attempts,
        );
        self.stats.find_path_times.push(started.elapsed());

        let attempts = self.replanner.last_stats().attempts;
        self.stats.replans += attempts;

        match result {
            Ok(Some(path)) => {
                let waited = attempts.saturating_sub(1);
                self.tick += attempts;
                self.stats.waits += waited;
                self.stuck_ticks = 0;

                let outcome = match path.next_step() {
                    Some(next) => {
                        self.position = next;
                        self.stats.total_moves += 1;
                        StepOutcome::Moved { to: next }
                    }
                    None => StepOutcome::Arrived,
                };
                self.last_path = Some(path);
                if self.position == self.scenario.goal {
                    self.stats.reached_goal = true;
                }
                outcome
            }
            Ok(None) => {
                let waited = attempts.max(1);
                self.tick += waited;
                self.stats.waits += waited;
                self.stuck_ticks += 1;
                self.last_path = None;
                debug!(
                    "agent at {} waiting, tick {} ({} stuck tick(s))",
                    self.position, self.tick, self.stuck_ticks
                );
                StepOutcome::Waited { ticks: waited }
            }
            Err(err) => {
                warn!("planning failed at tick {}: {}", self.tick, err);
                self.stuck_ticks = self.config.max_stuck_ticks + 1;
                StepOutcome::Stuck
            }
        }
    }

    /// Steps until the goal is reached, the agent gets stuck, or the tick budget runs out.
    pub fn run(&mut self) -> SimulationStats {
        let max_ticks = (self.scenario.width as usize) * (self.scenario.height as usize) * 4;

        while !self.is_finished() && self.tick < max_ticks {
            if let StepOutcome::Stuck = self.step() {
                break;
            }
        }

        if self.position == self.scenario.goal {
            self.stats.reached_goal = true;
            info!("agent reached {} at tick {}", self.scenario.goal, self.tick);
        } else {
            warn!(
                "agent stopped at {} after {} ticks without reaching {}",
                self.position, self.tick, self.scenario.goal
            );
        }

        self.stats.calculate_efficiency();
        self.stats.clone()
    }

    /// Current grid state with the agent and its latest plan overlaid.
    pub fn render(&self) -> String {
        let path = self
            .last_path
            .as_ref()
            .map(|path| path.cells().to_vec())
            .unwrap_or_else(|| vec![self.scenario.start, self.scenario.goal]);
        let mut grid = self.replanner.grid().clone();
        grid.set_obstacles(self.scenario.obstacles_at(self.tick, self.position));
        grid.render(&path, Some(self.position))
    }
}
