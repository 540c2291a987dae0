use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Plan against the obstacles visible right now.
    Static,
    /// Plan against a forecast of when each obstacle will be present.
    TimeIndexed,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub width: i32,

    #[arg(long, default_value_t = 20)]
    pub height: i32,

    #[arg(long, default_value_t = 50)]
    pub num_walls: usize,

    #[arg(long, default_value_t = 10)]
    pub num_obstacles: usize,

    /// Ticks between two obstacle groups appearing.
    #[arg(long, default_value_t = 5)]
    pub obstacle_interval: usize,

    /// Ticks an obstacle group stays on the grid.
    #[arg(long, default_value_t = 5)]
    pub obstacle_persistence: usize,

    /// Planning attempts per tick before the agent gives up for that tick.
    #[arg(long, default_value_t = 3)]
    pub max_attempts: usize,

    /// Consecutive failed ticks before the simulation stops.
    #[arg(long, default_value_t = 5)]
    pub max_stuck_ticks: usize,

    /// Steps of obstacle forecast handed to the time-indexed planner.
    #[arg(long, default_value_t = 64)]
    pub lookahead: u32,

    #[arg(long, value_enum, default_value_t = SearchMode::Static)]
    pub mode: SearchMode,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 20,
            height: 20,
            num_walls: 50,
            num_obstacles: 10,
            obstacle_interval: 5,
            obstacle_persistence: 5,
            max_attempts: 3,
            max_stuck_ticks: 5,
            lookahead: 64,
            mode: SearchMode::Static,
            seed: None,
            delay_ms: 50,
            no_visualization: true,
        }
    }
}
