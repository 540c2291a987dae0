use std::fmt;
use std::time::Duration;

/// Attempt counts from one `find_path_with_updates` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplanStats {
    pub attempts: usize,
    pub blocked_endpoint_retries: usize,
    pub not_found_retries: usize,
    pub succeeded: bool,
}

impl ReplanStats {
    /// Failed attempts of either kind.
    pub fn failures(&self) -> usize {
        self.blocked_endpoint_retries + self.not_found_retries
    }
}

impl fmt::Display for ReplanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempt(s), {} blocked endpoint, {} no path, {}",
            self.attempts,
            self.blocked_endpoint_retries,
            self.not_found_retries,
            if self.succeeded { "succeeded" } else { "exhausted" }
        )
    }
}

#[derive(Debug, Clone)]
pub struct SimulationStats {
    pub algorithm: &'static str,
    pub total_moves: usize,
    pub waits: usize,
    pub replans: usize,
    pub reached_goal: bool,
    pub optimal_path_length: usize,
    pub route_efficiency: f64,
    pub find_path_times: Vec<Duration>,
}

impl SimulationStats {
    pub fn new(algorithm: &'static str, optimal_path_length: usize) -> Self {
        SimulationStats {
            algorithm,
            total_moves: 0,
            waits: 0,
            replans: 0,
            reached_goal: false,
            optimal_path_length,
            route_efficiency: 0.0,
            find_path_times: Vec::new(),
        }
    }

    pub fn calculate_efficiency(&mut self) {
        if self.total_moves > 0 && self.optimal_path_length > 0 {
            self.route_efficiency = self.total_moves as f64 / self.optimal_path_length as f64;
        } else {
            self.route_efficiency = 0.0;
        }
    }

    pub fn average_find_path_time(&self) -> Duration {
        if self.find_path_times.is_empty() {
            Duration::ZERO
        } else {
            let total: Duration = self.find_path_times.iter().sum();
            total / self.find_path_times.len() as u32
        }
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(f, "Reached Goal: {}", self.reached_goal)?;
        writeln!(f, "Total Moves: {}", self.total_moves)?;
        writeln!(f, "Waits: {}", self.waits)?;
        writeln!(f, "Replanning Calls: {}", self.replans)?;
        writeln!(f, "Optimal Path Length: {}", self.optimal_path_length)?;
        writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;
        writeln!(f, "Average find_path time: {:.2?}", self.average_find_path_time())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_is_zero_without_moves() {
        let mut stats = SimulationStats::new("a_star", 10);
        stats.calculate_efficiency();
        assert_eq!(stats.route_efficiency, 0.0);

        stats.total_moves = 15;
        stats.calculate_efficiency();
        assert!((stats.route_efficiency - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn average_time() {
        let mut stats = SimulationStats::new("a_star", 1);
        assert_eq!(stats.average_find_path_time(), Duration::ZERO);
        stats.find_path_times = vec![Duration::from_micros(10), Duration::from_micros(30)];
        assert_eq!(stats.average_find_path_time(), Duration::from_micros(20));
    }

    #[test]
    fn replan_stats_display() {
        let stats = ReplanStats {
            attempts: 3,
            blocked_endpoint_retries: 1,
            not_found_retries: 1,
            succeeded: true,
        };
        assert_eq!(stats.failures(), 2);
        assert_eq!(
            stats.to_string(),
            "3 attempt(s), 1 blocked endpoint, 1 no path, succeeded"
        );
    }
}
