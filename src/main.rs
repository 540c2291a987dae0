use clap::Parser;

use dynamic_astar::config::Config;
use dynamic_astar::simulation::{Simulation, StepOutcome};
use std::io::Write;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let config = Config::parse();

    println!("Starting pathfinding simulation...");
    println!("Grid size: {}x{}", config.width, config.height);
    println!(
        "Walls: {}, Obstacles per group: {}",
        config.num_walls, config.num_obstacles
    );
    println!("Mode: {:?}", config.mode);
    if let Some(seed) = config.seed {
        println!("Seed: {}", seed);
    }
    println!();

    let mut simulation = match Simulation::new(config.clone()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("Failed to create simulation: {}", e);
            eprintln!("Try reducing --num-walls or increasing the grid size");
            std::process::exit(1);
        }
    };

    if !config.no_visualization {
        while !simulation.is_finished() {
            let outcome = simulation.step();

            print!("\x1B[2J\x1B[1;1H");
            println!("=== PATHFINDING SIMULATION ===");
            println!(
                "Tick: {} | Agent: {} | Goal: {}",
                simulation.tick(),
                simulation.position(),
                simulation.scenario().goal
            );
            println!("Last step: {:?}", outcome);
            println!("{}", simulation.render());

            if matches!(outcome, StepOutcome::Stuck | StepOutcome::Arrived) {
                break;
            }
            std::thread::sleep(Duration::from_millis(config.delay_ms));
        }
    }

    let stats = simulation.run();

    println!("\n=== FINAL RESULTS ===");
    println!("{}", stats);
    if stats.reached_goal {
        let extra_moves = stats.total_moves.saturating_sub(stats.optimal_path_length);
        println!("Extra moves due to obstacles: {}", extra_moves);
    } else {
        std::process::exit(2);
    }
}
