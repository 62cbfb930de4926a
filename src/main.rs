//! pagesim - demand-paging simulator
//!
//! Usage:
//!   pagesim <config_file>          generate proc<i>.txt trace files
//!   pagesim <frames> <processes>   simulate the traces and print statistics
//!
//! Set `RUST_LOG=debug` to follow the simulation turn by turn.

use env_logger::{Builder, Env};
use log::error;
use pagesim::core::{LoggingObserver, SimulationConfig, Simulator};
use pagesim::generator::{GeneratorConfig, TraceGenerator};
use std::env;
use std::process;

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pagesim");

    match parse_command(args.get(1..).unwrap_or_default()) {
        Command::Generate(config_file) => generate_traces(&config_file),
        Command::Simulate(config) => {
            if let Err(e) = simulate(config) {
                error!("Simulation aborted: {}", e);
                process::exit(1);
            }
        }
        Command::Usage => print_usage(program),
        Command::Invalid(message) => {
            eprintln!("Error: {}", message);
            print_usage(program);
            process::exit(1);
        }
    }
}

/// What the command line asks for, decided by argument count
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// One argument: trace generation from a config file
    Generate(String),
    /// Two positive integers: frames and processes
    Simulate(SimulationConfig),
    Usage,
    /// Two arguments that are not both positive integers
    Invalid(String),
}

fn parse_command(args: &[String]) -> Command {
    match args {
        [config_file] => Command::Generate(config_file.clone()),
        [frames, processes] => match parse_simulation_args(frames, processes) {
            Ok(config) => Command::Simulate(config),
            Err(message) => Command::Invalid(message),
        },
        _ => Command::Usage,
    }
}

fn print_usage(program: &str) {
    println!("Usage:");
    println!("  Option 1: {} <config_file>", program);
    println!("            generate proc<i>.txt reference traces");
    println!("  Option 2: {} <frames> <processes>", program);
    println!("            simulate the traces and print statistics");
}

fn parse_positive(name: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} must be a positive integer, got '{}'", name, value)),
    }
}

fn parse_simulation_args(frames: &str, processes: &str) -> Result<SimulationConfig, String> {
    let frames = parse_positive("frame count", frames)?;
    let processes = parse_positive("process count", processes)?;
    Ok(SimulationConfig::new(frames, processes))
}

/// Trace generation failures are reported; nothing is fatal here
fn generate_traces(config_file: &str) {
    let config = match GeneratorConfig::from_file(config_file) {
        Ok(config) => config,
        Err(e) => {
            error!("Error reading configuration file: {}", e);
            return;
        }
    };

    match TraceGenerator::new(config).generate(".") {
        Ok(written) => println!("Generated {} trace file(s)", written.len()),
        Err(e) => error!("Trace generation failed: {}", e),
    }
}

fn simulate(config: SimulationConfig) -> Result<(), pagesim::core::SimError> {
    let mut simulator = Simulator::load(config)?;
    simulator.add_observer(Box::new(LoggingObserver));
    let report = simulator.run()?;
    println!();
    println!("{}", report);
    Ok(())
}
