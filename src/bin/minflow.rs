//! Command-line driver: read a DIMACS `.min` file, solve, report.
//!
//! Exit codes: 0 on an optimal solve, 1 on any solver or file error, 2 on
//! bad arguments (from the argument parser). `MCF_VERBOSE=1` turns on
//! configuration logging.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use minflow::io::{read_dimacs_min_file, write_solution};
use minflow::validate::validate;
use minflow::{
    CostScaling, FlowProblem, NetworkSimplex, PivotRule, ScalingMethod, Solution, SolverConfig,
    SupplyType,
};

#[derive(Debug, Parser)]
#[command(name = "minflow", version, about = "Minimum-cost flow solver for DIMACS .min files")]
struct Args {
    /// Input problem in DIMACS .min format.
    input: PathBuf,

    /// Solver engine.
    #[arg(short, long, value_enum, default_value_t = Engine::Simplex)]
    engine: Engine,

    /// Entering-arc rule for the simplex engine; the default analyzes the
    /// problem and picks one.
    #[arg(long, value_enum)]
    pivot: Option<PivotArg>,

    /// Inner-loop method for the cost-scaling engine.
    #[arg(long, value_enum, default_value_t = MethodArg::PartialAugment)]
    method: MethodArg,

    /// Supply constraint interpretation.
    #[arg(long, value_enum, default_value_t = SupplyArg::Geq)]
    supply_type: SupplyArg,

    /// Write the solution to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include node potentials in the solution output.
    #[arg(long)]
    potentials: bool,

    /// Re-check the solution (bounds, conservation, slackness, cost).
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    Simplex,
    CostScaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PivotArg {
    Block,
    First,
    Best,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Push,
    Augment,
    PartialAugment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SupplyArg {
    Geq,
    Leq,
}

fn main() -> ExitCode {
    let filter = if std::env::var("MCF_VERBOSE").as_deref() == Ok("1") {
        EnvFilter::new("minflow=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("minflow: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let instance = read_dimacs_min_file(&args.input).map_err(|e| e.to_string())?;
    let mut problem = instance.problem();
    problem.set_supply_type(match args.supply_type {
        SupplyArg::Geq => SupplyType::Geq,
        SupplyArg::Leq => SupplyType::Leq,
    });

    match args.engine {
        Engine::Simplex => {
            let mut solver = match args.pivot {
                None => NetworkSimplex::auto_configured(&problem),
                Some(pivot) => {
                    let config = SolverConfig {
                        pivot_rule: match pivot {
                            PivotArg::Block => PivotRule::BlockSearch,
                            PivotArg::First => PivotRule::FirstEligible,
                            PivotArg::Best => PivotRule::BestEligible,
                        },
                        ..SolverConfig::default()
                    };
                    NetworkSimplex::with_config(&problem, config)
                }
            };
            let status = solver.solve();
            match solver.solution() {
                Ok(solution) => report(args, &problem, &solution),
                Err(_) => Err(format!("no optimal solution: {status:?}")),
            }
        }
        Engine::CostScaling => {
            let method = match args.method {
                MethodArg::Push => ScalingMethod::Push,
                MethodArg::Augment => ScalingMethod::Augment,
                MethodArg::PartialAugment => ScalingMethod::PartialAugment,
            };
            let mut solver = CostScaling::with_method(&problem, method);
            let status = solver.solve();
            match solver.solution() {
                Ok(solution) => report(args, &problem, &solution),
                Err(_) => Err(format!("no optimal solution: {status:?}")),
            }
        }
    }
}

fn report(args: &Args, problem: &FlowProblem<'_>, solution: &Solution<'_>) -> Result<(), String> {
    if args.validate {
        validate(problem, solution).map_err(|e| e.to_string())?;
    }
    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
            write_solution(std::io::BufWriter::new(file), solution, args.potentials)
                .map_err(|e| e.to_string())
        }
        None => {
            let stdout = std::io::stdout();
            write_solution(stdout.lock(), solution, args.potentials).map_err(|e| e.to_string())
        }
    }
}
