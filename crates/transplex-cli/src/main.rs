use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use transplex_solver::{
    Balancing, InstanceGenerator, PenaltyPolicy, ReferenceSolver, ReferenceStatus, RevisedSimplex, SolutionStatus,
    TransportPlan, TransportProblem, Transformer, DEFAULT_PENALTY,
};

/// Size ranges (min inclusive, max exclusive) sampled by `bench`
const BENCH_CASES: [(usize, usize); 9] = [
    (3, 7),
    (7, 15),
    (15, 25),
    (25, 50),
    (50, 75),
    (75, 100),
    (100, 150),
    (150, 200),
    (200, 250),
];

/// Plans are printed only for instances up to this many nodes per side
const PRINT_PLAN_LIMIT: usize = 15;

/// How `solve` treats instances whose supply and demand totals differ
#[derive(Clone, Copy, Debug, ValueEnum)]
enum BalancingMode {
    /// Refuse to solve
    Reject,
    /// Add a zero-cost dummy node that absorbs the difference
    Dummy,
    /// Build the LP anyway and report the leftover artificial mass
    Ignore,
}

impl From<BalancingMode> for Balancing {
    fn from(mode: BalancingMode) -> Self {
        match mode {
            BalancingMode::Reject => Balancing::Reject,
            BalancingMode::Dummy => Balancing::DummyNode,
            BalancingMode::Ignore => Balancing::Ignore,
        }
    }
}

#[derive(Parser)]
#[command(name = "transplex")]
#[command(about = "Solve transportation problems with the revised simplex method", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random balanced instance as JSON
    Generate {
        /// Number of supply nodes
        #[arg(long)]
        supply: usize,
        /// Number of demand nodes
        #[arg(long)]
        demand: usize,
        /// Costs are drawn from [0, max_cost)
        #[arg(long, default_value_t = 1000)]
        max_cost: u32,
        /// Supply and demand values are drawn from [1, max_quantity)
        #[arg(long, default_value_t = 1000)]
        max_quantity: u32,
        /// Seed for reproducible instances
        #[arg(long)]
        seed: Option<u64>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Solve an instance file and print the shipping plan
    Solve {
        /// JSON file with `supply`, `demand` and `cost`
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// What to do with unbalanced instances
        #[arg(long, value_enum, default_value_t = BalancingMode::Reject)]
        balancing: BalancingMode,
        /// Fixed artificial-variable cost instead of one scaled from the costs
        #[arg(long)]
        penalty: Option<f64>,
        /// Scale factor applied to the largest cost when no fixed penalty is given
        #[arg(long, default_value_t = 1000.0)]
        penalty_factor: f64,
        /// Stop after this many pivots
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Zero tolerance for reduced costs and ratio-test pivots
        #[arg(long, default_value_t = 0.0)]
        tolerance: f64,
        /// Also solve with the reference LP solver and compare costs
        #[arg(short, long)]
        reference: bool,
    },
    /// Time the revised simplex against the reference LP solver on random instances
    Bench {
        /// Seed for the instance generator
        #[arg(long, default_value_t = 73)]
        seed: u64,
        /// Number of size ranges to run, smallest first (the largest need a lot of memory)
        #[arg(long, default_value_t = 6)]
        cases: usize,
        #[arg(long, default_value_t = 1000)]
        max_cost: u32,
        #[arg(long, default_value_t = 1000)]
        max_quantity: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            supply,
            demand,
            max_cost,
            max_quantity,
            seed,
            output,
        } => {
            let mut generator = match seed {
                Some(seed) => InstanceGenerator::from_seed(seed),
                None => InstanceGenerator::from_entropy(),
            };
            let problem = match generator.generate(supply, demand, max_cost, max_quantity) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let json = match serde_json::to_string_pretty(&problem) {
                Ok(j) => j,
                Err(e) => {
                    eprintln!("Error serializing instance: {}", e);
                    std::process::exit(1);
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        eprintln!("Error writing {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                }
                None => println!("{}", json),
            }
        }
        Commands::Solve {
            file,
            format,
            balancing,
            penalty,
            penalty_factor,
            max_iterations,
            tolerance,
            reference,
        } => {
            let problem = read_instance(&file);

            let penalty = match penalty {
                Some(value) => PenaltyPolicy::Fixed(value),
                None => PenaltyPolicy::Scaled {
                    factor: penalty_factor,
                    floor: DEFAULT_PENALTY,
                },
            };
            let transformer = Transformer::new().with_penalty(penalty).with_balancing(balancing.into());
            let mut engine = RevisedSimplex::new().with_tolerance(tolerance);
            if let Some(max) = max_iterations {
                engine = engine.with_max_iterations(max);
            }

            log::info!(
                "solving {}x{} instance from {}",
                problem.num_supply(),
                problem.num_demand(),
                file.display()
            );
            let start = Instant::now();
            let (transformed, solution) = match transplex_solver::solve_transport(&problem, &transformer, &engine) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let elapsed = start.elapsed();
            log::info!("{} after {} iterations in {:.4}s", solution.status, solution.iterations(), elapsed.as_secs_f64());

            if format == "json" {
                let plan = solution.plan(&transformed);
                let report = serde_json::json!({
                    "status": solution.status,
                    "iterations": solution.iterations(),
                    "objective_value": solution.objective_value,
                    "penalty": transformed.penalty,
                    "plan": plan,
                });
                match serde_json::to_string_pretty(&report) {
                    Ok(s) => println!("{}", s),
                    Err(e) => {
                        eprintln!("Error serializing solution: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                println!("Problem size: {}x{}", problem.num_supply(), problem.num_demand());
                println!("Penalty: {}", transformed.penalty);
                println!("Iterations: {}", solution.iterations());
                println!("Time: {:.4}s", elapsed.as_secs_f64());
                println!();

                match solution.status {
                    SolutionStatus::Optimal => {
                        println!("Status: OPTIMAL");
                        if let Some(plan) = solution.plan(&transformed) {
                            println!("Total cost: {}", plan.total_cost);
                            if !plan.is_feasible(1e-6) {
                                println!(
                                    "Warning: artificial variables still carry {} units; no feasible plan exists",
                                    plan.artificial_mass
                                );
                            }
                            if let Some(dummy) = plan.dummy {
                                println!("Dummy node: {:?}", dummy);
                            }
                            println!();
                            print_plan(&plan);
                        }
                    }
                    SolutionStatus::Unbounded => {
                        println!("Status: UNBOUNDED");
                        println!("The problem has no finite optimal solution.");
                    }
                }
            }

            if solution.status == SolutionStatus::Unbounded {
                std::process::exit(1);
            }

            if reference {
                let start = Instant::now();
                match ReferenceSolver::new().solve_transport(&transformed.problem) {
                    Ok(r) => {
                        let elapsed = start.elapsed();
                        let reference_cost = r.objective_value.map_or_else(|| "-".to_string(), |c| c.to_string());
                        eprintln!(
                            "Reference: {}, cost = {}, time = {:.4}s",
                            r.status,
                            reference_cost,
                            elapsed.as_secs_f64()
                        );
                        if let (Some(ours), Some(theirs)) = (solution.objective_value, r.objective_value) {
                            let tolerance = 1e-6 * theirs.abs().max(1.0);
                            if r.status == ReferenceStatus::Optimal && (ours - theirs).abs() > tolerance {
                                eprintln!("Mismatch: revised simplex {} vs reference {}", ours, theirs);
                                std::process::exit(1);
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("Reference solver error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Commands::Bench {
            seed,
            cases,
            max_cost,
            max_quantity,
        } => {
            let mut generator = InstanceGenerator::from_seed(seed);
            let transformer = Transformer::new();
            let engine = RevisedSimplex::new();
            let reference = ReferenceSolver::new();

            println!(
                "{:>4} {:>9} {:>12} {:>14} {:>12} {:>14}",
                "case", "size", "minilp (s)", "minilp cost", "revised (s)", "revised cost"
            );

            for (idx, &(min_size, max_size)) in BENCH_CASES.iter().take(cases).enumerate() {
                let num_supply = generator.sample_size(min_size, max_size);
                let num_demand = generator.sample_size(min_size, max_size);
                let problem = match generator.generate(num_supply, num_demand, max_cost, max_quantity) {
                    Ok(p) => p,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                };

                log::info!("case {}: {}x{} instance", idx + 1, num_supply, num_demand);
                let start = Instant::now();
                let reference_result = reference.solve_transport(&problem);
                let reference_time = start.elapsed().as_secs_f64();

                let start = Instant::now();
                let revised_result = transplex_solver::solve_transport(&problem, &transformer, &engine);
                let revised_time = start.elapsed().as_secs_f64();

                let reference_solution = match reference_result {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("Case {}: reference solver error: {}", idx + 1, e);
                        std::process::exit(1);
                    }
                };
                let (transformed, solution) = match revised_result {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("Case {}: revised simplex error: {}", idx + 1, e);
                        std::process::exit(1);
                    }
                };
                let plan = solution.plan(&transformed);

                println!(
                    "{:>4} {:>9} {:>12.4} {:>14} {:>12.4} {:>14}",
                    idx + 1,
                    format!("{}x{}", num_supply, num_demand),
                    reference_time,
                    reference_solution
                        .objective_value
                        .map_or_else(|| reference_solution.status.to_string(), |c| c.to_string()),
                    revised_time,
                    plan.as_ref().map_or_else(|| solution.status.to_string(), |p| p.total_cost.to_string()),
                );

                if num_supply <= PRINT_PLAN_LIMIT && num_demand <= PRINT_PLAN_LIMIT {
                    if let Some(plan) = reference_solution.plan(&problem) {
                        println!("  Reference plan:");
                        print_plan(&plan);
                    }
                    if let Some(plan) = &plan {
                        println!("  Revised simplex plan:");
                        print_plan(plan);
                    }
                }
            }
        }
    }
}

fn read_instance(file: &Path) -> TransportProblem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_plan(plan: &TransportPlan) {
    for row in &plan.shipments {
        let cells: Vec<String> = row.iter().map(|v| format!("{:8.2}", v)).collect();
        println!("  {}", cells.join(" "));
    }
}
