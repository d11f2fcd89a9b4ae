use clap::Parser;
use math_memetic_climbing::function_registry::{BenchmarkFunction, FunctionRegistry};
use math_memetic_climbing::{
    ClimbConfigBuilder, DEFAULT_CYCLES, DEFAULT_DECAY_RATE, DEFAULT_MAX_ITERATIONS,
    DEFAULT_STEP_SIZE, ParallelConfig, hill_climbing_with_restarts,
};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "run_mc",
    about = "Run memetic hill climbing trials on a selected benchmark function"
)]
struct Cli {
    /// Name of the benchmark function to optimize (use --list-functions to see available options)
    #[arg(long)]
    function: Option<String>,

    /// Dimensionality of the problem
    #[arg(long, default_value_t = 10)]
    dim: usize,

    /// Number of restart cycles per trial
    #[arg(long, default_value_t = DEFAULT_CYCLES)]
    cycles: usize,

    /// Total stepping budget per trial (shared by all cycles)
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Initial step size
    #[arg(long, default_value_t = DEFAULT_STEP_SIZE)]
    step_size: f64,

    /// Per-step decay of the step size
    #[arg(long, default_value_t = DEFAULT_DECAY_RATE)]
    decay_rate: f64,

    /// Disable the L-BFGS-B polish at the end of each cycle
    #[arg(long)]
    no_local_search: bool,

    /// Number of independent trials
    #[arg(long, default_value_t = 30)]
    trials: usize,

    /// Base random seed; trial t uses seed + t
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Run the cycles of each trial in parallel
    #[arg(long)]
    parallel: bool,

    /// Number of threads for parallel cycles (0 = all available cores); non-zero implies --parallel
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Append the per-trial deviations to this CSV file (its header must have the same trial count)
    #[arg(long)]
    output: Option<PathBuf>,

    /// List all available functions and exit
    #[arg(long)]
    list_functions: bool,
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    let registry = FunctionRegistry::new();

    if args.list_functions {
        list_available_functions(&registry);
        return;
    }

    let function = match args.function.as_deref() {
        Some(name) => match registry.get(name) {
            Some(f) => f,
            None => {
                eprintln!(
                    "Error: function '{name}' not found. Use --list-functions to inspect available names."
                );
                process::exit(2);
            }
        },
        None => {
            eprintln!("Error: --function must be provided unless --list-functions is used.");
            process::exit(2);
        }
    };

    if args.trials == 0 {
        eprintln!("Error: --trials must be at least 1.");
        process::exit(2);
    }

    let bounds = function.bounds(args.dim);
    let parallel = parallel_config(&args);

    println!(
        "Running memetic climbing on '{}' ({}D), {} trials of {} cycles...",
        function.name, args.dim, args.trials, args.cycles
    );

    let overall_start = Instant::now();
    let mut deviations = Vec::with_capacity(args.trials);
    for t in 0..args.trials {
        let config = ClimbConfigBuilder::new()
            .cycles(args.cycles)
            .max_iterations(args.max_iterations)
            .step_size(args.step_size)
            .decay_rate(args.decay_rate)
            .local_search(!args.no_local_search)
            .seed(trial_seed(args.seed, t))
            .parallel(parallel.clone())
            .build()
            .unwrap_or_else(|err| {
                eprintln!("Error: {err}");
                process::exit(2);
            });

        let report = hill_climbing_with_restarts(&function.func, &bounds, args.dim, config)
            .unwrap_or_else(|err| {
                eprintln!("Error: optimization failed: {err}");
                process::exit(2);
            });

        let deviation = report.fun - function.optimum;
        println!(
            "trial {:>3} | best = {:>14.6e} | error = {:>12.6e} | nfev = {}",
            t + 1,
            report.fun,
            deviation,
            report.nfev
        );
        deviations.push(deviation);
    }

    let (mean, std_dev) = mean_and_std(&deviations);
    let best = deviations.iter().copied().fold(f64::INFINITY, f64::min);
    println!("\nCompleted in {:.2?}", overall_start.elapsed());
    println!("Best error: {best:.6e} | Mean: {mean:.6e} | Std dev: {std_dev:.6e}");

    if let Some(path) = &args.output
        && let Err(e) = write_csv(path, function, &deviations, mean, std_dev)
    {
        eprintln!("Error: could not write {}: {e}", path.display());
        process::exit(1);
    }
}

fn list_available_functions(registry: &FunctionRegistry) {
    let names = registry.list_functions();
    println!("Available test functions ({}):", names.len());
    for name in names {
        if let Some(f) = registry.get(name) {
            println!(
                "- {name:<12} [{}, {}]  {}",
                f.interval.0, f.interval.1, f.description
            );
        }
    }
}

fn parallel_config(args: &Cli) -> ParallelConfig {
    ParallelConfig {
        enabled: args.parallel || args.threads > 0,
        num_threads: if args.threads == 0 {
            None
        } else {
            Some(args.threads)
        },
    }
}

/// Seed of trial `t`, wrapping at `u64::MAX`.
fn trial_seed(base: u64, t: usize) -> u64 {
    base.wrapping_add(t as u64)
}

/// Mean and sample standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

fn csv_header(trials: usize) -> String {
    let mut header = String::from("Function");
    for t in 1..=trials {
        header.push_str(&format!(",Trial_{t}"));
    }
    header.push_str(",Mean,Std_Dev");
    header
}

/// Appends one row, writing the header first if the file is new or empty.
///
/// Fails with `InvalidData` if an existing header has a different trial count.
fn write_csv(
    path: &Path,
    function: &BenchmarkFunction,
    deviations: &[f64],
    mean: f64,
    std_dev: f64,
) -> io::Result<()> {
    let header = csv_header(deviations.len());
    let existing = match fs::read_to_string(path) {
        Ok(content) => content.lines().next().map(str::to_owned),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    if let Some(found) = &existing
        && found.trim_end() != header
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "existing header has {} columns, this run writes {}",
                found.split(',').count(),
                header.split(',').count()
            ),
        ));
    }

    let file = File::options().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    if existing.is_none() {
        writeln!(writer, "{header}")?;
    }
    write!(writer, "{}", function.name)?;
    for d in deviations {
        write!(writer, ",{d}")?;
    }
    writeln!(writer, ",{mean},{std_dev}")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("run_mc_{}_{name}.csv", process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_trial_seed_wraps() {
        assert_eq!(trial_seed(5, 3), 8);
        assert_eq!(trial_seed(u64::MAX, 0), u64::MAX);
        assert_eq!(trial_seed(u64::MAX, 2), 1);
    }

    #[test]
    fn test_threads_imply_parallel() {
        let cli = Cli::parse_from(["run_mc", "--function", "sphere", "--threads", "4"]);
        let parallel = parallel_config(&cli);
        assert!(parallel.enabled);
        assert_eq!(parallel.num_threads, Some(4));

        let cli = Cli::parse_from(["run_mc", "--function", "sphere"]);
        assert!(!parallel_config(&cli).enabled);

        let cli = Cli::parse_from(["run_mc", "--function", "sphere", "--parallel"]);
        let parallel = parallel_config(&cli);
        assert!(parallel.enabled);
        assert_eq!(parallel.num_threads, None);
    }

    #[test]
    fn test_csv_appends_matching_rows() {
        let registry = FunctionRegistry::new();
        let sphere = registry.get("sphere").unwrap();
        let path = scratch_file("append");

        write_csv(&path, sphere, &[1.0, 2.0], 1.5, 0.5).unwrap();
        write_csv(&path, sphere, &[3.0, 4.0], 3.5, 0.5).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Function,Trial_1,Trial_2,Mean,Std_Dev");
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.split(',').count() == 5));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_csv_rejects_different_trial_count() {
        let registry = FunctionRegistry::new();
        let sphere = registry.get("sphere").unwrap();
        let path = scratch_file("mismatch");

        write_csv(&path, sphere, &[1.0, 2.0], 1.5, 0.5).unwrap();
        let err = write_csv(&path, sphere, &[1.0, 2.0, 3.0], 2.0, 1.0).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
        fs::remove_file(&path).unwrap();
    }
}
