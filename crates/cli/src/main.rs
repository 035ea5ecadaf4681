#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cvxrs_api::{Method, Solver};
use cvxrs_core::math::Scalar;
use cvxrs_core::options::SolveOptions;
use cvxrs_core::solution::{Info, Sol};
use cvxrs_io::{read_json_problem, write_solution};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cvxrs")]
#[command(version, about = "A homogeneous self-dual splitting solver for convex cone programs")]
struct Cli {
    #[arg(long)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Solve {
        #[arg(long)]
        problem: PathBuf,
        #[arg(long, default_value = "scs")]
        method: MethodArg,
        #[arg(long)]
        eps: Option<f64>,
        #[arg(long)]
        max_iters: Option<usize>,
        #[arg(long)]
        time_limit: Option<u64>,
        #[arg(long)]
        no_normalize: bool,
        #[arg(long)]
        verbose: bool,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        output_json: bool,
    },
    Check {
        #[arg(long)]
        problem: PathBuf,
    },
    Bench {},
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Scs,
    Ipm,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Method {
        match arg {
            MethodArg::Scs => Method::Scs,
            MethodArg::Ipm => Method::Ipm,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json)?;
    match cli.command {
        Commands::Solve {
            problem,
            method,
            eps,
            max_iters,
            time_limit,
            no_normalize,
            verbose,
            output,
            output_json,
        } => solve_command(
            problem,
            method.into(),
            eps,
            max_iters,
            time_limit,
            no_normalize,
            verbose,
            output,
            output_json,
        ),
        Commands::Check { problem } => check_command(problem),
        Commands::Bench {} => {
            println!("Benchmarks are available via `cargo bench -p cvxrs-benches`.");
            Ok(())
        }
    }
}

fn initialize_tracing(log_json: bool) -> Result<()> {
    if log_json {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init()
            .ok();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .ok();
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn solve_command(
    path: PathBuf,
    method: Method,
    eps: Option<f64>,
    max_iters: Option<usize>,
    time_limit: Option<u64>,
    no_normalize: bool,
    verbose: bool,
    output: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    let mut options = SolveOptions::<Scalar>::default();
    if let Some(eps) = eps {
        options.eps = eps as Scalar;
    }
    if let Some(iters) = max_iters {
        options.max_iterations = iters;
    }
    if let Some(limit) = time_limit {
        options.max_time = Some(Duration::from_secs(limit));
    }
    options.normalize = !no_normalize;
    options.verbose = verbose;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "json" => {
            let problem = read_json_problem(&path)?;
            let mut solver = Solver::<Scalar>::new().method(method).options(options);
            let (sol, info) = solver
                .solve(problem)
                .map_err(|err| anyhow::anyhow!("{err}"))?;
            emit_solution(&sol, &info, output, output_json)?;
        }
        "mps" => {
            anyhow::bail!("MPS parsing is not implemented yet.");
        }
        _ => {
            anyhow::bail!("Unsupported file extension: {}", extension);
        }
    }
    Ok(())
}

fn emit_solution(
    sol: &Sol<Scalar>,
    info: &Info<Scalar>,
    output: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    if output_json {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &(sol, info))?;
        handle.write_all(b"\n")?;
        handle.flush()?;
    } else {
        println!(
            "status: {}\npobj: {:.6}\ndobj: {:.6}\niters: {}\ntime: {:.3}s",
            info.status_tag, info.pobj, info.dobj, info.iter, info.solve_time.as_secs_f64()
        );
    }
    if let Some(path) = output {
        write_solution(path, sol, info)?;
    }
    Ok(())
}

fn check_command(path: PathBuf) -> Result<()> {
    let problem = read_json_problem(&path)?;
    problem.validate().context("problem validation failed")?;
    println!(
        "validation succeeded: n={}, m={}, nnz={}, {} cone block(s)",
        problem.nvars(),
        problem.ncons(),
        problem.a.nnz(),
        problem.cones.len()
    );
    Ok(())
}
