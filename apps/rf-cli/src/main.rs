use clap::{Parser, Subcommand};
use rf_app::{
    AppResult, SweepOptions, SweepProgressEvent, SweepRequest, SweepStage, query, sweep_service,
};
use rf_core::timing::SweepTimings;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(about = "romflow CLI - online stage of reduced steady Navier-Stokes models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sweep config
    Validate {
        /// Path to the sweep YAML or JSON file
        config_path: PathBuf,
    },
    /// Show the mode counts and shape of a reduced operator file
    Inspect {
        /// Path to the operators JSON file
        operators_path: PathBuf,
    },
    /// Solve every sample of a sweep and export the coefficients
    Sweep {
        /// Path to the sweep YAML or JSON file
        config_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored runs of a sweep
    Runs {
        /// Path to the sweep YAML or JSON file
        config_path: PathBuf,
    },
    /// Show details of a stored run
    ShowRun {
        /// Path to the sweep YAML or JSON file
        config_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one reduced coefficient across all samples as CSV
    ExportSeries {
        /// Path to the sweep YAML or JSON file
        config_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Zero-based coefficient index
        index: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Inspect { operators_path } => cmd_inspect(&operators_path),
        Commands::Sweep {
            config_path,
            no_cache,
        } => cmd_sweep(&config_path, !no_cache),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::ShowRun {
            config_path,
            run_id,
        } => cmd_show_run(&config_path, &run_id),
        Commands::ExportSeries {
            config_path,
            run_id,
            index,
            output,
        } => cmd_export_series(&config_path, &run_id, index, output.as_deref()),
    }
}

fn output_dir(config_path: &Path) -> AppResult<PathBuf> {
    Ok(rf_app::load_config(config_path)?.output.dir)
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating sweep config: {}", config_path.display());
    let config = rf_app::load_config(config_path)?;
    rf_app::validate_config(&config)?;
    let params = rf_app::read_parameter_matrix(&config.parameters)?;
    println!("✓ Config is valid ({} samples)", params.len());
    Ok(())
}

fn cmd_inspect(operators_path: &Path) -> AppResult<()> {
    let summary = query::inspect_operators(operators_path)?;
    println!("Operators: {}", operators_path.display());
    println!("  Modes: {}", summary.modes);
    println!("  Inlet coefficients: {}", summary.n_bc);
    println!("  Reduced size: {}", summary.size);
    println!(
        "  Penalty operators: {}",
        if summary.has_penalty { "yes" } else { "no" }
    );
    if summary.linear {
        println!("  Convective tensor is zero (linear system)");
    }
    Ok(())
}

fn cmd_sweep(config_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running sweep: {}", config_path.display());

    let request = SweepRequest {
        config_path,
        options: SweepOptions {
            use_cache,
            ..SweepOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = sweep_service::ensure_sweep_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now = Some(event.stage) != last_stage
                || event.point.as_ref().is_some_and(|p| p.completed == p.total)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Sweep completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let manifest = &response.manifest;
    println!(
        "  Samples: {} ({} converged, {} failed)",
        manifest.n_samples,
        manifest.n_converged,
        manifest.failures.len()
    );
    for failure in &manifest.failures {
        println!(
            "    sample {} (nu = {}): {}",
            failure.sample, failure.nu, failure.message
        );
    }
    for name in &manifest.exports {
        println!("  Wrote {}", response.run_dir.join(name).display());
    }

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &SweepProgressEvent) {
    match (&event.stage, &event.point) {
        (SweepStage::Solving, Some(p)) => {
            let width = 28usize;
            let fraction = p.completed as f64 / p.total.max(1) as f64;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            let mut line = format!(
                "\r[{}] {}/{}  sample={}",
                bar, p.completed, p.total, p.sample
            );
            if let Some(iter) = p.iterations {
                line.push_str(&format!("  iter={}", iter));
            }
            if let Some(residual) = p.residual_norm {
                line.push_str(&format!("  residual={:.3e}", residual));
            }
            if !p.converged {
                line.push_str("  (not converged)");
            }
            line.push_str(&format!("  elapsed={:.1}s", event.elapsed_wall_s));
            print!("{}", line);
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &SweepTimings) {
    let total = timing.total_time_s.max(1.0e-12);
    let load_pct = 100.0 * timing.load_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let export_pct = 100.0 * timing.export_time_s / total;

    println!("\nTiming summary:");
    println!("  Load:    {:.3}s ({:.1}%)", timing.load_time_s, load_pct);
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    if timing.mean_point_time_s > 0.0 {
        println!("  Per sample: {:.3e}s", timing.mean_point_time_s);
    }
    if timing.reconstruct_time_s > 0.0 {
        println!("  Reconstruct: {:.3}s", timing.reconstruct_time_s);
    }
    println!("  Export:  {:.3}s ({:.1}%)", timing.export_time_s, export_pct);
    println!("  Total:   {:.3}s", timing.total_time_s);
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let runs = sweep_service::list_runs(&output_dir(config_path)?)?;

    if runs.is_empty() {
        println!("No stored runs for {}", config_path.display());
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} {}, {}/{} converged)",
                manifest.run_id,
                manifest.timestamp,
                manifest.physics,
                manifest.boundary,
                manifest.n_converged,
                manifest.n_samples
            );
        }
    }
    Ok(())
}

fn cmd_show_run(config_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, log) = sweep_service::load_run(&output_dir(config_path)?, run_id)?;
    let summary = query::get_log_summary(&log)?;

    println!("\nRun Summary:");
    println!("  Physics: {} ({} boundary)", manifest.physics, manifest.boundary);
    println!("  Modes: {}", manifest.modes);
    println!("  Rows: {} ({} converged)", summary.rows, summary.converged);
    println!("  Coefficients per row: {}", summary.coefficients);
    println!("  Max |coefficient|: {:.6e}", summary.max_abs_coefficient);
    if !manifest.exports.is_empty() {
        println!("\nExports:");
        for name in &manifest.exports {
            println!("  {}", name);
        }
    }

    Ok(())
}

fn cmd_export_series(
    config_path: &Path,
    run_id: &str,
    index: usize,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, log) = sweep_service::load_run(&output_dir(config_path)?, run_id)?;
    let series = query::extract_coefficient_series(&log, index)?;

    let mut csv = String::from("sample,value\n");
    for (sample, val) in &series {
        csv.push_str(&format!("{},{}\n", sample, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} samples to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
