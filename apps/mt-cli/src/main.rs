use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mt_app::{
    AppError, AppResult, RunMode, RunOptions, RunProgressEvent, RunRequest, RunTimingSummary,
    job_service, run_service,
};
use mt_results::{MetricsRecord, RunReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motortune")]
#[command(about = "DC motor identification and PID tuning", long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job file
    Validate {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
    },
    /// Estimate J and b from the job's step data
    Identify {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
        /// Do not store the run
        #[arg(long)]
        no_save: bool,
    },
    /// Identify when needed, then tune the PID controller
    Tune {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
        /// Do not store the run
        #[arg(long)]
        no_save: bool,
    },
    /// Write synthetic step data for the job's motor
    Synth {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
        /// Output CSV file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// List stored runs for a job
    Runs {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
    },
    /// Show a stored run
    ShowRun {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one trajectory of a stored run as CSV
    ExportSeries {
        /// Path to the job YAML or JSON file
        job_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Trajectory label (measured, fitted, pid, p_only, pi_only)
        label: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { job_path } => cmd_validate(&job_path),
        Commands::Identify { job_path, no_save } => {
            cmd_run(&job_path, RunMode::Identify, !no_save)
        }
        Commands::Tune { job_path, no_save } => cmd_run(&job_path, RunMode::Tune, !no_save),
        Commands::Synth { job_path, out } => cmd_synth(&job_path, &out),
        Commands::Runs { job_path } => cmd_runs(&job_path),
        Commands::ShowRun { job_path, run_id } => cmd_show_run(&job_path, &run_id),
        Commands::ExportSeries {
            job_path,
            run_id,
            label,
            output,
        } => cmd_export_series(&job_path, &run_id, &label, output.as_deref()),
    }
}

fn cmd_validate(job_path: &Path) -> AppResult<()> {
    println!("Validating job: {}", job_path.display());
    let job = job_service::load_job(job_path)?;
    job_service::validate_job(&job)?;
    println!("✓ Job '{}' is valid", job.name);
    if job.needs_identification() {
        println!("  J and/or b are unknown and will be identified");
    }
    Ok(())
}

fn cmd_run(job_path: &Path, mode: RunMode, persist: bool) -> AppResult<()> {
    let request = RunRequest {
        job_path,
        mode,
        options: RunOptions {
            persist,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let response = run_service::run_job_with_progress(
        &request,
        Some(&mut |event| {
            let stage_key = format!("{:?}", event.stage);
            if stage_key != last_stage || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if persist {
        println!("✓ Run stored: {}", response.run_id);
    } else {
        println!("✓ Run completed");
    }
    print_report(&response.report);
    print_timing_summary(&response.timing);
    Ok(())
}

fn cmd_synth(job_path: &Path, out: &Path) -> AppResult<()> {
    let dataset = run_service::synthesize_dataset(job_path, out)?;
    println!(
        "✓ Wrote {} samples to {}",
        dataset.len(),
        out.display()
    );
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
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

fn fmt_metric(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.4}", v),
        None => "inf".to_string(),
    }
}

fn print_metrics_row(name: &str, m: &MetricsRecord) {
    println!(
        "  {:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        name,
        fmt_metric(m.steady_state_error),
        fmt_metric(m.percent_overshoot),
        fmt_metric(m.rise_time),
        fmt_metric(m.settling_time),
        fmt_metric(m.integral_absolute_error),
    );
}

fn print_report(report: &RunReport) {
    let p = &report.plant;
    println!("\nPlant:");
    println!(
        "  R={} L={} Kt={} Ke={} J={:.6} b={:.6} ({})",
        p.r,
        p.l,
        p.kt,
        p.ke,
        p.j,
        p.b,
        if p.include_inductance {
            "second order"
        } else {
            "first order"
        }
    );
    println!("  num = {:?}", p.num);
    println!("  den = {:?}", p.den);

    if let Some(id) = &report.identification {
        println!("\nIdentification:");
        println!("  J = {:.6}{}", id.estimated_j, if id.j_at_bound { "  (at bound)" } else { "" });
        println!("  b = {:.6}{}", id.estimated_b, if id.b_at_bound { "  (at bound)" } else { "" });
        println!("  RMSE = {:.3e}", id.rmse);
        println!(
            "  {} iterations, {} evaluations, converged={}",
            id.iterations, id.evaluations, id.converged
        );
    }

    if let Some(t) = &report.tuning {
        println!("\nTuned gains:");
        println!(
            "  Kp = {:.4}  Ki = {:.4}  Kd = {:.4}",
            t.gains.kp, t.gains.ki, t.gains.kd
        );
        if t.gains.derivative_filter {
            println!("  derivative filter tau = {}", t.gains.filter_time_constant);
        }
        println!(
            "  score: grid={:.4}  nelder-mead={:.4}  powell={:.4}  final={:.4}",
            t.grid_score, t.nelder_mead_score, t.powell_score, t.final_score
        );

        println!("\nStep response:");
        println!(
            "  {:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "", "ess", "PO %", "rise s", "settle s", "IAE"
        );
        print_metrics_row("P", &t.p_only_metrics);
        print_metrics_row("PI", &t.pi_only_metrics);
        print_metrics_row("PID", &t.metrics);
    }
}

fn print_timing_summary(timing: &RunTimingSummary) {
    println!("\nTiming summary:");
    println!("  Load:     {:.3}s", timing.load_time_s);
    if timing.identify_time_s > 0.0 {
        println!("  Identify: {:.3}s", timing.identify_time_s);
    }
    if timing.tune_time_s > 0.0 {
        println!("  Tune:     {:.3}s", timing.tune_time_s);
    }
    if timing.save_time_s > 0.0 {
        println!("  Save:     {:.3}s", timing.save_time_s);
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
}

fn cmd_runs(job_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(job_path)?;

    if runs.is_empty() {
        println!("No stored runs for {}", job_path.display());
    } else {
        println!("Stored runs for {}:", job_path.display());
        for manifest in runs {
            println!(
                "  {} {:?} ({})",
                manifest.run_id, manifest.run_type, manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(job_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, report, trajectories) = run_service::load_run(job_path, run_id)?;
    println!("  Job: {}", manifest.job_name);
    println!("  Type: {:?}", manifest.run_type);
    println!("  Created: {}", manifest.timestamp);
    print_report(&report);

    println!("\nTrajectories:");
    for t in &trajectories {
        println!("  {} ({} points)", t.label, t.t.len());
    }
    Ok(())
}

fn cmd_export_series(
    job_path: &Path,
    run_id: &str,
    label: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, _report, trajectories) = run_service::load_run(job_path, run_id)?;
    let series = trajectories
        .iter()
        .find(|t| t.label == label)
        .ok_or_else(|| {
            AppError::InvalidInput(format!("run {} has no trajectory '{}'", run_id, label))
        })?;

    let mut csv = String::from("t,value\n");
    for (t, y) in series.t.iter().zip(&series.y) {
        match y {
            Some(y) => csv.push_str(&format!("{},{}\n", t, y)),
            None => csv.push_str(&format!("{},\n", t)),
        }
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.t.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}
