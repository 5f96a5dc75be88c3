use caffeine_core::*;
use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caffplan")]
#[command(about = "Caffeine timing planner for focus windows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict performance at one instant
    Predict {
        /// Sleep period START/END (repeatable)
        #[arg(long = "sleep")]
        sleep: Vec<SleepPeriod>,

        /// Caffeine taken, TIME@MG (repeatable)
        #[arg(long = "dose")]
        doses: Vec<CaffeineDose>,

        /// Instant to predict, YYYY-MM-DDTHH:MM
        #[arg(long, value_parser = input::parse_timestamp)]
        at: Timestamp,
    },

    /// Compare performance across the day with and without planned doses
    Curve {
        /// Sleep period START/END (repeatable)
        #[arg(long = "sleep")]
        sleep: Vec<SleepPeriod>,

        /// Caffeine already taken, TIME@MG (repeatable)
        #[arg(long = "dose")]
        doses: Vec<CaffeineDose>,

        /// Planned caffeine, TIME@MG (repeatable)
        #[arg(long = "plan")]
        plan: Vec<CaffeineDose>,

        /// First sample; defaults to the latest wake time
        #[arg(long, value_parser = input::parse_timestamp)]
        from: Option<Timestamp>,

        /// Hours covered by the curve
        #[arg(long)]
        hours: Option<i64>,

        /// Minutes between samples
        #[arg(long)]
        every: Option<i64>,
    },

    /// Search for the lightest caffeine schedule that keeps focus windows on target
    Optimize {
        /// Sleep period START/END (repeatable)
        #[arg(long = "sleep")]
        sleep: Vec<SleepPeriod>,

        /// Focus window START/END (repeatable)
        #[arg(long = "window", required = true)]
        windows: Vec<TimeWindow>,

        /// Minimum performance to hold during every window (0-1)
        #[arg(long)]
        target: Option<f64>,

        /// Dose size to consider in mg (repeatable)
        #[arg(long = "dose-option")]
        dose_options: Vec<f64>,

        /// Minimum hours between doses
        #[arg(long)]
        min_gap: Option<f64>,

        /// Largest single intake in mg
        #[arg(long)]
        max_dose: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        caffeine_core::logging::init_with_level("debug");
    } else {
        caffeine_core::logging::init();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Predict { sleep, doses, at } => cmd_predict(&sleep, &doses, at, cli.json),
        Commands::Curve {
            sleep,
            doses,
            plan,
            from,
            hours,
            every,
        } => cmd_curve(&sleep, &doses, plan, from, hours, every, &config, cli.json),
        Commands::Optimize {
            sleep,
            windows,
            target,
            dose_options,
            min_gap,
            max_dose,
        } => {
            let mut params = config.optimization_params(windows);
            if let Some(target) = target {
                params.target_performance = target;
            }
            if !dose_options.is_empty() {
                params.dose_options = dose_options;
            }
            if let Some(hours) = min_gap {
                params.min_time_between_doses_hours = hours;
            }
            if let Some(mg) = max_dose {
                params.max_dose_per_intake = mg;
            }
            cmd_optimize(&sleep, &params, &config, cli.json)
        }
    }
}

fn cmd_predict(
    sleep: &[SleepPeriod],
    doses: &[CaffeineDose],
    at: Timestamp,
    json: bool,
) -> Result<()> {
    tracing::debug!(
        "Predicting {} from {} sleep period(s) and {} dose(s)",
        at,
        sleep.len(),
        doses.len()
    );
    let performance = predict(at, sleep, doses);

    if json {
        let out = serde_json::json!({ "instant": at, "performance": performance });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Predicted performance at {}: {:.3}", at, performance);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_curve(
    sleep: &[SleepPeriod],
    doses: &[CaffeineDose],
    plan: Vec<CaffeineDose>,
    from: Option<Timestamp>,
    hours: Option<i64>,
    every: Option<i64>,
    config: &Config,
    json: bool,
) -> Result<()> {
    let every = every.unwrap_or(config.curve.sample_minutes);
    if every <= 0 {
        return Err(Error::Config(format!(
            "Sample interval must be positive, got {} minutes",
            every
        )));
    }
    let hours = hours.unwrap_or(config.curve.span_hours);
    let span = Duration::try_hours(hours)
        .filter(|span| *span >= Duration::zero())
        .ok_or_else(|| Error::Config(format!("Curve span out of range: {} hours", hours)))?;
    let step = Duration::try_minutes(every).ok_or_else(|| {
        Error::Config(format!("Sample interval out of range: {} minutes", every))
    })?;

    // Anchor on the most recent wake when no start is given
    let latest = sleep
        .iter()
        .map(|s| s.end)
        .chain(doses.iter().chain(&plan).map(|d| d.instant))
        .max();
    let from = match (from, latest) {
        (Some(from), _) => from,
        (None, Some(latest)) => wake_instant(sleep, latest),
        (None, None) => {
            return Err(Error::Other(
                "Need --from, a sleep period or a dose to place the curve".into(),
            ))
        }
    };

    if from.checked_add_signed(span).is_none() {
        return Err(Error::Config(format!(
            "Curve of {} hours from {} runs past the end of the calendar",
            hours, from
        )));
    }
    tracing::debug!("Curve from {} over {} hours every {} minutes", from, hours, every);

    let sampling = CurveSampling {
        from,
        span,
        every: step,
    };
    let curve = comparison_curve(sleep, doses, &Schedule::new(plan), &sampling);

    if json {
        println!("{}", serde_json::to_string_pretty(&curve)?);
        return Ok(());
    }

    println!("{:<18}  {:>8}  {:>8}", "time", "baseline", "planned");
    for point in &curve {
        println!(
            "{:<18}  {:>8.3}  {:>8.3}",
            point.instant.format("%Y-%m-%d %H:%M"),
            point.baseline,
            point.with_schedule
        );
    }
    Ok(())
}

fn cmd_optimize(
    sleep: &[SleepPeriod],
    params: &OptimizationParams,
    config: &Config,
    json: bool,
) -> Result<()> {
    params.validate()?;
    tracing::debug!(
        "Optimizing {} window(s) at target {:.2} with dose options {:?}",
        params.time_windows.len(),
        params.target_performance,
        params.dose_options
    );

    let schedule = find_optimal_schedule_with(sleep, params, config.search_limits());

    if json {
        let out = match &schedule {
            Some(schedule) => serde_json::json!({
                "schedule": schedule,
                "total_mg": schedule.total_mg(),
                "score": evaluate(sleep, params, schedule),
            }),
            None => serde_json::json!({
                "schedule": null,
                "fallback_dose": params.fallback_dose,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match schedule {
        Some(schedule) => display_schedule(sleep, params, &schedule),
        None => {
            println!("No schedule keeps any focus window at {:.2}.", params.target_performance);
            if let Some(mg) = params.fallback_dose {
                println!("  Consider a single {} mg dose ahead of your most important window.", mg);
            }
        }
    }
    Ok(())
}

fn display_schedule(sleep: &[SleepPeriod], params: &OptimizationParams, schedule: &Schedule) {
    let score = evaluate(sleep, params, schedule);

    println!();
    println!("  Caffeine schedule ({} mg total)", schedule.total_mg());
    println!();
    for dose in schedule {
        println!(
            "  → {}  {} mg",
            dose.instant.format("%Y-%m-%d %H:%M"),
            dose.milligrams
        );
    }
    println!();
    println!(
        "  {}/{} focus windows stay at or above {:.2}",
        score.successful_windows,
        params.time_windows.len(),
        params.target_performance
    );
    println!();
}
