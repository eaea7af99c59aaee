//! `ivokan-slots` CLI — compute tutor availability and bookable slots from JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Effective availability windows per date (stdin → stdout)
//! cat request.json | ivokan-slots effective
//!
//! # Merge overlapping windows from different weekly sources
//! ivokan-slots effective -i request.json --coalesce
//!
//! # Bookable slots per date, overriding the document's lesson settings
//! ivokan-slots slots -i request.json --duration 50 --break-minutes 15 --notice 120
//!
//! # Evaluate against a fixed clock in the tutor's timezone
//! ivokan-slots slots -i request.json --now 2026-03-16T06:30:00Z --timezone Europe/Istanbul
//!
//! # Only the earliest bookable slot
//! ivokan-slots first -i request.json -o first.json
//! ```

mod request;

use anyhow::{Context, Result};
use availability_engine::pipeline::{first_slot_in_days, slots_for_days};
use availability_engine::reducer::coalesce_days;
use availability_engine::{
    compute_effective_availability, parse_timezone, DstPolicy, EffectiveDayAvailability,
    SlotContext, SlotParams,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use request::{AvailabilityRequest, ParamOverrides};

#[derive(Parser)]
#[command(
    name = "ivokan-slots",
    version,
    about = "Tutor availability and bookable lesson slot calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print effective availability windows for each date in the range
    Effective {
        #[command(flatten)]
        io: IoArgs,
        /// Merge overlapping or touching windows within each date
        #[arg(long)]
        coalesce: bool,
    },
    /// Print bookable slots for each date in the range
    Slots {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        slot: SlotArgs,
    },
    /// Print the earliest bookable slot in the range, or null
    First {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        slot: SlotArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Request JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Args)]
struct SlotArgs {
    /// Lesson duration in minutes
    #[arg(long)]
    duration: Option<i64>,
    /// Break between consecutive slots in minutes
    #[arg(long)]
    break_minutes: Option<i64>,
    /// Minimum notice before a slot may start, in minutes
    #[arg(long)]
    notice: Option<i64>,
    /// Tutor's IANA timezone (e.g. "Europe/Istanbul")
    #[arg(long, env = "IVOKAN_TIMEZONE")]
    timezone: Option<String>,
    /// Current instant as RFC 3339 (defaults to the system clock)
    #[arg(long)]
    now: Option<String>,
    /// What to do with slots starting inside a DST gap
    #[arg(long, value_enum, default_value_t = DstArg::ShiftForward)]
    dst: DstArg,
    /// Merge overlapping windows before cutting slots
    #[arg(long)]
    coalesce: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DstArg {
    Skip,
    ShiftForward,
}

impl From<DstArg> for DstPolicy {
    fn from(arg: DstArg) -> Self {
        match arg {
            DstArg::Skip => DstPolicy::Skip,
            DstArg::ShiftForward => DstPolicy::ShiftForward,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Effective { io, coalesce } => {
            let req = AvailabilityRequest::from_json(&read_input(io.input.as_deref())?)?;
            let mut days = compute_effective_availability(&req.weekly, &req.unavailability, req.date_range()?)
                .context("Failed to compute effective availability")?;
            if coalesce {
                coalesce_days(&mut days);
            }
            info!(days = days.len(), "computed effective availability");
            write_json(io.output.as_deref(), &days)?;
        }
        Commands::Slots { io, slot } => {
            let req = AvailabilityRequest::from_json(&read_input(io.input.as_deref())?)?;
            let job = prepare_slots(&req, &slot)?;
            let days = slots_for_days(&job.days, &req.booked, &job.params, &job.ctx)
                .context("Failed to generate bookable slots")?;
            info!(
                days = days.len(),
                slots = days.iter().map(|d| d.slots.len()).sum::<usize>(),
                "computed bookable slots"
            );
            write_json(io.output.as_deref(), &days)?;
        }
        Commands::First { io, slot } => {
            let req = AvailabilityRequest::from_json(&read_input(io.input.as_deref())?)?;
            let job = prepare_slots(&req, &slot)?;
            let first = first_slot_in_days(&job.days, &req.booked, &job.params, &job.ctx)
                .context("Failed to search for a bookable slot")?;
            info!(found = first.is_some(), "searched for first bookable slot");
            write_json(io.output.as_deref(), &first)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reduced days plus the slot settings and clock to discretize them with.
struct SlotJob {
    days: Vec<EffectiveDayAvailability>,
    params: SlotParams,
    ctx: SlotContext,
}

/// Resolve settings and reduce the request's availability, coalescing if asked.
fn prepare_slots(req: &AvailabilityRequest, args: &SlotArgs) -> Result<SlotJob> {
    let params = req.slot_params(&ParamOverrides {
        duration: args.duration,
        break_minutes: args.break_minutes,
        notice: args.notice,
    })?;
    let timezone_name = req.timezone(args.timezone.as_deref());
    let timezone = parse_timezone(timezone_name).context("Failed to resolve tutor timezone")?;
    let now = parse_now(args.now.as_deref())?;
    let ctx = SlotContext::new(now, timezone).with_dst_policy(args.dst.into());

    debug!(
        ?params,
        timezone = timezone_name,
        now = %now,
        booked = req.booked.len(),
        "slot request"
    );

    let mut days = compute_effective_availability(&req.weekly, &req.unavailability, req.date_range()?)
        .context("Failed to compute effective availability")?;
    if args.coalesce {
        coalesce_days(&mut days);
    }

    Ok(SlotJob { days, params, ctx })
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now '{}': expected RFC 3339", raw)),
        None => Ok(Utc::now()),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}
