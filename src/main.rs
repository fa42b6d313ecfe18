// Dashboard Gantt command line
// Lays out a page snapshot or pushes its edits to the back-office

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;

use dashboard_gantt::models::resource_row::BarPlacement;
use dashboard_gantt::models::snapshot::Snapshot;
use dashboard_gantt::models::time_slot::TimeSlot;
use dashboard_gantt::services::api::DashboardClient;
use dashboard_gantt::services::bar_layout::{apply_layout, work_bars_for_rows};
use dashboard_gantt::services::session::DashboardSession;
use dashboard_gantt::services::settings::SettingsService;
use dashboard_gantt::services::time_grid::TimeGrid;
use dashboard_gantt::services::work_time::{classify_rows, RowClassification};

/// Gantt scheduling helper for the reservation dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to $DASHBOARD_GANTT_CONFIG or the platform config dir)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print slots, work/off classification and bar placements as JSON
    Layout {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// Apply the snapshot's edits, recompute exit times and save everything
    Save {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Show what would be sent without contacting the server for saves
        #[arg(long)]
        dry_run: bool,
    },
    /// Ask the server whether a record has a pending change
    Check {
        record_id: i64,
    },
    /// Set the room number of a reservation
    Room {
        reservation_id: i64,
        room_number: String,
    },
}

#[derive(Serialize)]
struct LayoutOutput {
    slots: Vec<TimeSlot>,
    grid_width_px: f32,
    now_px: Option<f32>,
    rows: Vec<RowClassification>,
    bars: Vec<BarPlacement>,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {:?}", path))?;
    Snapshot::from_json(&content).with_context(|| format!("Failed to parse snapshot {:?}", path))
}

fn run_layout(snapshot: Snapshot, grid: &TimeGrid) -> Result<()> {
    let mut bars = work_bars_for_rows(&snapshot.rows);
    bars.extend(snapshot.bars);

    let mut placements: Vec<BarPlacement> = Vec::new();
    apply_layout(&bars, grid, &mut placements);

    let output = LayoutOutput {
        slots: grid.slots().to_vec(),
        grid_width_px: grid.grid_width_px(),
        now_px: grid.current_time_position(Local::now().time()),
        rows: classify_rows(&snapshot.rows, grid.slots()),
        bars: placements,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_save(snapshot: Snapshot, client: &DashboardClient, dry_run: bool) -> Result<bool> {
    let mut session = DashboardSession::new(snapshot.records);
    session.load_courses(client)?;

    for edit in &snapshot.edits {
        if let Err(err) = session.apply_edit(edit) {
            log::error!("Skipping edit of {} on record {}: {}", edit.field, edit.record_id, err);
        }
    }

    if dry_run {
        session.recompute_staged_exit_times();
        for request in session.ledger().requests() {
            println!("{}", serde_json::to_string(&request)?);
        }
        return Ok(true);
    }

    let report = session.save_all(client);
    for failure in &report.failures {
        eprintln!(
            "record {} field {}: {}",
            failure.record_id, failure.field, failure.message
        );
    }
    println!("saved {}/{} changes", report.succeeded(), report.attempted);
    Ok(report.is_success())
}

fn run(args: Args) -> Result<bool> {
    let settings_service = SettingsService::new(args.config);
    log::info!("Using config {:?}", settings_service.path());
    let settings = settings_service.get()?;

    match args.command {
        Command::Layout { snapshot } => {
            let grid = TimeGrid::new(settings.gantt);
            run_layout(read_snapshot(&snapshot)?, &grid)?;
            Ok(true)
        }
        Command::Save { snapshot, dry_run } => {
            let client = DashboardClient::new(&settings.server)?;
            run_save(read_snapshot(&snapshot)?, &client, dry_run)
        }
        Command::Check { record_id } => {
            let client = DashboardClient::new(&settings.server)?;
            let check = DashboardSession::new(Vec::new()).check_change(&client, record_id)?;
            println!("is_exit={} has_change={}", check.is_exit, check.has_change);
            Ok(true)
        }
        Command::Room {
            reservation_id,
            room_number,
        } => {
            let client = DashboardClient::new(&settings.server)?;
            client
                .update_room_number(reservation_id, &room_number)
                .with_context(|| format!("Failed to update room for reservation {}", reservation_id))?;
            println!("room updated");
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbosity);

    log::info!("Starting dashboard-gantt");

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
