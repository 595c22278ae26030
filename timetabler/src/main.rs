/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};

use timetabler::config::{ExclusivityScope, PlanLoader, SlotOrder};
use timetabler::engine::{Diagnostic, TimetableEngine};
use timetabler::model::Assignment;
use timetabler::report::ScheduleReport;
use timetabler::rooms::{assign_rooms, RoomId};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Weekly school timetable generator.
///
/// Example:
///   timetabler --plan demos/plan.yaml --scope term --output timetable.yaml
#[derive(Debug, Parser)]
#[command(
    name = "timetabler",
    about = "Weekly school timetable generator",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML plan (teachers, subjects, groups, optional rooms).
    #[arg(short = 'p', long = "plan")]
    plan: PathBuf,

    /// Write the generated timetable here instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Override the teacher/subject exclusivity scope of the plan file.
    #[arg(long = "scope", value_enum)]
    scope: Option<ExclusivityScope>,

    /// Override the slot order of the plan file.
    #[arg(long = "order", value_enum)]
    order: Option<SlotOrder>,

    /// Override the shuffle seed of the plan file.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Skip classroom binding even if the plan lists rooms.
    #[arg(long = "no-rooms", default_value_t = false)]
    no_rooms: bool,
}

// ── Output document ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct BoundAssignment {
    #[serde(flatten)]
    assignment: Assignment,
    room: Option<RoomId>,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    assignments: Vec<BoundAssignment>,
    diagnostics: &'a [Diagnostic],
    report: &'a ScheduleReport,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging on stderr so stdout carries only YAML.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        plan     = %cli.plan.display(),
        output   = ?cli.output,
        scope    = ?cli.scope,
        order    = ?cli.order,
        seed     = ?cli.seed,
        no_rooms = cli.no_rooms,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // ── Load plan ─────────────────────────────────────────────────────────────
    let mut loader = PlanLoader::new();
    loader.load_from_file(&cli.plan)?;

    let config = loader.config_mut();
    if let Some(scope) = cli.scope {
        config.exclusivity_scope = scope;
    }
    if let Some(order) = cli.order {
        config.slot_order = order;
    }
    if let Some(seed) = cli.seed {
        config.shuffle_seed = seed;
    }

    // ── Generate ──────────────────────────────────────────────────────────────
    let engine = TimetableEngine::new(loader.config().clone());
    let plan = loader.plan();
    let timetable = engine
        .generate(plan)
        .context("timetable generation failed")?;

    for d in &timetable.diagnostics {
        warn!("{}", d);
    }

    // ── Rooms ─────────────────────────────────────────────────────────────────
    let rooms = if cli.no_rooms || loader.rooms().is_empty() {
        vec![None; timetable.assignments.len()]
    } else {
        assign_rooms(&timetable.assignments, loader.rooms())
    };

    // ── Report ────────────────────────────────────────────────────────────────
    let report = ScheduleReport::build(plan, &timetable.assignments);
    for w in report.warnings() {
        warn!("{}", w);
    }
    info!(
        sessions = timetable.assignments.len(),
        complete_groups = report.groups.iter().filter(|g| g.is_complete()).count(),
        groups = report.groups.len(),
        "Timetable ready"
    );

    // ── Write ─────────────────────────────────────────────────────────────────
    let output = Output {
        assignments: timetable
            .assignments
            .iter()
            .zip(rooms)
            .map(|(&assignment, room)| BoundAssignment { assignment, room })
            .collect(),
        diagnostics: &timetable.diagnostics,
        report: &report,
    };
    let yaml = serde_yaml::to_string(&output).context("Failed to serialise timetable")?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, yaml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Timetable written to {}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
