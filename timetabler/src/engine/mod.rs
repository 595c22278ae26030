/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Weekly timetable generation engine.
//!
//! [`TimetableEngine`] turns a [`Plan`] into a list of [`Assignment`]s plus
//! the [`Diagnostic`]s collected on the way.  The pipeline runs strictly
//! forward:
//!
//! ```text
//! availability ─► per group: preceptor ─► filler ─► compactor ─► inter-day ─► weekly ─► validator
//! ```
//!
//! Days still above `gap_tolerance` are reported once balancing is done, so
//! [`Diagnostic::CompactionStalled`] always describes the returned week.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `generate()`: every counter lives in a [`RunState`] built per call |
//! | Slot order | Chronological by default; seeded shuffle on request ([`SlotOrder`]) |
//! | Exclusivity | Parameterised by [`ExclusivityScope`] (group or term) |
//! | Unmet demand | [`Diagnostic`] values, never errors |
//! | Double-booking | Hard [`EngineError::InvariantViolation`]: it means a defect, not bad input |
//! | `max_weekly_hours` | Reported by [`crate::report`], not enforced |
//!
//! # Example
//! ```rust,ignore
//! let engine = TimetableEngine::new(EngineConfig::default());
//! let timetable = engine.generate(&plan)?;
//! for d in &timetable.diagnostics {
//!     eprintln!("warning: {d}");
//! }
//! ```

mod availability;
mod balancer;
mod compactor;
mod context;
pub mod error;
mod filler;
mod preceptor;
mod state;
pub mod validator;

pub use availability::Availability;
pub use error::{Diagnostic, EngineError};
pub use validator::{check_invariants, find_conflicts, Conflict, Violation};

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{EngineConfig, ExclusivityScope, SlotOrder};
use crate::grid;
use crate::model::{Assignment, GroupId, Plan};

use context::RunContext;
use state::RunState;

// ── Timetable (output) ────────────────────────────────────────────────────────

/// Result of one successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timetable {
    /// Placed sessions in creation order.  Room binding relies on this order
    /// being stable for identical input.
    pub assignments: Vec<Assignment>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Timetable {
    /// Sessions of one group.
    pub fn for_group(&self, group: GroupId) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.group_id == group)
    }

    /// Shortfall and unassignable-subject diagnostics.
    pub fn unmet_demand(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| {
            matches!(
                d,
                Diagnostic::Shortfall { .. } | Diagnostic::UnassignableSubject { .. }
            )
        })
    }

    /// `true` when every subject reached its weekly quota for every group.
    pub fn is_complete(&self) -> bool {
        self.unmet_demand().next().is_none()
    }
}

// ── TimetableEngine ───────────────────────────────────────────────────────────

/// The timetable generator.
///
/// Holds only configuration.  All per-run state is created inside
/// [`generate`](Self::generate) and dropped at the end of the call, so one
/// engine can serve concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct TimetableEngine {
    config: EngineConfig,
}

impl TimetableEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Generate a weekly timetable for every group of `plan`.
    ///
    /// # Errors
    /// Malformed input ([`EngineError::NoTeachers`], duplicate ids, a group
    /// in an internship term) aborts before anything is placed.  A teacher
    /// double-booking found by the final sweep aborts with
    /// [`EngineError::InvariantViolation`].  Everything else is reported in
    /// [`Timetable::diagnostics`].
    pub fn generate(&self, plan: &Plan) -> Result<Timetable, EngineError> {
        // ── Preconditions ─────────────────────────────────────────────────────
        self.validate_input(plan)?;

        info!(
            teachers = plan.teachers.len(),
            subjects = plan.subjects.len(),
            groups = plan.groups.len(),
            scope = ?self.config.exclusivity_scope,
            order = ?self.config.slot_order,
            "=== TimetableEngine::generate() ==="
        );
        if self.config.exclusivity_scope == ExclusivityScope::Term {
            let terms: BTreeSet<_> = plan.groups.iter().map(|g| g.term).collect();
            info!(terms = terms.len(), "teacher/subject binding scoped per term");
        }

        // ── Per-call state ────────────────────────────────────────────────────
        let mut diagnostics = Vec::new();
        let ctx = RunContext::new(plan, &self.config, &mut diagnostics);
        let mut state = RunState::new(
            plan.teachers.len(),
            plan.subjects.len(),
            plan.groups.len(),
        );
        let mut rng = StdRng::seed_from_u64(self.config.shuffle_seed);

        // ── Preceptors + slot filling, group by group ─────────────────────────
        for (g, group) in plan.groups.iter().enumerate() {
            if plan.subjects_for_term(group.term).next().is_none() {
                warn!(group = group.id, term = group.term, "no subjects for term — group skipped");
                diagnostics.push(Diagnostic::NoSubjectsForTerm {
                    group: group.id,
                    term: group.term,
                });
                continue;
            }

            let subjects: Vec<usize> = plan
                .subjects
                .iter()
                .enumerate()
                .filter(|(_, s)| s.term == group.term && s.weekly_sessions > 0)
                .map(|(i, _)| i)
                .collect();

            let preceptors =
                preceptor::choose_preceptors(&ctx, &mut state, g, &subjects, &mut diagnostics);

            let mut cells = grid::teaching_cells();
            if self.config.slot_order == SlotOrder::Shuffled {
                cells.shuffle(&mut rng);
            }

            let outcomes = filler::fill_group(
                &ctx,
                &mut state,
                g,
                &subjects,
                &preceptors,
                &cells,
                &mut diagnostics,
            );
            info!(
                group = group.id,
                label = %group.label,
                requested = outcomes.iter().map(|o| o.requested).sum::<u32>(),
                placed = outcomes.iter().map(|o| o.placed).sum::<u32>(),
                "✓ group filled"
            );
        }

        // ── Post-passes ───────────────────────────────────────────────────────
        let loose_days = compactor::compact(&ctx, &mut state);
        let inter_day = balancer::balance_inter_day(&ctx, &mut state);
        let weekly = balancer::balance_weekly(&ctx, &mut state);
        let stalled = compactor::report_stalled(&ctx, &state, &mut diagnostics);
        info!(loose_days, inter_day, weekly, stalled, "compaction and balancing done");

        // ── Final sweep ───────────────────────────────────────────────────────
        let assignments = state.to_assignments(plan);
        let conflicts = validator::find_conflicts(&assignments);
        if !conflicts.is_empty() {
            for c in &conflicts {
                error!("{}", c);
            }
            return Err(EngineError::InvariantViolation { conflicts });
        }

        info!(
            sessions = assignments.len(),
            diagnostics = diagnostics.len(),
            "=== Generation complete ==="
        );

        Ok(Timetable {
            assignments,
            diagnostics,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input validation
    // ─────────────────────────────────────────────────────────────────────────

    fn validate_input(&self, plan: &Plan) -> Result<(), EngineError> {
        if plan.teachers.is_empty() {
            return Err(EngineError::NoTeachers);
        }

        let mut seen = BTreeSet::new();
        for t in &plan.teachers {
            if !seen.insert(t.id) {
                return Err(EngineError::DuplicateTeacher(t.id));
            }
        }
        let mut seen = BTreeSet::new();
        for s in &plan.subjects {
            if !seen.insert(s.id) {
                return Err(EngineError::DuplicateSubject(s.id));
            }
        }
        let mut seen = BTreeSet::new();
        for g in &plan.groups {
            if !seen.insert(g.id) {
                return Err(EngineError::DuplicateGroup(g.id));
            }
            if self.config.internship_terms.contains(&g.term) {
                return Err(EngineError::InternshipGroup {
                    group: g.id,
                    term: g.term,
                });
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
