/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error and diagnostic types for the timetable engine.
//!
//! Two types model the two failure layers:
//!
//! * [`Diagnostic`] — a per-teacher / per-group / per-subject issue that the
//!   run works around (fallback availability, shortfall, unassignable
//!   subject …).  Accumulated and returned alongside the partial schedule.
//! * [`EngineError`] — top-level failure returned from
//!   [`TimetableEngine::generate()`](super::TimetableEngine::generate).
//!   Only malformed input and invariant violations end up here.
//!
//! Every variant carries the ids involved so the caller can emit a
//! fully-qualified warning or map it to a response without further parsing.

use serde::Serialize;
use thiserror::Error;

use crate::grid::{Weekday, WEEKDAY_NAMES};
use crate::model::{GroupId, SubjectId, TeacherId, Term};

use super::validator::Conflict;

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Non-fatal issue found during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The teacher declared no availability and was treated as available in
    /// every teaching cell.  A data-quality warning.
    AvailabilityFallback { teacher: TeacherId },

    /// No teacher is certified for the subject; the preceptor pool was
    /// relaxed to every teacher of the run.
    UncertifiedSubject { group: GroupId, subject: SubjectId },

    /// The group's term has no subjects, so nothing was scheduled for it.
    NoSubjectsForTerm { group: GroupId, term: Term },

    /// The subject reached some, but not all, of its weekly sessions.
    Shortfall {
        group: GroupId,
        subject: SubjectId,
        requested: u32,
        placed: u32,
    },

    /// Not a single session of the subject could be placed, even at the
    /// emergency tier.
    UnassignableSubject {
        group: GroupId,
        subject: SubjectId,
        requested: u32,
    },

    /// After compaction and balancing the day is still above the gap
    /// tolerance.
    CompactionStalled {
        group: GroupId,
        weekday: Weekday,
        gaps: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::AvailabilityFallback { teacher } => write!(
                f,
                "teacher {} has no declared availability — treated as fully available",
                teacher
            ),

            Diagnostic::UncertifiedSubject { group, subject } => write!(
                f,
                "subject {} (group {}) has no certified teacher — any teacher may take it",
                subject, group
            ),

            Diagnostic::NoSubjectsForTerm { group, term } => {
                write!(f, "group {} is in term {} which has no subjects", group, term)
            }

            Diagnostic::Shortfall {
                group,
                subject,
                requested,
                placed,
            } => write!(
                f,
                "subject {} for group {}: placed {}/{} sessions ({} missing)",
                subject,
                group,
                placed,
                requested,
                requested.saturating_sub(*placed)
            ),

            Diagnostic::UnassignableSubject {
                group,
                subject,
                requested,
            } => write!(
                f,
                "subject {} for group {}: no teacher could take any of its {} sessions",
                subject, group, requested
            ),

            Diagnostic::CompactionStalled {
                group,
                weekday,
                gaps,
            } => write!(
                f,
                "group {} still has {} internal gap(s) on {} after compaction",
                group,
                gaps,
                WEEKDAY_NAMES
                    .get(*weekday as usize)
                    .copied()
                    .unwrap_or("?")
            ),
        }
    }
}

// ── Top-level engine errors ───────────────────────────────────────────────────

/// Top-level error type returned by
/// [`TimetableEngine::generate()`](super::TimetableEngine::generate).
///
/// | Variant | Cause |
/// |---|---|
/// | `NoTeachers` | malformed input |
/// | `DuplicateTeacher` / `DuplicateSubject` / `DuplicateGroup` | malformed input |
/// | `InternshipGroup` | caller did not exclude an internship term |
/// | `InvariantViolation` | internal defect — never expected from valid input |
#[derive(Debug, Error)]
pub enum EngineError {
    /// `generate()` was called with an empty teacher list.
    #[error("no teachers provided — teacher list is empty")]
    NoTeachers,

    #[error("teacher id {0} appears more than once")]
    DuplicateTeacher(TeacherId),

    #[error("subject id {0} appears more than once")]
    DuplicateSubject(SubjectId),

    #[error("group id {0} appears more than once")]
    DuplicateGroup(GroupId),

    /// A group of an internship term reached the engine.  Such terms must be
    /// filtered out before invocation.
    #[error("group {group} is in internship term {term} and must not be scheduled")]
    InternshipGroup { group: GroupId, term: Term },

    /// The final sweep found a teacher booked twice in the same cell.
    #[error("schedule violates its invariants: {} teacher double-booking(s)", .conflicts.len())]
    InvariantViolation { conflicts: Vec<Conflict> },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
