/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data structures for the timetable engine.
//!
//! Two sides of the generation pipeline are modelled separately:
//!
//! ```text
//! plan.yaml ──(PlanLoader)──►  Plan  ──(TimetableEngine)──►  Vec<Assignment>  ──►  rooms / report
//!                               ↑ input                          ↑ output
//!                               read-only for one run            placement only, ids + hours
//! ```
//!
//! # Ownership model
//! A [`Plan`] is **borrowed** by the engine for the duration of one run and
//! never mutated.  The engine works on small integer indices into the plan's
//! vectors internally and only converts back to ids when it builds the
//! [`Assignment`] list, so a teacher/subject/group record can never be
//! reassigned after a session is created.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::grid::{Hour, SlotId, Weekday};

/// Teacher identity as stored by the upstream system.
pub type TeacherId = u32;

/// Subject identity as stored by the upstream system.
pub type SubjectId = u32;

/// Group identity as stored by the upstream system.
pub type GroupId = u32;

/// Academic term ("cuatrimestre") a subject or group belongs to.
pub type Term = u32;

// ── Teacher ───────────────────────────────────────────────────────────────────

/// A teacher available to the run.
#[derive(Debug, Clone, Default)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,

    /// Upper bound on weekly teaching hours.
    ///
    /// Reported against in [`crate::report`]; the engine does not enforce it.
    pub max_weekly_hours: u32,

    /// Subjects this teacher is certified to teach.
    pub subject_ids: BTreeSet<SubjectId>,

    /// Declared `(weekday, start hour)` availability.  Empty means "not
    /// configured" and triggers the full-availability fallback.
    pub availability: BTreeSet<(Weekday, Hour)>,
}

impl Teacher {
    /// Returns `true` if the teacher is certified for `subject`.
    pub fn teaches(&self, subject: SubjectId) -> bool {
        self.subject_ids.contains(&subject)
    }
}

// ── Subject ───────────────────────────────────────────────────────────────────

/// A subject that must be taught to every group of its term.
#[derive(Debug, Clone, Default)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,

    /// Required sessions per week.  One session occupies one grid slot.
    pub weekly_sessions: u32,

    pub term: Term,
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// A student group; it studies every subject of its term.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub id: GroupId,
    pub term: Term,
    pub label: String,
}

// ── Plan ──────────────────────────────────────────────────────────────────────

/// The fully materialised input of one generation run.
///
/// Vector order matters: it is the tie-breaking order for preceptor
/// selection and the processing order for groups and subjects.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub groups: Vec<Group>,
}

impl Plan {
    /// Subjects of `term`, in input order.
    pub fn subjects_for_term(&self, term: Term) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(move |s| s.term == term)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }
}

// ── Assignment (output) ───────────────────────────────────────────────────────

/// One placed session: who teaches what to whom, and when.
///
/// Produced by [`TimetableEngine::generate`](crate::engine::TimetableEngine::generate).
/// `start_hour` / `end_hour` are derived from `slot` and carried so that
/// downstream consumers never need the grid table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub group_id: GroupId,
    pub weekday: Weekday,
    pub slot: SlotId,
    pub start_hour: Hour,
    pub end_hour: Hour,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Plan {
        Plan {
            teachers: vec![Teacher {
                id: 7,
                name: "Ana".into(),
                subject_ids: [1, 2].into_iter().collect(),
                ..Default::default()
            }],
            subjects: vec![
                Subject {
                    id: 1,
                    name: "Algebra".into(),
                    weekly_sessions: 4,
                    term: 1,
                },
                Subject {
                    id: 2,
                    name: "Physics".into(),
                    weekly_sessions: 3,
                    term: 2,
                },
                Subject {
                    id: 3,
                    name: "English".into(),
                    weekly_sessions: 2,
                    term: 1,
                },
            ],
            groups: vec![Group {
                id: 10,
                term: 1,
                label: "1A".into(),
            }],
        }
    }

    #[test]
    fn subjects_for_term_keeps_input_order() {
        let p = plan();
        let ids: Vec<_> = p.subjects_for_term(1).map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn lookups_by_id() {
        let p = plan();
        assert!(p.subject(9).is_none());
        assert_eq!(p.subject(2).map(|s| s.term), Some(2));
        assert_eq!(p.group(10).map(|g| g.label.as_str()), Some("1A"));
    }

    #[test]
    fn teacher_certification() {
        let p = plan();
        assert!(p.teachers[0].teaches(2));
        assert!(!p.teachers[0].teaches(3));
    }
}
