/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-generation sweeps over a finished assignment list.
//!
//! * [`find_conflicts`]: teacher double-bookings keyed by
//!   `(teacher, weekday, start hour)`.  `generate()` runs it last and turns
//!   any hit into [`EngineError::InvariantViolation`](super::EngineError).
//! * [`check_invariants`]: the full set of placement rules, for tests and
//!   for callers that persist or edit schedules outside the engine.
//!
//! Both are pure: the same input always yields the same output, in
//! assignment order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::{EngineConfig, ExclusivityScope};
use crate::grid::{self, Hour, SlotId, Weekday, WEEKDAY_NAMES};
use crate::model::{Assignment, GroupId, Plan, SubjectId, TeacherId, Term};

use super::availability::Availability;

fn day_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES.get(day as usize).copied().unwrap_or("?")
}

// ── Double-booking sweep ──────────────────────────────────────────────────────

/// A teacher booked twice at the same `(weekday, start hour)`.
///
/// `first` and `second` are indices into the swept assignment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub teacher: TeacherId,
    pub weekday: Weekday,
    pub start_hour: Hour,
    pub first: usize,
    pub second: usize,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "teacher {} double-booked on {} at {}:00 (assignments #{} and #{})",
            self.teacher,
            day_name(self.weekday),
            self.start_hour,
            self.first,
            self.second
        )
    }
}

/// Every teacher double-booking in `assignments`.
///
/// Each later booking is paired with the first assignment seen for the same
/// key.
pub fn find_conflicts(assignments: &[Assignment]) -> Vec<Conflict> {
    let mut seen: HashMap<(TeacherId, Weekday, Hour), usize> = HashMap::new();
    let mut conflicts = Vec::new();
    for (i, a) in assignments.iter().enumerate() {
        let key = (a.teacher_id, a.weekday, a.start_hour);
        match seen.get(&key) {
            Some(&first) => conflicts.push(Conflict {
                teacher: a.teacher_id,
                weekday: a.weekday,
                start_hour: a.start_hour,
                first,
                second: i,
            }),
            None => {
                seen.insert(key, i);
            }
        }
    }
    conflicts
}

// ── Full invariant check ──────────────────────────────────────────────────────

/// One broken placement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Teacher booked twice in the same cell.
    TeacherDoubleBooked(Conflict),

    /// Group booked twice in the same cell.
    GroupDoubleBooked {
        group: GroupId,
        weekday: Weekday,
        slot: SlotId,
    },

    /// Assignment on the break or outside the grid.
    NotATeachingSlot { index: usize, slot: SlotId },

    /// Teacher not available at the assignment's start hour.
    TeacherUnavailable {
        index: usize,
        teacher: TeacherId,
        weekday: Weekday,
        start_hour: Hour,
    },

    /// More sessions of one teacher for one group on a day than allowed.
    TeacherDailyCap {
        teacher: TeacherId,
        group: GroupId,
        weekday: Weekday,
        count: usize,
    },

    /// More sessions of one subject for one group on a day than allowed.
    SubjectDailyCap {
        subject: SubjectId,
        group: GroupId,
        weekday: Weekday,
        count: usize,
    },

    /// Teacher teaches more than one subject within one exclusivity scope.
    MixedSubjects {
        teacher: TeacherId,
        subjects: Vec<SubjectId>,
    },

    /// More sessions placed than the subject requires for the group.
    QuotaExceeded {
        group: GroupId,
        subject: SubjectId,
        required: u32,
        placed: u32,
    },

    /// Assignment references an id that is not in the plan.
    UnknownReference { index: usize },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::TeacherDoubleBooked(c) => write!(f, "{}", c),
            Violation::GroupDoubleBooked {
                group,
                weekday,
                slot,
            } => write!(
                f,
                "group {} double-booked on {} slot {}",
                group,
                day_name(*weekday),
                slot
            ),
            Violation::NotATeachingSlot { index, slot } => {
                write!(f, "assignment #{} sits on non-teaching slot {}", index, slot)
            }
            Violation::TeacherUnavailable {
                index,
                teacher,
                weekday,
                start_hour,
            } => write!(
                f,
                "assignment #{}: teacher {} is not available on {} at {}:00",
                index,
                teacher,
                day_name(*weekday),
                start_hour
            ),
            Violation::TeacherDailyCap {
                teacher,
                group,
                weekday,
                count,
            } => write!(
                f,
                "teacher {} has {} sessions with group {} on {}",
                teacher,
                count,
                group,
                day_name(*weekday)
            ),
            Violation::SubjectDailyCap {
                subject,
                group,
                weekday,
                count,
            } => write!(
                f,
                "subject {} has {} sessions for group {} on {}",
                subject,
                count,
                group,
                day_name(*weekday)
            ),
            Violation::MixedSubjects { teacher, subjects } => write!(
                f,
                "teacher {} teaches {:?} within one exclusivity scope",
                teacher, subjects
            ),
            Violation::QuotaExceeded {
                group,
                subject,
                required,
                placed,
            } => write!(
                f,
                "subject {} for group {}: {} sessions placed, {} required",
                subject, group, placed, required
            ),
            Violation::UnknownReference { index } => {
                write!(f, "assignment #{} references an unknown id", index)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Scope {
    Group(GroupId),
    Term(Term),
}

/// Check every placement rule over `assignments`.
///
/// Availability is resolved from `plan` exactly as the engine does,
/// fallback included.  Returns an empty list for a valid schedule.
pub fn check_invariants(
    plan: &Plan,
    config: &EngineConfig,
    assignments: &[Assignment],
) -> Vec<Violation> {
    let mut violations: Vec<Violation> = find_conflicts(assignments)
        .into_iter()
        .map(Violation::TeacherDoubleBooked)
        .collect();

    let availability: HashMap<TeacherId, Availability> = plan
        .teachers
        .iter()
        .map(|t| (t.id, Availability::resolve(t)))
        .collect();

    let mut group_cells: BTreeSet<(GroupId, Weekday, SlotId)> = BTreeSet::new();
    let mut teacher_day: BTreeMap<(TeacherId, GroupId, Weekday), usize> = BTreeMap::new();
    let mut subject_day: BTreeMap<(SubjectId, GroupId, Weekday), usize> = BTreeMap::new();
    let mut scoped: BTreeMap<(TeacherId, Scope), BTreeSet<SubjectId>> = BTreeMap::new();
    let mut placed: BTreeMap<(GroupId, SubjectId), u32> = BTreeMap::new();

    for (index, a) in assignments.iter().enumerate() {
        let (Some(group), Some(_), Some(avail)) = (
            plan.group(a.group_id),
            plan.subject(a.subject_id),
            availability.get(&a.teacher_id),
        ) else {
            violations.push(Violation::UnknownReference { index });
            continue;
        };

        if !grid::is_teaching_slot(a.slot) {
            violations.push(Violation::NotATeachingSlot {
                index,
                slot: a.slot,
            });
        }
        if !avail.contains(a.weekday, a.start_hour) {
            violations.push(Violation::TeacherUnavailable {
                index,
                teacher: a.teacher_id,
                weekday: a.weekday,
                start_hour: a.start_hour,
            });
        }
        if !group_cells.insert((a.group_id, a.weekday, a.slot)) {
            violations.push(Violation::GroupDoubleBooked {
                group: a.group_id,
                weekday: a.weekday,
                slot: a.slot,
            });
        }

        *teacher_day
            .entry((a.teacher_id, a.group_id, a.weekday))
            .or_default() += 1;
        *subject_day
            .entry((a.subject_id, a.group_id, a.weekday))
            .or_default() += 1;
        *placed.entry((a.group_id, a.subject_id)).or_default() += 1;

        let scope = match config.exclusivity_scope {
            ExclusivityScope::Group => Scope::Group(a.group_id),
            ExclusivityScope::Term => Scope::Term(group.term),
        };
        scoped
            .entry((a.teacher_id, scope))
            .or_default()
            .insert(a.subject_id);
    }

    let teacher_cap = config.max_teacher_sessions_per_day as usize;
    for (&(teacher, group, weekday), &count) in &teacher_day {
        if count > teacher_cap {
            violations.push(Violation::TeacherDailyCap {
                teacher,
                group,
                weekday,
                count,
            });
        }
    }
    let subject_cap = config.max_subject_sessions_per_day as usize;
    for (&(subject, group, weekday), &count) in &subject_day {
        if count > subject_cap {
            violations.push(Violation::SubjectDailyCap {
                subject,
                group,
                weekday,
                count,
            });
        }
    }
    for (&(teacher, _), subjects) in &scoped {
        if subjects.len() > 1 {
            violations.push(Violation::MixedSubjects {
                teacher,
                subjects: subjects.iter().copied().collect(),
            });
        }
    }
    for (&(group, subject), &count) in &placed {
        let required = plan.subject(subject).map_or(0, |s| s.weekly_sessions);
        if count > required {
            violations.push(Violation::QuotaExceeded {
                group,
                subject,
                required,
                placed: count,
            });
        }
    }

    violations
}

// ── Tests ─────────────────────────────────────────────────────────────────────
