/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-generation schedule report.
//!
//! # Status: advisory only
//!
//! Everything here is **computed and logged** after a run; nothing feeds back
//! into the engine.  In particular a teacher above `max_weekly_hours` is
//! reported, never rejected: the engine places sessions without looking at
//! that field.
//!
//! Three things are checked per run:
//!
//! | Check | Warning when |
//! |---|---|
//! | Group completeness | placed hours < required hours |
//! | Group gaps | a weekday has at least one internal gap |
//! | Teacher load | placed hours > `max_weekly_hours` |

use serde::Serialize;

use crate::grid::{self, SlotId, DAYS, WEEKDAY_NAMES};
use crate::model::{Assignment, GroupId, Plan, TeacherId};

// ── Report types ──────────────────────────────────────────────────────────────

/// Completeness and compactness of one group's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub label: String,
    /// Sum of `weekly_sessions` over the subjects of the group's term.
    pub required_hours: u32,
    pub placed_hours: u32,
    /// Internal gaps per weekday, Monday first.
    pub gaps_per_day: [usize; DAYS],
}

impl GroupSummary {
    pub fn is_complete(&self) -> bool {
        self.placed_hours >= self.required_hours
    }

    pub fn total_gaps(&self) -> usize {
        self.gaps_per_day.iter().sum()
    }
}

/// Weekly load of one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherLoad {
    pub teacher_id: TeacherId,
    pub name: String,
    pub placed_hours: u32,
    pub max_weekly_hours: u32,
}

impl TeacherLoad {
    pub fn is_over_max(&self) -> bool {
        self.placed_hours > self.max_weekly_hours
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    pub groups: Vec<GroupSummary>,
    pub teachers: Vec<TeacherLoad>,
}

// ── Public API ────────────────────────────────────────────────────────────────

impl ScheduleReport {
    /// Summarise `assignments` against `plan`.  Groups and teachers keep
    /// plan order.
    pub fn build(plan: &Plan, assignments: &[Assignment]) -> Self {
        let groups = plan
            .groups
            .iter()
            .map(|g| {
                let required_hours = plan.subjects_for_term(g.term).map(|s| s.weekly_sessions).sum();
                let mine: Vec<&Assignment> =
                    assignments.iter().filter(|a| a.group_id == g.id).collect();

                let mut gaps_per_day = [0; DAYS];
                for (day, gaps) in gaps_per_day.iter_mut().enumerate() {
                    let slots: Vec<SlotId> = mine
                        .iter()
                        .filter(|a| a.weekday as usize == day)
                        .map(|a| a.slot)
                        .collect();
                    *gaps = grid::internal_gaps(&slots);
                }

                GroupSummary {
                    group_id: g.id,
                    label: g.label.clone(),
                    required_hours,
                    placed_hours: mine.len() as u32,
                    gaps_per_day,
                }
            })
            .collect();

        let teachers = plan
            .teachers
            .iter()
            .map(|t| TeacherLoad {
                teacher_id: t.id,
                name: t.name.clone(),
                placed_hours: assignments.iter().filter(|a| a.teacher_id == t.id).count() as u32,
                max_weekly_hours: t.max_weekly_hours,
            })
            .collect();

        Self { groups, teachers }
    }

    /// Human-readable warnings, groups first, in plan order.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for g in &self.groups {
            if !g.is_complete() {
                out.push(format!(
                    "group {} has {}/{} hours",
                    g.label, g.placed_hours, g.required_hours
                ));
            }
            for (day, &gaps) in g.gaps_per_day.iter().enumerate() {
                if gaps > 0 {
                    out.push(format!(
                        "group {} has a {}-hour gap on {}",
                        g.label, gaps, WEEKDAY_NAMES[day]
                    ));
                }
            }
        }
        for t in self.teachers.iter().filter(|t| t.is_over_max()) {
            out.push(format!(
                "teacher {} ({}) has {} hours, above the weekly maximum of {}",
                t.name, t.teacher_id, t.placed_hours, t.max_weekly_hours
            ));
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Subject, Teacher};

    fn plan() -> Plan {
        Plan {
            teachers: vec![Teacher {
                id: 1,
                name: "Ana".into(),
                max_weekly_hours: 3,
                ..Default::default()
            }],
            subjects: vec![
                Subject {
                    id: 10,
                    weekly_sessions: 3,
                    term: 1,
                    ..Default::default()
                },
                Subject {
                    id: 11,
                    weekly_sessions: 2,
                    term: 1,
                    ..Default::default()
                },
            ],
            groups: vec![Group {
                id: 5,
                term: 1,
                label: "1A".into(),
            }],
        }
    }

    fn a(weekday: u8, slot: u8) -> Assignment {
        let hour = grid::start_hour(slot);
        Assignment {
            teacher_id: 1,
            subject_id: 10,
            group_id: 5,
            weekday,
            slot,
            start_hour: hour,
            end_hour: hour + 1,
        }
    }

    #[test]
    fn summarises_hours_and_gaps() {
        let report = ScheduleReport::build(&plan(), &[a(0, 0), a(0, 2), a(1, 0)]);
        let g = &report.groups[0];
        assert_eq!(g.required_hours, 5);
        assert_eq!(g.placed_hours, 3);
        assert_eq!(g.gaps_per_day, [1, 0, 0, 0, 0]);
        assert_eq!(g.total_gaps(), 1);
        assert!(!g.is_complete());
        assert_eq!(report.teachers[0].placed_hours, 3);
        assert!(!report.teachers[0].is_over_max());
    }

    #[test]
    fn warnings_cover_hours_gaps_and_load() {
        let list = [a(0, 0), a(0, 2), a(1, 0), a(1, 1)];
        let warnings = ScheduleReport::build(&plan(), &list).warnings();
        assert_eq!(
            warnings,
            vec![
                "group 1A has 4/5 hours".to_string(),
                "group 1A has a 1-hour gap on Monday".to_string(),
                "teacher Ana (1) has 4 hours, above the weekly maximum of 3".to_string(),
            ]
        );
    }

    #[test]
    fn complete_compact_week_has_no_warnings() {
        let list = [a(0, 0), a(0, 1), a(1, 0), a(2, 0), a(3, 0)];
        let mut p = plan();
        p.teachers[0].max_weekly_hours = 20;
        assert!(ScheduleReport::build(&p, &list).warnings().is_empty());
    }
}
