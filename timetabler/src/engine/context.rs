/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Read-only inputs of one run plus the constraint checks every pass shares.

use tracing::warn;

use crate::config::{EngineConfig, ExclusivityScope};
use crate::grid::{self, SlotId, Weekday};
use crate::model::Plan;

use super::availability::Availability;
use super::error::Diagnostic;
use super::state::{RunState, ScopeKey};

#[derive(Debug)]
pub(crate) struct RunContext<'a> {
    pub plan: &'a Plan,
    pub config: &'a EngineConfig,
    /// Resolved availability, indexed like `plan.teachers`.
    pub availability: Vec<Availability>,
    /// Certified teachers per subject index, in input order.
    pub certified: Vec<Vec<usize>>,
}

impl<'a> RunContext<'a> {
    /// Resolve availability and build the certification index.
    ///
    /// Teachers that fall back to full availability are logged and reported.
    pub fn new(plan: &'a Plan, config: &'a EngineConfig, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let availability: Vec<Availability> = plan
            .teachers
            .iter()
            .map(|t| {
                let a = Availability::resolve(t);
                if a.is_fallback() {
                    warn!(
                        teacher = t.id,
                        name = %t.name,
                        cells = a.len(),
                        "no declared availability — using every teaching cell"
                    );
                    diagnostics.push(Diagnostic::AvailabilityFallback { teacher: t.id });
                }
                a
            })
            .collect();

        let certified = plan
            .subjects
            .iter()
            .map(|s| {
                plan.teachers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.teaches(s.id))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        Self {
            plan,
            config,
            availability,
            certified,
        }
    }

    /// Exclusivity key for sessions of `group`.
    pub fn scope_of(&self, group: usize) -> ScopeKey {
        match self.config.exclusivity_scope {
            ExclusivityScope::Group => ScopeKey::Group(group),
            ExclusivityScope::Term => ScopeKey::Term(self.plan.groups[group].term),
        }
    }

    /// Teacher availability at the start hour of `slot`.
    pub fn is_available(&self, teacher: usize, day: Weekday, slot: SlotId) -> bool {
        grid::is_teaching_slot(slot)
            && self.availability[teacher].contains(day, grid::start_hour(slot))
    }

    /// Every hard constraint for creating a new session.
    pub fn can_place(
        &self,
        state: &RunState,
        teacher: usize,
        subject: usize,
        group: usize,
        day: Weekday,
        slot: SlotId,
    ) -> bool {
        if state.group_busy(group, day, slot) {
            return false;
        }
        if !self.is_available(teacher, day, slot) {
            return false;
        }
        if state.teacher_busy(teacher, day, slot) {
            return false;
        }
        if state
            .bound_subject(teacher, self.scope_of(group))
            .is_some_and(|bound| bound != subject)
        {
            return false;
        }
        state.teacher_group_count(teacher, group, day) < self.config.max_teacher_sessions_per_day
            && state.subject_group_count(subject, group, day)
                < self.config.max_subject_sessions_per_day
    }

    /// Every hard constraint for moving session `idx` to `(day, slot)`.
    ///
    /// Daily caps are only checked when the weekday changes; a same-day move
    /// leaves them untouched.
    pub fn can_relocate(&self, state: &RunState, idx: usize, day: Weekday, slot: SlotId) -> bool {
        let s = state.sessions()[idx];
        if s.day == day && s.slot == slot {
            return false;
        }
        if state.group_busy(s.group, day, slot) {
            return false;
        }
        if !self.is_available(s.teacher, day, slot) {
            return false;
        }
        if state.teacher_busy(s.teacher, day, slot) {
            return false;
        }
        if s.day != day {
            if state.teacher_group_count(s.teacher, s.group, day)
                >= self.config.max_teacher_sessions_per_day
            {
                return false;
            }
            if state.subject_group_count(s.subject, s.group, day)
                >= self.config.max_subject_sessions_per_day
            {
                return false;
            }
        }
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Subject, Teacher};
    use crate::engine::state::Session;

    fn plan() -> Plan {
        Plan {
            teachers: vec![
                Teacher {
                    id: 1,
                    subject_ids: [10].into_iter().collect(),
                    availability: [(0, 7), (0, 8), (0, 9), (1, 7)].into_iter().collect(),
                    ..Default::default()
                },
                Teacher {
                    id: 2,
                    ..Default::default()
                },
            ],
            subjects: vec![
                Subject {
                    id: 10,
                    weekly_sessions: 4,
                    term: 1,
                    ..Default::default()
                },
                Subject {
                    id: 11,
                    weekly_sessions: 4,
                    term: 1,
                    ..Default::default()
                },
            ],
            groups: vec![
                Group {
                    id: 100,
                    term: 1,
                    ..Default::default()
                },
                Group {
                    id: 101,
                    term: 1,
                    ..Default::default()
                },
            ],
        }
    }

    fn session(teacher: usize, subject: usize, group: usize, day: u8, slot: u8) -> Session {
        Session {
            teacher,
            subject,
            group,
            day,
            slot,
        }
    }

    #[test]
    fn fallback_teacher_is_reported() {
        let p = plan();
        let cfg = EngineConfig::default();
        let mut diags = Vec::new();
        let ctx = RunContext::new(&p, &cfg, &mut diags);
        assert_eq!(diags, vec![Diagnostic::AvailabilityFallback { teacher: 2 }]);
        assert_eq!(ctx.certified, vec![vec![0], vec![]]);
    }

    #[test]
    fn can_place_enforces_availability_and_occupancy() {
        let p = plan();
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 2);

        assert!(ctx.can_place(&st, 0, 0, 0, 0, 0));
        assert!(!ctx.can_place(&st, 0, 0, 0, 0, 3), "hour 10 not declared");
        assert!(!ctx.can_place(&st, 1, 0, 0, 0, grid::BREAK_SLOT));

        st.place(session(0, 0, 0, 0, 0), ctx.scope_of(0));
        assert!(!ctx.can_place(&st, 0, 0, 1, 0, 0), "teacher already busy");
        assert!(!ctx.can_place(&st, 1, 1, 0, 0, 0), "group already busy");
    }

    #[test]
    fn daily_caps_block_third_session() {
        let p = plan();
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 2);
        st.place(session(0, 0, 0, 0, 0), ctx.scope_of(0));
        st.place(session(0, 0, 0, 0, 1), ctx.scope_of(0));

        assert!(!ctx.can_place(&st, 0, 0, 0, 0, 2), "teacher/group cap");
        assert!(!ctx.can_place(&st, 1, 0, 0, 0, 2), "subject/group cap");
        assert!(ctx.can_place(&st, 1, 1, 0, 0, 2));
    }

    #[test]
    fn exclusivity_scope_group_vs_term() {
        let p = plan();

        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 2);
        st.place(session(1, 0, 0, 0, 0), ctx.scope_of(0));
        assert!(!ctx.can_place(&st, 1, 1, 0, 1, 0), "other subject, same group");
        assert!(ctx.can_place(&st, 1, 1, 1, 1, 0), "other group is a new scope");

        let cfg = EngineConfig {
            exclusivity_scope: ExclusivityScope::Term,
            ..Default::default()
        };
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 2);
        st.place(session(1, 0, 0, 0, 0), ctx.scope_of(0));
        assert!(!ctx.can_place(&st, 1, 1, 1, 1, 0), "same term across groups");
        assert!(ctx.can_place(&st, 1, 0, 1, 1, 0));
    }

    #[test]
    fn can_relocate_checks_caps_only_across_days() {
        let p = plan();
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 2);
        let a = st.place(session(1, 1, 0, 0, 0), ctx.scope_of(0));
        st.place(session(1, 1, 0, 1, 0), ctx.scope_of(0));
        st.place(session(1, 1, 0, 1, 1), ctx.scope_of(0));

        assert!(ctx.can_relocate(&st, a, 0, 2), "same day, free slot");
        assert!(!ctx.can_relocate(&st, a, 0, 0), "no-op move");
        assert!(!ctx.can_relocate(&st, a, 1, 2), "day 1 already at cap");
        assert!(ctx.can_relocate(&st, a, 2, 0));
    }
}
