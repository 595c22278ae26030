/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tiered greedy slot filler.
//!
//! Walks the week cell by cell for one group.  At every cell the subjects that
//! still need sessions are considered in order of remaining demand (largest
//! first, input order on ties); the first subject that can be placed at that
//! cell takes it, so a cell carries at most one session of the group.
//!
//! For each subject the candidate teachers are tried tier by tier:
//!
//! ```text
//! Preferred ──► Alternate (certified) ──► Emergency (any teacher)
//! ```
//!
//! Reservations only steer the Preferred tier: a teacher reserved as
//! preceptor of another subject stays a fallback until a placement actually
//! binds it.  Every placement goes through [`RunContext::can_place`], so the
//! hard constraints hold after every step and the subject quota is never
//! exceeded.

use tracing::{debug, info, warn};

use crate::grid::{SlotId, Weekday};

use super::context::RunContext;
use super::error::Diagnostic;
use super::state::{RunState, Session};

// ── Candidate tiers ───────────────────────────────────────────────────────────

/// Teacher-selection strategy, evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CandidateTier {
    /// The subject's preceptor for this group.
    Preferred,
    /// Other teachers certified for the subject, input order.
    Alternate,
    /// Every remaining teacher of the run, certified or not.
    Emergency,
}

impl CandidateTier {
    pub const ALL: [CandidateTier; 3] = [
        CandidateTier::Preferred,
        CandidateTier::Alternate,
        CandidateTier::Emergency,
    ];

    /// Teachers offered by this tier.  No teacher appears in two tiers.
    fn candidates(
        self,
        ctx: &RunContext<'_>,
        subject: usize,
        preceptor: Option<usize>,
    ) -> Vec<usize> {
        let certified = &ctx.certified[subject];
        match self {
            CandidateTier::Preferred => preceptor.into_iter().collect(),
            CandidateTier::Alternate => certified
                .iter()
                .copied()
                .filter(|&t| Some(t) != preceptor)
                .collect(),
            CandidateTier::Emergency => (0..ctx.plan.teachers.len())
                .filter(|&t| Some(t) != preceptor && !certified.contains(&t))
                .collect(),
        }
    }
}

impl std::fmt::Display for CandidateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CandidateTier::Preferred => "preferred",
            CandidateTier::Alternate => "alternate",
            CandidateTier::Emergency => "emergency",
        };
        f.write_str(s)
    }
}

/// Flattened `(tier, teacher)` list for one subject.
fn candidate_chain(
    ctx: &RunContext<'_>,
    subject: usize,
    preceptor: Option<usize>,
) -> Vec<(CandidateTier, usize)> {
    CandidateTier::ALL
        .iter()
        .flat_map(|&tier| {
            tier.candidates(ctx, subject, preceptor)
                .into_iter()
                .map(move |t| (tier, t))
        })
        .collect()
}

// ── Filler ────────────────────────────────────────────────────────────────────

/// Per-subject outcome of filling one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FillOutcome {
    pub subject: usize,
    pub requested: u32,
    pub placed: u32,
    pub emergency: u32,
}

/// Fill `group` with the sessions of `subjects` over `cells`.
///
/// `preceptors` is parallel to `subjects`.  Subjects that end below their
/// quota are reported as [`Diagnostic::Shortfall`], or as
/// [`Diagnostic::UnassignableSubject`] when nothing at all was placed.
pub(crate) fn fill_group(
    ctx: &RunContext<'_>,
    state: &mut RunState,
    group: usize,
    subjects: &[usize],
    preceptors: &[Option<usize>],
    cells: &[(Weekday, SlotId)],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<FillOutcome> {
    let scope = ctx.scope_of(group);
    let chains: Vec<Vec<(CandidateTier, usize)>> = subjects
        .iter()
        .zip(preceptors)
        .map(|(&s, &p)| candidate_chain(ctx, s, p))
        .collect();

    let mut outcomes: Vec<FillOutcome> = subjects
        .iter()
        .map(|&s| FillOutcome {
            subject: s,
            requested: ctx.plan.subjects[s].weekly_sessions,
            placed: 0,
            emergency: 0,
        })
        .collect();

    let mut order: Vec<usize> = (0..subjects.len()).collect();

    for &(day, slot) in cells {
        if state.group_busy(group, day, slot) {
            continue;
        }

        // Largest remaining demand first; `sort_by_key` is stable.
        order.retain(|&k| outcomes[k].placed < outcomes[k].requested);
        if order.is_empty() {
            break;
        }
        order.sort_by_key(|&k| std::cmp::Reverse(outcomes[k].requested - outcomes[k].placed));

        'subjects: for &k in &order {
            let subject = subjects[k];
            if state.subject_group_count(subject, group, day)
                >= ctx.config.max_subject_sessions_per_day
            {
                continue;
            }

            for &(tier, teacher) in &chains[k] {
                if !ctx.can_place(state, teacher, subject, group, day, slot) {
                    continue;
                }
                state.place(
                    Session {
                        teacher,
                        subject,
                        group,
                        day,
                        slot,
                    },
                    scope,
                );
                let out = &mut outcomes[k];
                out.placed += 1;
                if tier == CandidateTier::Emergency {
                    out.emergency += 1;
                }
                debug!(
                    group = ctx.plan.groups[group].id,
                    subject = ctx.plan.subjects[subject].id,
                    teacher = ctx.plan.teachers[teacher].id,
                    day,
                    slot,
                    %tier,
                    "session placed"
                );
                break 'subjects;
            }
        }
    }

    let group_id = ctx.plan.groups[group].id;
    for out in &outcomes {
        let subject_id = ctx.plan.subjects[out.subject].id;
        if out.emergency > 0 {
            info!(
                group = group_id,
                subject = subject_id,
                sessions = out.emergency,
                "uncertified teacher used at emergency tier"
            );
        }
        if out.placed == out.requested {
            continue;
        }
        if out.placed == 0 {
            warn!(
                group = group_id,
                subject = subject_id,
                requested = out.requested,
                "✗ subject unassignable"
            );
            diagnostics.push(Diagnostic::UnassignableSubject {
                group: group_id,
                subject: subject_id,
                requested: out.requested,
            });
        } else {
            warn!(
                group = group_id,
                subject = subject_id,
                requested = out.requested,
                placed = out.placed,
                "shortfall"
            );
            diagnostics.push(Diagnostic::Shortfall {
                group: group_id,
                subject: subject_id,
                requested: out.requested,
                placed: out.placed,
            });
        }
    }

    outcomes
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::grid;
    use crate::model::{Group, Plan, Subject, Teacher};

    fn teacher(id: u32, subjects: &[u32]) -> Teacher {
        Teacher {
            id,
            subject_ids: subjects.iter().copied().collect(),
            availability: grid::all_teaching_hours().collect(),
            ..Default::default()
        }
    }

    fn subject(id: u32, sessions: u32) -> Subject {
        Subject {
            id,
            weekly_sessions: sessions,
            term: 1,
            ..Default::default()
        }
    }

    fn one_group(teachers: Vec<Teacher>, subjects: Vec<Subject>) -> Plan {
        Plan {
            teachers,
            subjects,
            groups: vec![Group {
                id: 1,
                term: 1,
                ..Default::default()
            }],
        }
    }

    #[test]
    fn tiers_never_overlap() {
        let p = one_group(
            vec![teacher(1, &[10]), teacher(2, &[10]), teacher(3, &[])],
            vec![subject(10, 1)],
        );
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let chain = candidate_chain(&ctx, 0, Some(1));
        assert_eq!(
            chain,
            vec![
                (CandidateTier::Preferred, 1),
                (CandidateTier::Alternate, 0),
                (CandidateTier::Emergency, 2),
            ]
        );
    }

    #[test]
    fn reservation_does_not_hide_a_teacher_from_fallback_tiers() {
        let p = one_group(
            vec![teacher(1, &[10]), teacher(2, &[11])],
            vec![subject(10, 1), subject(11, 1)],
        );
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());

        // teacher 2 is the preceptor of subject 11, still an emergency pick for 10
        let chain = candidate_chain(&ctx, 0, Some(0));
        assert_eq!(
            chain,
            vec![(CandidateTier::Preferred, 0), (CandidateTier::Emergency, 1)]
        );
    }

    #[test]
    fn unbound_reserved_teacher_rescues_another_subject() {
        // teacher 1 is reserved for subject 100 but only free on Friday;
        // teacher 2 covers 100 on Monday, teacher 3 can never teach 200
        let mut friday = teacher(1, &[100]);
        friday.availability = grid::all_teaching_hours().filter(|&(d, _)| d == 4).collect();
        let mut monday = teacher(2, &[100]);
        monday.availability = [(0, 7), (0, 8)].into_iter().collect();
        let mut blocked = teacher(3, &[200]);
        blocked.availability = [(0, 7)].into_iter().collect();
        let p = one_group(
            vec![friday, monday, blocked],
            vec![subject(100, 2), subject(200, 2)],
        );
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(3, 2, 1);
        st.reserve(0, ctx.scope_of(0), 0);
        let mut diags = Vec::new();

        let out = fill_group(
            &ctx,
            &mut st,
            0,
            &[0, 1],
            &[Some(0), Some(2)],
            &grid::teaching_cells(),
            &mut diags,
        );
        assert_eq!(out[0].placed, 2);
        assert_eq!(out[1].placed, 2);
        assert_eq!(out[1].emergency, 2);
        assert!(diags.is_empty(), "{diags:?}");
        let rescued: Vec<_> = st
            .sessions()
            .iter()
            .filter(|s| s.subject == 1)
            .map(|s| (s.teacher, s.day, s.slot))
            .collect();
        assert_eq!(rescued, vec![(0, 4, 0), (0, 4, 1)]);
    }

    #[test]
    fn fills_quota_with_preferred_teacher() {
        let p = one_group(vec![teacher(1, &[10])], vec![subject(10, 4)]);
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(1, 1, 1);
        let mut diags = Vec::new();

        let out = fill_group(
            &ctx,
            &mut st,
            0,
            &[0],
            &[Some(0)],
            &grid::teaching_cells(),
            &mut diags,
        );
        assert_eq!(out[0].placed, 4);
        assert_eq!(out[0].emergency, 0);
        assert!(diags.is_empty());
        // two per day: Monday 0,1 then Tuesday 0,1
        let cells: Vec<_> = st.sessions().iter().map(|s| (s.day, s.slot)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn largest_remaining_demand_goes_first() {
        let p = one_group(
            vec![teacher(1, &[10]), teacher(2, &[11])],
            vec![subject(10, 1), subject(11, 3)],
        );
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 2, 1);

        fill_group(
            &ctx,
            &mut st,
            0,
            &[0, 1],
            &[Some(0), Some(1)],
            &grid::teaching_cells(),
            &mut Vec::new(),
        );
        let first = st.sessions()[0];
        assert_eq!((first.subject, first.day, first.slot), (1, 0, 0));
        assert_eq!(st.sessions().len(), 4);
    }

    #[test]
    fn falls_back_to_alternate_when_preferred_unavailable() {
        let mut preferred = teacher(1, &[10]);
        preferred.availability = [(3, 7)].into_iter().collect();
        let p = one_group(vec![preferred, teacher(2, &[10])], vec![subject(10, 2)]);
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(2, 1, 1);

        fill_group(
            &ctx,
            &mut st,
            0,
            &[0],
            &[Some(0)],
            &grid::teaching_cells(),
            &mut Vec::new(),
        );
        assert!(st.sessions().iter().all(|s| s.teacher == 1));
    }

    #[test]
    fn emergency_tier_uses_uncertified_teacher() {
        let p = one_group(vec![teacher(1, &[])], vec![subject(10, 2)]);
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(1, 1, 1);
        let mut diags = Vec::new();

        let out = fill_group(
            &ctx,
            &mut st,
            0,
            &[0],
            &[None],
            &grid::teaching_cells(),
            &mut diags,
        );
        assert_eq!(out[0].placed, 2);
        assert_eq!(out[0].emergency, 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn shortfall_when_availability_runs_out() {
        let mut t = teacher(1, &[10]);
        t.availability = [(0, 7), (2, 7)].into_iter().collect();
        let p = one_group(vec![t], vec![subject(10, 5)]);
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(1, 1, 1);
        let mut diags = Vec::new();

        fill_group(
            &ctx,
            &mut st,
            0,
            &[0],
            &[Some(0)],
            &grid::teaching_cells(),
            &mut diags,
        );
        assert_eq!(st.sessions().len(), 2);
        assert_eq!(
            diags,
            vec![Diagnostic::Shortfall {
                group: 1,
                subject: 10,
                requested: 5,
                placed: 2
            }]
        );
    }

    #[test]
    fn bound_teacher_leaves_second_subject_unassignable() {
        let p = one_group(vec![teacher(1, &[10])], vec![subject(10, 3), subject(11, 2)]);
        let cfg = EngineConfig::default();
        let ctx = RunContext::new(&p, &cfg, &mut Vec::new());
        let mut st = RunState::new(1, 2, 1);
        let mut diags = Vec::new();

        let out = fill_group(
            &ctx,
            &mut st,
            0,
            &[0, 1],
            &[Some(0), None],
            &grid::teaching_cells(),
            &mut diags,
        );
        assert_eq!(out[0].placed, 3);
        assert_eq!(out[1].placed, 0);
        assert_eq!(
            diags,
            vec![Diagnostic::UnassignableSubject {
                group: 1,
                subject: 11,
                requested: 2
            }]
        );
    }
}
