/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Preceptor assignment: one preferred teacher per subject of a group.
//!
//! Runs for a group immediately before the group is filled, so "remaining
//! availability" already accounts for every group filled earlier in the run.
//! Nothing is placed here; the result is only the teacher the slot filler
//! tries first.

use tracing::{debug, warn};

use super::context::RunContext;
use super::error::Diagnostic;
use super::state::RunState;

/// Choose a preceptor for each of `subjects` (indices) in `group`.
///
/// Returns one entry per subject, in the same order.  `None` means every
/// candidate was already reserved for a different subject in this scope; the
/// filler then goes straight to the alternate tier.
///
/// # Selection rule
/// * Pool: teachers certified for the subject, or every teacher of the run
///   if none is certified (reported as [`Diagnostic::UncertifiedSubject`]).
/// * Winner: greatest `available cells − occupied cells`; ties go to the
///   first candidate in input order.
/// * The winner is reserved for the subject in the group's exclusivity scope
///   and is not offered for a different subject in that scope afterwards.
pub(crate) fn choose_preceptors(
    ctx: &RunContext<'_>,
    state: &mut RunState,
    group: usize,
    subjects: &[usize],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Option<usize>> {
    let scope = ctx.scope_of(group);
    let group_id = ctx.plan.groups[group].id;
    let all_teachers: Vec<usize> = (0..ctx.plan.teachers.len()).collect();

    let mut chosen = Vec::with_capacity(subjects.len());
    for &subject in subjects {
        let subject_id = ctx.plan.subjects[subject].id;

        let pool: &[usize] = if ctx.certified[subject].is_empty() {
            warn!(
                group = group_id,
                subject = subject_id,
                "no certified teacher — preceptor pool relaxed to every teacher"
            );
            diagnostics.push(Diagnostic::UncertifiedSubject {
                group: group_id,
                subject: subject_id,
            });
            &all_teachers
        } else {
            &ctx.certified[subject]
        };

        let mut best: Option<(usize, i64)> = None;
        for &teacher in pool {
            let taken_elsewhere = |other: Option<usize>| other.is_some_and(|s| s != subject);
            if taken_elsewhere(state.reserved_subject(teacher, scope))
                || taken_elsewhere(state.bound_subject(teacher, scope))
            {
                continue;
            }

            let remaining =
                ctx.availability[teacher].len() as i64 - state.occupied_cells(teacher) as i64;
            if best.map_or(true, |(_, r)| remaining > r) {
                best = Some((teacher, remaining));
            }
        }

        match best {
            Some((teacher, remaining)) => {
                state.reserve(teacher, scope, subject);
                debug!(
                    group = group_id,
                    subject = subject_id,
                    teacher = ctx.plan.teachers[teacher].id,
                    remaining,
                    "preceptor chosen"
                );
            }
            None => {
                debug!(
                    group = group_id,
                    subject = subject_id,
                    "every candidate is reserved for another subject — no preceptor"
                );
            }
        }
        chosen.push(best.map(|(t, _)| t));
    }
    chosen
}

// ── Tests ─────────────────────────────────────────────────────────────────────
