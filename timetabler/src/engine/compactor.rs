/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Intra-day gap compaction.
//!
//! Sessions only move within their weekday, so the per-day counters are
//! untouched; each move still re-checks teacher availability and global
//! teacher occupancy through [`RunContext::can_relocate`].
//!
//! Days still above `gap_tolerance` are reported by [`report_stalled`], which
//! the engine calls once the balancing passes are done.

use tracing::{debug, warn};

use crate::grid::{self, SlotId, Weekday, DAYS};

use super::context::RunContext;
use super::error::Diagnostic;
use super::state::RunState;

/// Compact every `(group, weekday)` of the run.  Returns the days left
/// above `gap_tolerance`.
pub(crate) fn compact(ctx: &RunContext<'_>, state: &mut RunState) -> usize {
    let mut above = 0;
    for group in 0..ctx.plan.groups.len() {
        for day in 0..DAYS as Weekday {
            if compact_day(ctx, state, group, day) > ctx.config.gap_tolerance {
                above += 1;
            }
        }
    }
    above
}

/// Push a [`Diagnostic::CompactionStalled`] for every `(group, weekday)`
/// currently above `gap_tolerance`.  Returns how many were pushed.
pub(crate) fn report_stalled(
    ctx: &RunContext<'_>,
    state: &RunState,
    diagnostics: &mut Vec<Diagnostic>,
) -> usize {
    let before = diagnostics.len();
    for (group, g) in ctx.plan.groups.iter().enumerate() {
        for day in 0..DAYS as Weekday {
            let gaps = grid::internal_gaps(&state.group_day_slots(group, day));
            if gaps > ctx.config.gap_tolerance {
                warn!(group = g.id, day, gaps, "compaction stalled");
                diagnostics.push(Diagnostic::CompactionStalled {
                    group: g.id,
                    weekday: day,
                    gaps,
                });
            }
        }
    }
    diagnostics.len() - before
}

/// Compact one group's day.  Returns the internal gaps left.
///
/// 1. Target range: the first `n` teaching slots from the earliest occupied
///    one, `n` = sessions that day.  Every empty target is filled with the
///    nearest session lying outside the range.
/// 2. Up to `compaction_passes` extra passes move the latest session into
///    the earliest interior hole that accepts it, stopping once the day is
///    within `gap_tolerance`.
pub(crate) fn compact_day(
    ctx: &RunContext<'_>,
    state: &mut RunState,
    group: usize,
    day: Weekday,
) -> usize {
    let current = state.group_day_sessions(group, day);
    if current.len() < 2 {
        return 0;
    }
    let before = grid::internal_gaps(&state.group_day_slots(group, day));
    if before == 0 {
        return 0;
    }

    let earliest = state.sessions()[current[0]].slot;
    let targets: Vec<SlotId> = grid::teaching_slots()
        .map(|s| s.id)
        .filter(|&id| id >= earliest)
        .take(current.len())
        .collect();

    for &target in &targets {
        if state.group_busy(group, day, target) {
            continue;
        }
        let mut outside: Vec<usize> = state
            .group_day_sessions(group, day)
            .into_iter()
            .filter(|&i| !targets.contains(&state.sessions()[i].slot))
            .collect();
        outside.sort_by_key(|&i| state.sessions()[i].slot.abs_diff(target));

        if let Some(&idx) = outside
            .iter()
            .find(|&&i| ctx.can_relocate(state, i, day, target))
        {
            debug!(
                group = ctx.plan.groups[group].id,
                day,
                from = state.sessions()[idx].slot,
                to = target,
                "compacted"
            );
            state.relocate(idx, day, target);
        }
    }

    let tolerance = ctx.config.gap_tolerance;
    for _ in 0..ctx.config.compaction_passes {
        let slots = state.group_day_slots(group, day);
        if grid::internal_gaps(&slots) <= tolerance {
            break;
        }
        let Some(&latest) = state.group_day_sessions(group, day).last() else {
            break;
        };
        let hole = grid::interior_holes(&slots)
            .find(|&h| ctx.can_relocate(state, latest, day, h));
        match hole {
            Some(h) => state.relocate(latest, day, h),
            None => break,
        }
    }

    grid::internal_gaps(&state.group_day_slots(group, day))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
