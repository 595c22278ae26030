/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cross-day load balancing.
//!
//! Two bounded passes run after compaction:
//!
//! * [`balance_inter_day`]: moves a session from a day with few internal
//!   gaps into an interior hole of the day with the most.
//! * [`balance_weekly`]: moves sessions from the busiest day to the
//!   lightest until the daily counts differ by at most one.
//!
//! Both stop when their goal is met, when no move is possible, or when the
//! iteration budget from [`EngineConfig`](crate::config::EngineConfig) is
//! spent.  Only `(day, slot)` of a session ever changes.

use tracing::debug;

use crate::grid::{self, SlotId, Weekday, DAYS};

use super::context::RunContext;
use super::state::RunState;

// ── Inter-day ─────────────────────────────────────────────────────────────────

/// Run the inter-day gap balancer over every group.  Returns moves made.
pub(crate) fn balance_inter_day(ctx: &RunContext<'_>, state: &mut RunState) -> usize {
    let mut moves = 0;
    for group in 0..ctx.plan.groups.len() {
        for _ in 0..ctx.config.inter_day_passes {
            if !inter_day_step(ctx, state, group) {
                break;
            }
            moves += 1;
        }
    }
    moves
}

fn day_gaps(state: &RunState, group: usize) -> [usize; DAYS] {
    let mut gaps = [0; DAYS];
    for (day, g) in gaps.iter_mut().enumerate() {
        *g = grid::internal_gaps(&state.group_day_slots(group, day as Weekday));
    }
    gaps
}

/// Gaps of `slots` once `from` is removed and `to` is added.
fn gaps_after(slots: &[SlotId], from: Option<SlotId>, to: Option<SlotId>) -> usize {
    let mut next: Vec<SlotId> = slots.iter().copied().filter(|&s| Some(s) != from).collect();
    next.extend(to);
    grid::internal_gaps(&next)
}

/// One inter-day move for `group`, if one is possible and beneficial.
///
/// Donor days are tried from the fewest gaps upward; empty days donate
/// nothing.  A move is kept only if it lowers the combined gaps of the two
/// days.
fn inter_day_step(ctx: &RunContext<'_>, state: &mut RunState, group: usize) -> bool {
    let gaps = day_gaps(state, group);

    // Most gaps first; stable, so Monday wins ties.
    let mut days: Vec<Weekday> = (0..DAYS as Weekday).collect();
    days.sort_by_key(|&d| std::cmp::Reverse(gaps[d as usize]));
    let Some(&most) = days.first() else {
        return false;
    };
    if gaps[most as usize] <= ctx.config.gap_tolerance {
        return false;
    }

    let most_slots = state.group_day_slots(group, most);
    let holes: Vec<SlotId> = grid::interior_holes(&most_slots).collect();

    for &donor_day in days.iter().rev().filter(|&&d| d != most) {
        let donor_slots = state.group_day_slots(group, donor_day);
        if donor_slots.is_empty() {
            continue;
        }
        let before = gaps[most as usize] + gaps[donor_day as usize];

        // Latest session first: taking from the edge of a day opens no new gap.
        let mut donors = state.group_day_sessions(group, donor_day);
        donors.reverse();

        for &hole in &holes {
            for &idx in &donors {
                let from = state.sessions()[idx].slot;
                let after = gaps_after(&most_slots, None, Some(hole))
                    + gaps_after(&donor_slots, Some(from), None);
                if after >= before || !ctx.can_relocate(state, idx, most, hole) {
                    continue;
                }
                debug!(
                    group = ctx.plan.groups[group].id,
                    from_day = donor_day,
                    from_slot = from,
                    to_day = most,
                    to_slot = hole,
                    "inter-day move"
                );
                state.relocate(idx, most, hole);
                return true;
            }
        }
    }
    false
}

// ── Weekly ────────────────────────────────────────────────────────────────────

/// Run the weekly count balancer over every group.  Returns moves made.
pub(crate) fn balance_weekly(ctx: &RunContext<'_>, state: &mut RunState) -> usize {
    let mut moves = 0;
    for group in 0..ctx.plan.groups.len() {
        for _ in 0..ctx.config.weekly_passes {
            if !weekly_step(ctx, state, group) {
                break;
            }
            moves += 1;
        }
    }
    moves
}

/// One weekly move for `group`.
///
/// Source: a day with the maximum count.  Destination: the lightest day
/// that still accepts a session, trying heavier candidates when the
/// lightest is blocked.  The session lands on the earliest free slot of the
/// destination that its teacher can take.
///
/// Moves that keep both days within `max(gap_tolerance, current gaps)` are
/// tried first; only when none exists is any move allowed by
/// [`RunContext::can_relocate`] taken.
fn weekly_step(ctx: &RunContext<'_>, state: &mut RunState, group: usize) -> bool {
    let counts = state.group_day_counts(group);
    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    if max <= min + 1 {
        return false;
    }

    let sources: Vec<Weekday> = (0..DAYS as Weekday)
        .filter(|&d| counts[d as usize] == max)
        .collect();
    let mut destinations: Vec<Weekday> = (0..DAYS as Weekday)
        .filter(|&d| counts[d as usize] + 1 < max)
        .collect();
    destinations.sort_by_key(|&d| counts[d as usize]);

    for keep_compact in [true, false] {
        let Some((idx, dest, slot)) =
            weekly_move(ctx, state, group, &sources, &destinations, keep_compact)
        else {
            continue;
        };
        debug!(
            group = ctx.plan.groups[group].id,
            from_day = state.sessions()[idx].day,
            from_slot = state.sessions()[idx].slot,
            to_day = dest,
            to_slot = slot,
            keep_compact,
            "weekly move"
        );
        state.relocate(idx, dest, slot);
        return true;
    }
    false
}

/// First `(session, day, slot)` move from `sources` to `destinations`.
fn weekly_move(
    ctx: &RunContext<'_>,
    state: &RunState,
    group: usize,
    sources: &[Weekday],
    destinations: &[Weekday],
    keep_compact: bool,
) -> Option<(usize, Weekday, SlotId)> {
    let tolerance = ctx.config.gap_tolerance;

    for &dest in destinations {
        let dest_slots = state.group_day_slots(group, dest);
        let dest_limit = grid::internal_gaps(&dest_slots).max(tolerance);

        for &src in sources {
            let src_slots = state.group_day_slots(group, src);
            let src_limit = grid::internal_gaps(&src_slots).max(tolerance);
            let mut donors = state.group_day_sessions(group, src);
            donors.reverse();

            for slot in state.group_free_slots(group, dest) {
                if keep_compact && gaps_after(&dest_slots, None, Some(slot)) > dest_limit {
                    continue;
                }
                let pick = donors.iter().copied().find(|&i| {
                    let from = state.sessions()[i].slot;
                    (!keep_compact || gaps_after(&src_slots, Some(from), None) <= src_limit)
                        && ctx.can_relocate(state, i, dest, slot)
                });
                if let Some(idx) = pick {
                    return Some((idx, dest, slot));
                }
            }
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
