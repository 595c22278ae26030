/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The fixed weekly teaching grid.
//!
//! Five weekdays × nine ordinal slots.  Slot 4 is the midday break and is
//! never assignable.  Its start hour coincides with slot 5, which is why
//! availability lookups always go through [`TimeSlot::start_hour`] of a
//! teaching slot and never through the break.
//!
//! ```text
//! slot   0    1    2    3    4      5     6     7     8
//! hour   7-8  8-9  9-10 10-11 break 11-12 12-13 13-14 14-15
//! ```
//!
//! These are free functions rather than methods on a grid object because the
//! grid is a compile-time constant for every run.

use serde::Serialize;

/// Weekday index, `0` = Monday … `4` = Friday.
pub type Weekday = u8;

/// Ordinal slot index within a day, `0..SLOTS_PER_DAY`.
pub type SlotId = u8;

/// Wall-clock hour (24 h) at which a slot starts or ends.
pub type Hour = u8;

/// Number of teaching weekdays in the grid.
pub const DAYS: usize = 5;

/// Number of ordinal slots per day, break included.
pub const SLOTS_PER_DAY: usize = 9;

/// The non-teaching midday slot.
pub const BREAK_SLOT: SlotId = 4;

/// Display names used by the report and the CLI.
pub const WEEKDAY_NAMES: [&str; DAYS] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

// ── TimeSlot ──────────────────────────────────────────────────────────────────

/// One cell of a day: ordinal index, hour range and break flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub start_hour: Hour,
    pub end_hour: Hour,
    pub is_break: bool,
}

impl TimeSlot {
    const fn teaching(id: SlotId, start_hour: Hour) -> Self {
        Self {
            id,
            start_hour,
            end_hour: start_hour + 1,
            is_break: false,
        }
    }
}

/// The per-day slot table, identical for every weekday.
pub const SLOTS: [TimeSlot; SLOTS_PER_DAY] = [
    TimeSlot::teaching(0, 7),
    TimeSlot::teaching(1, 8),
    TimeSlot::teaching(2, 9),
    TimeSlot::teaching(3, 10),
    TimeSlot {
        id: BREAK_SLOT,
        start_hour: 11,
        end_hour: 11,
        is_break: true,
    },
    TimeSlot::teaching(5, 11),
    TimeSlot::teaching(6, 12),
    TimeSlot::teaching(7, 13),
    TimeSlot::teaching(8, 14),
];

// ── Lookups ───────────────────────────────────────────────────────────────────

/// Returns the slot with ordinal `id`, or `None` if it is outside the grid.
pub fn slot(id: SlotId) -> Option<&'static TimeSlot> {
    SLOTS.get(id as usize)
}

/// Start hour of slot `id`.
///
/// Falls back to `0` for an out-of-grid id; callers only pass ids they took
/// from [`teaching_slots`].
pub fn start_hour(id: SlotId) -> Hour {
    slot(id).map(|s| s.start_hour).unwrap_or(0)
}

/// Iterator over the assignable slots of a day, in chronological order.
pub fn teaching_slots() -> impl Iterator<Item = &'static TimeSlot> + Clone {
    SLOTS.iter().filter(|s| !s.is_break)
}

/// Returns `true` if `id` is a slot that may carry a session.
pub fn is_teaching_slot(id: SlotId) -> bool {
    slot(id).is_some_and(|s| !s.is_break)
}

/// Every `(weekday, start hour)` pair of a teaching slot.
///
/// This is the full-availability set used when a teacher declares nothing.
pub fn all_teaching_hours() -> impl Iterator<Item = (Weekday, Hour)> {
    (0..DAYS as Weekday).flat_map(|day| teaching_slots().map(move |s| (day, s.start_hour)))
}

/// Every `(weekday, slot)` cell of the week in chronological order, break
/// excluded.
pub fn teaching_cells() -> Vec<(Weekday, SlotId)> {
    (0..DAYS as Weekday)
        .flat_map(|day| teaching_slots().map(move |s| (day, s.id)))
        .collect()
}

// ── Gap analysis ──────────────────────────────────────────────────────────────

/// Number of internal gaps: teaching slots strictly between the earliest and
/// latest occupied slot that are themselves unoccupied.
///
/// `occupied` need not be sorted.  The break slot never counts as a gap.
pub fn internal_gaps(occupied: &[SlotId]) -> usize {
    interior_holes(occupied).count()
}

/// All internal gaps in chronological order.
pub fn interior_holes(occupied: &[SlotId]) -> impl Iterator<Item = SlotId> + '_ {
    let lo = occupied.iter().copied().min();
    let hi = occupied.iter().copied().max();
    teaching_slots()
        .map(|s| s.id)
        .filter(move |&id| match (lo, hi) {
            (Some(lo), Some(hi)) => id > lo && id < hi && !occupied.contains(&id),
            _ => false,
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
