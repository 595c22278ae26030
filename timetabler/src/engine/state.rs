/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Run-scoped mutable state.
//!
//! Every counter the passes need lives here, keyed by small integer indices
//! into the [`Plan`](crate::model::Plan) vectors.  A fresh `RunState` is built
//! for each call to `generate()` and dropped at the end of it, so concurrent
//! runs never share anything mutable.
//!
//! All mutation goes through [`RunState::place`] and [`RunState::relocate`],
//! which keep the occupancy masks and per-day counters consistent with the
//! session list.

use std::collections::BTreeMap;

use crate::grid::{self, SlotId, Weekday, DAYS};
use crate::model::{Assignment, Plan, Term};

// ── Session ───────────────────────────────────────────────────────────────────

/// A placed session, in index form.
///
/// `teacher`, `subject` and `group` are fixed at creation; only `day` and
/// `slot` change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Session {
    pub teacher: usize,
    pub subject: usize,
    pub group: usize,
    pub day: Weekday,
    pub slot: SlotId,
}

// ── WeekMask ──────────────────────────────────────────────────────────────────

/// One bit per `(weekday, slot)` cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WeekMask([u16; DAYS]);

impl WeekMask {
    pub fn contains(&self, day: Weekday, slot: SlotId) -> bool {
        (self.0[day as usize] >> slot) & 1 == 1
    }

    pub fn insert(&mut self, day: Weekday, slot: SlotId) {
        self.0[day as usize] |= 1u16 << slot;
    }

    pub fn remove(&mut self, day: Weekday, slot: SlotId) {
        self.0[day as usize] &= !(1u16 << slot);
    }

    /// Number of occupied cells across the week.
    pub fn count(&self) -> usize {
        self.0.iter().map(|d| d.count_ones() as usize).sum()
    }

    /// Occupied slots of `day`, ascending.
    pub fn slots_on(&self, day: Weekday) -> Vec<SlotId> {
        let bits = self.0[day as usize];
        (0..16u8).filter(|&s| (bits >> s) & 1 == 1).collect()
    }
}

// ── Exclusivity scope ─────────────────────────────────────────────────────────

/// Key under which a teacher is bound to one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum ScopeKey {
    Group(usize),
    Term(Term),
}

// ── RunState ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct RunState {
    n_groups: usize,
    sessions: Vec<Session>,

    /// Global teacher occupancy: teacher → cells.
    teacher_busy: Vec<WeekMask>,
    /// Group occupancy: group → cells.
    group_busy: Vec<WeekMask>,

    /// `[teacher * n_groups + group][day]` → sessions.
    teacher_group_day: Vec<[u8; DAYS]>,
    /// `[subject * n_groups + group][day]` → sessions.
    subject_group_day: Vec<[u8; DAYS]>,

    /// Subject a teacher is bound to once it has placed a session in a scope.
    bindings: BTreeMap<(usize, ScopeKey), usize>,
    /// Subject a teacher was chosen as preceptor for, per scope.
    reservations: BTreeMap<(usize, ScopeKey), usize>,
}

impl RunState {
    pub fn new(n_teachers: usize, n_subjects: usize, n_groups: usize) -> Self {
        Self {
            n_groups,
            sessions: Vec::new(),
            teacher_busy: vec![WeekMask::default(); n_teachers],
            group_busy: vec![WeekMask::default(); n_groups],
            teacher_group_day: vec![[0; DAYS]; n_teachers * n_groups],
            subject_group_day: vec![[0; DAYS]; n_subjects * n_groups],
            bindings: BTreeMap::new(),
            reservations: BTreeMap::new(),
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Record a new session and bind its teacher to its subject in `scope`.
    ///
    /// The caller has already checked every constraint.  Returns the index of
    /// the new session.
    pub fn place(&mut self, session: Session, scope: ScopeKey) -> usize {
        let Session {
            teacher,
            subject,
            group,
            day,
            slot,
        } = session;

        self.teacher_busy[teacher].insert(day, slot);
        self.group_busy[group].insert(day, slot);
        self.teacher_group_day[teacher * self.n_groups + group][day as usize] += 1;
        self.subject_group_day[subject * self.n_groups + group][day as usize] += 1;
        self.bindings.insert((teacher, scope), subject);

        self.sessions.push(session);
        self.sessions.len() - 1
    }

    /// Move session `idx` to `(day, slot)`, keeping every counter in step.
    pub fn relocate(&mut self, idx: usize, day: Weekday, slot: SlotId) {
        let s = self.sessions[idx];
        let n = self.n_groups;

        self.teacher_busy[s.teacher].remove(s.day, s.slot);
        self.group_busy[s.group].remove(s.day, s.slot);
        self.teacher_busy[s.teacher].insert(day, slot);
        self.group_busy[s.group].insert(day, slot);

        if s.day != day {
            let tg = &mut self.teacher_group_day[s.teacher * n + s.group];
            tg[s.day as usize] = tg[s.day as usize].saturating_sub(1);
            tg[day as usize] += 1;

            let sg = &mut self.subject_group_day[s.subject * n + s.group];
            sg[s.day as usize] = sg[s.day as usize].saturating_sub(1);
            sg[day as usize] += 1;
        }

        let moved = &mut self.sessions[idx];
        moved.day = day;
        moved.slot = slot;
    }

    pub fn reserve(&mut self, teacher: usize, scope: ScopeKey, subject: usize) {
        self.reservations.insert((teacher, scope), subject);
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn teacher_busy(&self, teacher: usize, day: Weekday, slot: SlotId) -> bool {
        self.teacher_busy[teacher].contains(day, slot)
    }

    pub fn group_busy(&self, group: usize, day: Weekday, slot: SlotId) -> bool {
        self.group_busy[group].contains(day, slot)
    }

    /// Cells the teacher already occupies across all groups.
    pub fn occupied_cells(&self, teacher: usize) -> usize {
        self.teacher_busy[teacher].count()
    }

    pub fn teacher_group_count(&self, teacher: usize, group: usize, day: Weekday) -> u8 {
        self.teacher_group_day[teacher * self.n_groups + group][day as usize]
    }

    pub fn subject_group_count(&self, subject: usize, group: usize, day: Weekday) -> u8 {
        self.subject_group_day[subject * self.n_groups + group][day as usize]
    }

    pub fn bound_subject(&self, teacher: usize, scope: ScopeKey) -> Option<usize> {
        self.bindings.get(&(teacher, scope)).copied()
    }

    pub fn reserved_subject(&self, teacher: usize, scope: ScopeKey) -> Option<usize> {
        self.reservations.get(&(teacher, scope)).copied()
    }

    /// Indices of the group's sessions on `day`, sorted by slot.
    pub fn group_day_sessions(&self, group: usize, day: Weekday) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.group == group && s.day == day)
            .map(|(i, _)| i)
            .collect();
        idx.sort_by_key(|&i| self.sessions[i].slot);
        idx
    }

    /// Occupied slots of the group on `day`, ascending.
    pub fn group_day_slots(&self, group: usize, day: Weekday) -> Vec<SlotId> {
        self.group_busy[group].slots_on(day)
    }

    /// Sessions per weekday for the group.
    pub fn group_day_counts(&self, group: usize) -> [usize; DAYS] {
        let mut counts = [0; DAYS];
        for (day, c) in counts.iter_mut().enumerate() {
            *c = self.group_busy[group].slots_on(day as Weekday).len();
        }
        counts
    }

    /// Free teaching slots of the group on `day`, ascending.
    pub fn group_free_slots(&self, group: usize, day: Weekday) -> Vec<SlotId> {
        grid::teaching_slots()
            .map(|s| s.id)
            .filter(|&id| !self.group_busy(group, day, id))
            .collect()
    }

    /// Convert to the public output form, preserving creation order.
    pub fn to_assignments(&self, plan: &Plan) -> Vec<Assignment> {
        self.sessions
            .iter()
            .map(|s| {
                let hour = grid::start_hour(s.slot);
                Assignment {
                    teacher_id: plan.teachers[s.teacher].id,
                    subject_id: plan.subjects[s.subject].id,
                    group_id: plan.groups[s.group].id,
                    weekday: s.day,
                    slot: s.slot,
                    start_hour: hour,
                    end_hour: grid::slot(s.slot).map(|t| t.end_hour).unwrap_or(hour + 1),
                }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

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
    fn week_mask_tracks_cells() {
        let mut m = WeekMask::default();
        m.insert(0, 3);
        m.insert(4, 8);
        assert!(m.contains(0, 3));
        assert!(!m.contains(1, 3));
        assert_eq!(m.count(), 2);
        assert_eq!(m.slots_on(4), vec![8]);
        m.remove(0, 3);
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn place_updates_every_counter() {
        let mut st = RunState::new(2, 2, 2);
        st.place(session(1, 0, 1, 2, 5), ScopeKey::Group(1));

        assert!(st.teacher_busy(1, 2, 5));
        assert!(st.group_busy(1, 2, 5));
        assert!(!st.group_busy(0, 2, 5));
        assert_eq!(st.occupied_cells(1), 1);
        assert_eq!(st.teacher_group_count(1, 1, 2), 1);
        assert_eq!(st.subject_group_count(0, 1, 2), 1);
        assert_eq!(st.bound_subject(1, ScopeKey::Group(1)), Some(0));
        assert_eq!(st.bound_subject(1, ScopeKey::Group(0)), None);
    }

    #[test]
    fn relocate_across_days_moves_counters() {
        let mut st = RunState::new(1, 1, 1);
        let i = st.place(session(0, 0, 0, 0, 0), ScopeKey::Group(0));
        st.relocate(i, 3, 6);

        assert!(!st.teacher_busy(0, 0, 0));
        assert!(st.teacher_busy(0, 3, 6));
        assert!(st.group_busy(0, 3, 6));
        assert_eq!(st.teacher_group_count(0, 0, 0), 0);
        assert_eq!(st.teacher_group_count(0, 0, 3), 1);
        assert_eq!(st.subject_group_count(0, 0, 3), 1);
        assert_eq!(st.sessions()[i].day, 3);
        assert_eq!(st.sessions()[i].slot, 6);
    }

    #[test]
    fn group_day_queries() {
        let mut st = RunState::new(2, 2, 1);
        st.place(session(0, 0, 0, 1, 7), ScopeKey::Group(0));
        st.place(session(1, 1, 0, 1, 2), ScopeKey::Group(0));
        st.place(session(0, 0, 0, 2, 0), ScopeKey::Group(0));

        assert_eq!(st.group_day_sessions(0, 1), vec![1, 0]);
        assert_eq!(st.group_day_slots(0, 1), vec![2, 7]);
        assert_eq!(st.group_day_counts(0), [0, 2, 1, 0, 0]);
        let free = st.group_free_slots(0, 1);
        assert!(!free.contains(&2) && !free.contains(&7));
        assert!(!free.contains(&grid::BREAK_SLOT));
        assert_eq!(free.len(), 6);
    }
}
