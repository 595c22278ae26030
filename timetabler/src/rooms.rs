/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Classroom binding for a generated timetable.
//!
//! Runs after the engine and never moves a session.  Rooms are tried largest
//! capacity first; a session takes the first room that is free at its
//! `(weekday, start hour)` and in which its teacher has not already taught a
//! different subject anywhere in the week.  Sessions with no such room stay
//! unbound.
//!
//! The binding depends on the engine's output order: the same assignment
//! list always produces the same rooms.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::{Hour, Weekday};
use crate::model::{Assignment, SubjectId, TeacherId};

pub type RoomId = u32;

/// A classroom.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
    /// Rooms marked unavailable are skipped entirely.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Bind each assignment to a room.
///
/// Returns one entry per assignment, in the same order; `None` means no room
/// satisfied the constraints.
pub fn assign_rooms(assignments: &[Assignment], rooms: &[Room]) -> Vec<Option<RoomId>> {
    // Stable sort: equal capacities keep input order
    let mut by_capacity: Vec<&Room> = rooms.iter().filter(|r| r.available).collect();
    by_capacity.sort_by(|a, b| b.capacity.cmp(&a.capacity));

    let mut occupied: HashSet<(RoomId, Weekday, Hour)> = HashSet::new();
    let mut teacher_room_subjects: BTreeMap<(TeacherId, RoomId), BTreeSet<SubjectId>> =
        BTreeMap::new();

    let mut bound = Vec::with_capacity(assignments.len());
    for a in assignments {
        let choice = by_capacity.iter().find(|room| {
            if occupied.contains(&(room.id, a.weekday, a.start_hour)) {
                return false;
            }
            match teacher_room_subjects.get(&(a.teacher_id, room.id)) {
                Some(subjects) => subjects.contains(&a.subject_id),
                None => true,
            }
        });

        match choice {
            Some(room) => {
                occupied.insert((room.id, a.weekday, a.start_hour));
                teacher_room_subjects
                    .entry((a.teacher_id, room.id))
                    .or_default()
                    .insert(a.subject_id);
                debug!(
                    teacher = a.teacher_id,
                    group = a.group_id,
                    day = a.weekday,
                    hour = a.start_hour,
                    room = room.id,
                    "room bound"
                );
                bound.push(Some(room.id));
            }
            None => {
                warn!(
                    teacher = a.teacher_id,
                    subject = a.subject_id,
                    group = a.group_id,
                    day = a.weekday,
                    hour = a.start_hour,
                    "no room available for session"
                );
                bound.push(None);
            }
        }
    }
    bound
}

// ── Tests ─────────────────────────────────────────────────────────────────────
