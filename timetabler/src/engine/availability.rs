/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-teacher availability resolution.
//!
//! A teacher with at least one declared cell is available exactly there.  A
//! teacher with none is treated as available in every teaching cell so that
//! an incompletely configured record does not silently drop out of the run;
//! [`Availability::is_fallback`] tells the caller to raise a data-quality
//! warning.

use std::collections::BTreeSet;

use crate::grid::{self, Hour, Weekday};
use crate::model::Teacher;

/// Resolved set of `(weekday, start hour)` cells a teacher can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    cells: BTreeSet<(Weekday, Hour)>,
    fallback: bool,
}

impl Availability {
    /// Resolve the availability of `teacher`.  Pure function of its input.
    pub fn resolve(teacher: &Teacher) -> Self {
        if teacher.availability.is_empty() {
            Self {
                cells: grid::all_teaching_hours().collect(),
                fallback: true,
            }
        } else {
            Self {
                cells: teacher.availability.clone(),
                fallback: false,
            }
        }
    }

    pub fn contains(&self, day: Weekday, hour: Hour) -> bool {
        self.cells.contains(&(day, hour))
    }

    /// Number of available cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `true` when the full-availability fallback was applied.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_availability_is_used_verbatim() {
        let teacher = Teacher {
            availability: [(0, 7), (2, 12)].into_iter().collect(),
            ..Default::default()
        };
        let avail = Availability::resolve(&teacher);
        assert!(!avail.is_fallback());
        assert_eq!(avail.len(), 2);
        assert!(avail.contains(0, 7));
        assert!(avail.contains(2, 12));
        assert!(!avail.contains(0, 8));
    }

    #[test]
    fn empty_availability_falls_back_to_every_teaching_cell() {
        let avail = Availability::resolve(&Teacher::default());
        assert!(avail.is_fallback());
        assert_eq!(avail.len(), 40);
        assert!(avail.contains(4, 14));
        // hour 11 is reachable through slot 5 even though the break starts at 11
        assert!(avail.contains(0, 11));
        assert!(!avail.contains(0, 15));
    }
}
