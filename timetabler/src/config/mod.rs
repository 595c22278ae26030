//! Engine configuration and plan-file loading.
//!
//! A plan file carries everything one generation run needs.  The expected
//! YAML structure is:
//! ```yaml
//! engine:                      # optional, every field defaulted
//!   exclusivity_scope: group   # group | term
//!   slot_order: chronological  # chronological | shuffled
//!   shuffle_seed: 42
//! teachers:
//!   - id: 1
//!     name: "Myriam Ornelas"
//!     max_weekly_hours: 20
//!     subjects: [101, 102]
//!     availability:            # weekday -> start hours
//!       0: [7, 8, 9, 10]
//!       1: [7, 8, 9, 10]
//! subjects:
//!   - id: 101
//!     name: "Programming"
//!     weekly_sessions: 5
//!     term: 1
//! groups:
//!   - id: 1
//!     term: 1
//!     label: "1A"
//! rooms:                       # optional
//!   - id: 1
//!     name: "A-101"
//!     capacity: 35
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::grid::{self, Hour, Weekday, DAYS};
use crate::model::{Group, Plan, Subject, Teacher, Term};
use crate::rooms::Room;

// ── Engine configuration ──────────────────────────────────────────────────────

/// Scope in which a teacher is bound to a single subject.
///
/// Once a teacher places a session of subject `S` inside a scope, every later
/// session of that teacher inside the same scope must also be `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExclusivityScope {
    /// One subject per (teacher, group).
    #[default]
    Group,
    /// One subject per (teacher, term), across every group of the term.
    Term,
}

/// Order in which the slot filler walks the week for each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrder {
    /// Monday first slot → Friday last slot.  Packs mornings first, which
    /// keeps gaps small by construction and makes runs reproducible.
    #[default]
    Chronological,
    /// Seeded shuffle of all teaching cells, for variety between groups.
    Shuffled,
}

/// Tunables of one generation run.
///
/// Defaults: two sessions per day caps, three compaction passes, sixty
/// weekly balancing passes, internship terms 6 and 10.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub exclusivity_scope: ExclusivityScope,
    pub slot_order: SlotOrder,
    /// Seed for [`SlotOrder::Shuffled`]; ignored otherwise.
    pub shuffle_seed: u64,

    /// Cap on sessions of one teacher with one group on one weekday.
    pub max_teacher_sessions_per_day: u8,
    /// Cap on sessions of one subject for one group on one weekday.
    pub max_subject_sessions_per_day: u8,

    /// Extra "pull the last session inward" passes of the gap compactor.
    pub compaction_passes: usize,
    /// A day with at most this many internal gaps is considered compact.
    pub gap_tolerance: usize,
    /// Iteration budget of the inter-day balancer, per group.
    pub inter_day_passes: usize,
    /// Iteration budget of the weekly balancer, per group.
    pub weekly_passes: usize,

    /// Internship ("estadía") terms: their groups are never scheduled.
    pub internship_terms: BTreeSet<Term>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exclusivity_scope: ExclusivityScope::Group,
            slot_order: SlotOrder::Chronological,
            shuffle_seed: 0,
            max_teacher_sessions_per_day: 2,
            max_subject_sessions_per_day: 2,
            compaction_passes: 3,
            gap_tolerance: 2,
            inter_day_passes: 3,
            weekly_passes: 60,
            internship_terms: [6, 10].into_iter().collect(),
        }
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    teachers: Vec<TeacherEntry>,
    #[serde(default)]
    subjects: Vec<SubjectEntry>,
    #[serde(default)]
    groups: Vec<GroupEntry>,
    #[serde(default)]
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct TeacherEntry {
    id: u32,
    #[serde(default)]
    name: String,
    /// Defaults to `u32::MAX` (unconstrained) when absent from YAML.
    #[serde(default = "default_max_weekly_hours")]
    max_weekly_hours: u32,
    #[serde(default)]
    subjects: Vec<u32>,
    #[serde(default)]
    availability: BTreeMap<Weekday, Vec<Hour>>,
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default = "default_weekly_sessions")]
    weekly_sessions: u32,
    term: Term,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    id: u32,
    #[serde(default = "default_term")]
    term: Term,
    #[serde(default)]
    label: String,
}

/// Serde default for `max_weekly_hours`: `u32::MAX` means "no constraint".
fn default_max_weekly_hours() -> u32 {
    u32::MAX
}

fn default_weekly_sessions() -> u32 {
    5
}

fn default_term() -> Term {
    1
}

impl TeacherEntry {
    /// Converts to the model, dropping availability cells that fall outside
    /// the grid.
    fn into_teacher(self) -> Teacher {
        let valid_hours: BTreeSet<Hour> = grid::teaching_slots().map(|s| s.start_hour).collect();
        let mut availability = BTreeSet::new();
        for (day, hours) in self.availability {
            for hour in hours {
                if (day as usize) < DAYS && valid_hours.contains(&hour) {
                    availability.insert((day, hour));
                } else {
                    warn!(
                        teacher = self.id,
                        day, hour, "availability entry outside the weekly grid — ignored"
                    );
                }
            }
        }

        Teacher {
            id: self.id,
            name: self.name,
            max_weekly_hours: self.max_weekly_hours,
            subject_ids: self.subjects.into_iter().collect(),
            availability,
        }
    }
}

// ── PlanLoader ────────────────────────────────────────────────────────────────

/// Loads a plan file and holds the parsed [`Plan`], [`EngineConfig`] and
/// rooms.
#[derive(Debug, Default)]
pub struct PlanLoader {
    plan: Plan,
    config: EngineConfig,
    rooms: Vec<Room>,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl PlanLoader {
    /// Creates a new, empty `PlanLoader`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and populates the plan, config and rooms.
    ///
    /// * Groups whose term is listed in `engine.internship_terms` are
    ///   dropped here with a warning; the engine refuses them.
    /// * Calling this method a second time replaces everything previously
    ///   loaded.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading plan from: {}", path.display());

        self.plan = Plan::default();
        self.config = EngineConfig::default();
        self.rooms.clear();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open plan file: {}", path.display()))?;

        let file: PlanFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let config = file.engine;

        let teachers: Vec<Teacher> = file
            .teachers
            .into_iter()
            .map(TeacherEntry::into_teacher)
            .collect();
        for t in &teachers {
            debug!(
                "  Teacher: {} | subjects: {:?} | available cells: {} | max hours: {}",
                t.name,
                t.subject_ids,
                t.availability.len(),
                t.max_weekly_hours,
            );
        }

        let subjects: Vec<Subject> = file
            .subjects
            .into_iter()
            .map(|s| Subject {
                id: s.id,
                name: s.name,
                weekly_sessions: s.weekly_sessions,
                term: s.term,
            })
            .collect();

        let mut groups = Vec::with_capacity(file.groups.len());
        for g in file.groups {
            if config.internship_terms.contains(&g.term) {
                warn!(
                    group = g.id,
                    term = g.term,
                    "group belongs to an internship term — not scheduled"
                );
                continue;
            }
            groups.push(Group {
                id: g.id,
                term: g.term,
                label: g.label,
            });
        }

        self.plan = Plan {
            teachers,
            subjects,
            groups,
        };
        self.config = config;
        self.rooms = file.rooms;
        self.loaded = true;

        info!(
            teachers = self.plan.teachers.len(),
            subjects = self.plan.subjects.len(),
            groups = self.plan.groups.len(),
            rooms = self.rooms.len(),
            "Successfully loaded plan"
        );

        Ok(())
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mutable access so the CLI can apply its overrides.
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn load(yaml: &str) -> PlanLoader {
        let f = yaml_tempfile(yaml);
        let mut loader = PlanLoader::new();
        loader.load_from_file(f.path()).unwrap();
        loader
    }

    // ── EngineConfig ──────────────────────────────────────────────────────────

    #[test]
    fn default_config_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.exclusivity_scope, ExclusivityScope::Group);
        assert_eq!(cfg.slot_order, SlotOrder::Chronological);
        assert_eq!(cfg.max_teacher_sessions_per_day, 2);
        assert_eq!(cfg.max_subject_sessions_per_day, 2);
        assert_eq!(cfg.compaction_passes, 3);
        assert_eq!(cfg.gap_tolerance, 2);
        assert_eq!(cfg.inter_day_passes, 3);
        assert_eq!(cfg.weekly_passes, 60);
        assert!(cfg.internship_terms.contains(&6));
        assert!(cfg.internship_terms.contains(&10));
    }

    #[test]
    fn partial_engine_section_keeps_other_defaults() {
        let loader = load(
            r#"
engine:
  exclusivity_scope: term
  slot_order: shuffled
  shuffle_seed: 9
"#,
        );
        let cfg = loader.config();
        assert_eq!(cfg.exclusivity_scope, ExclusivityScope::Term);
        assert_eq!(cfg.slot_order, SlotOrder::Shuffled);
        assert_eq!(cfg.shuffle_seed, 9);
        assert_eq!(cfg.weekly_passes, 60);
    }

    // ── PlanLoader: load_from_file ────────────────────────────────────────────

    #[test]
    fn load_full_plan() {
        let loader = load(
            r#"
teachers:
  - id: 1
    name: "Myriam Ornelas"
    max_weekly_hours: 20
    subjects: [101, 102]
    availability:
      0: [7, 8, 9]
      4: [14]
  - id: 2
    name: "Carlos Orozco"
subjects:
  - id: 101
    name: "Programming"
    weekly_sessions: 4
    term: 1
  - id: 102
    name: "Databases"
    term: 1
groups:
  - id: 1
    term: 1
    label: "1A"
rooms:
  - id: 1
    name: "A-101"
    capacity: 35
"#,
        );

        assert!(loader.is_loaded());
        let plan = loader.plan();
        assert_eq!(plan.teachers.len(), 2);
        assert_eq!(plan.subjects.len(), 2);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(loader.rooms().len(), 1);

        let t1 = &plan.teachers[0];
        assert_eq!(t1.max_weekly_hours, 20);
        assert!(t1.teaches(101) && t1.teaches(102));
        assert_eq!(t1.availability.len(), 4);
        assert!(t1.availability.contains(&(4, 14)));

        let t2 = &plan.teachers[1];
        assert_eq!(t2.max_weekly_hours, u32::MAX); // default = unconstrained
        assert!(t2.availability.is_empty());
        assert!(t2.subject_ids.is_empty());

        // weekly_sessions defaults to 5
        assert_eq!(plan.subjects[1].weekly_sessions, 5);
    }

    #[test]
    fn availability_outside_grid_is_dropped() {
        let loader = load(
            r#"
teachers:
  - id: 1
    availability:
      0: [7, 15, 20]
      5: [8]
"#,
        );
        let t = &loader.plan().teachers[0];
        assert_eq!(t.availability.len(), 1);
        assert!(t.availability.contains(&(0, 7)));
    }

    #[test]
    fn internship_term_groups_are_dropped() {
        let loader = load(
            r#"
groups:
  - id: 1
    term: 5
  - id: 2
    term: 6
  - id: 3
    term: 10
"#,
        );
        let ids: Vec<_> = loader.plan().groups.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn missing_file_returns_error() {
        let mut loader = PlanLoader::new();
        let result = loader.load_from_file(Path::new("/nonexistent/path/plan.yaml"));
        assert!(result.is_err());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("teachers: [ { id: \"not a number\" } ]");
        let mut loader = PlanLoader::new();
        assert!(loader.load_from_file(f.path()).is_err());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn reload_replaces_previous_plan() {
        let f1 = yaml_tempfile("groups:\n  - id: 1\n    term: 1\n");
        let f2 = yaml_tempfile("groups:\n  - id: 2\n    term: 2\n");

        let mut loader = PlanLoader::new();
        loader.load_from_file(f1.path()).unwrap();
        assert!(loader.plan().group(1).is_some());

        loader.load_from_file(f2.path()).unwrap();
        assert!(loader.plan().group(1).is_none(), "old group must be gone");
        assert!(loader.plan().group(2).is_some());
    }
}
