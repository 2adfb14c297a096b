// src/model.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque identity of an exercise or set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Fresh random 128-bit identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const DEFAULT_REPS: u32 = 10;
pub const DEFAULT_WEIGHT: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: EntityId,
    pub reps: u32,
    pub weight: f64,
}

impl WorkoutSet {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self {
            id: EntityId::generate(),
            reps,
            weight,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

impl Default for WorkoutSet {
    fn default() -> Self {
        Self::new(DEFAULT_REPS, DEFAULT_WEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: EntityId,
    pub name: String,
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    /// New exercise seeded with one default set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            sets: vec![WorkoutSet::default()],
        }
    }

    pub fn with_sets(name: impl Into<String>, sets: Vec<WorkoutSet>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            sets,
        }
    }

    /// Heaviest weight across all sets, 0 when there are none.
    pub fn best_weight(&self) -> f64 {
        self.sets.iter().map(|s| s.weight).fold(0.0, f64::max)
    }

    pub fn volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }

    /// Deep copy where the exercise and every set get a new identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: EntityId::generate(),
            name: self.name.clone(),
            sets: self
                .sets
                .iter()
                .map(|s| WorkoutSet::new(s.reps, s.weight))
                .collect(),
        }
    }
}

/// Date key ("YYYY-MM-DD") to the exercises logged that day.
pub type WorkoutLog = BTreeMap<String, Vec<Exercise>>;

/// Returns a new log where `date` maps to `exercises`; everything else is unchanged.
pub fn set_exercises_for_date(log: &WorkoutLog, date: &str, exercises: Vec<Exercise>) -> WorkoutLog {
    let mut next = log.clone();
    next.insert(date.to_string(), exercises);
    next
}

/// Appends fresh-identity duplicates of `source`'s exercises to `target`.
///
/// Copying a date onto itself doubles its list.
pub fn copy_date(log: &WorkoutLog, source: &str, target: &str) -> WorkoutLog {
    let copied: Vec<Exercise> = log
        .get(source)
        .map(|exercises| exercises.iter().map(Exercise::duplicate).collect())
        .unwrap_or_default();

    let mut next = log.clone();
    next.entry(target.to_string()).or_default().extend(copied);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn squat() -> Exercise {
        Exercise::with_sets(
            "Squat",
            vec![WorkoutSet::new(10, 60.0), WorkoutSet::new(8, 65.0)],
        )
    }

    fn ids(exercises: &[Exercise]) -> HashSet<EntityId> {
        exercises
            .iter()
            .flat_map(|e| std::iter::once(e.id.clone()).chain(e.sets.iter().map(|s| s.id.clone())))
            .collect()
    }

    #[test]
    fn test_entity_id_displays_raw_value() {
        assert_eq!(EntityId::from("1714550000000").to_string(), "1714550000000");
        let generated = EntityId::generate().to_string();
        assert!(Uuid::parse_str(&generated).is_ok());
    }

    #[test]
    fn test_new_exercise_has_one_default_set() {
        let ex = Exercise::new("Bench Press");
        assert_eq!(ex.sets.len(), 1);
        assert_eq!(ex.sets[0].reps, DEFAULT_REPS);
        assert_eq!(ex.sets[0].weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_best_weight_and_volume() {
        let ex = squat();
        assert_eq!(ex.best_weight(), 65.0);
        assert_eq!(ex.volume(), 1120.0);
        assert_eq!(Exercise::with_sets("Empty", vec![]).best_weight(), 0.0);
    }

    #[test]
    fn test_set_exercises_for_date_replaces_only_that_date() {
        let mut log = WorkoutLog::new();
        log.insert("2024-05-01".into(), vec![squat()]);

        let exs = vec![Exercise::new("Row"), Exercise::new("Curl")];
        let next = set_exercises_for_date(&log, "2024-05-02", exs.clone());

        assert_eq!(next["2024-05-02"], exs);
        assert_eq!(next["2024-05-01"], log["2024-05-01"]);
        assert!(!log.contains_key("2024-05-02"));
    }

    #[test]
    fn test_copy_date_appends_with_fresh_ids() {
        let mut log = WorkoutLog::new();
        log.insert("2024-05-01".into(), vec![squat()]);
        log.insert("2024-05-03".into(), vec![Exercise::new("Deadlift")]);

        let next = copy_date(&log, "2024-05-01", "2024-05-03");

        assert_eq!(next["2024-05-01"], log["2024-05-01"]);
        let target = &next["2024-05-03"];
        assert_eq!(target.len(), 2);
        assert_eq!(target[0], log["2024-05-03"][0]);
        assert_eq!(target[1].name, "Squat");
        assert_eq!(target[1].sets.len(), 2);
        assert_eq!(target[1].sets[1].reps, 8);

        let appended = ids(&target[1..]);
        assert!(appended.is_disjoint(&ids(&log["2024-05-01"])));
        assert!(appended.is_disjoint(&ids(&log["2024-05-03"])));
    }

    #[test]
    fn test_copy_date_from_missing_source_creates_empty_target() {
        let log = WorkoutLog::new();
        let next = copy_date(&log, "2024-05-01", "2024-05-02");
        assert_eq!(next.get("2024-05-02").map(Vec::len), Some(0));
    }

    #[test]
    fn test_copy_date_onto_itself_doubles() {
        let mut log = WorkoutLog::new();
        log.insert("2024-05-01".into(), vec![squat()]);

        let next = copy_date(&log, "2024-05-01", "2024-05-01");
        let day = &next["2024-05-01"];
        assert_eq!(day.len(), 2);
        assert_ne!(day[0].id, day[1].id);
        assert_eq!(day[0].name, day[1].name);
    }

    #[test]
    fn test_serializes_numbers_as_numbers() {
        let set = WorkoutSet {
            id: EntityId::from("s1"),
            reps: 8,
            weight: 62.5,
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"id":"s1","reps":8,"weight":62.5}"#);
    }
}
