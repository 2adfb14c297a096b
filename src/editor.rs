// src/editor.rs
use crate::model::{Exercise, WorkoutSet, DEFAULT_REPS, DEFAULT_WEIGHT};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("Exercise #{0} does not exist on this date")]
    ExerciseOutOfRange(usize),
    #[error("Set #{set} does not exist for exercise #{exercise}")]
    SetOutOfRange { exercise: usize, set: usize },
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: SetField, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SetField {
    Reps,
    Weight,
}

/// One date's exercise list while it is being edited. Changes stay here
/// until the caller saves the result back into the log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutDraft {
    exercises: Vec<Exercise>,
}

impl WorkoutDraft {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn into_exercises(self) -> Vec<Exercise> {
        self.exercises
    }

    /// Appends an exercise seeded with one default set.
    /// A blank name is ignored and `false` is returned.
    pub fn add_exercise(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.exercises.push(Exercise::new(name));
        true
    }

    pub fn remove_exercise(&mut self, index: usize) -> Result<Exercise, EditError> {
        if index >= self.exercises.len() {
            return Err(EditError::ExerciseOutOfRange(index));
        }
        Ok(self.exercises.remove(index))
    }

    /// Adds a set copying the reps/weight of the previous one, or the defaults
    /// when the exercise has no sets yet.
    pub fn add_set(&mut self, exercise: usize) -> Result<&WorkoutSet, EditError> {
        let ex = self.exercise_mut(exercise)?;
        let (reps, weight) = ex
            .sets
            .last()
            .map_or((DEFAULT_REPS, DEFAULT_WEIGHT), |prev| (prev.reps, prev.weight));
        ex.sets.push(WorkoutSet::new(reps, weight));
        Ok(&ex.sets[ex.sets.len() - 1])
    }

    pub fn remove_set(&mut self, exercise: usize, set: usize) -> Result<WorkoutSet, EditError> {
        let ex = self.exercise_mut(exercise)?;
        if set >= ex.sets.len() {
            return Err(EditError::SetOutOfRange { exercise, set });
        }
        Ok(ex.sets.remove(set))
    }

    pub fn update_set(
        &mut self,
        exercise: usize,
        set: usize,
        field: SetField,
        value: f64,
    ) -> Result<(), EditError> {
        if !value.is_finite() || value < 0.0 {
            return Err(EditError::InvalidValue { field, value });
        }
        if field == SetField::Reps && (value.fract() != 0.0 || value > f64::from(u32::MAX)) {
            return Err(EditError::InvalidValue { field, value });
        }
        let target = self
            .exercise_mut(exercise)?
            .sets
            .get_mut(set)
            .ok_or(EditError::SetOutOfRange { exercise, set })?;
        match field {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            SetField::Reps => target.reps = value as u32,
            SetField::Weight => target.weight = value,
        }
        Ok(())
    }

    fn exercise_mut(&mut self, index: usize) -> Result<&mut Exercise, EditError> {
        self.exercises
            .get_mut(index)
            .ok_or(EditError::ExerciseOutOfRange(index))
    }
}
