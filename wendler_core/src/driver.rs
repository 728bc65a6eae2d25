//! Session runner: drives one workout from prescription to finalization.
//!
//! The driver owns a profile snapshot and the generated [`Workout`]. Checking
//! sets off emits [`FeedbackEvent::SetCompleted`] and restarts the rest timer;
//! `finish` hands the AMRAP outcome to the progression engine.

use crate::config::ProgressionConfig;
use crate::prescription::{generate, Workout};
use crate::progression::finalize_with;
use crate::timer::{FeedbackEvent, FeedbackSender, RestTimer, DEFAULT_REST_SECONDS};
use crate::{
    AccessoryExercise, Error, Lift, LifterProfile, Result, SetCategory, TelemetryReading,
    WorkoutSession,
};
use chrono::{DateTime, Utc};

/// Completed vs total sets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

pub struct WorkoutDriver {
    lift: Lift,
    profile: LifterProfile,
    workout: Workout,
    progression: ProgressionConfig,
    rest_timer: Option<RestTimer>,
    rest_seconds: u32,
    feedback: Option<FeedbackSender>,
    telemetry: Option<TelemetryReading>,
}

impl WorkoutDriver {
    /// Prescribe the session for `lift` and start tracking it
    pub fn new(lift: Lift, profile: LifterProfile, accessories: &[AccessoryExercise]) -> Self {
        let workout = generate(lift, &profile, accessories);
        Self {
            lift,
            profile,
            workout,
            progression: ProgressionConfig::default(),
            rest_timer: None,
            rest_seconds: DEFAULT_REST_SECONDS,
            feedback: None,
            telemetry: None,
        }
    }

    /// Restart `timer` for `seconds` after every completed set
    pub fn with_rest_timer(mut self, timer: RestTimer, seconds: u32) -> Self {
        self.rest_timer = Some(timer);
        self.rest_seconds = seconds;
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackSender) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    pub fn lift(&self) -> Lift {
        self.lift
    }

    pub fn profile(&self) -> &LifterProfile {
        &self.profile
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.workout.iter().filter(|s| s.is_completed).count(),
            total: self.workout.len(),
        }
    }

    /// Check a set off, or un-check it if already completed
    ///
    /// Completing an untouched AMRAP set assumes its base rep target was hit.
    /// Returns the set's new completion state.
    pub fn toggle_set(&mut self, category: SetCategory, index: usize) -> Result<bool> {
        let set = self
            .workout
            .sets_mut(category)
            .get_mut(index)
            .ok_or_else(|| missing_set(category, index))?;

        if set.is_completed {
            set.is_completed = false;
            tracing::debug!("Unchecked {:?} set {}", category, index);
            return Ok(false);
        }

        if set.is_amrap() && set.actual_reps == 0 {
            set.actual_reps = set.target_reps().unwrap_or(0);
        }
        set.is_completed = true;
        tracing::debug!("Completed {:?} set {} ({} @ {})", category, index, set.reps, set.weight);

        if let Some(feedback) = &self.feedback {
            let event = FeedbackEvent::SetCompleted { category, index };
            if feedback.send(event).is_err() {
                tracing::debug!("No feedback listener for {:?}", event);
            }
        }
        if let Some(timer) = &self.rest_timer {
            timer.start(self.rest_seconds);
        }

        Ok(true)
    }

    /// Keep the latest heart-rate/energy reading for display
    ///
    /// Readings never feed into prescription or progression.
    pub fn record_telemetry(&mut self, reading: TelemetryReading) {
        self.telemetry = Some(reading);
    }

    pub fn telemetry(&self) -> Option<TelemetryReading> {
        self.telemetry
    }

    /// Log the reps actually performed on a set
    pub fn set_actual_reps(&mut self, category: SetCategory, index: usize, reps: u32) -> Result<()> {
        let set = self
            .workout
            .sets_mut(category)
            .get_mut(index)
            .ok_or_else(|| missing_set(category, index))?;
        set.actual_reps = reps;
        Ok(())
    }

    /// `(reps, weight)` of the completed AMRAP set, `(0, 0.0)` if none
    pub fn amrap_outcome(&self) -> (u32, f64) {
        self.workout.amrap_outcome()
    }

    /// Stop any rest in progress and finalize the session
    pub fn finish(self, now: DateTime<Utc>) -> (LifterProfile, WorkoutSession) {
        if let Some(timer) = &self.rest_timer {
            timer.cancel();
        }

        let (reps, weight) = self.amrap_outcome();
        finalize_with(self.lift, &self.profile, reps, weight, now, &self.progression)
    }
}

fn missing_set(category: SetCategory, index: usize) -> Error {
    Error::Validation(format!("No {:?} set at index {}", category, index))
}
