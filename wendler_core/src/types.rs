//! Core domain types for the 5/3/1 program engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Main lifts and supplemental templates (with stable integer codes)
//! - The lifter profile
//! - Accessory exercises
//! - Prescribed sets and recorded sessions

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Lifts and Templates
// ============================================================================

/// One of the four main lifts in the rotation
///
/// Persisted as a stable integer code; unknown codes decode to `Squat`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "u8", into = "u8")]
pub enum Lift {
    Squat,
    Bench,
    Deadlift,
    OverheadPress,
}

impl Lift {
    /// Rotation order, also the order codes are assigned in
    pub const ALL: [Lift; 4] = [Lift::Squat, Lift::Bench, Lift::Deadlift, Lift::OverheadPress];

    pub fn code(self) -> u8 {
        match self {
            Lift::Squat => 0,
            Lift::Bench => 1,
            Lift::Deadlift => 2,
            Lift::OverheadPress => 3,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Lift::Squat,
            1 => Lift::Bench,
            2 => Lift::Deadlift,
            3 => Lift::OverheadPress,
            other => {
                tracing::warn!("Unknown lift code {}, defaulting to squat", other);
                Lift::Squat
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lift::Squat => "Squat",
            Lift::Bench => "Bench Press",
            Lift::Deadlift => "Deadlift",
            Lift::OverheadPress => "Overhead Press",
        }
    }

    /// Lift that follows this one in the weekly rotation
    pub fn next(self) -> Self {
        match self {
            Lift::Squat => Lift::Bench,
            Lift::Bench => Lift::Deadlift,
            Lift::Deadlift => Lift::OverheadPress,
            Lift::OverheadPress => Lift::Squat,
        }
    }

    /// Whether this lift closes out a training week
    pub fn is_last_in_rotation(self) -> bool {
        self == Lift::OverheadPress
    }

    pub fn is_lower_body(self) -> bool {
        matches!(self, Lift::Squat | Lift::Deadlift)
    }
}

impl From<u8> for Lift {
    fn from(code: u8) -> Self {
        Lift::from_code(code)
    }
}

impl From<Lift> for u8 {
    fn from(lift: Lift) -> Self {
        lift.code()
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lift {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "squat" => Ok(Lift::Squat),
            "bench" | "bench_press" | "bench-press" => Ok(Lift::Bench),
            "deadlift" => Ok(Lift::Deadlift),
            "ohp" | "press" | "overhead_press" | "overhead-press" => Ok(Lift::OverheadPress),
            other => Err(Error::Validation(format!("Unknown lift: {}", other))),
        }
    }
}

/// Supplemental volume template
///
/// Persisted as a stable integer code; unknown codes decode to `Fsl`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "u8", into = "u8")]
pub enum Template {
    /// First Set Last: 5x5 at the first main-set weight
    #[default]
    Fsl,
    /// Boring But Big: 5x10 at 50% of the training max
    Bbb,
    /// Second Set Last: 5x5 at the second main-set weight
    Ssl,
    /// Boring But Strong: 10x5 at the first main-set weight
    Bbs,
    /// One set of 20 at the first main-set weight
    Widowmaker,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Fsl,
        Template::Bbb,
        Template::Ssl,
        Template::Bbs,
        Template::Widowmaker,
    ];

    pub fn code(self) -> u8 {
        match self {
            Template::Fsl => 0,
            Template::Bbb => 1,
            Template::Ssl => 2,
            Template::Bbs => 3,
            Template::Widowmaker => 4,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Template::Fsl,
            1 => Template::Bbb,
            2 => Template::Ssl,
            3 => Template::Bbs,
            4 => Template::Widowmaker,
            other => {
                tracing::warn!("Unknown template code {}, defaulting to FSL", other);
                Template::Fsl
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Fsl => "First Set Last",
            Template::Bbb => "Boring But Big",
            Template::Ssl => "Second Set Last",
            Template::Bbs => "Boring But Strong",
            Template::Widowmaker => "Widowmaker",
        }
    }
}

impl From<u8> for Template {
    fn from(code: u8) -> Self {
        Template::from_code(code)
    }
}

impl From<Template> for u8 {
    fn from(template: Template) -> Self {
        template.code()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fsl" => Ok(Template::Fsl),
            "bbb" => Ok(Template::Bbb),
            "ssl" => Ok(Template::Ssl),
            "bbs" => Ok(Template::Bbs),
            "widowmaker" => Ok(Template::Widowmaker),
            other => Err(Error::Validation(format!("Unknown template: {}", other))),
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// The lifter's program state
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LifterProfile {
    pub squat_one_rep_max: f64,
    pub bench_one_rep_max: f64,
    pub deadlift_one_rep_max: f64,
    pub ohp_one_rep_max: f64,
    /// Fraction of the one-rep max used as the training max, in (0, 1]
    pub training_max_percentage: f64,
    pub current_cycle: u32,
    /// 1 (5s), 2 (3s), 3 (5/3/1), 4 (deload)
    pub current_week: u32,
    #[serde(default)]
    pub selected_template: Template,
}

impl Default for LifterProfile {
    fn default() -> Self {
        Self {
            squat_one_rep_max: 0.0,
            bench_one_rep_max: 0.0,
            deadlift_one_rep_max: 0.0,
            ohp_one_rep_max: 0.0,
            training_max_percentage: DEFAULT_TRAINING_MAX,
            current_cycle: 1,
            current_week: 1,
            selected_template: Template::Fsl,
        }
    }
}

/// Training max used when none has been entered
pub const DEFAULT_TRAINING_MAX: f64 = 0.90;

impl LifterProfile {
    pub fn one_rep_max(&self, lift: Lift) -> f64 {
        match lift {
            Lift::Squat => self.squat_one_rep_max,
            Lift::Bench => self.bench_one_rep_max,
            Lift::Deadlift => self.deadlift_one_rep_max,
            Lift::OverheadPress => self.ohp_one_rep_max,
        }
    }

    pub fn one_rep_max_mut(&mut self, lift: Lift) -> &mut f64 {
        match lift {
            Lift::Squat => &mut self.squat_one_rep_max,
            Lift::Bench => &mut self.bench_one_rep_max,
            Lift::Deadlift => &mut self.deadlift_one_rep_max,
            Lift::OverheadPress => &mut self.ohp_one_rep_max,
        }
    }

    /// Unrounded training max for a lift
    pub fn training_max(&self, lift: Lift) -> f64 {
        self.one_rep_max(lift) * self.training_max_percentage
    }
}

// ============================================================================
// Accessories
// ============================================================================

/// A user-defined accessory movement attached to one of the main lifts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessoryExercise {
    pub id: Uuid,
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
    pub related_lift: Lift,
}

impl AccessoryExercise {
    /// Create an accessory, rejecting empty names and zero sets or reps
    pub fn new(
        name: impl Into<String>,
        target_sets: u32,
        target_reps: u32,
        related_lift: Lift,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("accessory name must not be empty".into()));
        }
        if target_sets == 0 || target_reps == 0 {
            return Err(Error::Validation(format!(
                "accessory '{}' needs at least one set and one rep",
                name
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            target_sets,
            target_reps,
            related_lift,
        })
    }
}

// ============================================================================
// Prescribed Sets
// ============================================================================

/// Which block of the session a set belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SetCategory {
    Warmup,
    Main,
    Supplemental,
    Accessory,
}

/// A single prescribed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescribedSet {
    /// Plate-rounded load; 0 for accessories
    pub weight: f64,
    /// Rep target, e.g. "5", "5+" (AMRAP) or "12 (Dips)"
    pub reps: String,
    pub category: SetCategory,
    pub actual_reps: u32,
    pub is_completed: bool,
}

impl PrescribedSet {
    pub fn new(weight: f64, reps: impl Into<String>, category: SetCategory) -> Self {
        Self {
            weight,
            reps: reps.into(),
            category,
            actual_reps: 0,
            is_completed: false,
        }
    }

    /// AMRAP sets carry a trailing "+" on their rep label
    pub fn is_amrap(&self) -> bool {
        self.reps.ends_with('+')
    }

    /// Leading numeric rep target of the label ("5+" -> 5, "12 (Dips)" -> 12)
    pub fn target_reps(&self) -> Option<u32> {
        let digits: String = self.reps.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// A finalized training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub main_lift: Lift,
    pub week: u32,
    pub cycle: u32,
    pub is_completed: bool,
    pub amrap_reps: u32,
    pub amrap_weight: f64,
}

impl WorkoutSession {
    pub fn estimated_one_rep_max(&self) -> f64 {
        estimate_one_rep_max(self.amrap_weight, self.amrap_reps)
    }
}

/// Epley estimate `weight * (1 + 0.0333 * reps)`, rounded to one decimal
///
/// Returns 0 when no reps were logged.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    if reps == 0 {
        return 0.0;
    }
    let estimate = weight * (1.0 + 0.0333 * f64::from(reps));
    (estimate * 10.0).round() / 10.0
}

// ============================================================================
// Telemetry
// ============================================================================

/// Display-only readings from a heart-rate/energy source
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TelemetryReading {
    /// Beats per minute
    pub heart_rate: f64,
    /// Kilocalories burned so far
    pub active_energy: f64,
}
