//! Set prescription for a single training session.
//!
//! Given a lift, a profile snapshot and the user's accessories, this module
//! produces the ordered session: warmup, main 5/3/1 work, template-driven
//! supplemental volume, then accessories.
//!
//! ## Main-set table (percent of training max / reps)
//!
//! | week | set 1  | set 2  | set 3        |
//! |------|--------|--------|--------------|
//! | 1    | 65 / 5 | 75 / 5 | 85 / 5+      |
//! | 2    | 70 / 3 | 80 / 3 | 90 / 3+      |
//! | 3    | 75 / 5 | 85 / 3 | 95 / 1+      |
//! | 4    | 40 / 5 | 50 / 5 | 60 / 5       |
//!
//! Any other week value gets a single 65 / 5 set and no error.

use crate::plates::round_weight;
use crate::{AccessoryExercise, Lift, LifterProfile, PrescribedSet, SetCategory, Template};
use serde::Serialize;

/// The deload week never carries supplemental work
pub const DELOAD_WEEK: u32 = 4;

const WARMUP: [(f64, &str); 3] = [(0.40, "5"), (0.50, "5"), (0.60, "3")];

/// Percentages and rep labels for one week of the cycle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeekScheme {
    pub main: &'static [(f64, &'static str)],
    /// First main-set percentage, used by FSL/BBS/Widowmaker
    pub first_set: f64,
    /// Second main-set percentage, used by SSL
    pub second_set: f64,
}

/// Look up the main-set scheme for a week, falling back for unknown weeks
pub fn week_scheme(week: u32) -> WeekScheme {
    match week {
        1 => WeekScheme {
            main: &[(0.65, "5"), (0.75, "5"), (0.85, "5+")],
            first_set: 0.65,
            second_set: 0.75,
        },
        2 => WeekScheme {
            main: &[(0.70, "3"), (0.80, "3"), (0.90, "3+")],
            first_set: 0.70,
            second_set: 0.80,
        },
        3 => WeekScheme {
            main: &[(0.75, "5"), (0.85, "3"), (0.95, "1+")],
            first_set: 0.75,
            second_set: 0.85,
        },
        // Deload: SSL has no distinct second-set baseline
        DELOAD_WEEK => WeekScheme {
            main: &[(0.40, "5"), (0.50, "5"), (0.60, "5")],
            first_set: 0.40,
            second_set: 0.40,
        },
        other => {
            tracing::warn!("Week {} is outside 1..=4, using fallback prescription", other);
            WeekScheme {
                main: &[(0.65, "5")],
                first_set: 0.65,
                second_set: 0.65,
            }
        }
    }
}

/// A full session prescription in execution order
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Workout {
    pub warmup: Vec<PrescribedSet>,
    pub main: Vec<PrescribedSet>,
    pub supplemental: Vec<PrescribedSet>,
    pub accessory: Vec<PrescribedSet>,
}

impl Workout {
    pub fn sets(&self, category: SetCategory) -> &[PrescribedSet] {
        match category {
            SetCategory::Warmup => &self.warmup,
            SetCategory::Main => &self.main,
            SetCategory::Supplemental => &self.supplemental,
            SetCategory::Accessory => &self.accessory,
        }
    }

    pub fn sets_mut(&mut self, category: SetCategory) -> &mut Vec<PrescribedSet> {
        match category {
            SetCategory::Warmup => &mut self.warmup,
            SetCategory::Main => &mut self.main,
            SetCategory::Supplemental => &mut self.supplemental,
            SetCategory::Accessory => &mut self.accessory,
        }
    }

    /// All sets, warmup → main → supplemental → accessory
    pub fn iter(&self) -> impl Iterator<Item = &PrescribedSet> {
        self.warmup
            .iter()
            .chain(&self.main)
            .chain(&self.supplemental)
            .chain(&self.accessory)
    }

    pub fn len(&self) -> usize {
        self.warmup.len() + self.main.len() + self.supplemental.len() + self.accessory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The completed AMRAP main set, if any: `(actual_reps, weight)`
    ///
    /// Falls back to `(0, 0.0)` when the week has no AMRAP set or the lifter
    /// didn't complete it.
    pub fn amrap_outcome(&self) -> (u32, f64) {
        self.main
            .iter()
            .rev()
            .find(|s| s.is_amrap() && s.is_completed)
            .map(|s| (s.actual_reps, s.weight))
            .unwrap_or((0, 0.0))
    }
}

/// Generate the prescription for `lift` from a profile snapshot
pub fn generate(lift: Lift, profile: &LifterProfile, accessories: &[AccessoryExercise]) -> Workout {
    let tm = profile.training_max(lift);
    let week = profile.current_week;
    let scheme = week_scheme(week);

    let percent_set = |pct: f64, reps: &str, category: SetCategory| {
        PrescribedSet::new(round_weight(tm * pct), reps, category)
    };

    let warmup = WARMUP
        .iter()
        .map(|&(pct, reps)| percent_set(pct, reps, SetCategory::Warmup))
        .collect();

    let main = scheme
        .main
        .iter()
        .map(|&(pct, reps)| percent_set(pct, reps, SetCategory::Main))
        .collect();

    let supplemental = if week == DELOAD_WEEK {
        Vec::new()
    } else {
        let (count, pct, reps) = supplemental_shape(profile.selected_template, &scheme);
        (0..count)
            .map(|_| percent_set(pct, reps, SetCategory::Supplemental))
            .collect()
    };

    let accessory = accessories
        .iter()
        .filter(|a| a.related_lift == lift)
        .flat_map(|a| {
            let label = format!("{} ({})", a.target_reps, a.name);
            (0..a.target_sets)
                .map(move |_| PrescribedSet::new(0.0, label.clone(), SetCategory::Accessory))
        })
        .collect();

    let workout = Workout {
        warmup,
        main,
        supplemental,
        accessory,
    };

    tracing::debug!(
        "Prescribed {} for week {} ({:?}): TM {:.1}, {} sets",
        lift,
        week,
        profile.selected_template,
        tm,
        workout.len()
    );

    workout
}

/// `(set count, percent of training max, rep label)` for a template
fn supplemental_shape(template: Template, scheme: &WeekScheme) -> (usize, f64, &'static str) {
    match template {
        Template::Fsl => (5, scheme.first_set, "5"),
        Template::Bbb => (5, 0.50, "10"),
        Template::Ssl => (5, scheme.second_set, "5"),
        Template::Bbs => (10, scheme.first_set, "5"),
        Template::Widowmaker => (1, scheme.first_set, "20"),
    }
}
