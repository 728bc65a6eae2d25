//! Parsing of user-entered profile values.
//!
//! These fields are low stakes, so bad input never surfaces as an error: a
//! one-rep max that doesn't parse becomes 0 and a training max that doesn't
//! parse becomes 90%.

use crate::types::DEFAULT_TRAINING_MAX;
use crate::{Lift, LifterProfile, Template};

/// Parse a one-rep max, 0 on failure
pub fn parse_one_rep_max(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            tracing::debug!("Unparseable one-rep max {:?}, using 0", text);
            0.0
        }
    }
}

/// Parse a training-max percentage ("85" -> 0.85), 90% on failure
///
/// Values above 100 clamp to 1.0.
pub fn parse_training_max(text: &str) -> f64 {
    match text.trim().trim_end_matches('%').trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => (value / 100.0).min(1.0),
        _ => {
            tracing::debug!("Unparseable training max {:?}, using 90%", text);
            DEFAULT_TRAINING_MAX
        }
    }
}

/// A manual edit to the profile, as entered in a settings form
#[derive(Clone, Debug, Default)]
pub struct ProfileEdit {
    pub squat: Option<String>,
    pub bench: Option<String>,
    pub deadlift: Option<String>,
    pub ohp: Option<String>,
    pub training_max: Option<String>,
    pub week: Option<u32>,
    pub cycle: Option<u32>,
    pub template: Option<Template>,
}

impl ProfileEdit {
    pub fn is_empty(&self) -> bool {
        self.squat.is_none()
            && self.bench.is_none()
            && self.deadlift.is_none()
            && self.ohp.is_none()
            && self.training_max.is_none()
            && self.week.is_none()
            && self.cycle.is_none()
            && self.template.is_none()
    }

    /// Apply the edit, keeping week in 1..=4 and cycle at least 1
    pub fn apply(&self, profile: &mut LifterProfile) {
        let maxes = [
            (Lift::Squat, &self.squat),
            (Lift::Bench, &self.bench),
            (Lift::Deadlift, &self.deadlift),
            (Lift::OverheadPress, &self.ohp),
        ];
        for (lift, text) in maxes {
            if let Some(text) = text {
                *profile.one_rep_max_mut(lift) = parse_one_rep_max(text);
            }
        }

        if let Some(text) = &self.training_max {
            profile.training_max_percentage = parse_training_max(text);
        }
        if let Some(week) = self.week {
            profile.current_week = week.clamp(1, 4);
        }
        if let Some(cycle) = self.cycle {
            profile.current_cycle = cycle.max(1);
        }
        if let Some(template) = self.template {
            profile.selected_template = template;
        }

        tracing::info!(
            "Profile updated: week {}, cycle {}, TM {:.0}%, {:?}",
            profile.current_week,
            profile.current_cycle,
            profile.training_max_percentage * 100.0,
            profile.selected_template
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_rep_max() {
        assert_eq!(parse_one_rep_max("315"), 315.0);
        assert_eq!(parse_one_rep_max(" 227.5 "), 227.5);
        assert_eq!(parse_one_rep_max("lots"), 0.0);
        assert_eq!(parse_one_rep_max(""), 0.0);
        assert_eq!(parse_one_rep_max("-20"), 0.0);
    }

    #[test]
    fn test_parse_training_max() {
        assert_eq!(parse_training_max("85"), 0.85);
        assert_eq!(parse_training_max("90%"), 0.9);
        assert_eq!(parse_training_max("abc"), 0.9);
        assert_eq!(parse_training_max("0"), 0.9);
        assert_eq!(parse_training_max("150"), 1.0);
    }

    #[test]
    fn test_apply_edit() {
        let mut profile = LifterProfile::default();
        let edit = ProfileEdit {
            squat: Some("405".into()),
            ohp: Some("oops".into()),
            training_max: Some("85".into()),
            week: Some(9),
            cycle: Some(0),
            template: Some(Template::Bbs),
            ..ProfileEdit::default()
        };
        assert!(!edit.is_empty());

        edit.apply(&mut profile);
        assert_eq!(profile.squat_one_rep_max, 405.0);
        assert_eq!(profile.bench_one_rep_max, 0.0);
        assert_eq!(profile.ohp_one_rep_max, 0.0);
        assert_eq!(profile.training_max_percentage, 0.85);
        assert_eq!(profile.current_week, 4);
        assert_eq!(profile.current_cycle, 1);
        assert_eq!(profile.selected_template, Template::Bbs);
    }

    #[test]
    fn test_empty_edit_changes_nothing() {
        let mut profile = LifterProfile::default();
        let edit = ProfileEdit::default();
        assert!(edit.is_empty());

        edit.apply(&mut profile);
        assert_eq!(profile, LifterProfile::default());
    }
}
