//! Program progression after a finished session.
//!
//! The week only moves when the last lift of the rotation (overhead press) is
//! finalized:
//! - Weeks 1-3: advance to the next week
//! - Week 4 (deload): back to week 1, next cycle, and bump every one-rep max
//!   (lower body +10, upper body +5 by default)
//!
//! Every other lift only produces a session record.

use crate::config::ProgressionConfig;
use crate::prescription::DELOAD_WEEK;
use crate::{Lift, LifterProfile, WorkoutSession};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Finalize a session with the default progression increments
///
/// Returns the next profile and the session record for the history store.
/// `amrap_reps`/`amrap_weight` are 0 when no AMRAP set was completed.
pub fn finalize(
    lift: Lift,
    profile: &LifterProfile,
    amrap_reps: u32,
    amrap_weight: f64,
    now: DateTime<Utc>,
) -> (LifterProfile, WorkoutSession) {
    finalize_with(
        lift,
        profile,
        amrap_reps,
        amrap_weight,
        now,
        &ProgressionConfig::default(),
    )
}

/// Finalize a session using configured one-rep-max increments
pub fn finalize_with(
    lift: Lift,
    profile: &LifterProfile,
    amrap_reps: u32,
    amrap_weight: f64,
    now: DateTime<Utc>,
    config: &ProgressionConfig,
) -> (LifterProfile, WorkoutSession) {
    // Snapshot the pre-update week/cycle
    let session = WorkoutSession {
        id: Uuid::new_v4(),
        date: now,
        main_lift: lift,
        week: profile.current_week,
        cycle: profile.current_cycle,
        is_completed: true,
        amrap_reps,
        amrap_weight,
    };

    let mut next = profile.clone();
    if lift.is_last_in_rotation() {
        advance_week(&mut next, config);
    }

    tracing::info!(
        "Finalized {} (week {}, cycle {}): AMRAP {} x {}, est. 1RM {:.1}",
        lift,
        session.week,
        session.cycle,
        amrap_weight,
        amrap_reps,
        session.estimated_one_rep_max()
    );

    (next, session)
}

/// Move the profile to the next week, rolling the cycle after the deload
pub fn advance_week(profile: &mut LifterProfile, config: &ProgressionConfig) {
    if profile.current_week < DELOAD_WEEK {
        profile.current_week += 1;
        tracing::info!("Advanced to week {}", profile.current_week);
        return;
    }

    profile.current_week = 1;
    profile.current_cycle = profile.current_cycle.saturating_add(1);
    for lift in Lift::ALL {
        let increment = if lift.is_lower_body() {
            config.lower_body_increment
        } else {
            config.upper_body_increment
        };
        *profile.one_rep_max_mut(lift) += increment;
    }

    tracing::info!(
        "Started cycle {}: squat {}, bench {}, deadlift {}, press {}",
        profile.current_cycle,
        profile.squat_one_rep_max,
        profile.bench_one_rep_max,
        profile.deadlift_one_rep_max,
        profile.ohp_one_rep_max
    );
}

/// Lift to train next, given history sorted newest first
///
/// Squat when there is no history.
pub fn next_lift(history: &[WorkoutSession]) -> Lift {
    history
        .first()
        .map(|last| last.main_lift.next())
        .unwrap_or(Lift::Squat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Template;

    fn profile(week: u32, cycle: u32) -> LifterProfile {
        LifterProfile {
            squat_one_rep_max: 315.0,
            bench_one_rep_max: 225.0,
            deadlift_one_rep_max: 405.0,
            ohp_one_rep_max: 135.0,
            training_max_percentage: 0.9,
            current_cycle: cycle,
            current_week: week,
            selected_template: Template::Bbb,
        }
    }

    fn session_for(lift: Lift) -> WorkoutSession {
        let (_, session) = finalize(lift, &profile(1, 1), 0, 0.0, Utc::now());
        session
    }

    #[test]
    fn test_press_at_deload_rolls_cycle() {
        let (next, session) = finalize(Lift::OverheadPress, &profile(4, 1), 0, 0.0, Utc::now());

        assert_eq!(next.current_week, 1);
        assert_eq!(next.current_cycle, 2);
        assert_eq!(next.squat_one_rep_max, 325.0);
        assert_eq!(next.deadlift_one_rep_max, 415.0);
        assert_eq!(next.bench_one_rep_max, 230.0);
        assert_eq!(next.ohp_one_rep_max, 140.0);
        assert_eq!(next.training_max_percentage, 0.9);
        assert_eq!(next.selected_template, Template::Bbb);

        // Session records the pre-update position
        assert_eq!(session.week, 4);
        assert_eq!(session.cycle, 1);
    }

    #[test]
    fn test_cycle_counter_saturates() {
        let (next, session) =
            finalize(Lift::OverheadPress, &profile(4, u32::MAX), 5, 95.0, Utc::now());

        assert_eq!(next.current_week, 1);
        assert_eq!(next.current_cycle, u32::MAX);
        assert_eq!(session.cycle, u32::MAX);
    }

    #[test]
    fn test_press_advances_week() {
        for week in 1..4 {
            let before = profile(week, 3);
            let (next, _) = finalize(Lift::OverheadPress, &before, 5, 95.0, Utc::now());
            assert_eq!(next.current_week, week + 1);
            assert_eq!(next.current_cycle, 3);
            assert_eq!(next.squat_one_rep_max, before.squat_one_rep_max);
            assert_eq!(next.ohp_one_rep_max, before.ohp_one_rep_max);
        }
    }

    #[test]
    fn test_other_lifts_never_advance() {
        for lift in [Lift::Squat, Lift::Bench, Lift::Deadlift] {
            for week in 1..=4 {
                for (reps, weight) in [(0, 0.0), (12, 285.0)] {
                    let before = profile(week, 2);
                    let (next, _) = finalize(lift, &before, reps, weight, Utc::now());
                    assert_eq!(next, before, "{:?} week {}", lift, week);
                }
            }
        }
    }

    #[test]
    fn test_session_records_amrap() {
        let now = Utc::now();
        let (_, session) = finalize(Lift::Squat, &profile(2, 1), 5, 200.0, now);

        assert_eq!(session.main_lift, Lift::Squat);
        assert_eq!(session.date, now);
        assert!(session.is_completed);
        assert_eq!(session.amrap_reps, 5);
        assert_eq!(session.amrap_weight, 200.0);
        assert_eq!(session.estimated_one_rep_max(), 233.3);
    }

    #[test]
    fn test_session_without_amrap() {
        let (_, session) = finalize(Lift::Bench, &profile(4, 1), 0, 0.0, Utc::now());
        assert_eq!(session.estimated_one_rep_max(), 0.0);
    }

    #[test]
    fn test_configured_increments() {
        let config = ProgressionConfig {
            lower_body_increment: 5.0,
            upper_body_increment: 2.5,
        };
        let (next, _) =
            finalize_with(Lift::OverheadPress, &profile(4, 1), 0, 0.0, Utc::now(), &config);
        assert_eq!(next.squat_one_rep_max, 320.0);
        assert_eq!(next.bench_one_rep_max, 227.5);
    }

    #[test]
    fn test_full_cycle_of_sessions() {
        let mut current = profile(1, 1);
        let mut history: Vec<WorkoutSession> = Vec::new();

        for _ in 0..16 {
            let lift = next_lift(&history);
            let (next, session) = finalize(lift, &current, 0, 0.0, Utc::now());
            history.insert(0, session);
            current = next;
        }

        assert_eq!(current.current_week, 1);
        assert_eq!(current.current_cycle, 2);
        assert_eq!(current.squat_one_rep_max, 325.0);
    }

    #[test]
    fn test_next_lift_rotation() {
        assert_eq!(next_lift(&[]), Lift::Squat);
        assert_eq!(next_lift(&[session_for(Lift::Squat)]), Lift::Bench);
        assert_eq!(next_lift(&[session_for(Lift::Bench)]), Lift::Deadlift);
        assert_eq!(next_lift(&[session_for(Lift::Deadlift)]), Lift::OverheadPress);
        assert_eq!(next_lift(&[session_for(Lift::OverheadPress)]), Lift::Squat);
    }

    #[test]
    fn test_next_lift_uses_most_recent() {
        let history = vec![session_for(Lift::Bench), session_for(Lift::Squat)];
        assert_eq!(next_lift(&history), Lift::Deadlift);
    }
}
