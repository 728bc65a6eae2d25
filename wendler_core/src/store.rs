//! Storage boundaries the engine hands its results to.
//!
//! The core never depends on a concrete backend; file-backed implementations
//! live in [`crate::state`] and [`crate::wal`].

use crate::{AccessoryExercise, Lift, LifterProfile, Result, WorkoutSession};
use uuid::Uuid;

/// Holds the single lifter profile
pub trait ProfileStore {
    /// `None` when no profile has been saved yet
    fn load_profile(&self) -> Result<Option<LifterProfile>>;
    fn save_profile(&self, profile: &LifterProfile) -> Result<()>;
}

/// Append-only session history (deletion is a user action)
pub trait SessionStore {
    fn insert_session(&mut self, session: &WorkoutSession) -> Result<()>;
    /// Newest first
    fn list_sessions(&self) -> Result<Vec<WorkoutSession>>;
    /// Returns whether a session with that id existed
    fn delete_session(&mut self, id: Uuid) -> Result<bool>;
}

/// User-defined accessory exercises
pub trait AccessoryStore {
    fn list_accessories(&self) -> Result<Vec<AccessoryExercise>>;
    fn add_accessory(&mut self, accessory: AccessoryExercise) -> Result<()>;
    /// Returns whether an accessory with that id existed
    fn remove_accessory(&mut self, id: Uuid) -> Result<bool>;

    fn accessories_for(&self, lift: Lift) -> Result<Vec<AccessoryExercise>> {
        Ok(self
            .list_accessories()?
            .into_iter()
            .filter(|a| a.related_lift == lift)
            .collect())
    }
}

/// Hand a finalized session to the stores without failing the caller
///
/// Persistence problems are logged and otherwise ignored; the in-memory
/// profile the caller holds stays authoritative.
pub fn record_outcome(
    profiles: &dyn ProfileStore,
    sessions: &mut dyn SessionStore,
    profile: &LifterProfile,
    session: &WorkoutSession,
) {
    if let Err(e) = sessions.insert_session(session) {
        tracing::warn!("Failed to record session {}: {}", session.id, e);
    }
    if let Err(e) = profiles.save_profile(profile) {
        tracing::warn!("Failed to save profile: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::JsonProfileStore;
    use crate::wal::JsonlSessionStore;
    use crate::Error;
    use chrono::Utc;

    struct FailingProfiles;

    impl ProfileStore for FailingProfiles {
        fn load_profile(&self) -> Result<Option<LifterProfile>> {
            Ok(None)
        }

        fn save_profile(&self, _profile: &LifterProfile) -> Result<()> {
            Err(Error::State("disk full".into()))
        }
    }

    fn finished_session() -> (LifterProfile, WorkoutSession) {
        let profile = LifterProfile::default();
        crate::progression::finalize(Lift::OverheadPress, &profile, 5, 95.0, Utc::now())
    }

    #[test]
    fn test_record_outcome_persists_both() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profiles = JsonProfileStore::new(temp_dir.path().join("profile.json"));
        let mut sessions = JsonlSessionStore::new(temp_dir.path().join("sessions.jsonl"));

        let (profile, session) = finished_session();
        record_outcome(&profiles, &mut sessions, &profile, &session);

        assert_eq!(profiles.load_profile().unwrap(), Some(profile));
        assert_eq!(sessions.list_sessions().unwrap(), vec![session]);
    }

    #[test]
    fn test_record_outcome_tolerates_failures() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sessions = JsonlSessionStore::new(temp_dir.path().join("sessions.jsonl"));

        let (profile, session) = finished_session();
        record_outcome(&FailingProfiles, &mut sessions, &profile, &session);

        // The session still lands even though the profile save failed
        assert_eq!(sessions.list_sessions().unwrap().len(), 1);
        assert_eq!(profile.current_week, 2);
    }
}
