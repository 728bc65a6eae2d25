#![forbid(unsafe_code)]

//! Core domain model and business logic for the 5/3/1 program engine.
//!
//! This crate provides:
//! - Domain types (lifts, templates, profile, sets, sessions)
//! - Set prescription
//! - Week/cycle progression
//! - Plate math
//! - Rest timer and the workout driver that uses it
//! - Persistence (profile, accessories, session log, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod plates;
pub mod prescription;
pub mod progression;
pub mod timer;
pub mod driver;
pub mod settings;
pub mod store;
pub mod state;
pub mod wal;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use plates::{round_weight, PlateBreakdown, PlateResolver};
pub use prescription::{generate, Workout};
pub use progression::{finalize, finalize_with, next_lift};
pub use timer::{feedback_channel, FeedbackEvent, RestTimer, TimerState};
pub use driver::WorkoutDriver;
pub use settings::{parse_one_rep_max, parse_training_max, ProfileEdit};
pub use store::{record_outcome, AccessoryStore, ProfileStore, SessionStore};
pub use state::{JsonAccessoryStore, JsonProfileStore};
pub use wal::JsonlSessionStore;
pub use export::export_sessions_csv;
