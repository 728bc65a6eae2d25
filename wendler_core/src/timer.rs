//! Rest-interval countdown between sets.
//!
//! A [`RestTimer`] ticks once per second on the tokio runtime and reports
//! progress as [`FeedbackEvent`]s over an unbounded channel. Only one
//! countdown is ever live: `start` preempts a running countdown and `cancel`
//! stops it. Both take the same lock the countdown task takes before emitting,
//! so once they return no stale tick or completion can be delivered.

use crate::SetCategory;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Default rest between sets
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Seconds remaining at which the platform plays a countdown cue
const WARNING_SECONDS: u32 = 3;

/// Discrete signals for the presentation/feedback layer
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackEvent {
    TimerStarted { duration: u32 },
    TimerTick { remaining: u32 },
    TimerComplete,
    SetCompleted { category: SetCategory, index: usize },
}

impl FeedbackEvent {
    /// Ticks in the last three seconds get a distinct cue
    pub fn is_countdown_warning(&self) -> bool {
        matches!(self, FeedbackEvent::TimerTick { remaining } if *remaining <= WARNING_SECONDS)
    }
}

pub type FeedbackSender = UnboundedSender<FeedbackEvent>;

/// Create the channel feedback events travel over
pub fn feedback_channel() -> (FeedbackSender, UnboundedReceiver<FeedbackEvent>) {
    mpsc::unbounded_channel()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { remaining: u32 },
}

struct Shared {
    /// Bumped on every start/cancel; a countdown only emits while it matches
    generation: u64,
    state: TimerState,
    task: Option<JoinHandle<()>>,
}

/// Cancellable one-second countdown
///
/// Cloning gives another handle to the same timer. `start` must be called from
/// within a tokio runtime.
#[derive(Clone)]
pub struct RestTimer {
    shared: Arc<Mutex<Shared>>,
    events: FeedbackSender,
}

impl RestTimer {
    pub fn new(events: FeedbackSender) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: TimerState::Idle,
                task: None,
            })),
            events,
        }
    }

    pub fn state(&self) -> TimerState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), TimerState::Running { .. })
    }

    /// Start a countdown, replacing any countdown already running
    pub fn start(&self, duration: u32) {
        let mut shared = self.lock();
        let generation = Self::preempt(&mut shared);

        self.emit(FeedbackEvent::TimerStarted { duration });
        if duration == 0 {
            shared.state = TimerState::Idle;
            self.emit(FeedbackEvent::TimerComplete);
            return;
        }

        shared.state = TimerState::Running {
            remaining: duration,
        };
        let timer = self.clone();
        shared.task = Some(tokio::spawn(async move {
            timer.run(generation, duration).await;
        }));

        tracing::debug!("Rest timer started: {}s", duration);
    }

    /// Stop the running countdown; a no-op when idle
    pub fn cancel(&self) {
        let mut shared = self.lock();
        if shared.state == TimerState::Idle {
            return;
        }
        Self::preempt(&mut shared);
        shared.state = TimerState::Idle;
        tracing::debug!("Rest timer cancelled");
    }

    fn preempt(shared: &mut Shared) -> u64 {
        shared.generation += 1;
        if let Some(task) = shared.task.take() {
            task.abort();
        }
        shared.generation
    }

    async fn run(self, generation: u64, duration: u32) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately
        ticker.tick().await;

        let mut remaining = duration;
        while remaining > 0 {
            ticker.tick().await;
            remaining -= 1;

            let mut shared = self.lock();
            if shared.generation != generation {
                return;
            }

            if remaining == 0 {
                shared.state = TimerState::Idle;
                shared.task = None;
                self.emit(FeedbackEvent::TimerComplete);
                tracing::debug!("Rest timer complete");
            } else {
                shared.state = TimerState::Running { remaining };
                self.emit(FeedbackEvent::TimerTick { remaining });
            }
        }
    }

    fn emit(&self, event: FeedbackEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No feedback listener for {:?}", event);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
