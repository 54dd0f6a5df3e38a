//! Background tasks module
//! 
//! This module contains the timer drivers of the session and the screen
//! observer that run alongside the HTTP server.

pub mod credential_typing;
pub mod phase_timer;
pub mod screen_observer;

use std::sync::Arc;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::warn;

use crate::state::{AppState, SessionSnapshot};

// Re-export main functions
pub use credential_typing::credential_typing_task;
pub use phase_timer::phase_timer_task;
pub use screen_observer::screen_observer_task;

/// Spawn every background task driving the session
pub fn spawn_session_tasks(state: Arc<AppState>) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(phase_timer_task(Arc::clone(&state))),
        tokio::spawn(credential_typing_task(Arc::clone(&state))),
        tokio::spawn(screen_observer_task(state)),
    ]
}

/// Wait for the next session change. A lagged receiver skips to the current
/// snapshot; `None` means the channel closed.
pub(crate) async fn next_change(
    state: &AppState,
    session_rx: &mut broadcast::Receiver<SessionSnapshot>,
) -> Option<SessionSnapshot> {
    loop {
        match session_rx.recv().await {
            Ok(snapshot) => return Some(snapshot),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Lagged by {} session changes, resyncing", skipped);
                if let Ok(snapshot) = state.snapshot() {
                    return Some(snapshot);
                }
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
