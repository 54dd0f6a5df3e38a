//! Credential typing simulation task

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::next_change;
use crate::state::AppState;

/// Background task that types one masked character at a time while the
/// password field has focus, until the buffer is full
pub async fn credential_typing_task(state: Arc<AppState>) {
    info!("Starting credential typing task");

    let capacity = state.config.credential_capacity;
    let mut session_rx = state.subscribe();
    let mut current = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to read session state: {}", e);
            return;
        }
    };

    loop {
        if !current.is_typing(capacity) {
            match next_change(&state, &mut session_rx).await {
                Some(snapshot) => current = snapshot,
                None => break,
            }
            continue;
        }

        let delay = match state.typing_delay() {
            Ok(delay) => delay,
            Err(e) => {
                error!("Failed to draw typing delay: {}", e);
                state.config.typing_delay_min
            }
        };
        let keystroke = sleep(delay);
        tokio::pin!(keystroke);

        current = loop {
            tokio::select! {
                _ = &mut keystroke => {
                    match state.append_credential_char() {
                        Ok(Some(snapshot)) => {
                            debug!("Typed {}/{}", snapshot.credential_len(), capacity);
                            break snapshot;
                        }
                        // Focus was lost between the wake-up and the lock
                        Ok(None) => match state.snapshot() {
                            Ok(snapshot) => break snapshot,
                            Err(e) => {
                                error!("Failed to read session state: {}", e);
                                return;
                            }
                        },
                        Err(e) => {
                            error!("Failed to append credential character: {}", e);
                            return;
                        }
                    }
                }

                received = next_change(&state, &mut session_rx) => match received {
                    // Our own keystroke echoing back; keep the pending delay
                    Some(snapshot) if snapshot == current => {}
                    Some(snapshot) => break snapshot,
                    None => return,
                }
            }
        };
    }

    info!("Session channel closed, stopping credential typing task");
}
