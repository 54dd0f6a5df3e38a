//! Phase timer background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast,
    time::{interval_at, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

use super::next_change;
use crate::state::{AppState, SessionSnapshot};

/// Background task that arms the scheduled exit of the current phase and, in
/// the location warning, the per-second tick. Any newer phase cancels both.
pub async fn phase_timer_task(state: Arc<AppState>) {
    info!("Starting phase timer task");

    let mut session_rx = state.subscribe();
    let mut current = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to read session state: {}", e);
            return;
        }
    };

    loop {
        match run_phase(&state, &mut session_rx, &current).await {
            Some(next) => current = next,
            None => {
                info!("Session channel closed, stopping phase timer task");
                break;
            }
        }
    }
}

/// Drive the timers of one phase until the session moves past its epoch.
/// Returns the snapshot that superseded it, or `None` if the channel closed.
async fn run_phase(
    state: &AppState,
    session_rx: &mut broadcast::Receiver<SessionSnapshot>,
    current: &SessionSnapshot,
) -> Option<SessionSnapshot> {
    let epoch = current.epoch;
    let exit = current.phase.scheduled_exit(&state.config);
    let ticking = current.phase.ticks();

    if let Some((delay, next)) = exit {
        debug!("Arming {:?} timer: {} -> {}", delay, current.phase, next);
    }

    // One origin for both timers: a tick due with the exit is never later
    let start = Instant::now();
    let deadline = sleep_until(start + exit.map_or(Duration::ZERO, |(delay, _)| delay));
    tokio::pin!(deadline);
    let mut armed = exit.is_some();

    let period = state.config.tick_interval;
    let mut ticker = interval_at(start + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // A tick due at the same instant as the exit lands first
            biased;

            _ = ticker.tick(), if ticking => {
                if let Err(e) = state.tick_warning(epoch) {
                    error!("Failed to apply warning tick: {}", e);
                }
            }

            _ = &mut deadline, if armed => {
                armed = false;
                match state.fire_scheduled(epoch) {
                    Ok(Some(next)) => return Some(next),
                    Ok(None) => debug!("Timer for epoch {} outlived its phase", epoch),
                    Err(e) => error!("Failed to fire scheduled transition: {}", e),
                }
            }

            received = next_change(state, session_rx) => match received {
                Some(snapshot) if snapshot.epoch > epoch => {
                    if armed || ticking {
                        debug!("Left {}, cancelling its timers", current.phase);
                    }
                    return Some(snapshot);
                }
                Some(_) => {}
                None => return None,
            }
        }
    }
}
