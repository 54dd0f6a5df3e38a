//! Screen observer background task

use std::sync::Arc;
use tracing::{debug, info};

use crate::{render, state::AppState};

/// Background task that renders every session change to the log: phase
/// changes at info, counter and keystroke updates at debug
pub async fn screen_observer_task(state: Arc<AppState>) {
    info!("Starting screen observer task");

    let mut snapshot_rx = state.watch_snapshots();
    let mut last_phase = None;

    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        let screen = render::screen(&snapshot, &state.student, &state.config);

        if last_phase != Some(snapshot.phase) {
            info!("Screen [{}] {}: {}", snapshot.phase, screen.title, screen.lines.join(" | "));
        } else {
            debug!("Screen [{}] updated: {}", snapshot.phase, screen.lines.join(" | "));
        }
        last_phase = Some(snapshot.phase);

        if snapshot_rx.changed().await.is_err() {
            info!("Snapshot channel closed, stopping screen observer task");
            break;
        }
    }
}
