//! Main application state management

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{Action, Session, SessionConfig, SessionSnapshot, StudentProfile};
use crate::{
    error::SessionError,
    services::{CredentialVerifier, MockVerifier, RandomSource, StdRandom},
};

/// Owner of the one live session. All mutations go through the session lock,
/// and each change is published while the lock is still held so listeners
/// observe changes in the order they happened.
pub struct AppState {
    session: Mutex<Session>,
    random: Mutex<Box<dyn RandomSource>>,
    verifier: Box<dyn CredentialVerifier>,
    /// Session timing constants
    pub config: SessionConfig,
    /// Student the session belongs to
    pub student: StudentProfile,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for session change notifications (timer drivers)
    pub session_change_tx: broadcast::Sender<SessionSnapshot>,
    /// Latest snapshot for renderers
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl AppState {
    /// Create a new AppState with a fresh session, OS-seeded randomness and
    /// the mock credential verifier
    pub fn new(port: u16, host: String, student: StudentProfile) -> Self {
        let config = SessionConfig::default();
        let session = Session::new(config.clone());
        let (session_change_tx, _) = broadcast::channel(100);
        let (snapshot_tx, _) = watch::channel(session.snapshot());

        Self {
            session: Mutex::new(session),
            random: Mutex::new(Box::new(StdRandom::from_entropy())),
            verifier: Box::new(MockVerifier),
            config,
            student,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            session_change_tx,
            snapshot_tx,
        }
    }

    /// Replace the session constants. Starts over from a fresh session.
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        let session = Session::new(config.clone());
        self.snapshot_tx.send_replace(session.snapshot());
        self.session = Mutex::new(session);
        self.config = config;
        self
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Mutex::new(random);
        self
    }

    pub fn with_verifier(mut self, verifier: Box<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Apply a user action and notify listeners
    fn perform<F>(&self, action: Action, updater: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut Session) -> Result<(), SessionError>,
    {
        let snapshot = {
            let mut session = self.session.lock()
                .map_err(|_| SessionError::StatePoisoned)?;

            let from = session.phase();
            if let Err(e) = updater(&mut *session) {
                warn!("Rejected {} in {}: {}", action, from, e);
                return Err(e);
            }

            let snapshot = session.snapshot();
            info!("{}: {} -> {}", action, from, snapshot.phase);
            self.publish(&snapshot);
            snapshot
        };

        // Update last action tracking
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    /// Apply an internal (timer-driven) change. Listeners are only notified
    /// when the updater reports that something changed.
    fn mutate<F>(&self, updater: F) -> Result<Option<SessionSnapshot>, SessionError>
    where
        F: FnOnce(&mut Session) -> Result<bool, SessionError>,
    {
        let mut session = self.session.lock()
            .map_err(|_| SessionError::StatePoisoned)?;

        if !updater(&mut *session)? {
            return Ok(None);
        }

        let snapshot = session.snapshot();
        self.publish(&snapshot);
        Ok(Some(snapshot))
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.session_change_tx.send(snapshot.clone()) {
            debug!("No session change listeners: {}", e);
        }
        self.snapshot_tx.send_replace(snapshot.clone());
    }

    pub fn focus_credential(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::FocusCredential, Session::focus_credential)
    }

    pub fn blur_credential(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::BlurCredential, Session::blur_credential)
    }

    /// Log in with whatever the typing simulation has put in the buffer
    pub fn submit_credential(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::SubmitCredential, |session| {
            session.submit_credential(&self.student.id, self.verifier.as_ref())
        })
    }

    pub fn request_check_in(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::CheckIn, Session::request_check_in)
    }

    pub fn request_check_out(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::CheckOut, Session::request_check_out)
    }

    pub fn request_professor_unlock(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::ProfessorUnlock, Session::request_professor_unlock)
    }

    /// Log out from any phase, cancelling every pending timer
    pub fn reset(&self) -> Result<SessionSnapshot, SessionError> {
        self.perform(Action::Reset, |session| {
            session.reset();
            Ok(())
        })
    }

    /// Fire the scheduled exit armed for `epoch`. `None` when the session
    /// has already left that phase.
    pub fn fire_scheduled(&self, epoch: u64) -> Result<Option<SessionSnapshot>, SessionError> {
        self.mutate(|session| {
            let from = session.phase();
            match session.fire_scheduled(epoch) {
                Some(to) => {
                    info!("Scheduled transition: {} -> {}", from, to);
                    Ok(true)
                }
                None => {
                    debug!("Discarding stale timer for epoch {} (now {})", epoch, session.epoch());
                    Ok(false)
                }
            }
        })
    }

    /// One countdown/step tick of the location warning armed for `epoch`
    pub fn tick_warning(&self, epoch: u64) -> Result<Option<SessionSnapshot>, SessionError> {
        self.mutate(|session| {
            let mut random = self.random.lock()
                .map_err(|_| SessionError::StatePoisoned)?;
            let ticked = session.tick(epoch, &mut **random);
            if ticked {
                debug!(
                    "Warning tick: countdown={} steps={}",
                    session.countdown_seconds(),
                    session.excursion_steps()
                );
            }
            Ok(ticked)
        })
    }

    /// Append one masked character if typing is still in progress
    pub fn append_credential_char(&self) -> Result<Option<SessionSnapshot>, SessionError> {
        self.mutate(|session| Ok(session.append_credential_char()))
    }

    /// Delay before the next simulated keystroke
    pub fn typing_delay(&self) -> Result<Duration, SessionError> {
        let mut random = self.random.lock()
            .map_err(|_| SessionError::StatePoisoned)?;
        Ok(random.between(self.config.typing_delay_min, self.config.typing_delay_max))
    }

    /// Get the current session snapshot
    pub fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.session.lock()
            .map(|session| session.snapshot())
            .map_err(|_| SessionError::StatePoisoned)
    }

    /// Subscribe to every session change
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.session_change_tx.subscribe()
    }

    /// Watch the latest session snapshot
    pub fn watch_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::FixedRandom, state::Phase};

    fn state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string(), StudentProfile::default())
            .with_random(Box::new(FixedRandom::always()))
    }

    #[test]
    fn test_actions_record_last_action() {
        let state = state();
        assert_eq!(state.get_last_action(), (None, None));

        state.focus_credential().unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("credential-focus"));
        assert!(time.is_some());
    }

    #[test]
    fn test_rejected_action_is_not_recorded() {
        let state = state();
        let err = state.request_check_in().unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAction { action: Action::CheckIn, phase: Phase::LoggedOut }
        );
        assert_eq!(state.get_last_action().0, None);
    }

    #[test]
    fn test_changes_are_broadcast_in_order() {
        let state = state();
        let mut rx = state.subscribe();

        state.focus_credential().unwrap();
        state.append_credential_char().unwrap();
        state.submit_credential().unwrap();

        assert_eq!(rx.try_recv().unwrap().phase, Phase::Authenticating);
        assert_eq!(rx.try_recv().unwrap().credential_len(), 1);
        assert_eq!(rx.try_recv().unwrap().phase, Phase::HomeIdle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watch_sees_latest_snapshot() {
        let state = state();
        let rx = state.watch_snapshots();
        state.focus_credential().unwrap();
        assert_eq!(rx.borrow().phase, Phase::Authenticating);
    }

    #[test]
    fn test_unchanged_timer_ops_are_silent() {
        let state = state();
        let mut rx = state.subscribe();
        assert_eq!(state.append_credential_char().unwrap(), None);
        assert_eq!(state.tick_warning(0).unwrap(), None);
        assert_eq!(state.fire_scheduled(0).unwrap(), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_typing_delay_uses_random_source() {
        let state = state();
        assert_eq!(state.typing_delay().unwrap(), Duration::from_millis(150));
    }
}
