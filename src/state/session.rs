//! The session state machine
//!
//! A `Session` owns the current phase together with the warning countdown,
//! the excursion step counter and the masked credential buffer. It is plain
//! data: user actions and timer callbacks are methods on it, and the timers
//! themselves live in `crate::tasks`. Every phase entry bumps `epoch`, which
//! is the cancellation handle for whatever timer the previous phase started.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Action, Phase};
use crate::{
    error::SessionError,
    services::{CredentialVerifier, RandomSource},
};

/// Placeholder appended to the credential buffer per simulated keystroke
pub const MASK_CHAR: char = '●';

/// Timing and counter constants of the session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a face scan takes before it reports success
    pub scan_duration: Duration,
    /// How long the success modal stays up
    pub success_duration: Duration,
    /// Time spent in the location warning before the ban
    pub warning_duration: Duration,
    /// Period of the countdown/step tick during the warning
    pub tick_interval: Duration,
    /// Countdown value on warning entry and after reset
    pub initial_countdown: u32,
    /// Step count the warning opens with
    pub excursion_seed: u32,
    /// Probability that a tick adds a step
    pub step_probability: f64,
    /// Step threshold shown next to the counter (display only)
    pub allowed_steps: u32,
    /// Maximum length of the credential buffer
    pub credential_capacity: usize,
    /// Lower bound of the simulated keystroke delay
    pub typing_delay_min: Duration,
    /// Upper bound (exclusive) of the simulated keystroke delay
    pub typing_delay_max: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_duration: Duration::from_secs(3),
            success_duration: Duration::from_secs(2),
            warning_duration: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
            initial_countdown: 292, // 04:52
            excursion_seed: 162,
            step_probability: 0.6,
            allowed_steps: 150,
            credential_capacity: 8,
            typing_delay_min: Duration::from_millis(150),
            typing_delay_max: Duration::from_millis(200),
        }
    }
}

/// Read-only view of a session handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(skip)]
    pub epoch: u64,
    pub phase: Phase,
    pub countdown_seconds: u32,
    pub excursion_steps: u32,
    pub credential_buffer: String,
    pub credential_focused: bool,
}

impl SessionSnapshot {
    pub fn credential_len(&self) -> usize {
        self.credential_buffer.chars().count()
    }

    /// Whether the typing simulation should append another character
    pub fn is_typing(&self, capacity: usize) -> bool {
        keeps_typing(self.phase, self.credential_focused, self.credential_len(), capacity)
    }
}

fn keeps_typing(phase: Phase, focused: bool, len: usize, capacity: usize) -> bool {
    phase.accepts_credential() && focused && len < capacity
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    phase: Phase,
    countdown_seconds: u32,
    excursion_steps: u32,
    credential_buffer: String,
    credential_focused: bool,
    epoch: u64,
}

impl Session {
    /// Create a logged-out session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            phase: Phase::LoggedOut,
            countdown_seconds: config.initial_countdown,
            excursion_steps: 0,
            credential_buffer: String::new(),
            credential_focused: false,
            epoch: 0,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
    }

    pub fn excursion_steps(&self) -> u32 {
        self.excursion_steps
    }

    pub fn credential_buffer(&self) -> &str {
        &self.credential_buffer
    }

    pub fn credential_len(&self) -> usize {
        self.credential_buffer.chars().count()
    }

    pub fn credential_focused(&self) -> bool {
        self.credential_focused
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            epoch: self.epoch,
            phase: self.phase,
            countdown_seconds: self.countdown_seconds,
            excursion_steps: self.excursion_steps,
            credential_buffer: self.credential_buffer.clone(),
            credential_focused: self.credential_focused,
        }
    }

    /// Tap on the password field: shows the keypad and starts typing.
    /// A full buffer is cleared so typing starts over.
    pub fn focus_credential(&mut self) -> Result<(), SessionError> {
        let next = self.destination(Action::FocusCredential)?;
        if self.credential_len() >= self.config.credential_capacity {
            self.credential_buffer.clear();
        }
        self.credential_focused = true;
        if self.phase != next {
            self.enter(next);
        }
        Ok(())
    }

    /// Dismiss the keypad, keeping whatever was typed
    pub fn blur_credential(&mut self) -> Result<(), SessionError> {
        let next = self.destination(Action::BlurCredential)?;
        self.credential_focused = false;
        self.enter(next);
        Ok(())
    }

    pub fn submit_credential(
        &mut self,
        student_id: &str,
        verifier: &dyn CredentialVerifier,
    ) -> Result<(), SessionError> {
        let next = self.destination(Action::SubmitCredential)?;
        if self.credential_buffer.is_empty() {
            return Err(SessionError::EmptyCredential);
        }
        verifier.verify(student_id, &self.credential_buffer)?;
        self.credential_focused = false;
        self.enter(next);
        Ok(())
    }

    pub fn request_check_in(&mut self) -> Result<(), SessionError> {
        self.transition(Action::CheckIn)
    }

    pub fn request_check_out(&mut self) -> Result<(), SessionError> {
        self.transition(Action::CheckOut)
    }

    pub fn request_professor_unlock(&mut self) -> Result<(), SessionError> {
        self.transition(Action::ProfessorUnlock)
    }

    /// Back to a fresh logged-out session. The epoch still advances so that
    /// every outstanding timer is invalidated.
    pub fn reset(&mut self) {
        let epoch = self.epoch;
        *self = Session::new(self.config.clone());
        self.epoch = epoch + 1;
    }

    /// Take the scheduled exit of the current phase if `epoch` is still the
    /// one the timer was armed for. Returns the phase entered.
    pub fn fire_scheduled(&mut self, epoch: u64) -> Option<Phase> {
        if epoch != self.epoch {
            return None;
        }
        let (_, next) = self.phase.scheduled_exit(&self.config)?;
        self.enter(next);
        Some(next)
    }

    /// One second of the location warning: the countdown drops by one and a
    /// step is added with `step_probability`. Stops once the countdown is 0.
    pub fn tick(&mut self, epoch: u64, random: &mut dyn RandomSource) -> bool {
        if epoch != self.epoch || !self.phase.ticks() || self.countdown_seconds == 0 {
            return false;
        }
        self.countdown_seconds -= 1;
        if random.chance(self.config.step_probability) {
            self.excursion_steps += 1;
        }
        true
    }

    /// One simulated keystroke
    pub fn append_credential_char(&mut self) -> bool {
        if !self.is_typing() {
            return false;
        }
        self.credential_buffer.push(MASK_CHAR);
        true
    }

    fn is_typing(&self) -> bool {
        keeps_typing(
            self.phase,
            self.credential_focused,
            self.credential_len(),
            self.config.credential_capacity,
        )
    }

    fn destination(&self, action: Action) -> Result<Phase, SessionError> {
        action.destination(self.phase).ok_or(SessionError::InvalidAction {
            action,
            phase: self.phase,
        })
    }

    fn transition(&mut self, action: Action) -> Result<(), SessionError> {
        let next = self.destination(action)?;
        self.enter(next);
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.epoch += 1;
        if phase == Phase::LocationWarning {
            self.countdown_seconds = self.config.initial_countdown;
            self.excursion_steps = self.config.excursion_seed;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FixedRandom, MockVerifier, StdRandom};

    fn in_phase(phase: Phase) -> Session {
        let mut session = Session::default();
        session.phase = phase;
        session.credential_buffer.push(MASK_CHAR);
        session
    }

    fn perform(session: &mut Session, action: Action) -> Result<(), SessionError> {
        match action {
            Action::FocusCredential => session.focus_credential(),
            Action::BlurCredential => session.blur_credential(),
            Action::SubmitCredential => session.submit_credential("22510865", &MockVerifier),
            Action::CheckIn => session.request_check_in(),
            Action::CheckOut => session.request_check_out(),
            Action::ProfessorUnlock => session.request_professor_unlock(),
            Action::Reset => {
                session.reset();
                Ok(())
            }
        }
    }

    #[test]
    fn test_every_phase_action_pair() {
        for phase in Phase::ALL {
            for action in Action::ALL {
                let mut session = in_phase(phase);
                let result = perform(&mut session, action);
                match action.destination(phase) {
                    Some(next) => {
                        assert!(result.is_ok(), "{action} from {phase}: {result:?}");
                        assert_eq!(session.phase(), next, "{action} from {phase}");
                    }
                    None => {
                        assert_eq!(
                            result,
                            Err(SessionError::InvalidAction { action, phase }),
                            "{action} from {phase}"
                        );
                        assert_eq!(session.phase(), phase);
                    }
                }
            }
        }
    }

    #[test]
    fn test_login_requires_typed_credential() {
        let mut session = Session::default();
        assert_eq!(
            session.submit_credential("22510865", &MockVerifier),
            Err(SessionError::EmptyCredential)
        );
        assert_eq!(session.phase(), Phase::LoggedOut);

        session.focus_credential().unwrap();
        assert!(session.append_credential_char());
        session.submit_credential("22510865", &MockVerifier).unwrap();
        assert_eq!(session.phase(), Phase::HomeIdle);
        assert!(!session.credential_focused());
    }

    #[test]
    fn test_rejecting_verifier_keeps_phase() {
        struct Reject;
        impl CredentialVerifier for Reject {
            fn verify(&self, _: &str, _: &str) -> Result<(), SessionError> {
                Err(SessionError::CredentialRejected("locked account".into()))
            }
        }

        let mut session = in_phase(Phase::Authenticating);
        let epoch = session.epoch();
        assert!(matches!(
            session.submit_credential("22510865", &Reject),
            Err(SessionError::CredentialRejected(_))
        ));
        assert_eq!(session.phase(), Phase::Authenticating);
        assert_eq!(session.epoch(), epoch);
    }

    #[test]
    fn test_typing_stops_at_capacity() {
        let mut session = Session::default();
        session.focus_credential().unwrap();
        let appended = (0..20).filter(|_| session.append_credential_char()).count();
        assert_eq!(appended, 8);
        assert_eq!(session.credential_buffer(), "●●●●●●●●");
    }

    #[test]
    fn test_typing_requires_focus() {
        let mut session = Session::default();
        assert!(!session.append_credential_char());

        session.focus_credential().unwrap();
        assert!(session.append_credential_char());
        session.blur_credential().unwrap();
        assert!(!session.append_credential_char());
        assert_eq!(session.credential_len(), 1);
        assert_eq!(session.phase(), Phase::LoggedOut);
    }

    #[test]
    fn test_refocus_clears_full_buffer_only() {
        let mut session = Session::default();
        session.focus_credential().unwrap();
        for _ in 0..3 {
            session.append_credential_char();
        }
        session.focus_credential().unwrap();
        assert_eq!(session.credential_len(), 3);

        while session.append_credential_char() {}
        session.focus_credential().unwrap();
        assert_eq!(session.credential_len(), 0);
    }

    #[test]
    fn test_warning_entry_resets_counters() {
        let mut session = in_phase(Phase::ExitSuccess);
        session.countdown_seconds = 3;
        session.excursion_steps = 999;

        let epoch = session.epoch();
        assert_eq!(session.fire_scheduled(epoch), Some(Phase::LocationWarning));
        assert_eq!(session.countdown_seconds(), 292);
        assert_eq!(session.excursion_steps(), 162);
    }

    #[test]
    fn test_tick_decrements_and_steps() {
        let mut session = in_phase(Phase::ExitSuccess);
        session.fire_scheduled(session.epoch());
        let epoch = session.epoch();

        assert!(session.tick(epoch, &mut FixedRandom::always()));
        assert!(session.tick(epoch, &mut FixedRandom::never()));
        assert_eq!(session.countdown_seconds(), 290);
        assert_eq!(session.excursion_steps(), 163);
    }

    #[test]
    fn test_tick_asks_for_step_probability() {
        struct Recording {
            asked: Vec<f64>,
        }
        impl RandomSource for Recording {
            fn chance(&mut self, probability: f64) -> bool {
                self.asked.push(probability);
                true
            }
            fn between(&mut self, low: Duration, _high: Duration) -> Duration {
                low
            }
        }

        let mut session = in_phase(Phase::ExitSuccess);
        session.fire_scheduled(session.epoch());
        let epoch = session.epoch();
        let mut random = Recording { asked: Vec::new() };
        for _ in 0..3 {
            session.tick(epoch, &mut random);
        }
        assert_eq!(random.asked, vec![0.6; 3]);

        // Nothing is drawn once the tick is a no-op
        session.fire_scheduled(epoch);
        session.tick(epoch, &mut random);
        assert_eq!(random.asked.len(), 3);
    }

    #[test]
    fn test_step_rate_over_many_ticks() {
        let mut session = in_phase(Phase::LocationWarning);
        session.countdown_seconds = 10_000;
        session.excursion_steps = 0;
        let epoch = session.epoch();
        let mut random = StdRandom::seeded(2024);
        for _ in 0..10_000 {
            assert!(session.tick(epoch, &mut random));
        }
        let rate = session.excursion_steps() as f64 / 10_000.0;
        assert!((0.57..=0.63).contains(&rate), "step rate {rate}");
    }

    #[test]
    fn test_snapshot_and_session_agree_on_typing() {
        let mut session = Session::default();
        assert!(!session.snapshot().is_typing(8));
        session.focus_credential().unwrap();
        while session.snapshot().is_typing(8) {
            assert!(session.append_credential_char());
        }
        assert!(!session.append_credential_char());
        assert_eq!(session.credential_len(), 8);
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut session = in_phase(Phase::LocationWarning);
        session.countdown_seconds = 1;
        let epoch = session.epoch();
        assert!(session.tick(epoch, &mut FixedRandom::always()));
        assert!(!session.tick(epoch, &mut FixedRandom::always()));
        assert_eq!(session.countdown_seconds(), 0);
    }

    #[test]
    fn test_tick_outside_warning_is_ignored() {
        let mut session = in_phase(Phase::HomeCheckedIn);
        let before = session.snapshot();
        assert!(!session.tick(session.epoch(), &mut FixedRandom::always()));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_five_ticks_keep_counters_in_bounds() {
        let mut session = in_phase(Phase::ExitSuccess);
        session.fire_scheduled(session.epoch());
        let epoch = session.epoch();
        let mut random = StdRandom::seeded(11);
        for _ in 0..5 {
            session.tick(epoch, &mut random);
        }
        assert_eq!(session.fire_scheduled(epoch), Some(Phase::Banned));
        assert_eq!(session.countdown_seconds(), 287);
        assert!((162..=167).contains(&session.excursion_steps()));
    }

    #[test]
    fn test_stale_epoch_does_not_fire() {
        let mut session = in_phase(Phase::HomeIdle);
        session.request_check_in().unwrap();
        let scan_epoch = session.epoch();
        session.reset();

        assert_eq!(session.fire_scheduled(scan_epoch), None);
        assert_eq!(session.phase(), Phase::LoggedOut);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = in_phase(Phase::LocationWarning);
        session.excursion_steps = 170;
        session.countdown_seconds = 288;
        session.credential_focused = true;

        session.reset();
        assert_eq!(session.phase(), Phase::LoggedOut);
        assert_eq!(session.countdown_seconds(), 292);
        assert_eq!(session.excursion_steps(), 0);
        assert_eq!(session.credential_buffer(), "");
        assert!(!session.credential_focused());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = in_phase(Phase::Banned);
        session.reset();
        let once = session.snapshot();
        session.reset();
        let twice = session.snapshot();

        assert_eq!(
            SessionSnapshot { epoch: 0, ..once },
            SessionSnapshot { epoch: 0, ..twice }
        );
    }

    #[test]
    fn test_snapshot_skips_epoch_in_json() {
        let value = serde_json::to_value(Session::default().snapshot()).unwrap();
        assert_eq!(value["phase"], "logged_out");
        assert_eq!(value["countdown_seconds"], 292);
        assert!(value.get("epoch").is_none());
    }
}
