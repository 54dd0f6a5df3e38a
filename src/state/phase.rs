//! Session phases, user actions and the scheduled transition table

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use super::SessionConfig;

/// The screen a session is currently on. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    LoggedOut,
    Authenticating,
    HomeIdle,
    EntryScanning,
    EntrySuccess,
    HomeCheckedIn,
    ExitScanning,
    ExitSuccess,
    LocationWarning,
    Banned,
    UnlockGranted,
}

impl Phase {
    pub const ALL: [Phase; 11] = [
        Phase::LoggedOut,
        Phase::Authenticating,
        Phase::HomeIdle,
        Phase::EntryScanning,
        Phase::EntrySuccess,
        Phase::HomeCheckedIn,
        Phase::ExitScanning,
        Phase::ExitSuccess,
        Phase::LocationWarning,
        Phase::Banned,
        Phase::UnlockGranted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::LoggedOut => "logged_out",
            Phase::Authenticating => "authenticating",
            Phase::HomeIdle => "home_idle",
            Phase::EntryScanning => "entry_scanning",
            Phase::EntrySuccess => "entry_success",
            Phase::HomeCheckedIn => "home_checked_in",
            Phase::ExitScanning => "exit_scanning",
            Phase::ExitSuccess => "exit_success",
            Phase::LocationWarning => "location_warning",
            Phase::Banned => "banned",
            Phase::UnlockGranted => "unlock_granted",
        }
    }

    /// The automatic transition leaving this phase, as the delay after entry
    /// and the destination. `None` for phases that only user actions leave.
    pub fn scheduled_exit(&self, config: &SessionConfig) -> Option<(Duration, Phase)> {
        match self {
            Phase::EntryScanning => Some((config.scan_duration, Phase::EntrySuccess)),
            Phase::EntrySuccess => Some((config.success_duration, Phase::HomeCheckedIn)),
            Phase::ExitScanning => Some((config.scan_duration, Phase::ExitSuccess)),
            Phase::ExitSuccess => Some((config.success_duration, Phase::LocationWarning)),
            Phase::LocationWarning => Some((config.warning_duration, Phase::Banned)),
            _ => None,
        }
    }

    /// Whether the per-second countdown/step tick runs in this phase
    pub fn ticks(&self) -> bool {
        matches!(self, Phase::LocationWarning)
    }

    /// Whether the login form (and with it the credential buffer) is on screen
    pub fn accepts_credential(&self) -> bool {
        matches!(self, Phase::LoggedOut | Phase::Authenticating)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-invoked operations on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FocusCredential,
    BlurCredential,
    SubmitCredential,
    CheckIn,
    CheckOut,
    ProfessorUnlock,
    Reset,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::FocusCredential,
        Action::BlurCredential,
        Action::SubmitCredential,
        Action::CheckIn,
        Action::CheckOut,
        Action::ProfessorUnlock,
        Action::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FocusCredential => "credential-focus",
            Action::BlurCredential => "credential-blur",
            Action::SubmitCredential => "login",
            Action::CheckIn => "check-in",
            Action::CheckOut => "check-out",
            Action::ProfessorUnlock => "unlock",
            Action::Reset => "reset",
        }
    }

    /// Destination of this action from `phase`, or `None` if the pair is
    /// illegal. Login also requires a non-empty buffer, checked separately.
    pub fn destination(&self, phase: Phase) -> Option<Phase> {
        match (self, phase) {
            (Action::FocusCredential, Phase::LoggedOut | Phase::Authenticating) => {
                Some(Phase::Authenticating)
            }
            (Action::BlurCredential, Phase::Authenticating) => Some(Phase::LoggedOut),
            (Action::SubmitCredential, Phase::LoggedOut | Phase::Authenticating) => {
                Some(Phase::HomeIdle)
            }
            (Action::CheckIn, Phase::HomeIdle) => Some(Phase::EntryScanning),
            (Action::CheckOut, Phase::HomeCheckedIn) => Some(Phase::ExitScanning),
            (Action::ProfessorUnlock, Phase::Banned) => Some(Phase::UnlockGranted),
            (Action::Reset, _) => Some(Phase::LoggedOut),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
