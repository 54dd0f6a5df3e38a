//! Screen rendering
//!
//! Maps a session snapshot to the screen a client would draw. Rendering is
//! stateless: the same snapshot always produces the same screen.

use serde::{Deserialize, Serialize};

use crate::state::{Action, Phase, SessionConfig, SessionSnapshot, StudentProfile};

/// A rendered screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub phase: Phase,
    pub title: String,
    /// Student line shown above the content once logged in
    pub header: Option<String>,
    pub lines: Vec<String>,
    /// Actions the screen offers (every action legal in this phase)
    pub actions: Vec<Action>,
}

/// Format seconds as `mm:ss`
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render the screen for `snapshot`
pub fn screen(snapshot: &SessionSnapshot, student: &StudentProfile, config: &SessionConfig) -> Screen {
    let phase = snapshot.phase;
    let (title, lines) = match phase {
        Phase::LoggedOut | Phase::Authenticating => {
            let password = if snapshot.credential_buffer.is_empty() {
                "(password)".to_string()
            } else {
                snapshot.credential_buffer.clone()
            };
            let mut lines = vec![
                format!("Student ID: {}", student.id),
                format!("Password: {}", password),
            ];
            if snapshot.credential_focused {
                lines.push("Keypad open".to_string());
            }
            ("YU Smart Attendance", lines)
        }
        Phase::HomeIdle => (
            "Attendance",
            vec![
                "Check in".to_string(),
                "Bluetooth + Face ID".to_string(),
                "Leaving the classroom during the lecture may trigger an automatic warning.".to_string(),
            ],
        ),
        Phase::HomeCheckedIn => (
            "Attendance",
            vec!["Check in (again)".to_string(), "Status: present".to_string()],
        ),
        Phase::EntryScanning | Phase::ExitScanning => (
            scan_title(phase),
            vec![
                "Align your face inside the frame.".to_string(),
                "AI engine v2.4 active".to_string(),
            ],
        ),
        Phase::EntrySuccess | Phase::ExitSuccess => (
            scan_title(phase),
            vec!["Verified!".to_string(), "AI engine v2.4 active".to_string()],
        ),
        Phase::LocationWarning => (
            "Location departure detected",
            vec![
                "You have left the classroom zone.".to_string(),
                format!("Distance away (live): {} steps", snapshot.excursion_steps),
                format!("Allowed: {} steps", config.allowed_steps),
                format!("Time left to return: {}", format_countdown(snapshot.countdown_seconds)),
                "Return immediately to avoid being marked absent.".to_string(),
            ],
        ),
        Phase::Banned => (
            "Attendance check restricted",
            vec![
                "Repeated fraudulent attendance attempts were detected.".to_string(),
                "Reason: suspected proxy attendance and repeated location departure".to_string(),
                "Appeal to the professor to request an unlock.".to_string(),
            ],
        ),
        Phase::UnlockGranted => (
            "Restriction lifted",
            vec![
                "The restriction was lifted by the course professor.".to_string(),
                format!("{} ({}) status: normal", student.name, student.id),
            ],
        ),
    };

    let header = (!phase.accepts_credential())
        .then(|| format!("{} | {} | {}", student.name, student.major, student.id));

    Screen {
        phase,
        title: title.to_string(),
        header,
        lines,
        actions: Action::ALL
            .into_iter()
            .filter(|action| action.destination(phase).is_some())
            .collect(),
    }
}

fn scan_title(phase: Phase) -> &'static str {
    match phase {
        Phase::ExitScanning | Phase::ExitSuccess => "End-of-class verification",
        _ => "Attendance check",
    }
}
