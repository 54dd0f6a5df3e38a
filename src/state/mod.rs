//! State management module
//! 
//! This module contains the session state machine and the shared host that
//! serializes every mutation of it.

pub mod app_state;
pub mod phase;
pub mod session;
pub mod student;

// Re-export main types
pub use app_state::AppState;
pub use phase::{Action, Phase};
pub use session::{Session, SessionConfig, SessionSnapshot, MASK_CHAR};
pub use student::StudentProfile;
