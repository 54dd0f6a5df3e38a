//! Smart Attendance - A mock student attendance session served over HTTP
//! 
//! This library provides the session state machine behind the attendance
//! flow (login, face scans, location warning, ban and unlock), the timer
//! tasks that advance it, and the HTTP surface that drives it.

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::SessionError;
pub use state::{AppState, Phase, SessionSnapshot};
pub use tasks::spawn_session_tasks;
pub use utils::signals::shutdown_signal;
