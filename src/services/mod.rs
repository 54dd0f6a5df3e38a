//! Stand-ins for the collaborators a real deployment would call
//! 
//! This module contains the identity verifier consulted at login and the
//! random source that simulates the step sensor and typing jitter.

pub mod identity;
pub mod random;

// Re-export main types
pub use identity::*;
pub use random::*;
