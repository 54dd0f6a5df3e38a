//! Student shown on the home screen

use serde::{Deserialize, Serialize};

/// Identity of the student the session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student number, also used as the login id
    pub id: String,
    pub name: String,
    pub major: String,
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            id: "22510865".to_string(),
            name: "박예림".to_string(),
            major: "건축".to_string(),
        }
    }
}
