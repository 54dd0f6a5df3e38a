//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::StudentProfile;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "smart-attendance")]
#[command(about = "A mock attendance session served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Seed for the simulated sensors (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Student number shown on the home screen
    #[arg(long, default_value = "22510865")]
    pub student_id: String,

    /// Student display name
    #[arg(long, default_value = "박예림")]
    pub student_name: String,

    /// Student major
    #[arg(long, default_value = "건축")]
    pub major: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Build the student profile from the CLI arguments
    pub fn student(&self) -> StudentProfile {
        StudentProfile {
            id: self.student_id.clone(),
            name: self.student_name.clone(),
            major: self.major.clone(),
        }
    }
}
