pub mod loop_detect;
pub mod state;
pub mod tracker;

pub use loop_detect::*;
pub use state::*;
pub use tracker::*;

/// Opening line spoken when a call connects
pub const GREETING: &str = "Nine-nine-nine, what's your emergency?";

/// Prompt for a caller who has gone quiet
pub const REMINDER_LINE: &str = "Are you still there? Please describe your emergency.";
