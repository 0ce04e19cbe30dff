pub mod classify;
pub mod deep_analysis;
pub mod standard_analysis;

pub use classify::*;
pub use deep_analysis::*;
pub use standard_analysis::*;
