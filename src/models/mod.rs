pub mod call;
pub mod classification;
pub mod incident;
pub mod location;
pub mod standard;

pub use call::*;
pub use classification::*;
pub use incident::*;
pub use location::*;
pub use standard::*;
