pub mod backend;
pub mod client;
pub mod lenient;
pub mod parser;
pub mod prompts;
pub mod validation;

#[cfg(test)]
pub mod testing;

pub use backend::*;
pub use client::*;
pub use parser::*;
pub use prompts::*;
pub use validation::*;
