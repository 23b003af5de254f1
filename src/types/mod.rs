pub mod market;
pub mod prediction;

pub use market::*;
pub use prediction::*;
