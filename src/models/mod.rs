pub mod collector;
pub mod tier;
pub mod error;

pub use collector::*;
pub use tier::*;
pub use error::*;
