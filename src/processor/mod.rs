mod core;
mod logic;

pub use self::core::{Direction, Processor};
pub use self::logic::encode_upper;
