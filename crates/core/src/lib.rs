#![forbid(unsafe_code)]

pub mod celebration;
pub mod completion;
pub mod curves;
pub mod dates;
pub mod model;
pub mod pace;
pub mod time;

pub use time::Clock;
