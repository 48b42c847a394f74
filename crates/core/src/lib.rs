#![forbid(unsafe_code)]

pub mod model;
pub mod parse;
pub mod time;

pub use parse::{ParseFailure, parse};
pub use time::Clock;
